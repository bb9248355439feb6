use serde::{Deserialize, Serialize};

/// Desktop environments the backend table knows how to drive. Anything
/// unrecognized resolves to `Unknown`, which makes every capability a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DesktopEnv {
    Xfce,
    Gnome,
    Cinnamon,
    Mate,
    Generic,
    Unknown,
}

impl DesktopEnv {
    const KNOWN: [(DesktopEnv, &'static str); 5] = [
        (DesktopEnv::Xfce, "xfce"),
        (DesktopEnv::Gnome, "gnome"),
        (DesktopEnv::Cinnamon, "cinnamon"),
        (DesktopEnv::Mate, "mate"),
        (DesktopEnv::Generic, "generic"),
    ];

    /// Exact match against the configured identifier set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::KNOWN
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(de, _)| *de)
    }

    /// Runtime detection from `XDG_CURRENT_DESKTOP` by substring match,
    /// e.g. "X-Cinnamon" resolves to Cinnamon.
    pub fn detect() -> Self {
        let current = std::env::var("XDG_CURRENT_DESKTOP")
            .unwrap_or_default()
            .to_lowercase();
        Self::KNOWN
            .iter()
            .find(|(_, n)| current.contains(n))
            .map(|(de, _)| *de)
            .unwrap_or(DesktopEnv::Unknown)
    }
}

impl std::fmt::Display for DesktopEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DesktopEnv::Xfce => "xfce",
            DesktopEnv::Gnome => "gnome",
            DesktopEnv::Cinnamon => "cinnamon",
            DesktopEnv::Mate => "mate",
            DesktopEnv::Generic => "generic",
            DesktopEnv::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    X11,
    Wayland,
}

/// Desktop/session state resolved from one configuration read. Immutable;
/// constructed once per reload and passed explicitly to whoever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub desktop: DesktopEnv,
    pub session: SessionType,
    pub blanking_timeout: u64,
    pub blanking_pause: bool,
    pub blanking_formatted: String,
}

impl SessionSettings {
    pub fn new(
        desktop: DesktopEnv,
        session: SessionType,
        blanking_timeout: u64,
        blanking_pause: bool,
    ) -> Self {
        Self {
            desktop,
            session,
            blanking_timeout,
            blanking_pause,
            blanking_formatted: format_blanking(blanking_timeout, blanking_pause),
        }
    }
}

/// Human-readable blanking status for the telemetry file: "off", "30s",
/// "5m", "1h30m".
pub fn format_blanking(timeout_secs: u64, paused: bool) -> String {
    if timeout_secs == 0 || paused {
        return "off".to_string();
    }
    if timeout_secs < 60 {
        format!("{}s", timeout_secs)
    } else if timeout_secs < 3600 {
        format!("{}m", timeout_secs / 60)
    } else {
        let hours = timeout_secs / 3600;
        let minutes = (timeout_secs % 3600) / 60;
        if minutes > 0 {
            format!("{}h{}m", hours, minutes)
        } else {
            format!("{}h", hours)
        }
    }
}
