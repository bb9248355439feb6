use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use wswall_common::error::ConfigError;
use wswall_common::{
    DesktopEnv, Result, RotationMode, Scaling, SessionSettings, SessionType, SortOrder,
};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_ICON_COLOR: &str = "#109daf";

/// On-disk configuration: one `[general]` table, an optional `[conky]`
/// table, and one `[wsN]` table per workspace. The file is also written by
/// the external settings editor, so parsing has to stay tolerant of
/// partially-filled sections.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub conky: ConkySection,
    #[serde(flatten)]
    workspaces: HashMap<String, WorkspaceSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneralSection {
    pub desktop: Option<String>,
    pub session: Option<String>,
    #[serde(default)]
    pub blanking_timeout: u64,
    #[serde(default)]
    pub blanking_pause: bool,
    pub workspaces: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConkySection {
    #[serde(default)]
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkspaceSection {
    folder: Option<PathBuf>,
    icon: Option<PathBuf>,
    icon_color: Option<String>,
    timing: Option<String>,
    mode: Option<RotationMode>,
    order: Option<SortOrder>,
    scaling: Option<Scaling>,
    icon_theme: Option<String>,
    gtk_theme: Option<String>,
    cursor_theme: Option<String>,
    desktop_theme: Option<String>,
    wm_theme: Option<String>,
}

/// Theme names to apply on a workspace switch. Absent fields are left
/// untouched by every backend; there is no forced default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeSet {
    pub icon_theme: Option<String>,
    pub gtk_theme: Option<String>,
    pub cursor_theme: Option<String>,
    pub desktop_theme: Option<String>,
    pub wm_theme: Option<String>,
}

impl ThemeSet {
    pub fn is_empty(&self) -> bool {
        self.icon_theme.is_none()
            && self.gtk_theme.is_none()
            && self.cursor_theme.is_none()
            && self.desktop_theme.is_none()
            && self.wm_theme.is_none()
    }
}

/// Fully resolved settings for one workspace, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    /// 0-based workspace number, matching what the desktop probe reports.
    pub number: usize,
    pub folder: PathBuf,
    pub icon: Option<PathBuf>,
    pub icon_color: String,
    /// Raw timing string as configured, for the telemetry file.
    pub timing: String,
    pub interval: Duration,
    pub mode: RotationMode,
    pub order: SortOrder,
    pub scaling: Scaling,
    pub themes: ThemeSet,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("wswall");
        Ok(config_dir.join("config.toml"))
    }

    /// Parse the configuration file. A missing file is fatal: the daemon
    /// must not run without a valid configuration.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Number of configured workspaces. An unusable value is fatal at
    /// startup.
    pub fn workspace_count(&self) -> Result<usize> {
        match self.general.workspaces {
            Some(n) if n >= 1 => Ok(n as usize),
            Some(n) => Err(ConfigError::InvalidWorkspaceCount { value: n }.into()),
            None => Err(ConfigError::InvalidWorkspaceCount { value: 0 }.into()),
        }
    }

    /// Resolve the immutable session settings for this configuration read.
    /// A missing or unrecognized desktop identifier falls back to runtime
    /// detection against the known set.
    pub fn session_settings(&self) -> SessionSettings {
        let desktop = match self.general.desktop.as_deref() {
            Some(name) => DesktopEnv::from_name(name).unwrap_or_else(|| {
                log::warn!(
                    "Unrecognized desktop identifier {:?} in config, falling back to runtime detection",
                    name
                );
                DesktopEnv::detect()
            }),
            None => {
                log::warn!("No desktop identifier in config, falling back to runtime detection");
                DesktopEnv::detect()
            }
        };

        let session = match self.general.session.as_deref() {
            Some("wayland") => SessionType::Wayland,
            _ => SessionType::X11,
        };

        SessionSettings::new(
            desktop,
            session,
            self.general.blanking_timeout,
            self.general.blanking_pause,
        )
    }

    /// Resolved settings for a 0-based workspace number, or `None` if the
    /// `[wsN]` section is absent.
    pub fn workspace_settings(&self, number: usize) -> Option<WorkspaceSettings> {
        let key = format!("ws{}", number + 1);
        let section = self.workspaces.get(&key)?;

        let timing = section.timing.clone().unwrap_or_else(|| "1m".to_string());

        Some(WorkspaceSettings {
            number,
            folder: section.folder.clone().unwrap_or_default(),
            icon: section.icon.clone(),
            icon_color: section
                .icon_color
                .clone()
                .unwrap_or_else(|| DEFAULT_ICON_COLOR.to_string()),
            interval: parse_interval(&timing),
            timing,
            mode: section.mode.unwrap_or_default(),
            order: section.order.unwrap_or_default(),
            scaling: section.scaling.unwrap_or_default(),
            themes: ThemeSet {
                icon_theme: section.icon_theme.clone(),
                gtk_theme: section.gtk_theme.clone(),
                cursor_theme: section.cursor_theme.clone(),
                desktop_theme: section.desktop_theme.clone(),
                wm_theme: section.wm_theme.clone(),
            },
        })
    }
}

/// Parse a rotation period like "30s", "7m" or "2h". A malformed or
/// sub-second value defaults to one minute rather than failing: a typo in
/// the timing field must not take the daemon down.
pub fn parse_interval(timing: &str) -> Duration {
    match timing.parse::<humantime::Duration>() {
        Ok(d) if *d >= Duration::from_secs(1) => d.into(),
        Ok(d) => {
            log::warn!("Timing {:?} is below 1s ({:?}), using 60s", timing, *d);
            DEFAULT_INTERVAL
        }
        Err(e) => {
            log::warn!("Invalid timing {:?} ({}), using 60s", timing, e);
            DEFAULT_INTERVAL
        }
    }
}

/// Cached view of the configuration file. Re-parses only when the file's
/// mtime changes, so on-disk edits still take effect without a restart but
/// the 0.5s tick does not re-read an unchanged file.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    cached: Config,
    mtime: Option<SystemTime>,
    generation: u64,
}

impl ConfigStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        let cached = Config::load_from_path(&path)?;
        let mtime = file_mtime(&path);
        Ok(Self {
            path,
            cached,
            mtime,
            generation: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bumped every time the file is re-parsed. Lets callers notice a
    /// reload without comparing configs.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Re-parse the file if it changed on disk, returning whether a new
    /// configuration was taken. A file that became unreadable or
    /// unparsable mid-run keeps the previous configuration and logs a
    /// warning.
    pub fn refresh(&mut self) -> bool {
        let mtime = file_mtime(&self.path);
        if mtime == self.mtime {
            return false;
        }
        self.mtime = mtime;
        match Config::load_from_path(&self.path) {
            Ok(config) => {
                log::info!("Configuration reloaded from {:?}", self.path);
                self.cached = config;
                self.generation += 1;
                true
            }
            Err(e) => {
                log::warn!("Keeping previous configuration, reload failed: {}", e);
                false
            }
        }
    }

    /// The cached configuration, as of the last successful parse.
    pub fn config(&self) -> &Config {
        &self.cached
    }

    /// Convenience for callers that want refresh-then-read in one step.
    pub fn current(&mut self) -> &Config {
        self.refresh();
        &self.cached
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
