use std::fs;
use std::io;
use std::path::PathBuf;

/// One snapshot of "what is on screen right now", as consumed by a
/// third-party on-screen display (Conky/Lua) that polls the status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub wallpaper_path: String,
    pub workspace_name: String,
    pub logo_path: String,
    pub icon_color: String,
    pub interval: String,
    pub mode: String,
    pub order: String,
    pub scaling: String,
    pub blanking_timeout: String,
    pub blanking_paused: bool,
}

impl TelemetrySnapshot {
    /// Line-oriented key=value rendering, one entry per line. The file is
    /// overwritten in full on every publish, never appended.
    ///
    /// `blanking_paused` is written as `True`/`False`; the Conky/Lua
    /// consumers match on the capitalized form.
    fn render(&self) -> String {
        format!(
            "wallpaper_path={}\n\
             workspace_name={}\n\
             logo_path={}\n\
             icon_color={}\n\
             intv={}\n\
             flow={}\n\
             sort={}\n\
             view={}\n\
             blanking_timeout={}\n\
             blanking_paused={}\n",
            self.wallpaper_path,
            self.workspace_name,
            self.logo_path,
            self.icon_color,
            self.interval,
            self.mode,
            self.order,
            self.scaling,
            self.blanking_timeout,
            if self.blanking_paused { "True" } else { "False" },
        )
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryWriter {
    path: PathBuf,
}

impl TelemetryWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::state_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("wswall")
            .join("conky_status.txt")
    }

    pub fn publish(&self, snapshot: &TelemetrySnapshot) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, snapshot.render())
    }
}
