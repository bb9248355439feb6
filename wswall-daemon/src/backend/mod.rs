use std::path::Path;

use wswall_common::{DesktopEnv, Result, Scaling, SessionSettings};
use wswall_config::ThemeSet;

mod cinnamon;
mod generic;
mod gnome;
mod mate;
mod xfce;

pub use cinnamon::Cinnamon;
pub use generic::Generic;
pub use gnome::Gnome;
pub use mate::Mate;
pub use xfce::Xfce;

/// Per-desktop-environment capability set. Only `set_wallpaper` is
/// mandatory; the rest default to no-ops so "capability absent" is an
/// explicit, typed case instead of a missing table entry.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// External tool this backend shells out to, checked once at startup.
    fn required_tool(&self) -> Option<&'static str> {
        None
    }

    fn set_wallpaper(&self, ws_num: usize, image: &Path, scaling: Scaling) -> Result<()>;

    fn set_panel_icon(&self, _icon: &Path) -> Result<()> {
        Ok(())
    }

    /// Apply whichever theme names are present; absent fields are left
    /// untouched.
    fn apply_themes(&self, _themes: &ThemeSet) -> Result<()> {
        Ok(())
    }

    /// Environments without the concept are no-ops.
    fn disable_single_workspace_mode(&self) {}

    /// Applied once at startup. Only XFCE on X11 supports this.
    fn configure_screen_blanking(&self, _session: &SessionSettings) {}
}

/// Every capability a no-op; selected for unrecognized environments.
struct NullBackend;

impl Backend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn set_wallpaper(&self, ws_num: usize, image: &Path, _scaling: Scaling) -> Result<()> {
        log::debug!(
            "No desktop backend active, not setting {:?} on workspace {}",
            image,
            ws_num + 1
        );
        Ok(())
    }
}

/// Resolve the backend for the detected desktop environment, once at
/// startup.
pub fn select(session: &SessionSettings) -> Box<dyn Backend> {
    let backend: Box<dyn Backend> = match session.desktop {
        DesktopEnv::Xfce => Box::new(Xfce),
        DesktopEnv::Gnome => Box::new(Gnome),
        DesktopEnv::Cinnamon => Box::new(Cinnamon),
        DesktopEnv::Mate => Box::new(Mate),
        DesktopEnv::Generic => Box::new(Generic),
        DesktopEnv::Unknown => {
            log::warn!("Unrecognized desktop environment, desktop integration disabled");
            Box::new(NullBackend)
        }
    };

    if let Some(tool) = backend.required_tool() {
        if which::which(tool).is_err() {
            log::warn!(
                "{} backend requires {:?}, which is not on PATH; desktop calls will fail",
                backend.name(),
                tool
            );
        }
    }

    log::info!("Using {} backend", backend.name());
    backend
}
