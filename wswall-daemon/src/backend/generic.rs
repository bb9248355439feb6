use std::path::Path;

use wswall_common::{command, Result, Scaling};
use wswall_config::ThemeSet;

use super::Backend;

/// Fallback for plain window managers (Openbox and friends): paint the
/// root window with feh. There is no per-workspace wallpaper here, the
/// most recent call wins across all workspaces.
pub struct Generic;

fn feh_flag(scaling: Scaling) -> &'static str {
    match scaling {
        Scaling::Centered => "--bg-center",
        Scaling::Scaled => "--bg-scale",
        Scaling::Zoomed => "--bg-fill",
    }
}

impl Backend for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("feh")
    }

    fn set_wallpaper(&self, _ws_num: usize, image: &Path, scaling: Scaling) -> Result<()> {
        command::run("feh", &[feh_flag(scaling), &image.to_string_lossy()])
    }

    fn apply_themes(&self, themes: &ThemeSet) -> Result<()> {
        if !themes.is_empty() {
            log::debug!("Theme switching is not supported on plain window managers");
        }
        Ok(())
    }
}
