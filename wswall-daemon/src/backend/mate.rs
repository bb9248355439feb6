use std::path::Path;

use wswall_common::{command, Result, Scaling};
use wswall_config::ThemeSet;

use super::Backend;

/// MATE, configured through gsettings. Unlike GNOME and Cinnamon the
/// background takes a plain filename, not a file:// URI.
pub struct Mate;

fn picture_option(scaling: Scaling) -> &'static str {
    match scaling {
        Scaling::Centered => "centered",
        Scaling::Scaled => "scaled",
        Scaling::Zoomed => "zoom",
    }
}

fn gsettings_set(schema: &str, key: &str, value: &str) -> Result<()> {
    command::run("gsettings", &["set", schema, key, value])
}

impl Backend for Mate {
    fn name(&self) -> &'static str {
        "mate"
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("gsettings")
    }

    fn set_wallpaper(&self, _ws_num: usize, image: &Path, scaling: Scaling) -> Result<()> {
        gsettings_set(
            "org.mate.background",
            "picture-filename",
            &image.to_string_lossy(),
        )?;
        gsettings_set(
            "org.mate.background",
            "picture-options",
            picture_option(scaling),
        )
    }

    fn apply_themes(&self, themes: &ThemeSet) -> Result<()> {
        if let Some(icon_theme) = &themes.icon_theme {
            gsettings_set("org.mate.interface", "icon-theme", icon_theme)?;
            log::info!("MATE icon theme: {}", icon_theme);
        }
        if let Some(gtk_theme) = &themes.gtk_theme {
            gsettings_set("org.mate.interface", "gtk-theme", gtk_theme)?;
            log::info!("MATE GTK theme: {}", gtk_theme);
        }
        if let Some(cursor_theme) = &themes.cursor_theme {
            gsettings_set("org.mate.peripherals-mouse", "cursor-theme", cursor_theme)?;
            log::info!("MATE cursor theme: {}", cursor_theme);
        }
        if let Some(wm_theme) = &themes.wm_theme {
            gsettings_set("org.mate.Marco.general", "theme", wm_theme)?;
            log::info!("MATE window theme: {}", wm_theme);
        }
        // desktop_theme has no MATE equivalent.
        Ok(())
    }
}
