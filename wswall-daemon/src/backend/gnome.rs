use std::path::Path;

use wswall_common::{command, Result, Scaling};
use wswall_config::ThemeSet;

use super::Backend;

/// GNOME Shell, configured through gsettings. Both the light and dark
/// picture URIs are set so the wallpaper survives theme switches.
pub struct Gnome;

/// gsettings picture-options token. GNOME calls fill-the-screen "zoom".
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

impl Backend for Gnome {
    fn name(&self) -> &'static str {
        "gnome"
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("gsettings")
    }

    fn set_wallpaper(&self, _ws_num: usize, image: &Path, scaling: Scaling) -> Result<()> {
        let uri = format!("file://{}", image.display());
        gsettings_set("org.gnome.desktop.background", "picture-uri", &uri)?;
        gsettings_set("org.gnome.desktop.background", "picture-uri-dark", &uri)?;
        gsettings_set(
            "org.gnome.desktop.background",
            "picture-options",
            picture_option(scaling),
        )
    }

    fn apply_themes(&self, themes: &ThemeSet) -> Result<()> {
        if let Some(icon_theme) = &themes.icon_theme {
            gsettings_set("org.gnome.desktop.interface", "icon-theme", icon_theme)?;
            log::info!("GNOME icon theme: {}", icon_theme);
        }
        if let Some(gtk_theme) = &themes.gtk_theme {
            gsettings_set("org.gnome.desktop.interface", "gtk-theme", gtk_theme)?;
            log::info!("GNOME GTK theme: {}", gtk_theme);
        }
        if let Some(cursor_theme) = &themes.cursor_theme {
            gsettings_set("org.gnome.desktop.interface", "cursor-theme", cursor_theme)?;
            log::info!("GNOME cursor theme: {}", cursor_theme);
        }
        // desktop_theme and wm_theme have no stock GNOME Shell schema.
        Ok(())
    }
}
