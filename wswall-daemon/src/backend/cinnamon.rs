use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use wswall_common::error::BackendError;
use wswall_common::{command, Result, Scaling};
use wswall_config::ThemeSet;

use super::Backend;

/// Cinnamon, configured through gsettings. The menu applet icon lives in
/// a spices JSON settings file rather than dconf.
pub struct Cinnamon;

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

fn menu_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("cinnamon/spices/menu@cinnamon.org/0.json")
}

/// Point `menu-icon.value` at the new icon, leaving the rest of the
/// applet settings intact. `None` when the document does not have the
/// expected shape.
fn rewrite_menu_json(content: &str, icon: &Path) -> Option<String> {
    let mut doc: Value = serde_json::from_str(content).ok()?;
    let value = doc.get_mut("menu-icon")?.get_mut("value")?;
    *value = Value::String(icon.to_string_lossy().into_owned());
    serde_json::to_string_pretty(&doc).ok()
}

impl Backend for Cinnamon {
    fn name(&self) -> &'static str {
        "cinnamon"
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("gsettings")
    }

    fn set_wallpaper(&self, _ws_num: usize, image: &Path, scaling: Scaling) -> Result<()> {
        let uri = format!("file://{}", image.display());
        gsettings_set("org.cinnamon.desktop.background", "picture-uri", &uri)?;
        gsettings_set(
            "org.cinnamon.desktop.background",
            "picture-options",
            picture_option(scaling),
        )
    }

    fn set_panel_icon(&self, icon: &Path) -> Result<()> {
        let path = menu_config_path();
        let content = fs::read_to_string(&path).map_err(|e| BackendError::PanelConfig {
            path: path.clone(),
            source: e,
        })?;

        let rewritten = rewrite_menu_json(&content, icon)
            .ok_or_else(|| BackendError::PanelConfigFormat { path: path.clone() })?;

        fs::write(&path, rewritten).map_err(|e| BackendError::PanelConfig {
            path: path.clone(),
            source: e,
        })?;

        log::info!("Set Cinnamon menu icon to {:?}", icon);
        Ok(())
    }

    fn apply_themes(&self, themes: &ThemeSet) -> Result<()> {
        if let Some(icon_theme) = &themes.icon_theme {
            gsettings_set("org.cinnamon.desktop.interface", "icon-theme", icon_theme)?;
            log::info!("Cinnamon icon theme: {}", icon_theme);
        }
        if let Some(gtk_theme) = &themes.gtk_theme {
            gsettings_set("org.cinnamon.desktop.interface", "gtk-theme", gtk_theme)?;
            log::info!("Cinnamon GTK theme: {}", gtk_theme);
        }
        if let Some(cursor_theme) = &themes.cursor_theme {
            gsettings_set("org.cinnamon.desktop.interface", "cursor-theme", cursor_theme)?;
            log::info!("Cinnamon cursor theme: {}", cursor_theme);
        }
        if let Some(desktop_theme) = &themes.desktop_theme {
            gsettings_set("org.cinnamon.theme", "name", desktop_theme)?;
            log::info!("Cinnamon desktop theme: {}", desktop_theme);
        }
        if let Some(wm_theme) = &themes.wm_theme {
            gsettings_set("org.cinnamon.desktop.wm.preferences", "theme", wm_theme)?;
            log::info!("Cinnamon window theme: {}", wm_theme);
        }
        Ok(())
    }
}
