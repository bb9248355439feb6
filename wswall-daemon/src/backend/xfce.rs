use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use wswall_common::error::BackendError;
use wswall_common::{command, Result, Scaling, SessionSettings, SessionType};
use wswall_config::ThemeSet;

use super::Backend;

/// XFCE drives everything through xfconf. Wallpapers are per-monitor,
/// per-workspace properties under the xfce4-desktop channel.
pub struct Xfce;

const DESKTOP_CHANNEL: &str = "xfce4-desktop";

/// xfce4-desktop image-style codes.
fn style_code(scaling: Scaling) -> &'static str {
    match scaling {
        Scaling::Centered => "1",
        Scaling::Scaled => "4",
        Scaling::Zoomed => "5",
    }
}

/// Monitors that have a backdrop property for the given workspace, pulled
/// out of the xfce4-desktop property tree. Property paths look like
/// `/backdrop/screen0/monitorHDMI-0/workspace0/last-image`.
fn parse_monitors(props: &str, ws_num: usize) -> Vec<String> {
    let needle = format!("/workspace{}/last-image", ws_num);
    let mut monitors = BTreeSet::new();
    for line in props.lines() {
        if !line.contains(&needle) {
            continue;
        }
        let parts: Vec<&str> = line.split('/').collect();
        if parts.len() >= 6 && parts[3].starts_with("monitor") {
            monitors.insert(parts[3].to_string());
        }
    }
    monitors.into_iter().collect()
}

/// Replace the line following the Whisker Menu plugin declaration with a
/// button-icon property. Returns `None` when the panel has no Whisker
/// Menu configured.
fn rewrite_panel_xml(content: &str, icon: &Path) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let anchor = lines
        .iter()
        .position(|l| l.contains("value=\"whiskermenu\""))?;
    if anchor + 1 >= lines.len() {
        return None;
    }

    let replacement = format!(
        "        <property name=\"button-icon\" type=\"string\" value=\"{}\"/>",
        icon.display()
    );

    let mut out: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
    out[anchor + 1] = replacement;
    Some(out.join("\n") + "\n")
}

fn panel_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("xfce4/xfconf/xfce-perchannel-xml/xfce4-panel.xml")
}

/// Set an xfconf property, creating it only when it does not exist yet.
/// Setting with `--create` unconditionally resets the property type on
/// some xfconf versions.
fn set_xfconf_property(channel: &str, property: &str, value: &str) -> Result<()> {
    let exists = command::status_ok("xfconf-query", &["-c", channel, "-p", property])?;
    if exists {
        command::run("xfconf-query", &["-c", channel, "-p", property, "--set", value])
    } else {
        command::run(
            "xfconf-query",
            &["-c", channel, "-p", property, "--set", value, "--create"],
        )
    }
}

impl Backend for Xfce {
    fn name(&self) -> &'static str {
        "xfce"
    }

    fn required_tool(&self) -> Option<&'static str> {
        Some("xfconf-query")
    }

    fn set_wallpaper(&self, ws_num: usize, image: &Path, scaling: Scaling) -> Result<()> {
        let props = command::output("xfconf-query", &["-c", DESKTOP_CHANNEL, "-l"])?;
        let monitors = parse_monitors(&props, ws_num);
        if monitors.is_empty() {
            log::warn!("No monitors found for workspace {} in xfconf", ws_num + 1);
        }

        let image_str = image.to_string_lossy();
        for monitor in &monitors {
            let image_prop = format!("/backdrop/screen0/{}/workspace{}/last-image", monitor, ws_num);
            let style_prop = format!("/backdrop/screen0/{}/workspace{}/image-style", monitor, ws_num);
            command::run(
                "xfconf-query",
                &[
                    "--channel", DESKTOP_CHANNEL,
                    "--property", &image_prop,
                    "--set", &image_str,
                    "--create",
                ],
            )?;
            command::run(
                "xfconf-query",
                &[
                    "--channel", DESKTOP_CHANNEL,
                    "--property", &style_prop,
                    "--set", style_code(scaling),
                    "--create",
                ],
            )?;
        }

        command::run("xfdesktop", &["--reload"])
    }

    fn set_panel_icon(&self, icon: &Path) -> Result<()> {
        let path = panel_config_path();
        let content = fs::read_to_string(&path).map_err(|e| BackendError::PanelConfig {
            path: path.clone(),
            source: e,
        })?;

        let rewritten = rewrite_panel_xml(&content, icon)
            .ok_or_else(|| BackendError::PanelConfigFormat { path: path.clone() })?;

        fs::write(&path, rewritten).map_err(|e| BackendError::PanelConfig {
            path: path.clone(),
            source: e,
        })?;

        // xfconfd caches the panel channel; it must go away before the
        // panel re-reads the file.
        command::run_unchecked("killall", &["xfconfd"]);
        command::run("xfce4-panel", &["-r"])?;

        log::info!("Set XFCE panel icon to {:?}", icon);
        Ok(())
    }

    fn apply_themes(&self, themes: &ThemeSet) -> Result<()> {
        if let Some(icon_theme) = &themes.icon_theme {
            set_xfconf_property("xsettings", "/Net/IconThemeName", icon_theme)?;
            log::info!("XFCE icon theme: {}", icon_theme);
        }
        if let Some(gtk_theme) = &themes.gtk_theme {
            set_xfconf_property("xsettings", "/Net/ThemeName", gtk_theme)?;
            log::info!("XFCE GTK theme: {}", gtk_theme);
        }
        if let Some(cursor_theme) = &themes.cursor_theme {
            set_xfconf_property("xsettings", "/Gtk/CursorThemeName", cursor_theme)?;
            log::info!("XFCE cursor theme: {}", cursor_theme);
        }
        if let Some(wm_theme) = &themes.wm_theme {
            set_xfconf_property("xfwm4", "/general/theme", wm_theme)?;
            log::info!("XFCE window theme: {}", wm_theme);
        }
        // desktop_theme has no XFCE equivalent.
        Ok(())
    }

    fn disable_single_workspace_mode(&self) {
        command::run_unchecked(
            "xfconf-query",
            &[
                "-c", DESKTOP_CHANNEL,
                "-p", "/backdrop/single-workspace-mode",
                "--set", "false",
                "--create",
            ],
        );
    }

    fn configure_screen_blanking(&self, session: &SessionSettings) {
        if session.session != SessionType::X11 {
            return;
        }

        if session.blanking_pause || session.blanking_timeout == 0 {
            command::run_unchecked("xset", &["s", "off"]);
            command::run_unchecked("xset", &["-dpms"]);
            log::info!(
                "Screen blanking disabled (paused={}, timeout={}s)",
                session.blanking_pause,
                session.blanking_timeout
            );
        } else {
            let timeout = session.blanking_timeout.to_string();
            command::run_unchecked("xset", &["s", &timeout]);
            command::run_unchecked("xset", &["+dpms"]);
            command::run_unchecked("xset", &["dpms", &timeout, &timeout, &timeout]);
            log::info!("Screen blanking set to {}s", timeout);
        }
    }
}
