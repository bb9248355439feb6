use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use wswall_common::{
    DesktopProbe, SessionSettings, StateStore, TelemetrySnapshot, TelemetryWriter,
};
use wswall_config::ConfigStore;

use crate::backend::Backend;
use crate::controller::WorkspaceController;

const TICK: Duration = Duration::from_millis(500);

/// Where the scheduler learns the active workspace number each tick. The
/// daemon wires in the xprop probe; tests substitute a fixed source.
pub trait WorkspaceSource {
    fn current_workspace(&self) -> wswall_common::Result<usize>;
}

impl WorkspaceSource for DesktopProbe {
    fn current_workspace(&self) -> wswall_common::Result<usize> {
        DesktopProbe::current_workspace(self)
    }
}

/// The main loop: poll the active workspace twice a second, detect switch
/// and timer-expiry events, and drive the per-workspace controllers. Only
/// the active workspace is ever reloaded or rotated.
pub struct Scheduler {
    config: ConfigStore,
    state: StateStore,
    probe: Box<dyn WorkspaceSource>,
    backend: Box<dyn Backend>,
    session: SessionSettings,
    telemetry: Option<TelemetryWriter>,
    controllers: BTreeMap<usize, WorkspaceController>,
    last_workspace: Option<usize>,
    seen_generation: u64,
}

impl Scheduler {
    pub fn new(
        config: ConfigStore,
        state: StateStore,
        probe: Box<dyn WorkspaceSource>,
        backend: Box<dyn Backend>,
        session: SessionSettings,
    ) -> Self {
        let mut scheduler = Self {
            config,
            state,
            probe,
            backend,
            session,
            telemetry: None,
            controllers: BTreeMap::new(),
            last_workspace: None,
            seen_generation: 0,
        };
        scheduler.sync_with_config();
        scheduler
    }

    /// Rebuild the controller set and telemetry sink from the cached
    /// configuration. Controllers that survive keep their rotation state.
    fn sync_with_config(&mut self) {
        let config = self.config.config();

        let count = match config.workspace_count() {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Keeping previous workspace set: {}", e);
                self.seen_generation = self.config.generation();
                return;
            }
        };

        self.controllers.retain(|number, _| *number < count);
        for number in 0..count {
            if self.controllers.contains_key(&number) {
                continue;
            }
            match config.workspace_settings(number) {
                Some(settings) => {
                    self.controllers
                        .insert(number, WorkspaceController::new(settings));
                }
                None => log::warn!(
                    "Workspace {} is within the configured count but has no [ws{}] section",
                    number + 1,
                    number + 1
                ),
            }
        }

        self.telemetry = if config.conky.enabled {
            let path = config
                .conky
                .path
                .clone()
                .unwrap_or_else(TelemetryWriter::default_path);
            Some(TelemetryWriter::new(path))
        } else {
            None
        };

        self.seen_generation = self.config.generation();
        log::info!("Managing {} workspaces", self.controllers.len());
    }

    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(TICK);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.config.refresh();
        if self.config.generation() != self.seen_generation {
            self.sync_with_config();
        }

        let ws_num = match self.probe.current_workspace() {
            Ok(n) => n,
            Err(e) => {
                // Transient during session startup; try again next tick.
                log::debug!("Workspace probe failed: {}", e);
                return;
            }
        };

        let config = self.config.config();
        let Some(ctl) = self.controllers.get_mut(&ws_num) else {
            log::debug!("Workspace {} is not configured, ignoring", ws_num + 1);
            return;
        };

        // Idempotent, and the desktop can re-enable it at any time.
        self.backend.disable_single_workspace_mode();

        if self.last_workspace != Some(ws_num) {
            // Switch event: restore what this workspace was showing, do
            // not advance it.
            log::debug!("Switched to workspace {}", ws_num + 1);
            ctl.reload(config, &self.state);
            let index = ctl.current_index();
            ctl.apply_index(index, &self.state, self.backend.as_ref());
            ctl.reset_timer();

            if let Some(icon) = ctl.settings().icon.clone() {
                if let Err(e) = self.backend.set_panel_icon(&icon) {
                    log::warn!("Failed to set panel icon: {}", e);
                }
            }
            let themes = ctl.settings().themes.clone();
            if !themes.is_empty() {
                if let Err(e) = self.backend.apply_themes(&themes) {
                    log::warn!("Failed to apply themes: {}", e);
                }
            }

            Self::publish_telemetry(self.telemetry.as_ref(), ctl, &self.session);
            self.last_workspace = Some(ws_num);
        } else if ctl.due(Instant::now()) {
            // Rotation event.
            ctl.reload(config, &self.state);
            let next = ctl.pick_next(&mut rand::thread_rng());
            ctl.apply_index(next, &self.state, self.backend.as_ref());
            ctl.reset_timer();

            Self::publish_telemetry(self.telemetry.as_ref(), ctl, &self.session);
        }
    }

    fn publish_telemetry(
        writer: Option<&TelemetryWriter>,
        ctl: &WorkspaceController,
        session: &SessionSettings,
    ) {
        let Some(writer) = writer else {
            return;
        };

        let settings = ctl.settings();
        let snapshot = TelemetrySnapshot {
            wallpaper_path: ctl
                .current_image()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            workspace_name: StateStore::key_for(settings.number),
            logo_path: settings
                .icon
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            icon_color: settings.icon_color.clone(),
            interval: settings.timing.clone(),
            mode: settings.mode.to_string(),
            order: settings.order.to_string(),
            scaling: settings.scaling.to_string(),
            blanking_timeout: session.blanking_formatted.clone(),
            blanking_paused: session.blanking_pause,
        };

        if let Err(e) = writer.publish(&snapshot) {
            log::warn!("Failed to write status file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::tempdir;
    use wswall_common::{DesktopEnv, Scaling, SessionType};
    use wswall_config::ThemeSet;

    struct FixedProbe(Rc<Cell<usize>>);

    impl WorkspaceSource for FixedProbe {
        fn current_workspace(&self) -> wswall_common::Result<usize> {
            Ok(self.0.get())
        }
    }

    struct FailingProbe;

    impl WorkspaceSource for FailingProbe {
        fn current_workspace(&self) -> wswall_common::Result<usize> {
            Err(wswall_common::error::ProbeError::Parse {
                output: String::new(),
            }
            .into())
        }
    }

    #[derive(Default)]
    struct Recorded {
        wallpapers: RefCell<Vec<(usize, PathBuf)>>,
        icons: RefCell<Vec<PathBuf>>,
        themes: RefCell<Vec<ThemeSet>>,
        disables: Cell<usize>,
    }

    struct RecordingBackend(Rc<Recorded>);

    impl Backend for RecordingBackend {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn set_wallpaper(
            &self,
            ws_num: usize,
            image: &Path,
            _scaling: Scaling,
        ) -> wswall_common::Result<()> {
            self.0
                .wallpapers
                .borrow_mut()
                .push((ws_num, image.to_path_buf()));
            Ok(())
        }

        fn set_panel_icon(&self, icon: &Path) -> wswall_common::Result<()> {
            self.0.icons.borrow_mut().push(icon.to_path_buf());
            Ok(())
        }

        fn apply_themes(&self, themes: &ThemeSet) -> wswall_common::Result<()> {
            self.0.themes.borrow_mut().push(themes.clone());
            Ok(())
        }

        fn disable_single_workspace_mode(&self) {
            self.0.disables.set(self.0.disables.get() + 1);
        }
    }

    fn store_for(dir: &Path, content: &str) -> ConfigStore {
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        ConfigStore::open(path).unwrap()
    }

    fn session() -> SessionSettings {
        SessionSettings::new(DesktopEnv::Unknown, SessionType::X11, 0, false)
    }

    fn fixed_probe(start: usize) -> (Box<dyn WorkspaceSource>, Rc<Cell<usize>>) {
        let active = Rc::new(Cell::new(start));
        (Box::new(FixedProbe(Rc::clone(&active))), active)
    }

    fn recording_backend() -> (Box<dyn Backend>, Rc<Recorded>) {
        let recorded = Rc::new(Recorded::default());
        (Box::new(RecordingBackend(Rc::clone(&recorded))), recorded)
    }

    #[test]
    fn test_controllers_follow_workspace_count() {
        let temp_dir = tempdir().unwrap();
        let config = store_for(
            temp_dir.path(),
            "[general]\nworkspaces = 2\n[ws1]\nfolder = \"/w/one\"\n[ws2]\nfolder = \"/w/two\"\n[ws3]\nfolder = \"/w/three\"\n",
        );
        let state = StateStore::new(temp_dir.path().join("indexes.json"));

        let scheduler = Scheduler::new(
            config,
            state,
            fixed_probe(0).0,
            Box::new(crate::backend::Generic),
            session(),
        );
        // Only workspaces within the configured count get a controller.
        assert_eq!(
            scheduler.controllers.keys().copied().collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(scheduler.telemetry.is_none());
    }

    #[test]
    fn test_sync_preserves_surviving_controllers() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[general]\nworkspaces = 2\n[ws1]\nfolder = \"/w/one\"\n[ws2]\nfolder = \"/w/two\"\n",
        )
        .unwrap();
        let config = ConfigStore::open(path.clone()).unwrap();
        let state = StateStore::new(temp_dir.path().join("indexes.json"));

        let mut scheduler = Scheduler::new(
            config,
            state,
            fixed_probe(0).0,
            Box::new(crate::backend::Generic),
            session(),
        );
        assert_eq!(scheduler.controllers.len(), 2);

        fs::write(&path, "[general]\nworkspaces = 1\n[ws1]\nfolder = \"/w/one\"\n").unwrap();
        let later = std::time::SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        assert!(scheduler.config.refresh());
        scheduler.sync_with_config();
        assert_eq!(
            scheduler.controllers.keys().copied().collect::<Vec<_>>(),
            vec![0]
        );
    }

    #[test]
    fn test_telemetry_sink_from_conky_section() {
        let temp_dir = tempdir().unwrap();
        let status = temp_dir.path().join("status.txt");
        let config = store_for(
            temp_dir.path(),
            &format!(
                "[general]\nworkspaces = 1\n[conky]\nenabled = true\npath = {:?}\n[ws1]\nfolder = \"/w/one\"\n",
                status
            ),
        );
        let state = StateStore::new(temp_dir.path().join("indexes.json"));

        let scheduler = Scheduler::new(
            config,
            state,
            fixed_probe(0).0,
            Box::new(crate::backend::Generic),
            session(),
        );
        let writer = scheduler.telemetry.as_ref().unwrap();

        let ctl = scheduler.controllers.get(&0).unwrap();
        Scheduler::publish_telemetry(Some(writer), ctl, &scheduler.session);

        let content = fs::read_to_string(&status).unwrap();
        assert!(content.contains("workspace_name=ws1\n"));
        assert!(content.contains("wallpaper_path=\n"));
        assert!(content.contains("blanking_timeout=off\n"));
        assert!(content.contains("blanking_paused=False\n"));
    }

    #[test]
    fn test_publish_telemetry_without_sink_is_noop() {
        let temp_dir = tempdir().unwrap();
        let config = store_for(
            temp_dir.path(),
            "[general]\nworkspaces = 1\n[ws1]\nfolder = \"/w/one\"\n",
        );
        let state = StateStore::new(temp_dir.path().join("indexes.json"));
        let scheduler = Scheduler::new(
            config,
            state,
            fixed_probe(0).0,
            Box::new(crate::backend::Generic),
            session(),
        );

        let ctl = scheduler.controllers.get(&0).unwrap();
        Scheduler::publish_telemetry(None, ctl, &scheduler.session);
        assert!(!temp_dir.path().join("status.txt").exists());
    }

    #[test]
    fn test_switch_event_restores_index_and_redispatches_decorations() {
        let temp_dir = tempdir().unwrap();
        let walls1 = temp_dir.path().join("one");
        let walls2 = temp_dir.path().join("two");
        fs::create_dir(&walls1).unwrap();
        fs::create_dir(&walls2).unwrap();
        fs::write(walls1.join("a.jpg"), "fake").unwrap();
        fs::write(walls1.join("b.jpg"), "fake").unwrap();
        fs::write(walls2.join("x.jpg"), "fake").unwrap();
        fs::write(walls2.join("y.jpg"), "fake").unwrap();
        fs::write(walls2.join("z.jpg"), "fake").unwrap();

        let state = StateStore::new(temp_dir.path().join("indexes.json"));
        let mut map = wswall_common::IndexMap::new();
        map.insert("ws1".to_string(), 1);
        map.insert("ws2".to_string(), 2);
        state.save(&map).unwrap();

        let config = store_for(
            temp_dir.path(),
            &format!(
                "[general]\nworkspaces = 2\n\
                 [ws1]\nfolder = {:?}\nmode = \"sequential\"\ntiming = \"5m\"\n\
                 [ws2]\nfolder = {:?}\nmode = \"sequential\"\ntiming = \"5m\"\n\
                 icon = \"/icons/two.png\"\ngtk_theme = \"Adwaita\"\n",
                walls1, walls2
            ),
        );

        let (probe, active) = fixed_probe(0);
        let (backend, recorded) = recording_backend();
        let mut scheduler = Scheduler::new(config, state, probe, backend, session());

        // First tick: workspace 1 becomes active, its persisted index is
        // restored as-is.
        scheduler.tick();
        assert_eq!(scheduler.last_workspace, Some(0));
        {
            let wallpapers = recorded.wallpapers.borrow();
            assert_eq!(wallpapers.len(), 1);
            assert_eq!(wallpapers[0].0, 0);
            assert_eq!(wallpapers[0].1.file_name().unwrap(), "b.jpg");
        }

        // Switch to workspace 2: its persisted index is applied
        // immediately, without waiting for its timer, and its icon and
        // theme set are re-dispatched.
        active.set(1);
        scheduler.tick();
        assert_eq!(scheduler.last_workspace, Some(1));
        {
            let wallpapers = recorded.wallpapers.borrow();
            assert_eq!(wallpapers.len(), 2);
            assert_eq!(wallpapers[1].0, 1);
            assert_eq!(wallpapers[1].1.file_name().unwrap(), "z.jpg");
        }
        assert_eq!(
            recorded.icons.borrow().as_slice(),
            &[PathBuf::from("/icons/two.png")]
        );
        {
            let themes = recorded.themes.borrow();
            assert_eq!(themes.len(), 1);
            assert_eq!(themes[0].gtk_theme.as_deref(), Some("Adwaita"));
        }

        // The switch restored, not advanced: persisted indexes unchanged.
        let loaded = scheduler.state.load();
        assert_eq!(loaded.get("ws1"), Some(&1));
        assert_eq!(loaded.get("ws2"), Some(&2));

        // Same workspace, timer not yet due: no further backend calls.
        scheduler.tick();
        assert_eq!(recorded.wallpapers.borrow().len(), 2);
    }

    #[test]
    fn test_probe_failure_skips_tick() {
        let temp_dir = tempdir().unwrap();
        let config = store_for(
            temp_dir.path(),
            "[general]\nworkspaces = 1\n[ws1]\nfolder = \"/w/one\"\n",
        );
        let state = StateStore::new(temp_dir.path().join("indexes.json"));

        let (backend, recorded) = recording_backend();
        let mut scheduler =
            Scheduler::new(config, state, Box::new(FailingProbe), backend, session());

        scheduler.tick();
        assert_eq!(scheduler.last_workspace, None);
        assert!(recorded.wallpapers.borrow().is_empty());
        assert_eq!(recorded.disables.get(), 0);
    }

    #[test]
    fn test_unmanaged_workspace_is_ignored() {
        let temp_dir = tempdir().unwrap();
        let config = store_for(
            temp_dir.path(),
            "[general]\nworkspaces = 1\n[ws1]\nfolder = \"/w/one\"\n",
        );
        let state = StateStore::new(temp_dir.path().join("indexes.json"));

        let (probe, _active) = fixed_probe(5);
        let (backend, recorded) = recording_backend();
        let mut scheduler = Scheduler::new(config, state, probe, backend, session());

        scheduler.tick();
        assert_eq!(scheduler.last_workspace, None);
        assert!(recorded.wallpapers.borrow().is_empty());
        // Single-workspace-mode is only touched for managed workspaces.
        assert_eq!(recorded.disables.get(), 0);
    }
}
