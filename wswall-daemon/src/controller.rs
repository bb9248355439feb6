use std::path::PathBuf;
use std::time::Instant;

use rand::Rng;

use wswall_common::{ImageCatalog, StateStore};
use wswall_config::{Config, WorkspaceSettings};

use crate::backend::Backend;

/// Rotation state machine for one workspace. Settings and the image list
/// are replaced wholesale on every reload; only `current_index` and the
/// rotation deadline carry across ticks.
pub struct WorkspaceController {
    settings: WorkspaceSettings,
    images: Vec<PathBuf>,
    current_index: usize,
    next_switch_at: Instant,
}

impl WorkspaceController {
    pub fn new(settings: WorkspaceSettings) -> Self {
        let next_switch_at = Instant::now() + settings.interval;
        Self {
            settings,
            images: Vec::new(),
            current_index: 0,
            next_switch_at,
        }
    }

    pub fn settings(&self) -> &WorkspaceSettings {
        &self.settings
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Absolute path of the wallpaper at the current index, if any.
    pub fn current_image(&self) -> Option<&PathBuf> {
        self.images.get(self.current_index)
    }

    /// Re-resolve settings from the configuration, re-scan and re-sort the
    /// wallpaper folder, and re-read the persisted index. An index that no
    /// longer fits the scanned list is clamped to 0. Settings are kept as-is
    /// when the `[wsN]` section disappeared from the file.
    pub fn reload(&mut self, config: &Config, state: &StateStore) {
        match config.workspace_settings(self.settings.number) {
            Some(settings) => self.settings = settings,
            None => log::warn!(
                "No [{}] section in config, keeping previous settings",
                StateStore::key_for(self.settings.number)
            ),
        }

        self.images = ImageCatalog::scan(&self.settings.folder);
        // The configured order only matters for sequential rotation; random
        // mode uses a fixed sort so persisted indexes stay stable.
        let order = match self.settings.mode {
            wswall_common::RotationMode::Sequential => self.settings.order,
            wswall_common::RotationMode::Random => wswall_common::SortOrder::NameAz,
        };
        ImageCatalog::sort(&mut self.images, order);

        let persisted = state
            .load()
            .get(&StateStore::key_for(self.settings.number))
            .copied()
            .unwrap_or(0);
        self.current_index = if persisted < self.images.len() {
            persisted
        } else {
            0
        };
    }

    /// Next index for a rotation event. Random mode never repeats the
    /// current image unless it is the only one; sequential mode cycles
    /// through the sorted list.
    pub fn pick_next(&self, rng: &mut impl Rng) -> usize {
        let len = self.images.len();
        if len <= 1 {
            return 0;
        }
        match self.settings.mode {
            wswall_common::RotationMode::Random => {
                let r = rng.gen_range(0..len - 1);
                if r >= self.current_index {
                    r + 1
                } else {
                    r
                }
            }
            wswall_common::RotationMode::Sequential => (self.current_index + 1) % len,
        }
    }

    /// Take `index` as current, persist it, and dispatch the wallpaper to
    /// the backend. The index is persisted even when the backend call
    /// fails: index advancement is the decision, the OS call is only its
    /// visible effect.
    pub fn apply_index(&mut self, index: usize, state: &StateStore, backend: &dyn Backend) {
        self.current_index = index;

        let mut map = state.load();
        map.insert(StateStore::key_for(self.settings.number), index);
        if let Err(e) = state.save(&map) {
            log::error!("Failed to persist wallpaper index: {}", e);
        }

        let Some(image) = self.images.get(index) else {
            log::debug!(
                "Workspace {} has no images, nothing to display",
                self.settings.number + 1
            );
            return;
        };

        log::info!(
            "Workspace {}: wallpaper {} of {} ({:?})",
            self.settings.number + 1,
            index + 1,
            self.images.len(),
            image.file_name().unwrap_or_default()
        );
        if let Err(e) = backend.set_wallpaper(self.settings.number, image, self.settings.scaling) {
            log::error!("Failed to set wallpaper: {}", e);
        }
    }

    pub fn reset_timer(&mut self) {
        self.next_switch_at = Instant::now() + self.settings.interval;
    }

    pub fn due(&self, now: Instant) -> bool {
        now >= self.next_switch_at
    }

    #[cfg(test)]
    fn force_due(&mut self) {
        self.next_switch_at = Instant::now() - std::time::Duration::from_secs(1);
    }
}
