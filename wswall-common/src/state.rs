use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StateError};

/// Durable mapping from workspace key ("ws1", "ws2", ...) to the index of
/// the wallpaper currently displayed there. This file, not the in-memory
/// index, is the source of truth: a killed-and-restarted daemon resumes
/// from it without flicker.
pub type IndexMap = BTreeMap<String, usize>;

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::state_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("wswall")
            .join("indexes.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted index map. A missing or corrupt file yields an
    /// empty map, which implicitly resets every workspace to index 0.
    pub fn load(&self) -> IndexMap {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(_) => {
                log::debug!("No state file at {:?}, starting fresh", self.path);
                return IndexMap::new();
            }
        };

        match serde_json::from_str(&json) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("State file {:?} is corrupt ({}), resetting indexes", self.path, e);
                IndexMap::new()
            }
        }
    }

    /// Persist the whole map atomically: serialize to a sibling temp file,
    /// then rename over the real path. A crash mid-write leaves the old
    /// state intact.
    pub fn save(&self, map: &IndexMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string(map).map_err(StateError::Serialize)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StateError::FileWrite {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| StateError::FileWrite {
            path: self.path.clone(),
            source: e,
        })?;

        log::debug!("State saved to {:?}", self.path);
        Ok(())
    }

    /// State-map key for a 0-based workspace number.
    pub fn key_for(ws_num: usize) -> String {
        format!("ws{}", ws_num + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = tempdir().unwrap();
        let store = StateStore::new(temp_dir.path().join("indexes.json"));

        let mut map = IndexMap::new();
        map.insert("ws1".to_string(), 3);
        map.insert("ws2".to_string(), 0);

        store.save(&map).unwrap();
        assert_eq!(store.load(), map);

        // A second store over the same path sees the same state, as a
        // restarted daemon would.
        let reopened = StateStore::new(store.path().to_path_buf());
        assert_eq!(reopened.load(), map);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let store = StateStore::new(temp_dir.path().join("nonexistent.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("indexes.json");
        fs::write(&path, "{not json").unwrap();

        let store = StateStore::new(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = tempdir().unwrap();
        let store = StateStore::new(temp_dir.path().join("deep").join("indexes.json"));

        let mut map = IndexMap::new();
        map.insert("ws1".to_string(), 1);
        store.save(&map).unwrap();

        assert_eq!(store.load(), map);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp_dir = tempdir().unwrap();
        let store = StateStore::new(temp_dir.path().join("indexes.json"));
        store.save(&IndexMap::new()).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("indexes.json")]);
    }

    #[test]
    fn test_key_for() {
        assert_eq!(StateStore::key_for(0), "ws1");
        assert_eq!(StateStore::key_for(3), "ws4");
    }
}
