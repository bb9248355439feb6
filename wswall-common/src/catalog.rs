use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Sort key for sequential rotation. All sorts are stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "name_az")]
    NameAz,
    #[serde(rename = "name_za")]
    NameZa,
    #[serde(rename = "name_old")]
    NameOld,
    #[serde(rename = "name_new")]
    NameNew,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::NameAz => write!(f, "name_az"),
            SortOrder::NameZa => write!(f, "name_za"),
            SortOrder::NameOld => write!(f, "name_old"),
            SortOrder::NameNew => write!(f, "name_new"),
        }
    }
}

pub struct ImageCatalog;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

impl ImageCatalog {
    /// List eligible image files directly inside `folder`.
    ///
    /// A missing or non-directory folder yields an empty list, never an
    /// error: rotation simply becomes a no-op until images appear.
    pub fn scan(folder: &Path) -> Vec<PathBuf> {
        if !folder.is_dir() {
            log::debug!("Wallpaper folder missing or not a directory: {:?}", folder);
            return Vec::new();
        }

        let mut images = Vec::new();
        for entry in WalkDir::new(folder)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                images.push(path.to_path_buf());
            }
        }
        images
    }

    /// Stable sort by the given key. Files with an unreadable mtime sort
    /// as if modified at the epoch.
    pub fn sort(images: &mut [PathBuf], order: SortOrder) {
        match order {
            SortOrder::NameAz => images.sort_by_key(|p| lowercase_name(p)),
            SortOrder::NameZa => images.sort_by(|a, b| lowercase_name(b).cmp(&lowercase_name(a))),
            SortOrder::NameOld => images.sort_by_key(|p| mtime(p)),
            SortOrder::NameNew => images.sort_by(|a, b| mtime(b).cmp(&mtime(a))),
        }
    }
}

fn lowercase_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn mtime(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
