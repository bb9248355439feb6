pub mod catalog;
pub mod command;
pub mod error;
pub mod probe;
pub mod session;
pub mod state;
pub mod telemetry;

pub use catalog::{ImageCatalog, SortOrder};
pub use error::{Result, WswallError};
pub use probe::DesktopProbe;
pub use session::{DesktopEnv, SessionSettings, SessionType};
pub use state::{IndexMap, StateStore};
pub use telemetry::{TelemetrySnapshot, TelemetryWriter};

/// Policy governing which image follows the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    #[default]
    Random,
    Sequential,
}

impl std::fmt::Display for RotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationMode::Random => write!(f, "random"),
            RotationMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// How an image is fit to the screen. Each backend maps this to its own
/// native representation; the mapping never leaks out of the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    Centered,
    #[default]
    Scaled,
    Zoomed,
}

impl std::fmt::Display for Scaling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scaling::Centered => write!(f, "centered"),
            Scaling::Scaled => write!(f, "scaled"),
            Scaling::Zoomed => write!(f, "zoomed"),
        }
    }
}
