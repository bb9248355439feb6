use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wswall operations
#[derive(Error, Debug)]
pub enum WswallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State persistence error: {0}")]
    State(#[from] StateError),

    #[error("Workspace probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Process execution error: {0}")]
    Process(#[from] ProcessError),

    #[error("Desktop backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Configuration-related errors. Missing file and an unusable workspace
/// count are fatal at startup; everything else degrades with a warning.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path:?}")]
    Missing { path: PathBuf },

    #[error("Failed to read configuration file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse configuration: {message}")]
    Parse { message: String },

    #[error("Invalid [general] workspaces count: {value}")]
    InvalidWorkspaceCount { value: i64 },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// State persistence errors. Reads are tolerant and never produce these;
/// only the write path can fail.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to write state file: {path:?}")]
    FileWrite { path: PathBuf, source: std::io::Error },

    #[error("Failed to serialize state")]
    Serialize(#[from] serde_json::Error),
}

/// Active-workspace query errors
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run workspace query: {source}")]
    Command { source: std::io::Error },

    #[error("Workspace query exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Could not parse workspace number from: {output:?}")]
    Parse { output: String },
}

/// External command errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Command execution failed: {command}")]
    Execution { command: String, source: std::io::Error },

    #[error("Command {command} returned non-zero exit code {code}: {stderr}")]
    NonZeroExit { command: String, code: i32, stderr: String },
}

/// Errors from editing a desktop environment's panel configuration files
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to read or write panel configuration: {path:?}")]
    PanelConfig { path: PathBuf, source: std::io::Error },

    #[error("Unexpected panel configuration format: {path:?}")]
    PanelConfigFormat { path: PathBuf },
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, WswallError>;
