//! Settings error types.

use thiserror::Error;

/// Convenience result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Failure while loading or parsing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file contained invalid JSON or the wrong shape.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
