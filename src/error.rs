//! Error handling module for extdeploy
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Every deploy step returns these types so the CLI can map them to exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the deploy procedure
#[derive(Error, Debug)]
pub enum DeployError {
    /// IO errors without a meaningful path attached
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem operation failed on a specific path
    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be opened or read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The archive does not contain the payload subfolder
    #[error("'{subfolder}' folder not found in archive!")]
    MissingSubfolder { subfolder: String, scratch: PathBuf },

    /// Configuration errors (loading, parsing, resolving)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (names, paths)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Extension manifest could not be used to derive a target name
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for deploy operations
pub type Result<T> = std::result::Result<T, DeployError>;

// Convenient error constructors
impl DeployError {
    /// Build a `map_err` adapter that tags an IO error with the action and path
    pub fn fs(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Filesystem {
            action,
            path,
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a manifest error
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }

    /// True for the one failure the procedure detects and reports on purpose
    pub fn is_missing_subfolder(&self) -> bool {
        matches!(self, Self::MissingSubfolder { .. })
    }
}
