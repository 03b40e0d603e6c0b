//! Error types for the watching subsystem.

use thiserror::Error;

/// Errors that can occur while watching a workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// File system watching error from the backend.
    #[error("File watching error: {0}")]
    Watch(String),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ignore pattern compilation error.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The watcher is not running.
    #[error("Watcher is not running")]
    NotRunning,

    /// The watcher is already running.
    #[error("Watcher is already running")]
    AlreadyRunning,

    /// Internal channel error.
    #[error("Channel error: {0}")]
    Channel(String),
}

/// Result type for watching operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err.to_string())
    }
}

impl From<globset::Error> for Error {
    fn from(err: globset::Error) -> Self {
        Error::Pattern(err.to_string())
    }
}
