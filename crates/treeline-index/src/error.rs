//! Error types for index construction and maintenance.

use thiserror::Error;

/// Errors that can occur while building or maintaining the index.
#[derive(Error, Debug)]
pub enum Error {
    /// Core data-model, store, or oracle error.
    #[error(transparent)]
    Core(#[from] treeline_core::Error),

    /// Watcher error.
    #[error(transparent)]
    Watch(#[from] treeline_watch::Error),

    /// IO error during scanning or file reads.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;
