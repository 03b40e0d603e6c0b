//! Error types shared across the treeline crates.

use thiserror::Error;

/// Errors that can occur in core indexing operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The summarization oracle rejected a request.
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// A document store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A path was outside the workspace or otherwise malformed.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for core indexing operations.
pub type Result<T> = std::result::Result<T, Error>;
