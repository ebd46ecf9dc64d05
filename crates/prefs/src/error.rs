//! Preference store error types.

use thiserror::Error;

/// Errors that can occur when reading or mutating preferences.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied input was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mapping could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for preference store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
