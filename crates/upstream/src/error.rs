//! Upstream error types.

use thiserror::Error;

/// Errors that can occur when calling the metadata API.
///
/// None of the variants carry the request URL, so the API key cannot
/// leak through `Display` or `Debug`.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The HTTP client could not be constructed.
    #[error("Client configuration error: {0}")]
    Config(String),

    /// The API answered with a non-success status.
    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, timeout or other transport failure.
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// The API answered 2xx but the body was not JSON.
    #[error("Upstream response decode error: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Config(_) => "config",
            UpstreamError::Status { .. } => "status",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Decode(_) => "decode",
        }
    }
}

/// Result type for upstream operations.
pub type Result<T> = std::result::Result<T, UpstreamError>;
