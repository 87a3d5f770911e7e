//! Error types for the download pipeline.

use thiserror::Error;

/// Errors raised while syncing attachments.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The HTTP request could not be sent or its body not read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A download manifest or API response could not be (de)serialized.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// The Drive source has no file with this ID.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The semaphore bounding concurrent downloads was closed.
    #[error("download slots closed")]
    Cancelled,
}

/// Result type for pipeline operations.
pub type SyncResult<T> = Result<T, SyncError>;
