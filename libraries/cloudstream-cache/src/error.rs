use cloudstream_core::CloudstreamError;
use thiserror::Error;

/// Errors that can occur while reading, writing or filling the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Index could not be written
    #[error("Index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Download request failed
    #[error("Download failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("Download failed ({status}): {message}")]
    Http { status: u16, message: String },
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<CacheError> for CloudstreamError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Io(e) => CloudstreamError::Io(e),
            CacheError::Request(e) => CloudstreamError::network(e.to_string()),
            CacheError::Http { .. } => CloudstreamError::network(err.to_string()),
            CacheError::Serialization(e) => CloudstreamError::storage(e.to_string()),
        }
    }
}
