//! Error types for the library crate.

use cloudstream_core::CloudstreamError;
use thiserror::Error;

/// Errors raised while loading or persisting library state.
///
/// Aggregation, filtering and playlist mutations never fail; only the
/// catalog fetch and the state file can.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Catalog endpoint answered with a non-success status
    #[error("Library request failed ({status}): {message}")]
    Http { status: u16, message: String },

    /// Catalog document could not be parsed
    #[error("Failed to parse library document: {0}")]
    Parse(String),

    /// Invalid library URL
    #[error("Invalid library URL: {0}")]
    InvalidUrl(String),

    /// IO error on the state file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// State file serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;

impl From<LibraryError> for CloudstreamError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Io(e) => CloudstreamError::Io(e),
            LibraryError::Serialization(e) => CloudstreamError::Serialization(e),
            LibraryError::InvalidUrl(msg) => CloudstreamError::InvalidInput(msg),
            LibraryError::Request(e) => CloudstreamError::Network(e.to_string()),
            other => CloudstreamError::Load(other.to_string()),
        }
    }
}
