/// Metadata-specific errors
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File or folder not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Tag parsing error
    #[error("Tag parsing error: {0}")]
    ParseError(String),

    /// Blocking read task panicked or was cancelled
    #[error("Scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Lofty error
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

impl From<MetadataError> for cloudstream_core::CloudstreamError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::Io(e) => cloudstream_core::CloudstreamError::Io(e),
            other => cloudstream_core::CloudstreamError::metadata(other.to_string()),
        }
    }
}
