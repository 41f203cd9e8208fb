/// CLI error types
use cloudstream_cache::CacheError;
use cloudstream_cloud::CloudError;
use cloudstream_library::LibraryError;
use cloudstream_metadata::MetadataError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
