//! Error types for cloud provider access.

use cloudstream_core::{CloudProvider, CloudstreamError};
use thiserror::Error;

/// Errors that can occur when talking to a storage provider.
///
/// Browsing code turns these into empty listings; the OAuth flow returns
/// them to the caller.
#[derive(Error, Debug)]
pub enum CloudError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider returned an error response
    #[error("Provider error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Failed to parse provider response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid base or endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Provider has no OAuth configuration
    #[error("{0} does not use OAuth")]
    UnsupportedProvider(CloudProvider),

    /// No client id configured for a provider
    #[error("Missing client id for {0}")]
    MissingClientId(CloudProvider),

    /// Authorization state unknown or already used
    #[error("Unknown or expired authorization state")]
    UnknownState,

    /// Account has no refresh token
    #[error("No refresh token for {0}")]
    MissingRefreshToken(CloudProvider),
}

/// Result type for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;

impl From<url::ParseError> for CloudError {
    fn from(err: url::ParseError) -> Self {
        CloudError::InvalidUrl(err.to_string())
    }
}

impl From<CloudError> for CloudstreamError {
    fn from(err: CloudError) -> Self {
        CloudstreamError::network(err.to_string())
    }
}
