//! Error types for playback management

use cloudstream_core::CloudstreamError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is under the cursor
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (queue length {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

impl From<PlaybackError> for CloudstreamError {
    fn from(err: PlaybackError) -> Self {
        CloudstreamError::invalid_input(err.to_string())
    }
}
