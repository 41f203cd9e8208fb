//! Playback Events
//!
//! Emitted by [`PlaybackController`](crate::PlaybackController) after every
//! mutation so the UI can follow state, track and queue changes without
//! polling.

use crate::types::{PlaybackState, RepeatMode};
use cloudstream_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// The track under the cursor changed
    #[serde(rename_all = "camelCase")]
    TrackChanged {
        /// ID of the new current track, `None` when the queue emptied
        track_id: Option<TrackId>,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Queue changed (replaced, tracks added or removed, reshuffled)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Repeat mode changed
    RepeatChanged { mode: RepeatMode },

    /// Shuffle toggled
    ShuffleChanged { enabled: bool },

    /// The transport reported a failure; playback is paused
    Error {
        /// Error message
        message: String,
    },
}
