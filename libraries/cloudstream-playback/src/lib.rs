//! Cloudstream Player - Playback Queue
//!
//! Platform-agnostic queue and transport state. This crate provides:
//! - A snapshot queue with a cursor ([`PlaybackQueue`])
//! - Repeat modes (Off, All, One)
//! - Shuffle of the upcoming tracks with order restore
//! - A controller state machine that pauses on errors instead of skipping
//!
//! No audio is decoded here; the platform calls back into
//! [`PlaybackController`] when a source loads, ends or fails.
//!
//! # Example
//!
//! ```rust
//! use cloudstream_core::{Track, TrackId};
//! use cloudstream_playback::{PlaybackController, PlaybackState, RepeatMode};
//!
//! let visible = vec![
//!     Track::new(TrackId::new("a"), "First"),
//!     Track::new(TrackId::new("b"), "Second"),
//! ];
//!
//! let mut player = PlaybackController::new();
//! player.set_repeat(RepeatMode::Off);
//! player.play_queue(visible, 0).unwrap();
//! player.on_track_loaded();
//! assert_eq!(player.state(), PlaybackState::Playing);
//!
//! player.on_playback_error("broken URL");
//! assert_eq!(player.state(), PlaybackState::Paused);
//! assert_eq!(player.current_track().unwrap().title, "First");
//! ```

pub mod controller;
pub mod error;
pub mod events;
pub mod queue;
pub mod shuffle;
pub mod types;

pub use controller::{PlaybackController, SubscriptionId, MAX_PENDING_EVENTS};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use queue::PlaybackQueue;
pub use types::{PlaybackState, QueuePosition, RepeatMode};
