//! Playback controller
//!
//! Drives the queue cursor and the transport state. Audio output lives
//! elsewhere: the platform reports progress back through
//! [`on_track_loaded`](PlaybackController::on_track_loaded),
//! [`on_track_ended`](PlaybackController::on_track_ended) and
//! [`on_playback_error`](PlaybackController::on_playback_error).

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::queue::PlaybackQueue;
use crate::types::{PlaybackState, RepeatMode};
use cloudstream_core::{Track, TrackId};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Undrained events kept for pull consumers; older ones are dropped first
pub const MAX_PENDING_EVENTS: usize = 256;

type Subscriber = Box<dyn FnMut(&PlaybackEvent) + Send>;

/// Handle returned by [`PlaybackController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct PlaybackController {
    queue: PlaybackQueue,
    state: PlaybackState,
    repeat: RepeatMode,
    last_error: Option<String>,

    pending_events: VecDeque<PlaybackEvent>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("queue", &self.queue.len())
            .field("state", &self.state)
            .field("repeat", &self.repeat)
            .field("shuffle", &self.queue.is_shuffled())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Subscribers =====

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackEvent) + Send + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Take events emitted since the last call.
    ///
    /// Only events emitted while no subscriber was registered are buffered,
    /// and at most the last [`MAX_PENDING_EVENTS`] of those.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.pending_events.drain(..).collect()
    }

    // ===== Playback Control =====

    /// Replace the queue with a snapshot and start loading `start`
    pub fn play_queue(&mut self, tracks: Vec<Track>, start: usize) -> Result<()> {
        if tracks.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }

        let previous = self.current_id();
        self.queue.set_queue(tracks, start)?;
        info!(tracks = self.queue.len(), start, "Queue replaced");

        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
        self.emit_track_changed(previous);
        self.set_state(PlaybackState::Loading);
        Ok(())
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        if self.queue.current().is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }

        match self.state {
            PlaybackState::Paused => {
                self.last_error = None;
                self.set_state(PlaybackState::Playing);
            }
            PlaybackState::Stopped => self.set_state(PlaybackState::Loading),
            PlaybackState::Playing | PlaybackState::Loading => {}
        }
        Ok(())
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state.is_active() {
            self.set_state(PlaybackState::Paused);
        }
    }

    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state.is_active() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Stop playback, keeping the queue and cursor
    pub fn stop(&mut self) {
        self.set_state(PlaybackState::Stopped);
    }

    /// Skip to the next track.
    ///
    /// Returns `false` at the end of the queue when repeat is off.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let previous = self.current_id();
        if self.queue.next(self.repeat.for_skip()).is_none() {
            return false;
        }
        self.emit_track_changed(previous);
        self.set_state(PlaybackState::Loading);
        true
    }

    /// Go to the previous track
    pub fn previous(&mut self) -> bool {
        let previous = self.current_id();
        if self.queue.previous(self.repeat).is_none() {
            return false;
        }
        self.emit_track_changed(previous);
        self.set_state(PlaybackState::Loading);
        true
    }

    /// Play the queue entry at `index`
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        let previous = self.current_id();
        self.queue.jump_to(index)?;
        self.emit_track_changed(previous);
        self.set_state(PlaybackState::Loading);
        Ok(())
    }

    // ===== Transport callbacks =====

    /// The transport started producing audio for the current track
    pub fn on_track_loaded(&mut self) {
        if self.state == PlaybackState::Loading {
            self.set_state(PlaybackState::Playing);
        }
    }

    /// The current track finished; advance per repeat mode.
    ///
    /// At the end of the queue with repeat off, playback stops and the
    /// cursor stays on the last track.
    pub fn on_track_ended(&mut self) {
        let previous = self.current_id();
        if self.queue.next(self.repeat).is_none() {
            debug!("Reached end of queue");
            self.set_state(PlaybackState::Stopped);
            return;
        }

        if self.current_id() != previous {
            self.emit_track_changed(previous);
        }
        self.set_state(PlaybackState::Loading);
    }

    /// The transport failed (unsupported codec, broken URL).
    ///
    /// Playback pauses on the failing track and never advances on its own,
    /// so one bad source cannot skip through the rest of the queue.
    pub fn on_playback_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(
            track = ?self.current_id().map(|id| id.to_string()),
            error = %message,
            "Playback error"
        );
        self.last_error = Some(message.clone());
        self.emit(PlaybackEvent::Error { message });
        self.set_state(PlaybackState::Paused);
    }

    // ===== Queue Management =====

    pub fn add_next(&mut self, track: Track) {
        let was_empty = self.queue.is_empty();
        self.queue.add_next(track);
        self.after_insert(was_empty);
    }

    pub fn add_to_end(&mut self, track: Track) {
        let was_empty = self.queue.is_empty();
        self.queue.add_to_end(track);
        self.after_insert(was_empty);
    }

    fn after_insert(&mut self, was_empty: bool) {
        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
        if was_empty {
            self.emit_track_changed(None);
        }
    }

    /// Remove a queue entry.
    ///
    /// Removing the playing track moves on to its successor; removing the
    /// last remaining track stops playback.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        let previous = self.current_id();
        let removed = self.queue.remove(index)?;

        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
        if self.current_id() != previous {
            self.emit_track_changed(previous);
            if self.queue.is_empty() {
                self.set_state(PlaybackState::Stopped);
            } else if self.state.is_active() {
                self.set_state(PlaybackState::Loading);
            }
        }
        Ok(removed)
    }

    pub fn clear(&mut self) {
        let previous = self.current_id();
        self.queue.clear();
        self.emit(PlaybackEvent::QueueChanged { length: 0 });
        if previous.is_some() {
            self.emit_track_changed(previous);
        }
        self.set_state(PlaybackState::Stopped);
    }

    // ===== Shuffle & Repeat =====

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat != mode {
            self.repeat = mode;
            self.emit(PlaybackEvent::RepeatChanged { mode });
        }
    }

    /// Off -> All -> One -> Off
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.set_repeat(self.repeat.cycle());
        self.repeat
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.queue.is_shuffled() == enabled {
            return;
        }
        if enabled {
            self.queue.enable_shuffle();
        } else {
            self.queue.disable_shuffle();
        }
        self.emit(PlaybackEvent::ShuffleChanged { enabled });
        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.set_shuffle(!self.queue.is_shuffled());
        self.queue.is_shuffled()
    }

    // ===== State Queries =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn is_shuffled(&self) -> bool {
        self.queue.is_shuffled()
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    /// Message of the last transport failure, cleared on resume
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ===== Events =====

    fn current_id(&self) -> Option<TrackId> {
        self.queue.current().map(|t| t.id.clone())
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Playback state changed");
            self.state = state;
            self.emit(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_track_changed(&mut self, previous_track_id: Option<TrackId>) {
        self.emit(PlaybackEvent::TrackChanged {
            track_id: self.current_id(),
            previous_track_id,
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        if !self.subscribers.is_empty() {
            for (_, subscriber) in &mut self.subscribers {
                subscriber(&event);
            }
            return;
        }
        if self.pending_events.len() == MAX_PENDING_EVENTS {
            self.pending_events.pop_front();
        }
        self.pending_events.push_back(event);
    }
}
