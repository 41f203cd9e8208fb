//! Snapshot queue with a cursor
//!
//! ```text
//! tracks:  [A] [B] [C] [D] [E]
//!                   ^
//!                 index        up_next = [D, E]
//! ```
//!
//! The queue owns copies of its tracks. Filtering or reloading the library
//! afterwards never changes what is queued.

use crate::error::{PlaybackError, Result};
use crate::shuffle::shuffle_upcoming;
use crate::types::{QueuePosition, RepeatMode};
use cloudstream_core::{Track, TrackId};

#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    tracks: Vec<Track>,
    index: usize,

    /// Unshuffled order, kept only while shuffle is on
    original: Option<Vec<Track>>,
}

impl PlaybackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a snapshot and put the cursor on `start`.
    ///
    /// An empty snapshot clears the queue. When shuffle is on, the tracks
    /// after `start` are shuffled and the given order is kept for restoring.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start: usize) -> Result<()> {
        if tracks.is_empty() {
            self.clear();
            return Ok(());
        }
        if start >= tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index: start,
                len: tracks.len(),
            });
        }

        let shuffled = self.is_shuffled();
        self.tracks = tracks;
        self.index = start;
        self.original = None;
        if shuffled {
            self.enable_shuffle();
        }
        Ok(())
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    pub fn current_index(&self) -> Option<usize> {
        (self.index < self.tracks.len()).then_some(self.index)
    }

    /// Advance the cursor after a track ends.
    ///
    /// - `Off`: moves forward, `None` at the end (cursor unchanged)
    /// - `All`: wraps from the last track to the first
    /// - `One`: stays on the current track
    pub fn next(&mut self, repeat: RepeatMode) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        match repeat {
            RepeatMode::One => {}
            RepeatMode::All => self.index = (self.index + 1) % self.tracks.len(),
            RepeatMode::Off => {
                if self.index + 1 >= self.tracks.len() {
                    return None;
                }
                self.index += 1;
            }
        }
        self.tracks.get(self.index)
    }

    /// Step the cursor back.
    ///
    /// At the first track this wraps to the last under `All` and otherwise
    /// returns `None` without moving.
    pub fn previous(&mut self, repeat: RepeatMode) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }

        if self.index > 0 {
            self.index -= 1;
        } else if repeat == RepeatMode::All {
            self.index = self.tracks.len() - 1;
        } else {
            return None;
        }
        self.tracks.get(self.index)
    }

    pub fn has_next(&self, repeat: RepeatMode) -> bool {
        match repeat {
            RepeatMode::Off => self.index + 1 < self.tracks.len(),
            RepeatMode::All | RepeatMode::One => !self.tracks.is_empty(),
        }
    }

    /// Move the cursor to `index`
    pub fn jump_to(&mut self, index: usize) -> Result<&Track> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.tracks.len(),
            });
        }
        self.index = index;
        Ok(&self.tracks[index])
    }

    /// Insert right after the current track
    pub fn add_next(&mut self, track: Track) {
        if self.tracks.is_empty() {
            self.push_first(track);
            return;
        }

        if let Some(original) = self.original.as_mut() {
            let at = self
                .tracks
                .get(self.index)
                .and_then(|cur| original.iter().position(|t| t.id == cur.id))
                .map_or(original.len(), |p| p + 1);
            original.insert(at, track.clone());
        }
        self.tracks.insert(self.index + 1, track);
    }

    /// Append to the end of the queue
    pub fn add_to_end(&mut self, track: Track) {
        if self.tracks.is_empty() {
            self.push_first(track);
            return;
        }

        if let Some(original) = self.original.as_mut() {
            original.push(track.clone());
        }
        self.tracks.push(track);
    }

    fn push_first(&mut self, track: Track) {
        if let Some(original) = self.original.as_mut() {
            original.clear();
            original.push(track.clone());
        }
        self.tracks.push(track);
        self.index = 0;
    }

    /// Remove the track at `index`.
    ///
    /// Removing before the cursor shifts it back so it keeps pointing at the
    /// same track. Removing the current track leaves the cursor on its
    /// successor, or on the new last track.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.tracks.len(),
            });
        }

        let removed = self.tracks.remove(index);
        if let Some(original) = self.original.as_mut() {
            if let Some(pos) = original.iter().position(|t| t.id == removed.id) {
                original.remove(pos);
            }
        }

        if index < self.index {
            self.index -= 1;
        } else if self.index >= self.tracks.len() {
            self.index = self.tracks.len().saturating_sub(1);
        }
        Ok(removed)
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.index = 0;
        if let Some(original) = self.original.as_mut() {
            original.clear();
        }
    }

    /// Tracks after the cursor
    pub fn up_next(&self) -> &[Track] {
        self.tracks.get(self.index + 1..).unwrap_or(&[])
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// "(index + 1) of len", `None` for an empty queue
    pub fn position(&self) -> Option<QueuePosition> {
        self.current_index().map(|index| QueuePosition {
            current: index + 1,
            total: self.tracks.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.id == id)
    }

    // ===== Shuffle =====

    pub fn is_shuffled(&self) -> bool {
        self.original.is_some()
    }

    /// Shuffle the upcoming tracks, remembering the current order.
    ///
    /// Calling it again while shuffled reshuffles what is left.
    pub fn enable_shuffle(&mut self) {
        if self.original.is_none() {
            self.original = Some(self.tracks.clone());
        }
        shuffle_upcoming(&mut self.tracks, self.index);
    }

    /// Restore the order from before shuffling, keeping the current track
    /// under the cursor.
    pub fn disable_shuffle(&mut self) {
        let Some(original) = self.original.take() else {
            return;
        };

        let current = self.current().map(|t| t.id.clone());
        self.tracks = original;
        self.index = current
            .and_then(|id| self.tracks.iter().position(|t| t.id == id))
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(TrackId::new(id), id.to_uppercase())
    }

    fn queue_of(ids: &[&str]) -> PlaybackQueue {
        let mut queue = PlaybackQueue::new();
        queue
            .set_queue(ids.iter().map(|id| track(id)).collect(), 0)
            .unwrap();
        queue
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    fn current_id(queue: &PlaybackQueue) -> Option<&str> {
        queue.current().map(|t| t.id.as_str())
    }

    #[test]
    fn create_empty_queue() {
        let queue = PlaybackQueue::new();
        assert!(queue.is_empty());
        assert!(queue.current().is_none());
        assert!(queue.position().is_none());
        assert!(queue.up_next().is_empty());
    }

    #[test]
    fn set_queue_is_a_snapshot() {
        let mut visible = vec![track("a"), track("b"), track("c")];
        let mut queue = PlaybackQueue::new();
        queue.set_queue(visible.clone(), 1).unwrap();

        visible.clear();
        assert_eq!(queue.len(), 3);
        assert_eq!(current_id(&queue), Some("b"));
        assert_eq!(queue.position().unwrap().to_string(), "2 of 3");
    }

    #[test]
    fn set_queue_rejects_bad_start() {
        let mut queue = PlaybackQueue::new();
        let err = queue.set_queue(vec![track("a")], 1).unwrap_err();
        assert!(matches!(err, PlaybackError::IndexOutOfBounds { index: 1, len: 1 }));
        assert!(queue.is_empty());
    }

    #[test]
    fn next_with_repeat_off_stops_at_end() {
        let mut queue = queue_of(&["a", "b"]);
        assert_eq!(queue.next(RepeatMode::Off).map(|t| t.id.as_str()), Some("b"));
        assert!(queue.next(RepeatMode::Off).is_none());
        assert_eq!(current_id(&queue), Some("b"));
    }

    #[test]
    fn next_with_repeat_all_wraps() {
        let mut queue = queue_of(&["a", "b"]);
        queue.next(RepeatMode::All);
        assert_eq!(queue.next(RepeatMode::All).map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn next_with_repeat_one_stays() {
        let mut queue = queue_of(&["a", "b"]);
        assert_eq!(queue.next(RepeatMode::One).map(|t| t.id.as_str()), Some("a"));
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn previous_at_start() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert!(queue.previous(RepeatMode::Off).is_none());
        assert_eq!(queue.previous(RepeatMode::All).map(|t| t.id.as_str()), Some("c"));
        assert_eq!(queue.previous(RepeatMode::Off).map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn add_next_goes_after_cursor() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to(1).unwrap();
        queue.add_next(track("x"));
        queue.add_to_end(track("z"));

        assert_eq!(ids(queue.tracks()), vec!["a", "b", "x", "c", "z"]);
        assert_eq!(ids(queue.up_next()), vec!["x", "c", "z"]);
    }

    #[test]
    fn adding_to_empty_queue_sets_cursor() {
        let mut queue = PlaybackQueue::new();
        queue.add_next(track("a"));
        assert_eq!(current_id(&queue), Some("a"));
    }

    #[test]
    fn remove_adjusts_cursor() {
        let mut queue = queue_of(&["a", "b", "c", "d"]);
        queue.jump_to(2).unwrap();

        // Before the cursor: same track stays current
        assert_eq!(queue.remove(0).unwrap().id.as_str(), "a");
        assert_eq!(current_id(&queue), Some("c"));

        // The current track: successor becomes current
        queue.remove(1).unwrap();
        assert_eq!(current_id(&queue), Some("d"));

        // The last track while current: cursor moves back
        queue.remove(1).unwrap();
        assert_eq!(current_id(&queue), Some("b"));

        queue.remove(0).unwrap();
        assert!(queue.current().is_none());
        assert!(queue.remove(0).is_err());
    }

    #[test]
    fn jump_out_of_bounds() {
        let mut queue = queue_of(&["a"]);
        assert!(queue.jump_to(3).is_err());
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn shuffle_keeps_current_and_restores_order() {
        let names: Vec<String> = (0..30).map(|i| format!("t{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut queue = queue_of(&refs);
        queue.jump_to(5).unwrap();

        queue.enable_shuffle();
        assert!(queue.is_shuffled());
        assert_eq!(current_id(&queue), Some("t5"));
        assert_eq!(ids(&queue.tracks()[..6]), refs[..6].to_vec());

        queue.next(RepeatMode::Off);
        let now_playing = current_id(&queue).map(str::to_string);

        queue.disable_shuffle();
        assert!(!queue.is_shuffled());
        assert_eq!(ids(queue.tracks()), refs);
        assert_eq!(current_id(&queue).map(str::to_string), now_playing);
    }

    #[test]
    fn edits_while_shuffled_survive_restore() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.enable_shuffle();
        queue.add_to_end(track("z"));
        queue.add_next(track("x"));
        let last = queue.len() - 1;
        assert_eq!(queue.remove(last).unwrap().id.as_str(), "z");

        queue.disable_shuffle();
        assert_eq!(ids(queue.tracks()), vec!["a", "x", "b", "c"]);
        assert_eq!(current_id(&queue), Some("a"));
    }

    #[test]
    fn new_snapshot_reshuffles_when_enabled() {
        let mut queue = queue_of(&["a", "b"]);
        queue.enable_shuffle();
        queue.set_queue(vec![track("p"), track("q"), track("r")], 0).unwrap();

        assert!(queue.is_shuffled());
        assert_eq!(current_id(&queue), Some("p"));
        queue.disable_shuffle();
        assert_eq!(ids(queue.tracks()), vec!["p", "q", "r"]);
    }

    #[test]
    fn clear_queue() {
        let mut queue = queue_of(&["a", "b"]);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.next(RepeatMode::All).is_none());
    }
}
