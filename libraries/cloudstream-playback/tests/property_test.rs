//! Property-based tests for the playback queue
//!
//! Random operation sequences must never leave the cursor dangling or lose
//! tracks across a shuffle round trip.

use cloudstream_core::{Track, TrackId};
use cloudstream_playback::{PlaybackController, PlaybackQueue, PlaybackState, RepeatMode};
use proptest::prelude::*;

// ===== Helpers =====

fn queue_tracks(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| Track::new(TrackId::new(format!("t{}", i)), format!("Track {}", i)))
        .collect()
}

fn ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.id.to_string()).collect()
}

fn arbitrary_repeat() -> impl Strategy<Value = RepeatMode> {
    prop_oneof![
        Just(RepeatMode::Off),
        Just(RepeatMode::All),
        Just(RepeatMode::One),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Next(RepeatMode),
    Previous(RepeatMode),
    Jump(usize),
    AddNext,
    AddToEnd,
    Remove(usize),
    ToggleShuffle,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arbitrary_repeat().prop_map(Op::Next),
        arbitrary_repeat().prop_map(Op::Previous),
        (0usize..60).prop_map(Op::Jump),
        Just(Op::AddNext),
        Just(Op::AddToEnd),
        (0usize..60).prop_map(Op::Remove),
        Just(Op::ToggleShuffle),
    ]
}

// ===== Property Tests =====

proptest! {
    /// Property: the cursor always points at a track unless the queue is empty
    #[test]
    fn cursor_stays_in_bounds(
        len in 1usize..40,
        start_frac in 0.0f64..1.0,
        ops in prop::collection::vec(arbitrary_op(), 1..60),
    ) {
        let start = ((len as f64) * start_frac) as usize;
        let mut queue = PlaybackQueue::new();
        queue.set_queue(queue_tracks(len), start.min(len - 1)).unwrap();
        let mut extra = 0;

        for op in ops {
            match op {
                Op::Next(mode) => { queue.next(mode); }
                Op::Previous(mode) => { queue.previous(mode); }
                Op::Jump(i) => { let _ = queue.jump_to(i); }
                Op::AddNext => {
                    extra += 1;
                    queue.add_next(Track::new(TrackId::new(format!("x{}", extra)), "Extra"));
                }
                Op::AddToEnd => {
                    extra += 1;
                    queue.add_to_end(Track::new(TrackId::new(format!("x{}", extra)), "Extra"));
                }
                Op::Remove(i) => { let _ = queue.remove(i); }
                Op::ToggleShuffle => {
                    if queue.is_shuffled() { queue.disable_shuffle() } else { queue.enable_shuffle() }
                }
            }

            match queue.current_index() {
                Some(i) => prop_assert!(i < queue.len()),
                None => prop_assert!(queue.is_empty()),
            }
            prop_assert_eq!(queue.up_next().len(), queue.len().saturating_sub(queue.current_index().map_or(queue.len(), |i| i + 1)));
        }
    }

    /// Property: shuffle then unshuffle restores the exact order and current track
    #[test]
    fn shuffle_round_trip_restores_order(len in 1usize..60, cursor_frac in 0.0f64..1.0, steps in 0usize..10) {
        let tracks = queue_tracks(len);
        let cursor = (((len as f64) * cursor_frac) as usize).min(len - 1);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(tracks.clone(), cursor).unwrap();

        queue.enable_shuffle();
        prop_assert_eq!(ids(&queue.tracks()[..=cursor]), ids(&tracks[..=cursor]));

        for _ in 0..steps {
            queue.next(RepeatMode::All);
        }
        let playing = queue.current().map(|t| t.id.clone());

        queue.disable_shuffle();
        prop_assert_eq!(ids(queue.tracks()), ids(&tracks));
        prop_assert_eq!(queue.current().map(|t| t.id.clone()), playing);
    }

    /// Property: with repeat off, track ends visit every remaining track once, then stop
    #[test]
    fn repeat_off_plays_to_the_end(len in 1usize..50, start_frac in 0.0f64..1.0) {
        let start = (((len as f64) * start_frac) as usize).min(len - 1);
        let mut controller = PlaybackController::new();
        controller.play_queue(queue_tracks(len), start).unwrap();

        let mut played = vec![controller.current_track().map(|t| t.id.to_string())];
        while controller.state() != PlaybackState::Stopped {
            controller.on_track_loaded();
            controller.on_track_ended();
            if controller.state() != PlaybackState::Stopped {
                played.push(controller.current_track().map(|t| t.id.to_string()));
            }
        }

        prop_assert_eq!(played.len(), len - start);
    }

    /// Property: a playback error never moves the cursor, whatever the repeat mode
    #[test]
    fn errors_never_advance(len in 1usize..30, repeat in arbitrary_repeat(), errors in 1usize..5) {
        let mut controller = PlaybackController::new();
        controller.set_repeat(repeat);
        controller.play_queue(queue_tracks(len), 0).unwrap();

        for _ in 0..errors {
            controller.on_playback_error("decode failure");
        }

        prop_assert_eq!(controller.state(), PlaybackState::Paused);
        prop_assert_eq!(controller.queue().current_index(), Some(0));
    }
}
