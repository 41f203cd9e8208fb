//! Shuffle for the upcoming part of a queue
//!
//! Fisher-Yates via `rand`. Tracks at or before the cursor keep their place so
//! the current track and the already-played history are undisturbed.

use cloudstream_core::Track;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Shuffle everything after `cursor` in place
pub fn shuffle_upcoming(tracks: &mut [Track], cursor: usize) {
    shuffle_upcoming_with(tracks, cursor, &mut thread_rng());
}

/// [`shuffle_upcoming`] with a caller-supplied generator
pub fn shuffle_upcoming_with<R: Rng + ?Sized>(tracks: &mut [Track], cursor: usize, rng: &mut R) {
    let from = cursor.saturating_add(1);
    if from < tracks.len() {
        tracks[from..].shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudstream_core::TrackId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(TrackId::new(format!("t{}", i)), format!("Track {}", i)))
            .collect()
    }

    fn ids(tracks: &[Track]) -> Vec<String> {
        tracks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn head_is_untouched() {
        let mut queue = tracks(20);
        let before = ids(&queue);

        shuffle_upcoming_with(&mut queue, 4, &mut StdRng::seed_from_u64(7));

        let after = ids(&queue);
        assert_eq!(after[..5], before[..5]);

        let mut tail_before = before[5..].to_vec();
        let mut tail_after = after[5..].to_vec();
        tail_before.sort();
        tail_after.sort();
        assert_eq!(tail_before, tail_after);
    }

    #[test]
    fn cursor_at_end_is_a_no_op() {
        let mut queue = tracks(3);
        let before = ids(&queue);
        shuffle_upcoming(&mut queue, 2);
        shuffle_upcoming(&mut queue, usize::MAX);
        assert_eq!(ids(&queue), before);
    }

    #[test]
    fn seeded_shuffle_reorders_long_tail() {
        let mut queue = tracks(50);
        let before = ids(&queue);
        shuffle_upcoming_with(&mut queue, 0, &mut StdRng::seed_from_u64(42));
        assert_ne!(ids(&queue), before);
    }
}
