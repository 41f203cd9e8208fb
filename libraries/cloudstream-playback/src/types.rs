//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing playing, cursor may still point at a track
    #[default]
    Stopped,

    /// Source requested, waiting for the transport
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track, or halted after a playback error
    Paused,
}

impl PlaybackState {
    /// Playing or about to play
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Loading)
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Off -> All -> One -> Off, the order of the repeat button
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Mode applied to a manual skip.
    ///
    /// Skipping always leaves the current track, so `One` behaves like `Off`.
    pub fn for_skip(self) -> Self {
        match self {
            Self::One => Self::Off,
            other => other,
        }
    }
}

/// One-based cursor position for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePosition {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for QueuePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.current, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_cycles_through_all_modes() {
        assert_eq!(RepeatMode::Off.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::Off);
    }

    #[test]
    fn position_display() {
        let pos = QueuePosition {
            current: 3,
            total: 10,
        };
        assert_eq!(pos.to_string(), "3 of 10");
    }

    #[test]
    fn active_states() {
        assert!(PlaybackState::Playing.is_active());
        assert!(PlaybackState::Loading.is_active());
        assert!(!PlaybackState::Paused.is_active());
        assert!(!PlaybackState::Stopped.is_active());
    }
}
