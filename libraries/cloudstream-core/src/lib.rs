//! Cloudstream Player Core
//!
//! Platform-agnostic domain types and error handling shared by every
//! Cloudstream Player crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, the derived aggregates
//!   (`ArtistInfo`, `AlbumInfo`, `GenreInfo`, `YearInfo`), the library
//!   document served by the CDN, and cloud account/file types
//! - **Identifiers**: `TrackId`, `PlaylistId`
//! - **Error Handling**: Unified `CloudstreamError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cloudstream_core::types::{Playlist, Track, TrackId};
//!
//! let track = Track::new(TrackId::from_path("/music/song.mp3"), "My Favorite Song");
//! assert_eq!(track.artist, "Unknown Artist");
//!
//! let playlist = Playlist::new("Favs").with_tracks(vec![track.id.clone()]);
//! assert_eq!(playlist.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CloudstreamError, Result};

pub use types::{
    // Library content
    format_duration, LibraryDocument, PlayableSource, Playlist, PlaylistId, PlaylistRecord, Track,
    TrackId, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_GENRE,
    // Derived aggregates
    AlbumInfo, ArtistInfo, GenreInfo, YearInfo,
    // Cloud
    CloudAccount, CloudProvider, FileEntry,
};
