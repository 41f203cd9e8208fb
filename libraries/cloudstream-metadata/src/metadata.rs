//! Tag values read from a file and their conversion into library tracks.

use cloudstream_core::{Track, TrackId};
use std::path::Path;

/// Format label used when a file has no extension
const FALLBACK_FORMAT: &str = "AUDIO";

/// Everything read from one audio file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,

    /// Duration in seconds
    pub duration: f64,

    /// Bitrate in kbps
    pub bitrate: Option<u32>,

    /// Sample rate in Hz
    pub sample_rate: Option<u32>,

    /// Upper-case extension, e.g. `FLAC`
    pub format: String,

    /// Embedded picture as a `data:` URI
    pub artwork: Option<String>,
}

impl TrackMetadata {
    /// What a file yields when its tags cannot be read: the file stem as
    /// title and nothing else
    pub fn stub(path: &Path) -> Self {
        Self {
            title: file_stem(path),
            format: format_label(path),
            ..Self::default()
        }
    }
}

/// Build a library track for the file at `path`.
///
/// The id is derived from the path so re-importing the same file yields the
/// same track.
pub fn track_from_metadata(path: &Path, metadata: TrackMetadata) -> Track {
    let path_str = path.to_string_lossy();
    let title = metadata
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| file_stem(path))
        .unwrap_or_else(|| "Unknown".to_string());

    let mut track = Track::new(TrackId::from_path(path_str.as_ref()), title);
    if let Some(artist) = metadata.artist.filter(|a| !a.trim().is_empty()) {
        track.artist = artist;
    }
    if let Some(album) = metadata.album.filter(|a| !a.trim().is_empty()) {
        track.album = album;
    }
    track.genre = metadata.genre.filter(|g| !g.trim().is_empty());
    track.year = metadata.year.filter(|&y| y > 0);
    track.track_number = metadata.track_number.filter(|&n| n > 0);
    track.disc_number = metadata.disc_number.filter(|&n| n > 0);
    track.duration = metadata.duration;
    track.bitrate = metadata.bitrate;
    track.sample_rate = metadata.sample_rate;
    track.format = Some(metadata.format);
    track.artwork = metadata.artwork;
    track.file_path = Some(path_str.into_owned());
    track
}

pub(crate) fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn format_label(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| FALLBACK_FORMAT.to_string())
}
