/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Artist used when a track carries no artist
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Album used when a track carries no album
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Genre bucket for tracks without a genre
pub const UNKNOWN_GENRE: &str = "Unknown";

const UNKNOWN_TITLE: &str = "Unknown";

/// Audio track as it appears in the library document
///
/// Deserialization goes through [`RawTrack`] so that missing, `null` and empty
/// values all normalise to the same defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTrack")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name, `"Unknown Artist"` when the source had none
    pub artist: String,

    /// Album name, `"Unknown Album"` when the source had none
    pub album: String,

    /// Genre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    /// Release year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,

    /// Track number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,

    /// Disc number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u32>,

    /// Duration in seconds
    pub duration: f64,

    /// Bitrate in kbps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,

    /// Sample rate in Hz
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Container/codec label (e.g. `MP3`, `FLAC`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Embedded artwork as a data URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,

    /// Remote artwork URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,

    /// Local file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// CDN stream URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,

    /// Direct file URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// Dropbox shared link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropbox_link: Option<String>,
}

/// Where a track can be played from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayableSource {
    /// CDN stream URL
    Stream(String),
    /// Direct file URL
    FileUrl(String),
    /// Dropbox shared link
    Dropbox(String),
    /// Local file path
    Local(String),
}

impl PlayableSource {
    /// The locator string regardless of kind
    pub fn locator(&self) -> &str {
        match self {
            Self::Stream(s) | Self::FileUrl(s) | Self::Dropbox(s) | Self::Local(s) => s,
        }
    }
}

impl Track {
    /// Create a track with only an id and title; everything else defaulted
    pub fn new(id: TrackId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            genre: None,
            year: None,
            track_number: None,
            disc_number: None,
            duration: 0.0,
            bitrate: None,
            sample_rate: None,
            format: None,
            artwork: None,
            artwork_url: None,
            file_path: None,
            stream_url: None,
            file_url: None,
            dropbox_link: None,
        }
    }

    /// Builder-style artist setter
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = non_empty(Some(artist.into())).unwrap_or_else(|| UNKNOWN_ARTIST.into());
        self
    }

    /// Builder-style album setter
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = non_empty(Some(album.into())).unwrap_or_else(|| UNKNOWN_ALBUM.into());
        self
    }

    /// Builder-style genre setter
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = non_empty(Some(genre.into()));
        self
    }

    /// Builder-style year setter (0 means no year)
    #[must_use]
    pub fn with_year(mut self, year: u32) -> Self {
        self.year = (year != 0).then_some(year);
        self
    }

    /// Builder-style duration setter, in seconds
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = if seconds.is_finite() && seconds > 0.0 { seconds } else { 0.0 };
        self
    }

    /// Artwork reference to display: the remote URL wins over embedded artwork
    pub fn artwork_ref(&self) -> Option<&str> {
        self.artwork_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.artwork.as_deref().filter(|s| !s.is_empty()))
    }

    /// Resolve the source the player should open
    ///
    /// Priority: stream URL, file URL, Dropbox link, local path.
    pub fn source(&self) -> Option<PlayableSource> {
        let pick = |s: &Option<String>| s.as_ref().filter(|s| !s.is_empty()).cloned();

        pick(&self.stream_url)
            .map(PlayableSource::Stream)
            .or_else(|| pick(&self.file_url).map(PlayableSource::FileUrl))
            .or_else(|| pick(&self.dropbox_link).map(PlayableSource::Dropbox))
            .or_else(|| pick(&self.file_path).map(PlayableSource::Local))
    }

    /// Genre with the `"Unknown"` bucket applied
    pub fn genre_or_unknown(&self) -> &str {
        self.genre.as_deref().unwrap_or(UNKNOWN_GENRE)
    }
}

/// Format a duration in seconds as `m:ss`, or `h:mm:ss` past an hour
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn positive(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.round() as u32)
}

/// Wire form of a track, before defaults are applied
///
/// Numbers are read as `f64` so that documents written by tools which emit
/// `320.0` for a bitrate still load.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTrack {
    id: Option<TrackId>,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    genre: Option<String>,
    year: Option<f64>,
    track_number: Option<f64>,
    disc_number: Option<f64>,
    duration: Option<f64>,
    bitrate: Option<f64>,
    sample_rate: Option<f64>,
    format: Option<String>,
    artwork: Option<String>,
    artwork_url: Option<String>,
    file_path: Option<String>,
    stream_url: Option<String>,
    file_url: Option<String>,
    dropbox_link: Option<String>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let file_path = non_empty(raw.file_path);
        let stream_url = non_empty(raw.stream_url);
        let file_url = non_empty(raw.file_url);
        let dropbox_link = non_empty(raw.dropbox_link);

        let id = raw
            .id
            .filter(|id| !id.as_str().is_empty())
            .or_else(|| {
                stream_url
                    .as_ref()
                    .or(file_path.as_ref())
                    .or(file_url.as_ref())
                    .or(dropbox_link.as_ref())
                    .map(TrackId::from_path)
            })
            .unwrap_or_else(TrackId::generate);

        let title = non_empty(raw.title)
            .or_else(|| file_path.as_deref().and_then(file_stem))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        Self {
            id,
            title,
            artist: non_empty(raw.artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: non_empty(raw.album).unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            genre: non_empty(raw.genre),
            year: positive(raw.year),
            track_number: positive(raw.track_number),
            disc_number: positive(raw.disc_number),
            duration: raw
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(0.0),
            bitrate: positive(raw.bitrate),
            sample_rate: positive(raw.sample_rate),
            format: non_empty(raw.format),
            artwork: non_empty(raw.artwork),
            artwork_url: non_empty(raw.artwork_url),
            file_path,
            stream_url,
            file_url,
            dropbox_link,
        }
    }
}

fn file_stem(path: &str) -> Option<String> {
    std::path::Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}
