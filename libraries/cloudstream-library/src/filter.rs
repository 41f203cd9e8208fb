//! Filter and sort engine producing the ordered track projection.

use crate::catalog::Catalog;
use crate::collate::fold_cmp;
use crate::playlists::PlaylistStore;
use cloudstream_core::{PlaylistId, Track};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Active browse view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    #[default]
    Songs,
    Artists,
    Albums,
    Genres,
    Years,
    NowPlaying,
    Playlist,
}

/// Field the track list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Title,
    Artist,
    Album,
    Year,
    Genre,
    Duration,
    Bitrate,
    TrackNumber,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        Self::Title,
        Self::Artist,
        Self::Album,
        Self::Year,
        Self::Genre,
        Self::Duration,
        Self::Bitrate,
        Self::TrackNumber,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Year => "year",
            Self::Genre => "genre",
            Self::Duration => "duration",
            Self::Bitrate => "bitrate",
            Self::TrackNumber => "trackNumber",
        }
    }

    /// Compare two tracks by this field, ascending.
    ///
    /// Strings compare case-insensitively; absent numbers compare as 0.
    fn compare(self, a: &Track, b: &Track) -> Ordering {
        fn num(v: Option<u32>) -> u32 {
            v.unwrap_or(0)
        }

        match self {
            Self::Title => fold_cmp(&a.title, &b.title),
            Self::Artist => fold_cmp(&a.artist, &b.artist),
            Self::Album => fold_cmp(&a.album, &b.album),
            Self::Genre => fold_cmp(
                a.genre.as_deref().unwrap_or(""),
                b.genre.as_deref().unwrap_or(""),
            ),
            Self::Year => num(a.year).cmp(&num(b.year)),
            Self::Bitrate => num(a.bitrate).cmp(&num(b.bitrate)),
            Self::TrackNumber => num(a.track_number).cmp(&num(b.track_number)),
            Self::Duration => a.duration.total_cmp(&b.duration),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s) || (s == "track" && *f == Self::TrackNumber))
            .ok_or_else(|| format!("unknown sort field: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// Sort key and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column-header toggle: same field while ascending flips to descending,
    /// anything else selects `field` ascending.
    pub fn toggle(&mut self, field: SortField) {
        self.direction = if self.field == field && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.field = field;
    }

    /// Stable in-place sort of `tracks`
    pub fn apply(&self, tracks: &mut [Track]) {
        let field = self.field;
        match self.direction {
            SortDirection::Asc => tracks.sort_by(|a, b| field.compare(a, b)),
            SortDirection::Desc => tracks.sort_by(|a, b| field.compare(b, a)),
        }
    }
}

/// Current search text, selections and view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    pub view: ViewKind,
    pub playlist_id: Option<PlaylistId>,
}

impl FilterState {
    /// Whether the playlist short-circuit is active
    pub fn is_playlist_mode(&self) -> bool {
        self.view == ViewKind::Playlist && self.playlist_id.is_some()
    }

    /// Whether `track` passes the search and selection predicates
    pub fn matches(&self, track: &Track) -> bool {
        self.matches_selection(track) && matches_search(track, &self.search.to_lowercase())
    }

    fn matches_selection(&self, track: &Track) -> bool {
        self.artist.as_ref().map_or(true, |a| &track.artist == a)
            && self.album.as_ref().map_or(true, |a| &track.album == a)
            && self
                .genre
                .as_ref()
                .map_or(true, |g| track.genre.as_ref() == Some(g))
            && self.year.map_or(true, |y| track.year == Some(y))
    }
}

/// Case-insensitive substring match over title, artist, album and genre.
///
/// `needle` must already be lower-cased; an empty needle matches everything.
fn matches_search(track: &Track, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let hit = |s: &str| s.to_lowercase().contains(needle);

    hit(&track.title)
        || hit(&track.artist)
        || hit(&track.album)
        || track.genre.as_deref().is_some_and(hit)
}

/// Produce the ordered track list for the current filter and sort.
///
/// In playlist mode the result is the selected playlist's tracks and the
/// search/selection predicates are not applied; an unknown playlist gives an
/// empty list.
pub fn filter_tracks(
    catalog: &Catalog,
    playlists: &PlaylistStore,
    filter: &FilterState,
    sort: &SortState,
) -> Vec<Track> {
    let mut result = match (&filter.playlist_id, filter.is_playlist_mode()) {
        (Some(id), true) => playlists.tracks(id, catalog),
        _ => {
            let needle = filter.search.to_lowercase();
            catalog
                .tracks()
                .iter()
                .filter(|t| filter.matches_selection(t) && matches_search(t, &needle))
                .cloned()
                .collect()
        }
    };

    sort.apply(&mut result);
    result
}
