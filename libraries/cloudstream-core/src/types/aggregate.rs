/// Derived browse aggregates
///
/// Computed from the catalog on demand and never persisted.
use crate::types::Track;
use serde::Serialize;

/// Artist with track and distinct-album counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistInfo {
    pub name: String,
    pub track_count: usize,
    pub album_count: usize,
}

/// Album keyed by `(album, artist)`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInfo {
    pub name: String,
    pub artist: String,

    /// First non-empty year among member tracks
    pub year: Option<u32>,

    /// First non-empty artwork reference among member tracks
    pub artwork: Option<String>,

    pub track_count: usize,

    /// Member tracks in catalog order
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreInfo {
    pub name: String,
    pub track_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearInfo {
    pub year: u32,
    pub track_count: usize,
}
