/// Library document served by the CDN
use crate::types::{PlaylistRecord, Track};
use serde::{Deserialize, Deserializer, Serialize};

/// The whole-library JSON document
///
/// Every field is optional on the wire; `tracks` is the only one the
/// player cannot do without, and an absent list loads as an empty library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryDocument {
    /// Document format version (generators write either `"1.0.0"` or a number)
    #[serde(deserialize_with = "string_or_number")]
    pub version: Option<String>,

    /// Generation timestamp as written by the generator
    pub generated_at: Option<String>,

    /// Track count claimed by the generator
    pub total_tracks: Option<usize>,

    pub tracks: Vec<Track>,

    pub playlists: Vec<PlaylistRecord>,
}

impl LibraryDocument {
    /// Build a document around a track list
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self {
            total_tracks: Some(tracks.len()),
            tracks,
            ..Self::default()
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
