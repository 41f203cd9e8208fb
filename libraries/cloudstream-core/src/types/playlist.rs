/// Playlist domain types
use crate::types::{PlaylistId, Track, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User playlist: an ordered list of track ids resolved against the catalog on read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Member tracks, in playlist order
    pub track_ids: Vec<TrackId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new, empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            track_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create a playlist with a specific ID (for loading persisted state)
    pub fn with_id(
        id: PlaylistId,
        name: impl Into<String>,
        track_ids: Vec<TrackId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            track_ids,
            created_at,
        }
    }

    /// Replace the member list
    #[must_use]
    pub fn with_tracks(mut self, track_ids: Vec<TrackId>) -> Self {
        self.track_ids = track_ids;
        self
    }

    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.track_ids.contains(id)
    }
}

/// Playlist as found in a library document or an older persisted state
///
/// Newer writers emit `trackIds`; older ones embedded full track objects.
/// Both are migrated to [`Playlist`] once at load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaylistRecord {
    /// `{id, name, trackIds, createdAt?}`
    ById {
        id: PlaylistId,
        name: String,
        #[serde(rename = "trackIds")]
        track_ids: Vec<TrackId>,
        #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
        created_at: Option<String>,
    },
    /// `{id, name, tracks: Track[], createdAt?}`
    Embedded {
        id: PlaylistId,
        name: String,
        tracks: Vec<Track>,
        #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
        created_at: Option<String>,
    },
}

impl PlaylistRecord {
    pub fn id(&self) -> &PlaylistId {
        match self {
            Self::ById { id, .. } | Self::Embedded { id, .. } => id,
        }
    }

    /// Convert to the canonical form, keeping member order as recorded
    ///
    /// A missing or unparsable `createdAt` becomes the current time.
    pub fn into_playlist(self) -> Playlist {
        let (id, name, track_ids, created_at) = match self {
            Self::ById {
                id,
                name,
                track_ids,
                created_at,
            } => (id, name, track_ids, created_at),
            Self::Embedded {
                id,
                name,
                tracks,
                created_at,
            } => (
                id,
                name,
                tracks.into_iter().map(|t| t.id).collect(),
                created_at,
            ),
        };

        let created_at = created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Playlist::with_id(id, name, track_ids, created_at)
    }
}

impl From<&Playlist> for PlaylistRecord {
    fn from(playlist: &Playlist) -> Self {
        Self::ById {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            track_ids: playlist.track_ids.clone(),
            created_at: Some(playlist.created_at.to_rfc3339()),
        }
    }
}
