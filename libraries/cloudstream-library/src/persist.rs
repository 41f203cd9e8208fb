//! Durable local state: playlists and sort preference.
//!
//! The catalog is never written here; it is always reloaded from its source.

use crate::error::Result;
use crate::filter::{SortDirection, SortField, SortState};
use cloudstream_core::{Playlist, PlaylistRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Storage key the state is written under
pub const STORAGE_KEY: &str = "cloudstream-library-storage";

/// Current schema version. Anything else on disk is discarded.
pub const STATE_VERSION: u32 = 5;

/// The persisted slice of library state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub playlists: Vec<PlaylistRecord>,
    pub sort: SortState,
}

impl PersistedState {
    pub fn new(playlists: &[Playlist], sort: SortState) -> Self {
        Self {
            playlists: playlists.iter().map(PlaylistRecord::from).collect(),
            sort,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    name: String,
    version: u32,
    state: StateBody,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateBody {
    #[serde(default)]
    playlists: Vec<PlaylistRecord>,
    #[serde(default)]
    sort_field: SortField,
    #[serde(default)]
    sort_direction: SortDirection,
}

/// JSON state file at a fixed path
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state, starting empty on any problem.
    ///
    /// A missing file, unparsable JSON, a different storage key or a
    /// mismatched version all yield the default state.
    pub fn load(&self) -> PersistedState {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted state, starting empty");
                return PersistedState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read persisted state, starting empty");
                return PersistedState::default();
            }
        };

        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Persisted state is corrupt, starting empty");
                return PersistedState::default();
            }
        };

        if envelope.name != STORAGE_KEY || envelope.version != STATE_VERSION {
            info!(
                name = %envelope.name,
                version = envelope.version,
                expected = STATE_VERSION,
                "Persisted state has a different schema, starting empty"
            );
            return PersistedState::default();
        }

        PersistedState {
            playlists: envelope.state.playlists,
            sort: SortState::new(envelope.state.sort_field, envelope.state.sort_direction),
        }
    }

    /// Write the state atomically (temp file, then rename).
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let envelope = Envelope {
            name: STORAGE_KEY.to_string(),
            version: STATE_VERSION,
            state: StateBody {
                playlists: state.playlists.clone(),
                sort_field: state.sort.field,
                sort_direction: state.sort.direction,
            },
        };
        let json = serde_json::to_vec_pretty(&envelope)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), playlists = state.playlists.len(), "Saved library state");
        Ok(())
    }
}
