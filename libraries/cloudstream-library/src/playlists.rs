//! Playlist store.
//!
//! Playlists hold track ids; tracks are resolved against the catalog on read.
//! Every mutation is idempotent with respect to ids already present or absent.

use crate::catalog::Catalog;
use cloudstream_core::{Playlist, PlaylistId, PlaylistRecord, Track, TrackId};
use std::collections::HashSet;
use tracing::debug;

/// Ordered collection of user playlists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistStore {
    playlists: Vec<Playlist>,
}

impl PlaylistStore {
    pub fn new(playlists: Vec<Playlist>) -> Self {
        Self { playlists }
    }

    /// Migrate wire records into canonical playlists, dropping ids the
    /// catalog does not know.
    pub fn from_records(records: Vec<PlaylistRecord>, catalog: &Catalog) -> Self {
        let mut store = Self::new(records.into_iter().map(PlaylistRecord::into_playlist).collect());
        store.reconcile(catalog);
        store
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Playlist> {
        self.playlists.iter()
    }

    pub fn as_slice(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| &p.id == id)
    }

    fn get_mut(&mut self, id: &PlaylistId) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| &p.id == id)
    }

    /// Resolved tracks of a playlist, in playlist order
    pub fn tracks(&self, id: &PlaylistId, catalog: &Catalog) -> Vec<Track> {
        self.get(id)
            .map(|p| catalog.resolve(&p.track_ids))
            .unwrap_or_default()
    }

    /// Create a playlist, optionally pre-populated.
    ///
    /// Initial ids are kept in catalog order; ids the catalog lacks are dropped.
    pub fn create(&mut self, name: impl Into<String>, initial: &[TrackId], catalog: &Catalog) -> Playlist {
        let playlist = Playlist::new(name).with_tracks(in_catalog_order(initial, catalog, &HashSet::new()));
        debug!(playlist_id = %playlist.id, name = %playlist.name, tracks = playlist.len(), "Created playlist");
        self.playlists.push(playlist.clone());
        playlist
    }

    /// Insert a fully-formed playlist, replacing one with the same id
    pub fn upsert(&mut self, playlist: Playlist) {
        match self.get_mut(&playlist.id) {
            Some(existing) => *existing = playlist,
            None => self.playlists.push(playlist),
        }
    }

    /// Set-union: append ids not already present, in catalog order.
    ///
    /// Returns the number of tracks added. Unknown playlist is a no-op.
    pub fn add_tracks(&mut self, id: &PlaylistId, ids: &[TrackId], catalog: &Catalog) -> usize {
        let Some(playlist) = self.get_mut(id) else {
            return 0;
        };

        let added = {
            let existing: HashSet<&TrackId> = playlist.track_ids.iter().collect();
            in_catalog_order(ids, catalog, &existing)
        };
        let count = added.len();
        playlist.track_ids.extend(added);
        count
    }

    /// Set-difference. Returns the number of tracks removed.
    pub fn remove_tracks(&mut self, id: &PlaylistId, ids: &[TrackId]) -> usize {
        let Some(playlist) = self.get_mut(id) else {
            return 0;
        };

        let removing: HashSet<&TrackId> = ids.iter().collect();
        let before = playlist.track_ids.len();
        playlist.track_ids.retain(|t| !removing.contains(t));
        before - playlist.track_ids.len()
    }

    pub fn rename(&mut self, id: &PlaylistId, name: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(playlist) => {
                playlist.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Remove a playlist; returns whether it existed
    pub fn delete(&mut self, id: &PlaylistId) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| &p.id != id);
        before != self.playlists.len()
    }

    /// Drop references to tracks the catalog no longer contains.
    ///
    /// Returns the number of references dropped.
    pub fn reconcile(&mut self, catalog: &Catalog) -> usize {
        let mut dropped = 0;
        for playlist in &mut self.playlists {
            let before = playlist.track_ids.len();
            playlist.track_ids.retain(|id| catalog.contains(id));
            let stale = before - playlist.track_ids.len();
            if stale > 0 {
                debug!(playlist_id = %playlist.id, stale, "Dropped stale playlist entries");
            }
            dropped += stale;
        }
        dropped
    }

    /// Merge playlists from another source; existing ids win
    pub fn merge(&mut self, other: PlaylistStore) {
        for playlist in other.playlists {
            if self.get(&playlist.id).is_none() {
                self.playlists.push(playlist);
            }
        }
    }
}

/// Catalog-known ids from `ids`, deduplicated, ordered by catalog position
/// and excluding `skip`.
fn in_catalog_order(ids: &[TrackId], catalog: &Catalog, skip: &HashSet<&TrackId>) -> Vec<TrackId> {
    let mut found: Vec<(usize, &TrackId)> = ids
        .iter()
        .filter(|id| !skip.contains(id))
        .filter_map(|id| catalog.position(id).map(|pos| (pos, id)))
        .collect();
    found.sort_unstable_by_key(|(pos, _)| *pos);
    found.dedup_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, id)| id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<TrackId> {
        raw.iter().map(|s| TrackId::new(*s)).collect()
    }

    fn catalog() -> Catalog {
        Catalog::new(
            ["t1", "t2", "t3", "t4"]
                .iter()
                .map(|id| Track::new(TrackId::new(*id), *id))
                .collect(),
        )
    }

    #[test]
    fn create_drops_unknown_and_uses_catalog_order() {
        let mut store = PlaylistStore::default();
        let playlist = store.create("Favs", &ids(&["t3", "nope", "t1", "t3"]), &catalog());

        assert_eq!(playlist.track_ids, ids(&["t1", "t3"]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_appends_new_ids_after_existing() {
        let catalog = catalog();
        let mut store = PlaylistStore::default();
        let p = store.create("Mix", &ids(&["t4"]), &catalog);

        let added = store.add_tracks(&p.id, &ids(&["t2", "t4", "t1"]), &catalog);
        assert_eq!(added, 2);
        assert_eq!(store.get(&p.id).unwrap().track_ids, ids(&["t4", "t1", "t2"]));
    }

    #[test]
    fn unknown_playlist_is_noop() {
        let mut store = PlaylistStore::default();
        let missing = PlaylistId::new("missing");
        assert_eq!(store.add_tracks(&missing, &ids(&["t1"]), &catalog()), 0);
        assert_eq!(store.remove_tracks(&missing, &ids(&["t1"])), 0);
        assert!(!store.delete(&missing));
        assert!(!store.rename(&missing, "x"));
    }

    #[test]
    fn reconcile_drops_stale_ids() {
        let catalog = catalog();
        let mut store = PlaylistStore::default();
        let p = store.create("All", &ids(&["t1", "t2", "t3"]), &catalog);

        let smaller = Catalog::new(vec![Track::new(TrackId::new("t2"), "t2")]);
        assert_eq!(store.reconcile(&smaller), 2);
        assert_eq!(store.get(&p.id).unwrap().track_ids, ids(&["t2"]));
    }

    #[test]
    fn merge_keeps_existing() {
        let catalog = catalog();
        let mut local = PlaylistStore::default();
        let p = local.create("Local", &ids(&["t1"]), &catalog);

        let mut remote_playlist = p.clone();
        remote_playlist.name = "Remote copy".into();
        let other = PlaylistStore::new(vec![remote_playlist, Playlist::new("Remote only")]);

        local.merge(other);
        assert_eq!(local.len(), 2);
        assert_eq!(local.get(&p.id).unwrap().name, "Local");
    }
}
