//! The track catalog: an ordered, id-indexed, immutable-per-load track list.

use cloudstream_core::{LibraryDocument, Track, TrackId};
use std::collections::HashMap;
use tracing::warn;

/// Ordered collection of tracks for the current library.
///
/// A catalog is never patched in place. Changes produce a new catalog which
/// the [`LibraryStore`](crate::LibraryStore) swaps in behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    index: HashMap<TrackId, usize>,
    version: Option<String>,
    generated_at: Option<String>,
    total_tracks: Option<usize>,
}

impl Catalog {
    /// Build a catalog from a track list.
    ///
    /// Track ids must be unique; a later track reusing an id is dropped.
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut kept = Vec::with_capacity(tracks.len());
        let mut index = HashMap::with_capacity(tracks.len());

        for track in tracks {
            if index.contains_key(&track.id) {
                warn!(track_id = %track.id, title = %track.title, "Duplicate track id in catalog, keeping first");
                continue;
            }
            index.insert(track.id.clone(), kept.len());
            kept.push(track);
        }

        Self {
            tracks: kept,
            index,
            ..Self::default()
        }
    }

    /// Build a catalog from a library document, keeping its version stamp.
    pub fn from_document(doc: LibraryDocument) -> Self {
        let LibraryDocument {
            version,
            generated_at,
            total_tracks,
            tracks,
            ..
        } = doc;

        if let Some(claimed) = total_tracks {
            if claimed != tracks.len() {
                warn!(claimed, actual = tracks.len(), "Library document track count mismatch");
            }
        }

        Self {
            version,
            generated_at,
            total_tracks,
            ..Self::new(tracks)
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All tracks in catalog order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.index.get(id).map(|&i| &self.tracks[i])
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.index.contains_key(id)
    }

    /// Catalog position of a track
    pub fn position(&self, id: &TrackId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Look up tracks in the given order, skipping ids the catalog lacks.
    pub fn resolve<'a, I>(&self, ids: I) -> Vec<Track>
    where
        I: IntoIterator<Item = &'a TrackId>,
    {
        ids.into_iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn generated_at(&self) -> Option<&str> {
        self.generated_at.as_deref()
    }

    /// Track count the generating tool claimed, if any
    pub fn total_tracks(&self) -> Option<usize> {
        self.total_tracks
    }

    /// New catalog with the entry sharing `track.id` replaced.
    ///
    /// Returns `None` when no such entry exists.
    pub fn with_track(&self, track: Track) -> Option<Self> {
        let pos = self.position(&track.id)?;
        let mut next = self.clone();
        next.tracks[pos] = track;
        Some(next)
    }

    /// New catalog with `tracks` appended; ids already present are skipped.
    pub fn with_appended(&self, tracks: Vec<Track>) -> Self {
        let mut next = self.clone();
        for track in tracks {
            if next.index.contains_key(&track.id) {
                continue;
            }
            next.index.insert(track.id.clone(), next.tracks.len());
            next.tracks.push(track);
        }
        next.total_tracks = next.total_tracks.map(|_| next.tracks.len());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str) -> Track {
        Track::new(TrackId::new(id), title)
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let catalog = Catalog::new(vec![track("a", "first"), track("b", "b"), track("a", "second")]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(&TrackId::new("a")).unwrap().title, "first");
        assert_eq!(catalog.position(&TrackId::new("b")), Some(1));
    }

    #[test]
    fn resolve_keeps_requested_order_and_drops_missing() {
        let catalog = Catalog::new(vec![track("a", "A"), track("b", "B"), track("c", "C")]);
        let ids = [TrackId::new("c"), TrackId::new("zzz"), TrackId::new("a")];

        let titles: Vec<_> = catalog.resolve(&ids).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["C", "A"]);
    }

    #[test]
    fn with_track_replaces_by_id() {
        let catalog = Catalog::new(vec![track("a", "A"), track("b", "B")]);
        let mut updated = track("b", "B");
        updated.artwork = Some("data:image/jpeg;base64,AA".into());

        let next = catalog.with_track(updated).unwrap();
        assert_eq!(next.position(&TrackId::new("b")), Some(1));
        assert!(next.get(&TrackId::new("b")).unwrap().artwork.is_some());
        // Original untouched
        assert!(catalog.get(&TrackId::new("b")).unwrap().artwork.is_none());

        assert!(catalog.with_track(track("nope", "x")).is_none());
    }

    #[test]
    fn with_appended_skips_known_ids() {
        let catalog = Catalog::new(vec![track("a", "A")]);
        let next = catalog.with_appended(vec![track("a", "dup"), track("b", "B")]);

        assert_eq!(next.len(), 2);
        assert_eq!(next.get(&TrackId::new("a")).unwrap().title, "A");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn from_document_keeps_stamp() {
        let doc = LibraryDocument {
            version: Some("1.0.0".into()),
            generated_at: Some("2026-02-07T00:00:00.000Z".into()),
            total_tracks: Some(1),
            tracks: vec![track("a", "A")],
            playlists: vec![],
        };
        let catalog = Catalog::from_document(doc);

        assert_eq!(catalog.version(), Some("1.0.0"));
        assert_eq!(catalog.generated_at(), Some("2026-02-07T00:00:00.000Z"));
        assert_eq!(catalog.total_tracks(), Some(1));
        assert_eq!(catalog.len(), 1);
    }
}
