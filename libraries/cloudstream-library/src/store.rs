//! Library state container.
//!
//! One [`LibraryStore`] owns the catalog, playlists, filter, sort, track
//! selection and load status. All mutation goes through its methods, which
//! notify subscribers afterwards. Construct a fresh store per test.

use crate::catalog::Catalog;
use crate::filter::{filter_tracks, FilterState, SortDirection, SortField, SortState, ViewKind};
use crate::persist::{PersistedState, StateFile};
use crate::playlists::PlaylistStore;
use crate::views;
use cloudstream_core::{
    AlbumInfo, ArtistInfo, GenreInfo, LibraryDocument, Playlist, PlaylistId, PlaylistRecord, Track,
    TrackId, YearInfo,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Catalog load status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Change notifications delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    LoadStarted,
    CatalogReplaced { tracks: usize },
    LoadFailed { message: String },
    FilterChanged,
    SortChanged(SortState),
    PlaylistsChanged,
    SelectionChanged { selected: usize },
}

/// Handle returned by [`LibraryStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Identifies one catalog load; only the most recent ticket is honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

type Subscriber = Box<dyn FnMut(&LibraryEvent) + Send>;

pub struct LibraryStore {
    catalog: Arc<Catalog>,
    playlists: PlaylistStore,
    filter: FilterState,
    sort: SortState,
    selected: HashSet<TrackId>,
    load_state: LoadState,
    generation: u64,
    state_file: Option<StateFile>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryStore")
            .field("tracks", &self.catalog.len())
            .field("playlists", &self.playlists.len())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("load_state", &self.load_state)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl LibraryStore {
    /// Empty, in-memory store
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(Catalog::default()),
            playlists: PlaylistStore::default(),
            filter: FilterState::default(),
            sort: SortState::default(),
            selected: HashSet::new(),
            load_state: LoadState::Idle,
            generation: 0,
            state_file: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Store backed by a state file; playlists and sort are restored from it.
    ///
    /// Restored playlists are reconciled once a catalog arrives.
    pub fn with_state_file(state_file: StateFile) -> Self {
        let persisted = state_file.load();
        let playlists = persisted
            .playlists
            .into_iter()
            .map(PlaylistRecord::into_playlist)
            .collect();

        info!(path = %state_file.path().display(), "Library state restored");

        Self {
            playlists: PlaylistStore::new(playlists),
            sort: persisted.sort,
            state_file: Some(state_file),
            ..Self::new()
        }
    }

    // -------------------------------------------------------------------------
    // Subscribers
    // -------------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LibraryEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    fn emit(&mut self, event: LibraryEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current catalog; the returned `Arc` stays valid across later swaps
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn playlists(&self) -> &PlaylistStore {
        &self.playlists
    }

    pub fn playlist_tracks(&self, id: &PlaylistId) -> Vec<Track> {
        self.playlists.tracks(id, &self.catalog)
    }

    pub fn selected_tracks(&self) -> &HashSet<TrackId> {
        &self.selected
    }

    /// The ordered track list for the current filter and sort
    pub fn filtered_tracks(&self) -> Vec<Track> {
        filter_tracks(&self.catalog, &self.playlists, &self.filter, &self.sort)
    }

    pub fn artists(&self) -> Vec<ArtistInfo> {
        views::artists(self.catalog.tracks())
    }

    pub fn albums(&self) -> Vec<AlbumInfo> {
        views::albums(self.catalog.tracks())
    }

    pub fn genres(&self) -> Vec<GenreInfo> {
        views::genres(self.catalog.tracks())
    }

    pub fn years(&self) -> Vec<YearInfo> {
        views::years(self.catalog.tracks())
    }

    // -------------------------------------------------------------------------
    // View and filter transitions
    // -------------------------------------------------------------------------

    /// Switch view, clearing artist/album/genre/year selections and search
    pub fn set_view(&mut self, view: ViewKind) {
        self.filter = FilterState {
            view,
            playlist_id: self.filter.playlist_id.take(),
            ..FilterState::default()
        };
        self.emit(LibraryEvent::FilterChanged);
    }

    /// Select an artist and drill into its albums
    pub fn select_artist(&mut self, artist: Option<String>) {
        self.filter = FilterState {
            artist,
            view: ViewKind::Albums,
            playlist_id: self.filter.playlist_id.take(),
            ..FilterState::default()
        };
        self.emit(LibraryEvent::FilterChanged);
    }

    pub fn select_album(&mut self, album: Option<String>) {
        self.filter.album = album;
        self.emit(LibraryEvent::FilterChanged);
    }

    pub fn select_genre(&mut self, genre: Option<String>) {
        self.filter.genre = genre;
        self.filter.view = ViewKind::Songs;
        self.emit(LibraryEvent::FilterChanged);
    }

    pub fn select_year(&mut self, year: Option<u32>) {
        self.filter.year = year;
        self.filter.view = ViewKind::Songs;
        self.emit(LibraryEvent::FilterChanged);
    }

    pub fn select_playlist(&mut self, id: Option<PlaylistId>) {
        self.filter.playlist_id = id;
        self.filter.view = ViewKind::Playlist;
        self.emit(LibraryEvent::FilterChanged);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filter.search = query.into();
        self.emit(LibraryEvent::FilterChanged);
    }

    pub fn set_sort_field(&mut self, field: SortField) {
        self.sort.field = field;
        self.sort_changed();
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort.direction = direction;
        self.sort_changed();
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
        self.sort_changed();
    }

    fn sort_changed(&mut self) {
        self.persist();
        self.emit(LibraryEvent::SortChanged(self.sort));
    }

    // -------------------------------------------------------------------------
    // Track selection
    // -------------------------------------------------------------------------

    pub fn toggle_track_selection(&mut self, id: &TrackId) {
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
        self.selection_changed();
    }

    pub fn set_selected_tracks(&mut self, ids: impl IntoIterator<Item = TrackId>) {
        self.selected = ids.into_iter().collect();
        self.selection_changed();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.selection_changed();
    }

    fn selection_changed(&mut self) {
        let selected = self.selected.len();
        self.emit(LibraryEvent::SelectionChanged { selected });
    }

    // -------------------------------------------------------------------------
    // Playlists
    // -------------------------------------------------------------------------

    pub fn create_playlist(&mut self, name: impl Into<String>, track_ids: &[TrackId]) -> Playlist {
        let playlist = self.playlists.create(name, track_ids, &self.catalog);
        self.playlists_changed();
        playlist
    }

    /// Returns the number of tracks added
    pub fn add_to_playlist(&mut self, id: &PlaylistId, track_ids: &[TrackId]) -> usize {
        let added = self.playlists.add_tracks(id, track_ids, &self.catalog);
        if added > 0 {
            self.playlists_changed();
        }
        added
    }

    /// Returns the number of tracks removed
    pub fn remove_from_playlist(&mut self, id: &PlaylistId, track_ids: &[TrackId]) -> usize {
        let removed = self.playlists.remove_tracks(id, track_ids);
        if removed > 0 {
            self.playlists_changed();
        }
        removed
    }

    pub fn rename_playlist(&mut self, id: &PlaylistId, name: impl Into<String>) -> bool {
        let renamed = self.playlists.rename(id, name);
        if renamed {
            self.playlists_changed();
        }
        renamed
    }

    /// Delete a playlist; clears the playlist selection if it pointed here
    pub fn delete_playlist(&mut self, id: &PlaylistId) -> bool {
        if !self.playlists.delete(id) {
            return false;
        }
        if self.filter.playlist_id.as_ref() == Some(id) {
            self.filter.playlist_id = None;
            self.emit(LibraryEvent::FilterChanged);
        }
        self.playlists_changed();
        true
    }

    fn playlists_changed(&mut self) {
        self.persist();
        self.emit(LibraryEvent::PlaylistsChanged);
    }

    /// Write playlists and sort. Failures are logged; in-memory state stays authoritative.
    fn persist(&self) {
        let Some(file) = &self.state_file else {
            return;
        };
        let state = PersistedState::new(self.playlists.as_slice(), self.sort);
        if let Err(e) = file.save(&state) {
            error!(path = %file.path().display(), error = %e, "Failed to persist library state");
        }
    }

    // -------------------------------------------------------------------------
    // Catalog lifecycle
    // -------------------------------------------------------------------------

    /// Start a load; any earlier outstanding ticket becomes stale
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.load_state = LoadState::Loading;
        self.emit(LibraryEvent::LoadStarted);
        LoadTicket(self.generation)
    }

    /// Complete a load started with `ticket`.
    ///
    /// Returns `false` without touching state when a newer load has begun.
    /// On failure the existing catalog is kept.
    pub fn finish_load<E>(&mut self, ticket: LoadTicket, result: std::result::Result<LibraryDocument, E>) -> bool
    where
        E: std::fmt::Display,
    {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "Ignoring superseded library load");
            return false;
        }

        match result {
            Ok(mut doc) => {
                let records = std::mem::take(&mut doc.playlists);
                let catalog = Catalog::from_document(doc);
                let incoming = PlaylistStore::from_records(records, &catalog);

                self.playlists.merge(incoming);
                self.install_catalog(catalog);
                self.load_state = LoadState::Ready;
                info!(tracks = self.catalog.len(), playlists = self.playlists.len(), "Library loaded");
                self.emit(LibraryEvent::PlaylistsChanged);
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Library load failed");
                self.load_state = LoadState::Failed(message.clone());
                self.emit(LibraryEvent::LoadFailed { message });
            }
        }
        true
    }

    /// Swap in a new catalog and reconcile dependants against it
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.install_catalog(catalog);
    }

    fn install_catalog(&mut self, catalog: Catalog) {
        let catalog = Arc::new(catalog);
        self.playlists.reconcile(&catalog);
        self.selected.retain(|id| catalog.contains(id));
        self.catalog = catalog;
        self.persist();

        let tracks = self.catalog.len();
        self.emit(LibraryEvent::CatalogReplaced { tracks });
    }

    /// Append locally imported tracks; ids already in the catalog are skipped
    pub fn append_tracks(&mut self, tracks: Vec<Track>) -> usize {
        let before = self.catalog.len();
        let next = self.catalog.with_appended(tracks);
        let added = next.len() - before;
        if added > 0 {
            self.install_catalog(next);
        }
        added
    }

    /// Replace the embedded artwork of one track (artwork rescan)
    pub fn update_track_artwork(&mut self, id: &TrackId, artwork: Option<String>) -> bool {
        let Some(mut track) = self.catalog.get(id).cloned() else {
            return false;
        };
        track.artwork = artwork;

        match self.catalog.with_track(track) {
            Some(next) => {
                self.install_catalog(next);
                true
            }
            None => false,
        }
    }
}
