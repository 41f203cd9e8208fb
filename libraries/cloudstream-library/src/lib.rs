//! Library index and view derivation for Cloudstream Player.
//!
//! This crate owns everything derived from the flat track list:
//!
//! - [`Catalog`]: the id-indexed track list for the current load
//! - [`views`]: artist/album/genre/year aggregates
//! - [`filter`]: search, selection and multi-field sort
//! - [`PlaylistStore`]: user playlists resolved against the catalog
//! - [`StateFile`]: durable playlists and sort preference
//! - [`LibraryStore`]: the state container tying the above together
//! - [`CatalogLoader`]: fetches the library document from the CDN
//!
//! # Example
//!
//! ```
//! use cloudstream_core::{LibraryDocument, Track, TrackId};
//! use cloudstream_library::LibraryStore;
//!
//! let mut store = LibraryStore::new();
//! let ticket = store.begin_load();
//! let doc = LibraryDocument::from_tracks(vec![
//!     Track::new(TrackId::new("t1"), "Intro").with_artist("X"),
//! ]);
//! store.finish_load(ticket, Ok::<_, cloudstream_library::LibraryError>(doc));
//!
//! store.select_artist(Some("X".into()));
//! assert_eq!(store.filtered_tracks().len(), 1);
//! ```

pub mod catalog;
pub mod collate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod persist;
pub mod playlists;
pub mod store;
pub mod views;

pub use catalog::Catalog;
pub use error::{LibraryError, Result};
pub use filter::{filter_tracks, FilterState, SortDirection, SortField, SortState, ViewKind};
pub use loader::{load_library, CatalogLoader, LoaderConfig};
pub use persist::{PersistedState, StateFile, STATE_VERSION, STORAGE_KEY};
pub use playlists::PlaylistStore;
pub use store::{LibraryEvent, LibraryStore, LoadState, LoadTicket, SubscriptionId};
