//! Command implementations. Output goes to the given writer; progress and
//! logs go to stderr.

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::render;
use chrono::{SecondsFormat, Utc};
use cloudstream_cache::OfflineCache;
use cloudstream_cloud::B2Browser;
use cloudstream_core::{LibraryDocument, PlayableSource, PlaylistId, TrackId};
use cloudstream_library::{
    filter_tracks, load_library, Catalog, CatalogLoader, LibraryStore, LoaderConfig, SortDirection,
    SortField, SortState, StateFile,
};
use cloudstream_metadata::{CancellationFlag, FolderScanner, ScanProgress};
use cloudstream_window::{GridWindow, ListWindow, Viewport};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Which aggregate to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Artists,
    Albums,
    Genres,
    Years,
}

/// Filters and window for `tracks`
#[derive(Debug, Clone, Default)]
pub struct TrackQuery {
    pub search: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    pub playlist: Option<String>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
    /// First visible row
    pub scroll: usize,
    /// Visible rows
    pub rows: usize,
}

/// Grid viewport for `albums --grid`
#[derive(Debug, Clone, Copy)]
pub struct GridQuery {
    pub width: f64,
    pub height: f64,
    pub scroll: f64,
}

pub struct App {
    config: CliConfig,
}

impl App {
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Store with persisted state restored and the catalog fetched
    pub async fn open_library(&self) -> Result<LibraryStore> {
        let loader = CatalogLoader::new(
            LoaderConfig::new(&self.config.library.url)
                .with_timeout(Duration::from_secs(self.config.library.timeout_secs)),
        )?;
        let store = Mutex::new(LibraryStore::with_state_file(StateFile::new(
            &self.config.library.state_file,
        )));
        load_library(&store, &loader).await?;
        Ok(store.into_inner())
    }

    pub async fn library_summary(&self, out: &mut impl Write) -> Result<()> {
        let store = self.open_library().await?;
        let text = render::summary(
            &store.catalog(),
            store.artists().len(),
            store.albums().len(),
            store.genres().len(),
            store.playlists().len(),
        );
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    pub async fn tracks(&self, query: &TrackQuery, out: &mut impl Write) -> Result<()> {
        let mut store = self.open_library().await?;

        if let Some(id) = &query.playlist {
            let id = PlaylistId::new(id.as_str());
            if store.playlists().get(&id).is_none() {
                return Err(CliError::NotFound("Playlist", id.as_str().to_string()));
            }
            store.select_playlist(Some(id));
        } else {
            store.select_artist(query.artist.clone());
            store.select_album(query.album.clone());
            if query.genre.is_some() {
                store.select_genre(query.genre.clone());
            }
            if query.year.is_some() {
                store.select_year(query.year);
            }
            store.set_search(query.search.clone().unwrap_or_default());
        }

        // Sort overrides apply to this listing only and are not persisted
        let mut sort = store.sort();
        if let Some(field) = query.sort {
            sort = SortState::new(field, SortDirection::Asc);
        }
        if let Some(direction) = query.direction {
            sort.direction = direction;
        }
        let catalog = store.catalog();
        let tracks = filter_tracks(&catalog, store.playlists(), store.filter(), &sort);

        let window = ListWindow::new(self.config.window.row_height, self.config.window.buffer_rows);
        let row_height = self.config.window.row_height;
        let range = window.range(
            tracks.len(),
            query.rows as f64 * row_height,
            query.scroll as f64 * row_height,
        );
        out.write_all(render::track_window(&tracks, &range).as_bytes())?;
        Ok(())
    }

    pub async fn aggregate(&self, kind: Aggregate, grid: Option<GridQuery>, out: &mut impl Write) -> Result<()> {
        let store = self.open_library().await?;
        let text = match kind {
            Aggregate::Artists => render::artists(&store.artists()),
            Aggregate::Albums => {
                let albums = store.albums();
                match grid {
                    Some(grid) => {
                        let window = GridWindow::new(
                            self.config.window.card_width,
                            self.config.window.card_height,
                            self.config.window.grid_buffer_rows,
                        );
                        let layout =
                            window.layout(albums.len(), &Viewport::new(grid.width, grid.height, grid.scroll));
                        render::album_grid(&albums, &layout)
                    }
                    None => render::albums(&albums),
                }
            }
            Aggregate::Genres => render::genres(&store.genres()),
            Aggregate::Years => render::years(&store.years()),
        };
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Playlists
    // -------------------------------------------------------------------------

    pub async fn playlist_list(&self, out: &mut impl Write) -> Result<()> {
        let store = self.open_library().await?;
        let text = render::playlists(store.playlists().as_slice(), &store.catalog());
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    pub async fn playlist_create(&self, name: &str, track_ids: &[String], out: &mut impl Write) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CliError::InvalidArgument("playlist name cannot be empty".into()));
        }
        let mut store = self.open_library().await?;
        let playlist = store.create_playlist(name.trim(), &to_track_ids(track_ids));
        writeln!(out, "{}  {} ({} tracks)", playlist.id.as_str(), playlist.name, playlist.len())?;
        Ok(())
    }

    pub async fn playlist_add(&self, id: &str, track_ids: &[String], out: &mut impl Write) -> Result<()> {
        let mut store = self.open_library().await?;
        let id = existing_playlist(&store, id)?;
        let added = store.add_to_playlist(&id, &to_track_ids(track_ids));
        writeln!(out, "Added {} tracks", added)?;
        Ok(())
    }

    pub async fn playlist_remove(&self, id: &str, track_ids: &[String], out: &mut impl Write) -> Result<()> {
        let mut store = self.open_library().await?;
        let id = existing_playlist(&store, id)?;
        let removed = store.remove_from_playlist(&id, &to_track_ids(track_ids));
        writeln!(out, "Removed {} tracks", removed)?;
        Ok(())
    }

    pub async fn playlist_rename(&self, id: &str, name: &str, out: &mut impl Write) -> Result<()> {
        let mut store = self.open_library().await?;
        let id = existing_playlist(&store, id)?;
        store.rename_playlist(&id, name.trim());
        writeln!(out, "Renamed to {}", name.trim())?;
        Ok(())
    }

    pub async fn playlist_delete(&self, id: &str, out: &mut impl Write) -> Result<()> {
        let mut store = self.open_library().await?;
        let id = existing_playlist(&store, id)?;
        store.delete_playlist(&id);
        writeln!(out, "Deleted {}", id.as_str())?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cloud
    // -------------------------------------------------------------------------

    pub async fn browse(&self, prefix: &str, out: &mut impl Write) -> Result<()> {
        let browser = B2Browser::new(&self.config.browse.endpoint)?;
        let listing = browser.browse(prefix).await?;
        out.write_all(render::listing(&listing).as_bytes())?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Local import
    // -------------------------------------------------------------------------

    /// Scan `dir` and merge the tracks into the document at `output`
    /// (created if missing). Without `output` the tracks are only listed.
    pub async fn import(
        &self,
        dir: &Path,
        output: Option<&Path>,
        cancel: &CancellationFlag,
        out: &mut impl Write,
    ) -> Result<()> {
        let scanner = FolderScanner::new().on_progress(Box::new(|p: &ScanProgress| match p {
            ScanProgress::Started { total_files } => eprintln!("Found {} files, reading metadata...", total_files),
            ScanProgress::BatchRead { processed, total_files } => {
                eprintln!("Reading metadata... {}% ({}/{})", p.percent(), processed, total_files);
            }
            ScanProgress::Completed { .. } => {}
        }));
        let outcome = scanner.scan(dir, cancel).await?;

        for failure in &outcome.failures {
            warn!(path = %failure.path.display(), error = %failure.message, "Imported without tags");
        }
        if outcome.cancelled {
            writeln!(out, "Cancelled after {} of {} files", outcome.tracks.len(), outcome.files_discovered)?;
        }

        let Some(output) = output else {
            for (i, track) in outcome.tracks.iter().enumerate() {
                writeln!(out, "{}", render::track_row(i, track))?;
            }
            writeln!(out, "Read {} tracks ({} without tags)", outcome.tracks.len(), outcome.failures.len())?;
            return Ok(());
        };

        let doc = read_document(output)?;
        let mut store = LibraryStore::new();
        store.replace_catalog(Catalog::new(doc.tracks.clone()));
        let added = store.append_tracks(outcome.tracks);
        write_document(output, doc, &store.catalog())?;

        info!(output = %output.display(), added, "Wrote library document");
        writeln!(out, "Added {} tracks, {} total", added, store.catalog().len())?;
        Ok(())
    }

    /// Re-read embedded artwork for every local track in `document`
    pub async fn rescan_artwork(&self, document: &Path, out: &mut impl Write) -> Result<()> {
        if !document.exists() {
            return Err(CliError::NotFound("Library document", document.display().to_string()));
        }
        let doc = read_document(document)?;
        let mut store = LibraryStore::new();
        store.replace_catalog(Catalog::new(doc.tracks.clone()));

        let found = FolderScanner::new()
            .rescan_artwork(store.catalog().tracks())
            .await?;
        let mut updated = 0;
        for (id, artwork) in found {
            if store.update_track_artwork(&id, Some(artwork)) {
                updated += 1;
            }
        }
        if updated > 0 {
            write_document(document, doc, &store.catalog())?;
        }
        writeln!(out, "Updated artwork for {} tracks", updated)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Offline cache
    // -------------------------------------------------------------------------

    pub fn cache_stats(&self, out: &mut impl Write) -> Result<()> {
        let cache = OfflineCache::open(&self.config.cache.dir)?;
        out.write_all(render::cache_stats(&cache.stats()).as_bytes())?;
        Ok(())
    }

    pub fn cache_evict(&self, max_bytes: Option<u64>, out: &mut impl Write) -> Result<()> {
        let mut cache = OfflineCache::open(&self.config.cache.dir)?;
        let evicted = cache.evict_until_under(max_bytes.unwrap_or(self.config.cache.max_bytes))?;
        writeln!(out, "Evicted {} files", evicted)?;
        out.write_all(render::cache_stats(&cache.stats()).as_bytes())?;
        Ok(())
    }

    pub fn cache_clear(&self, out: &mut impl Write) -> Result<()> {
        let mut cache = OfflineCache::open(&self.config.cache.dir)?;
        let files = cache.len();
        cache.clear()?;
        writeln!(out, "Removed {} files", files)?;
        Ok(())
    }

    /// Download one library track into the offline cache
    pub async fn cache_fetch(&self, track_id: &str, out: &mut impl Write) -> Result<()> {
        let store = self.open_library().await?;
        let catalog = store.catalog();
        let track = catalog
            .get(&TrackId::new(track_id))
            .ok_or_else(|| CliError::NotFound("Track", track_id.to_string()))?;

        let url = match track.source() {
            Some(PlayableSource::Local(path)) => {
                return Err(CliError::InvalidArgument(format!("{} is a local file: {}", track_id, path)));
            }
            Some(source) => source.locator().to_string(),
            None => return Err(CliError::InvalidArgument(format!("{} has no playable source", track_id))),
        };

        let mut cache = OfflineCache::open(&self.config.cache.dir)?;
        let mut last = None;
        let bytes = cache
            .download_and_cache(track_id, &url, |fraction| {
                let percent = (fraction * 100.0).floor() as u8;
                if last != Some(percent) {
                    last = Some(percent);
                    eprint!("\rDownloading... {}%", percent);
                }
            })
            .await?;
        if last.is_some() {
            eprintln!();
        }

        writeln!(
            out,
            "Cached {} ({})",
            track.title,
            cloudstream_cache::format_bytes(bytes.len() as u64)
        )?;
        let max_bytes = self.config.cache.max_bytes;
        if cache.total_bytes() > max_bytes {
            let evicted = cache.evict_until_under(max_bytes)?;
            writeln!(out, "Evicted {} older files", evicted)?;
        }
        Ok(())
    }
}

fn to_track_ids(ids: &[String]) -> Vec<TrackId> {
    ids.iter().map(|id| TrackId::new(id.as_str())).collect()
}

fn existing_playlist(store: &LibraryStore, id: &str) -> Result<PlaylistId> {
    let id = PlaylistId::new(id);
    if store.playlists().get(&id).is_none() {
        return Err(CliError::NotFound("Playlist", id.as_str().to_string()));
    }
    Ok(id)
}

/// A local library document; a missing file is an empty one
fn read_document(path: &Path) -> Result<LibraryDocument> {
    if !path.exists() {
        return Ok(LibraryDocument::default());
    }
    let raw = std::fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Write `doc` back with its tracks replaced by the catalog's. Playlists and
/// the version are kept as read; the file is replaced atomically.
fn write_document(path: &Path, mut doc: LibraryDocument, catalog: &Catalog) -> Result<()> {
    doc.tracks = catalog.tracks().to_vec();
    doc.total_tracks = Some(doc.tracks.len());
    doc.generated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(&doc)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
