/// Folder import: discovery, batched tag reading and cancellation
use crate::error::{MetadataError, Result};
use crate::metadata::{track_from_metadata, TrackMetadata};
use crate::reader::LoftyMetadataReader;
use cloudstream_core::{Track, TrackId};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Folders never descended into
const SKIPPED_DIRS: &[&str] = &["node_modules", "__pycache__"];

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Files read per blocking task; cancellation is checked between batches
    pub batch_size: usize,

    /// Supported audio file extensions (lower case, no dot)
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            extensions: [
                "mp3", "flac", "wav", "ogg", "m4a", "aac", "wma", "opus", "aiff", "ape", "wv",
            ]
            .iter()
            .map(|e| e.to_string())
            .collect(),
        }
    }
}

/// Shared flag a caller sets to stop a running scan
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scan progress updates
#[derive(Debug, Clone, PartialEq)]
pub enum ScanProgress {
    /// Discovery finished
    Started { total_files: usize },

    /// A batch has been read
    BatchRead { processed: usize, total_files: usize },

    /// Scanning completed (or stopped)
    Completed { tracks: usize, failures: usize, cancelled: bool },
}

impl ScanProgress {
    /// Percentage of files read so far
    pub fn percent(&self) -> u8 {
        match *self {
            Self::Started { .. } => 0,
            Self::BatchRead { processed, total_files } if total_files > 0 => {
                ((processed * 100) / total_files).min(100) as u8
            }
            Self::BatchRead { .. } | Self::Completed { .. } => 100,
        }
    }
}

/// A file whose tags could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Result of a folder scan
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// One track per file read, stubs included, in discovery order
    pub tracks: Vec<Track>,

    /// Number of audio files found
    pub files_discovered: usize,

    /// Files that became stub tracks
    pub failures: Vec<ScanFailure>,

    /// Whether the scan stopped early
    pub cancelled: bool,
}

/// Callback for scan progress updates
pub type ProgressCallback = Box<dyn Fn(&ScanProgress) + Send + Sync>;

/// Imports a local folder into library tracks
pub struct FolderScanner {
    reader: Arc<LoftyMetadataReader>,
    config: ScanConfig,
    progress_callback: Option<ProgressCallback>,
}

impl FolderScanner {
    /// Create a new scanner with the default configuration
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            reader: Arc::new(LoftyMetadataReader::new()),
            config,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `root` (a folder or a single file).
    ///
    /// `cancel` is checked before each batch; a cancelled scan returns the
    /// tracks of the batches already read.
    pub async fn scan(&self, root: &Path, cancel: &CancellationFlag) -> Result<ScanOutcome> {
        let start_time = Instant::now();
        if !root.exists() {
            return Err(MetadataError::FileNotFound(root.display().to_string()));
        }

        let files = {
            let root = root.to_path_buf();
            let extensions = self.config.extensions.clone();
            tokio::task::spawn_blocking(move || discover_files(&root, &extensions)).await?
        };

        let total_files = files.len();
        let mut outcome = ScanOutcome {
            files_discovered: total_files,
            ..ScanOutcome::default()
        };
        self.report(&ScanProgress::Started { total_files });
        info!(root = %root.display(), files = total_files, "Discovered audio files");

        for batch in files.chunks(self.config.batch_size.max(1)) {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let reader = Arc::clone(&self.reader);
            let batch = batch.to_vec();
            let results = tokio::task::spawn_blocking(move || {
                batch
                    .into_iter()
                    .map(|path| {
                        let result = reader.read(&path);
                        (path, result)
                    })
                    .collect::<Vec<_>>()
            })
            .await?;

            for (path, result) in results {
                let metadata = match result {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to read tags, importing stub");
                        outcome.failures.push(ScanFailure {
                            path: path.clone(),
                            message: e.to_string(),
                        });
                        TrackMetadata::stub(&path)
                    }
                };
                outcome.tracks.push(track_from_metadata(&path, metadata));
            }

            self.report(&ScanProgress::BatchRead {
                processed: outcome.tracks.len(),
                total_files,
            });
        }

        self.report(&ScanProgress::Completed {
            tracks: outcome.tracks.len(),
            failures: outcome.failures.len(),
            cancelled: outcome.cancelled,
        });
        info!(
            tracks = outcome.tracks.len(),
            failures = outcome.failures.len(),
            cancelled = outcome.cancelled,
            elapsed = ?start_time.elapsed(),
            "Folder scan finished"
        );

        Ok(outcome)
    }

    /// Re-read embedded artwork for tracks with a local file.
    ///
    /// Returns the tracks whose file now yields a picture. Unreadable files
    /// are skipped.
    pub async fn rescan_artwork(&self, tracks: &[Track]) -> Result<Vec<(TrackId, String)>> {
        let targets: Vec<(TrackId, PathBuf)> = tracks
            .iter()
            .filter_map(|t| t.file_path.as_ref().map(|p| (t.id.clone(), PathBuf::from(p))))
            .collect();

        let reader = Arc::clone(&self.reader);
        let found = tokio::task::spawn_blocking(move || {
            targets
                .into_iter()
                .filter_map(|(id, path)| match reader.read_artwork(&path) {
                    Ok(artwork) => artwork.map(|a| (id, a)),
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Artwork rescan skipped file");
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .await?;

        Ok(found)
    }

    fn report(&self, progress: &ScanProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(progress);
        }
    }
}

impl Default for FolderScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio files under `root`, sorted by path within each folder
pub fn discover_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_supported_file(root, extensions) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_supported_file(entry.path(), extensions))
        .map(DirEntry::into_path)
        .collect()
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)
}

fn is_supported_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent() {
        assert_eq!(ScanProgress::Started { total_files: 10 }.percent(), 0);
        assert_eq!(ScanProgress::BatchRead { processed: 3, total_files: 10 }.percent(), 30);
        assert_eq!(ScanProgress::BatchRead { processed: 0, total_files: 0 }.percent(), 100);
    }

    #[test]
    fn cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.batch_size, 20);
        assert!(config.extensions.iter().any(|e| e == "opus"));
    }
}
