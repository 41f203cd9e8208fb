//! Cloudstream Player Metadata
//!
//! Tag reading and local folder import.
//!
//! This crate provides:
//! - Tag reading from audio files with embedded artwork as data URIs
//! - Recursive folder discovery
//! - Batched, cancellable import into library tracks
//!
//! # Example
//!
//! ```rust,no_run
//! use cloudstream_metadata::{CancellationFlag, FolderScanner, ScanProgress};
//! use std::path::Path;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = FolderScanner::new()
//!     .on_progress(Box::new(|p: &ScanProgress| println!("{}%", p.percent())));
//! let cancel = CancellationFlag::new();
//!
//! let outcome = scanner.scan(Path::new("/music"), &cancel).await?;
//! println!("{} tracks, {} unreadable", outcome.tracks.len(), outcome.failures.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod metadata;
mod reader;
mod scanner;

pub use error::{MetadataError, Result};
pub use metadata::{track_from_metadata, TrackMetadata};
pub use reader::{data_uri, LoftyMetadataReader};
pub use scanner::{
    discover_files, CancellationFlag, FolderScanner, ProgressCallback, ScanConfig, ScanFailure,
    ScanOutcome, ScanProgress,
};
