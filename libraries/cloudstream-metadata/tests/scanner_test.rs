//! Integration tests for folder import

use cloudstream_core::{TrackId, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use cloudstream_metadata::{CancellationFlag, FolderScanner, MetadataError, ScanConfig, ScanProgress};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Create a file with an audio extension but no decodable content
fn create_fake_audio(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create dir");
    }
    fs::write(&path, b"fLaC\x00\x00\x00\x22not really audio").expect("Failed to write file");
    path
}

fn scanner_with_batch(batch_size: usize) -> FolderScanner {
    FolderScanner::with_config(ScanConfig {
        batch_size,
        ..ScanConfig::default()
    })
}

#[tokio::test]
async fn discovers_recursively_and_skips_hidden_and_non_audio() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    create_fake_audio(root, "a.flac");
    create_fake_audio(root, "Album/b.MP3");
    create_fake_audio(root, ".hidden/c.mp3");
    create_fake_audio(root, "node_modules/d.mp3");
    fs::write(root.join("cover.jpg"), b"jpg").unwrap();

    let outcome = FolderScanner::new()
        .scan(root, &CancellationFlag::new())
        .await
        .expect("scan should succeed");

    assert_eq!(outcome.files_discovered, 2);
    assert!(!outcome.cancelled);
    let titles: Vec<_> = outcome.tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "a"]);
}

#[tokio::test]
async fn unreadable_files_become_stub_tracks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_fake_audio(temp_dir.path(), "01 Broken Song.flac");

    let outcome = FolderScanner::new()
        .scan(temp_dir.path(), &CancellationFlag::new())
        .await
        .expect("scan should succeed");

    assert_eq!(outcome.tracks.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].path, path);

    let track = &outcome.tracks[0];
    assert_eq!(track.title, "01 Broken Song");
    assert_eq!(track.artist, UNKNOWN_ARTIST);
    assert_eq!(track.album, UNKNOWN_ALBUM);
    assert_eq!(track.duration, 0.0);
    assert_eq!(track.format.as_deref(), Some("FLAC"));
    assert_eq!(track.id, TrackId::from_path(path.to_string_lossy()));
}

#[tokio::test]
async fn reports_progress_per_batch() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for i in 0..5 {
        create_fake_audio(temp_dir.path(), &format!("track_{:02}.mp3", i + 1));
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let scanner = scanner_with_batch(2).on_progress(Box::new(move |p: &ScanProgress| sink.lock().unwrap().push(p.clone())));

    let outcome = scanner
        .scan(temp_dir.path(), &CancellationFlag::new())
        .await
        .expect("scan should succeed");
    assert_eq!(outcome.tracks.len(), 5);

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            ScanProgress::Started { total_files: 5 },
            ScanProgress::BatchRead { processed: 2, total_files: 5 },
            ScanProgress::BatchRead { processed: 4, total_files: 5 },
            ScanProgress::BatchRead { processed: 5, total_files: 5 },
            ScanProgress::Completed { tracks: 5, failures: 5, cancelled: false },
        ]
    );
}

#[tokio::test]
async fn cancellation_stops_at_a_batch_boundary() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for i in 0..7 {
        create_fake_audio(temp_dir.path(), &format!("track_{:02}.ogg", i + 1));
    }

    let cancel = CancellationFlag::new();
    let trigger = cancel.clone();
    let scanner = scanner_with_batch(3).on_progress(Box::new(move |p: &ScanProgress| {
        if matches!(p, ScanProgress::BatchRead { .. }) {
            trigger.cancel();
        }
    }));

    let outcome = scanner.scan(temp_dir.path(), &cancel).await.expect("scan should succeed");

    assert!(outcome.cancelled);
    assert_eq!(outcome.files_discovered, 7);
    assert_eq!(outcome.tracks.len(), 3);
}

#[tokio::test]
async fn cancelled_before_start_reads_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_fake_audio(temp_dir.path(), "a.wav");

    let cancel = CancellationFlag::new();
    cancel.cancel();
    let outcome = FolderScanner::new().scan(temp_dir.path(), &cancel).await.unwrap();

    assert!(outcome.cancelled);
    assert!(outcome.tracks.is_empty());
    assert_eq!(outcome.files_discovered, 1);
}

#[tokio::test]
async fn single_file_root_and_missing_root() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file = create_fake_audio(temp_dir.path(), "solo.m4a");

    let outcome = FolderScanner::new().scan(&file, &CancellationFlag::new()).await.unwrap();
    assert_eq!(outcome.tracks.len(), 1);

    let missing = FolderScanner::new()
        .scan(&temp_dir.path().join("nope"), &CancellationFlag::new())
        .await;
    assert!(matches!(missing, Err(MetadataError::FileNotFound(_))));
}

#[tokio::test]
async fn artwork_rescan_skips_unreadable_and_pathless_tracks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_fake_audio(temp_dir.path(), "a.flac");

    let scanner = FolderScanner::new();
    let outcome = scanner.scan(temp_dir.path(), &CancellationFlag::new()).await.unwrap();
    let mut tracks = outcome.tracks;
    tracks.push(cloudstream_core::Track::new(TrackId::new("remote"), "Remote"));

    let found = scanner.rescan_artwork(&tracks).await.unwrap();
    assert!(found.is_empty());
}
