//! `index.json`: what is cached, how big it is and when it was last used.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub(crate) const INDEX_FILE: &str = "index.json";
const INDEX_VERSION: u32 = 1;

/// Bookkeeping for one cached blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub id: String,
    pub size: u64,
    /// Where the bytes came from, when downloaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub cached_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    entries: Vec<CacheEntry>,
}

/// Blob file name for `id`; ids are arbitrary strings so they are hashed
pub(crate) fn blob_name(id: &str) -> String {
    format!("{}.blob", hex::encode(Sha256::digest(id.as_bytes())))
}

/// Entries sorted least recently accessed first.
///
/// A missing, unreadable or foreign index yields an empty list. Entries
/// whose blob is gone are dropped.
pub(crate) fn load(dir: &Path) -> Vec<CacheEntry> {
    let path = dir.join(INDEX_FILE);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cache index unreadable, starting empty");
            return Vec::new();
        }
    };

    let index: IndexFile = match serde_json::from_slice(&bytes) {
        Ok(index) => index,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cache index corrupt, starting empty");
            return Vec::new();
        }
    };
    if index.version != INDEX_VERSION {
        warn!(version = index.version, "Unknown cache index version, starting empty");
        return Vec::new();
    }

    let mut entries: Vec<CacheEntry> = index
        .entries
        .into_iter()
        .filter(|entry| dir.join(blob_name(&entry.id)).is_file())
        .collect();
    // Stable so ties keep their written order
    entries.sort_by_key(|entry| entry.last_accessed);
    entries
}

/// Write `entries` (least recently accessed first) via a temp file + rename
pub(crate) fn save<'a>(dir: &Path, entries: impl Iterator<Item = &'a CacheEntry>) -> Result<()> {
    let index = IndexFile {
        version: INDEX_VERSION,
        entries: entries.cloned().collect(),
    };
    let json = serde_json::to_vec_pretty(&index)?;
    write_atomic(&dir.join(INDEX_FILE), &json)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp: PathBuf = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(id: &str, minutes_ago: i64) -> CacheEntry {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        CacheEntry {
            id: id.into(),
            size: 1,
            source: None,
            cached_at: at,
            last_accessed: at,
        }
    }

    #[test]
    fn blob_names_are_stable_hex() {
        let name = blob_name("track/1");
        assert_eq!(name, blob_name("track/1"));
        assert_ne!(name, blob_name("track/2"));
        assert_eq!(name.len(), 64 + ".blob".len());
        assert!(!name.contains('/'));
    }

    #[test]
    fn load_sorts_and_drops_missing_blobs() {
        let dir = tempfile::tempdir().unwrap();
        for id in ["new", "old"] {
            fs::write(dir.path().join(blob_name(id)), b"x").unwrap();
        }
        let entries = vec![entry("new", 1), entry("gone", 5), entry("old", 10)];
        save(dir.path(), entries.iter()).unwrap();

        let ids: Vec<_> = load(dir.path()).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["old", "new"]);
    }

    #[test]
    fn corrupt_or_missing_index_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).is_empty());

        fs::write(dir.path().join(INDEX_FILE), b"{not json").unwrap();
        assert!(load(dir.path()).is_empty());

        fs::write(dir.path().join(INDEX_FILE), br#"{"version": 99, "entries": []}"#).unwrap();
        assert!(load(dir.path()).is_empty());
    }
}
