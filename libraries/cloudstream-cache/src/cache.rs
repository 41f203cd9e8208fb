use crate::error::Result;
use crate::index::{self, blob_name, CacheEntry};
use crate::stats::CacheStats;
use chrono::Utc;
use lru::LruCache;
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Track bytes kept on disk for offline playback.
///
/// Blobs live next to an `index.json` in one directory. Recency is tracked
/// by an unbounded [`LruCache`]; the size limit is enforced explicitly with
/// [`OfflineCache::evict_until_under`] rather than on insert.
///
/// Mutations write the index straight away. Accesses only mark it dirty; it
/// is written on the next mutation, on [`OfflineCache::flush`], or on drop.
pub struct OfflineCache {
    dir: PathBuf,
    entries: LruCache<String, CacheEntry>,
    dirty: bool,
    pub(crate) http: Client,
}

impl std::fmt::Debug for OfflineCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineCache")
            .field("dir", &self.dir)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl OfflineCache {
    /// Open (creating if needed) the cache in `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let mut entries = LruCache::unbounded();
        // Oldest first so the most recently accessed ends up at the front
        for entry in index::load(&dir) {
            entries.put(entry.id.clone(), entry);
        }
        info!(dir = %dir.display(), entries = entries.len(), "Opened offline cache");

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("cloudstream/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            dir,
            entries,
            dirty: false,
            http,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is cached. Does not count as an access.
    pub fn has(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    /// Bookkeeping for `id` without touching it
    pub fn entry(&self, id: &str) -> Option<&CacheEntry> {
        self.entries.peek(id)
    }

    /// Cached bytes for `id`, marking it as most recently accessed
    pub fn get(&mut self, id: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.touch(id)? else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(id, "Cached blob disappeared, dropping entry");
                self.entries.pop(id);
                self.save()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Path of the blob for `id`, marking it as most recently accessed
    pub fn touch(&mut self, id: &str) -> Result<Option<PathBuf>> {
        let Some(entry) = self.entries.get_mut(id) else {
            return Ok(None);
        };
        entry.last_accessed = Utc::now();
        self.dirty = true;
        Ok(Some(self.blob_path(id)))
    }

    /// Write pending access times to the index
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// Store `bytes` under `id`, replacing any previous copy
    pub fn put(&mut self, id: &str, bytes: &[u8]) -> Result<CacheEntry> {
        self.insert(id, bytes, None)
    }

    pub(crate) fn insert(&mut self, id: &str, bytes: &[u8], source: Option<String>) -> Result<CacheEntry> {
        index::write_atomic(&self.blob_path(id), bytes)?;

        let now = Utc::now();
        let entry = CacheEntry {
            id: id.to_string(),
            size: bytes.len() as u64,
            source,
            cached_at: now,
            last_accessed: now,
        };
        self.entries.put(id.to_string(), entry.clone());
        self.save()?;

        debug!(id, size = entry.size, "Cached blob");
        Ok(entry)
    }

    /// Drop `id`; returns whether it was cached
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if self.entries.pop(id).is_none() {
            return Ok(false);
        }
        self.delete_blob(id);
        self.save()?;
        Ok(true)
    }

    /// Drop everything
    pub fn clear(&mut self) -> Result<()> {
        let ids: Vec<String> = self.entries.iter().map(|(id, _)| id.clone()).collect();
        for id in &ids {
            self.delete_blob(id);
        }
        self.entries.clear();
        self.save()?;
        info!(removed = ids.len(), "Cleared offline cache");
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_files: self.entries.len(),
            total_bytes: self.total_bytes(),
            oldest_cached_at: self.entries.iter().map(|(_, e)| e.cached_at).min(),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|(_, e)| e.size).sum()
    }

    /// Evict least recently accessed blobs until the total is at most
    /// `max_bytes`. Returns how many were removed.
    pub fn evict_until_under(&mut self, max_bytes: u64) -> Result<usize> {
        let mut total = self.total_bytes();
        let mut evicted = 0;

        while total > max_bytes {
            let Some((id, entry)) = self.entries.pop_lru() else {
                break;
            };
            self.delete_blob(&id);
            total = total.saturating_sub(entry.size);
            evicted += 1;
        }

        if evicted > 0 {
            self.save()?;
            info!(evicted, remaining_bytes = total, "Evicted cached blobs");
        }
        Ok(evicted)
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.dir.join(blob_name(id))
    }

    fn delete_blob(&self, id: &str) {
        let path = self.blob_path(id);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(id, path = %path.display(), error = %e, "Failed to delete cached blob");
            }
        }
    }

    fn save(&mut self) -> Result<()> {
        // LruCache iterates most recent first; the index is written oldest first
        index::save(&self.dir, self.entries.iter().rev().map(|(_, e)| e))?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for OfflineCache {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(dir = %self.dir.display(), error = %e, "Failed to write offline cache index");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open() -> (TempDir, OfflineCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = OfflineCache::open(dir.path()).unwrap();
        (dir, cache)
    }

    #[test]
    fn put_get_remove() {
        let (_dir, mut cache) = open();
        assert!(!cache.has("a"));
        assert_eq!(cache.get("a").unwrap(), None);

        let entry = cache.put("a", b"hello").unwrap();
        assert_eq!(entry.size, 5);
        assert!(cache.has("a"));
        assert_eq!(cache.get("a").unwrap().as_deref(), Some(&b"hello"[..]));

        assert!(cache.remove("a").unwrap());
        assert!(!cache.remove("a").unwrap());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_replaces_previous_copy() {
        let (_dir, mut cache) = open();
        cache.put("a", b"one").unwrap();
        cache.put("a", b"three").unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 5);
        assert_eq!(cache.get("a").unwrap().as_deref(), Some(&b"three"[..]));
    }

    #[test]
    fn eviction_follows_access_order() {
        let (_dir, mut cache) = open();
        cache.put("a", &[0; 10]).unwrap();
        cache.put("b", &[0; 10]).unwrap();
        cache.put("c", &[0; 10]).unwrap();
        // a is now the most recent
        cache.get("a").unwrap();

        let evicted = cache.evict_until_under(15).unwrap();
        assert_eq!(evicted, 2);
        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert!(!cache.has("c"));
        assert_eq!(cache.evict_until_under(15).unwrap(), 0);
    }

    #[test]
    fn stats_cover_all_entries() {
        let (_dir, mut cache) = open();
        assert_eq!(cache.stats(), CacheStats::default());

        let first = cache.put("a", &[0; 3]).unwrap();
        cache.put("b", &[0; 4]).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_bytes, 7);
        assert_eq!(stats.oldest_cached_at, Some(first.cached_at));
    }

    #[test]
    fn reopen_restores_entries_and_order() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cache = OfflineCache::open(dir.path()).unwrap();
            cache.put("a", &[1; 4]).unwrap();
            cache.put("b", &[2; 4]).unwrap();
            cache.get("a").unwrap();
        }

        let mut cache = OfflineCache::open(dir.path()).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.entry("b").unwrap().size, 4);

        cache.evict_until_under(4).unwrap();
        assert!(cache.has("a"));
        assert!(!cache.has("b"));
    }

    fn indexed_ids(dir: &Path) -> Vec<String> {
        let raw = fs::read(dir.join("index.json")).unwrap();
        let index: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        index["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn reads_do_not_rewrite_index_until_flush() {
        let (dir, mut cache) = open();
        cache.put("a", b"x").unwrap();
        cache.put("b", b"y").unwrap();
        let before = fs::read(dir.path().join("index.json")).unwrap();

        for _ in 0..3 {
            cache.get("a").unwrap();
        }
        assert_eq!(fs::read(dir.path().join("index.json")).unwrap(), before);
        assert_eq!(indexed_ids(dir.path()), vec!["a", "b"]);

        cache.flush().unwrap();
        assert_eq!(indexed_ids(dir.path()), vec!["b", "a"]);
    }

    #[test]
    fn missing_blob_is_dropped_on_get() {
        let (dir, mut cache) = open();
        cache.put("a", b"x").unwrap();
        fs::remove_file(dir.path().join(blob_name("a"))).unwrap();

        assert_eq!(cache.get("a").unwrap(), None);
        assert!(!cache.has("a"));
    }

    #[test]
    fn clear_deletes_blobs() {
        let (dir, mut cache) = open();
        cache.put("a", b"x").unwrap();
        cache.put("b", b"y").unwrap();
        cache.clear().unwrap();

        assert!(cache.is_empty());
        assert!(!dir.path().join(blob_name("a")).exists());
        assert!(OfflineCache::open(dir.path()).unwrap().is_empty());
    }
}
