/// Metadata reader implementation using lofty
use crate::error::{MetadataError, Result};
use crate::metadata::{file_stem, format_label, TrackMetadata};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lofty::{Accessor, AudioFile, ItemKey, PictureType, TaggedFileExt};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Encoded artwork kept in memory, keyed by file and picture size
const ARTWORK_CACHE_SIZE: usize = 500;

type ArtworkKey = (PathBuf, usize);

/// Metadata reader using the lofty library
pub struct LoftyMetadataReader {
    artwork_cache: Mutex<LruCache<ArtworkKey, Arc<str>>>,
}

impl LoftyMetadataReader {
    /// Create a new metadata reader
    pub fn new() -> Self {
        Self::with_artwork_cache(ARTWORK_CACHE_SIZE)
    }

    /// Create a reader remembering up to `size` encoded pictures (min 1)
    pub fn with_artwork_cache(size: usize) -> Self {
        let size = NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN);
        Self {
            artwork_cache: Mutex::new(LruCache::new(size)),
        }
    }

    /// Read tags and audio properties from `path`
    pub fn read(&self, path: &Path) -> Result<TrackMetadata> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        let tagged_file = lofty::read_from_path(path)?;
        let properties = tagged_file.properties();

        let mut metadata = TrackMetadata {
            duration: properties.duration().as_secs_f64(),
            bitrate: properties.audio_bitrate(),
            sample_rate: properties.sample_rate(),
            format: format_label(path),
            ..TrackMetadata::default()
        };

        // Get primary tag or first available tag
        if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            metadata.title = tag.title().map(|s| s.to_string());
            metadata.artist = tag.artist().map(|s| s.to_string());
            metadata.album = tag.album().map(|s| s.to_string());
            metadata.album_artist = tag.get_string(&ItemKey::AlbumArtist).map(str::to_string);
            metadata.genre = tag.genre().map(|s| s.to_string());
            metadata.year = tag.year();
            metadata.track_number = tag.track();
            metadata.disc_number = tag.disk();
            metadata.artwork = self.encode_artwork(path, tag);
        }

        if metadata.title.is_none() {
            metadata.title = file_stem(path);
        }

        Ok(metadata)
    }

    /// Only the embedded picture of `path`, as a data URI
    pub fn read_artwork(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        let tagged_file = lofty::read_from_path(path)?;
        Ok(tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .and_then(|tag| self.encode_artwork(path, tag)))
    }

    /// Clear the artwork cache
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.artwork_cache.lock() {
            cache.clear();
        }
    }

    fn encode_artwork(&self, path: &Path, tag: &lofty::Tag) -> Option<String> {
        let pictures = tag.pictures();
        // Prefer front cover, otherwise use first picture
        let picture = pictures
            .iter()
            .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
            .or_else(|| pictures.first())?;

        let key = (path.to_path_buf(), picture.data().len());
        if let Ok(mut cache) = self.artwork_cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Some(cached.to_string());
            }
        }

        let mime_type = picture
            .mime_type()
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());
        let uri = data_uri(&mime_type, picture.data());
        debug!(path = %path.display(), bytes = picture.data().len(), "Encoded embedded artwork");

        if let Ok(mut cache) = self.artwork_cache.lock() {
            cache.put(key, Arc::from(uri.as_str()));
        }
        Some(uri)
    }
}

impl Default for LoftyMetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_nonexistent_file_returns_error() {
        let reader = LoftyMetadataReader::new();
        let result = reader.read(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(MetadataError::FileNotFound(_))));
    }

    #[test]
    fn garbage_file_is_a_lofty_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.flac");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let reader = LoftyMetadataReader::new();
        assert!(reader.read(&path).is_err());
        assert!(reader.read_artwork(&path).is_err());
    }

    #[test]
    fn data_uri_encodes_payload() {
        assert_eq!(data_uri("image/png", b"\x89PNG"), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn zero_cache_size_is_clamped() {
        let reader = LoftyMetadataReader::with_artwork_cache(0);
        reader.clear_cache();
        assert_eq!(reader.artwork_cache.lock().unwrap().cap().get(), 1);
    }
}
