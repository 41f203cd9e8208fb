//! B2 bucket listings as served by the browse endpoint.
//!
//! The endpoint lists one "directory" of a bucket at a time using `/` as the
//! delimiter and answers with
//!
//! ```json
//! { "folders": [{"type": "folder", "name": "2023", "prefix": "2023/"}],
//!   "files":   [{"type": "file", "name": "a.mp3", "fileName": "2023/a.mp3", "size": 1, "url": "..."}],
//!   "images":  [{"name": "cover.jpg", "fileName": "2023/cover.jpg", "url": "..."}],
//!   "prefix":  "2023/" }
//! ```
//!
//! [`BrowseListing::from_b2`] builds that shape from a raw
//! `b2_list_file_names` response.

use crate::error::Result;
use crate::provider::has_extension;
use cloudstream_core::FileEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Audio formats the browse endpoint surfaces as playable files
pub const BROWSE_AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "ogg", "m4a", "aac"];

/// Image formats surfaced for artwork
pub const BROWSE_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const DIRECTORY_CONTENT_TYPES: &[&str] = &["application/x-directory", "inode/directory"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Folder,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseFolder {
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    /// Last path segment, without the trailing `/`
    pub name: String,
    /// Full prefix to browse into
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseFile {
    #[serde(rename = "type", default = "file_kind")]
    pub kind: EntryKind,
    /// Name relative to the listed prefix
    pub name: String,
    /// Full object key
    pub file_name: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

fn file_kind() -> EntryKind {
    EntryKind::File
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseImage {
    pub name: String,
    pub file_name: String,
    pub url: String,
}

/// One level of a bucket
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseListing {
    pub folders: Vec<BrowseFolder>,
    pub files: Vec<BrowseFile>,
    pub images: Vec<BrowseImage>,
    pub prefix: String,
}

/// Raw `b2_list_file_names` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct B2ListResponse {
    pub files: Vec<B2File>,
    pub common_prefixes: Vec<String>,
    pub next_file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct B2File {
    pub file_name: String,
    pub content_length: u64,
    pub content_type: Option<String>,
    /// `"upload"`, `"folder"`, ...
    pub action: Option<String>,
}

impl B2File {
    fn is_directory(&self) -> bool {
        self.file_name.ends_with('/')
            || self.action.as_deref() == Some("folder")
            || self
                .content_type
                .as_deref()
                .is_some_and(|ct| DIRECTORY_CONTENT_TYPES.iter().any(|d| ct.eq_ignore_ascii_case(d)))
    }
}

/// Where public file URLs point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnConfig {
    /// e.g. `https://f001.backblazeb2.com`
    pub base_url: String,
    pub bucket: String,
}

impl CdnConfig {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bucket: bucket.into(),
        }
    }

    /// `<base>/file/<bucket>/<key>` with every key segment percent-encoded
    pub fn file_url(&self, file_name: &str) -> Result<String> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| crate::error::CloudError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("file")
            .push(&self.bucket)
            .extend(file_name.split('/'));
        Ok(url.into())
    }
}

impl BrowseListing {
    /// Normalise a raw listing of `prefix`.
    ///
    /// Folders come from common prefixes and from directory markers in the
    /// file list. Files that are neither audio nor images are dropped.
    pub fn from_b2(raw: &B2ListResponse, prefix: &str, cdn: &CdnConfig) -> Result<Self> {
        let mut listing = BrowseListing {
            prefix: prefix.to_string(),
            ..Self::default()
        };
        let mut seen = HashSet::new();

        let directory_keys = raw
            .files
            .iter()
            .filter(|f| f.is_directory())
            .map(|f| f.file_name.as_str());

        for key in raw.common_prefixes.iter().map(String::as_str).chain(directory_keys) {
            let folder_prefix = if key.ends_with('/') {
                key.to_string()
            } else {
                format!("{}/", key)
            };
            if !seen.insert(folder_prefix.clone()) {
                continue;
            }

            let name = relative(&folder_prefix, prefix).trim_end_matches('/').to_string();
            if name.is_empty() {
                continue;
            }
            listing.folders.push(BrowseFolder {
                kind: EntryKind::Folder,
                name,
                prefix: folder_prefix,
            });
        }

        for file in raw.files.iter().filter(|f| !f.is_directory()) {
            let name = relative(&file.file_name, prefix).to_string();
            if has_extension(&file.file_name, BROWSE_AUDIO_EXTENSIONS) {
                listing.files.push(BrowseFile {
                    kind: EntryKind::File,
                    name,
                    file_name: file.file_name.clone(),
                    size: file.content_length,
                    url: cdn.file_url(&file.file_name)?,
                });
            } else if has_extension(&file.file_name, BROWSE_IMAGE_EXTENSIONS) {
                listing.images.push(BrowseImage {
                    name,
                    file_name: file.file_name.clone(),
                    url: cdn.file_url(&file.file_name)?,
                });
            }
        }

        Ok(listing)
    }

    /// Folders then audio files as provider-neutral entries
    pub fn entries(&self) -> Vec<FileEntry> {
        let folders = self.folders.iter().map(|f| FileEntry {
            id: f.prefix.clone(),
            name: f.name.clone(),
            path: f.prefix.clone(),
            is_folder: true,
            size: None,
            modified_at: None,
            mime_type: None,
            download_url: None,
        });
        let files = self.files.iter().map(|f| FileEntry {
            id: f.file_name.clone(),
            name: f.name.clone(),
            path: f.file_name.clone(),
            is_folder: false,
            size: Some(f.size),
            modified_at: None,
            mime_type: None,
            download_url: Some(f.url.clone()),
        });
        folders.chain(files).collect()
    }

    /// First image whose name looks like cover art, else the first image
    pub fn cover_image(&self) -> Option<&BrowseImage> {
        const COVER_STEMS: &[&str] = &["cover", "folder", "front", "album"];
        self.images
            .iter()
            .find(|img| {
                let stem = img.name.rsplit_once('.').map_or(img.name.as_str(), |(s, _)| s);
                COVER_STEMS.iter().any(|c| stem.eq_ignore_ascii_case(c))
            })
            .or_else(|| self.images.first())
    }
}

fn relative<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cdn() -> CdnConfig {
        CdnConfig::new("https://f001.backblazeb2.com", "music")
    }

    fn file(name: &str, size: u64, content_type: Option<&str>) -> B2File {
        B2File {
            file_name: name.into(),
            content_length: size,
            content_type: content_type.map(str::to_string),
            action: Some("upload".into()),
        }
    }

    #[test]
    fn splits_folders_audio_and_images() {
        let raw = B2ListResponse {
            files: vec![
                file("2023/Live Set/", 0, None),
                file("2023/Extras", 0, Some("application/x-directory")),
                file("2023/01 Intro.MP3", 1000, Some("audio/mpeg")),
                file("2023/cover.jpg", 200, Some("image/jpeg")),
                file("2023/notes.txt", 10, Some("text/plain")),
            ],
            common_prefixes: vec!["2023/Album A/".into(), "2023/Live Set/".into()],
            next_file_name: None,
        };

        let listing = BrowseListing::from_b2(&raw, "2023/", &cdn()).unwrap();

        let folders: Vec<_> = listing.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(folders, vec!["Album A", "Live Set", "Extras"]);
        assert_eq!(listing.folders[2].prefix, "2023/Extras/");

        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "01 Intro.MP3");
        assert_eq!(listing.files[0].size, 1000);
        assert_eq!(
            listing.files[0].url,
            "https://f001.backblazeb2.com/file/music/2023/01%20Intro.MP3"
        );

        assert_eq!(listing.images.len(), 1);
        assert_eq!(listing.cover_image().unwrap().name, "cover.jpg");
        assert_eq!(listing.prefix, "2023/");
    }

    #[test]
    fn url_encodes_each_segment() {
        let url = cdn().file_url("Rock & Roll/Track #1?.flac").unwrap();
        assert_eq!(
            url,
            "https://f001.backblazeb2.com/file/music/Rock%20&%20Roll/Track%20%231%3F.flac"
        );
    }

    #[test]
    fn entries_put_folders_first() {
        let raw = B2ListResponse {
            files: vec![file("b.flac", 5, None)],
            common_prefixes: vec!["a/".into()],
            next_file_name: None,
        };
        let entries = BrowseListing::from_b2(&raw, "", &cdn()).unwrap().entries();

        assert!(entries[0].is_folder);
        assert_eq!(entries[0].path, "a/");
        assert_eq!(entries[1].download_url.as_deref(), Some("https://f001.backblazeb2.com/file/music/b.flac"));
    }

    #[test]
    fn wire_shape_round_trips() {
        let json = r#"{
            "folders": [{"type": "folder", "name": "2023", "prefix": "2023/"}],
            "files": [{"type": "file", "name": "a.mp3", "fileName": "x/a.mp3", "size": 3, "url": "https://cdn/x/a.mp3"}],
            "prefix": ""
        }"#;
        let listing: BrowseListing = serde_json::from_str(json).unwrap();
        assert!(listing.images.is_empty());
        assert_eq!(listing.files[0].kind, EntryKind::File);

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["folders"][0]["type"], "folder");
        assert_eq!(value["files"][0]["fileName"], "x/a.mp3");
    }
}
