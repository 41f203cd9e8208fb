//! Dropbox API v2.

use crate::error::Result;
use crate::http::{build_client, json_or_error, normalize_base};
use crate::provider::{degrade, CloudBrowser};
use async_trait::async_trait;
use cloudstream_core::{CloudAccount, CloudProvider, FileEntry};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.dropboxapi.com/2";

#[derive(Debug, Clone)]
pub struct DropboxBrowser {
    http: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<DropboxEntry>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct DropboxEntry {
    #[serde(rename = ".tag")]
    tag: String,
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    path_lower: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    server_modified: Option<String>,
}

impl From<DropboxEntry> for FileEntry {
    fn from(entry: DropboxEntry) -> Self {
        let path = entry
            .path_lower
            .unwrap_or_else(|| format!("/{}", entry.name.to_lowercase()));
        FileEntry {
            id: entry.id.unwrap_or_else(|| path.clone()),
            is_folder: entry.tag == "folder",
            name: entry.name,
            path,
            size: entry.size,
            modified_at: entry.server_modified,
            mime_type: None,
            download_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TemporaryLink {
    link: String,
}

impl DropboxBrowser {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    pub fn with_base_url(api_base: &str) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            api_base: normalize_base(api_base)?,
        })
    }

    async fn try_list(&self, token: &str, path: &str) -> Result<Vec<FileEntry>> {
        let url = format!("{}/files/list_folder", self.api_base);
        debug!(url = %url, path = %path, "Listing Dropbox folder");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({
                "path": path,
                "recursive": false,
                "include_media_info": true,
            }))
            .send()
            .await?;
        let mut page: ListFolderResponse = json_or_error(response, "Dropbox listing").await?;
        let mut entries: Vec<FileEntry> = page.entries.drain(..).map(FileEntry::from).collect();

        while page.has_more {
            let Some(cursor) = page.cursor.take() else {
                break;
            };
            let response = self
                .http
                .post(format!("{}/files/list_folder/continue", self.api_base))
                .bearer_auth(token)
                .json(&json!({ "cursor": cursor }))
                .send()
                .await?;
            page = json_or_error(response, "Dropbox listing").await?;
            entries.extend(page.entries.drain(..).map(FileEntry::from));
        }

        Ok(entries)
    }

    async fn try_download_url(&self, token: &str, path: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/files/get_temporary_link", self.api_base))
            .bearer_auth(token)
            .json(&json!({ "path": path }))
            .send()
            .await?;
        let link: TemporaryLink = json_or_error(response, "temporary link").await?;
        Ok(link.link)
    }
}

#[async_trait]
impl CloudBrowser for DropboxBrowser {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Dropbox
    }

    async fn list_files(&self, account: &CloudAccount, path: &str) -> Vec<FileEntry> {
        let result = self.try_list(&account.access_token, path).await;
        degrade(CloudProvider::Dropbox, "list_files", result, Vec::new())
    }

    async fn download_url(&self, account: &CloudAccount, file: &FileEntry) -> Option<String> {
        let result = self
            .try_download_url(&account.access_token, &file.path)
            .await
            .map(Some);
        degrade(CloudProvider::Dropbox, "download_url", result, None)
    }
}
