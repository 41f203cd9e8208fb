//! Google Drive API v3.

use crate::error::Result;
use crate::http::{build_client, json_or_error, normalize_base};
use crate::provider::{degrade, CloudBrowser};
use async_trait::async_trait;
use cloudstream_core::{CloudAccount, CloudProvider, FileEntry};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,size,modifiedTime,webContentLink)";

/// Drive addresses folders by id, so `path` is a folder id (`""` = root)
#[derive(Debug, Clone)]
pub struct GoogleDriveBrowser {
    http: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: Option<String>,
    /// Drive sends sizes as strings
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    modified_time: Option<String>,
    #[serde(default)]
    web_content_link: Option<String>,
}

impl From<DriveFile> for FileEntry {
    fn from(file: DriveFile) -> Self {
        FileEntry {
            path: file.id.clone(),
            is_folder: file.mime_type.as_deref() == Some(FOLDER_MIME_TYPE),
            size: file.size.as_deref().and_then(|s| s.parse().ok()),
            id: file.id,
            name: file.name,
            modified_at: file.modified_time,
            mime_type: file.mime_type,
            download_url: file.web_content_link,
        }
    }
}

impl GoogleDriveBrowser {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    pub fn with_base_url(api_base: &str) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            api_base: normalize_base(api_base)?,
        })
    }

    async fn try_list(&self, token: &str, folder_id: &str) -> Result<Vec<FileEntry>> {
        let parent = if folder_id.is_empty() { "root" } else { folder_id };
        let query = parents_query(parent);
        let url = format!("{}/drive/v3/files", self.api_base);
        debug!(url = %url, parent = %parent, "Listing Drive folder");

        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.http.get(&url).bearer_auth(token).query(&[
                ("q", query.as_str()),
                ("fields", LIST_FIELDS),
                ("pageSize", "1000"),
            ]);
            if let Some(next) = page_token.as_deref() {
                request = request.query(&[("pageToken", next)]);
            }

            let page: FileList = json_or_error(request.send().await?, "Drive listing").await?;
            entries.extend(page.files.into_iter().map(FileEntry::from));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(entries)
    }

    /// Media URL carrying the access token as a query parameter
    fn media_url(&self, token: &str, file_id: &str) -> Result<String> {
        let mut url = Url::parse(&format!("{}/drive/v3/files/", self.api_base))?.join(file_id)?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("access_token", token);
        Ok(url.into())
    }
}

/// Drive `q` expression for the children of `parent`. Quotes and
/// backslashes in the id are escaped with `\`.
fn parents_query(parent: &str) -> String {
    let mut escaped = String::with_capacity(parent.len());
    for c in parent.chars() {
        if matches!(c, '\'' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("'{}' in parents and trashed = false", escaped)
}

#[async_trait]
impl CloudBrowser for GoogleDriveBrowser {
    fn provider(&self) -> CloudProvider {
        CloudProvider::GoogleDrive
    }

    async fn list_files(&self, account: &CloudAccount, path: &str) -> Vec<FileEntry> {
        let result = self.try_list(&account.access_token, path).await;
        degrade(CloudProvider::GoogleDrive, "list_files", result, Vec::new())
    }

    async fn download_url(&self, account: &CloudAccount, file: &FileEntry) -> Option<String> {
        if file.is_folder {
            return None;
        }
        let result = self.media_url(&account.access_token, &file.id).map(Some);
        degrade(CloudProvider::GoogleDrive, "download_url", result, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_query_escapes_quotes_and_backslashes() {
        assert_eq!(parents_query("root"), "'root' in parents and trashed = false");
        assert_eq!(
            parents_query(r"it's\x"),
            r"'it\'s\\x' in parents and trashed = false"
        );
    }

    #[test]
    fn media_url_carries_token() {
        let browser = GoogleDriveBrowser::new().unwrap();
        let url = browser.media_url("tok en", "abc123").unwrap();
        assert_eq!(
            url,
            "https://www.googleapis.com/drive/v3/files/abc123?alt=media&access_token=tok+en"
        );
    }
}
