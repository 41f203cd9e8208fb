//! Microsoft Graph (OneDrive).

use crate::error::Result;
use crate::http::{build_client, json_or_error, normalize_base};
use crate::provider::{degrade, CloudBrowser};
use async_trait::async_trait;
use cloudstream_core::{CloudAccount, CloudProvider, FileEntry};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://graph.microsoft.com/v1.0";

#[derive(Debug, Clone)]
pub struct OneDriveBrowser {
    http: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct Children {
    #[serde(default)]
    value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveItem {
    id: String,
    name: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    last_modified_date_time: Option<String>,
    #[serde(default)]
    folder: Option<serde_json::Value>,
    #[serde(default)]
    file: Option<FileFacet>,
    #[serde(default)]
    parent_reference: Option<ParentReference>,
    #[serde(rename = "@microsoft.graph.downloadUrl", default)]
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileFacet {
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParentReference {
    #[serde(default)]
    path: Option<String>,
}

impl From<DriveItem> for FileEntry {
    fn from(item: DriveItem) -> Self {
        let parent = item
            .parent_reference
            .and_then(|p| p.path)
            .map(|p| p.replacen("/drive/root:", "", 1))
            .unwrap_or_default();
        FileEntry {
            path: format!("{}/{}", parent, item.name),
            is_folder: item.folder.is_some(),
            id: item.id,
            name: item.name,
            size: item.size,
            modified_at: item.last_modified_date_time,
            mime_type: item.file.and_then(|f| f.mime_type),
            download_url: item.download_url,
        }
    }
}

impl OneDriveBrowser {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    pub fn with_base_url(api_base: &str) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            api_base: normalize_base(api_base)?,
        })
    }

    fn children_url(&self, path: &str) -> String {
        if path.is_empty() || path == "/" {
            format!("{}/me/drive/root/children", self.api_base)
        } else {
            format!("{}/me/drive/root:{}:/children", self.api_base, path)
        }
    }

    async fn try_list(&self, token: &str, path: &str) -> Result<Vec<FileEntry>> {
        let mut url = self.children_url(path);
        debug!(url = %url, "Listing OneDrive folder");

        let mut entries = Vec::new();
        loop {
            let response = self.http.get(&url).bearer_auth(token).send().await?;
            let page: Children = json_or_error(response, "OneDrive listing").await?;
            entries.extend(page.value.into_iter().map(FileEntry::from));

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl CloudBrowser for OneDriveBrowser {
    fn provider(&self) -> CloudProvider {
        CloudProvider::OneDrive
    }

    async fn list_files(&self, account: &CloudAccount, path: &str) -> Vec<FileEntry> {
        let result = self.try_list(&account.access_token, path).await;
        degrade(CloudProvider::OneDrive, "list_files", result, Vec::new())
    }

    /// Graph listings already carry a pre-authenticated URL
    async fn download_url(&self, _account: &CloudAccount, file: &FileEntry) -> Option<String> {
        file.download_url.clone()
    }
}
