//! Backblaze B2 through the browse endpoint.

use crate::browse::BrowseListing;
use crate::error::Result;
use crate::http::{build_client, json_or_error, normalize_base};
use crate::provider::{degrade, CloudBrowser};
use async_trait::async_trait;
use cloudstream_core::{CloudAccount, CloudProvider, FileEntry};
use reqwest::Client;
use tracing::debug;

/// Lists a bucket through `GET <endpoint>/browse?prefix=...`.
///
/// Bucket credentials stay on the endpoint; the account token is unused.
#[derive(Debug, Clone)]
pub struct B2Browser {
    http: Client,
    endpoint: String,
}

impl B2Browser {
    /// `endpoint` is the base the `/browse` route hangs off, e.g.
    /// `https://player.example.com/api`
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            endpoint: normalize_base(endpoint)?,
        })
    }

    /// Fetch one level of the bucket
    pub async fn browse(&self, prefix: &str) -> Result<BrowseListing> {
        let url = format!("{}/browse", self.endpoint);
        debug!(url = %url, prefix = %prefix, "Browsing bucket");

        let response = self
            .http
            .get(&url)
            .query(&[("prefix", prefix)])
            .send()
            .await?;
        json_or_error(response, "browse listing").await
    }
}

#[async_trait]
impl CloudBrowser for B2Browser {
    fn provider(&self) -> CloudProvider {
        CloudProvider::B2
    }

    async fn list_files(&self, _account: &CloudAccount, path: &str) -> Vec<FileEntry> {
        let listing = self.browse(path).await.map(|l| l.entries());
        degrade(CloudProvider::B2, "list_files", listing, Vec::new())
    }

    async fn download_url(&self, _account: &CloudAccount, file: &FileEntry) -> Option<String> {
        if file.is_folder {
            return None;
        }
        file.download_url.clone()
    }
}
