//! Catalog loader: fetches the library document over HTTP.

use crate::error::{LibraryError, Result};
use crate::store::LibraryStore;
use cloudstream_core::LibraryDocument;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default request timeout.
///
/// The browser build waits indefinitely on a hung request; a bounded wait
/// lets the store reach `Failed` and offer a retry instead.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to fetch the library document
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub url: String,
    pub timeout: Duration,
}

impl LoaderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP fetcher for the library document
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    http: Client,
    url: String,
}

impl CatalogLoader {
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let url = config.url.trim().to_string();
        if url.is_empty() {
            return Err(LibraryError::InvalidUrl("URL cannot be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(LibraryError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("CloudstreamPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the document, bypassing HTTP caches.
    ///
    /// Any non-success status or parse failure is an error; there is no
    /// partial result.
    pub async fn fetch(&self) -> Result<LibraryDocument> {
        debug!(url = %self.url, "Fetching library document");

        let response = self
            .http
            .get(&self.url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LibraryError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let doc: LibraryDocument =
            serde_json::from_slice(&body).map_err(|e| LibraryError::Parse(e.to_string()))?;

        info!(
            url = %self.url,
            tracks = doc.tracks.len(),
            playlists = doc.playlists.len(),
            version = ?doc.version,
            "Fetched library document"
        );
        Ok(doc)
    }
}

/// Load (or refresh) the library into `store`.
///
/// The lock is released while the request is in flight, so a second call
/// supersedes this one and the superseded result is discarded. Returns
/// whether the fetched catalog was applied.
pub async fn load_library(store: &Mutex<LibraryStore>, loader: &CatalogLoader) -> Result<bool> {
    let ticket = store.lock().await.begin_load();

    match loader.fetch().await {
        Ok(doc) => Ok(store
            .lock()
            .await
            .finish_load(ticket, Ok::<_, LibraryError>(doc))),
        Err(e) => {
            store.lock().await.finish_load(ticket, Err(&e));
            Err(e)
        }
    }
}
