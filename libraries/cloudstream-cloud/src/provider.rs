//! Provider-independent browsing interface.

use crate::error::Result;
use crate::providers::{B2Browser, DropboxBrowser, GoogleDriveBrowser, OneDriveBrowser};
use async_trait::async_trait;
use cloudstream_core::{CloudAccount, CloudProvider, FileEntry};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Extensions treated as playable when filtering a provider listing
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "wav", "ogg", "m4a", "aac", "wma", "opus", "aiff", "ape", "wv",
];

/// One storage provider.
///
/// Implementations never fail: transport and parse problems are logged and
/// come back as an empty listing or `None`, so one provider going down does
/// not take the browser with it.
#[async_trait]
pub trait CloudBrowser: Send + Sync {
    fn provider(&self) -> CloudProvider;

    /// Entries directly under `path` (`""` for the root)
    async fn list_files(&self, account: &CloudAccount, path: &str) -> Vec<FileEntry>;

    /// A URL the player can stream `file` from
    async fn download_url(&self, account: &CloudAccount, file: &FileEntry) -> Option<String>;
}

/// Log a provider failure and fall back to `fallback`
pub(crate) fn degrade<T>(provider: CloudProvider, op: &str, result: Result<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(provider = %provider, op, error = %e, "Cloud request failed");
            fallback
        }
    }
}

/// Browsers keyed by provider
#[derive(Clone, Default)]
pub struct CloudAdapters {
    browsers: HashMap<CloudProvider, Arc<dyn CloudBrowser>>,
}

impl std::fmt::Debug for CloudAdapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<_> = self.browsers.keys().map(|p| p.as_str()).collect();
        providers.sort_unstable();
        f.debug_struct("CloudAdapters")
            .field("providers", &providers)
            .finish()
    }
}

impl CloudAdapters {
    pub fn new() -> Self {
        Self::default()
    }

    /// All four providers against their public endpoints.
    ///
    /// B2 goes through the browse endpoint at `browse_endpoint`.
    pub fn with_defaults(browse_endpoint: &str) -> Result<Self> {
        let mut adapters = Self::new();
        adapters.register(B2Browser::new(browse_endpoint)?);
        adapters.register(DropboxBrowser::new()?);
        adapters.register(GoogleDriveBrowser::new()?);
        adapters.register(OneDriveBrowser::new()?);
        Ok(adapters)
    }

    /// Add or replace the browser for its provider
    pub fn register<B: CloudBrowser + 'static>(&mut self, browser: B) {
        self.browsers.insert(browser.provider(), Arc::new(browser));
    }

    pub fn get(&self, provider: CloudProvider) -> Option<Arc<dyn CloudBrowser>> {
        self.browsers.get(&provider).cloned()
    }

    pub async fn list_files(&self, account: &CloudAccount, path: &str) -> Vec<FileEntry> {
        match self.browsers.get(&account.provider) {
            Some(browser) => browser.list_files(account, path).await,
            None => {
                warn!(provider = %account.provider, "No browser registered");
                Vec::new()
            }
        }
    }

    pub async fn download_url(&self, account: &CloudAccount, file: &FileEntry) -> Option<String> {
        match self.browsers.get(&account.provider) {
            Some(browser) => browser.download_url(account, file).await,
            None => {
                warn!(provider = %account.provider, "No browser registered");
                None
            }
        }
    }
}

/// Non-folder entries with an audio extension
pub fn filter_audio_files(files: &[FileEntry]) -> Vec<FileEntry> {
    files
        .iter()
        .filter(|f| !f.is_folder && is_audio_name(&f.name))
        .cloned()
        .collect()
}

pub(crate) fn is_audio_name(name: &str) -> bool {
    has_extension(name, AUDIO_EXTENSIONS)
}

pub(crate) fn has_extension(name: &str, extensions: &[&str]) -> bool {
    name.rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
