//! Cloud storage access for Cloudstream Player.
//!
//! Each provider is wrapped in a [`CloudBrowser`] that lists folders and
//! resolves streamable URLs, all returning the shared [`FileEntry`] shape.
//! Provider failures are logged and degrade to empty results.
//!
//! [`oauth`] holds the PKCE bookkeeping for connecting accounts, and
//! [`browse`] the bucket listing format served to web players.
//!
//! [`FileEntry`]: cloudstream_core::FileEntry

pub mod browse;
pub mod error;
mod http;
pub mod oauth;
pub mod provider;
pub mod providers;

pub use browse::{B2ListResponse, BrowseListing, CdnConfig};
pub use error::{CloudError, Result};
pub use oauth::{AuthorizationFlow, AuthorizationRequest, PkcePair, ProviderConfig};
pub use provider::{filter_audio_files, CloudAdapters, CloudBrowser, AUDIO_EXTENSIONS};
pub use providers::{B2Browser, DropboxBrowser, GoogleDriveBrowser, OneDriveBrowser};
