//! Offline cache for Cloudstream Player.
//!
//! Downloaded tracks are stored as opaque blobs in a single directory and
//! tracked in `index.json`, so the cache survives restarts. Eviction is least
//! recently accessed first.
//!
//! # Example
//!
//! ```no_run
//! use cloudstream_cache::{format_bytes, OfflineCache};
//!
//! # async fn example() -> cloudstream_cache::Result<()> {
//! let mut cache = OfflineCache::open("/tmp/cloudstream-cache")?;
//! let bytes = cache
//!     .download_and_cache("track-1", "https://cdn.example.com/a.flac", |p| {
//!         println!("{:.0}%", p * 100.0);
//!     })
//!     .await?;
//! println!("{} cached", format_bytes(bytes.len() as u64));
//!
//! cache.evict_until_under(2 * 1024 * 1024 * 1024)?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod download;
pub mod error;
mod index;
mod stats;

pub use cache::OfflineCache;
pub use error::{CacheError, Result};
pub use index::CacheEntry;
pub use stats::{format_bytes, CacheStats};
