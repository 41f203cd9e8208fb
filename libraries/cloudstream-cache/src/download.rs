use crate::cache::OfflineCache;
use crate::error::{CacheError, Result};
use futures_util::StreamExt;
use tracing::{debug, info};

/// Upper bound on the buffer reserved up front from a Content-Length header
const MAX_PREALLOCATION: usize = 8 << 20;

impl OfflineCache {
    /// Cached bytes for `id`, downloading them from `url` first if needed.
    ///
    /// `progress` receives the downloaded fraction in `0.0..=1.0` as chunks
    /// arrive, but only when the server announces a content length. A cache
    /// hit returns immediately without calling it.
    pub async fn download_and_cache<F>(&mut self, id: &str, url: &str, mut progress: F) -> Result<Vec<u8>>
    where
        F: FnMut(f64),
    {
        if let Some(bytes) = self.get(id)? {
            debug!(id, "Offline cache hit");
            return Ok(bytes);
        }

        info!(id, url, "Downloading for offline playback");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            });
        }

        let total = response.content_length().filter(|&len| len > 0);
        let mut bytes = Vec::with_capacity(initial_capacity(total));
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
            if let Some(total) = total {
                progress((bytes.len() as f64 / total as f64).min(1.0));
            }
        }

        self.insert(id, &bytes, Some(url.to_string()))?;
        Ok(bytes)
    }
}

/// Reservation for a body of announced length `content_length`. The header
/// is not trusted; the buffer grows past this as chunks arrive.
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0)
        .min(MAX_PREALLOCATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preallocation_is_capped() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(1536)), 1536);
        assert_eq!(initial_capacity(Some(1 << 40)), MAX_PREALLOCATION);
        assert_eq!(initial_capacity(Some(u64::MAX)), MAX_PREALLOCATION);
    }
}
