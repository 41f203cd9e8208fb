//! Shared HTTP plumbing for provider clients.

use crate::error::{CloudError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client with the defaults every provider binding uses
pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("CloudstreamPlayer/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(CloudError::Request)
}

/// Parse a successful response as JSON, or turn the status into an error
pub(crate) async fn json_or_error<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CloudError::Http {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| CloudError::Parse(format!("Failed to parse {}: {}", what, e)))
}

/// `base` without a trailing slash
pub(crate) fn normalize_base(base: &str) -> Result<String> {
    let base = base.trim_end_matches('/');
    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(CloudError::InvalidUrl(format!(
            "URL must start with http:// or https://: {}",
            base
        )));
    }
    Ok(base.to_string())
}
