/// Cloud storage account and file types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported cloud storage providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloudProvider {
    /// Backblaze B2 via the browse endpoint
    B2,
    Dropbox,
    GoogleDrive,
    #[serde(rename = "onedrive")]
    OneDrive,
}

impl CloudProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::B2 => "b2",
            Self::Dropbox => "dropbox",
            Self::GoogleDrive => "google-drive",
            Self::OneDrive => "onedrive",
        }
    }

    /// Human-readable provider name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::B2 => "Backblaze B2",
            Self::Dropbox => "Dropbox",
            Self::GoogleDrive => "Google Drive",
            Self::OneDrive => "OneDrive",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CloudProvider {
    type Err = crate::CloudstreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "b2" => Ok(Self::B2),
            "dropbox" => Ok(Self::Dropbox),
            "google-drive" | "gdrive" => Ok(Self::GoogleDrive),
            "onedrive" => Ok(Self::OneDrive),
            other => Err(crate::CloudstreamError::invalid_input(format!(
                "unknown cloud provider: {}",
                other
            ))),
        }
    }
}

/// Connected cloud account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAccount {
    pub provider: CloudProvider,

    pub email: String,

    /// OAuth access token (or B2 application key for the browse endpoint)
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl CloudAccount {
    /// Whether the access token has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// File or folder returned by a provider listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Provider-specific id
    pub id: String,

    pub name: String,

    /// Provider path (or prefix for B2)
    pub path: String,

    pub is_folder: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Direct download URL when the listing already provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl FileEntry {
    /// Lower-cased extension of the entry name, without the dot
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn provider_wire_names() {
        assert_eq!(
            serde_json::to_string(&CloudProvider::GoogleDrive).unwrap(),
            "\"google-drive\""
        );
        assert_eq!(
            serde_json::to_string(&CloudProvider::OneDrive).unwrap(),
            "\"onedrive\""
        );
        assert_eq!("b2".parse::<CloudProvider>().unwrap(), CloudProvider::B2);
        assert!("ftp".parse::<CloudProvider>().is_err());
    }

    #[test]
    fn account_expiry() {
        let now = Utc::now();
        let account = CloudAccount {
            provider: CloudProvider::Dropbox,
            email: "me@example.com".into(),
            access_token: "tok".into(),
            refresh_token: None,
            expires_at: now + Duration::minutes(5),
        };

        assert!(!account.is_expired(now));
        assert!(account.is_expired(now + Duration::minutes(5)));
    }

    #[test]
    fn entry_extension() {
        let mut entry = FileEntry {
            id: "1".into(),
            name: "Song.FLAC".into(),
            path: "/Song.FLAC".into(),
            is_folder: false,
            size: None,
            modified_at: None,
            mime_type: None,
            download_url: None,
        };
        assert_eq!(entry.extension().as_deref(), Some("flac"));

        entry.name = ".hidden".into();
        assert_eq!(entry.extension(), None);
    }
}
