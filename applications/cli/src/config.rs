/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "cloudstream.toml";

/// Prefix for environment overrides, e.g. `CLOUDSTREAM_LIBRARY__URL`
pub const ENV_PREFIX: &str = "CLOUDSTREAM";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_browse")]
    pub browse: BrowseSettings,

    #[serde(default = "default_cache")]
    pub cache: CacheSettings,

    #[serde(default = "default_window")]
    pub window: WindowSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Library document URL
    #[serde(default = "default_library_url")]
    pub url: String,

    /// Where playlists and sort preference are kept
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowseSettings {
    /// Base URL of the B2 browse endpoint
    #[serde(default = "default_browse_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Eviction target for `cache evict`
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowSettings {
    #[serde(default = "default_row_height")]
    pub row_height: f64,

    #[serde(default = "default_buffer_rows")]
    pub buffer_rows: usize,

    #[serde(default = "default_card_width")]
    pub card_width: f64,

    #[serde(default = "default_card_height")]
    pub card_height: f64,

    #[serde(default = "default_grid_buffer_rows")]
    pub grid_buffer_rows: usize,
}

impl CliConfig {
    /// Load configuration from file and environment.
    ///
    /// `path` must exist when given; otherwise `cloudstream.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (CLOUDSTREAM_<SECTION>__<KEY>)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        check_url("library.url", &self.library.url)?;
        check_url("browse.endpoint", &self.browse.endpoint)?;

        if self.library.timeout_secs == 0 {
            return Err(CliError::Config("library.timeout_secs must be positive".into()));
        }

        let extents = [
            ("window.row_height", self.window.row_height),
            ("window.card_width", self.window.card_width),
            ("window.card_height", self.window.card_height),
        ];
        for (name, value) in extents {
            if !(value.is_finite() && value > 0.0) {
                return Err(CliError::Config(format!("{} must be a positive number", name)));
            }
        }

        Ok(())
    }
}

fn check_url(name: &str, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CliError::Config(format!(
            "{} is required (set {}_{})",
            name,
            ENV_PREFIX,
            name.to_ascii_uppercase().replace('.', "__")
        )));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::Config(format!(
            "{} must start with http:// or https://",
            name
        )));
    }
    Ok(())
}

// Default values
fn default_library() -> LibrarySettings {
    LibrarySettings {
        url: default_library_url(),
        state_file: default_state_file(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_library_url() -> String {
    String::new()
}

fn default_state_file() -> PathBuf {
    PathBuf::from("./data/library-state.json")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_browse() -> BrowseSettings {
    BrowseSettings {
        endpoint: default_browse_endpoint(),
    }
}

fn default_browse_endpoint() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_cache() -> CacheSettings {
    CacheSettings {
        dir: default_cache_dir(),
        max_bytes: default_max_bytes(),
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./data/cache")
}

fn default_max_bytes() -> u64 {
    2 * 1024 * 1024 * 1024
}

fn default_window() -> WindowSettings {
    WindowSettings {
        row_height: default_row_height(),
        buffer_rows: default_buffer_rows(),
        card_width: default_card_width(),
        card_height: default_card_height(),
        grid_buffer_rows: default_grid_buffer_rows(),
    }
}

fn default_row_height() -> f64 {
    32.0
}

fn default_buffer_rows() -> usize {
    10
}

fn default_card_width() -> f64 {
    220.0
}

fn default_card_height() -> f64 {
    300.0
}

fn default_grid_buffer_rows() -> usize {
    2
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            browse: default_browse(),
            cache: default_cache(),
            window: default_window(),
        }
    }
}
