//! Configuration loading
//!
//! Loads `~/.config/holocron/holocron.toml` (or the file named by
//! `HOLOCRON_CONFIG`). A missing file means defaults; command-line flags are
//! applied on top by the caller.

use holocron_swapi::{DEFAULT_BASE_URL, DEFAULT_IMAGE_BASE_URL};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HolocronConfig {
    /// JSON file holding local overrides (`~` is expanded)
    #[serde(default = "default_edits_path")]
    pub edits_path: String,

    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_edits_path() -> String {
    dirs::data_dir()
        .map(|d| {
            d.join("holocron")
                .join("edits.json")
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|| "holocron-edits.json".to_string())
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// SWAPI base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Character portrait API base URL
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_image_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Quiet window before a search is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for HolocronConfig {
    fn default() -> Self {
        Self {
            edits_path: default_edits_path(),
            api: ApiConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl HolocronConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "HOLOCRON_CONFIG";

    pub const DEFAULT_CONFIG_FILENAME: &'static str = "holocron.toml";

    /// Load from `explicit`, else `HOLOCRON_CONFIG`, else the default
    /// location. A missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::resolve_config_path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: HolocronConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|d| d.join("holocron").join(Self::DEFAULT_CONFIG_FILENAME))
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("api.base_url", &self.api.base_url),
            ("api.image_base_url", &self.api.image_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be an http(s) URL, got {url:?}"
                )));
            }
        }

        if self.edits_path.trim().is_empty() {
            return Err(ConfigError::Invalid("edits_path is empty".to_string()));
        }

        if self.api.timeout_secs == 0 {
            tracing::warn!("api.timeout_secs is 0; requests will fail immediately");
        }

        Ok(())
    }

    /// Edits path with a leading `~/` expanded
    pub fn resolved_edits_path(&self) -> PathBuf {
        let path = &self.edits_path;
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}
