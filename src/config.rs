use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{defaults, limits};
use crate::services::{ProjectionOptions, RequestServiceOptions};

pub const URL_ENV: &str = "OVERSEERR_URL";
pub const API_KEY_ENV: &str = "OVERSEERR_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub overseerr: OverseerrConfig,

    pub projection: ProjectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverseerrConfig {
    pub url: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,

    /// Page size used when walking the upstream request list
    pub upstream_page_size: u32,
}

impl Default for OverseerrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5055".to_string(),
            api_key: String::new(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            upstream_page_size: limits::UPSTREAM_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub default_take: u32,

    /// Leave season 0 (specials) out of TV request projections
    pub skip_specials: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            default_take: limits::DEFAULT_TAKE,
            skip_specials: true,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.is_empty()) {
            self.overseerr.url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.overseerr.api_key = key;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("overseerr-bridge").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".overseerr-bridge").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.overseerr.url.is_empty() {
            anyhow::bail!("Overseerr URL cannot be empty (set [overseerr] url or {URL_ENV})");
        }

        url::Url::parse(&self.overseerr.url)
            .with_context(|| format!("Invalid Overseerr URL: {}", self.overseerr.url))?;

        if self.overseerr.api_key.is_empty() {
            anyhow::bail!(
                "Overseerr API key is not set (set [overseerr] api_key or {API_KEY_ENV})"
            );
        }

        if self.overseerr.request_timeout_seconds == 0 {
            anyhow::bail!("Request timeout must be > 0");
        }

        if self.overseerr.upstream_page_size == 0 {
            anyhow::bail!("Upstream page size must be > 0");
        }

        if self.projection.default_take == 0 || self.projection.default_take > limits::MAX_TAKE {
            anyhow::bail!("Default take must be between 1 and {}", limits::MAX_TAKE);
        }

        Ok(())
    }

    #[must_use]
    pub fn service_options(&self) -> RequestServiceOptions {
        RequestServiceOptions {
            default_take: self.projection.default_take,
            upstream_page_size: self.overseerr.upstream_page_size,
            projection: ProjectionOptions {
                skip_specials: self.projection.skip_specials,
            },
        }
    }
}
