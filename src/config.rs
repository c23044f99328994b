//! Configuration types for the story feed
//!
//! Loaded from YAML. Every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```yaml
//! upstream:
//!   base_url: https://hacker-news.firebaseio.com/v0
//!   new_stories_path: newstories
//! cache:
//!   snapshot_ttl_secs: 60
//! paging:
//!   max_page_size: 100
//! server:
//!   port: 8080
//! ```

use crate::cache::CacheTtls;
use crate::error::{Error, Result};
use crate::pagination::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use crate::source::{DEFAULT_BASE_URL, DEFAULT_NEW_STORIES_PATH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Hard upper bound for `paging.max_page_size`
pub const PAGE_SIZE_LIMIT: usize = 1000;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Upstream API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Cache expiry settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Page size limits
    #[serde(default)]
    pub paging: PagingConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
}

impl FeedConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and the upstream URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.upstream.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "upstream.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.upstream.new_stories_path.trim_matches('/').trim().is_empty() {
            return Err(Error::invalid_value(
                "upstream.new_stories_path",
                "must not be empty",
            ));
        }

        if self.upstream.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "upstream.requests_per_second",
                "must be greater than 0",
            ));
        }

        if self.cache.snapshot_ttl_secs == 0 {
            return Err(Error::invalid_value(
                "cache.snapshot_ttl_secs",
                "must be greater than 0",
            ));
        }

        if self.cache.item_ttl_secs == 0 {
            return Err(Error::invalid_value(
                "cache.item_ttl_secs",
                "must be greater than 0",
            ));
        }

        if self.cache.purge_interval_secs == 0 {
            return Err(Error::invalid_value(
                "cache.purge_interval_secs",
                "must be greater than 0",
            ));
        }

        if self.paging.max_page_size == 0 || self.paging.max_page_size > PAGE_SIZE_LIMIT {
            return Err(Error::invalid_value(
                "paging.max_page_size",
                format!("must be between 1 and {PAGE_SIZE_LIMIT}"),
            ));
        }

        if self.paging.default_page_size == 0
            || self.paging.default_page_size > self.paging.max_page_size
        {
            return Err(Error::invalid_value(
                "paging.default_page_size",
                format!("must be between 1 and {}", self.paging.max_page_size),
            ));
        }

        Ok(())
    }

    /// Cache expiries as durations
    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            snapshot: Duration::from_secs(self.cache.snapshot_ttl_secs),
            item: Duration::from_secs(self.cache.item_ttl_secs),
        }
    }

    /// How often the server purges expired cache entries
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.cache.purge_interval_secs)
    }
}

// ============================================================================
// Upstream
// ============================================================================

/// Upstream API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API root, e.g. `https://hacker-news.firebaseio.com/v0`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Id list endpoint name, without the `.json` suffix
    #[serde(default = "default_new_stories_path")]
    pub new_stories_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sustained request rate
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            new_stories_path: default_new_stories_path(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_new_stories_path() -> String {
    DEFAULT_NEW_STORIES_PATH.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst_size() -> u32 {
    10
}

// ============================================================================
// Cache
// ============================================================================

/// Cache expiry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Id snapshot TTL in seconds
    #[serde(default = "default_snapshot_ttl")]
    pub snapshot_ttl_secs: u64,

    /// Item TTL in seconds
    #[serde(default = "default_item_ttl")]
    pub item_ttl_secs: u64,

    /// Seconds between background purges of expired entries
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_ttl_secs: default_snapshot_ttl(),
            item_ttl_secs: default_item_ttl(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

fn default_snapshot_ttl() -> u64 {
    60
}

fn default_item_ttl() -> u64 {
    600
}

fn default_purge_interval() -> u64 {
    60
}

// ============================================================================
// Paging
// ============================================================================

/// Page size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size for CLI requests that do not set one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Largest page size a request may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    8080
}
