//! Hacker News Firebase API source
//!
//! - ids: `GET {base_url}/{new_stories_path}.json` → `[id, ...]`
//! - item: `GET {base_url}/item/{id}.json` → item object or `null`

use super::types::{Item, ItemStore, SourceList};
use crate::config::UpstreamConfig;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::types::{ItemId, JsonValue};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Default id list (newest first)
pub const DEFAULT_NEW_STORIES_PATH: &str = "newstories";

/// Upstream source backed by the Hacker News HTTP API
#[derive(Debug)]
pub struct HackerNewsSource {
    client: HttpClient,
    new_stories_path: String,
}

impl HackerNewsSource {
    /// Create a source over an already configured client
    ///
    /// The client's base URL must point at the API root.
    pub fn new(client: HttpClient, new_stories_path: impl Into<String>) -> Self {
        Self {
            client,
            new_stories_path: new_stories_path.into(),
        }
    }

    /// Build the client and source from upstream configuration
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let http = HttpClientConfig::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_retries(config.max_retries)
            .rate_limit(RateLimiterConfig::new(
                config.requests_per_second,
                config.burst_size,
            ))
            .build();

        Ok(Self::new(
            HttpClient::with_config(http)?,
            &config.new_stories_path,
        ))
    }

    fn snapshot_path(&self) -> String {
        format!("{}.json", self.new_stories_path.trim_matches('/'))
    }

    fn item_path(id: ItemId) -> String {
        format!("item/{id}.json")
    }
}

#[async_trait]
impl SourceList for HackerNewsSource {
    async fn fetch_id_snapshot(&self) -> Result<Vec<ItemId>> {
        let ids: Option<Vec<ItemId>> = self.client.get_json(&self.snapshot_path()).await?;
        let ids = ids.unwrap_or_default();
        debug!(count = ids.len(), "Fetched id snapshot");
        Ok(ids)
    }
}

#[async_trait]
impl ItemStore for HackerNewsSource {
    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>> {
        let value: JsonValue = self.client.get_json(&Self::item_path(id)).await?;
        if value.is_null() {
            debug!(id, "Item does not exist upstream");
            return Ok(None);
        }

        match serde_json::from_value::<Item>(value) {
            Ok(item) => Ok(Some(item)),
            Err(e) => {
                warn!(id, "Skipping malformed item: {e}");
                Ok(None)
            }
        }
    }
}
