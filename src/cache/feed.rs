//! Feed cache
//!
//! Puts a [`FreshnessCache`] in front of each upstream capability:
//! the id snapshot under `"newstories"` and each item under `"story:{id}"`.

use super::clock::{Clock, SystemClock};
use super::freshness::FreshnessCache;
use crate::error::{Error, Result};
use crate::source::{Item, ItemStore, SourceList};
use crate::types::ItemId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Cache key of the id snapshot
pub const SNAPSHOT_KEY: &str = "newstories";

/// Cache key of one item
pub fn item_key(id: ItemId) -> String {
    format!("story:{id}")
}

/// Expiry for each kind of cached value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// How long an id snapshot stays fresh
    pub snapshot: Duration,
    /// How long an item stays fresh
    pub item: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            snapshot: Duration::from_secs(60),
            item: Duration::from_secs(600),
        }
    }
}

/// Shared cache for id snapshots and items
#[derive(Debug)]
pub struct FeedCache {
    snapshots: FreshnessCache<Arc<[ItemId]>>,
    items: FreshnessCache<Option<Arc<Item>>>,
    ttls: CacheTtls,
}

impl FeedCache {
    /// Create a cache driven by the wall clock
    pub fn new(ttls: CacheTtls) -> Self {
        Self::with_clock(ttls, Arc::new(SystemClock))
    }

    /// Create a cache driven by the given clock
    pub fn with_clock(ttls: CacheTtls, clock: Arc<dyn Clock>) -> Self {
        Self {
            snapshots: FreshnessCache::with_clock(clock.clone()),
            items: FreshnessCache::with_clock(clock),
            ttls,
        }
    }

    /// Configured expiries
    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// Current id snapshot, fetched from `list` when stale
    pub async fn snapshot(&self, list: &dyn SourceList) -> Result<Arc<[ItemId]>> {
        self.snapshots
            .get_or_fetch(SNAPSHOT_KEY, self.ttls.snapshot, || async {
                let ids = list.fetch_id_snapshot().await?;
                debug!(count = ids.len(), "Refreshed id snapshot");
                Ok::<_, Error>(Arc::<[ItemId]>::from(ids))
            })
            .await
    }

    /// One item, fetched from `store` when stale
    ///
    /// Absent items are cached too.
    pub async fn item(&self, store: &dyn ItemStore, id: ItemId) -> Result<Option<Arc<Item>>> {
        self.items
            .get_or_fetch(&item_key(id), self.ttls.item, || async {
                Ok::<_, Error>(store.fetch_item(id).await?.map(Arc::new))
            })
            .await
    }

    /// Force the next request to refetch the id list
    pub async fn invalidate_snapshot(&self) -> bool {
        self.snapshots.invalidate(SNAPSHOT_KEY).await
    }

    /// Force the next request for `id` to refetch it
    pub async fn invalidate_item(&self, id: ItemId) -> bool {
        self.items.invalidate(&item_key(id)).await
    }

    /// Drop everything
    pub async fn clear(&self) {
        self.snapshots.clear().await;
        self.items.clear().await;
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        self.snapshots.purge_expired().await + self.items.purge_expired().await
    }

    /// Purge expired entries every `every` until the handle is aborted
    pub fn spawn_purge_task(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        let every = every.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut timer = interval(every);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired cache entries");
                }
            }
        })
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(CacheTtls::default())
    }
}
