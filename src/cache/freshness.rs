//! Time-bounded memoization
//!
//! A keyed cache whose entries expire after a per-entry TTL. Lookups that
//! miss (or hit an expired entry) run the caller's fetch and store the result.
//! Failed fetches are never stored. Inserts sweep out expired entries at
//! most once per [`SWEEP_INTERVAL`] of clock time, so the map stays bounded
//! by what was written recently.

use super::clock::{Clock, SystemClock};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Minimum clock time between sweeps triggered by inserts
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Keyed cache with per-entry expiry
///
/// Concurrent misses on the same key may each run their fetch; the last
/// writer wins. The lock is never held while a fetch is in flight.
pub struct FreshnessCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    last_sweep: Mutex<DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync> FreshnessCache<V> {
    /// Create a cache driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache driven by the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_sweep: Mutex::new(clock.now()),
            clock,
        }
    }

    /// Get a value if present and unexpired
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Store a value for `ttl`
    pub async fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = self.clock.now();
        let sweep = self.sweep_due(now);
        let mut entries = self.entries.write().await;

        if sweep {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(now));
            let removed = before - entries.len();
            if removed > 0 {
                debug!(removed, "Swept expired cache entries");
            }
        }
        entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: expiry(now, ttl),
            },
        );
    }

    /// Return the cached value, or run `fetch` and cache its result for `ttl`
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key).await {
            trace!(key, "cache hit");
            return Ok(value);
        }

        trace!(key, "cache miss");
        let value = fetch().await?;
        self.insert(key, value.clone(), ttl).await;
        Ok(value)
    }

    /// Drop one entry, returning whether it existed
    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    /// Claim the next sweep if `SWEEP_INTERVAL` has passed since the last one
    fn sweep_due(&self, now: DateTime<Utc>) -> bool {
        let mut last = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
        if now < expiry(*last, SWEEP_INTERVAL) {
            return false;
        }
        *last = now;
        true
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no entries are stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<V: Clone + Send + Sync> Default for FreshnessCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for FreshnessCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessCache")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
