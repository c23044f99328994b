//! Cache module
//!
//! Time-bounded memoization in front of the upstream source, so page
//! requests are decoupled from upstream latency and rate limits.
//!
//! # Overview
//!
//! - `FreshnessCache` - generic keyed cache with per-entry TTL
//! - `FeedCache` - id snapshot and item caches with their TTLs
//! - `Clock` - injectable time source (`SystemClock`, `ManualClock`)

mod clock;
mod feed;
mod freshness;

pub use clock::{Clock, ManualClock, SystemClock};
pub use feed::{item_key, CacheTtls, FeedCache, SNAPSHOT_KEY};
pub use freshness::{FreshnessCache, SWEEP_INTERVAL};
