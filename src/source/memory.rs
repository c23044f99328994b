//! In-memory source
//!
//! Holds a mutable id list and item map. Used by tests to simulate upstream
//! churn (new ids at the front, evictions at the back) and by offline demos.

use super::types::{Item, ItemStore, SourceList};
use crate::error::{Error, Result};
use crate::types::ItemId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    ids: Vec<ItemId>,
    items: HashMap<ItemId, Item>,
    failure: Option<String>,
}

/// Upstream stand-in backed by memory
#[derive(Debug, Default)]
pub struct MemorySource {
    state: RwLock<MemoryState>,
    snapshot_fetches: AtomicUsize,
    item_fetches: AtomicUsize,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source whose ids each map to a linked story (`url{id}`)
    pub fn with_stories(ids: &[ItemId]) -> Self {
        let items = ids
            .iter()
            .map(|&id| (id, Item::story(id, format!("url{id}"))))
            .collect();

        Self {
            state: RwLock::new(MemoryState {
                ids: ids.to_vec(),
                items,
                failure: None,
            }),
            ..Self::default()
        }
    }

    /// Replace the id list
    pub async fn set_ids(&self, ids: Vec<ItemId>) {
        self.state.write().await.ids = ids;
    }

    /// Insert or replace an item
    pub async fn upsert(&self, item: Item) {
        self.state.write().await.items.insert(item.id, item);
    }

    /// Add linked stories for every id that has no item yet
    pub async fn add_stories(&self, ids: &[ItemId]) {
        let mut state = self.state.write().await;
        for &id in ids {
            state
                .items
                .entry(id)
                .or_insert_with(|| Item::story(id, format!("url{id}")));
        }
    }

    /// Remove an item, making it absent upstream
    pub async fn remove(&self, id: ItemId) {
        self.state.write().await.items.remove(&id);
    }

    /// Make every following fetch fail with an upstream error
    ///
    /// Pass `None` to restore normal behavior.
    pub async fn set_failure(&self, message: Option<String>) {
        self.state.write().await.failure = message;
    }

    /// Number of id snapshot fetches served
    pub fn snapshot_fetches(&self) -> usize {
        self.snapshot_fetches.load(Ordering::SeqCst)
    }

    /// Number of item fetches served
    pub fn item_fetches(&self) -> usize {
        self.item_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceList for MemorySource {
    async fn fetch_id_snapshot(&self) -> Result<Vec<ItemId>> {
        self.snapshot_fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        if let Some(message) = &state.failure {
            return Err(Error::upstream(message.clone()));
        }
        Ok(state.ids.clone())
    }
}

#[async_trait]
impl ItemStore for MemorySource {
    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>> {
        self.item_fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        if let Some(message) = &state.failure {
            return Err(Error::upstream(message.clone()));
        }
        Ok(state.items.get(&id).cloned())
    }
}
