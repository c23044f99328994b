//! Cursor and page value types
//!
//! A `Cursor` is everything a client sends back to continue paginating;
//! a `Page` is what one request returns. Neither is retained server-side.

use crate::error::{Error, Result};
use crate::source::Item;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// Page size used when the client does not send one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size accepted by default
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// Cursor
// ============================================================================

/// Client-held pagination state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    /// Id of the last item the client has seen; unset on the first request
    #[serde(default)]
    pub start_after_id: Option<ItemId>,

    /// Newest id the client has fully paginated from
    #[serde(default)]
    pub current_head: Option<ItemId>,

    /// Id that becomes `current_head` once the walk catches up to it
    #[serde(default)]
    pub next_head: Option<ItemId>,

    /// Case-insensitive free-text filter
    #[serde(default)]
    pub search_query: Option<String>,

    /// Number of items per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            start_after_id: None,
            current_head: None,
            next_head: None,
            search_query: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Cursor {
    /// Cursor for the first page
    pub fn first_page(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Continue after `id`
    #[must_use]
    pub fn start_after(mut self, id: ItemId) -> Self {
        self.start_after_id = Some(id);
        self
    }

    /// Set both heads
    #[must_use]
    pub fn with_heads(mut self, current: ItemId, next: ItemId) -> Self {
        self.current_head = Some(current);
        self.next_head = Some(next);
        self
    }

    /// Set the search query
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// Cursor for the page following `page`
    ///
    /// Continues after the last returned item. An empty page keeps the
    /// previous position.
    pub fn next(&self, page: &Page) -> Self {
        Self {
            start_after_id: page.last_id().or(self.start_after_id),
            current_head: page.current_head,
            next_head: page.next_head,
            search_query: self.search_query.clone(),
            page_size: self.page_size,
        }
    }

    /// Non-blank search query, if any
    pub fn query(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .filter(|query| !query.trim().is_empty())
    }

    /// Reject page sizes outside `1..=max_page_size`
    pub fn validate(&self, max_page_size: usize) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_cursor("pageSize", "must be at least 1"));
        }
        if self.page_size > max_page_size {
            return Err(Error::invalid_cursor(
                "pageSize",
                format!("must not exceed {max_page_size}"),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Page
// ============================================================================

/// One page of filtered items plus the heads to send back next time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Accepted items, newest-first within each lap of the walk
    pub items: Vec<Item>,

    /// Head after this page; unset only when upstream had no ids
    pub current_head: Option<ItemId>,

    /// Next head after this page; unset only when upstream had no ids
    pub next_head: Option<ItemId>,

    /// Whether at least one more eligible item follows this page
    pub has_more_stories: bool,
}

impl Page {
    /// Page with no items and unset heads
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ids of the returned items, in order
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Id of the last returned item
    pub fn last_id(&self) -> Option<ItemId> {
        self.items.last().map(|item| item.id)
    }

    /// Whether no items were returned
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
