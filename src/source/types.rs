//! Upstream item record and collaborator traits
//!
//! The page assembler depends on two capabilities it does not implement:
//! listing the current ids and loading one item. Both are async traits so
//! the HTTP-backed source and the in-memory source are interchangeable.

use crate::error::Result;
use crate::types::{ItemId, ItemType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Item
// ============================================================================

/// One upstream item as served by the item endpoint
///
/// Only `id` is guaranteed. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier
    pub id: ItemId,

    /// Set when the item was deleted upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,

    /// Kind of item
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemType>,

    /// Author username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,

    /// Creation time, Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,

    /// Body text (HTML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<ItemId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kids: Option<Vec<ItemId>>,

    /// Target URL of a story
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<ItemId>>,

    /// Total comment count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descendants: Option<i64>,
}

impl Item {
    /// Create an item with only an id
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Create a story item linking to `url`
    pub fn story(id: ItemId, url: impl Into<String>) -> Self {
        Self {
            kind: Some(ItemType::Story),
            url: Some(url.into()),
            ..Self::new(id)
        }
    }

    /// Set the target URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author
    #[must_use]
    pub fn with_author(mut self, by: impl Into<String>) -> Self {
        self.by = Some(by.into());
        self
    }

    /// Set the body text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Mark the item as deleted
    #[must_use]
    pub fn mark_deleted(mut self) -> Self {
        self.deleted = Some(true);
        self
    }

    /// Whether upstream flagged the item as deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }

    /// Whether the item carries a non-blank URL
    pub fn has_link(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }

    /// Whether the item may appear in a feed page at all
    pub fn is_displayable(&self) -> bool {
        !self.is_deleted() && self.has_link()
    }

    /// Creation time as a UTC timestamp
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Source of the full, newest-first id list
#[async_trait]
pub trait SourceList: Send + Sync {
    /// Fetch the current id sequence
    ///
    /// Two calls may return unrelated sequences.
    async fn fetch_id_snapshot(&self) -> Result<Vec<ItemId>>;
}

/// Source of individual item records
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch one item
    ///
    /// Returns `Ok(None)` for items that do not exist or cannot be decoded.
    /// Transport failures are errors.
    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>>;
}
