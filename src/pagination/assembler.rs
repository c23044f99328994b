//! Page assembler
//!
//! Walks the cached id snapshot from the client's position, fetching and
//! filtering items until a page is full. The walk wraps around the end of
//! the list and tracks two heads so that stories published after the client
//! started paginating are served once, after the older ones, without
//! re-serving anything already seen.
//!
//! # Walk
//!
//! ```text
//!   Scanning ──(index passes the end)──► Wrapped ──► Scanning
//!      │
//!      └──(current head reached)──► HeadReached ──► Scanning
//!                                        │
//!                                        └──(new head is the newest id)──► CaughtUp
//! ```

use super::cursor::{Cursor, Page, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use super::filter::StoryFilter;
use crate::cache::FeedCache;
use crate::error::Result;
use crate::source::{ItemStore, SourceList};
use crate::types::ItemId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// Head tracking
// ============================================================================

/// The pair of heads carried between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeadWindow {
    current: Option<ItemId>,
    next: Option<ItemId>,
}

impl HeadWindow {
    fn from_cursor(cursor: &Cursor) -> Self {
        Self {
            current: cursor.current_head,
            next: cursor.next_head,
        }
    }

    /// Whether the walk has reached the current head
    ///
    /// A current head that is no longer listed counts as reached at the
    /// last position of the list.
    fn is_hit(&self, id: ItemId, at_tail: bool, members: &HashSet<ItemId>) -> bool {
        match self.current {
            Some(head) if head == id => true,
            Some(head) => at_tail && !members.contains(&head),
            None => false,
        }
    }

    /// Promote `next` to `current` and restart from the newest id
    fn advance(&mut self, newest: ItemId) {
        self.current = self.next;
        self.next = Some(newest);
    }

    /// Replace unset or unlisted heads with the newest id
    fn normalize(&mut self, members: &HashSet<ItemId>, newest: ItemId) {
        let listed = |head: Option<ItemId>| head.filter(|id| members.contains(id));
        self.current = Some(listed(self.current).unwrap_or(newest));
        self.next = Some(listed(self.next).unwrap_or(newest));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkPhase {
    Scanning,
    HeadReached,
    Wrapped,
    CaughtUp,
}

/// Position of one walk over a snapshot
struct Walk {
    ids: Arc<[ItemId]>,
    members: HashSet<ItemId>,
    index: usize,
    window: HeadWindow,
    phase: WalkPhase,
}

impl Walk {
    /// Position the walk just after `start_after_id`
    ///
    /// An unknown `start_after_id` restarts from the newest id and points
    /// `next` at it.
    fn start(ids: Arc<[ItemId]>, cursor: &Cursor) -> Self {
        let members = ids.iter().copied().collect();
        let mut walk = Self {
            ids,
            members,
            index: 0,
            window: HeadWindow::from_cursor(cursor),
            phase: WalkPhase::Scanning,
        };

        if let Some(after) = cursor.start_after_id {
            match walk.ids.iter().position(|&id| id == after) {
                Some(pos) => walk.index = pos + 1,
                None => walk.window.next = Some(walk.newest()),
            }
        }
        if walk.index >= walk.ids.len() {
            walk.wrap();
        }
        walk
    }

    fn newest(&self) -> ItemId {
        self.ids[0]
    }

    fn current_id(&self) -> ItemId {
        self.ids[self.index]
    }

    fn at_tail(&self) -> bool {
        self.index + 1 == self.ids.len()
    }

    fn wrap(&mut self) {
        self.index = 0;
        self.window.next = Some(self.newest());
        self.phase = WalkPhase::Wrapped;
    }

    /// Handle reaching the current head
    ///
    /// With room left on the page the heads advance and the walk restarts
    /// from the newest id. The walk is over when that lands on the current
    /// head again.
    fn check_head(&mut self, page_full: bool) {
        if !self
            .window
            .is_hit(self.current_id(), self.at_tail(), &self.members)
        {
            return;
        }

        if !page_full {
            let newest = self.newest();
            self.window.advance(newest);
            self.index = 0;
            self.phase = WalkPhase::HeadReached;
            trace!(current = ?self.window.current, "Head reached, restarting from newest");
        }
        if self.window.current == Some(self.current_id()) {
            self.phase = WalkPhase::CaughtUp;
        }
    }

    fn normalize_heads(&mut self) {
        let newest = self.newest();
        self.window.normalize(&self.members, newest);
    }

    fn step(&mut self) {
        self.index += 1;
        if self.index >= self.ids.len() {
            self.wrap();
        } else {
            self.phase = WalkPhase::Scanning;
        }
    }
}

// ============================================================================
// PageAssembler
// ============================================================================

/// Builds pages from the cached snapshot and item caches
pub struct PageAssembler {
    list: Arc<dyn SourceList>,
    store: Arc<dyn ItemStore>,
    cache: Arc<FeedCache>,
    default_page_size: usize,
    max_page_size: usize,
}

impl PageAssembler {
    /// Create an assembler over separate list and item capabilities
    pub fn new(list: Arc<dyn SourceList>, store: Arc<dyn ItemStore>, cache: Arc<FeedCache>) -> Self {
        Self {
            list,
            store,
            cache,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Create an assembler over a source providing both capabilities
    pub fn from_source<S>(source: Arc<S>, cache: Arc<FeedCache>) -> Self
    where
        S: SourceList + ItemStore + 'static,
    {
        Self::new(source.clone(), source, cache)
    }

    /// Set the page size used for requests that do not choose one
    #[must_use]
    pub fn with_default_page_size(mut self, default_page_size: usize) -> Self {
        self.default_page_size = default_page_size;
        self
    }

    /// Page size used for requests that do not choose one
    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    /// Set the largest accepted page size
    #[must_use]
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Largest accepted page size
    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Shared cache
    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Current id snapshot, newest first
    pub async fn snapshot(&self) -> Result<Arc<[ItemId]>> {
        self.cache.snapshot(self.list.as_ref()).await
    }

    /// Assemble the page for `cursor`
    ///
    /// Looks one eligible item past the page to decide `has_more_stories`.
    /// Upstream failures propagate; nothing partial is returned.
    pub async fn get_page(&self, cursor: &Cursor) -> Result<Page> {
        cursor.validate(self.max_page_size)?;

        let ids = self.snapshot().await?;
        if ids.is_empty() {
            debug!("Id snapshot is empty");
            return Ok(Page::empty());
        }

        debug!(?cursor, snapshot_len = ids.len(), "Assembling page");
        let filter = StoryFilter::new(cursor.query());
        let page_size = cursor.page_size;
        let mut items = Vec::with_capacity(page_size.min(ids.len()));
        let mut walk = Walk::start(ids, cursor);
        let mut has_more = false;
        let mut count = 0;
        let mut visited = 0usize;

        while count <= page_size {
            walk.check_head(count == page_size);
            if walk.phase == WalkPhase::CaughtUp {
                break;
            }
            walk.normalize_heads();

            let id = walk.current_id();
            visited += 1;
            if let Some(item) = self.cache.item(self.store.as_ref(), id).await? {
                if filter.accepts(&item) {
                    if count == page_size {
                        has_more = true;
                    } else {
                        items.push(item.as_ref().clone());
                    }
                    count += 1;
                } else {
                    trace!(id, "Item filtered out");
                }
            } else {
                trace!(id, "Item missing upstream");
            }

            walk.step();
        }

        let page = Page {
            items,
            current_head: walk.window.current,
            next_head: walk.window.next,
            has_more_stories: has_more,
        };

        debug!(
            returned = page.items.len(),
            current_head = ?page.current_head,
            next_head = ?page.next_head,
            has_more = page.has_more_stories,
            visited,
            phase = ?walk.phase,
            "Assembled page"
        );

        Ok(page)
    }
}

impl std::fmt::Debug for PageAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageAssembler")
            .field("cache", &self.cache)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .finish_non_exhaustive()
    }
}
