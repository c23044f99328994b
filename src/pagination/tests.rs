//! Tests for pagination module

use super::*;
use crate::cache::{CacheTtls, FeedCache, ManualClock};
use crate::error::Error;
use crate::source::{Item, MemorySource};
use crate::types::ItemId;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

struct Harness {
    source: Arc<MemorySource>,
    assembler: PageAssembler,
}

impl Harness {
    fn new(ids: &[ItemId]) -> Self {
        let source = Arc::new(MemorySource::with_stories(ids));
        let cache = Arc::new(FeedCache::with_clock(
            CacheTtls::default(),
            Arc::new(ManualClock::default()),
        ));
        let assembler = PageAssembler::from_source(source.clone(), cache);
        Self { source, assembler }
    }

    /// Publish a new id list and drop the cached snapshot
    async fn publish(&self, ids: &[ItemId]) {
        self.source.add_stories(ids).await;
        self.source.set_ids(ids.to_vec()).await;
        self.assembler.cache().invalidate_snapshot().await;
    }

    async fn page(&self, cursor: &Cursor) -> Page {
        self.assembler.get_page(cursor).await.unwrap()
    }
}

fn heads(page: &Page) -> (Option<ItemId>, Option<ItemId>) {
    (page.current_head, page.next_head)
}

// ============================================================================
// Cursor and Page Tests
// ============================================================================

#[test]
fn test_cursor_defaults() {
    let cursor = Cursor::default();
    assert_eq!(cursor.page_size, DEFAULT_PAGE_SIZE);
    assert!(cursor.start_after_id.is_none());
    assert!(cursor.query().is_none());
}

#[test]
fn test_cursor_deserializes_camel_case() {
    let cursor: Cursor = serde_json::from_value(json!({
        "startAfterId": 15,
        "currentHead": 16,
        "nextHead": 17,
        "searchQuery": "rust"
    }))
    .unwrap();

    assert_eq!(
        cursor,
        Cursor::default()
            .start_after(15)
            .with_heads(16, 17)
            .with_query("rust")
    );
}

#[test]
fn test_blank_query_is_ignored() {
    let cursor = Cursor::default().with_query("   ");
    assert!(cursor.query().is_none());
}

#[test]
fn test_validate_page_size() {
    assert!(Cursor::first_page(1).validate(100).is_ok());
    assert!(Cursor::first_page(100).validate(100).is_ok());

    let err = Cursor::first_page(0).validate(100).unwrap_err();
    assert!(matches!(err, Error::InvalidCursor { ref field, .. } if field == "pageSize"));

    let err = Cursor::first_page(101).validate(100).unwrap_err();
    assert!(err.to_string().contains("must not exceed 100"));
}

#[test]
fn test_cursor_next_follows_page() {
    let cursor = Cursor::first_page(2).with_query("x");
    let page = Page {
        items: vec![Item::story(9, "u9"), Item::story(8, "u8")],
        current_head: Some(9),
        next_head: Some(9),
        has_more_stories: true,
    };

    let next = cursor.next(&page);
    assert_eq!(next.start_after_id, Some(8));
    assert_eq!((next.current_head, next.next_head), (Some(9), Some(9)));
    assert_eq!(next.search_query.as_deref(), Some("x"));
    assert_eq!(next.page_size, 2);
}

#[test]
fn test_cursor_next_keeps_position_on_empty_page() {
    let cursor = Cursor::first_page(2).start_after(4);
    let next = cursor.next(&Page {
        current_head: Some(5),
        next_head: Some(5),
        ..Page::empty()
    });
    assert_eq!(next.start_after_id, Some(4));
}

#[test]
fn test_page_serializes_camel_case() {
    let page = Page {
        items: vec![Item::story(1, "u1")],
        current_head: Some(1),
        next_head: Some(1),
        has_more_stories: false,
    };
    let value = serde_json::to_value(&page).unwrap();

    assert_eq!(value["currentHead"], json!(1));
    assert_eq!(value["nextHead"], json!(1));
    assert_eq!(value["hasMoreStories"], json!(false));
    assert_eq!(value["items"][0]["id"], json!(1));
}

// ============================================================================
// StoryFilter Tests
// ============================================================================

#[test]
fn test_filter_requires_link_and_not_deleted() {
    let filter = StoryFilter::new(None);
    assert!(filter.accepts(&Item::story(1, "u1")));
    assert!(!filter.accepts(&Item::new(2)));
    assert!(!filter.accepts(&Item::new(3).with_url("  ")));
    assert!(!filter.accepts(&Item::story(4, "u4").mark_deleted()));
}

#[test]
fn test_filter_matches_any_text_field() {
    let filter = StoryFilter::new(Some("RuSt"));
    assert!(filter.matches(&Item::new(1).with_title("Learning Rust")));
    assert!(filter.matches(&Item::new(2).with_author("rustacean")));
    assert!(filter.matches(&Item::new(3).with_text("all about RUST")));
    assert!(filter.matches(&Item::new(4).with_url("https://rust-lang.org")));
    assert!(!filter.matches(&Item::new(5).with_title("Go")));
}

#[test]
fn test_filter_query_does_not_bypass_link_rule() {
    let filter = StoryFilter::new(Some("ask"));
    assert!(!filter.accepts(&Item::new(1).with_title("Ask HN")));
}

// ============================================================================
// PageAssembler Tests
// ============================================================================

#[tokio::test]
async fn test_first_page_skips_ineligible_items() {
    let h = Harness::new(&[5, 4, 3, 2, 1]);
    h.source.upsert(Item::new(5)).await;
    h.source.upsert(Item::story(4, "url4").mark_deleted()).await;

    let page = h.page(&Cursor::first_page(2)).await;

    assert_eq!(page.ids(), vec![3, 2]);
    assert_eq!(heads(&page), (Some(5), Some(5)));
    assert!(page.has_more_stories);
}

#[tokio::test]
async fn test_first_page_then_continue() {
    let h = Harness::new(&[5, 4, 3, 2, 1]);

    let first = h.page(&Cursor::first_page(2)).await;
    assert_eq!(first.ids(), vec![5, 4]);
    assert_eq!(heads(&first), (Some(5), Some(5)));

    let second = h.page(&Cursor::first_page(2).next(&first)).await;
    assert_eq!(second.ids(), vec![3, 2]);
    assert_eq!(heads(&second), (Some(5), Some(5)));
}

#[tokio::test]
async fn test_unknown_start_after_restarts_from_newest() {
    let h = Harness::new(&[12, 11, 10]);
    let cursor = Cursor::first_page(2).start_after(999).with_heads(11, 11);

    let page = h.page(&cursor).await;

    assert_eq!(page.ids(), vec![12]);
    assert_eq!(heads(&page), (Some(12), Some(12)));
    assert!(!page.has_more_stories);
}

#[tokio::test]
async fn test_consecutive_pages() {
    let h = Harness::new(&[16, 15, 14, 13, 12, 11, 10]);

    let first = h.page(&Cursor::first_page(2)).await;
    assert_eq!(first.ids(), vec![16, 15]);
    assert_eq!(heads(&first), (Some(16), Some(16)));
    assert!(first.has_more_stories);

    let second = h
        .page(&Cursor::first_page(2).start_after(15).with_heads(16, 16))
        .await;
    assert_eq!(second.ids(), vec![14, 13]);
    assert_eq!(heads(&second), (Some(16), Some(16)));
    assert!(second.has_more_stories);
}

#[tokio::test]
async fn test_new_stories_served_after_older_ones() {
    let h = Harness::new(&[13, 12, 11, 10]);

    let first = h.page(&Cursor::first_page(3)).await;
    assert_eq!(first.ids(), vec![13, 12, 11]);
    assert_eq!(heads(&first), (Some(13), Some(13)));

    h.publish(&[16, 15, 14, 13, 12, 11, 10]).await;
    let second = h
        .page(&Cursor::first_page(3).start_after(11).with_heads(13, 13))
        .await;

    assert_eq!(second.ids(), vec![10, 16, 15]);
    assert_eq!(heads(&second), (Some(13), Some(16)));
    assert!(second.has_more_stories);
}

#[tokio::test]
async fn test_walk_wraps_past_the_end() {
    let h = Harness::new(&[9, 8, 7, 6, 5]);

    let page = h
        .page(&Cursor::first_page(2).start_after(6).with_heads(7, 7))
        .await;

    assert_eq!(page.ids(), vec![5, 9]);
    assert_eq!(heads(&page), (Some(7), Some(9)));
    assert!(page.has_more_stories);
}

#[tokio::test]
async fn test_head_hit_with_one_new_story() {
    let h = Harness::new(&[21, 20, 19, 18, 17, 16]);

    let page = h
        .page(&Cursor::first_page(2).start_after(16).with_heads(20, 20))
        .await;

    assert_eq!(page.ids(), vec![21]);
    assert_eq!(heads(&page), (Some(21), Some(21)));
    assert!(!page.has_more_stories);
}

#[test_case(2, (20, 22); "page filled at the head")]
#[test_case(3, (22, 22); "room left at the head")]
#[tokio::test]
async fn test_head_hit_with_two_new_stories(page_size: usize, expected: (ItemId, ItemId)) {
    let h = Harness::new(&[22, 21, 20, 19, 18, 17, 16]);

    let page = h
        .page(&Cursor::first_page(page_size).start_after(16).with_heads(20, 20))
        .await;

    assert_eq!(page.ids(), vec![22, 21]);
    assert_eq!(heads(&page), (Some(expected.0), Some(expected.1)));
    assert!(!page.has_more_stories);
}

#[tokio::test]
async fn test_evicted_heads_fall_back_to_newest() {
    let h = Harness::new(&[25, 24, 23, 22, 21]);

    let first = h.page(&Cursor::first_page(2)).await;
    assert_eq!(first.ids(), vec![25, 24]);
    assert_eq!(heads(&first), (Some(25), Some(25)));

    h.publish(&[30, 29, 28, 27, 26]).await;
    let second = h
        .page(&Cursor::first_page(2).start_after(24).with_heads(25, 25))
        .await;

    assert_eq!(second.ids(), vec![30, 29]);
    assert_eq!(heads(&second), (Some(30), Some(30)));
    assert!(second.has_more_stories);
}

#[tokio::test]
async fn test_all_items_filtered_out() {
    let h = Harness::new(&[35, 34, 33, 32, 31]);
    for id in 31..=35 {
        h.source.upsert(Item::new(id)).await;
    }

    let page = h.page(&Cursor::first_page(3)).await;

    assert!(page.is_empty());
    assert_eq!(heads(&page), (Some(35), Some(35)));
    assert!(!page.has_more_stories);
}

#[tokio::test]
async fn test_full_session_without_repeats() {
    let h = Harness::new(&[55, 54, 53, 52, 51, 50]);
    let mut cursor = Cursor::first_page(2);
    let mut seen = Vec::new();

    for expected in [[55, 54], [53, 52], [51, 50]] {
        let page = h.page(&cursor).await;
        assert_eq!(page.ids(), expected.to_vec());
        assert_eq!(heads(&page), (Some(55), Some(55)));
        seen.extend(page.ids());
        cursor = cursor.next(&page);
    }

    let last = h.page(&cursor).await;
    assert!(last.is_empty());
    assert!(!last.has_more_stories);
    assert_eq!(seen, vec![55, 54, 53, 52, 51, 50]);
    assert_eq!(h.source.snapshot_fetches(), 1);
}

#[test_case("U4", &[4]; "matches url")]
#[test_case("jDoe", &[3]; "matches author")]
#[test_case("INTERESTING", &[5, 2]; "matches title and text")]
#[test_case("notfound", &[]; "matches nothing")]
#[tokio::test]
async fn test_search_query(query: &str, expected: &[ItemId]) {
    let h = Harness::new(&[5, 4, 3, 2, 1]);
    h.source
        .upsert(Item::story(5, "url").with_title("Some interesting title"))
        .await;
    h.source
        .upsert(Item::story(4, "u4").with_title("Breaking News"))
        .await;
    h.source.upsert(Item::story(3, "u3").with_author("jdoe")).await;
    h.source
        .upsert(Item::story(2, "u2").with_text("Something interesting here"))
        .await;
    h.source
        .upsert(Item::story(1, "u1").with_title("No match here"))
        .await;

    let page = h.page(&Cursor::first_page(10).with_query(query)).await;

    assert_eq!(page.ids(), expected.to_vec());
    assert_eq!(heads(&page), (Some(5), Some(5)));
    assert!(!page.has_more_stories);
}

#[tokio::test]
async fn test_has_more_stories_flag() {
    let h = Harness::new(&[9, 8, 7]);

    let partial = h.page(&Cursor::first_page(2)).await;
    assert_eq!(partial.ids(), vec![9, 8]);
    assert_eq!(heads(&partial), (Some(9), Some(9)));
    assert!(partial.has_more_stories);

    let whole = h.page(&Cursor::first_page(3)).await;
    assert_eq!(whole.ids(), vec![9, 8, 7]);
    assert!(!whole.has_more_stories);
}

#[test_case(&[11, 10, 9, 8, 7], &[7, 11], 11, true; "more new stories remain")]
#[test_case(&[10, 9, 8, 7], &[7, 10], 10, false; "single new story")]
#[tokio::test]
async fn test_has_more_after_wrap(
    ids: &[ItemId],
    expected: &[ItemId],
    next_head: ItemId,
    has_more: bool,
) {
    let h = Harness::new(&[9, 8, 7]);
    h.publish(ids).await;

    let page = h
        .page(&Cursor::first_page(2).start_after(8).with_heads(9, 9))
        .await;

    assert_eq!(page.ids(), expected.to_vec());
    assert_eq!(heads(&page), (Some(9), Some(next_head)));
    assert_eq!(page.has_more_stories, has_more);
}

#[tokio::test]
async fn test_third_page_advances_heads() {
    let h = Harness::new(&[12, 11, 10, 9, 8, 7]);

    let page = h
        .page(&Cursor::first_page(2).start_after(11).with_heads(9, 11))
        .await;

    assert_eq!(page.ids(), vec![10, 12]);
    assert_eq!(heads(&page), (Some(11), Some(12)));
    assert!(!page.has_more_stories);
}

#[tokio::test]
async fn test_missing_items_are_skipped() {
    let h = Harness::new(&[3, 2, 1]);
    h.source.remove(2).await;

    let page = h.page(&Cursor::first_page(5)).await;
    assert_eq!(page.ids(), vec![3, 1]);
}

#[tokio::test]
async fn test_empty_snapshot() {
    let h = Harness::new(&[]);

    let page = h.page(&Cursor::first_page(5).with_heads(3, 3)).await;

    assert_eq!(page, Page::empty());
}

#[tokio::test]
async fn test_invalid_page_size_rejected_before_fetching() {
    let h = Harness::new(&[1]);

    let err = h
        .assembler
        .get_page(&Cursor::first_page(0))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidCursor { .. }));
    assert_eq!(h.source.snapshot_fetches(), 0);
}

#[tokio::test]
async fn test_max_page_size_is_configurable() {
    let h = Harness::new(&[1]);
    let assembler = PageAssembler::from_source(h.source.clone(), h.assembler.cache().clone())
        .with_max_page_size(5);

    assert_eq!(assembler.max_page_size(), 5);
    assert!(assembler.get_page(&Cursor::first_page(6)).await.is_err());
    assert!(assembler.get_page(&Cursor::first_page(5)).await.is_ok());
}

#[tokio::test]
async fn test_upstream_failure_propagates() {
    let h = Harness::new(&[2, 1]);
    h.source.set_failure(Some("unavailable".to_string())).await;

    let err = h
        .assembler
        .get_page(&Cursor::first_page(2))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_item_failure_mid_walk_fails_whole_page() {
    let h = Harness::new(&[4, 3, 2, 1]);
    h.assembler.snapshot().await.unwrap();
    h.assembler.cache().item(h.source.as_ref(), 4).await.unwrap();
    h.source.set_failure(Some("item endpoint down".to_string())).await;

    let err = h
        .assembler
        .get_page(&Cursor::first_page(3))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert_eq!(h.source.snapshot_fetches(), 1);

    h.source.set_failure(None).await;
    let page = h.page(&Cursor::first_page(3)).await;
    assert_eq!(page.ids(), vec![4, 3, 2]);
}

#[tokio::test]
async fn test_unbounded_page_size_does_not_overflow() {
    let h = Harness::new(&[3, 2, 1]);
    let assembler = PageAssembler::from_source(h.source.clone(), h.assembler.cache().clone())
        .with_max_page_size(usize::MAX);

    let page = assembler
        .get_page(&Cursor::first_page(usize::MAX))
        .await
        .unwrap();

    assert_eq!(page.ids(), vec![3, 2, 1]);
    assert!(!page.has_more_stories);
}

#[tokio::test]
async fn test_default_page_size_is_configurable() {
    let h = Harness::new(&[1]);
    let assembler = PageAssembler::from_source(h.source.clone(), h.assembler.cache().clone())
        .with_default_page_size(5);

    assert_eq!(h.assembler.default_page_size(), DEFAULT_PAGE_SIZE);
    assert_eq!(assembler.default_page_size(), 5);
}
