// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # storyfeed
//!
//! Cursor-paginated, searchable feed of the newest Hacker News stories.
//!
//! ## Features
//!
//! - **Stateless cursors**: clients carry `startAfterId` plus two heads
//! - **Live lists**: stories published mid-session are served once, later
//! - **Search**: case-insensitive match on title, author, text and URL
//! - **Caching**: TTL caches in front of the upstream API
//! - **HTTP API**: axum server with a JSON envelope
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storyfeed::cache::{CacheTtls, FeedCache};
//! use storyfeed::pagination::{Cursor, PageAssembler};
//! use storyfeed::source::MemorySource;
//!
//! #[tokio::main]
//! async fn main() -> storyfeed::Result<()> {
//!     let source = Arc::new(MemorySource::with_stories(&[5, 4, 3, 2, 1]));
//!     let cache = Arc::new(FeedCache::new(CacheTtls::default()));
//!     let assembler = PageAssembler::from_source(source, cache);
//!
//!     let cursor = Cursor::first_page(2);
//!     let first = assembler.get_page(&cursor).await?;
//!     let second = assembler.get_page(&cursor.next(&first)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │           CLI (page, ids) / HTTP API (serve)         │
//! └──────────────────────────────────────────────────────┘
//!                            │
//! ┌──────────────────────────┴───────────────────────────┐
//! │      PageAssembler: cursor walk, heads, filter       │
//! └──────────────────────────────────────────────────────┘
//!                            │
//! ┌──────────────────────────┴───────────────────────────┐
//! │   FeedCache: "newstories" 60s, "story:{id}" 10min    │
//! └──────────────────────────────────────────────────────┘
//!                            │
//! ┌────────────────────┬─────┴──────────────────────────┐
//! │  HackerNewsSource  │  MemorySource                  │
//! │  retry, rate limit │  tests and offline use         │
//! └────────────────────┴────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Upstream sources
pub mod source;

/// TTL caches for snapshots and items
pub mod cache;

/// Cursor pagination
pub mod pagination;

/// Service configuration
pub mod config;

/// Command-line interface and HTTP API
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use cache::{CacheTtls, FeedCache};
pub use config::FeedConfig;
pub use pagination::{Cursor, Page, PageAssembler};
pub use source::{HackerNewsSource, Item, ItemStore, MemorySource, SourceList};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
