//! Upstream source module
//!
//! Defines the two capabilities the page assembler consumes and their
//! implementations.
//!
//! # Overview
//!
//! - `SourceList` - full newest-first id list
//! - `ItemStore` - one item by id
//! - `HackerNewsSource` - both, over the Hacker News HTTP API
//! - `MemorySource` - both, over in-memory data

mod hacker_news;
mod memory;
mod types;

pub use hacker_news::{HackerNewsSource, DEFAULT_BASE_URL, DEFAULT_NEW_STORIES_PATH};
pub use memory::MemorySource;
pub use types::{Item, ItemStore, SourceList};
