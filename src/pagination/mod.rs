//! Pagination module
//!
//! Stateless cursor pagination over a live, newest-first id list.
//!
//! # Overview
//!
//! Each request carries a [`Cursor`]: the last seen id plus two heads.
//! The [`PageAssembler`] walks the cached id snapshot from that position,
//! wrapping around the end, and returns a [`Page`] whose heads the client
//! sends back next time. Stories that arrive mid-session are served once,
//! after everything older has been seen.

mod assembler;
mod cursor;
mod filter;

pub use assembler::PageAssembler;
pub use cursor::{Cursor, Page, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
pub use filter::StoryFilter;

#[cfg(test)]
mod tests;
