//! CLI module
//!
//! Command-line interface for the story feed.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `page` - Fetch one page and print it
//! - `ids` - Print the current upstream id list

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{build_assembler, Runner};
pub use server::{router, serve};
