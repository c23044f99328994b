//! CLI commands and argument parsing

use crate::types::ItemId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated feed of the newest Hacker News stories
#[derive(Parser, Debug)]
#[command(name = "storyfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the upstream API root
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server mode
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch one page of stories
    Page {
        /// Continue after this item id
        #[arg(long)]
        start_after_id: Option<ItemId>,

        /// Current head from the previous page
        #[arg(long)]
        current_head: Option<ItemId>,

        /// Next head from the previous page
        #[arg(long)]
        next_head: Option<ItemId>,

        /// Case-insensitive search over title, author, text and URL
        #[arg(short, long)]
        query: Option<String>,

        /// Stories per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Print the current upstream id list
    Ids {
        /// Print at most this many ids
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_command() {
        let cli = Cli::parse_from([
            "storyfeed",
            "--format",
            "pretty",
            "page",
            "--start-after-id",
            "15",
            "--current-head",
            "16",
            "--next-head",
            "16",
            "-q",
            "rust",
        ]);

        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Commands::Page {
                start_after_id,
                current_head,
                next_head,
                query,
                page_size,
            } => {
                assert_eq!(start_after_id, Some(15));
                assert_eq!(current_head, Some(16));
                assert_eq!(next_head, Some(16));
                assert_eq!(query.as_deref(), Some("rust"));
                assert_eq!(page_size, None);
            }
            other => panic!("Expected Page, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "storyfeed",
            "serve",
            "--port",
            "3000",
            "--base-url",
            "http://localhost:9000/v0",
            "-v",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000/v0"));
        assert!(matches!(cli.command, Commands::Serve { port: Some(3000) }));
    }
}
