//! CLI runner - executes commands

use crate::cache::FeedCache;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::FeedConfig;
use crate::error::Result;
use crate::pagination::{Cursor, PageAssembler};
use crate::source::HackerNewsSource;
use crate::types::ItemId;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Serve { port } => {
                let port = port.unwrap_or(config.server.port);
                let assembler = Arc::new(build_assembler(&config)?);
                crate::cli::serve(assembler, port, config.purge_interval()).await
            }
            Commands::Page {
                start_after_id,
                current_head,
                next_head,
                query,
                page_size,
            } => {
                let cursor = Cursor {
                    start_after_id: *start_after_id,
                    current_head: *current_head,
                    next_head: *next_head,
                    search_query: query.clone(),
                    page_size: page_size.unwrap_or(config.paging.default_page_size),
                };
                self.page(&config, &cursor).await
            }
            Commands::Ids { limit } => self.ids(&config, *limit).await,
        }
    }

    /// Load the config file, or defaults, and apply CLI overrides
    fn load_config(&self) -> Result<FeedConfig> {
        let mut config = match &self.cli.config {
            Some(path) => FeedConfig::from_file(path)?,
            None => FeedConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.upstream.base_url.clone_from(base_url);
        }
        config.validate()?;

        debug!(base_url = %config.upstream.base_url, "Using upstream");
        Ok(config)
    }

    async fn page(&self, config: &FeedConfig, cursor: &Cursor) -> Result<()> {
        let assembler = build_assembler(config)?;
        let page = assembler.get_page(cursor).await?;
        self.output(&page)
    }

    async fn ids(&self, config: &FeedConfig, limit: Option<usize>) -> Result<()> {
        let assembler = build_assembler(config)?;
        let snapshot = assembler.snapshot().await?;
        let ids: Vec<ItemId> = snapshot
            .iter()
            .copied()
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        self.output(&ids)
    }

    /// Print a value in the selected format
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}

/// Wire the upstream source, cache and assembler from configuration
pub fn build_assembler(config: &FeedConfig) -> Result<PageAssembler> {
    let source = Arc::new(HackerNewsSource::from_config(&config.upstream)?);
    let cache = Arc::new(FeedCache::new(config.cache_ttls()));
    Ok(PageAssembler::from_source(source, cache)
        .with_default_page_size(config.paging.default_page_size)
        .with_max_page_size(config.paging.max_page_size))
}
