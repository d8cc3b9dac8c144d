//! Cache management CLI commands.

use clap::Subcommand;
use quakereel::cache::{DiskFeedCache, FeedCache};
use quakereel::config::format_size;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the feed cache, removing all cached feeds
    Clear,
    /// Show feed cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, runner: &CliRunner) -> Result<(), CliError> {
    let settings = &runner.config().cache;
    let cache = DiskFeedCache::with_ttl(&settings.directory, settings.ttl());
    let runtime = runner.runtime()?;

    match action {
        CacheAction::Clear => {
            println!("Clearing feed cache at: {}", settings.directory.display());

            let result = runtime
                .block_on(cache.clear())
                .map_err(|e| CliError::CacheClear(e.to_string()))?;
            println!(
                "Deleted {} feeds, freed {}",
                result.files_deleted,
                format_size(result.bytes_freed)
            );
        }
        CacheAction::Stats => {
            println!("Feed cache: {}", settings.directory.display());

            let stats = runtime
                .block_on(cache.stats())
                .map_err(|e| CliError::CacheStats(e.to_string()))?;
            println!("  Feeds: {} ({} fresh)", stats.entries, stats.fresh_entries);
            println!("  Size:  {}", format_size(stats.bytes));
            println!("  TTL:   {}s", settings.ttl_secs);
        }
    }

    Ok(())
}
