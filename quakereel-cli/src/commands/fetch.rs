//! Fetch command - load a feed and print its summary.

use quakereel::app::LoadReport;
use quakereel::event::{order, summarize};

use super::common::{print_load_report, resolve_feed};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub feed: Option<String>,
    pub refresh: bool,
    pub no_cache: bool,
}

/// Run the fetch command.
pub fn run(args: FetchArgs, runner: &CliRunner) -> Result<(), CliError> {
    let selector = resolve_feed(args.feed.as_deref(), runner.config())?;
    let app_config = runner.app_config(args.no_cache);
    let provider = app_config.build_provider()?;
    let runtime = runner.runtime()?;

    let data = runtime.block_on(async {
        if args.refresh {
            provider.refresh(&selector).await
        } else {
            provider.fetch(&selector).await
        }
    })?;

    let events = order(data.events);
    let report = LoadReport {
        selector,
        summary: summarize(&events),
        source: data.source,
        skipped: data.skipped,
        fetched_at_ms: data.fetched_at_ms,
    };

    print_load_report(&report, app_config.rate);
    Ok(())
}
