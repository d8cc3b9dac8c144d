//! Feeds command - list the available feeds.

use quakereel::feed::FeedSelector;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the feeds command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    let base_url = &runner.config().network.feed_base_url;
    let default = runner.config().playback.feed;

    println!("Available feeds");
    println!("===============");
    println!();

    for feed in FeedSelector::all() {
        let marker = if feed == default { "*" } else { " " };
        println!("{} {:<18} {}", marker, feed.key(), feed.describe());
    }

    println!();
    println!("* default (playback.feed)");
    println!(
        "Endpoint: {}/<feed>.geojson",
        base_url.trim_end_matches('/')
    );

    Ok(())
}
