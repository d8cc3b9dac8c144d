//! QuakeReel CLI - replay recent earthquakes in the terminal.

mod commands;
mod error;
mod render;
mod runner;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::play::PlayArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "quakereel")]
#[command(version, about = "Replay USGS earthquake feeds as a time-compressed animation")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the available feeds
    Feeds,

    /// Fetch a feed and print its summary
    Fetch {
        /// Feed name, e.g. 2.5_day (defaults to playback.feed)
        feed: Option<String>,

        /// Ignore any cached copy and fetch from the network
        #[arg(long)]
        refresh: bool,

        /// Neither read nor write the cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Replay a feed at a compressed rate
    Play {
        /// Feed name, e.g. 4.5_week (defaults to playback.feed)
        feed: Option<String>,

        /// Simulated hours per real second, 0.1 to 24 (defaults to playback.rate)
        #[arg(short, long)]
        rate: Option<String>,

        /// Ignore any cached copy and fetch from the network
        #[arg(long)]
        refresh: bool,

        /// Neither read nor write the cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Manage the feed cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let verbose = cli.verbose;

    match cli.command {
        // Config commands must work even when logging cannot start
        Commands::Config { command } => commands::config::run(command),
        Commands::Feeds => with_runner(verbose, "feeds", commands::feeds::run),
        Commands::Fetch {
            feed,
            refresh,
            no_cache,
        } => with_runner(verbose, "fetch", |runner| {
            commands::fetch::run(
                FetchArgs {
                    feed,
                    refresh,
                    no_cache,
                },
                runner,
            )
        }),
        Commands::Play {
            feed,
            rate,
            refresh,
            no_cache,
        } => with_runner(verbose, "play", |runner| {
            commands::play::run(
                PlayArgs {
                    feed,
                    rate,
                    refresh,
                    no_cache,
                },
                runner,
            )
        }),
        Commands::Cache { action } => {
            with_runner(verbose, "cache", |runner| commands::cache::run(action, runner))
        }
    }
}

/// Loads configuration, starts logging and runs `command`.
fn with_runner(
    verbose: bool,
    name: &str,
    command: impl FnOnce(&CliRunner) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup(name);
    command(&runner)
}
