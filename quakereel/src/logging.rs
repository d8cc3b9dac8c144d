//! Logging setup.
//!
//! Log output goes to `<log_dir>/quakereel.log` through a non-blocking
//! writer so the playback tick task never waits on disk. The terminal is
//! left to the CLI's own output.
//!
//! Filtering honours `RUST_LOG`; without it the default is `quakereel=info`,
//! or `quakereel=debug` when verbose.

use std::path::Path;

use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "quakereel.log";

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes pending records; hold it until exit.
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "quakereel=debug,quakereel_cli=debug"
    } else {
        "quakereel=info,quakereel_cli=info"
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Result<LoggingGuard, std::io::Error> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_timer(timer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    Ok(LoggingGuard { _worker: worker })
}
