//! Shared command setup: configuration, logging and runtime.

use quakereel::app::AppConfig;
use quakereel::config::ConfigFile;
use quakereel::logging::{init_logging, LoggingGuard, LOG_FILE_NAME};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::error::CliError;

/// Per-invocation context handed to command handlers.
pub struct CliRunner {
    config: ConfigFile,
    _logging: Option<LoggingGuard>,
}

impl CliRunner {
    /// Loads the configuration file and starts file logging.
    ///
    /// A logging failure is reported and ignored; commands still run.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging = match init_logging(&config.logging.directory, verbose) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!(
                    "Warning: logging disabled ({}: {})",
                    config.logging.directory.join(LOG_FILE_NAME).display(),
                    e
                );
                None
            }
        };

        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = quakereel::VERSION,
            command,
            cache = %self.config.cache.directory.display(),
            "quakereel starting"
        );
    }

    /// Session settings from the file, with caching optionally disabled.
    pub fn app_config(&self, no_cache: bool) -> AppConfig {
        let config = AppConfig::from_config_file(&self.config);
        if no_cache {
            config.without_cache()
        } else {
            config
        }
    }

    /// Multi-threaded runtime for network and playback work.
    pub fn runtime(&self) -> Result<Runtime, CliError> {
        Runtime::new().map_err(|e| {
            warn!(error = %e, "Failed to create runtime");
            CliError::Runtime(format!("Failed to create Tokio runtime: {}", e))
        })
    }
}
