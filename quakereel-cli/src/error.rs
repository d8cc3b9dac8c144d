//! CLI error type.

use std::fmt;

use quakereel::app::AppError;
use quakereel::cache::CacheError;
use quakereel::config::ConfigError;
use quakereel::feed::InvalidSelector;
use quakereel::provider::FetchError;

/// Errors reported to the user before exiting with a non-zero status.
#[derive(Debug)]
pub enum CliError {
    /// Bad or unreadable configuration.
    Config(String),

    /// Unknown feed name on the command line.
    Feed(InvalidSelector),

    /// Bad argument value.
    Argument(String),

    /// Feed could not be fetched.
    Fetch(FetchError),

    /// Cache could not be cleared.
    CacheClear(String),

    /// Cache statistics could not be read.
    CacheStats(String),

    /// Failed to create the Tokio runtime or install a handler.
    Runtime(String),
}

impl CliError {
    /// Follow-up hint printed under the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Feed(_) => Some("run 'quakereel feeds' to list the available feeds"),
            CliError::Fetch(e) => Some(e.hint()),
            CliError::Config(_) => Some("run 'quakereel config list' to review settings"),
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Feed(e) => write!(f, "{}", e),
            CliError::Argument(msg) => write!(f, "{}", msg),
            CliError::Fetch(e) => write!(f, "{}", e),
            CliError::CacheClear(msg) => write!(f, "Failed to clear cache: {}", msg),
            CliError::CacheStats(msg) => write!(f, "Failed to read cache statistics: {}", msg),
            CliError::Runtime(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Feed(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<InvalidSelector> for CliError {
    fn from(e: InvalidSelector) -> Self {
        CliError::Feed(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Fetch(e) => CliError::Fetch(e),
            AppError::Config(e) => CliError::Config(e.to_string()),
            AppError::Cache(e) => CliError::CacheStats(e.to_string()),
        }
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::CacheStats(e.to_string())
    }
}
