//! Application error types.

use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::provider::FetchError;

/// Errors surfaced by session setup and operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_is_transparent() {
        let err: AppError = FetchError::Malformed("not json".to_string()).into();
        assert_eq!(err.to_string(), "Malformed feed response: not json");
    }

    #[test]
    fn test_config_error_display() {
        let err: AppError = ConfigError::UnknownKey("cache.size".to_string()).into();
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("cache.size"));
    }
}
