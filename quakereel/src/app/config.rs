//! Session configuration.
//!
//! `AppConfig` is the subset of settings needed to build a
//! [`FeedSession`](crate::app::FeedSession). The CLI derives it from the configuration
//! file and then applies its own flags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::error::AppError;
use crate::cache::{DiskFeedCache, FeedCache, NoopFeedCache, DEFAULT_TTL};
use crate::config::ConfigFile;
use crate::feed::DEFAULT_FEED_BASE_URL;
use crate::playback::CompressionRate;
use crate::provider::{AsyncReqwestClient, FeedProvider, DEFAULT_TIMEOUT};

/// Everything needed to wire provider, cache and scheduler together.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Cache directory; `None` disables caching.
    pub cache_directory: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub timeout: Duration,
    pub feed_base_url: String,
    pub rate: CompressionRate,
}

impl AppConfig {
    /// Creates a configuration with defaults and the given cache directory.
    pub fn new(cache_directory: impl Into<PathBuf>) -> Self {
        Self {
            cache_directory: Some(cache_directory.into()),
            cache_ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            rate: CompressionRate::default(),
        }
    }

    /// Extracts session settings from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            cache_directory: Some(config.cache.directory.clone()),
            cache_ttl: config.cache.ttl(),
            timeout: config.network.timeout(),
            feed_base_url: config.network.feed_base_url.clone(),
            rate: config.playback.rate,
        }
    }

    /// Turns caching off; every load goes to the network.
    pub fn without_cache(mut self) -> Self {
        self.cache_directory = None;
        self
    }

    pub fn with_rate(mut self, rate: CompressionRate) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.feed_base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Builds the cache this configuration describes.
    pub fn build_cache(&self) -> Arc<dyn FeedCache> {
        match &self.cache_directory {
            Some(directory) => Arc::new(DiskFeedCache::with_ttl(directory, self.cache_ttl)),
            None => Arc::new(NoopFeedCache),
        }
    }

    /// Builds a provider against the configured feed server and cache.
    pub fn build_provider(&self) -> Result<FeedProvider<AsyncReqwestClient>, AppError> {
        let http_client = AsyncReqwestClient::with_timeout(self.timeout)?;
        Ok(FeedProvider::new(http_client, self.build_cache()).with_base_url(self.feed_base_url.clone()))
    }
}
