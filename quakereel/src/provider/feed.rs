//! Fetch-with-cache feed provider.
//!
//! # Flow
//!
//! ```text
//! fetch(selector)
//!   ├── cache hit (fresh, parseable) ──────────────► FeedData { source: Cache }
//!   └── miss / expired / unreadable
//!         └── per-selector lock
//!               ├── re-check cache (another caller may have filled it)
//!               └── GET <base>/<key>.geojson
//!                     ├── parse ok ──► cache.put ──► FeedData { source: Network }
//!                     └── failure ────────────────► FetchError (cache untouched)
//! ```
//!
//! Cache failures never fail a fetch. A read error is treated as a miss and a
//! write error is logged, so a broken cache directory degrades to always
//! fetching fresh data.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::FetchError;
use super::http::AsyncHttpClient;
use crate::cache::FeedCache;
use crate::event::{parse_feed, Event};
use crate::feed::{FeedSelector, DEFAULT_FEED_BASE_URL};

/// Where a fetch result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Network,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Cache => write!(f, "cache"),
            DataSource::Network => write!(f, "network"),
        }
    }
}

/// Events of one feed plus fetch metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedData {
    pub selector: FeedSelector,
    /// Events in payload order (not yet sorted).
    pub events: Vec<Event>,
    pub source: DataSource,
    /// Malformed features dropped while parsing.
    pub skipped: usize,
    /// When the payload was fetched from the network (epoch ms).
    pub fetched_at_ms: i64,
}

/// Resolves feed selectors to events, consulting the cache first.
///
/// # Example
///
/// ```ignore
/// use quakereel::provider::{AsyncReqwestClient, FeedProvider};
///
/// let provider = FeedProvider::new(AsyncReqwestClient::new()?, Arc::new(DiskFeedCache::new(dir)));
/// let data = provider.fetch(&"2.5_day".parse()?).await?;
/// ```
pub struct FeedProvider<C: AsyncHttpClient> {
    http_client: C,
    cache: Arc<dyn FeedCache>,
    base_url: String,
    /// One lock per selector so concurrent misses share a single request.
    in_flight: DashMap<FeedSelector, Arc<Mutex<()>>>,
}

impl<C: AsyncHttpClient> FeedProvider<C> {
    /// Creates a provider against the public USGS feeds.
    pub fn new(http_client: C, cache: Arc<dyn FeedCache>) -> Self {
        Self {
            http_client,
            cache,
            base_url: DEFAULT_FEED_BASE_URL.to_string(),
            in_flight: DashMap::new(),
        }
    }

    /// Points the provider at a different feed server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL feeds are requested from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The HTTP client requests go through.
    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// The cache this provider reads and writes.
    pub fn cache(&self) -> Arc<dyn FeedCache> {
        Arc::clone(&self.cache)
    }

    /// Returns the events for `selector`.
    ///
    /// Serves from the cache when a fresh entry exists; otherwise requests
    /// the feed, stores the raw payload and returns the parsed events.
    /// Repeated calls inside the TTL make no further requests.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on network failure, timeout, bad status or a
    /// payload that is not a feature collection. The cache is untouched.
    pub async fn fetch(&self, selector: &FeedSelector) -> Result<FeedData, FetchError> {
        if let Some(data) = self.cached(selector).await {
            return Ok(data);
        }

        let lock = self.lock_for(selector);
        let _guard = lock.lock().await;

        // Another caller may have filled the cache while we waited
        if let Some(data) = self.cached(selector).await {
            debug!(feed = %selector, "Coalesced with in-flight fetch");
            return Ok(data);
        }

        self.fetch_remote(selector).await
    }

    /// Fetches `selector` from the network, ignoring any cached entry.
    ///
    /// A successful refresh replaces the cached entry.
    pub async fn refresh(&self, selector: &FeedSelector) -> Result<FeedData, FetchError> {
        let lock = self.lock_for(selector);
        let _guard = lock.lock().await;
        self.fetch_remote(selector).await
    }

    fn lock_for(&self, selector: &FeedSelector) -> Arc<Mutex<()>> {
        Arc::clone(self.in_flight.entry(*selector).or_default().value())
    }

    async fn cached(&self, selector: &FeedSelector) -> Option<FeedData> {
        let hit = match self.cache.get(selector).await {
            Ok(Some(hit)) => hit,
            Ok(None) => return None,
            Err(e) => {
                warn!(feed = %selector, error = %e, "Cache read failed, fetching fresh data");
                return None;
            }
        };

        match parse_feed(&hit.payload) {
            Ok(parsed) => {
                info!(feed = %selector, events = parsed.events.len(), "Serving feed from cache");
                Some(FeedData {
                    selector: *selector,
                    events: parsed.events,
                    source: DataSource::Cache,
                    skipped: parsed.skipped,
                    fetched_at_ms: hit.fetched_at_ms,
                })
            }
            Err(e) => {
                warn!(feed = %selector, error = %e, "Cached payload unreadable, fetching fresh data");
                None
            }
        }
    }

    async fn fetch_remote(&self, selector: &FeedSelector) -> Result<FeedData, FetchError> {
        let url = selector.url(&self.base_url);
        info!(feed = %selector, url = %url, "Fetching feed");

        let payload = self.http_client.get(&url).await.map_err(|e| {
            warn!(feed = %selector, error = %e, "Feed fetch failed");
            e
        })?;

        let parsed = parse_feed(&payload).map_err(|e| {
            warn!(feed = %selector, error = %e, "Feed response malformed");
            FetchError::Malformed(e.to_string())
        })?;

        let fetched_at_ms = Utc::now().timestamp_millis();
        if let Err(e) = self.cache.put(selector, payload).await {
            warn!(feed = %selector, error = %e, "Failed to cache feed payload");
        }

        info!(
            feed = %selector,
            events = parsed.events.len(),
            skipped = parsed.skipped,
            "Fetched feed"
        );

        Ok(FeedData {
            selector: *selector,
            events: parsed.events,
            source: DataSource::Network,
            skipped: parsed.skipped,
            fetched_at_ms,
        })
    }
}
