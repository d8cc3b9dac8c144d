//! Feed session: provider, ordering and scheduler wired together.
//!
//! ```text
//! load(selector)
//!   └── provider.fetch ──► order ──► summarize ──► scheduler.load (reset)
//! ```
//!
//! Loads may overlap. Each load takes a ticket from a generation counter;
//! when its fetch returns, the result is applied only if no newer load has
//! started since. Otherwise it is dropped and reported as
//! [`LoadOutcome::Superseded`]. A failed fetch leaves the loaded dataset and
//! playback state exactly as they were.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::event::{order, summarize, DatasetSummary};
use crate::feed::FeedSelector;
use crate::playback::{
    CompressionRate, PlaybackScheduler, PlaybackState, PlaybackStatus, RenderSink, StartOutcome,
};
use crate::provider::{AsyncHttpClient, AsyncReqwestClient, DataSource, FeedProvider, FetchError};

/// Description of the dataset a load installed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub selector: FeedSelector,
    pub summary: DatasetSummary,
    pub source: DataSource,
    /// Malformed features dropped while parsing.
    pub skipped: usize,
    /// When the payload was fetched from the network (epoch ms).
    pub fetched_at_ms: i64,
}

/// Result of a load that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The dataset was installed and playback reset.
    Loaded(LoadReport),
    /// A newer load started while this one was in flight; its result was
    /// discarded.
    Superseded,
}

/// One playback session over a provider and a render sink.
pub struct FeedSession<C: AsyncHttpClient, R: RenderSink> {
    provider: FeedProvider<C>,
    scheduler: PlaybackScheduler<R>,
    generation: AtomicU64,
    current: Mutex<Option<LoadReport>>,
}

impl<R: RenderSink> FeedSession<AsyncReqwestClient, R> {
    /// Builds a session against the real feed service.
    pub fn from_config(config: &AppConfig, sink: R) -> Result<Self, AppError> {
        let provider = config.build_provider()?;
        let scheduler = PlaybackScheduler::with_rate(sink, config.rate);

        info!(
            base_url = %config.feed_base_url,
            cache = ?config.cache_directory,
            rate = %config.rate,
            "Feed session created"
        );

        Ok(Self::new(provider, scheduler))
    }
}

impl<C: AsyncHttpClient, R: RenderSink> FeedSession<C, R> {
    pub fn new(provider: FeedProvider<C>, scheduler: PlaybackScheduler<R>) -> Self {
        Self {
            provider,
            scheduler,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Loads `selector`, serving from the cache when fresh.
    pub async fn load(&self, selector: FeedSelector) -> Result<LoadOutcome, FetchError> {
        self.load_with(selector, false).await
    }

    /// Loads `selector` from the network, bypassing the cache.
    pub async fn refresh(&self, selector: FeedSelector) -> Result<LoadOutcome, FetchError> {
        self.load_with(selector, true).await
    }

    async fn load_with(
        &self,
        selector: FeedSelector,
        refresh: bool,
    ) -> Result<LoadOutcome, FetchError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(feed = %selector, ticket, refresh, "Loading feed");

        let result = if refresh {
            self.provider.refresh(&selector).await
        } else {
            self.provider.fetch(&selector).await
        };

        // Check and install under one lock so two finishing loads cannot interleave
        let mut current = self.current.lock();
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(feed = %selector, ticket, "Discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        let data = result.map_err(|e| {
            warn!(feed = %selector, error = %e, "Load failed, keeping current dataset");
            e
        })?;

        let events = order(data.events);
        let summary = summarize(&events);
        self.scheduler.load(events);

        let report = LoadReport {
            selector,
            summary,
            source: data.source,
            skipped: data.skipped,
            fetched_at_ms: data.fetched_at_ms,
        };
        *current = Some(report.clone());

        info!(
            feed = %selector,
            events = summary.count,
            source = %report.source,
            span_secs = summary.span().as_secs(),
            "Feed loaded"
        );

        Ok(LoadOutcome::Loaded(report))
    }

    /// The most recently installed dataset, if any.
    pub fn current(&self) -> Option<LoadReport> {
        self.current.lock().clone()
    }

    pub fn start(&self) -> StartOutcome {
        self.scheduler.start()
    }

    pub fn pause(&self) -> bool {
        self.scheduler.pause()
    }

    pub fn reset(&self) {
        self.scheduler.reset()
    }

    pub fn set_rate(&self, rate: CompressionRate) {
        self.scheduler.set_rate(rate)
    }

    pub fn rate(&self) -> CompressionRate {
        self.scheduler.rate()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.scheduler.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.scheduler.subscribe()
    }

    pub fn provider(&self) -> &FeedProvider<C> {
        &self.provider
    }

    pub fn scheduler(&self) -> &PlaybackScheduler<R> {
        &self.scheduler
    }
}
