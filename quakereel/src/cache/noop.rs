//! Cache that stores nothing.

use std::time::Duration;

use super::traits::{BoxFuture, CacheError, CacheStats, CachedFeed, ClearResult, FeedCache};
use crate::feed::FeedSelector;

/// Every read misses and every write is dropped.
///
/// Used when caching is disabled, so each load goes to the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedCache;

impl FeedCache for NoopFeedCache {
    fn get(&self, _selector: &FeedSelector) -> BoxFuture<'_, Result<Option<CachedFeed>, CacheError>> {
        Box::pin(async { Ok(None) })
    }

    fn put(&self, _selector: &FeedSelector, _payload: Vec<u8>) -> BoxFuture<'_, Result<(), CacheError>> {
        Box::pin(async { Ok(()) })
    }

    fn delete(&self, _selector: &FeedSelector) -> BoxFuture<'_, Result<bool, CacheError>> {
        Box::pin(async { Ok(false) })
    }

    fn clear(&self) -> BoxFuture<'_, Result<ClearResult, CacheError>> {
        Box::pin(async { Ok(ClearResult::default()) })
    }

    fn stats(&self) -> BoxFuture<'_, Result<CacheStats, CacheError>> {
        Box::pin(async { Ok(CacheStats::default()) })
    }

    fn ttl(&self) -> Duration {
        Duration::ZERO
    }
}
