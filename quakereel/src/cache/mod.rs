//! Time-bounded feed cache.
//!
//! This module provides the store the data provider consults before going
//! to the network:
//!
//! - [`FeedCache`] trait - selector-keyed payload store with a fixed TTL
//! - [`DiskFeedCache`] - one JSON record per selector, survives restarts
//! - [`NoopFeedCache`] - caching disabled
//! - [`Clock`] - injectable time source for expiry
//!
//! ```ignore
//! use quakereel::cache::{DiskFeedCache, FeedCache};
//!
//! let cache = DiskFeedCache::new(cache_dir);
//! cache.put(&selector, payload).await?;
//! if let Some(hit) = cache.get(&selector).await? {
//!     // fetched less than an hour ago
//! }
//! ```
//!
//! Expiry is lazy: a stale record reads as absent but stays on disk until a
//! later `put` overwrites it. There is no background sweep and no size-based
//! eviction, since the selector space is small and closed.

mod clock;
mod disk;
mod noop;
mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use disk::DiskFeedCache;
pub use noop::NoopFeedCache;
pub use traits::{
    BoxFuture, CacheError, CacheStats, CachedFeed, ClearResult, FeedCache, DEFAULT_TTL,
};
