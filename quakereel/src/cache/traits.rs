//! Core traits for the feed cache.
//!
//! The `FeedCache` trait provides a key-value interface keyed by
//! [`FeedSelector`]. Each selector owns at most one entry; a later `put`
//! replaces the earlier one.
//!
//! # Design Principles
//!
//! - **Closed key space**: keys are selectors, so no size-based eviction
//! - **Raw payloads**: values are the bytes the provider returned
//! - **Lazy expiry**: stale entries read as absent but stay on disk until
//!   overwritten, deleted or cleared
//! - **Dyn-compatible**: Uses `Pin<Box<dyn Future>>` for trait object support
//!
//! # Example
//!
//! ```ignore
//! use quakereel::cache::{DiskFeedCache, FeedCache};
//!
//! let cache = DiskFeedCache::open("/tmp/quakereel", Duration::from_secs(3600)).await?;
//! cache.put(&selector, payload).await?;
//! let hit = cache.get(&selector).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::feed::FeedSelector;

/// Default time-to-live for cached feeds.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error while reading or writing the store.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A cache hit: the stored payload and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFeed {
    pub payload: Vec<u8>,
    /// Fetch time in milliseconds since the Unix epoch.
    pub fetched_at_ms: i64,
}

/// Entry counts and disk usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Records present in the store, fresh or not.
    pub entries: usize,
    /// Records still inside the TTL window.
    pub fresh_entries: usize,
    /// Total size of all records in bytes.
    pub bytes: u64,
}

/// Result of clearing the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearResult {
    pub files_deleted: usize,
    pub bytes_freed: u64,
}

impl fmt::Display for ClearResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} entries, freed {} bytes",
            self.files_deleted, self.bytes_freed
        )
    }
}

/// Time-bounded store of feed payloads.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. A `put` must never expose a
/// partially written entry to a concurrent `get` of the same selector.
pub trait FeedCache: Send + Sync {
    /// Returns the payload for `selector` if present and younger than the TTL.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(feed))` on a fresh hit
    /// - `Ok(None)` if absent or expired
    /// - `Err(_)` if the store could not be read
    fn get(&self, selector: &FeedSelector) -> BoxFuture<'_, Result<Option<CachedFeed>, CacheError>>;

    /// Stores `payload` for `selector` stamped with the current time,
    /// replacing any previous entry.
    fn put(&self, selector: &FeedSelector, payload: Vec<u8>) -> BoxFuture<'_, Result<(), CacheError>>;

    /// Removes the entry for `selector`.
    ///
    /// Returns `Ok(true)` if an entry existed.
    fn delete(&self, selector: &FeedSelector) -> BoxFuture<'_, Result<bool, CacheError>>;

    /// Removes every entry.
    fn clear(&self) -> BoxFuture<'_, Result<ClearResult, CacheError>>;

    /// Reports entry counts and size.
    fn stats(&self) -> BoxFuture<'_, Result<CacheStats, CacheError>>;

    /// Configured time-to-live.
    fn ttl(&self) -> Duration;
}
