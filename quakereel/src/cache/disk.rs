//! On-disk feed cache.
//!
//! Each selector owns one JSON record file under the cache directory:
//!
//! ```text
//! <dir>/
//! ├── all_day.json        {"feed":"all_day","fetched_at_ms":...,"payload":"..."}
//! ├── 2.5_week.json
//! └── significant_month.json
//! ```
//!
//! Records survive process restarts. Writes go to a temporary file that is
//! renamed over the record, so a reader sees either the old or the new
//! record, never a partial one.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{is_fresh, Clock, SystemClock};
use super::traits::{
    BoxFuture, CacheError, CacheStats, CachedFeed, ClearResult, FeedCache, DEFAULT_TTL,
};
use crate::feed::FeedSelector;

const RECORD_EXTENSION: &str = "json";
const TEMP_MARKER: &str = ".tmp.";

/// Distinguishes temp files of overlapping writes within one process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Persisted form of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    feed: String,
    fetched_at_ms: i64,
    payload: String,
}

/// Feed cache persisted as one file per selector.
pub struct DiskFeedCache {
    directory: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl DiskFeedCache {
    /// Creates a cache rooted at `directory` with the default one hour TTL.
    ///
    /// The directory is created on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_ttl(directory, DEFAULT_TTL)
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(directory: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            directory: directory.into(),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Root directory of the cache.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the record file for `selector`.
    pub fn record_path(&self, selector: &FeedSelector) -> PathBuf {
        self.directory
            .join(format!("{}.{}", selector.key(), RECORD_EXTENSION))
    }

    fn temp_path(&self, selector: &FeedSelector) -> PathBuf {
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        self.directory.join(format!(
            "{}.{}{}{}-{}",
            selector.key(),
            RECORD_EXTENSION,
            TEMP_MARKER,
            std::process::id(),
            seq
        ))
    }

    async fn read_record(&self, path: &Path) -> Result<Option<CacheRecord>, CacheError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };

        match serde_json::from_slice::<CacheRecord>(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // Corrupt records read as absent; the next put overwrites them.
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache record");
                Ok(None)
            }
        }
    }

    async fn get_impl(&self, selector: FeedSelector) -> Result<Option<CachedFeed>, CacheError> {
        let path = self.record_path(&selector);
        let Some(record) = self.read_record(&path).await? else {
            debug!(feed = %selector, "Cache miss");
            return Ok(None);
        };

        if record.feed != selector.key() {
            warn!(path = %path.display(), stored = %record.feed, "Cache record belongs to another feed");
            return Ok(None);
        }

        let now_ms = self.clock.now_ms();
        if !is_fresh(record.fetched_at_ms, now_ms, self.ttl) {
            debug!(
                feed = %selector,
                age_secs = now_ms.saturating_sub(record.fetched_at_ms) / 1000,
                "Cache entry expired"
            );
            return Ok(None);
        }

        debug!(feed = %selector, "Cache hit");
        Ok(Some(CachedFeed {
            payload: record.payload.into_bytes(),
            fetched_at_ms: record.fetched_at_ms,
        }))
    }

    async fn put_impl(&self, selector: FeedSelector, payload: Vec<u8>) -> Result<(), CacheError> {
        let payload = String::from_utf8(payload)
            .map_err(|e| CacheError::Serialization(format!("payload is not UTF-8: {}", e)))?;

        let record = CacheRecord {
            feed: selector.key(),
            fetched_at_ms: self.clock.now_ms(),
            payload,
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.directory).await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.temp_path(&selector);
        let final_path = self.record_path(&selector);
        if let Err(e) = tokio::fs::write(&temp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(feed = %selector, bytes = bytes.len(), "Cached feed payload");
        Ok(())
    }

    async fn delete_impl(&self, selector: FeedSelector) -> Result<bool, CacheError> {
        match tokio::fs::remove_file(self.record_path(&selector)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists record and stray temp files with their sizes.
    async fn scan(&self) -> Result<Vec<(PathBuf, u64, bool)>, CacheError> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_temp = name.contains(TEMP_MARKER);
            let is_record = name.ends_with(&format!(".{}", RECORD_EXTENSION));
            if !(is_temp || is_record) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                files.push((entry.path(), metadata.len(), is_record && !is_temp));
            }
        }
        Ok(files)
    }

    async fn clear_impl(&self) -> Result<ClearResult, CacheError> {
        let mut result = ClearResult::default();
        for (path, size, is_record) in self.scan().await? {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    if is_record {
                        result.files_deleted += 1;
                    }
                    result.bytes_freed += size;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            directory = %self.directory.display(),
            files_deleted = result.files_deleted,
            bytes_freed = result.bytes_freed,
            "Cleared feed cache"
        );
        Ok(result)
    }

    async fn stats_impl(&self) -> Result<CacheStats, CacheError> {
        let now_ms = self.clock.now_ms();
        let mut stats = CacheStats::default();

        for (path, size, is_record) in self.scan().await? {
            stats.bytes += size;
            if !is_record {
                continue;
            }
            stats.entries += 1;
            if let Some(record) = self.read_record(&path).await? {
                if is_fresh(record.fetched_at_ms, now_ms, self.ttl) {
                    stats.fresh_entries += 1;
                }
            }
        }
        Ok(stats)
    }
}

impl FeedCache for DiskFeedCache {
    fn get(&self, selector: &FeedSelector) -> BoxFuture<'_, Result<Option<CachedFeed>, CacheError>> {
        let selector = *selector;
        Box::pin(self.get_impl(selector))
    }

    fn put(&self, selector: &FeedSelector, payload: Vec<u8>) -> BoxFuture<'_, Result<(), CacheError>> {
        let selector = *selector;
        Box::pin(self.put_impl(selector, payload))
    }

    fn delete(&self, selector: &FeedSelector) -> BoxFuture<'_, Result<bool, CacheError>> {
        let selector = *selector;
        Box::pin(self.delete_impl(selector))
    }

    fn clear(&self) -> BoxFuture<'_, Result<ClearResult, CacheError>> {
        Box::pin(self.clear_impl())
    }

    fn stats(&self) -> BoxFuture<'_, Result<CacheStats, CacheError>> {
        Box::pin(self.stats_impl())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
