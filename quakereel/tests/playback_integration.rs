//! End-to-end playback through the public API: provider, cache, ordering
//! and scheduler, with a scripted HTTP client and paused tokio time.
//!
//! Run with: `cargo test --test playback_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use quakereel::app::{FeedSession, LoadOutcome};
use quakereel::cache::{DiskFeedCache, FeedCache, ManualClock, NoopFeedCache};
use quakereel::event::{order, summarize, Event, Location};
use quakereel::feed::FeedSelector;
use quakereel::playback::{
    playback_duration, CompressionRate, PlaybackScheduler, PlaybackState, RenderSink,
    StartOutcome,
};
use quakereel::provider::{AsyncHttpClient, DataSource, FeedProvider, FetchError};
use tempfile::TempDir;
use tokio::time::Instant;

const HOUR_MS: i64 = 3_600_000;

/// Serves one fixed payload and counts requests.
#[derive(Clone)]
struct ScriptedClient {
    payload: Arc<Vec<u8>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedClient {
    fn new(payload: Vec<u8>) -> Self {
        Self {
            payload: Arc::new(payload),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AsyncHttpClient for ScriptedClient {
    async fn get(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.as_ref().clone())
    }
}

#[derive(Default)]
struct Recorder {
    emitted: Mutex<Vec<(String, Instant)>>,
    clears: AtomicUsize,
}

impl RenderSink for Recorder {
    fn on_emit(&self, event: &Event) {
        self.emitted.lock().push((event.id.clone(), Instant::now()));
    }

    fn on_clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }

    fn on_progress(&self, _emitted: usize, _current_time_ms: i64) {}
}

fn event(id: &str, time_ms: i64) -> Event {
    Event {
        id: id.to_string(),
        time_ms,
        magnitude: 3.0,
        location: Location {
            latitude: 61.2,
            longitude: -149.9,
            depth_km: 40.0,
        },
        description: "Southern Alaska".to_string(),
    }
}

/// Events every `every_hours` from 0 to `span_hours` inclusive.
fn spread(span_hours: i64, every_hours: i64) -> Vec<Event> {
    (0..=span_hours / every_hours)
        .map(|i| event(&format!("ev{}", i), i * every_hours * HOUR_MS))
        .collect()
}

/// GeoJSON with the given (id, time, mag) features, newest first.
fn geojson(features: &[(&str, i64, f64)]) -> Vec<u8> {
    let features: Vec<String> = features
        .iter()
        .rev()
        .map(|(id, time, mag)| {
            format!(
                r#"{{"type":"Feature","id":"{id}","geometry":{{"type":"Point","coordinates":[-149.9,61.2,40.0]}},"properties":{{"mag":{mag},"place":"Southern Alaska","time":{time}}}}}"#
            )
        })
        .collect();
    format!(
        r#"{{"type":"FeatureCollection","metadata":{{"title":"test"}},"features":[{}]}}"#,
        features.join(",")
    )
    .into_bytes()
}

async fn play_to_completion(events: Vec<Event>, rate: CompressionRate) -> (Duration, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let scheduler = PlaybackScheduler::with_rate(Arc::clone(&recorder), rate);
    scheduler.load(order(events));
    let mut states = scheduler.subscribe();

    let started = Instant::now();
    assert_eq!(scheduler.start(), StartOutcome::Started);
    states
        .wait_for(|s| *s == PlaybackState::Completed)
        .await
        .unwrap();

    (started.elapsed(), recorder)
}

fn assert_near(actual: Duration, expected: Duration, tolerance: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= tolerance,
        "expected about {:?}, took {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn day_at_one_hour_per_second_takes_24_seconds() {
    let events = spread(24, 1);
    let n = events.len();

    let (elapsed, recorder) = play_to_completion(events, CompressionRate::new(1.0)).await;

    assert_near(elapsed, Duration::from_secs(24), Duration::from_millis(100));
    let emitted = recorder.emitted.lock();
    assert_eq!(emitted.len(), n);
    let ids: Vec<&str> = emitted.iter().map(|(id, _)| id.as_str()).collect();
    let expected: Vec<String> = (0..n).map(|i| format!("ev{}", i)).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn week_at_twelve_hours_per_second_takes_14_seconds() {
    let events = spread(7 * 24, 6);
    let n = events.len();

    let (elapsed, recorder) = play_to_completion(events, CompressionRate::new(12.0)).await;

    assert_near(elapsed, Duration::from_secs(14), Duration::from_millis(100));
    assert_eq!(recorder.emitted.lock().len(), n);
}

#[tokio::test(start_paused = true)]
async fn emissions_are_evenly_spaced() {
    let events = spread(24, 1);
    let (_, recorder) = play_to_completion(events, CompressionRate::new(2.0)).await;

    // 24h at 2h/s over 25 events
    let expected = playback_duration(Duration::from_secs(24 * 3600), CompressionRate::new(2.0)) / 25;
    let emitted = recorder.emitted.lock();
    for pair in emitted.windows(2) {
        assert_near(pair[1].1 - pair[0].1, expected, Duration::from_millis(2));
    }
}

#[tokio::test(start_paused = true)]
async fn unsorted_payload_plays_chronologically() {
    let payload = geojson(&[
        ("c", 3 * HOUR_MS, 1.5),
        ("a", HOUR_MS, 4.0),
        ("b", 2 * HOUR_MS, 2.2),
        ("a2", HOUR_MS, 3.1),
    ]);
    let provider = FeedProvider::new(ScriptedClient::new(payload), Arc::new(NoopFeedCache));
    let recorder = Arc::new(Recorder::default());
    let session = FeedSession::new(provider, PlaybackScheduler::new(Arc::clone(&recorder)));

    let outcome = session.load(FeedSelector::default()).await.unwrap();
    let LoadOutcome::Loaded(report) = outcome else {
        panic!("load was superseded");
    };
    assert_eq!(report.summary.count, 4);
    assert_eq!(report.summary.max_magnitude, Some(4.0));

    let mut states = session.subscribe();
    session.start();
    states
        .wait_for(|s| *s == PlaybackState::Completed)
        .await
        .unwrap();

    let ids: Vec<String> = recorder
        .emitted
        .lock()
        .iter()
        .map(|(id, _)| id.clone())
        .collect();
    // geojson() reverses its input, so "a2" precedes "a" in the payload
    assert_eq!(ids, vec!["a2", "a", "b", "c"]);
}

#[tokio::test]
async fn cache_survives_restart_and_expires() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let payload = geojson(&[("x", 0, 2.0), ("y", HOUR_MS, 2.5)]);
    let feed: FeedSelector = "2.5_day".parse().unwrap();

    let first = ScriptedClient::new(payload.clone());
    let cache = Arc::new(DiskFeedCache::new(dir.path()).with_clock(clock.clone()));
    let provider = FeedProvider::new(first.clone(), cache);
    let data = provider.fetch(&feed).await.unwrap();
    assert_eq!(data.source, DataSource::Network);
    assert_eq!(first.calls(), 1);

    // New provider over the same directory, as after a restart
    let second = ScriptedClient::new(payload);
    let cache = Arc::new(DiskFeedCache::new(dir.path()).with_clock(clock.clone()));
    let provider = FeedProvider::new(second.clone(), cache.clone());

    clock.advance(Duration::from_secs(59 * 60));
    let data = provider.fetch(&feed).await.unwrap();
    assert_eq!(data.source, DataSource::Cache);
    assert_eq!(second.calls(), 0);
    assert_eq!(summarize(&order(data.events)).count, 2);

    clock.advance(Duration::from_secs(2 * 60));
    let data = provider.fetch(&feed).await.unwrap();
    assert_eq!(data.source, DataSource::Network);
    assert_eq!(second.calls(), 1);
    assert_eq!(cache.stats().await.unwrap().fresh_entries, 1);
}

#[tokio::test(start_paused = true)]
async fn pause_resume_rate_change_and_reset() {
    let recorder = Arc::new(Recorder::default());
    let scheduler = PlaybackScheduler::new(Arc::clone(&recorder));
    scheduler.load(spread(20, 1));
    let clears = recorder.clears.load(Ordering::SeqCst);

    scheduler.start();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(scheduler.pause());
    let paused_at = scheduler.status().cursor;
    assert!(paused_at > 0);

    scheduler.set_rate(CompressionRate::new(10.0));
    assert_eq!(scheduler.state(), PlaybackState::Paused);
    assert_eq!(scheduler.start(), StartOutcome::Resumed);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(scheduler.status().cursor > paused_at);

    scheduler.reset();
    let emitted = recorder.emitted.lock().len();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(recorder.emitted.lock().len(), emitted);
    assert_eq!(scheduler.status().cursor, 0);
    assert_eq!(recorder.clears.load(Ordering::SeqCst), clears + 1);
}
