//! Playback scheduler.
//!
//! # State machine
//!
//! ```text
//!            start                 cursor == n
//!   Idle ─────────────► Running ─────────────────► Completed
//!    ▲                   │   ▲                         │
//!    │ reset      pause  │   │ start (resume)          │ reset
//!    │                   ▼   │                         │
//!    └──────────────── Paused ◄────────────────────────┘
//! ```
//!
//! `reset` returns to `Idle` from any state. `load` replaces the dataset and
//! also returns to `Idle`.
//!
//! # Ticking
//!
//! While running, a spawned tokio task ticks at the step interval; each tick
//! emits `events[cursor]` and advances the cursor. The tick after the last
//! emission moves to `Completed`. Every tick task carries the generation it
//! was started under and only acts if that generation is still current, and
//! the check happens under the state lock. Once `pause`, `reset`, `load` or
//! `set_rate` returns, no tick from the previous schedule can emit.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::rate::CompressionRate;
use super::render::RenderSink;
use super::timing::step_interval;
use crate::event::Event;

/// Externally visible playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Cursor at the start, not ticking.
    Idle,
    /// Ticking and emitting events.
    Running,
    /// Stopped mid-way; cursor preserved.
    Paused,
    /// Every event has been emitted.
    Completed,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a call to [`PlaybackScheduler::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Playback began from the first event.
    Started,
    /// Playback continued from a pause.
    Resumed,
    /// Already running; nothing changed.
    AlreadyRunning,
    /// The dataset is empty; nothing to play.
    NoData,
    /// Playback already reached the end; reset to replay.
    Finished,
}

/// Point-in-time copy of the scheduler state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    /// Number of events emitted so far.
    pub cursor: usize,
    pub total: usize,
    pub rate: CompressionRate,
    /// Interval of the active tick schedule, if running.
    pub step: Option<Duration>,
    /// Time of the most recently emitted event.
    pub current_time_ms: Option<i64>,
}

impl PlaybackStatus {
    /// Fraction of events emitted, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.cursor as f64 / self.total as f64
        }
    }
}

struct Inner {
    events: Arc<[Event]>,
    cursor: usize,
    rate: CompressionRate,
    state: PlaybackState,
    step: Option<Duration>,
    generation: u64,
    ticker: Option<CancellationToken>,
}

impl Inner {
    /// Stops all pending ticks.
    ///
    /// This is the single cancellation point used by pause, reset, load and
    /// rate changes. Bumping the generation invalidates a tick that is
    /// already waiting on the lock.
    fn stop_ticks(&mut self) {
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
        self.step = None;
    }

    /// Interval that spreads the remaining events over the remaining span.
    fn remaining_step(&self) -> Duration {
        let remaining = self.events.len().saturating_sub(self.cursor);
        let span_ms = match (self.events.get(self.cursor), self.events.last()) {
            (Some(next), Some(last)) => last.time_ms.saturating_sub(next.time_ms).max(0),
            _ => 0,
        };
        step_interval(Duration::from_millis(span_ms as u64), remaining, self.rate)
    }
}

struct Shared<R> {
    sink: R,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<PlaybackState>,
}

impl<R: RenderSink> Shared<R> {
    fn set_state(&self, inner: &mut Inner, state: PlaybackState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }

    /// Runs one tick. Returns false when the tick task should exit.
    fn tick(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.state != PlaybackState::Running {
            return false;
        }

        if inner.cursor >= inner.events.len() {
            inner.ticker = None;
            inner.step = None;
            self.set_state(&mut inner, PlaybackState::Completed);
            info!(emitted = inner.cursor, "Playback completed");
            return false;
        }

        let events = Arc::clone(&inner.events);
        let event = &events[inner.cursor];
        self.sink.on_emit(event);
        inner.cursor += 1;
        self.sink.on_progress(inner.cursor, event.time_ms);
        true
    }
}

/// Replays an ordered event sequence at a compressed rate.
///
/// The scheduler owns its tick task; dropping the scheduler cancels it.
///
/// # Example
///
/// ```ignore
/// use quakereel::playback::{CompressionRate, PlaybackScheduler};
///
/// let scheduler = PlaybackScheduler::new(sink);
/// scheduler.load(order(events));
/// scheduler.start();
/// scheduler.set_rate(CompressionRate::new(6.0));
/// scheduler.pause();
/// scheduler.reset();
/// ```
///
/// # Panics
///
/// `start` and `set_rate` spawn the tick task and must be called from
/// within a tokio runtime.
pub struct PlaybackScheduler<R: RenderSink> {
    shared: Arc<Shared<R>>,
}

impl<R: RenderSink> PlaybackScheduler<R> {
    /// Creates an idle scheduler with no events at the default rate.
    pub fn new(sink: R) -> Self {
        Self::with_rate(sink, CompressionRate::default())
    }

    /// Creates an idle scheduler with no events at `rate`.
    pub fn with_rate(sink: R, rate: CompressionRate) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::Idle);
        Self {
            shared: Arc::new(Shared {
                sink,
                inner: Mutex::new(Inner {
                    events: Arc::from(Vec::<Event>::new()),
                    cursor: 0,
                    rate,
                    state: PlaybackState::Idle,
                    step: None,
                    generation: 0,
                    ticker: None,
                }),
                state_tx,
            }),
        }
    }

    /// The render sink.
    pub fn sink(&self) -> &R {
        &self.shared.sink
    }

    /// Replaces the dataset and returns to `Idle`.
    ///
    /// `events` must already be in chronological order. Any running
    /// schedule is discarded and the sink is cleared.
    pub fn load(&self, events: Vec<Event>) {
        debug_assert!(events.windows(2).all(|w| w[0].time_ms <= w[1].time_ms));

        let mut inner = self.shared.inner.lock();
        inner.stop_ticks();
        inner.events = Arc::from(events);
        inner.cursor = 0;
        self.shared.set_state(&mut inner, PlaybackState::Idle);
        self.shared.sink.on_clear();

        info!(events = inner.events.len(), "Loaded playback dataset");
    }

    /// Starts or resumes playback.
    ///
    /// From `Idle` the first event is emitted immediately; after a pause
    /// the next event follows one step later. An empty dataset is reported
    /// as [`StartOutcome::NoData`] and leaves the state unchanged.
    pub fn start(&self) -> StartOutcome {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            PlaybackState::Running => StartOutcome::AlreadyRunning,
            PlaybackState::Completed => StartOutcome::Finished,
            _ if inner.events.is_empty() => {
                info!("No data to play back");
                StartOutcome::NoData
            }
            PlaybackState::Idle => {
                self.schedule(&mut inner, true);
                StartOutcome::Started
            }
            PlaybackState::Paused => {
                self.schedule(&mut inner, false);
                StartOutcome::Resumed
            }
        }
    }

    /// Stops ticking and keeps the cursor where it is.
    ///
    /// Returns true if playback was running.
    pub fn pause(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.state != PlaybackState::Running {
            return false;
        }
        inner.stop_ticks();
        self.shared.set_state(&mut inner, PlaybackState::Paused);
        info!(cursor = inner.cursor, "Playback paused");
        true
    }

    /// Stops ticking, rewinds to the first event and clears the sink.
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        inner.stop_ticks();
        inner.cursor = 0;
        self.shared.set_state(&mut inner, PlaybackState::Idle);
        self.shared.sink.on_clear();
        info!("Playback reset");
    }

    /// Changes the compression rate.
    ///
    /// While running, the current schedule is replaced by one whose step
    /// is computed from the span still ahead of the cursor.
    pub fn set_rate(&self, rate: CompressionRate) {
        let mut inner = self.shared.inner.lock();
        inner.rate = rate;
        if inner.state == PlaybackState::Running {
            inner.stop_ticks();
            self.schedule(&mut inner, false);
        }
        info!(rate = %rate, "Playback rate changed");
    }

    /// Current compression rate.
    pub fn rate(&self) -> CompressionRate {
        self.shared.inner.lock().rate
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.shared.inner.lock().state
    }

    /// Snapshot of cursor, totals and timing.
    pub fn status(&self) -> PlaybackStatus {
        let inner = self.shared.inner.lock();
        let current_time_ms = inner
            .cursor
            .checked_sub(1)
            .and_then(|i| inner.events.get(i))
            .map(|event| event.time_ms);

        PlaybackStatus {
            state: inner.state,
            cursor: inner.cursor,
            total: inner.events.len(),
            rate: inner.rate,
            step: inner.step,
            current_time_ms,
        }
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.shared.state_tx.subscribe()
    }

    /// Spawns a tick task for the current cursor and rate.
    ///
    /// Caller must have stopped any previous schedule.
    fn schedule(&self, inner: &mut Inner, immediate: bool) {
        let step = inner.remaining_step();
        let token = CancellationToken::new();
        inner.step = Some(step);
        inner.ticker = Some(token.clone());
        self.shared.set_state(inner, PlaybackState::Running);

        debug!(
            cursor = inner.cursor,
            total = inner.events.len(),
            step_ms = step.as_millis() as u64,
            rate = %inner.rate,
            "Scheduling playback ticks"
        );

        let shared = Arc::clone(&self.shared);
        let generation = inner.generation;
        let first_tick = if immediate {
            Instant::now()
        } else {
            Instant::now() + step
        };

        tokio::spawn(async move {
            let mut ticks = interval_at(first_tick, step);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = ticks.tick() => {
                        if !shared.tick(generation) {
                            break;
                        }
                    }
                }
            }
        });
    }
}

impl<R: RenderSink> Drop for PlaybackScheduler<R> {
    fn drop(&mut self) {
        self.shared.inner.lock().stop_ticks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Location;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HOUR_MS: i64 = 3_600_000;

    #[derive(Default)]
    struct RecordingSink {
        emitted: parking_lot::Mutex<Vec<String>>,
        progress: parking_lot::Mutex<Vec<(usize, i64)>>,
        clears: AtomicUsize,
    }

    impl RecordingSink {
        fn ids(&self) -> Vec<String> {
            self.emitted.lock().clone()
        }

        fn clears(&self) -> usize {
            self.clears.load(Ordering::SeqCst)
        }
    }

    impl RenderSink for RecordingSink {
        fn on_emit(&self, event: &Event) {
            self.emitted.lock().push(event.id.clone());
        }

        fn on_clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
            self.emitted.lock().clear();
        }

        fn on_progress(&self, emitted: usize, current_time_ms: i64) {
            self.progress.lock().push((emitted, current_time_ms));
        }
    }

    fn event(id: usize, time_ms: i64) -> Event {
        Event {
            id: format!("ev{}", id),
            time_ms,
            magnitude: 2.0,
            location: Location {
                latitude: 0.0,
                longitude: 0.0,
                depth_km: 5.0,
            },
            description: String::new(),
        }
    }

    /// `n` events one hour apart.
    fn hourly(n: usize) -> Vec<Event> {
        (0..n).map(|i| event(i, i as i64 * HOUR_MS)).collect()
    }

    fn scheduler() -> PlaybackScheduler<Arc<RecordingSink>> {
        PlaybackScheduler::new(Arc::new(RecordingSink::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_with_no_events_is_noop() {
        let scheduler = scheduler();

        assert_eq!(scheduler.start(), StartOutcome::NoData);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert!(scheduler.sink().ids().is_empty());
        assert!(scheduler.sink().progress.lock().is_empty());
        assert_eq!(scheduler.sink().clears(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_all_events_in_order() {
        let scheduler = scheduler();
        scheduler.load(hourly(5));
        let mut states = scheduler.subscribe();

        assert_eq!(scheduler.start(), StartOutcome::Started);
        states
            .wait_for(|s| *s == PlaybackState::Completed)
            .await
            .unwrap();

        assert_eq!(scheduler.sink().ids(), vec!["ev0", "ev1", "ev2", "ev3", "ev4"]);
        let status = scheduler.status();
        assert_eq!(status.cursor, 5);
        assert_eq!(status.current_time_ms, Some(4 * HOUR_MS));
        assert_eq!(status.progress(), 1.0);

        let progress = scheduler.sink().progress.lock().clone();
        assert_eq!(progress.first(), Some(&(1, 0)));
        assert_eq!(progress.last(), Some(&(5, 4 * HOUR_MS)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_event_is_immediate() {
        let scheduler = scheduler();
        scheduler.load(hourly(3));

        scheduler.start();
        tokio::task::yield_now().await;

        assert_eq!(scheduler.sink().ids(), vec!["ev0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_preserves_cursor() {
        let scheduler = scheduler();
        // 10 events over 9 hours at 1h/s: 0.9s per step
        scheduler.load(hourly(10));

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(scheduler.pause());
        let cursor = scheduler.status().cursor;
        assert_eq!(cursor, 3);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(scheduler.status().cursor, cursor);
        assert_eq!(scheduler.state(), PlaybackState::Paused);

        assert_eq!(scheduler.start(), StartOutcome::Resumed);
        let mut states = scheduler.subscribe();
        states
            .wait_for(|s| *s == PlaybackState::Completed)
            .await
            .unwrap();
        assert_eq!(scheduler.sink().ids().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_after_pause_clears_once() {
        let scheduler = scheduler();
        scheduler.load(hourly(10));
        let clears_after_load = scheduler.sink().clears();

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        scheduler.pause();
        assert!(scheduler.status().cursor > 0);

        scheduler.reset();

        assert_eq!(scheduler.status().cursor, 0);
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert_eq!(scheduler.sink().clears(), clears_after_load + 1);
        assert!(scheduler.sink().ids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_after_reset() {
        let scheduler = scheduler();
        scheduler.load(hourly(10));

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        scheduler.reset();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(scheduler.sink().ids().is_empty());
        assert!(scheduler.sink().progress.lock().len() <= 2);
        assert_eq!(scheduler.status().cursor, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_change_uses_remaining_span() {
        let scheduler = scheduler();
        scheduler.load(hourly(10));

        scheduler.start();
        let initial = scheduler.status().step.unwrap();
        assert!((initial.as_secs_f64() - 0.9).abs() < 1e-6);

        // Five events emitted at 0.0, 0.9, 1.8, 2.7, 3.6s
        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(scheduler.status().cursor, 5);

        scheduler.set_rate(CompressionRate::new(2.0));

        // Remaining span 4h over 5 events at 2h/s: 0.4s, not 9h/2/10 = 0.45s
        let status = scheduler.status();
        assert_eq!(status.state, PlaybackState::Running);
        assert!((status.step.unwrap().as_secs_f64() - 0.4).abs() < 1e-6);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(scheduler.status().cursor, 5);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(scheduler.status().cursor, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_change_while_paused_applies_on_resume() {
        let scheduler = scheduler();
        scheduler.load(hourly(10));

        scheduler.set_rate(CompressionRate::new(3.0));
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert!(scheduler.status().step.is_none());

        scheduler.start();
        // 9h at 3h/s = 3s over 10 events
        assert!((scheduler.status().step.unwrap().as_secs_f64() - 0.3).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_completion_reports_finished() {
        let scheduler = scheduler();
        scheduler.load(hourly(2));
        let mut states = scheduler.subscribe();

        scheduler.start();
        states
            .wait_for(|s| *s == PlaybackState::Completed)
            .await
            .unwrap();

        assert_eq!(scheduler.start(), StartOutcome::Finished);
        assert_eq!(scheduler.start(), StartOutcome::Finished);

        scheduler.reset();
        assert_eq!(scheduler.start(), StartOutcome::Started);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_already_running() {
        let scheduler = scheduler();
        scheduler.load(hourly(3));

        assert_eq!(scheduler.start(), StartOutcome::Started);
        assert_eq!(scheduler.start(), StartOutcome::AlreadyRunning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_discards_running_schedule() {
        let scheduler = scheduler();
        scheduler.load(hourly(10));
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        scheduler.load(vec![event(99, 0)]);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert_eq!(scheduler.status().cursor, 0);
        assert_eq!(scheduler.status().total, 1);
        assert!(scheduler.sink().ids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_event_uses_min_step() {
        let scheduler = scheduler();
        scheduler.load(vec![event(0, 0)]);
        scheduler.start();
        assert_eq!(scheduler.status().step, Some(super::super::timing::MIN_STEP));
    }

    #[test]
    fn test_pause_when_idle_is_noop() {
        let scheduler = scheduler();
        assert!(!scheduler.pause());
        assert_eq!(scheduler.state(), PlaybackState::Idle);
    }
}
