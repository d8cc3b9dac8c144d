//! Wall-clock timing for fixed-cadence playback.
//!
//! Playback emits one event per tick. The tick interval spreads the
//! remaining events evenly over the wall-clock time the remaining event-time
//! span takes at the current rate, so bursts and quiet periods render at the
//! same cadence.

use std::time::Duration;

use super::rate::CompressionRate;

/// Shortest tick interval. Keeps tiny spans from flooding the renderer.
pub const MIN_STEP: Duration = Duration::from_millis(10);

/// Wall-clock time needed to play `span` of event time at `rate`.
///
/// `span / (rate * 3_600_000) * 1000` milliseconds.
pub fn playback_duration(span: Duration, rate: CompressionRate) -> Duration {
    let span_ms = span.as_millis() as f64;
    let duration_ms = span_ms / rate.event_ms_per_second() * 1000.0;
    Duration::from_secs_f64(duration_ms / 1000.0)
}

/// Tick interval for `remaining` events covering `span` at `rate`.
///
/// Never shorter than [`MIN_STEP`].
pub fn step_interval(span: Duration, remaining: usize, rate: CompressionRate) -> Duration {
    if remaining == 0 {
        return MIN_STEP;
    }
    let per_event = playback_duration(span, rate).as_secs_f64() / remaining as f64;
    Duration::from_secs_f64(per_event).max(MIN_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);

    fn assert_close(actual: Duration, expected: Duration) {
        let diff = (actual.as_secs_f64() - expected.as_secs_f64()).abs();
        assert!(diff < 1e-6, "expected {:?}, got {:?}", expected, actual);
    }

    #[test]
    fn test_day_at_one_hour_per_second() {
        assert_close(
            playback_duration(DAY, CompressionRate::new(1.0)),
            Duration::from_secs(24),
        );
    }

    #[test]
    fn test_week_at_twelve_hours_per_second() {
        assert_close(
            playback_duration(DAY * 7, CompressionRate::new(12.0)),
            Duration::from_secs(14),
        );
    }

    #[test]
    fn test_step_divides_duration() {
        assert_close(
            step_interval(DAY, 240, CompressionRate::new(1.0)),
            Duration::from_millis(100),
        );
    }

    #[test]
    fn test_step_floor() {
        assert_eq!(
            step_interval(Duration::from_secs(60), 1000, CompressionRate::new(24.0)),
            MIN_STEP
        );
        assert_eq!(step_interval(Duration::ZERO, 1, CompressionRate::default()), MIN_STEP);
        assert_eq!(step_interval(DAY, 0, CompressionRate::default()), MIN_STEP);
    }
}
