//! Chronological ordering and dataset statistics.

use std::fmt;
use std::time::Duration;

use super::model::{format_time_ms, Event};

/// Sorts events ascending by origin time.
///
/// The sort is stable: events sharing a timestamp keep their input order,
/// so replaying the same payload always emits events in the same sequence.
pub fn order(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|event| event.time_ms);
    events
}

/// Summary statistics for an ordered dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DatasetSummary {
    pub count: usize,
    /// Time of the earliest event, absent for an empty dataset.
    pub first_time_ms: Option<i64>,
    /// Time of the latest event, absent for an empty dataset.
    pub last_time_ms: Option<i64>,
    /// Largest magnitude in the dataset.
    pub max_magnitude: Option<f64>,
}

impl DatasetSummary {
    /// Time between the first and last event.
    pub fn span(&self) -> Duration {
        match (self.first_time_ms, self.last_time_ms) {
            (Some(first), Some(last)) => Duration::from_millis(last.saturating_sub(first).max(0) as u64),
            _ => Duration::ZERO,
        }
    }

    /// True when there is nothing to play back.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.first_time_ms, self.last_time_ms) {
            (Some(first), Some(last)) => write!(
                f,
                "{} events from {} to {}",
                self.count,
                format_time_ms(first),
                format_time_ms(last)
            ),
            _ => write!(f, "no events"),
        }
    }
}

/// Computes count, first/last time and peak magnitude of `sorted`.
///
/// `sorted` must already be in [`order`]; first and last are read from the
/// ends of the slice.
pub fn summarize(sorted: &[Event]) -> DatasetSummary {
    let max_magnitude = sorted
        .iter()
        .map(|event| event.magnitude)
        .fold(None, |max: Option<f64>, m| Some(max.map_or(m, |max| max.max(m))));

    DatasetSummary {
        count: sorted.len(),
        first_time_ms: sorted.first().map(|event| event.time_ms),
        last_time_ms: sorted.last().map(|event| event.time_ms),
        max_magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Location;

    fn event(id: &str, time_ms: i64, magnitude: f64) -> Event {
        Event {
            id: id.to_string(),
            time_ms,
            magnitude,
            location: Location {
                latitude: 0.0,
                longitude: 0.0,
                depth_km: 10.0,
            },
            description: String::new(),
        }
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_order_sorts_ascending() {
        let sorted = order(vec![event("c", 30, 1.0), event("a", 10, 1.0), event("b", 20, 1.0)]);
        assert_eq!(ids(&sorted), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_order_is_stable_for_ties() {
        let sorted = order(vec![
            event("late", 50, 1.0),
            event("tie-1", 10, 1.0),
            event("tie-2", 10, 2.0),
            event("tie-3", 10, 3.0),
        ]);
        assert_eq!(ids(&sorted), vec!["tie-1", "tie-2", "tie-3", "late"]);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.first_time_ms.is_none());
        assert!(summary.last_time_ms.is_none());
        assert!(summary.max_magnitude.is_none());
        assert!(summary.is_empty());
        assert_eq!(summary.span(), Duration::ZERO);
        assert_eq!(summary.to_string(), "no events");
    }

    #[test]
    fn test_summarize_dataset() {
        let sorted = order(vec![event("a", 1_000, 2.0), event("b", 86_401_000, 5.3), event("c", 5_000, 1.1)]);
        let summary = summarize(&sorted);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.first_time_ms, Some(1_000));
        assert_eq!(summary.last_time_ms, Some(86_401_000));
        assert_eq!(summary.max_magnitude, Some(5.3));
        assert_eq!(summary.span(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_summarize_single_event() {
        let summary = summarize(&[event("solo", 42, 3.0)]);
        assert_eq!(summary.first_time_ms, summary.last_time_ms);
        assert_eq!(summary.span(), Duration::ZERO);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_order_sorted_and_stable(times in prop::collection::vec(0i64..20, 0..64)) {
                let input: Vec<Event> = times
                    .iter()
                    .enumerate()
                    .map(|(i, t)| event(&i.to_string(), *t, 1.0))
                    .collect();

                let sorted = order(input);

                prop_assert_eq!(sorted.len(), times.len());
                for pair in sorted.windows(2) {
                    prop_assert!(pair[0].time_ms <= pair[1].time_ms);
                    if pair[0].time_ms == pair[1].time_ms {
                        // Ids are input positions, so ties must stay ascending
                        let a: usize = pair[0].id.parse().unwrap();
                        let b: usize = pair[1].id.parse().unwrap();
                        prop_assert!(a < b, "tie reordered: {} before {}", a, b);
                    }
                }
            }
        }
    }
}
