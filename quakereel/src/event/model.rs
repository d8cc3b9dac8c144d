//! Event record.

use chrono::{DateTime, SecondsFormat, Utc};

/// Hypocenter of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Depth below the surface in kilometres.
    pub depth_km: f64,
}

/// A single earthquake as reported by the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Provider-assigned identifier (e.g. `us7000abcd`).
    pub id: String,
    /// Origin time in milliseconds since the Unix epoch.
    pub time_ms: i64,
    pub magnitude: f64,
    pub location: Location,
    /// Place description, e.g. `10 km SSW of Volcano, Hawaii`.
    pub description: String,
}

impl Event {
    /// Origin time as a UTC timestamp.
    ///
    /// Returns `None` only for times outside chrono's representable range.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time_ms)
    }
}

/// Formats an epoch-millisecond time as RFC 3339 (`2024-01-01T00:00:00Z`).
pub fn format_time_ms(time_ms: i64) -> String {
    match DateTime::from_timestamp_millis(time_ms) {
        Some(time) => time.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => format!("{}ms", time_ms),
    }
}
