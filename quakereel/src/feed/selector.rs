//! USGS summary feed selectors.
//!
//! # URL Pattern
//!
//! `https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/{threshold}_{range}.geojson`
//!
//! - `threshold` is one of `significant`, `4.5`, `2.5`, `1.0`, `all`
//! - `range` is one of `hour`, `day`, `week`, `month`
//! - No authentication required

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Base URL for the USGS GeoJSON summary feeds.
pub const DEFAULT_FEED_BASE_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// Error returned when a string does not name a known feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid feed type: {0}")]
pub struct InvalidSelector(pub String);

/// Minimum magnitude of the events a feed contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MagnitudeThreshold {
    /// Events USGS flags as significant (any magnitude).
    Significant,
    /// Magnitude 4.5 and above.
    M4_5,
    /// Magnitude 2.5 and above.
    M2_5,
    /// Magnitude 1.0 and above.
    M1_0,
    /// Every recorded event.
    All,
}

impl MagnitudeThreshold {
    /// All thresholds in listing order.
    pub const ALL: [MagnitudeThreshold; 5] = [
        MagnitudeThreshold::Significant,
        MagnitudeThreshold::M4_5,
        MagnitudeThreshold::M2_5,
        MagnitudeThreshold::M1_0,
        MagnitudeThreshold::All,
    ];

    /// Key fragment used in feed names and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MagnitudeThreshold::Significant => "significant",
            MagnitudeThreshold::M4_5 => "4.5",
            MagnitudeThreshold::M2_5 => "2.5",
            MagnitudeThreshold::M1_0 => "1.0",
            MagnitudeThreshold::All => "all",
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            MagnitudeThreshold::Significant => "Significant",
            MagnitudeThreshold::M4_5 => "M4.5+",
            MagnitudeThreshold::M2_5 => "M2.5+",
            MagnitudeThreshold::M1_0 => "M1.0+",
            MagnitudeThreshold::All => "All",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Window of past time a feed covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    /// Past 30 days.
    Month,
}

impl TimeRange {
    /// All ranges in listing order.
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Hour,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    /// Key fragment used in feed names and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Hour => "hour",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Hour => "past hour",
            TimeRange::Day => "past day",
            TimeRange::Week => "past 7 days",
            TimeRange::Month => "past 30 days",
        }
    }

    /// Nominal width of the window.
    pub fn nominal_span(&self) -> Duration {
        const HOUR: u64 = 3600;
        match self {
            TimeRange::Hour => Duration::from_secs(HOUR),
            TimeRange::Day => Duration::from_secs(24 * HOUR),
            TimeRange::Week => Duration::from_secs(7 * 24 * HOUR),
            TimeRange::Month => Duration::from_secs(30 * 24 * HOUR),
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

/// Identifies one USGS summary feed, and therefore one cache slot.
///
/// Selectors can only be built from the enumerated thresholds and ranges,
/// so every value maps to an existing endpoint.
///
/// # Example
///
/// ```
/// use quakereel::feed::{FeedSelector, MagnitudeThreshold, TimeRange};
///
/// let feed: FeedSelector = "2.5_day".parse().unwrap();
/// assert_eq!(feed, FeedSelector::new(MagnitudeThreshold::M2_5, TimeRange::Day));
/// assert_eq!(feed.key(), "2.5_day");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedSelector {
    pub threshold: MagnitudeThreshold,
    pub range: TimeRange,
}

impl FeedSelector {
    /// Creates a selector from its two components.
    pub const fn new(threshold: MagnitudeThreshold, range: TimeRange) -> Self {
        Self { threshold, range }
    }

    /// Every available feed, grouped by threshold then range.
    pub fn all() -> Vec<FeedSelector> {
        MagnitudeThreshold::ALL
            .into_iter()
            .flat_map(|threshold| {
                TimeRange::ALL
                    .into_iter()
                    .map(move |range| FeedSelector::new(threshold, range))
            })
            .collect()
    }

    /// Stable key, e.g. `2.5_day`. Used as the feed name and cache key.
    pub fn key(&self) -> String {
        format!("{}_{}", self.threshold.as_str(), self.range.as_str())
    }

    /// Human-readable description, e.g. `M2.5+, past day`.
    pub fn describe(&self) -> String {
        format!("{}, {}", self.threshold.label(), self.range.label())
    }

    /// Builds the GeoJSON endpoint URL below `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}.geojson", base_url.trim_end_matches('/'), self.key())
    }
}

impl Default for FeedSelector {
    fn default() -> Self {
        FeedSelector::new(MagnitudeThreshold::All, TimeRange::Day)
    }
}

impl fmt::Display for FeedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.threshold.as_str(), self.range.as_str())
    }
}

impl FromStr for FeedSelector {
    type Err = InvalidSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        // Thresholds like "4.5" contain no underscore, so split on the last one.
        let (threshold, range) = trimmed
            .rsplit_once('_')
            .ok_or_else(|| InvalidSelector(s.to_string()))?;

        match (MagnitudeThreshold::parse(threshold), TimeRange::parse(range)) {
            (Some(threshold), Some(range)) => Ok(FeedSelector::new(threshold, range)),
            _ => Err(InvalidSelector(s.to_string())),
        }
    }
}
