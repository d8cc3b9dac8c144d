//! Compression rate.

use std::fmt;
use std::str::FromStr;

/// Slowest supported rate, in simulated hours per real second.
pub const MIN_RATE: f64 = 0.1;

/// Fastest supported rate, in simulated hours per real second.
pub const MAX_RATE: f64 = 24.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Simulated hours of event time played back per real second.
///
/// Always within [`MIN_RATE`, `MAX_RATE`]; out-of-range inputs are clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CompressionRate(f64);

impl CompressionRate {
    /// Creates a rate, clamping into the supported range.
    ///
    /// A non-finite input falls back to the default of one hour per second.
    pub fn new(hours_per_second: f64) -> Self {
        if hours_per_second.is_finite() {
            Self(hours_per_second.clamp(MIN_RATE, MAX_RATE))
        } else {
            Self::default()
        }
    }

    pub fn hours_per_second(&self) -> f64 {
        self.0
    }

    /// Milliseconds of event time covered per real second.
    pub fn event_ms_per_second(&self) -> f64 {
        self.0 * MS_PER_HOUR
    }
}

impl Default for CompressionRate {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for CompressionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h/s", self.0)
    }
}

impl FromStr for CompressionRate {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_suffix("h/s")
            .or_else(|| trimmed.strip_suffix('x'))
            .unwrap_or(trimmed);
        number.trim().parse::<f64>().map(CompressionRate::new)
    }
}
