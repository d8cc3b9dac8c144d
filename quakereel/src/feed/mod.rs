//! Feed selection.
//!
//! A feed is identified by a magnitude threshold and a time range. The set
//! of feeds is closed: every combination maps to exactly one USGS summary
//! endpoint and one cache slot.

mod selector;

pub use selector::{
    FeedSelector, InvalidSelector, MagnitudeThreshold, TimeRange, DEFAULT_FEED_BASE_URL,
};
