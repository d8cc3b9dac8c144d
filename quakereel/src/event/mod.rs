//! Earthquake events: the record type, GeoJSON parsing and ordering.
//!
//! Events are built once from a provider payload and never mutated. The
//! playback layer only ever sees them through [`order`], which produces the
//! chronological sequence the scheduler replays.

mod geojson;
mod model;
mod ordering;

pub use geojson::{parse_feed, ParsedFeed};
pub use model::{format_time_ms, Event, Location};
pub use ordering::{order, summarize, DatasetSummary};
