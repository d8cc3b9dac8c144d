//! GeoJSON feed parsing.
//!
//! The USGS summary feeds are GeoJSON `FeatureCollection`s. Each feature
//! carries a `[longitude, latitude, depth]` point geometry and properties
//! including `mag`, `place` and `time` (epoch milliseconds).
//!
//! # Malformed features
//!
//! The collection itself must be well formed, otherwise parsing fails and
//! the caller treats the whole payload as unusable. Individual features
//! that lack an id, a three-element coordinate triple, a numeric time or a
//! numeric magnitude are skipped and counted; the rest of the batch is kept.
//! USGS does publish events with a null magnitude, and dropping them keeps a
//! single bad record from discarding an otherwise valid feed.

use serde::Deserialize;
use tracing::{debug, warn};

use super::model::{Event, Location};

/// Result of parsing a feed payload.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    /// Valid events in payload order.
    pub events: Vec<Event>,
    /// Number of features dropped as malformed.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    id: Option<String>,
    geometry: Option<RawGeometry>,
    properties: Option<RawProperties>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    mag: Option<f64>,
    place: Option<String>,
    title: Option<String>,
    time: Option<i64>,
}

impl RawFeature {
    fn into_event(self) -> Result<Event, &'static str> {
        let id = self.id.filter(|id| !id.is_empty()).ok_or("missing id")?;
        let geometry = self.geometry.ok_or("missing geometry")?;
        let properties = self.properties.ok_or("missing properties")?;

        let [longitude, latitude, depth_km] = geometry.coordinates[..] else {
            return Err("coordinates are not a [lon, lat, depth] triple");
        };
        if !(longitude.is_finite() && latitude.is_finite() && depth_km.is_finite()) {
            return Err("non-finite coordinates");
        }

        let time_ms = properties.time.ok_or("missing time")?;
        let magnitude = properties
            .mag
            .filter(|m| m.is_finite())
            .ok_or("missing magnitude")?;

        let description = properties
            .place
            .or(properties.title)
            .unwrap_or_default();

        Ok(Event {
            id,
            time_ms,
            magnitude,
            location: Location {
                latitude,
                longitude,
                depth_km,
            },
            description,
        })
    }
}

/// Parses a GeoJSON feed payload into events.
///
/// # Errors
///
/// Returns an error if the payload is not JSON or has no `features` array.
/// Malformed individual features are skipped, see the module docs.
pub fn parse_feed(payload: &[u8]) -> Result<ParsedFeed, serde_json::Error> {
    let collection: FeatureCollection = serde_json::from_slice(payload)?;

    let mut parsed = ParsedFeed {
        events: Vec::with_capacity(collection.features.len()),
        skipped: 0,
    };

    for (index, value) in collection.features.into_iter().enumerate() {
        let event = serde_json::from_value::<RawFeature>(value)
            .map_err(|_| "unexpected field types")
            .and_then(RawFeature::into_event);

        match event {
            Ok(event) => parsed.events.push(event),
            Err(reason) => {
                debug!(index, reason, "Skipping malformed feature");
                parsed.skipped += 1;
            }
        }
    }

    if parsed.skipped > 0 {
        warn!(
            skipped = parsed.skipped,
            kept = parsed.events.len(),
            "Dropped malformed features from feed"
        );
    }

    Ok(parsed)
}
