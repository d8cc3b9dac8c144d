//! QuakeReel - time-compressed replay of USGS earthquake feeds
//!
//! This library fetches GeoJSON earthquake feeds from the USGS summary
//! service, keeps them in a time-bounded disk cache, orders the events
//! chronologically and replays them at a chosen compression rate
//! (simulated hours per real second) through a pluggable render sink.
//!
//! # Architecture
//!
//! ```text
//! FeedSelector ──► FeedProvider ──► order() ──► PlaybackScheduler ──► RenderSink
//!                   │      ▲                      (tick task)         (map, terminal)
//!                   ▼      │
//!                 FeedCache (disk, TTL)
//! ```

pub mod app;
pub mod cache;
pub mod config;
pub mod event;
pub mod feed;
pub mod logging;
pub mod playback;
pub mod provider;

/// Library version, used in banners and the HTTP user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
