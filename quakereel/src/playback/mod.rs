//! Time-compressed playback of an ordered event sequence.
//!
//! The [`PlaybackScheduler`] emits one event per tick to a [`RenderSink`].
//! Tick cadence comes from [`step_interval`], which spreads the remaining
//! events over the wall-clock time their event-time span takes at the
//! current [`CompressionRate`].

mod rate;
mod render;
mod scheduler;
mod timing;

pub use rate::{CompressionRate, MAX_RATE, MIN_RATE};
pub use render::RenderSink;
pub use scheduler::{PlaybackScheduler, PlaybackState, PlaybackStatus, StartOutcome};
pub use timing::{playback_duration, step_interval, MIN_STEP};
