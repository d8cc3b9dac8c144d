//! Session wiring and lifecycle.
//!
//! [`FeedSession`] is the main entry point for front ends. It owns a
//! [`FeedProvider`](crate::provider::FeedProvider) and a
//! [`PlaybackScheduler`](crate::playback::PlaybackScheduler) and moves data
//! between them:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         FeedSession                          │
//! │                                                              │
//! │  load/refresh ──► FeedProvider ──► order ──► summarize       │
//! │                     │                          │             │
//! │                     ▼                          ▼             │
//! │                 FeedCache              PlaybackScheduler     │
//! │                                         └── RenderSink       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use quakereel::app::{AppConfig, FeedSession, LoadOutcome};
//!
//! let config = AppConfig::from_config_file(&ConfigFile::load()?);
//! let session = FeedSession::from_config(&config, sink)?;
//!
//! if let LoadOutcome::Loaded(report) = session.load("2.5_week".parse()?).await? {
//!     println!("{}", report.summary);
//!     session.start();
//! }
//! ```

mod config;
mod error;
mod session;

pub use config::AppConfig;
pub use error::AppError;
pub use session::{FeedSession, LoadOutcome, LoadReport};
