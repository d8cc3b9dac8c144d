//! Command handlers.

pub mod cache;
pub mod common;
pub mod config;
pub mod feeds;
pub mod fetch;
pub mod play;
