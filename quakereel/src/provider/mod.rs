//! Earthquake feed provider.
//!
//! This module provides the async HTTP client abstraction and the
//! [`FeedProvider`], which resolves a [`FeedSelector`](crate::feed::FeedSelector)
//! to events by consulting the feed cache before the network.
//!
//! ```ignore
//! use quakereel::provider::{AsyncReqwestClient, FeedProvider};
//!
//! let http_client = AsyncReqwestClient::with_timeout(Duration::from_secs(30))?;
//! let provider = FeedProvider::new(http_client, cache);
//! let data = provider.fetch(&selector).await?;
//! ```

mod error;
mod feed;
mod http;

pub use error::FetchError;
pub use feed::{DataSource, FeedData, FeedProvider};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
