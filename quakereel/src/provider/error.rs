//! Provider error types.

use thiserror::Error;

/// Errors surfaced by a feed fetch.
///
/// Every variant is recoverable: the caller reports it to the user and keeps
/// whatever data it already had. A failed fetch never writes to the cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Could not reach the server or the transfer broke off.
    #[error("Failed to fetch earthquake data from {url}: {reason}")]
    Network { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response was not a GeoJSON feature collection.
    #[error("Malformed feed response: {0}")]
    Malformed(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Short hint telling the user what to try next.
    pub fn hint(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "check your network connection and try again",
            FetchError::Timeout { .. } => "the feed service is slow; retry or raise network.timeout",
            FetchError::Status { status, .. } if *status >= 500 => {
                "the feed service is having trouble; retry shortly"
            }
            FetchError::Status { .. } => "check network.feed_base_url in the configuration",
            FetchError::Malformed(_) => "the feed service returned unexpected data; retry later",
            FetchError::Client(_) => "check TLS and proxy settings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Timeout {
            url: "http://x/all_day.geojson".to_string(),
            timeout_secs: 30,
        };
        assert_eq!(
            err.to_string(),
            "Request to http://x/all_day.geojson timed out after 30s"
        );

        let err = FetchError::Status {
            url: "http://x".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://x");
    }

    #[test]
    fn test_hint_depends_on_status() {
        let server = FetchError::Status {
            url: String::new(),
            status: 503,
        };
        let client = FetchError::Status {
            url: String::new(),
            status: 404,
        };
        assert_ne!(server.hint(), client.hint());
    }
}
