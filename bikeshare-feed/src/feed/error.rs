//! Feed fetcher error types.

use std::path::PathBuf;

use super::types::FeedKind;

/// Errors that can occur when fetching a feed document.
///
/// Any of these means the current reconciliation cycle produces no result;
/// the last published snapshot stays in place.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("API error {status} fetching {feed}: {message}")]
    Api {
        feed: FeedKind,
        status: u16,
        message: String,
    },

    /// Rate limited by the provider
    #[error("rate limited fetching {0}")]
    RateLimited(FeedKind),

    /// Reading a local payload failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Feed deliberately unavailable (mock fetchers)
    #[error("{feed} unavailable: {message}")]
    Unavailable { feed: FeedKind, message: String },
}
