//! The fetcher seam between the network and the reconciler.

use std::future::Future;

use super::error::FetchError;

/// Something that can produce the two raw feed documents.
///
/// Implementations do transport only: they return the document text as
/// received and leave all parsing to the reconciler. Retry and backoff, if
/// any, belong to the implementation.
pub trait FeedFetcher: Send + Sync {
    /// Fetch the raw `station_information` document.
    fn fetch_information(&self) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Fetch the raw `station_status` document.
    fn fetch_status(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}
