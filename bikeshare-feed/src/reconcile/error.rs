//! Reconciliation error types.

use crate::feed::FeedKind;

/// Errors that abort a reconciliation cycle.
///
/// Malformed individual station entries are not errors; they are skipped
/// and counted on the result.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReconcileError {
    /// The payload is not a `{ data: { stations: [...] } }` document
    #[error("malformed {feed} document: {message}")]
    FeedFormat { feed: FeedKind, message: String },
}
