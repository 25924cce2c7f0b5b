//! Favorites persistence error types.

use std::path::PathBuf;

/// Errors from loading or saving the favorites set.
///
/// A save failure leaves the in-memory set updated; the caller should warn
/// that the change may not survive a restart.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing the backing file failed
    #[error("favorites I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored favorites couldn't be encoded or decoded
    #[error("favorites JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store refused the write
    #[error("favorites store unavailable: {0}")]
    Unavailable(String),
}
