//! Station feed reconciliation.
//!
//! Combines one `station_information` and one `station_status` payload into
//! a single station list:
//! 1. Parse both documents, skipping and counting malformed entries
//! 2. Join status onto information by station id (never by position; the
//!    provider publishes the two feeds in unrelated orders)
//! 3. Measure distance from the reference location
//! 4. Flag favorites
//! 5. Sort by distance, ties by id, and split into favorites and others
//!
//! Pure and synchronous: payloads come in as text, a result comes out.

mod config;
mod error;
mod join;
mod parse;
mod result;

pub use config::{ReconcileConfig, TimestampUnit};
pub use error::ReconcileError;
pub use join::{ParsedFeeds, reconcile};
pub use parse::{
    EntryError, ParsedInformation, ParsedStatus, convert_information_entry, convert_status_entry,
    parse_information, parse_status,
};
pub use result::ReconciliationResult;
