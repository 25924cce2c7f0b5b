//! GBFS station feeds.
//!
//! A bike-share provider publishes two documents that together describe its
//! stations:
//! - `station_information`: what exists and where (name, address,
//!   coordinates, capacity). Authoritative for which stations exist.
//! - `station_status`: live counts and flags per station, refreshed every
//!   few seconds and in no particular order relative to the information feed.
//!
//! This module fetches the raw documents and defines their shapes. Joining
//! them is the reconciler's job.

mod client;
mod error;
mod fetcher;
mod mock;
mod types;

pub use client::{FeedClient, FeedConfig};
pub use error::FetchError;
pub use fetcher::FeedFetcher;
pub use mock::MockFeedFetcher;
pub use types::{FeedData, FeedDocument, FeedKind, InformationEntry, RawStationId, StatusEntry};
