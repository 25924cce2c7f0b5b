//! Bike-share station feed reconciliation.
//!
//! Joins a provider's GBFS `station_information` and `station_status`
//! feeds into one distance-sorted station list, split into favorites and
//! everything else, and keeps that list current as feeds, location and
//! favorites change.

pub mod domain;
pub mod favorites;
pub mod feed;
pub mod pipeline;
pub mod reconcile;
