//! The output of one reconciliation.

use chrono::{DateTime, Utc};

use crate::domain::{StationId, StationRecord};

/// Stations sorted by distance and split into favorites and the rest.
///
/// Both sections are ordered by ascending `distance_meters`, ties by
/// ascending id. Together they hold exactly one record per station in the
/// information feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationResult {
    pub favorites: Vec<StationRecord>,
    pub others: Vec<StationRecord>,

    /// Information entries dropped as malformed or duplicate.
    pub skipped_info_entries: usize,

    /// Status entries dropped as malformed or duplicate.
    pub skipped_status_entries: usize,

    /// Well-formed status entries whose id is not in the information feed.
    /// These are join misses, not malformed input.
    pub unmatched_status_entries: usize,

    /// Document-level `last_updated` of each feed, when published.
    pub info_last_updated: Option<DateTime<Utc>>,
    pub status_last_updated: Option<DateTime<Utc>>,
}

impl ReconciliationResult {
    /// Total number of stations in both sections.
    pub fn len(&self) -> usize {
        self.favorites.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.others.is_empty()
    }

    /// All records, favorites first, each section in distance order.
    pub fn iter(&self) -> impl Iterator<Item = &StationRecord> {
        self.favorites.iter().chain(self.others.iter())
    }

    /// Look up a station by id.
    pub fn station(&self, id: StationId) -> Option<&StationRecord> {
        self.iter().find(|r| r.id == id)
    }

    /// The closest station across both sections.
    pub fn nearest(&self) -> Option<&StationRecord> {
        let fav = self.favorites.first();
        let other = self.others.first();
        match (fav, other) {
            (Some(a), Some(b)) => {
                if (a.distance_meters, a.id) <= (b.distance_meters, b.id) {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (a, b) => a.or(b),
        }
    }

    /// Records whose address or name contains `query`, case-insensitively.
    ///
    /// Order follows `iter()`. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&StationRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.iter().collect();
        }
        self.iter().filter(|r| r.matches_lowercase(&needle)).collect()
    }
}
