//! Keyed join of the two feeds and the distance/favorite partition.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{GeoPoint, StationId, StationRecord};

use super::config::ReconcileConfig;
use super::error::ReconcileError;
use super::parse::{ParsedInformation, ParsedStatus, parse_information, parse_status};
use super::result::ReconciliationResult;

/// Both feeds of one cycle, parsed and ready to join.
///
/// Holding on to this lets a caller rebuild the station list for a new
/// reference location or favorites set without refetching.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeeds {
    pub information: ParsedInformation,
    pub status: ParsedStatus,
}

impl ParsedFeeds {
    /// Parse both payloads. Fails if either is not a feed document.
    pub fn parse(
        info_payload: &str,
        status_payload: &str,
        config: &ReconcileConfig,
    ) -> Result<Self, ReconcileError> {
        Ok(Self {
            information: parse_information(info_payload, config)?,
            status: parse_status(status_payload, config)?,
        })
    }

    /// Join, measure, flag, sort and partition.
    ///
    /// Every information station yields one record. Status entries are
    /// looked up by id; ids missing from the information feed are ignored.
    pub fn assemble(
        &self,
        reference: GeoPoint,
        favorite_ids: &BTreeSet<StationId>,
    ) -> ReconciliationResult {
        let mut records: Vec<StationRecord> = self
            .information
            .stations
            .iter()
            .map(|(id, info)| {
                StationRecord::join(
                    *id,
                    info,
                    self.status.stations.get(id),
                    &reference,
                    favorite_ids.contains(id),
                )
            })
            .collect();

        records.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then(a.id.cmp(&b.id))
        });

        let (favorites, others): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| r.is_favorite);

        let unmatched_status_entries = self
            .status
            .stations
            .keys()
            .filter(|id| !self.information.stations.contains_key(id))
            .count();

        debug!(
            favorites = favorites.len(),
            others = others.len(),
            skipped_info = self.information.skipped,
            skipped_status = self.status.skipped,
            unmatched_status = unmatched_status_entries,
            "assembled station list"
        );

        ReconciliationResult {
            favorites,
            others,
            skipped_info_entries: self.information.skipped,
            skipped_status_entries: self.status.skipped,
            unmatched_status_entries,
            info_last_updated: self.information.last_updated,
            status_last_updated: self.status.last_updated,
        }
    }
}

/// Turn two raw feed payloads into a sorted, partitioned station list.
///
/// No I/O happens here. Either payload failing the document shape check
/// aborts with `ReconcileError::FeedFormat` and nothing is produced.
pub fn reconcile(
    info_payload: &str,
    status_payload: &str,
    reference: GeoPoint,
    favorite_ids: &BTreeSet<StationId>,
    config: &ReconcileConfig,
) -> Result<ReconciliationResult, ReconcileError> {
    let feeds = ParsedFeeds::parse(info_payload, status_payload, config)?;
    Ok(feeds.assemble(reference, favorite_ids))
}
