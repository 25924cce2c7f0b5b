//! Merged station records.

use chrono::{DateTime, Utc};

use super::{GeoPoint, StationId};

/// Static attributes of a station, from the information feed.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    /// Total number of docks.
    pub capacity: u32,
}

/// Live attributes of a station, from the status feed.
///
/// The default value is what a station shows when the status feed has no
/// entry for it: all counts zero, all flags false, no report time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationStatus {
    pub bikes_available: u32,
    pub disabled_bikes: u32,
    pub docks_available: u32,
    pub disabled_docks: u32,
    pub is_installed: bool,
    pub is_renting: bool,
    pub is_returning: bool,
    /// When the station last reported, if the provider said so.
    pub last_updated: Option<DateTime<Utc>>,
}

/// One station, joined from both feeds and placed relative to a reference
/// location.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub capacity: u32,

    /// Great-circle distance from the reference location, in meters.
    pub distance_meters: f64,

    pub status: StationStatus,

    /// Whether a status entry was joined. When false, `status` holds
    /// defaults rather than reported zeros.
    pub has_status: bool,

    pub is_favorite: bool,
}

impl StationRecord {
    /// Build a record from its info half, an optional status half, and the
    /// derived fields.
    pub fn join(
        id: StationId,
        info: &StationInfo,
        status: Option<&StationStatus>,
        reference: &GeoPoint,
        is_favorite: bool,
    ) -> Self {
        Self {
            id,
            name: info.name.clone(),
            address: info.address.clone(),
            location: info.location,
            capacity: info.capacity,
            distance_meters: info.location.distance_to(reference),
            status: status.copied().unwrap_or_default(),
            has_status: status.is_some(),
            is_favorite,
        }
    }

    /// Case-insensitive substring match on address or name.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.address.to_lowercase().contains(needle) || self.name.to_lowercase().contains(needle)
    }
}
