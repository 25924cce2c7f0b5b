//! Conversion from raw feed documents to per-station attribute maps.
//!
//! Each document is checked for shape first; a document that isn't
//! `{ data: { stations: [...] } }` aborts the cycle. Entries inside a valid
//! document are decoded one by one and a bad entry is skipped and counted.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{
    GeoPoint, InvalidCoordinate, InvalidStationId, StationId, StationInfo, StationStatus,
};
use crate::feed::{FeedDocument, FeedKind, InformationEntry, StatusEntry};

use super::config::ReconcileConfig;
use super::error::ReconcileError;

/// Why a single station entry was skipped.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EntryError {
    /// Missing field or wrong JSON type
    #[error("undecodable entry: {0}")]
    Decode(String),

    #[error(transparent)]
    InvalidId(#[from] InvalidStationId),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// Station id already seen earlier in the same document
    #[error("duplicate station id {0}")]
    Duplicate(StationId),
}

/// Stations from one `station_information` document.
#[derive(Debug, Clone, Default)]
pub struct ParsedInformation {
    pub stations: HashMap<StationId, StationInfo>,
    pub skipped: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Stations from one `station_status` document.
#[derive(Debug, Clone, Default)]
pub struct ParsedStatus {
    pub stations: HashMap<StationId, StationStatus>,
    pub skipped: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Parse a `station_information` payload.
pub fn parse_information(
    payload: &str,
    config: &ReconcileConfig,
) -> Result<ParsedInformation, ReconcileError> {
    let document = parse_document(payload, FeedKind::Information)?;
    let (stations, skipped) = collect_entries(
        FeedKind::Information,
        document.data.stations,
        convert_information_entry,
    );

    Ok(ParsedInformation {
        stations,
        skipped,
        last_updated: document
            .last_updated
            .and_then(|t| config.timestamp_unit.to_instant(t)),
    })
}

/// Parse a `station_status` payload.
pub fn parse_status(
    payload: &str,
    config: &ReconcileConfig,
) -> Result<ParsedStatus, ReconcileError> {
    let document = parse_document(payload, FeedKind::Status)?;
    let (stations, skipped) = collect_entries(FeedKind::Status, document.data.stations, |raw| {
        convert_status_entry(raw, config)
    });

    Ok(ParsedStatus {
        stations,
        skipped,
        last_updated: document
            .last_updated
            .and_then(|t| config.timestamp_unit.to_instant(t)),
    })
}

fn parse_document(payload: &str, feed: FeedKind) -> Result<FeedDocument, ReconcileError> {
    serde_json::from_str(payload).map_err(|e| ReconcileError::FeedFormat {
        feed,
        message: e.to_string(),
    })
}

/// Convert every entry, keeping the first occurrence of each id.
///
/// Returns the map and the number of entries skipped.
fn collect_entries<T>(
    feed: FeedKind,
    entries: Vec<serde_json::Value>,
    convert: impl Fn(serde_json::Value) -> Result<(StationId, T), EntryError>,
) -> (HashMap<StationId, T>, usize) {
    let mut stations = HashMap::with_capacity(entries.len());
    let mut skipped = 0;

    for (index, raw) in entries.into_iter().enumerate() {
        let error = match convert(raw) {
            Ok((id, value)) => match stations.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                    continue;
                }
                Entry::Occupied(_) => EntryError::Duplicate(id),
            },
            Err(e) => e,
        };

        debug!(%feed, index, error = %error, "skipping station entry");
        skipped += 1;
    }

    (stations, skipped)
}

/// Convert one `station_information` entry.
pub fn convert_information_entry(
    raw: serde_json::Value,
) -> Result<(StationId, StationInfo), EntryError> {
    let entry: InformationEntry =
        serde_json::from_value(raw).map_err(|e| EntryError::Decode(e.to_string()))?;

    let id = entry.station_id.parse()?;
    let location = GeoPoint::new(entry.lat, entry.lon)?;

    Ok((
        id,
        StationInfo {
            name: entry.name,
            address: entry.address.unwrap_or_default(),
            location,
            capacity: entry.capacity.unwrap_or(0),
        },
    ))
}

/// Convert one `station_status` entry.
pub fn convert_status_entry(
    raw: serde_json::Value,
    config: &ReconcileConfig,
) -> Result<(StationId, StationStatus), EntryError> {
    let entry: StatusEntry =
        serde_json::from_value(raw).map_err(|e| EntryError::Decode(e.to_string()))?;

    let id = entry.station_id.parse()?;

    Ok((
        id,
        StationStatus {
            bikes_available: entry.num_bikes_available,
            disabled_bikes: entry.num_bikes_disabled,
            docks_available: entry.num_docks_available,
            disabled_docks: entry.num_docks_disabled,
            is_installed: entry.is_installed,
            is_renting: entry.is_renting,
            is_returning: entry.is_returning,
            last_updated: entry
                .last_reported
                .and_then(|t| config.timestamp_unit.to_instant(t)),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::TimestampUnit;
    use serde_json::json;

    fn info_payload(stations: serde_json::Value) -> String {
        json!({"last_updated": 1_700_000_000, "ttl": 10, "data": {"stations": stations}})
            .to_string()
    }

    #[test]
    fn parses_information() {
        let payload = info_payload(json!([
            {"station_id": 1, "name": "A", "lat": 43.66, "lon": -79.40, "address": "1 A St", "capacity": 10},
            {"station_id": "2", "name": "B", "lat": 43.70, "lon": -79.30}
        ]));

        let parsed = parse_information(&payload, &ReconcileConfig::default()).unwrap();

        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.stations.len(), 2);
        let a = &parsed.stations[&StationId::new(1)];
        assert_eq!(a.address, "1 A St");
        assert_eq!(a.capacity, 10);
        let b = &parsed.stations[&StationId::new(2)];
        assert_eq!(b.address, "");
        assert_eq!(b.capacity, 0);
        assert_eq!(
            parsed.last_updated,
            DateTime::from_timestamp(1_700_000_000, 0)
        );
    }

    #[test]
    fn skips_malformed_information_entries() {
        let payload = info_payload(json!([
            {"station_id": 1, "name": "missing lat", "lon": -79.40},
            {"name": "missing id", "lat": 43.66, "lon": -79.40},
            {"station_id": 3, "name": "string lat", "lat": "43.66", "lon": -79.40},
            {"station_id": 4, "name": "out of range", "lat": 143.66, "lon": -79.40},
            {"station_id": "x5", "name": "bad id", "lat": 43.66, "lon": -79.40},
            {"station_id": 6, "lat": 43.66, "lon": -79.40},
            "not an object",
            {"station_id": 7, "name": "ok", "lat": 43.66, "lon": -79.40}
        ]));

        let parsed = parse_information(&payload, &ReconcileConfig::default()).unwrap();

        assert_eq!(parsed.skipped, 7);
        assert_eq!(parsed.stations.len(), 1);
        assert!(parsed.stations.contains_key(&StationId::new(7)));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let payload = info_payload(json!([
            {"station_id": 1, "name": "first", "lat": 43.66, "lon": -79.40},
            {"station_id": "1", "name": "second", "lat": 43.70, "lon": -79.30}
        ]));

        let parsed = parse_information(&payload, &ReconcileConfig::default()).unwrap();

        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.stations[&StationId::new(1)].name, "first");
    }

    #[test]
    fn rejects_wrong_document_shape() {
        let config = ReconcileConfig::default();

        for payload in [
            "",
            "not json",
            "[]",
            r#"{"stations": []}"#,
            r#"{"data": {}}"#,
            r#"{"data": {"stations": null}}"#,
            r#"{"data": {"stations": {"1": {}}}}"#,
        ] {
            let err = parse_information(payload, &config).unwrap_err();
            assert!(
                matches!(
                    err,
                    ReconcileError::FeedFormat {
                        feed: FeedKind::Information,
                        ..
                    }
                ),
                "payload {payload:?} should be rejected"
            );
        }

        assert!(matches!(
            parse_status("{}", &config),
            Err(ReconcileError::FeedFormat {
                feed: FeedKind::Status,
                ..
            })
        ));
    }

    #[test]
    fn empty_station_list_is_valid() {
        let parsed = parse_information(&info_payload(json!([])), &ReconcileConfig::default())
            .unwrap();
        assert!(parsed.stations.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn parses_status() {
        let payload = json!({"data": {"stations": [
            {
                "station_id": "7000",
                "num_bikes_available": 12,
                "num_bikes_disabled": 1,
                "num_docks_available": 22,
                "num_docks_disabled": 2,
                "is_installed": 1,
                "is_renting": 1,
                "is_returning": 0,
                "last_reported": 1_699_999_990
            }
        ]}})
        .to_string();

        let parsed = parse_status(&payload, &ReconcileConfig::default()).unwrap();
        let status = parsed.stations[&StationId::new(7000)];

        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.last_updated, None);
        assert_eq!(status.bikes_available, 12);
        assert_eq!(status.disabled_bikes, 1);
        assert_eq!(status.docks_available, 22);
        assert_eq!(status.disabled_docks, 2);
        assert!(status.is_installed && status.is_renting && !status.is_returning);
        assert_eq!(
            status.last_updated,
            DateTime::from_timestamp(1_699_999_990, 0)
        );
    }

    #[test]
    fn status_timestamp_unit_is_configurable() {
        let payload = json!({"data": {"stations": [
            {"station_id": 1, "last_reported": 1_699_999_990_000_i64}
        ]}})
        .to_string();

        let millis = ReconcileConfig::default().with_timestamp_unit(TimestampUnit::Milliseconds);
        let parsed = parse_status(&payload, &millis).unwrap();
        assert_eq!(
            parsed.stations[&StationId::new(1)].last_updated,
            DateTime::from_timestamp(1_699_999_990, 0)
        );
    }

    #[test]
    fn unrepresentable_timestamp_keeps_entry() {
        let payload = json!({"data": {"stations": [
            {"station_id": 1, "num_bikes_available": 3, "last_reported": 0}
        ]}})
        .to_string();

        let parsed = parse_status(&payload, &ReconcileConfig::default()).unwrap();
        assert_eq!(parsed.skipped, 0);
        let status = parsed.stations[&StationId::new(1)];
        assert_eq!(status.bikes_available, 3);
        assert_eq!(status.last_updated, None);
    }

    #[test]
    fn skips_malformed_status_entries() {
        let payload = json!({"data": {"stations": [
            {"num_bikes_available": 3},
            {"station_id": 2, "num_bikes_available": -1},
            {"station_id": 3, "num_bikes_available": "three"},
            {"station_id": 4, "is_renting": "yes"},
            {"station_id": 5}
        ]}})
        .to_string();

        let parsed = parse_status(&payload, &ReconcileConfig::default()).unwrap();
        assert_eq!(parsed.skipped, 4);
        assert_eq!(parsed.stations.len(), 1);
        assert_eq!(
            parsed.stations[&StationId::new(5)],
            StationStatus::default()
        );
    }
}
