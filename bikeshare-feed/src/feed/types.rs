//! GBFS feed DTOs.
//!
//! The document envelope is strict: a payload that doesn't have
//! `data.stations` as an array is not a feed at all. Station entries are
//! kept as raw JSON and decoded one at a time, so that one malformed entry
//! can be skipped without losing the rest of the document.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::domain::{InvalidStationId, StationId};

/// Which of the two feeds a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Information,
    Status,
}

impl FeedKind {
    /// The GBFS file name for this feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Information => "station_information",
            FeedKind::Status => "station_status",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level GBFS document.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument {
    /// When the provider last updated the document (POSIX time).
    #[serde(default)]
    pub last_updated: Option<f64>,

    /// Seconds before the provider expects the document to change.
    #[serde(default)]
    pub ttl: Option<u32>,

    pub data: FeedData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedData {
    /// Station entries, decoded individually later.
    pub stations: Vec<serde_json::Value>,
}

/// A `station_id` as published: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawStationId {
    Number(u64),
    Text(String),
}

impl RawStationId {
    pub fn parse(&self) -> Result<StationId, InvalidStationId> {
        match self {
            RawStationId::Number(n) => Ok(StationId::new(*n)),
            RawStationId::Text(s) => s.parse(),
        }
    }
}

/// One entry of `station_information`.
#[derive(Debug, Clone, Deserialize)]
pub struct InformationEntry {
    pub station_id: RawStationId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// One entry of `station_status`.
///
/// GBFS v1 publishes the flags as 0/1 integers and later versions as
/// booleans; both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEntry {
    pub station_id: RawStationId,
    #[serde(default)]
    pub num_bikes_available: u32,
    #[serde(default)]
    pub num_bikes_disabled: u32,
    #[serde(default)]
    pub num_docks_available: u32,
    #[serde(default)]
    pub num_docks_disabled: u32,
    #[serde(default, deserialize_with = "flag")]
    pub is_installed: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_renting: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_returning: bool,
    #[serde(default)]
    pub last_reported: Option<f64>,
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u8),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(n) => Err(serde::de::Error::custom(format!(
            "expected 0 or 1 for a flag, got {n}"
        ))),
    }
}
