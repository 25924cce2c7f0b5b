//! Station identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id {input:?}: {reason}")]
pub struct InvalidStationId {
    input: String,
    reason: &'static str,
}

/// A bike-share station identifier.
///
/// The information feed is authoritative for which ids exist. Ids are
/// non-negative integers; providers publish them either as JSON numbers or
/// as numeric strings, and both forms parse to the same value.
///
/// # Examples
///
/// ```
/// use bikeshare_feed::domain::StationId;
///
/// let id: StationId = "7000".parse().unwrap();
/// assert_eq!(id, StationId::new(7000));
///
/// assert!("7000a".parse::<StationId>().is_err());
/// assert!("".parse::<StationId>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(u64);

impl StationId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for StationId {
    type Err = InvalidStationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| InvalidStationId {
            input: s.to_string(),
            reason,
        };

        if s.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must contain only ASCII digits"));
        }

        s.parse::<u64>()
            .map(StationId)
            .map_err(|_| invalid("out of range"))
    }
}

impl From<u64> for StationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
