//! Domain types for the bike-share station feed.
//!
//! Coordinates and identifiers enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod point;
mod record;
mod station;

pub use point::{GeoPoint, InvalidCoordinate};
pub use record::{StationInfo, StationRecord, StationStatus};
pub use station::{InvalidStationId, StationId};
