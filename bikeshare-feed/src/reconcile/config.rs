//! Reconciliation configuration.

use chrono::{DateTime, Utc};

/// Unit of the POSIX timestamps a provider publishes.
///
/// GBFS specifies seconds, but some providers have shipped milliseconds in
/// `last_reported`. The unit is a property of the provider, so it is
/// configured rather than guessed per value unless `Auto` is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampUnit {
    /// Seconds since the epoch.
    #[default]
    Seconds,
    /// Milliseconds since the epoch.
    Milliseconds,
    /// Values at or above `AUTO_MILLIS_THRESHOLD` are milliseconds,
    /// anything smaller is seconds.
    Auto,
}

/// 10^11 seconds is the year 5138; 10^11 milliseconds is March 1973.
const AUTO_MILLIS_THRESHOLD: f64 = 1e11;

impl TimestampUnit {
    /// Convert a raw feed timestamp to an instant.
    ///
    /// Returns `None` for non-positive or non-finite values and for values
    /// chrono can't represent. Providers use 0 for "never reported".
    pub fn to_instant(self, raw: f64) -> Option<DateTime<Utc>> {
        if !raw.is_finite() || raw <= 0.0 {
            return None;
        }

        let millis = match self {
            TimestampUnit::Seconds => raw * 1000.0,
            TimestampUnit::Milliseconds => raw,
            TimestampUnit::Auto if raw >= AUTO_MILLIS_THRESHOLD => raw,
            TimestampUnit::Auto => raw * 1000.0,
        };

        if !millis.is_finite() || millis > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_millis(millis.round() as i64)
    }
}

/// Configuration for the reconciler.
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    /// How to interpret `last_reported` and `last_updated`.
    pub timestamp_unit: TimestampUnit,
}

impl ReconcileConfig {
    /// Set the timestamp unit.
    pub fn with_timestamp_unit(mut self, unit: TimestampUnit) -> Self {
        self.timestamp_unit = unit;
        self
    }
}
