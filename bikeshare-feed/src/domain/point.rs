//! Geographic coordinates and great-circle distance.

use std::fmt;

use geo::{HaversineDistance, Point};

/// Error returned when a latitude/longitude pair is out of range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({latitude}, {longitude}): {reason}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    reason: &'static str,
}

/// A WGS84 coordinate in degrees.
///
/// Latitude is always within -90..=90 and longitude within -180..=180.
/// Both are finite. This type guarantees validity by construction.
///
/// # Examples
///
/// ```
/// use bikeshare_feed::domain::GeoPoint;
///
/// let union = GeoPoint::new(43.6453, -79.3806).unwrap();
/// assert_eq!(union.latitude(), 43.6453);
///
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// assert!(GeoPoint::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, validating both components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let invalid = |reason| InvalidCoordinate {
            latitude,
            longitude,
            reason,
        };

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid("components must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude must be within -90..=90"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("longitude must be within -180..=180"));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle (haversine) distance to `other`, in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        self.as_point().haversine_distance(&other.as_point())
    }

    // geo points are (x, y) = (lon, lat)
    fn as_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({}, {})", self.latitude, self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Independent haversine on the same mean earth radius geo uses.
    fn reference_haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        const R: f64 = 6_371_008.8;
        let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
        let dphi = (lat2 - lat1).to_radians();
        let dlambda = (lon2 - lon1).to_radians();
        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * R * a.sqrt().asin()
    }

    #[test]
    fn accepts_boundaries() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(GeoPoint::new(90.0001, 0.0).is_err());
        assert!(GeoPoint::new(-90.0001, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 180.0001).is_err());
        assert!(GeoPoint::new(0.0, -180.0001).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn error_display() {
        let err = GeoPoint::new(100.0, 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid coordinate (100, 0): latitude must be within -90..=90"
        );
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(43.6628917, -79.3956564).unwrap();
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn distance_matches_independent_haversine() {
        let reference = GeoPoint::new(43.6628917, -79.3956564).unwrap();
        let station = GeoPoint::new(43.66, -79.40).unwrap();

        let expected = reference_haversine(43.6628917, -79.3956564, 43.66, -79.40);
        assert!((reference.distance_to(&station) - expected).abs() < 1.0);
    }

    #[test]
    fn distance_nyc_to_la() {
        // Roughly 3,936 km
        let nyc = GeoPoint::new(40.7128, -74.0060).unwrap();
        let la = GeoPoint::new(34.0522, -118.2437).unwrap();

        let dist = nyc.distance_to(&la);
        assert!((dist - 3_936_000.0).abs() < 50_000.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(43.70, -79.30).unwrap();
        let b = GeoPoint::new(43.66, -79.40).unwrap();
        assert_relative_eq!(a.distance_to(&b), b.distance_to(&a), epsilon = 1e-6);
    }

    #[test]
    fn debug_and_display() {
        let p = GeoPoint::new(43.5, -79.25).unwrap();
        assert_eq!(format!("{:?}", p), "GeoPoint(43.5, -79.25)");
        assert_eq!(format!("{}", p), "43.5,-79.25");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn valid_point() -> impl Strategy<Value = GeoPoint> {
        (-89.0f64..=89.0, -179.0f64..=179.0).prop_map(|(lat, lon)| GeoPoint::new(lat, lon).unwrap())
    }

    proptest! {
        /// Any in-range pair is accepted and read back unchanged
        #[test]
        fn in_range_always_constructs(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let p = GeoPoint::new(lat, lon).unwrap();
            prop_assert_eq!(p.latitude(), lat);
            prop_assert_eq!(p.longitude(), lon);
        }

        /// Latitudes beyond the poles are always rejected
        #[test]
        fn latitude_beyond_pole_rejected(lat in 90.0001f64..1000.0, lon in -180.0f64..=180.0) {
            prop_assert!(GeoPoint::new(lat, lon).is_err());
            prop_assert!(GeoPoint::new(-lat, lon).is_err());
        }

        /// Distance is non-negative and symmetric
        #[test]
        fn distance_non_negative_and_symmetric(a in valid_point(), b in valid_point()) {
            let ab = a.distance_to(&b);
            let ba = b.distance_to(&a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-6);
        }
    }
}
