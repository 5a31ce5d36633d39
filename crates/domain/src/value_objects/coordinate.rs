//! Geographic coordinate value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate with latitude and longitude in degrees
///
/// Construction always validates the range, including on deserialization,
/// so a `Coordinate` in hand is safe to send to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    lat: f64,
    /// Longitude in degrees (-180 to 180)
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = DomainError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl Coordinate {
    /// Create a new coordinate with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinate` if latitude is not in [-90, 90],
    /// longitude is not in [-180, 180], or either value is NaN.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(DomainError::InvalidCoordinate { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Create a coordinate without validation (for trusted constants)
    ///
    /// Call [`Coordinate::validate`] before handing such a value to a provider.
    #[must_use]
    pub const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Re-check the range invariant
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinate` when out of range.
    pub fn validate(&self) -> Result<(), DomainError> {
        Self::new(self.lat, self.lng).map(|_| ())
    }

    /// Latitude in degrees
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to another coordinate in kilometers
    ///
    /// Uses the haversine formula with a 6371 km Earth radius.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lng / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        );
        let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Two-point path from this coordinate to `other`
    #[must_use]
    pub fn straight_line_to(&self, other: &Self) -> Vec<Self> {
        vec![*self, *other]
    }
}

/// Total length of a path in kilometers
#[must_use]
pub fn path_length_km(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_km(&pair[1]))
        .sum()
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seoul_city_hall() -> Coordinate {
        Coordinate::new(37.5665, 126.9780).expect("valid")
    }

    #[test]
    fn test_valid_coordinates() {
        let c = seoul_city_hall();
        assert!((c.lat() - 37.5665).abs() < f64::EPSILON);
        assert!((c.lng() - 126.9780).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_coordinates() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(Coordinate::new(90.0001, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_validate_unchecked() {
        assert!(Coordinate::new_unchecked(12.0, 99.0).validate().is_ok());
        assert!(Coordinate::new_unchecked(120.0, 99.0).validate().is_err());
    }

    #[test]
    fn test_distance_same_point() {
        let c = seoul_city_hall();
        assert!(c.distance_km(&c).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_seoul_reference() {
        let a = seoul_city_hall();
        let b = Coordinate::new(37.5651, 126.9895).expect("valid");
        let d = a.distance_km(&b);
        assert!((d - 1.05).abs() < 1.05 * 0.05, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = seoul_city_hall();
        let b = Coordinate::new(35.1796, 129.0756).expect("valid");
        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
        // Seoul to Busan is roughly 325 km
        assert!((a.distance_km(&b) - 325.0).abs() < 10.0);
    }

    #[test]
    fn test_path_length() {
        let a = seoul_city_hall();
        let b = Coordinate::new(37.5651, 126.9895).expect("valid");
        assert!((path_length_km(&[a, b, a]) - 2.0 * a.distance_km(&b)).abs() < 1e-9);
        assert!(path_length_km(&[a]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 37.5, "lng": 127.0}"#);
        assert!(ok.is_ok());
        let bad: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 137.5, "lng": 127.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_display() {
        let display = seoul_city_hall().to_string();
        assert!(display.contains("37.566500"));
        assert!(display.contains("126.978000"));
    }
}
