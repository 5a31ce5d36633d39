//! Transit data models
//!
//! Typed representations of the first leg of a Google Routes transit route and
//! of the stops returned by the nearby-stop lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A WGS84 position as exchanged with the transit APIs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// First leg of the best transit route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitRoute {
    /// Leg distance in meters
    pub distance_m: f64,
    /// Leg duration in seconds
    pub duration_s: f64,
    /// Steps in travel order
    pub steps: Vec<RouteStep>,
}

/// One step of a transit leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Provider travel mode ("WALK", "TRANSIT", ...)
    pub travel_mode: String,
    /// Encoded polyline of the step geometry
    pub encoded_polyline: Option<String>,
    /// Step start position
    pub start: Option<LatLng>,
    /// Step end position
    pub end: Option<LatLng>,
    /// Step duration in seconds
    pub duration_s: Option<f64>,
    /// Step distance in meters
    pub distance_m: Option<f64>,
    /// Vehicle details when riding transit
    pub transit: Option<TransitDetails>,
}

impl RouteStep {
    /// Whether the provider reported this as a walking step
    #[must_use]
    pub fn is_walking(&self) -> bool {
        self.travel_mode.eq_ignore_ascii_case("WALK")
    }
}

/// A boarding or alighting stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopDetails {
    pub name: String,
    pub location: Option<LatLng>,
}

/// Vehicle details of a transit step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitDetails {
    /// Full line name
    pub line_name: String,
    /// Short line name, may be empty
    pub line_short_name: String,
    /// Line color as `#rrggbb`
    pub line_color: Option<String>,
    /// Provider vehicle type ("BUS", "SUBWAY", ...)
    pub vehicle_type: String,
    pub departure_stop: StopDetails,
    pub arrival_stop: StopDetails,
    /// Localized departure time text
    pub departure_time_text: Option<String>,
    /// Localized arrival time text
    pub arrival_time_text: Option<String>,
    /// Number of stops ridden
    pub stop_count: u32,
}

/// A stop found by the nearby lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyStop {
    /// Provider stop ID
    pub id: String,
    /// Stop name
    pub name: String,
    /// Position, when reported
    pub location: Option<LatLng>,
    /// Distance from the query point in meters
    pub distance_m: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walking_detection() {
        let step = RouteStep {
            travel_mode: "walk".to_string(),
            encoded_polyline: None,
            start: None,
            end: None,
            duration_s: None,
            distance_m: None,
            transit: None,
        };
        assert!(step.is_walking());

        let step = RouteStep {
            travel_mode: "TRANSIT".to_string(),
            ..step
        };
        assert!(!step.is_walking());
    }

    #[test]
    fn test_route_serialization() {
        let route = TransitRoute {
            distance_m: 4200.0,
            duration_s: 1500.0,
            steps: Vec::new(),
        };
        let json = serde_json::to_string(&route).unwrap();
        assert!(json.contains("\"distance_m\":4200.0"));
    }
}
