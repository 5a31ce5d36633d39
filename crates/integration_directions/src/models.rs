//! Direction result models

use domain::Coordinate;
use serde::Serialize;

/// Best driving route between two points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrivingRoute {
    /// Distance in meters
    pub distance_m: f64,
    /// Duration in seconds
    pub duration_s: f64,
    /// Road geometry in travel order
    pub path: Vec<Coordinate>,
    /// Name of the first road, when the provider names it
    pub road_name: Option<String>,
}

/// Walking path between two points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkingRoute {
    /// Distance in meters
    pub distance_m: f64,
    /// Duration in seconds
    pub duration_s: f64,
    /// Path geometry in travel order
    pub path: Vec<Coordinate>,
}
