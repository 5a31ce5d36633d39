//! Public transit routing port
//!
//! Defines the interface for transit route computation and the secondary
//! coverage check used when no transit route can be computed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::value_objects::{Coordinate, VehicleKind};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Travel mode of a single provider step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepMode {
    /// On foot between stops or to/from the trip ends
    Walk,
    /// Riding a transit vehicle
    Transit,
    /// Anything else the provider reports
    Other,
}

impl StepMode {
    /// Parse the provider's `travelMode` string
    #[must_use]
    pub fn from_provider(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "WALK" | "WALKING" => Self::Walk,
            "TRANSIT" => Self::Transit,
            _ => Self::Other,
        }
    }
}

/// Vehicle details of a transit step
#[derive(Debug, Clone, PartialEq)]
pub struct TransitStepDetail {
    /// Kind of vehicle
    pub vehicle_kind: VehicleKind,
    /// Full line name
    pub line_name: String,
    /// Short line name, may be empty
    pub line_short_name: String,
    /// Line color, if reported
    pub line_color: Option<String>,
    /// Boarding stop name
    pub departure_stop_name: String,
    /// Boarding stop position, if reported
    pub departure_stop_location: Option<Coordinate>,
    /// Alighting stop name
    pub arrival_stop_name: String,
    /// Alighting stop position, if reported
    pub arrival_stop_location: Option<Coordinate>,
    /// Number of stops ridden
    pub stop_count: u32,
    /// Localized departure time text
    pub departure_time_text: Option<String>,
    /// Localized arrival time text
    pub arrival_time_text: Option<String>,
}

/// One step of the first leg of a transit route
#[derive(Debug, Clone, PartialEq)]
pub struct TransitStep {
    /// Step travel mode
    pub mode: StepMode,
    /// Encoded polyline of the step geometry
    pub encoded_polyline: Option<String>,
    /// Step start position
    pub start: Option<Coordinate>,
    /// Step end position
    pub end: Option<Coordinate>,
    /// Step duration in seconds, if reported
    pub duration_s: Option<f64>,
    /// Step distance in meters, if reported
    pub distance_m: Option<f64>,
    /// Vehicle details for transit steps
    pub transit: Option<TransitStepDetail>,
}

impl TransitStep {
    /// Step of the given mode with no geometry or details
    #[must_use]
    pub const fn new(mode: StepMode) -> Self {
        Self {
            mode,
            encoded_polyline: None,
            start: None,
            end: None,
            duration_s: None,
            distance_m: None,
            transit: None,
        }
    }
}

/// First leg of the best transit route
#[derive(Debug, Clone, PartialEq)]
pub struct TransitDirections {
    /// Leg distance in meters
    pub distance_m: f64,
    /// Leg duration in seconds
    pub duration_s: f64,
    /// Steps in travel order
    pub steps: Vec<TransitStep>,
}

/// Port for transit route computation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransitRoutePort: Send + Sync {
    /// Compute the best transit route departing at `departure`
    async fn transit_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
        departure: DateTime<Utc>,
    ) -> Result<TransitDirections, ApplicationError>;
}

/// Port confirming that transit service exists around a location
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransitCoveragePort: Send + Sync {
    /// Number of transit stops near `location`
    async fn nearby_stop_count(&self, location: &Coordinate) -> Result<usize, ApplicationError>;
}

/// Port for pedestrian path geometry
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PedestrianRoutePort: Send + Sync {
    /// Walking path between two points, in travel order
    async fn walking_path(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<Vec<Coordinate>, ApplicationError>;
}
