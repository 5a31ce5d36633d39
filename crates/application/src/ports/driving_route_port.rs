//! Driving directions port
//!
//! Defines the interface for vehicle routing. The provider returns road
//! geometry already decoded into coordinates.

use async_trait::async_trait;
use domain::value_objects::Coordinate;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Best driving route as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct DrivingDirections {
    /// Total distance in meters
    pub distance_m: f64,
    /// Total duration in seconds
    pub duration_s: f64,
    /// Road geometry in travel order
    pub path: Vec<Coordinate>,
    /// Name of the first road, if the provider reports one
    pub road_name: Option<String>,
}

/// Port for driving directions
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DrivingRoutePort: Send + Sync {
    /// Request the single best driving route
    async fn driving_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<DrivingDirections, ApplicationError>;
}
