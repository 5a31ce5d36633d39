//! Direction provider traits

use async_trait::async_trait;
use domain::Coordinate;
#[cfg(test)]
use mockall::automock;

use crate::{DirectionsError, DrivingRoute, WalkingRoute};

/// Trait for driving direction providers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DrivingProvider: Send + Sync {
    /// Request the single best driving route
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no route exists.
    async fn driving_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<DrivingRoute, DirectionsError>;

    /// Get the provider name (e.g., "kakao")
    fn provider_name(&self) -> &'static str;
}

/// Trait for walking path providers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalkingProvider: Send + Sync {
    /// Request a walking path
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no path exists.
    async fn walking_route(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<WalkingRoute, DirectionsError>;

    /// Get the provider name (e.g., "osrm")
    fn provider_name(&self) -> &'static str;
}
