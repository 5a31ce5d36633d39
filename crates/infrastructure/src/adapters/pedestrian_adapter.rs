//! Pedestrian adapter - Implements PedestrianRoutePort using OSRM

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::PedestrianRoutePort;
use async_trait::async_trait;
use domain::Coordinate;
use integration_directions::{DirectionsConfig, OsrmClient, WalkingProvider};
use tracing::{debug, instrument};

use super::map_directions_error;

/// Reconstructs walking paths for sparse transit walk steps
pub struct OsrmPedestrianAdapter {
    provider: Arc<dyn WalkingProvider>,
}

impl std::fmt::Debug for OsrmPedestrianAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmPedestrianAdapter")
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

impl OsrmPedestrianAdapter {
    /// Wrap an existing provider
    #[must_use]
    pub fn new(provider: Arc<dyn WalkingProvider>) -> Self {
        Self { provider }
    }

    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &DirectionsConfig) -> Result<Self, ApplicationError> {
        let client = OsrmClient::new(config).map_err(|e| map_directions_error("osrm", e))?;
        Ok(Self::new(Arc::new(client)))
    }
}

#[async_trait]
impl PedestrianRoutePort for OsrmPedestrianAdapter {
    #[instrument(skip(self))]
    async fn walking_path(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<Vec<Coordinate>, ApplicationError> {
        let route = self
            .provider
            .walking_route(from, to)
            .await
            .map_err(|e| map_directions_error(self.provider.provider_name(), e))?;

        debug!(points = route.path.len(), "Walking path reconstructed");
        Ok(route.path)
    }
}
