//! Driving route service - One-shot vehicle routing

use std::{fmt, sync::Arc};

use domain::{Coordinate, Route};
use tracing::{debug, instrument, warn};

use super::RouteNormalizer;
use crate::{error::ApplicationError, ports::DrivingRoutePort};

/// Requests and normalizes driving routes
///
/// Failures are never retried here; a retry is the caller's decision.
pub struct DrivingRouteService {
    provider: Arc<dyn DrivingRoutePort>,
    normalizer: Arc<RouteNormalizer>,
}

impl fmt::Debug for DrivingRouteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrivingRouteService")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl DrivingRouteService {
    /// Create a new driving route service
    pub fn new(provider: Arc<dyn DrivingRoutePort>, normalizer: Arc<RouteNormalizer>) -> Self {
        Self {
            provider,
            normalizer,
        }
    }

    /// Fetch the best driving route
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinate` without contacting the provider when
    /// either point is out of range, and `RouteUnavailable` for every
    /// provider or normalization failure.
    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    pub async fn route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<Route, ApplicationError> {
        origin.validate()?;
        destination.validate()?;

        let directions = self
            .provider
            .driving_route(origin, destination)
            .await
            .map_err(|e| {
                warn!(error = %e, "Driving provider failed");
                ApplicationError::RouteUnavailable(e.to_string())
            })?;

        let route = self.normalizer.normalize_driving(directions).map_err(|e| {
            warn!(error = %e, "Driving response could not be normalized");
            ApplicationError::RouteUnavailable(e.to_string())
        })?;

        debug!(
            distance_km = route.distance_km(),
            duration_min = route.duration_min(),
            "Driving route ready"
        );
        Ok(route)
    }
}
