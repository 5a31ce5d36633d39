//! Driving adapter - Implements DrivingRoutePort using integration_directions

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{DrivingDirections, DrivingRoutePort};
use async_trait::async_trait;
use domain::Coordinate;
use integration_directions::{DirectionsConfig, DrivingProvider, KakaoDirectionsClient};
use tracing::{debug, instrument, warn};

use super::map_directions_error;

const PROVIDER: &str = "kakao";

/// Adapter for vehicle routing via Kakao Mobility
///
/// Without a configured key every request fails with `CredentialMissing`,
/// which the driving service reports as an unavailable route.
pub struct KakaoDrivingAdapter {
    provider: Option<Arc<dyn DrivingProvider>>,
}

impl std::fmt::Debug for KakaoDrivingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KakaoDrivingAdapter")
            .field(
                "provider",
                &self.provider.as_ref().map(|p| p.provider_name()),
            )
            .finish()
    }
}

impl KakaoDrivingAdapter {
    /// Wrap an existing provider
    #[must_use]
    pub fn new(provider: Arc<dyn DrivingProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Adapter without credentials
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { provider: None }
    }

    /// Build from configuration; a missing key yields an unconfigured adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &DirectionsConfig) -> Result<Self, ApplicationError> {
        if !config.has_kakao_key() {
            warn!("Kakao API key not configured, driving routes unavailable");
            return Ok(Self::unconfigured());
        }

        let client =
            KakaoDirectionsClient::new(config).map_err(|e| map_directions_error(PROVIDER, e))?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Whether a provider is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.provider.is_some()
    }
}

#[async_trait]
impl DrivingRoutePort for KakaoDrivingAdapter {
    #[instrument(skip(self))]
    async fn driving_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<DrivingDirections, ApplicationError> {
        let Some(provider) = &self.provider else {
            return Err(ApplicationError::CredentialMissing(PROVIDER.to_string()));
        };

        let route = provider
            .driving_route(origin, destination)
            .await
            .map_err(|e| map_directions_error(provider.provider_name(), e))?;

        debug!(
            points = route.path.len(),
            distance_m = route.distance_m,
            "Driving route received"
        );

        Ok(DrivingDirections {
            distance_m: route.distance_m,
            duration_s: route.duration_s,
            path: route.path,
            road_name: route.road_name,
        })
    }
}
