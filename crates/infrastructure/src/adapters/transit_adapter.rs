//! Transit adapter - Implements TransitRoutePort using the Google Routes client

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{
    StepMode, TransitDirections, TransitRoutePort, TransitStep, TransitStepDetail,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Coordinate, VehicleKind};
use integration_transit::{
    GoogleRoutesClient, LatLng, RouteStep, TransitConfig, TransitDetails, TransitRoute,
    TransitRouteClient,
};
use tracing::{debug, instrument, warn};

use super::map_transit_error;

const PROVIDER: &str = "google_routes";

/// Adapter for transit routing via the Google Routes API
pub struct GoogleTransitAdapter {
    client: Option<Arc<dyn TransitRouteClient>>,
}

impl std::fmt::Debug for GoogleTransitAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTransitAdapter")
            .field("configured", &self.client.is_some())
            .finish()
    }
}

impl GoogleTransitAdapter {
    /// Wrap an existing client
    #[must_use]
    pub fn new(client: Arc<dyn TransitRouteClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Adapter without credentials; every request triggers the fallback chain
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { client: None }
    }

    /// Build from configuration; a missing key yields an unconfigured adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &TransitConfig) -> Result<Self, ApplicationError> {
        if !config.has_api_key() {
            warn!("Google Routes API key not configured, transit will use the fallback chain");
            return Ok(Self::unconfigured());
        }

        let client = GoogleRoutesClient::new(config).map_err(|e| map_transit_error(PROVIDER, e))?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Whether a client is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn convert_route(route: TransitRoute) -> TransitDirections {
        TransitDirections {
            distance_m: route.distance_m,
            duration_s: route.duration_s,
            steps: route.steps.into_iter().map(Self::convert_step).collect(),
        }
    }

    fn convert_step(step: RouteStep) -> TransitStep {
        let mode = StepMode::from_provider(&step.travel_mode);
        TransitStep {
            mode,
            encoded_polyline: step.encoded_polyline.filter(|p| !p.is_empty()),
            start: step.start.and_then(to_coordinate),
            end: step.end.and_then(to_coordinate),
            duration_s: step.duration_s,
            distance_m: step.distance_m,
            transit: step.transit.map(Self::convert_detail),
        }
    }

    fn convert_detail(detail: TransitDetails) -> TransitStepDetail {
        TransitStepDetail {
            vehicle_kind: VehicleKind::from_provider_type(&detail.vehicle_type),
            line_name: detail.line_name,
            line_short_name: detail.line_short_name,
            line_color: detail.line_color,
            departure_stop_name: detail.departure_stop.name,
            departure_stop_location: detail.departure_stop.location.and_then(to_coordinate),
            arrival_stop_name: detail.arrival_stop.name,
            arrival_stop_location: detail.arrival_stop.location.and_then(to_coordinate),
            stop_count: detail.stop_count,
            departure_time_text: detail.departure_time_text,
            arrival_time_text: detail.arrival_time_text,
        }
    }
}

const fn to_lat_lng(coordinate: &Coordinate) -> LatLng {
    LatLng::new(coordinate.lat(), coordinate.lng())
}

/// Out-of-range provider points are dropped rather than failing the route
fn to_coordinate(point: LatLng) -> Option<Coordinate> {
    Coordinate::new(point.latitude, point.longitude)
        .inspect_err(|e| warn!(error = %e, "Discarding invalid provider coordinate"))
        .ok()
}

#[async_trait]
impl TransitRoutePort for GoogleTransitAdapter {
    #[instrument(skip(self))]
    async fn transit_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
        departure: DateTime<Utc>,
    ) -> Result<TransitDirections, ApplicationError> {
        let Some(client) = &self.client else {
            return Err(ApplicationError::CredentialMissing(PROVIDER.to_string()));
        };

        let route = client
            .compute_transit_route(to_lat_lng(origin), to_lat_lng(destination), Some(departure))
            .await
            .map_err(|e| map_transit_error(PROVIDER, e))?;

        debug!(steps = route.steps.len(), "Transit route received");
        Ok(Self::convert_route(route))
    }
}
