//! Transit route service - Transit routing with a fallback chain
//!
//! The chain is: transit provider → coverage check near the origin →
//! distance-based estimate. The caller always receives a real route, a
//! route flagged as estimated, or `RouteUnavailable`.

use std::{fmt, sync::Arc};

use chrono::Utc;
use domain::{Coordinate, PathSegment, Route, TravelMode, VehicleKind};
use tracing::{debug, info, instrument, warn};

use super::{RouteNormalizer, route_normalizer::minutes_round};
use crate::{
    error::ApplicationError,
    ports::{
        PedestrianRoutePort, StepMode, TransitCoveragePort, TransitDirections, TransitRoutePort,
        TransitStep,
    },
};

/// Heuristics for routes synthesized without a transit provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateConfig {
    /// Minutes of transit travel per straight-line kilometer
    pub minutes_per_km: f64,
    /// Walking minutes per straight-line kilometer
    pub walking_minutes_per_km: f64,
    /// Trips longer than this are assumed to need one transfer
    pub transfer_threshold_km: f64,
    /// Draw a dashed straight line for estimated routes
    pub draw_straight_line: bool,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            minutes_per_km: 2.5,
            walking_minutes_per_km: 0.3,
            transfer_threshold_km: 3.0,
            draw_straight_line: true,
        }
    }
}

/// Requests transit routes and degrades to an estimate when needed
pub struct TransitRouteService {
    provider: Option<Arc<dyn TransitRoutePort>>,
    coverage: Option<Arc<dyn TransitCoveragePort>>,
    pedestrian: Option<Arc<dyn PedestrianRoutePort>>,
    normalizer: Arc<RouteNormalizer>,
    estimate: EstimateConfig,
}

impl fmt::Debug for TransitRouteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitRouteService")
            .field("has_provider", &self.provider.is_some())
            .field("has_coverage", &self.coverage.is_some())
            .field("has_pedestrian", &self.pedestrian.is_some())
            .field("estimate", &self.estimate)
            .finish_non_exhaustive()
    }
}

impl TransitRouteService {
    /// Create a service with no providers attached
    ///
    /// Without a transit provider every request goes straight to the
    /// fallback chain, as if the credential were missing.
    pub fn new(normalizer: Arc<RouteNormalizer>) -> Self {
        Self {
            provider: None,
            coverage: None,
            pedestrian: None,
            normalizer,
            estimate: EstimateConfig::default(),
        }
    }

    /// Attach the transit routing provider
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn TransitRoutePort>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Attach the secondary coverage provider
    #[must_use]
    pub fn with_coverage(mut self, coverage: Arc<dyn TransitCoveragePort>) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Attach the pedestrian provider used to rebuild sparse walking steps
    #[must_use]
    pub fn with_pedestrian(mut self, pedestrian: Arc<dyn PedestrianRoutePort>) -> Self {
        self.pedestrian = Some(pedestrian);
        self
    }

    /// Replace the estimate heuristics
    #[must_use]
    pub const fn with_estimate(mut self, estimate: EstimateConfig) -> Self {
        self.estimate = estimate;
        self
    }

    /// Fetch a transit route, falling back to an estimate
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinate` without any provider call when either
    /// point is out of range, and `RouteUnavailable` when both the transit
    /// provider and the coverage check fail.
    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    pub async fn route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<Route, ApplicationError> {
        origin.validate()?;
        destination.validate()?;

        match self.primary_route(origin, destination).await {
            Ok(route) => {
                debug!(
                    legs = route.legs().len(),
                    duration_min = route.duration_min(),
                    "Transit route ready"
                );
                Ok(route)
            },
            Err(e) if e.triggers_fallback() => {
                warn!(error = %e, "Transit provider failed, trying estimate");
                self.estimated_route(origin, destination).await
            },
            Err(e) => Err(e),
        }
    }

    async fn primary_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<Route, ApplicationError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ApplicationError::CredentialMissing("transit provider".into()))?;

        let directions = provider
            .transit_route(origin, destination, Utc::now())
            .await?;
        if directions.steps.is_empty() {
            return Err(ApplicationError::RouteNotFound(
                "transit route has no steps".into(),
            ));
        }

        self.build_route(&directions).await
    }

    async fn build_route(&self, directions: &TransitDirections) -> Result<Route, ApplicationError> {
        let mut segments = Vec::with_capacity(directions.steps.len());
        let mut legs = Vec::new();

        for step in &directions.steps {
            let points = self.normalizer.decode_step(step)?;

            match step.mode {
                StepMode::Walk => {
                    if let Some(segment) = self.walking_segment(step, points).await {
                        segments.push(segment);
                    }
                },
                StepMode::Transit => {
                    if let Some(detail) = &step.transit {
                        match self.normalizer.transit_leg(step, detail, &points) {
                            Some(leg) => legs.push(leg),
                            None => warn!(line = %detail.line_name, "Transit step has no stop locations"),
                        }
                    }
                    segments.extend(
                        self.normalizer
                            .transit_segment(points, step.transit.as_ref()),
                    );
                },
                StepMode::Other => segments.extend(self.normalizer.other_segment(points)),
            }
        }

        Ok(self.normalizer.assemble_transit(directions, segments, legs))
    }

    /// Walking geometry, rebuilt when the provider's own path is too sparse
    async fn walking_segment(
        &self,
        step: &TransitStep,
        points: Vec<Coordinate>,
    ) -> Option<PathSegment> {
        if !RouteNormalizer::needs_walking_reconstruction(&points) {
            return self.normalizer.walking_segment(points);
        }

        let (start, end) = RouteNormalizer::step_endpoints(step, &points)?;

        if let Some(pedestrian) = &self.pedestrian {
            match pedestrian.walking_path(&start, &end).await {
                Ok(path) => {
                    if let Some(segment) = self.normalizer.walking_segment(path) {
                        return Some(segment);
                    }
                    debug!("Pedestrian path too short, using straight line");
                },
                Err(e) => warn!(error = %e, "Pedestrian provider failed, using straight line"),
            }
        }

        Some(self.normalizer.approximate_walking_segment(start, end))
    }

    /// Route synthesized from straight-line distance once transit near the
    /// origin has been confirmed
    async fn estimated_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<Route, ApplicationError> {
        let coverage = self.coverage.as_ref().ok_or_else(|| {
            ApplicationError::RouteUnavailable("no secondary transit provider configured".into())
        })?;

        let stops = coverage.nearby_stop_count(origin).await.map_err(|e| {
            warn!(error = %e, "Secondary transit provider failed");
            ApplicationError::RouteUnavailable(format!("secondary transit provider: {e}"))
        })?;
        if stops == 0 {
            return Err(ApplicationError::RouteUnavailable(
                "no transit stops near origin".into(),
            ));
        }

        let route = self.estimate(origin, destination);
        info!(
            stops,
            distance_km = route.distance_km(),
            duration_min = route.duration_min(),
            "Using estimated transit route"
        );
        Ok(route)
    }

    /// Distance-based estimate between two points
    #[must_use]
    pub fn estimate(&self, origin: &Coordinate, destination: &Coordinate) -> Route {
        let distance_km = origin.distance_km(destination);
        let duration_min = round_minutes(distance_km * self.estimate.minutes_per_km);
        let walking_minutes =
            round_minutes(distance_km * self.estimate.walking_minutes_per_km).max(1);
        let transfer_count = u32::from(distance_km > self.estimate.transfer_threshold_km);

        let segments = if self.estimate.draw_straight_line {
            let styles = self.normalizer.styles();
            let style = styles.transit.clone().with_dash(styles.approximate_dash);
            vec![PathSegment::approximate(
                TravelMode::Transit,
                *origin,
                *destination,
                style,
            )]
        } else {
            Vec::new()
        };

        Route::estimated(
            distance_km,
            duration_min,
            walking_minutes,
            transfer_count,
            VehicleKind::Unknown.localized_name(self.normalizer.language()),
            segments,
        )
    }
}

fn round_minutes(minutes: f64) -> u32 {
    minutes_round(minutes * 60.0)
}
