//! Navigation engine wiring
//!
//! Builds the adapters from [`AppConfig`] and assembles the route services,
//! the renderer and the live tracker around a caller-provided map surface and
//! location source.

use std::sync::Arc;

use application::{
    ApplicationError, DrawHandle, DrivingRouteService, LiveTracker, NavigationEvent,
    RouteNormalizer, RouteRefresher, RouteRenderer, TrackerState, TransitRouteService,
    ports::{LocationPort, MapSurfacePort, WatchOptions},
};
use domain::{Coordinate, Route, TrackingSession};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::{
    adapters::{
        GoogleTransitAdapter, KakaoDrivingAdapter, OsrmPedestrianAdapter, StopCoverageAdapter,
    },
    config::{AppConfig, CoverageProvider, to_directions_config},
};

/// Driving and transit results for one origin/destination pair
///
/// Each mode succeeds or fails on its own.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub driving: Result<Route, ApplicationError>,
    pub transit: Result<Route, ApplicationError>,
}

/// Route acquisition and live navigation, fully wired
pub struct NavigationEngine {
    driving: Arc<DrivingRouteService>,
    transit: Arc<TransitRouteService>,
    renderer: Arc<RouteRenderer>,
    refresher: Arc<RouteRefresher>,
    tracker: LiveTracker,
    location: Arc<dyn LocationPort>,
    watch_options: WatchOptions,
}

impl std::fmt::Debug for NavigationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationEngine")
            .field("renderer", &self.renderer)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl NavigationEngine {
    /// Build every adapter and service from configuration
    ///
    /// Missing API keys do not fail construction: driving requests then
    /// report `RouteUnavailable` and transit requests go straight to the
    /// fallback chain.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for invalid settings and the adapter error
    /// if an HTTP client cannot be created.
    pub fn from_config(
        config: &AppConfig,
        surface: Arc<dyn MapSurfacePort>,
        location: Arc<dyn LocationPort>,
    ) -> Result<Self, ApplicationError> {
        config.validate().map_err(ApplicationError::Configuration)?;

        let language = config.navigation.language.clone();
        let normalizer = Arc::new(RouteNormalizer::new(
            config.styles.to_route_styles(),
            language.clone(),
        ));

        let directions = to_directions_config(&config.driving, &config.pedestrian);
        let driving_adapter = KakaoDrivingAdapter::from_config(&directions)?;
        let driving = Arc::new(DrivingRouteService::new(
            Arc::new(driving_adapter),
            Arc::clone(&normalizer),
        ));

        let transit_adapter =
            GoogleTransitAdapter::from_config(&config.transit.to_transit_config(&language))?;
        let mut transit = TransitRouteService::new(Arc::clone(&normalizer))
            .with_estimate(config.estimate.into());
        if transit_adapter.is_configured() {
            transit = transit.with_provider(Arc::new(transit_adapter));
        }
        match build_coverage(config)? {
            Some(coverage) => transit = transit.with_coverage(Arc::new(coverage)),
            None => warn!("Transit coverage check disabled, no estimated routes will be offered"),
        }
        if config.pedestrian.enabled {
            transit = transit.with_pedestrian(Arc::new(OsrmPedestrianAdapter::from_config(
                &directions,
            )?));
        }

        let renderer = Arc::new(RouteRenderer::new(surface));
        let refresher = Arc::new(RouteRefresher::new(
            Arc::clone(&driving),
            Arc::clone(&renderer),
        ));
        let watch_options = config.navigation.watch_options();
        let tracker = LiveTracker::new(
            Arc::clone(&location),
            Arc::clone(&refresher),
            Arc::clone(&renderer),
        )
        .with_options(watch_options);

        info!(
            language = %language,
            environment = %config.environment,
            coverage = ?config.coverage.provider,
            pedestrian = config.pedestrian.enabled,
            "Navigation engine ready"
        );

        Ok(Self {
            driving,
            transit: Arc::new(transit),
            renderer,
            refresher,
            tracker,
            location,
            watch_options,
        })
    }

    /// Best driving route
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` or `RouteUnavailable`.
    pub async fn driving_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<Route, ApplicationError> {
        self.driving.route(origin, destination).await
    }

    /// Transit route, estimated when the transit provider cannot answer
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` or `RouteUnavailable`.
    pub async fn transit_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<Route, ApplicationError> {
        self.transit.route(origin, destination).await
    }

    /// Request driving and transit routes concurrently
    #[instrument(skip(self))]
    pub async fn find_routes(&self, origin: &Coordinate, destination: &Coordinate) -> RouteOptions {
        let (driving, transit) = tokio::join!(
            self.driving.route(origin, destination),
            self.transit.route(origin, destination)
        );
        RouteOptions { driving, transit }
    }

    /// Draw `route` as the active overlay
    ///
    /// Refreshes still in flight are discarded so they cannot replace it.
    ///
    /// # Errors
    ///
    /// `MapSurface` if the surface rejects a primitive.
    pub fn show_route(&self, route: &Route) -> Result<DrawHandle, ApplicationError> {
        self.refresher.apply(route)
    }

    /// Fit the view around two points
    pub fn fit_view(&self, origin: &Coordinate, destination: &Coordinate) {
        self.renderer.recenter(origin, destination);
    }

    /// Remove every drawn route
    pub fn clear_routes(&self) {
        self.refresher.clear();
    }

    /// Start live tracking from `origin`
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if either point is out of range.
    pub fn start_tracking(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<(), ApplicationError> {
        self.tracker.start(origin, destination)
    }

    /// Start live tracking from the device's current position
    ///
    /// # Errors
    ///
    /// The location error if no position is available, or
    /// `InvalidCoordinate` for an out-of-range destination.
    pub async fn start_tracking_here(
        &self,
        destination: Coordinate,
    ) -> Result<Coordinate, ApplicationError> {
        let origin = self.location.current_position(self.watch_options).await?;
        self.tracker.start(origin, destination)?;
        Ok(origin)
    }

    /// Stop live tracking; no-op when idle
    pub fn stop_tracking(&self) {
        self.tracker.stop();
    }

    /// Re-fetch the tracked route now; false when idle
    pub fn refresh_now(&self) -> bool {
        self.tracker.refresh_now()
    }

    /// Fit the view around the tracked origin and destination; false when idle
    pub fn recenter(&self) -> bool {
        self.tracker.recenter()
    }

    /// Subscribe to navigation events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.tracker.subscribe()
    }

    /// Tracker lifecycle state
    #[must_use]
    pub fn tracking_state(&self) -> TrackerState {
        self.tracker.state()
    }

    /// Snapshot of the tracking session
    #[must_use]
    pub fn session(&self) -> Option<TrackingSession> {
        self.tracker.session()
    }

    /// Renderer, for marker clicks and overlay visibility
    #[must_use]
    pub fn renderer(&self) -> &Arc<RouteRenderer> {
        &self.renderer
    }
}

/// Coverage adapter for the configured provider; `None` when coverage is off
///
/// Kakao Local without a key is skipped rather than failing construction.
fn build_coverage(config: &AppConfig) -> Result<Option<StopCoverageAdapter>, ApplicationError> {
    if !config.coverage.enabled {
        return Ok(None);
    }

    match config.coverage.provider {
        CoverageProvider::KakaoLocal => {
            let local = config
                .coverage
                .to_kakao_local_config(config.driving.api_key_str());
            if !local.has_api_key() {
                warn!("No Kakao key for the Kakao Local coverage lookup");
                return Ok(None);
            }
            StopCoverageAdapter::kakao_local(&local).map(Some)
        },
        CoverageProvider::Hafas => {
            StopCoverageAdapter::hafas(&config.coverage.to_hafas_config()).map(Some)
        },
    }
}
