//! Application services - Use case implementations

mod driving_route_service;
mod live_tracker;
mod route_normalizer;
mod route_refresher;
mod route_renderer;
mod transit_route_service;

pub use driving_route_service::DrivingRouteService;
pub use live_tracker::{LiveTracker, NavigationEvent, StopReason, TrackerState};
pub use route_normalizer::{
    MIN_WALKING_POINTS, PEDESTRIAN_SPEED_MPS, RouteNormalizer, RouteStyles,
};
pub use route_refresher::{RefreshOutcome, RouteRefresher, RouteSequencer, RouteTicket};
pub use route_renderer::{DrawHandle, RouteRenderer};
pub use transit_route_service::{EstimateConfig, TransitRouteService};
