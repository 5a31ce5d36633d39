//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod driving_route_port;
mod location_port;
mod map_surface_port;
mod transit_route_port;

#[cfg(test)]
pub use driving_route_port::MockDrivingRoutePort;
pub use driving_route_port::{DrivingDirections, DrivingRoutePort};
#[cfg(test)]
pub use location_port::MockLocationPort;
pub use location_port::{
    LocationError, LocationPort, PositionUpdates, PositionWatch, WatchHandle, WatchOptions,
};
#[cfg(test)]
pub use map_surface_port::MockMapSurfacePort;
pub use map_surface_port::{
    Bounds, MapSurfacePort, MarkerKind, MarkerSpec, PolylineSpec, PopupSpec, PrimitiveId,
};
#[cfg(test)]
pub use transit_route_port::{
    MockPedestrianRoutePort, MockTransitCoveragePort, MockTransitRoutePort,
};
pub use transit_route_port::{
    PedestrianRoutePort, StepMode, TransitCoveragePort, TransitDirections, TransitRoutePort,
    TransitStep, TransitStepDetail,
};
