//! Domain entities - Routes and the pieces they are built from

mod path_segment;
mod route;
mod tracking_session;
mod transit_leg;

pub use path_segment::PathSegment;
pub use route::{Route, RouteKind, transfers_for};
pub use tracking_session::TrackingSession;
pub use transit_leg::{StopPoint, TransitLeg};
