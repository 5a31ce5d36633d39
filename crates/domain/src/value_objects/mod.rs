//! Value Objects - Immutable, identity-less domain primitives

mod coordinate;
mod segment_style;
mod travel_mode;

pub use coordinate::{Coordinate, EARTH_RADIUS_KM, path_length_km};
pub use segment_style::{
    DashStyle, MARKER_Z_ORDER, SegmentStyle, VEHICLE_Z_ORDER, WALKING_Z_ORDER,
};
pub use travel_mode::{TravelMode, VehicleKind};
