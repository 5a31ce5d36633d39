//! Adapters implementing application ports
//!
//! Each adapter wraps an integration crate client and converts its models and
//! errors into the application layer's types.

mod coverage_adapter;
mod driving_adapter;
mod error_mapping;
mod pedestrian_adapter;
mod transit_adapter;

pub use coverage_adapter::StopCoverageAdapter;
pub use driving_adapter::KakaoDrivingAdapter;
pub use error_mapping::{map_directions_error, map_transit_error};
pub use pedestrian_adapter::OsrmPedestrianAdapter;
pub use transit_adapter::GoogleTransitAdapter;
