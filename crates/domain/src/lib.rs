//! Domain layer for CareRoute
//!
//! Contains the route model, the encoded polyline codec, geodesic math and
//! domain errors. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod polyline;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use polyline::DecodeError;
pub use value_objects::*;
