//! Domain-level errors

use thiserror::Error;

use crate::polyline::DecodeError;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Coordinate outside the WGS84 range
    #[error("Invalid coordinate ({lat}, {lng}): latitude must be -90 to 90, longitude -180 to 180")]
    InvalidCoordinate {
        /// Rejected latitude
        lat: f64,
        /// Rejected longitude
        lng: f64,
    },

    /// Malformed encoded polyline
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A path segment needs at least two points
    #[error("Invalid path segment: {0}")]
    InvalidSegment(String),
}
