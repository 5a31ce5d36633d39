//! Application-level errors

use domain::{DecodeError, DomainError};
use thiserror::Error;

use crate::ports::LocationError;

/// Errors that can occur in the application layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplicationError {
    /// Coordinate failed local validation; never sent to a provider
    #[error("Invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate {
        /// Rejected latitude
        lat: f64,
        /// Rejected longitude
        lng: f64,
    },

    /// Provider credential is not configured
    #[error("Credential missing for {0}")]
    CredentialMissing(String),

    /// Network failure, non-2xx response or malformed body
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered with a well-formed but empty result
    #[error("No route found: {0}")]
    RouteNotFound(String),

    /// Every step of the acquisition chain failed
    #[error("Route unavailable: {0}")]
    RouteUnavailable(String),

    /// User denied access to the device location
    #[error("Location permission denied")]
    LocationPermissionDenied,

    /// Device location did not answer in time
    #[error("Location request timed out")]
    LocationTimeout,

    /// Device location could not determine a position
    #[error("Location unavailable")]
    LocationUnavailable,

    /// Malformed encoded polyline in a provider response
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Map surface rejected a drawable
    #[error("Map surface error: {0}")]
    MapSurface(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the transit chain should move on to its next step
    #[must_use]
    pub const fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Self::CredentialMissing(_)
                | Self::ProviderUnavailable(_)
                | Self::RouteNotFound(_)
                | Self::RouteUnavailable(_)
                | Self::Decode(_)
        )
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidCoordinate { lat, lng } => Self::InvalidCoordinate { lat, lng },
            DomainError::Decode(decode) => Self::Decode(decode),
            DomainError::InvalidSegment(msg) => Self::Internal(msg),
        }
    }
}

impl From<LocationError> for ApplicationError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => Self::LocationPermissionDenied,
            LocationError::PositionUnavailable => Self::LocationUnavailable,
            LocationError::Timeout => Self::LocationTimeout,
        }
    }
}
