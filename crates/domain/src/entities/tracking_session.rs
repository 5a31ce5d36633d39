//! Tracking session entity - State of one live navigation

use std::sync::Arc;

use super::Route;
use crate::value_objects::Coordinate;

/// Live navigation towards a fixed destination
///
/// The origin moves with the user; the last applied route is shared with
/// the renderer and replaced by reference on every recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSession {
    /// Most recent user position
    pub origin: Coordinate,
    /// Navigation target
    pub destination: Coordinate,
    /// Whether the session still receives position updates
    pub active: bool,
    /// Last route applied for this session
    pub last_route: Option<Arc<Route>>,
}

impl TrackingSession {
    /// Start a new active session
    #[must_use]
    pub const fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            active: true,
            last_route: None,
        }
    }

    /// Move the origin to a new fix
    pub fn update_origin(&mut self, origin: Coordinate) {
        self.origin = origin;
    }

    /// Swap in a newer route
    pub fn replace_route(&mut self, route: Arc<Route>) {
        self.last_route = Some(route);
    }

    /// Mark the session as finished
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Straight-line distance still to cover
    #[must_use]
    pub fn remaining_km(&self) -> f64 {
        self.origin.distance_km(&self.destination)
    }
}
