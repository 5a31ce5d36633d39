//! Route entity - A complete, immutable answer from a routing provider

use serde::Serialize;

use super::{PathSegment, TransitLeg};
use crate::value_objects::Coordinate;

/// Which routing backend produced the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Driving,
    Transit,
}

/// A normalized route
///
/// Routes are never edited after creation. A recomputation produces a new
/// `Route` that replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    kind: RouteKind,
    distance_km: f64,
    duration_min: u32,
    segments: Vec<PathSegment>,
    legs: Vec<TransitLeg>,
    transfer_count: u32,
    walking_minutes: u32,
    summary_label: String,
    is_estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    road_name: Option<String>,
}

/// Transfers implied by a number of rides
#[must_use]
pub fn transfers_for(legs: usize) -> u32 {
    u32::try_from(legs.saturating_sub(1)).unwrap_or(u32::MAX)
}

impl Route {
    /// Driving route with a single road-geometry segment
    #[must_use]
    pub fn driving(
        distance_km: f64,
        duration_min: u32,
        segment: PathSegment,
        road_name: Option<String>,
    ) -> Self {
        let summary_label = road_name.clone().unwrap_or_default();
        Self {
            kind: RouteKind::Driving,
            distance_km,
            duration_min,
            segments: vec![segment],
            legs: Vec::new(),
            transfer_count: 0,
            walking_minutes: 0,
            summary_label,
            is_estimated: false,
            road_name,
        }
    }

    /// Transit route built from provider steps; transfers derive from the legs
    #[must_use]
    pub fn transit(
        distance_km: f64,
        duration_min: u32,
        segments: Vec<PathSegment>,
        legs: Vec<TransitLeg>,
        walking_minutes: u32,
        summary_label: impl Into<String>,
    ) -> Self {
        let transfer_count = transfers_for(legs.len());
        Self {
            kind: RouteKind::Transit,
            distance_km,
            duration_min,
            segments,
            legs,
            transfer_count,
            walking_minutes,
            summary_label: summary_label.into(),
            is_estimated: false,
            road_name: None,
        }
    }

    /// Transit route synthesized from straight-line distance
    ///
    /// Estimated routes have no legs, so the transfer count is the
    /// estimator's guess rather than a count of rides.
    #[must_use]
    pub fn estimated(
        distance_km: f64,
        duration_min: u32,
        walking_minutes: u32,
        transfer_count: u32,
        summary_label: impl Into<String>,
        segments: Vec<PathSegment>,
    ) -> Self {
        Self {
            kind: RouteKind::Transit,
            distance_km,
            duration_min,
            segments,
            legs: Vec::new(),
            transfer_count,
            walking_minutes,
            summary_label: summary_label.into(),
            is_estimated: true,
            road_name: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RouteKind {
        self.kind
    }

    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    #[must_use]
    pub const fn duration_min(&self) -> u32 {
        self.duration_min
    }

    /// Segments in travel order
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Vehicle rides in travel order, empty for driving routes
    #[must_use]
    pub fn legs(&self) -> &[TransitLeg] {
        &self.legs
    }

    #[must_use]
    pub const fn transfer_count(&self) -> u32 {
        self.transfer_count
    }

    #[must_use]
    pub const fn walking_minutes(&self) -> u32 {
        self.walking_minutes
    }

    #[must_use]
    pub fn summary_label(&self) -> &str {
        &self.summary_label
    }

    /// Whether the figures are a heuristic rather than provider data
    #[must_use]
    pub const fn is_estimated(&self) -> bool {
        self.is_estimated
    }

    /// First road name of a driving route
    #[must_use]
    pub fn road_name(&self) -> Option<&str> {
        self.road_name.as_deref()
    }

    /// Every drawn point across all segments
    pub fn points(&self) -> impl Iterator<Item = &Coordinate> {
        self.segments.iter().flat_map(|s| s.points().iter())
    }

    /// Whether the transfer count agrees with the legs
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.is_estimated || self.transfer_count == transfers_for(self.legs.len())
    }
}
