//! Map rendering surface port
//!
//! The surface owns provider-side drawables (polylines, markers, popups).
//! Callers hold only the [`PrimitiveId`] handed back on creation and must
//! remove every primitive they add.

use std::fmt;

use domain::value_objects::{Coordinate, SegmentStyle};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Surface-assigned identifier of a drawable primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(pub u64);

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prim-{}", self.0)
    }
}

/// A styled line through ordered points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineSpec {
    /// Points in travel order
    pub points: Vec<Coordinate>,
    /// Stroke style
    pub style: SegmentStyle,
    /// Draw order, higher is on top
    pub z_order: i32,
}

/// What a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Boarding stop of a transit leg
    Departure,
    /// Alighting stop of a transit leg
    Arrival,
}

/// A clickable point marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    /// Marker position
    pub position: Coordinate,
    /// Marker kind
    pub kind: MarkerKind,
    /// Hover title
    pub title: String,
    /// Draw order, higher is on top
    pub z_order: i32,
}

/// Detail popup anchored at a point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupSpec {
    /// Anchor position
    pub position: Coordinate,
    /// Heading line
    pub title: String,
    /// Body lines in display order
    pub lines: Vec<String>,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    /// Minimum latitude and longitude
    pub south_west: Coordinate,
    /// Maximum latitude and longitude
    pub north_east: Coordinate,
}

impl Bounds {
    /// Smallest box containing every point, `None` for no points
    #[must_use]
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_lat, mut min_lng) = (first.lat(), first.lng());
        let (mut max_lat, mut max_lng) = (min_lat, min_lng);

        for point in iter {
            min_lat = min_lat.min(point.lat());
            min_lng = min_lng.min(point.lng());
            max_lat = max_lat.max(point.lat());
            max_lng = max_lng.max(point.lng());
        }

        Some(Self {
            south_west: Coordinate::new_unchecked(min_lat, min_lng),
            north_east: Coordinate::new_unchecked(max_lat, max_lng),
        })
    }

    /// Whether the box contains `point`
    #[must_use]
    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.south_west.lat()..=self.north_east.lat()).contains(&point.lat())
            && (self.south_west.lng()..=self.north_east.lng()).contains(&point.lng())
    }
}

/// Port for the map surface
///
/// Calls are synchronous; the surface is expected to queue work for its
/// own rendering loop.
#[cfg_attr(test, automock)]
pub trait MapSurfacePort: Send + Sync {
    /// Add a polyline, initially visible
    fn add_polyline(&self, polyline: PolylineSpec) -> Result<PrimitiveId, ApplicationError>;

    /// Add a marker, initially visible
    fn add_marker(&self, marker: MarkerSpec) -> Result<PrimitiveId, ApplicationError>;

    /// Open a popup
    fn open_popup(&self, popup: PopupSpec) -> Result<PrimitiveId, ApplicationError>;

    /// Show or hide a primitive; unknown ids are ignored
    fn set_visible(&self, id: PrimitiveId, visible: bool);

    /// Dispose a primitive; unknown ids are ignored
    fn remove(&self, id: PrimitiveId);

    /// Move the viewport so the box is fully visible
    fn fit_bounds(&self, bounds: Bounds);
}
