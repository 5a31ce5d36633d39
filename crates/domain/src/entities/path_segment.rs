//! Path segment entity - One styled, single-mode stretch of a route

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{
    Coordinate, SegmentStyle, TravelMode, VEHICLE_Z_ORDER, WALKING_Z_ORDER, path_length_km,
};

/// An ordered run of coordinates travelled in a single mode
///
/// Immutable once created. The draw order is derived from the mode so
/// walking segments always sit above vehicle segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    mode: TravelMode,
    points: Vec<Coordinate>,
    style: SegmentStyle,
    z_order: i32,
    approximate: bool,
}

impl PathSegment {
    /// Create a segment from at least two points
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSegment` for fewer than two points.
    pub fn new(
        mode: TravelMode,
        points: Vec<Coordinate>,
        style: SegmentStyle,
    ) -> Result<Self, DomainError> {
        if points.len() < 2 {
            return Err(DomainError::InvalidSegment(format!(
                "{mode} segment needs at least 2 points, got {}",
                points.len()
            )));
        }

        let z_order = match mode {
            TravelMode::Walking => WALKING_Z_ORDER,
            TravelMode::Driving | TravelMode::Transit => VEHICLE_Z_ORDER,
        };

        Ok(Self {
            mode,
            points,
            style,
            z_order,
            approximate: false,
        })
    }

    /// Straight two-point segment standing in for missing geometry
    #[must_use]
    pub fn approximate(
        mode: TravelMode,
        from: Coordinate,
        to: Coordinate,
        style: SegmentStyle,
    ) -> Self {
        let z_order = match mode {
            TravelMode::Walking => WALKING_Z_ORDER,
            TravelMode::Driving | TravelMode::Transit => VEHICLE_Z_ORDER,
        };

        Self {
            mode,
            points: from.straight_line_to(&to),
            style,
            z_order,
            approximate: true,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> TravelMode {
        self.mode
    }

    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    #[must_use]
    pub const fn style(&self) -> &SegmentStyle {
        &self.style
    }

    #[must_use]
    pub const fn z_order(&self) -> i32 {
        self.z_order
    }

    /// Whether the geometry is a reconstruction rather than provider data
    #[must_use]
    pub const fn is_approximate(&self) -> bool {
        self.approximate
    }

    /// Length of the drawn geometry in kilometers
    #[must_use]
    pub fn length_km(&self) -> f64 {
        path_length_km(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::DashStyle;

    fn seoul() -> Coordinate {
        Coordinate::new(37.5665, 126.9780).unwrap()
    }

    fn city_hall() -> Coordinate {
        Coordinate::new(37.5651, 126.9895).unwrap()
    }

    fn solid() -> SegmentStyle {
        SegmentStyle::new("#00C851", 4, DashStyle::Solid)
    }

    #[test]
    fn rejects_single_point() {
        let result = PathSegment::new(TravelMode::Driving, vec![seoul()], solid());
        assert!(matches!(result, Err(DomainError::InvalidSegment(_))));
    }

    #[test]
    fn rejects_empty() {
        assert!(PathSegment::new(TravelMode::Walking, vec![], solid()).is_err());
    }

    #[test]
    fn z_order_follows_mode() {
        let drive =
            PathSegment::new(TravelMode::Driving, vec![seoul(), city_hall()], solid()).unwrap();
        let transit =
            PathSegment::new(TravelMode::Transit, vec![seoul(), city_hall()], solid()).unwrap();
        let walk =
            PathSegment::new(TravelMode::Walking, vec![seoul(), city_hall()], solid()).unwrap();

        assert_eq!(drive.z_order(), VEHICLE_Z_ORDER);
        assert_eq!(transit.z_order(), VEHICLE_Z_ORDER);
        assert_eq!(walk.z_order(), WALKING_Z_ORDER);
        assert!(!walk.is_approximate());
    }

    #[test]
    fn approximate_segment_is_two_points() {
        let style = SegmentStyle::new("#757575", 3, DashStyle::Dash);
        let segment = PathSegment::approximate(TravelMode::Walking, seoul(), city_hall(), style);

        assert!(segment.is_approximate());
        assert_eq!(segment.points(), &[seoul(), city_hall()]);
        assert_eq!(segment.z_order(), WALKING_Z_ORDER);
        assert_eq!(segment.style().dash, DashStyle::Dash);
    }

    #[test]
    fn length_matches_haversine() {
        let segment =
            PathSegment::new(TravelMode::Driving, vec![seoul(), city_hall()], solid()).unwrap();
        let expected = seoul().distance_km(&city_hall());
        assert!((segment.length_km() - expected).abs() < 1e-12);
    }
}
