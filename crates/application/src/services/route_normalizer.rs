//! Route normalizer - Maps provider answers into the canonical `Route`
//!
//! Every provider-specific shape is turned into domain values here and only
//! here. The normalizer is pure; geometry reconstruction that needs another
//! provider call is orchestrated by the transit service.

use domain::{
    Coordinate, DashStyle, PathSegment, Route, SegmentStyle, StopPoint, TransitLeg, TravelMode,
    VehicleKind, polyline,
};

use crate::{
    error::ApplicationError,
    ports::{DrivingDirections, StepMode, TransitDirections, TransitStep, TransitStepDetail},
};

/// Walking speed used when a step has no duration
pub const PEDESTRIAN_SPEED_MPS: f64 = 1.2;

/// Walking geometry with fewer points than this is treated as missing
pub const MIN_WALKING_POINTS: usize = 3;

/// Stroke styles per segment kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStyles {
    /// Walking steps
    pub walking: SegmentStyle,
    /// Transit rides; the line color replaces this color when present
    pub transit: SegmentStyle,
    /// Steps of any other mode within a transit route
    pub other: SegmentStyle,
    /// Driving geometry
    pub driving: SegmentStyle,
    /// Dash pattern marking reconstructed geometry
    pub approximate_dash: DashStyle,
}

impl Default for RouteStyles {
    fn default() -> Self {
        Self {
            walking: SegmentStyle::new("#757575", 3, DashStyle::ShortDot),
            transit: SegmentStyle::new("#4CAF50", 5, DashStyle::Solid),
            other: SegmentStyle::new("#00C851", 4, DashStyle::Solid),
            driving: SegmentStyle::new("#007bff", 6, DashStyle::Solid),
            approximate_dash: DashStyle::Dash,
        }
    }
}

/// Converts provider answers into `Route` values
#[derive(Debug, Clone)]
pub struct RouteNormalizer {
    styles: RouteStyles,
    language: String,
}

impl Default for RouteNormalizer {
    fn default() -> Self {
        Self::new(RouteStyles::default(), "ko")
    }
}

impl RouteNormalizer {
    /// Create a normalizer labelling routes in `language`
    pub fn new(styles: RouteStyles, language: impl Into<String>) -> Self {
        Self {
            styles,
            language: language.into(),
        }
    }

    /// Language used for summary labels
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub const fn styles(&self) -> &RouteStyles {
        &self.styles
    }

    /// Build a driving route from provider directions
    ///
    /// # Errors
    ///
    /// Returns `RouteNotFound` when the provider sent fewer than two vertices.
    pub fn normalize_driving(&self, directions: DrivingDirections) -> Result<Route, ApplicationError> {
        if directions.path.len() < 2 {
            return Err(ApplicationError::RouteNotFound(format!(
                "driving route has {} vertices",
                directions.path.len()
            )));
        }

        let segment = PathSegment::new(
            TravelMode::Driving,
            directions.path,
            self.styles.driving.clone(),
        )?;
        let road_name = directions.road_name.filter(|name| !name.trim().is_empty());

        Ok(Route::driving(
            directions.distance_m / 1000.0,
            minutes_ceil(directions.duration_s),
            segment,
            road_name,
        ))
    }

    /// Decode a step's geometry; a step without a polyline has no points
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Decode` for a malformed polyline.
    pub fn decode_step(&self, step: &TransitStep) -> Result<Vec<Coordinate>, ApplicationError> {
        match step.encoded_polyline.as_deref() {
            Some(encoded) => Ok(polyline::decode(encoded)?),
            None => Ok(Vec::new()),
        }
    }

    /// Whether decoded walking geometry is too sparse to draw as-is
    #[must_use]
    pub fn needs_walking_reconstruction(points: &[Coordinate]) -> bool {
        points.len() < MIN_WALKING_POINTS
    }

    /// Start and end of a step, preferring the provider's explicit locations
    #[must_use]
    pub fn step_endpoints(
        step: &TransitStep,
        points: &[Coordinate],
    ) -> Option<(Coordinate, Coordinate)> {
        let start = step.start.or_else(|| points.first().copied())?;
        let end = step.end.or_else(|| points.last().copied())?;
        Some((start, end))
    }

    /// Walking segment from real geometry
    #[must_use]
    pub fn walking_segment(&self, points: Vec<Coordinate>) -> Option<PathSegment> {
        PathSegment::new(TravelMode::Walking, points, self.styles.walking.clone()).ok()
    }

    /// Straight walking line flagged as approximate
    #[must_use]
    pub fn approximate_walking_segment(&self, from: Coordinate, to: Coordinate) -> PathSegment {
        let style = self
            .styles
            .walking
            .clone()
            .with_dash(self.styles.approximate_dash);
        PathSegment::approximate(TravelMode::Walking, from, to, style)
    }

    /// Vehicle segment colored after its line
    #[must_use]
    pub fn transit_segment(
        &self,
        points: Vec<Coordinate>,
        detail: Option<&TransitStepDetail>,
    ) -> Option<PathSegment> {
        let style = match detail.and_then(|d| d.line_color.as_deref()) {
            Some(color) if !color.is_empty() => self.styles.transit.clone().with_color(color),
            _ => self.styles.transit.clone(),
        };
        PathSegment::new(TravelMode::Transit, points, style).ok()
    }

    /// Segment for a step that is neither walking nor transit
    #[must_use]
    pub fn other_segment(&self, points: Vec<Coordinate>) -> Option<PathSegment> {
        PathSegment::new(TravelMode::Transit, points, self.styles.other.clone()).ok()
    }

    /// Transit leg for a step with vehicle details
    ///
    /// Stop locations come from the details first; a missing one falls back
    /// to the matching step endpoint. `None` only when a stop has neither.
    #[must_use]
    pub fn transit_leg(
        &self,
        step: &TransitStep,
        detail: &TransitStepDetail,
        points: &[Coordinate],
    ) -> Option<TransitLeg> {
        let departure = detail
            .departure_stop_location
            .or(step.start)
            .or_else(|| points.first().copied())?;
        let arrival = detail
            .arrival_stop_location
            .or(step.end)
            .or_else(|| points.last().copied())?;

        Some(TransitLeg {
            vehicle_kind: detail.vehicle_kind,
            line_name: detail.line_name.clone(),
            line_short_name: detail.line_short_name.clone(),
            line_color: detail.line_color.clone(),
            departure_stop: StopPoint::new(detail.departure_stop_name.clone(), departure),
            arrival_stop: StopPoint::new(detail.arrival_stop_name.clone(), arrival),
            stop_count: detail.stop_count,
            departure_time_text: detail.departure_time_text.clone(),
            arrival_time_text: detail.arrival_time_text.clone(),
        })
    }

    /// Total walking time of all walk steps in whole minutes
    ///
    /// Each step is rounded on its own. When walk steps exist but all of
    /// them round to zero the result is one minute.
    #[must_use]
    pub fn walking_minutes(steps: &[TransitStep]) -> u32 {
        let mut walks = steps
            .iter()
            .filter(|step| step.mode == StepMode::Walk)
            .peekable();
        if walks.peek().is_none() {
            return 0;
        }

        let total: u32 = walks
            .map(|step| {
                let seconds = step.duration_s.unwrap_or_else(|| {
                    step.distance_m.unwrap_or(0.0) / PEDESTRIAN_SPEED_MPS
                });
                minutes_round(seconds)
            })
            .sum();
        total.max(1)
    }

    /// Legs joined as "<vehicle> <line>" with arrows
    #[must_use]
    pub fn summary_label(&self, legs: &[TransitLeg]) -> String {
        if legs.is_empty() {
            return VehicleKind::Unknown.localized_name(&self.language).to_string();
        }
        legs.iter()
            .map(|leg| leg.label(&self.language))
            .collect::<Vec<_>>()
            .join(" → ")
    }

    /// Assemble a transit route from its normalized parts
    #[must_use]
    pub fn assemble_transit(
        &self,
        directions: &TransitDirections,
        segments: Vec<PathSegment>,
        legs: Vec<TransitLeg>,
    ) -> Route {
        let summary = self.summary_label(&legs);
        Route::transit(
            directions.distance_m / 1000.0,
            minutes_ceil(directions.duration_s),
            segments,
            legs,
            Self::walking_minutes(&directions.steps),
            summary,
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to >= 0
pub(crate) fn minutes_ceil(seconds: f64) -> u32 {
    (seconds.max(0.0) / 60.0).ceil() as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to >= 0
pub(crate) fn minutes_round(seconds: f64) -> u32 {
    (seconds.max(0.0) / 60.0).round() as u32
}
