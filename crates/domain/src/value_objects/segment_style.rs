//! Stroke styling and draw order for path segments

use serde::{Deserialize, Serialize};

/// Draw order of vehicle (driving / transit) segments
pub const VEHICLE_Z_ORDER: i32 = 1;

/// Draw order of walking segments, above vehicle lines
pub const WALKING_Z_ORDER: i32 = 2;

/// Draw order of stop markers, above every line
pub const MARKER_Z_ORDER: i32 = 3;

/// Stroke dash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashStyle {
    /// Continuous line
    #[default]
    Solid,
    /// Short dots, used for walking
    ShortDot,
    /// Long dashes, used for approximate geometry
    Dash,
}

/// Visual style of a path segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentStyle {
    /// CSS-style color, e.g. `#757575`
    pub color: String,
    /// Stroke width in pixels
    pub width: u8,
    /// Dash pattern
    pub dash: DashStyle,
}

impl SegmentStyle {
    /// Create a style
    #[must_use]
    pub fn new(color: impl Into<String>, width: u8, dash: DashStyle) -> Self {
        Self {
            color: color.into(),
            width,
            dash,
        }
    }

    /// Same style with a different color
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Same style with a different dash pattern
    #[must_use]
    pub const fn with_dash(mut self, dash: DashStyle) -> Self {
        self.dash = dash;
        self
    }
}
