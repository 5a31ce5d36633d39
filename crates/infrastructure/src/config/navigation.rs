//! Navigation behavior: language, location watch, fallback estimate, segment styles.

use std::time::Duration;

use application::{EstimateConfig, RouteStyles, WatchOptions};
use domain::{DashStyle, SegmentStyle};
use serde::{Deserialize, Serialize};

// ==============================
// Navigation
// ==============================

/// Language and live-tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationAppConfig {
    /// Language for provider requests and route labels ("ko", "en", ...)
    #[serde(default = "default_language")]
    pub language: String,

    /// Request high-accuracy positions
    #[serde(default = "super::default_true")]
    pub high_accuracy: bool,

    /// Oldest cached fix accepted, in milliseconds
    #[serde(default = "default_maximum_age_ms")]
    pub maximum_age_ms: u64,

    /// Position timeout in milliseconds
    #[serde(default = "default_position_timeout_ms")]
    pub position_timeout_ms: u64,
}

fn default_language() -> String {
    "ko".to_string()
}

const fn default_maximum_age_ms() -> u64 {
    5_000
}

const fn default_position_timeout_ms() -> u64 {
    10_000
}

impl Default for NavigationAppConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            high_accuracy: true,
            maximum_age_ms: default_maximum_age_ms(),
            position_timeout_ms: default_position_timeout_ms(),
        }
    }
}

impl NavigationAppConfig {
    /// Location subscription options
    #[must_use]
    pub const fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            high_accuracy: self.high_accuracy,
            maximum_age: Duration::from_millis(self.maximum_age_ms),
            timeout: Duration::from_millis(self.position_timeout_ms),
        }
    }
}

// ==============================
// Estimated route heuristics
// ==============================

/// Factors for routes synthesized when no transit provider answers
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EstimateAppConfig {
    /// Transit minutes per straight-line kilometer
    #[serde(default = "default_minutes_per_km")]
    pub minutes_per_km: f64,

    /// Walking minutes per straight-line kilometer
    #[serde(default = "default_walking_minutes_per_km")]
    pub walking_minutes_per_km: f64,

    /// Distance above which one transfer is assumed
    #[serde(default = "default_transfer_threshold_km")]
    pub transfer_threshold_km: f64,

    /// Draw a dashed straight line for estimated routes
    #[serde(default = "super::default_true")]
    pub draw_straight_line: bool,
}

const fn default_minutes_per_km() -> f64 {
    2.5
}

const fn default_walking_minutes_per_km() -> f64 {
    0.3
}

const fn default_transfer_threshold_km() -> f64 {
    3.0
}

impl Default for EstimateAppConfig {
    fn default() -> Self {
        Self {
            minutes_per_km: default_minutes_per_km(),
            walking_minutes_per_km: default_walking_minutes_per_km(),
            transfer_threshold_km: default_transfer_threshold_km(),
            draw_straight_line: true,
        }
    }
}

impl From<EstimateAppConfig> for EstimateConfig {
    fn from(config: EstimateAppConfig) -> Self {
        Self {
            minutes_per_km: config.minutes_per_km,
            walking_minutes_per_km: config.walking_minutes_per_km,
            transfer_threshold_km: config.transfer_threshold_km,
            draw_straight_line: config.draw_straight_line,
        }
    }
}

// ==============================
// Segment styles
// ==============================

/// Stroke color and width of one segment kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrokeConfig {
    pub color: String,
    pub width: u8,
}

impl StrokeConfig {
    fn new(color: &str, width: u8) -> Self {
        Self {
            color: color.to_string(),
            width,
        }
    }

    fn to_style(&self, dash: DashStyle) -> SegmentStyle {
        SegmentStyle::new(self.color.clone(), self.width, dash)
    }
}

/// Segment stroke styles
///
/// Dash patterns are fixed: walking is dotted, rides and drives are solid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylesAppConfig {
    #[serde(default = "default_walking")]
    pub walking: StrokeConfig,

    /// Used when the provider reports no line color
    #[serde(default = "default_transit")]
    pub transit: StrokeConfig,

    #[serde(default = "default_other")]
    pub other: StrokeConfig,

    #[serde(default = "default_driving")]
    pub driving: StrokeConfig,
}

fn default_walking() -> StrokeConfig {
    StrokeConfig::new("#757575", 3)
}

fn default_transit() -> StrokeConfig {
    StrokeConfig::new("#4CAF50", 5)
}

fn default_other() -> StrokeConfig {
    StrokeConfig::new("#00C851", 4)
}

fn default_driving() -> StrokeConfig {
    StrokeConfig::new("#007bff", 6)
}

impl Default for StylesAppConfig {
    fn default() -> Self {
        Self {
            walking: default_walking(),
            transit: default_transit(),
            other: default_other(),
            driving: default_driving(),
        }
    }
}

impl StylesAppConfig {
    /// Convert to the renderer style table
    #[must_use]
    pub fn to_route_styles(&self) -> RouteStyles {
        RouteStyles {
            walking: self.walking.to_style(DashStyle::ShortDot),
            transit: self.transit.to_style(DashStyle::Solid),
            other: self.other.to_style(DashStyle::Solid),
            driving: self.driving.to_style(DashStyle::Solid),
            approximate_dash: DashStyle::Dash,
        }
    }
}
