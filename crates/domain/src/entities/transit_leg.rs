//! Transit leg entity - A single vehicle ride within a transit trip

use serde::{Deserialize, Serialize};

use crate::value_objects::{Coordinate, VehicleKind};

/// A named stop where a leg starts or ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopPoint {
    /// Stop name as reported by the provider
    pub name: String,
    /// Stop position
    pub location: Coordinate,
}

impl StopPoint {
    #[must_use]
    pub fn new(name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// One vehicle ride (bus, subway, train) in travel order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitLeg {
    /// Kind of vehicle serving the line
    pub vehicle_kind: VehicleKind,
    /// Full line name, e.g. "수도권 2호선"
    pub line_name: String,
    /// Short line name, e.g. "2호선"; may be empty
    pub line_short_name: String,
    /// Line color as reported by the provider, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    /// Boarding stop
    pub departure_stop: StopPoint,
    /// Alighting stop
    pub arrival_stop: StopPoint,
    /// Number of stops ridden
    pub stop_count: u32,
    /// Provider-localized departure time, e.g. "오후 3:12"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time_text: Option<String>,
    /// Provider-localized arrival time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time_text: Option<String>,
}

impl TransitLeg {
    /// Short line name when present, otherwise the full name
    #[must_use]
    pub fn display_line_name(&self) -> &str {
        if self.line_short_name.trim().is_empty() {
            &self.line_name
        } else {
            &self.line_short_name
        }
    }

    /// Summary fragment such as "지하철 2호선"
    #[must_use]
    pub fn label(&self, language: &str) -> String {
        let kind = self.vehicle_kind.localized_name(language);
        let line = self.display_line_name();
        if line.is_empty() {
            kind.to_string()
        } else {
            format!("{kind} {line}")
        }
    }
}
