//! Travel modes and transit vehicle kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a path segment is travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    /// Private vehicle on the road network
    Driving,
    /// Public transit vehicle
    Transit,
    /// On foot
    Walking,
}

impl TravelMode {
    /// Whether the segment is travelled in a vehicle
    #[must_use]
    pub const fn is_vehicle(&self) -> bool {
        matches!(self, Self::Driving | Self::Transit)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driving => write!(f, "driving"),
            Self::Transit => write!(f, "transit"),
            Self::Walking => write!(f, "walking"),
        }
    }
}

/// Kind of public transit vehicle serving a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    /// City or intercity bus
    Bus,
    /// Metro / underground
    Subway,
    /// Heavy rail
    Train,
    /// Light rail / tram
    LightRail,
    /// Anything the provider reports that we do not classify
    Unknown,
}

impl VehicleKind {
    /// Map a Google Routes `transitLine.vehicle.type` value to a vehicle kind
    #[must_use]
    pub fn from_provider_type(value: &str) -> Self {
        match value {
            "BUS" | "INTERCITY_BUS" | "TROLLEYBUS" | "SHARE_TAXI" => Self::Bus,
            "SUBWAY" | "METRO_RAIL" => Self::Subway,
            "TRAIN" | "RAIL" | "HEAVY_RAIL" | "COMMUTER_TRAIN" | "HIGH_SPEED_TRAIN"
            | "LONG_DISTANCE_TRAIN" => Self::Train,
            "LIGHT_RAIL" | "TRAM" | "MONORAIL" => Self::LightRail,
            _ => Self::Unknown,
        }
    }

    /// Localized display name used in route summaries
    ///
    /// Korean is the primary market; everything else falls back to English.
    #[must_use]
    pub fn localized_name(&self, language: &str) -> &'static str {
        if language.starts_with("ko") {
            match self {
                Self::Bus => "버스",
                Self::Subway => "지하철",
                Self::Train => "기차",
                Self::LightRail => "경전철",
                Self::Unknown => "대중교통",
            }
        } else {
            match self {
                Self::Bus => "Bus",
                Self::Subway => "Subway",
                Self::Train => "Train",
                Self::LightRail => "Light rail",
                Self::Unknown => "Transit",
            }
        }
    }

    /// Emoji shown next to the line name in stop popups
    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Bus => "🚌",
            Self::Subway => "🚇",
            Self::Train => "🚂",
            Self::LightRail | Self::Unknown => "🚊",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.localized_name("en"))
    }
}
