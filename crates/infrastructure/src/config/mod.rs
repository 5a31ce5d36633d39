//! Application configuration
//!
//! Split into focused sub-modules:
//! - `integrations`: Kakao driving, Google Routes transit, stop coverage, OSRM walking
//! - `navigation`: language, location watch, estimate heuristics, segment styles
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `config.toml`, then `CAREROUTE__`-prefixed environment variables
//! (`CAREROUTE__TRANSIT__API_KEY`, `CAREROUTE__NAVIGATION__LANGUAGE`, ...).

mod integrations;
mod navigation;

use std::{collections::HashMap, fmt, path::Path};

use serde::{Deserialize, Serialize};

pub use integrations::{
    CoverageAppConfig, CoverageProvider, DrivingAppConfig, PedestrianAppConfig, TransitAppConfig,
    to_directions_config,
};
pub use navigation::{EstimateAppConfig, NavigationAppConfig, StrokeConfig, StylesAppConfig};

use crate::telemetry::TelemetryConfig;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "CAREROUTE";

/// Separator between the prefix and nested keys
pub const ENV_SEPARATOR: &str = "__";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - missing credentials only warn
    #[default]
    Development,
    /// Production environment - a driving credential is required
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment
    #[serde(default)]
    pub environment: Environment,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Driving directions (Kakao Mobility)
    #[serde(default)]
    pub driving: DrivingAppConfig,

    /// Transit routing (Google Routes)
    #[serde(default)]
    pub transit: TransitAppConfig,

    /// Transit coverage check (Kakao Local or HAFAS)
    #[serde(default)]
    pub coverage: CoverageAppConfig,

    /// Walking path reconstruction (OSRM)
    #[serde(default)]
    pub pedestrian: PedestrianAppConfig,

    /// Estimated route heuristics
    #[serde(default)]
    pub estimate: EstimateAppConfig,

    /// Segment stroke styles
    #[serde(default)]
    pub styles: StylesAppConfig,

    /// Language and live tracking
    #[serde(default)]
    pub navigation: NavigationAppConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"), None)
    }

    /// Load configuration from `file` (extension optional, may be missing)
    ///
    /// `env` replaces the process environment when given, so callers can
    /// inject variables without touching global state.
    pub fn load_from(
        file: &Path,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Defaults for the fields most often overridden
            .set_default("navigation.language", "ko")?
            .set_default("telemetry.log_filter", "careroute=info")?
            // Load from file if exists
            .add_source(config::File::from(file).required(false))
            // Override with environment variables (e.g., CAREROUTE__DRIVING__API_KEY)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("transit.allowed_modes")
                    .source(env),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate().map_err(config::ConfigError::Message)?;
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.navigation.language.trim().is_empty() {
            return Err("navigation.language must not be empty".to_string());
        }

        if self.environment == Environment::Production && self.driving.api_key_str().is_none() {
            return Err("driving.api_key is required in production".to_string());
        }

        self.transit
            .to_transit_config(&self.navigation.language)
            .validate()
            .map_err(|e| format!("transit: {e}"))?;
        self.coverage
            .validate(self.driving.api_key_str())
            .map_err(|e| format!("coverage: {e}"))?;
        to_directions_config(&self.driving, &self.pedestrian)
            .validate()
            .map_err(|e| format!("directions: {e}"))?;

        let estimate = &self.estimate;
        if estimate.minutes_per_km <= 0.0 || estimate.walking_minutes_per_km < 0.0 {
            return Err("estimate factors must be positive".to_string());
        }

        Ok(())
    }
}
