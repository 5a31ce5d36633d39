//! Provider configurations: Kakao driving, Google Routes transit, stop coverage, OSRM walking.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

// ==============================
// Driving (Kakao Mobility)
// ==============================

/// Driving directions configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DrivingAppConfig {
    /// Kakao REST API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Kakao Mobility API base URL
    #[serde(default = "default_kakao_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for DrivingAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrivingAppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_kakao_base_url() -> String {
    "https://apis-navi.kakaomobility.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for DrivingAppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_kakao_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DrivingAppConfig {
    /// Get the API key as a string reference (for API calls)
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|key| !key.trim().is_empty())
    }
}

// ==============================
// Pedestrian (OSRM)
// ==============================

/// Walking path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedestrianAppConfig {
    /// Reconstruct sparse walking steps via OSRM
    #[serde(default = "super::default_true")]
    pub enabled: bool,

    /// OSRM server base URL
    #[serde(default = "default_osrm_base_url")]
    pub base_url: String,

    /// OSRM routing profile
    #[serde(default = "default_osrm_profile")]
    pub profile: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_osrm_base_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_osrm_profile() -> String {
    "foot".to_string()
}

impl Default for PedestrianAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_osrm_base_url(),
            profile: default_osrm_profile(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Build the `integration_directions` config shared by the Kakao and OSRM clients
#[must_use]
pub fn to_directions_config(
    driving: &DrivingAppConfig,
    pedestrian: &PedestrianAppConfig,
) -> integration_directions::DirectionsConfig {
    integration_directions::DirectionsConfig {
        kakao_api_key: driving.api_key_str().map(str::to_string),
        kakao_base_url: driving.base_url.clone(),
        osrm_base_url: pedestrian.base_url.clone(),
        osrm_profile: pedestrian.profile.clone(),
        timeout_secs: driving.timeout_secs.max(pedestrian.timeout_secs),
    }
}

// ==============================
// Transit (Google Routes)
// ==============================

/// Transit routing configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TransitAppConfig {
    /// Google Routes API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Routes API base URL
    #[serde(default = "default_routes_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Unit system sent with each request
    #[serde(default = "default_units")]
    pub units: String,

    /// Transit routing preference
    #[serde(default = "default_routing_preference")]
    pub routing_preference: String,

    /// Allowed vehicle types
    #[serde(default = "default_allowed_modes")]
    pub allowed_modes: Vec<String>,
}

impl std::fmt::Debug for TransitAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitAppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("units", &self.units)
            .field("routing_preference", &self.routing_preference)
            .field("allowed_modes", &self.allowed_modes)
            .finish()
    }
}

fn default_routes_base_url() -> String {
    "https://routes.googleapis.com".to_string()
}

fn default_units() -> String {
    "METRIC".to_string()
}

fn default_routing_preference() -> String {
    "LESS_WALKING".to_string()
}

fn default_allowed_modes() -> Vec<String> {
    integration_transit::TransitConfig::default().allowed_modes
}

impl Default for TransitAppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_routes_base_url(),
            timeout_secs: default_timeout_secs(),
            units: default_units(),
            routing_preference: default_routing_preference(),
            allowed_modes: default_allowed_modes(),
        }
    }
}

impl TransitAppConfig {
    /// Get the API key as a string reference (for API calls)
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|key| !key.trim().is_empty())
    }

    /// Convert to `integration_transit` config; `language` comes from navigation settings
    #[must_use]
    pub fn to_transit_config(&self, language: &str) -> integration_transit::TransitConfig {
        integration_transit::TransitConfig {
            api_key: self.api_key_str().map(str::to_string),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            language_code: language.to_string(),
            units: self.units.clone(),
            routing_preference: self.routing_preference.clone(),
            allowed_modes: self.allowed_modes.clone(),
        }
    }
}

// ==============================
// Transit coverage (Kakao Local or HAFAS)
// ==============================

/// Nearby-stop lookup used for the coverage check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageProvider {
    /// Kakao Local category and keyword search (Korea)
    #[default]
    KakaoLocal,
    /// transport.rest `locations/nearby` (European HAFAS networks)
    Hafas,
}

/// Secondary transit coverage configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CoverageAppConfig {
    /// Ask the coverage provider before offering an estimated route
    #[serde(default = "super::default_true")]
    pub enabled: bool,

    /// Which nearby-stop lookup to use
    #[serde(default)]
    pub provider: CoverageProvider,

    /// Kakao REST API key; the driving key is used when unset
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Base URL override; each provider has its own default
    #[serde(default)]
    pub base_url: Option<String>,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum stops requested
    #[serde(default = "default_max_results")]
    pub max_results: u8,

    /// Search radius in meters
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,

    /// Cache TTL in minutes (0 disables caching)
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,
}

impl std::fmt::Debug for CoverageAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageAppConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_results", &self.max_results)
            .field("radius_m", &self.radius_m)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .finish()
    }
}

const fn default_max_results() -> u8 {
    5
}

const fn default_radius_m() -> u32 {
    1000
}

const fn default_cache_ttl_minutes() -> u32 {
    5
}

impl Default for CoverageAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: CoverageProvider::default(),
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            radius_m: default_radius_m(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

impl CoverageAppConfig {
    /// Own Kakao key if set, otherwise `fallback_key`
    #[must_use]
    pub fn api_key_str<'a>(&'a self, fallback_key: Option<&'a str>) -> Option<&'a str> {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|key| !key.trim().is_empty())
            .or(fallback_key)
    }

    /// Convert to `integration_transit` Kakao Local config
    #[must_use]
    pub fn to_kakao_local_config(
        &self,
        fallback_key: Option<&str>,
    ) -> integration_transit::KakaoLocalConfig {
        let defaults = integration_transit::KakaoLocalConfig::default();
        integration_transit::KakaoLocalConfig {
            api_key: self.api_key_str(fallback_key).map(str::to_string),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            timeout_secs: self.timeout_secs,
            radius_m: self.radius_m,
            max_results: self.max_results,
            cache_ttl_minutes: self.cache_ttl_minutes,
            ..defaults
        }
    }

    /// Convert to `integration_transit` HAFAS config
    #[must_use]
    pub fn to_hafas_config(&self) -> integration_transit::HafasConfig {
        let defaults = integration_transit::HafasConfig::default();
        integration_transit::HafasConfig {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            timeout_secs: self.timeout_secs,
            max_results: self.max_results,
            radius_m: self.radius_m,
            cache_ttl_minutes: self.cache_ttl_minutes,
        }
    }

    /// Validate the settings of the selected provider
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self, fallback_key: Option<&str>) -> Result<(), String> {
        match self.provider {
            CoverageProvider::KakaoLocal => self.to_kakao_local_config(fallback_key).validate(),
            CoverageProvider::Hafas => self.to_hafas_config().validate(),
        }
    }
}
