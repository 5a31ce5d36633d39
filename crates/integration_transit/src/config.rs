//! Transit service configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Google Routes transit client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitConfig {
    /// Google Routes API key (required to compute transit routes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for the Routes API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Language for localized names and time texts
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Unit system for distances
    #[serde(default = "default_units")]
    pub units: String,

    /// Transit routing preference ("LESS_WALKING" or "FEWER_TRANSFERS")
    #[serde(default = "default_routing_preference")]
    pub routing_preference: String,

    /// Vehicle types the route may use
    #[serde(default = "default_allowed_modes")]
    pub allowed_modes: Vec<String>,
}

fn default_base_url() -> String {
    "https://routes.googleapis.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_language_code() -> String {
    "ko".to_string()
}

fn default_units() -> String {
    "METRIC".to_string()
}

fn default_routing_preference() -> String {
    "LESS_WALKING".to_string()
}

fn default_allowed_modes() -> Vec<String> {
    ["BUS", "SUBWAY", "TRAIN", "LIGHT_RAIL"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            language_code: default_language_code(),
            units: default_units(),
            routing_preference: default_routing_preference(),
            allowed_modes: default_allowed_modes(),
        }
    }
}

impl TransitConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Whether an API key is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.language_code.is_empty() {
            return Err("language_code must not be empty".to_string());
        }

        if self.allowed_modes.is_empty() {
            return Err("allowed_modes must name at least one vehicle type".to_string());
        }

        Ok(())
    }
}

/// Configuration for the HAFAS nearby-stops lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HafasConfig {
    /// Base URL for the transport.rest API
    #[serde(default = "default_hafas_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of stops to request
    #[serde(default = "default_max_results")]
    pub max_results: u8,

    /// Search radius in meters
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,

    /// Cache TTL in minutes (0 to disable caching)
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,
}

fn default_hafas_base_url() -> String {
    "https://v6.db.transport.rest".to_string()
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

impl Default for HafasConfig {
    fn default() -> Self {
        Self {
            base_url: default_hafas_base_url(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            radius_m: default_radius_m(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

impl HafasConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            max_results: 3,
            cache_ttl_minutes: 0,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.max_results == 0 {
            return Err("max_results must be greater than 0".to_string());
        }

        if self.max_results > 20 {
            return Err("max_results must be 20 or less".to_string());
        }

        Ok(())
    }
}

/// Configuration for the Kakao Local nearby-stops lookup
#[derive(Clone, Serialize, Deserialize)]
pub struct KakaoLocalConfig {
    /// Kakao REST API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for the Local API
    #[serde(default = "default_kakao_local_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Category group codes searched first (`SW8` is subway stations)
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Keyword searched when no category place is in range
    #[serde(default = "default_bus_stop_keyword")]
    pub bus_stop_keyword: Option<String>,

    /// Search radius in meters
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,

    /// Results per search (the API allows 1 to 15)
    #[serde(default = "default_max_results")]
    pub max_results: u8,

    /// Cache TTL in minutes (0 to disable caching)
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,
}

impl std::fmt::Debug for KakaoLocalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KakaoLocalConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("categories", &self.categories)
            .field("bus_stop_keyword", &self.bus_stop_keyword)
            .field("radius_m", &self.radius_m)
            .field("max_results", &self.max_results)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .finish()
    }
}

fn default_kakao_local_base_url() -> String {
    "https://dapi.kakao.com".to_string()
}

fn default_categories() -> Vec<String> {
    vec!["SW8".to_string()]
}

#[allow(clippy::unnecessary_wraps)]
fn default_bus_stop_keyword() -> Option<String> {
    Some("버스정류장".to_string())
}

impl Default for KakaoLocalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_kakao_local_base_url(),
            timeout_secs: default_timeout_secs(),
            categories: default_categories(),
            bus_stop_keyword: default_bus_stop_keyword(),
            radius_m: default_radius_m(),
            max_results: default_max_results(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

impl KakaoLocalConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_key: Some("kakao-key".to_string()),
            timeout_secs: 5,
            max_results: 3,
            cache_ttl_minutes: 0,
            ..Default::default()
        }
    }

    /// Whether an API key is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.categories.is_empty() && self.bus_stop_keyword.is_none() {
            return Err("categories or bus_stop_keyword must be set".to_string());
        }

        if !(1..=15).contains(&self.max_results) {
            return Err("max_results must be between 1 and 15".to_string());
        }

        if self.radius_m > 20_000 {
            return Err("radius_m must be 20000 or less".to_string());
        }

        Ok(())
    }
}
