//! Directions configuration

use serde::{Deserialize, Serialize};

/// Configuration for the driving and walking direction providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionsConfig {
    /// Kakao Mobility REST API key (required for driving directions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kakao_api_key: Option<String>,

    /// Kakao Mobility API base URL
    #[serde(default = "default_kakao_base_url")]
    pub kakao_base_url: String,

    /// OSRM server base URL
    #[serde(default = "default_osrm_base_url")]
    pub osrm_base_url: String,

    /// OSRM routing profile used for walking paths
    #[serde(default = "default_osrm_profile")]
    pub osrm_profile: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_kakao_base_url() -> String {
    "https://apis-navi.kakaomobility.com".to_string()
}

fn default_osrm_base_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_osrm_profile() -> String {
    "foot".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            kakao_api_key: None,
            kakao_base_url: default_kakao_base_url(),
            osrm_base_url: default_osrm_base_url(),
            osrm_profile: default_osrm_profile(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DirectionsConfig {
    /// Create a configuration for testing (dummy key, short timeout)
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            kakao_api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Whether a Kakao API key is configured
    #[must_use]
    pub fn has_kakao_key(&self) -> bool {
        self.kakao_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.kakao_base_url.is_empty() {
            return Err("kakao_base_url must not be empty".to_string());
        }

        if self.osrm_base_url.is_empty() {
            return Err("osrm_base_url must not be empty".to_string());
        }

        if self.osrm_profile.is_empty() || self.osrm_profile.contains('/') {
            return Err("osrm_profile must be a single path segment".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
