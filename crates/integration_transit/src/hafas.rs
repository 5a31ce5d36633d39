//! HAFAS stop coverage via the transport.rest API
//!
//! Queries `locations/nearby` on a transport.rest instance. The public
//! instances only cover European networks, so this client is an opt-in
//! alternative to the Kakao Local lookup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::HafasConfig;
use crate::coverage::{StopCache, StopCoverageClient};
use crate::error::TransitError;
use crate::models::{LatLng, NearbyStop};

/// HAFAS-based coverage client
pub struct HafasTransitClient {
    client: Client,
    config: HafasConfig,
    cache: StopCache,
}

impl std::fmt::Debug for HafasTransitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HafasTransitClient")
            .field("base_url", &self.config.base_url)
            .field("cached", &self.cache.is_enabled())
            .finish_non_exhaustive()
    }
}

impl HafasTransitClient {
    /// Create a new HAFAS coverage client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &HafasConfig) -> Result<Self, TransitError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("CareRoute/1.0")
            .build()
            .map_err(|e| TransitError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            cache: StopCache::new(config.cache_ttl_minutes),
        })
    }

    fn parse_locations_response(body: &str) -> Result<Vec<NearbyStop>, TransitError> {
        let raw: Vec<RawStop> = serde_json::from_str(body)
            .map_err(|e| TransitError::MalformedResponse(e.to_string()))?;

        Ok(raw.into_iter().map(Self::convert_stop).collect())
    }

    fn convert_stop(raw: RawStop) -> NearbyStop {
        NearbyStop {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            location: raw
                .location
                .map(|loc| LatLng::new(loc.latitude, loc.longitude)),
            distance_m: raw.distance,
        }
    }

    async fn fetch_nearby(&self, location: LatLng) -> Result<Vec<NearbyStop>, TransitError> {
        let url = format!("{}/locations/nearby", self.config.base_url);

        let params = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("results", self.config.max_results.to_string()),
            ("distance", self.config.radius_m.to_string()),
            ("stops", "true".to_string()),
            ("poi", "false".to_string()),
        ];

        debug!(?url, "Searching nearby stops");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| TransitError::from_send(&e, self.config.timeout_secs))?;

        if let Some(err) = TransitError::from_status(response.status()) {
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransitError::MalformedResponse(e.to_string()))?;

        Self::parse_locations_response(&body)
    }
}

#[async_trait]
impl StopCoverageClient for HafasTransitClient {
    #[instrument(skip(self), fields(at = %location))]
    async fn find_nearby_stops(&self, location: LatLng) -> Result<Vec<NearbyStop>, TransitError> {
        self.cache
            .get_or_fetch(location, || self.fetch_nearby(location))
            .await
    }

    fn provider_name(&self) -> &'static str {
        "hafas"
    }
}

#[derive(Debug, Deserialize)]
struct RawStop {
    id: Option<String>,
    name: Option<String>,
    location: Option<RawLocation>,
    distance: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}
