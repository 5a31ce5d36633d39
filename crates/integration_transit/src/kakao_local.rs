//! Kakao Local stop coverage
//!
//! Uses the category search of the Kakao Local API
//! (<https://developers.kakao.com/docs/latest/ko/local/dev-guide>) to find
//! subway stations around a point. Bus stops have no category code, so a
//! keyword search runs when no station is in range.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::KakaoLocalConfig;
use crate::coverage::{StopCache, StopCoverageClient};
use crate::error::TransitError;
use crate::models::{LatLng, NearbyStop};

/// Kakao Local coverage client
pub struct KakaoLocalClient {
    client: Client,
    api_key: String,
    config: KakaoLocalConfig,
    cache: StopCache,
}

impl std::fmt::Debug for KakaoLocalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KakaoLocalClient")
            .field("base_url", &self.config.base_url)
            .field("categories", &self.config.categories)
            .field("cached", &self.cache.is_enabled())
            .finish_non_exhaustive()
    }
}

/// One search request against the Local API
enum Search<'a> {
    Category(&'a str),
    Keyword(&'a str),
}

impl KakaoLocalClient {
    /// Create a new Kakao Local client
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &KakaoLocalConfig) -> Result<Self, TransitError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                TransitError::MissingApiKey("Kakao REST API key is required".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("CareRoute/1.0")
            .build()
            .map_err(|e| TransitError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
            cache: StopCache::new(config.cache_ttl_minutes),
        })
    }

    fn parse_search_response(body: &str) -> Result<Vec<NearbyStop>, TransitError> {
        let raw: RawSearchResponse = serde_json::from_str(body)
            .map_err(|e| TransitError::MalformedResponse(e.to_string()))?;

        Ok(raw.documents.into_iter().map(Self::convert_place).collect())
    }

    fn convert_place(raw: RawPlace) -> NearbyStop {
        // Coordinates and distance arrive as decimal strings
        let lng = raw.x.as_deref().and_then(|v| v.parse::<f64>().ok());
        let lat = raw.y.as_deref().and_then(|v| v.parse::<f64>().ok());
        NearbyStop {
            id: raw.id.unwrap_or_default(),
            name: raw.place_name.unwrap_or_default(),
            location: lat.zip(lng).map(|(lat, lng)| LatLng::new(lat, lng)),
            distance_m: raw.distance.as_deref().and_then(|v| v.parse().ok()),
        }
    }

    async fn search(
        &self,
        search: Search<'_>,
        location: LatLng,
    ) -> Result<Vec<NearbyStop>, TransitError> {
        let (endpoint, param) = match search {
            Search::Category(code) => ("category", ("category_group_code", code)),
            Search::Keyword(query) => ("keyword", ("query", query)),
        };
        let url = format!("{}/v2/local/search/{endpoint}.json", self.config.base_url);

        let params = [
            (param.0, param.1.to_string()),
            ("x", location.longitude.to_string()),
            ("y", location.latitude.to_string()),
            ("radius", self.config.radius_m.to_string()),
            ("sort", "distance".to_string()),
            ("size", self.config.max_results.to_string()),
        ];

        debug!(?url, "Searching nearby transit places");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
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

        Self::parse_search_response(&body)
    }

    async fn fetch_nearby(&self, location: LatLng) -> Result<Vec<NearbyStop>, TransitError> {
        let mut stops = Vec::new();
        for code in &self.config.categories {
            stops.extend(self.search(Search::Category(code), location).await?);
        }

        if let Some(keyword) = self
            .config
            .bus_stop_keyword
            .as_deref()
            .filter(|_| stops.is_empty())
        {
            stops = self.search(Search::Keyword(keyword), location).await?;
        }

        stops.sort_by_key(|stop| stop.distance_m.unwrap_or(u32::MAX));
        Ok(stops)
    }
}

#[async_trait]
impl StopCoverageClient for KakaoLocalClient {
    #[instrument(skip(self), fields(at = %location))]
    async fn find_nearby_stops(&self, location: LatLng) -> Result<Vec<NearbyStop>, TransitError> {
        let stops = self
            .cache
            .get_or_fetch(location, || self.fetch_nearby(location))
            .await?;
        debug!(count = stops.len(), "Nearby transit places found");
        Ok(stops)
    }

    fn provider_name(&self) -> &'static str {
        "kakao-local"
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    documents: Vec<RawPlace>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    id: Option<String>,
    place_name: Option<String>,
    x: Option<String>,
    y: Option<String>,
    distance: Option<String>,
}
