//! Kakao Mobility directions client
//!
//! Client for the car directions API
//! (<https://developers.kakaomobility.com/docs/navi-api/directions/>).

use std::time::Duration;

use async_trait::async_trait;
use domain::Coordinate;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::{
    config::DirectionsConfig, error::DirectionsError, models::DrivingRoute,
    provider::DrivingProvider,
};

/// Kakao directions response structures
mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct DirectionsResponse {
        #[serde(default)]
        pub routes: Vec<Route>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Route {
        pub result_code: i32,
        pub result_msg: Option<String>,
        #[serde(default)]
        pub sections: Vec<Section>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Section {
        pub distance: f64,
        pub duration: f64,
        #[serde(default)]
        pub roads: Vec<Road>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Road {
        pub name: Option<String>,
        /// Flat `[lng, lat, lng, lat, ...]` list
        #[serde(default)]
        pub vertexes: Vec<f64>,
    }
}

/// Kakao Mobility car directions client
#[derive(Debug)]
pub struct KakaoDirectionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout_secs: u64,
}

impl KakaoDirectionsClient {
    /// Create a new Kakao directions client
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client cannot be created.
    pub fn new(config: &DirectionsConfig) -> Result<Self, DirectionsError> {
        let api_key = config
            .kakao_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DirectionsError::MissingApiKey("Kakao REST API key is required".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("CareRoute/1.0")
            .build()
            .map_err(|e| DirectionsError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.kakao_base_url.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Kakao takes `lng,lat` pairs
    fn format_point(point: &Coordinate) -> String {
        format!("{},{}", point.lng(), point.lat())
    }

    /// Convert the first section of the first route into a driving route
    fn convert_response(
        response: api::DirectionsResponse,
    ) -> Result<DrivingRoute, DirectionsError> {
        let Some(route) = response.routes.into_iter().next() else {
            return Err(DirectionsError::NoRoute("empty route list".to_string()));
        };

        if route.result_code != 0 {
            return Err(DirectionsError::NoRoute(format!(
                "result_code {}: {}",
                route.result_code,
                route.result_msg.unwrap_or_default()
            )));
        }

        let Some(section) = route.sections.into_iter().next() else {
            return Err(DirectionsError::NoRoute("route has no sections".to_string()));
        };

        let road_name = section
            .roads
            .first()
            .and_then(|road| road.name.clone())
            .filter(|name| !name.trim().is_empty());

        let mut path: Vec<Coordinate> = Vec::new();
        for road in &section.roads {
            let vertexes = Self::decode_vertexes(&road.vertexes)?;
            // Consecutive roads share their boundary vertex
            let skip = usize::from(path.last().is_some() && path.last() == vertexes.first());
            path.extend(vertexes.into_iter().skip(skip));
        }

        Ok(DrivingRoute {
            distance_m: section.distance,
            duration_s: section.duration,
            path,
            road_name,
        })
    }

    fn decode_vertexes(vertexes: &[f64]) -> Result<Vec<Coordinate>, DirectionsError> {
        if vertexes.len() % 2 != 0 {
            return Err(DirectionsError::MalformedResponse(format!(
                "odd vertex list of length {}",
                vertexes.len()
            )));
        }

        vertexes
            .chunks_exact(2)
            .map(|pair| {
                Coordinate::new(pair[1], pair[0])
                    .map_err(|e| DirectionsError::MalformedResponse(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl DrivingProvider for KakaoDirectionsClient {
    #[instrument(skip(self), fields(provider = "kakao"))]
    async fn driving_route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<DrivingRoute, DirectionsError> {
        let url = format!("{}/v1/directions", self.base_url);
        let params = [
            ("origin", Self::format_point(origin)),
            ("destination", Self::format_point(destination)),
        ];

        debug!(?url, "Requesting driving directions");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&params)
            .send()
            .await
            .map_err(|e| DirectionsError::from_send(&e, self.timeout_secs))?;

        if let Some(err) = DirectionsError::from_status(response.status()) {
            warn!(error = %err, "Kakao directions request failed");
            return Err(err);
        }

        let body: api::DirectionsResponse = response
            .json()
            .await
            .map_err(|e| DirectionsError::MalformedResponse(e.to_string()))?;

        let route = Self::convert_response(body)?;
        debug!(
            points = route.path.len(),
            distance_m = route.distance_m,
            "Driving route received"
        );
        Ok(route)
    }

    fn provider_name(&self) -> &'static str {
        "kakao"
    }
}
