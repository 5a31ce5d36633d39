//! OSRM route client for walking paths
//!
//! Uses the Route service with full overview geometry in polyline (precision 5)
//! encoding. See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use std::time::Duration;

use async_trait::async_trait;
use domain::{Coordinate, polyline};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::{
    config::DirectionsConfig, error::DirectionsError, models::WalkingRoute,
    provider::WalkingProvider,
};

/// OSRM Route API response structures
mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct RouteResponse {
        /// `"Ok"` on success, otherwise e.g. `"NoRoute"` or `"InvalidQuery"`
        pub code: String,
        pub message: Option<String>,
        #[serde(default)]
        pub routes: Vec<Route>,
    }

    impl RouteResponse {
        pub fn is_ok(&self) -> bool {
            self.code == "Ok"
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct Route {
        pub geometry: String,
        pub distance: f64,
        pub duration: f64,
    }
}

/// OSRM client bound to one routing profile
#[derive(Debug)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
    profile: String,
    timeout_secs: u64,
}

impl OsrmClient {
    /// Create a new OSRM client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &DirectionsConfig) -> Result<Self, DirectionsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("CareRoute/1.0")
            .build()
            .map_err(|e| DirectionsError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.osrm_base_url.trim_end_matches('/').to_string(),
            profile: config.osrm_profile.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn build_route_url(&self, from: &Coordinate, to: &Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url,
            self.profile,
            from.lng(),
            from.lat(),
            to.lng(),
            to.lat()
        )
    }

    fn convert_response(response: api::RouteResponse) -> Result<WalkingRoute, DirectionsError> {
        if !response.is_ok() {
            return Err(DirectionsError::NoRoute(format!(
                "{}: {}",
                response.code,
                response.message.unwrap_or_default()
            )));
        }

        let Some(route) = response.routes.into_iter().next() else {
            return Err(DirectionsError::NoRoute("empty route list".to_string()));
        };

        let path = polyline::decode(&route.geometry)
            .map_err(|e| DirectionsError::MalformedResponse(e.to_string()))?;

        Ok(WalkingRoute {
            distance_m: route.distance,
            duration_s: route.duration,
            path,
        })
    }
}

#[async_trait]
impl WalkingProvider for OsrmClient {
    #[instrument(skip(self), fields(provider = "osrm", profile = %self.profile))]
    async fn walking_route(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<WalkingRoute, DirectionsError> {
        let url = self.build_route_url(from, to);
        let params = [("overview", "full"), ("geometries", "polyline")];

        debug!(?url, "Requesting walking path");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DirectionsError::from_send(&e, self.timeout_secs))?;

        // OSRM reports NoRoute with a 400 and a JSON body
        let status = response.status();
        if let Some(err) =
            DirectionsError::from_status(status).filter(|_| status != StatusCode::BAD_REQUEST)
        {
            return Err(err);
        }

        let body: api::RouteResponse = response
            .json()
            .await
            .map_err(|e| DirectionsError::MalformedResponse(e.to_string()))?;

        let route = Self::convert_response(body)?;
        debug!(points = route.path.len(), "Walking path received");
        Ok(route)
    }

    fn provider_name(&self) -> &'static str {
        "osrm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<WalkingRoute, DirectionsError> {
        let response: api::RouteResponse = serde_json::from_str(json).unwrap();
        OsrmClient::convert_response(response)
    }

    #[test]
    fn test_route_url_is_lng_lat() {
        let client = OsrmClient::new(&DirectionsConfig {
            osrm_base_url: "http://osrm.local/".to_string(),
            ..DirectionsConfig::default()
        })
        .unwrap();
        let from = Coordinate::new(37.5665, 126.978).unwrap();
        let to = Coordinate::new(37.5657, 126.9769).unwrap();

        assert_eq!(
            client.build_route_url(&from, &to),
            "http://osrm.local/route/v1/foot/126.978,37.5665;126.9769,37.5657"
        );
    }

    #[test]
    fn test_convert_success() {
        let route = parse(
            r#"{
                "code": "Ok",
                "routes": [{ "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@", "distance": 812.4, "duration": 640.1 }]
            }"#,
        )
        .unwrap();

        assert_eq!(route.path.len(), 3);
        assert!((route.path[0].lat() - 38.5).abs() < 1e-9);
        assert!((route.path[0].lng() + 120.2).abs() < 1e-9);
        assert!((route.distance_m - 812.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_error_code_is_no_route() {
        let result = parse(r#"{ "code": "NoRoute", "message": "Impossible route between points" }"#);
        match result {
            Err(DirectionsError::NoRoute(msg)) => assert!(msg.starts_with("NoRoute")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ok_without_routes_is_no_route() {
        assert!(matches!(
            parse(r#"{ "code": "Ok", "routes": [] }"#),
            Err(DirectionsError::NoRoute(_))
        ));
    }

    #[test]
    fn test_bad_geometry_is_malformed() {
        let result = parse(r#"{ "code": "Ok", "routes": [{ "geometry": "_p~iF", "distance": 1, "duration": 1 }] }"#);
        assert!(matches!(result, Err(DirectionsError::MalformedResponse(_))));
    }
}
