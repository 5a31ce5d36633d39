//! Google Routes API client (transit mode)
//!
//! Calls `directions/v2:computeRoutes` and keeps only the first leg of the
//! first route, which is all the navigation engine draws.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
#[cfg(test)]
use mockall::automock;
use tracing::{debug, instrument, warn};

use crate::config::TransitConfig;
use crate::error::TransitError;
use crate::models::{LatLng, RouteStep, StopDetails, TransitDetails, TransitRoute};

/// Response fields requested from the Routes API
///
/// The API returns only these fields. Walking minutes come from
/// `staticDuration` and fall back to `distanceMeters`.
pub const ROUTES_FIELD_MASK: &str = "routes.legs.duration,routes.legs.distanceMeters,\
routes.legs.steps.travelMode,routes.legs.steps.polyline,routes.legs.steps.startLocation,\
routes.legs.steps.endLocation,routes.legs.steps.staticDuration,routes.legs.steps.distanceMeters,\
routes.legs.steps.transitDetails";

/// Trait for transit route clients
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransitRouteClient: Send + Sync {
    /// Compute the best transit route; `departure` defaults to now
    async fn compute_transit_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        departure: Option<DateTime<Utc>>,
    ) -> Result<TransitRoute, TransitError>;
}

/// Google Routes API client restricted to transit travel
#[derive(Debug)]
pub struct GoogleRoutesClient {
    client: Client,
    config: TransitConfig,
}

impl GoogleRoutesClient {
    /// Create a new Routes API client
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &TransitConfig) -> Result<Self, TransitError> {
        if !config.has_api_key() {
            return Err(TransitError::MissingApiKey(
                "Google Routes API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("CareRoute/1.0")
            .build()
            .map_err(|e| TransitError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    fn build_request(
        &self,
        origin: LatLng,
        destination: LatLng,
        departure: DateTime<Utc>,
    ) -> RawRouteRequest<'_> {
        RawRouteRequest {
            origin: RawWaypoint::at(origin),
            destination: RawWaypoint::at(destination),
            travel_mode: "TRANSIT",
            transit_preferences: RawTransitPreferences {
                routing_preference: &self.config.routing_preference,
                allowed_travel_modes: &self.config.allowed_modes,
            },
            departure_time: departure.to_rfc3339_opts(SecondsFormat::Millis, true),
            language_code: &self.config.language_code,
            units: &self.config.units,
        }
    }

    /// Parse the raw Routes API response into the first leg
    fn parse_routes_response(
        body: &str,
        origin: LatLng,
        destination: LatLng,
    ) -> Result<TransitRoute, TransitError> {
        let raw: RawRoutesResponse =
            serde_json::from_str(body).map_err(|e| TransitError::MalformedResponse(e.to_string()))?;

        let Some(leg) = raw
            .routes
            .into_iter()
            .next()
            .and_then(|route| route.legs.into_iter().next())
        else {
            return Err(TransitError::NoRoutesFound {
                from: origin,
                to: destination,
            });
        };

        Ok(TransitRoute {
            distance_m: leg.distance_meters.unwrap_or_default(),
            duration_s: leg.duration.map_or(0.0, RawDuration::seconds),
            steps: leg.steps.into_iter().map(Self::convert_step).collect(),
        })
    }

    fn convert_step(raw: RawStep) -> RouteStep {
        RouteStep {
            travel_mode: raw.travel_mode.unwrap_or_default(),
            encoded_polyline: raw.polyline.and_then(|p| p.encoded_polyline),
            start: raw.start_location.and_then(RawLocation::into_lat_lng),
            end: raw.end_location.and_then(RawLocation::into_lat_lng),
            duration_s: raw.static_duration.map(RawDuration::seconds),
            distance_m: raw.distance_meters,
            transit: raw.transit_details.map(Self::convert_transit),
        }
    }

    fn convert_transit(raw: RawTransitDetails) -> TransitDetails {
        let line = raw.transit_line.unwrap_or_default();
        let stops = raw.stop_details.unwrap_or_default();
        let times = raw.localized_values.unwrap_or_default();

        TransitDetails {
            line_name: line.name.unwrap_or_default(),
            line_short_name: line.name_short.unwrap_or_default(),
            line_color: line.color.filter(|c| !c.trim().is_empty()),
            vehicle_type: line.vehicle.and_then(|v| v.vehicle_type).unwrap_or_default(),
            departure_stop: Self::convert_stop(stops.departure_stop),
            arrival_stop: Self::convert_stop(stops.arrival_stop),
            departure_time_text: times.departure_time.and_then(RawLocalizedTime::into_text),
            arrival_time_text: times.arrival_time.and_then(RawLocalizedTime::into_text),
            stop_count: raw.stop_count.unwrap_or_default(),
        }
    }

    fn convert_stop(raw: Option<RawStop>) -> StopDetails {
        let raw = raw.unwrap_or_default();
        StopDetails {
            name: raw.name.unwrap_or_default(),
            location: raw.location.and_then(RawLocation::into_lat_lng),
        }
    }
}

#[async_trait]
impl TransitRouteClient for GoogleRoutesClient {
    #[instrument(skip(self), fields(from = %origin, to = %destination))]
    async fn compute_transit_route(
        &self,
        origin: LatLng,
        destination: LatLng,
        departure: Option<DateTime<Utc>>,
    ) -> Result<TransitRoute, TransitError> {
        let url = format!("{}/directions/v2:computeRoutes", self.config.base_url);
        let body = self.build_request(origin, destination, departure.unwrap_or_else(Utc::now));

        debug!(?url, "Computing transit route");

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", self.api_key())
            .header("X-Goog-FieldMask", ROUTES_FIELD_MASK)
            .json(&body)
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

        let route = Self::parse_routes_response(&body, origin, destination)?;

        if route.steps.is_empty() {
            warn!("Transit route has no steps");
        }

        debug!(steps = route.steps.len(), "Transit route computed");
        Ok(route)
    }
}

// --- Raw API request/response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawRouteRequest<'a> {
    origin: RawWaypoint,
    destination: RawWaypoint,
    travel_mode: &'static str,
    transit_preferences: RawTransitPreferences<'a>,
    departure_time: String,
    language_code: &'a str,
    units: &'a str,
}

#[derive(Debug, Serialize)]
struct RawWaypoint {
    location: RawLocation,
}

impl RawWaypoint {
    const fn at(point: LatLng) -> Self {
        Self {
            location: RawLocation {
                lat_lng: Some(point),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawTransitPreferences<'a> {
    routing_preference: &'a str,
    allowed_travel_modes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct RawRoutesResponse {
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    #[serde(default)]
    legs: Vec<RawLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLeg {
    duration: Option<RawDuration>,
    distance_meters: Option<f64>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

/// Durations arrive as `"1234s"` strings, older payloads use plain numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(f64),
    Text(String),
}

impl RawDuration {
    fn seconds(self) -> f64 {
        match self {
            Self::Seconds(secs) => secs,
            Self::Text(text) => text
                .trim()
                .trim_end_matches('s')
                .parse()
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    travel_mode: Option<String>,
    polyline: Option<RawPolyline>,
    start_location: Option<RawLocation>,
    end_location: Option<RawLocation>,
    static_duration: Option<RawDuration>,
    distance_meters: Option<f64>,
    transit_details: Option<RawTransitDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPolyline {
    encoded_polyline: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    lat_lng: Option<LatLng>,
}

impl RawLocation {
    fn into_lat_lng(self) -> Option<LatLng> {
        self.lat_lng
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransitDetails {
    transit_line: Option<RawTransitLine>,
    stop_details: Option<RawStopDetails>,
    localized_values: Option<RawLocalizedValues>,
    stop_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransitLine {
    name: Option<String>,
    name_short: Option<String>,
    color: Option<String>,
    vehicle: Option<RawVehicle>,
}

#[derive(Debug, Deserialize)]
struct RawVehicle {
    #[serde(rename = "type")]
    vehicle_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStopDetails {
    departure_stop: Option<RawStop>,
    arrival_stop: Option<RawStop>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStop {
    name: Option<String>,
    location: Option<RawLocation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocalizedValues {
    departure_time: Option<RawLocalizedTime>,
    arrival_time: Option<RawLocalizedTime>,
}

#[derive(Debug, Deserialize)]
struct RawLocalizedTime {
    time: Option<RawText>,
}

impl RawLocalizedTime {
    fn into_text(self) -> Option<String> {
        self.time.and_then(|t| t.text)
    }
}

#[derive(Debug, Deserialize)]
struct RawText {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> LatLng {
        LatLng::new(37.5665, 126.9780)
    }

    fn destination() -> LatLng {
        LatLng::new(37.5796, 126.9990)
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = TransitConfig::default();
        assert!(matches!(
            GoogleRoutesClient::new(&config),
            Err(TransitError::MissingApiKey(_))
        ));
        assert!(GoogleRoutesClient::new(&TransitConfig::for_testing()).is_ok());
    }

    #[test]
    fn test_request_body_shape() {
        let client = GoogleRoutesClient::new(&TransitConfig::for_testing()).unwrap();
        let departure = DateTime::parse_from_rfc3339("2026-03-02T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let body = serde_json::to_value(client.build_request(origin(), destination(), departure))
            .unwrap();

        assert_eq!(body["travelMode"], "TRANSIT");
        assert_eq!(body["languageCode"], "ko");
        assert_eq!(body["units"], "METRIC");
        assert_eq!(body["transitPreferences"]["routingPreference"], "LESS_WALKING");
        assert_eq!(
            body["transitPreferences"]["allowedTravelModes"],
            serde_json::json!(["BUS", "SUBWAY", "TRAIN", "LIGHT_RAIL"])
        );
        assert_eq!(body["origin"]["location"]["latLng"]["latitude"], 37.5665);
        assert_eq!(body["destination"]["location"]["latLng"]["longitude"], 126.999);
        assert_eq!(body["departureTime"], "2026-03-02T08:30:00.000Z");
    }

    #[test]
    fn test_parse_transit_response() {
        let json = r##"{
            "routes": [{
                "legs": [{
                    "duration": "1500s",
                    "distanceMeters": 4200,
                    "steps": [
                        {
                            "travelMode": "WALK",
                            "polyline": { "encodedPolyline": "_p~iF~ps|U_ulLnnqC" },
                            "startLocation": { "latLng": { "latitude": 37.5665, "longitude": 126.978 } },
                            "endLocation": { "latLng": { "latitude": 37.5660, "longitude": 126.9820 } }
                        },
                        {
                            "travelMode": "TRANSIT",
                            "polyline": { "encodedPolyline": "abc" },
                            "transitDetails": {
                                "stopDetails": {
                                    "departureStop": {
                                        "name": "시청",
                                        "location": { "latLng": { "latitude": 37.5660, "longitude": 126.9820 } }
                                    },
                                    "arrivalStop": { "name": "종로3가" }
                                },
                                "localizedValues": {
                                    "departureTime": { "time": { "text": "오전 8:35" } },
                                    "arrivalTime": { "time": { "text": "오전 8:44" } }
                                },
                                "transitLine": {
                                    "name": "서울 지하철 1호선",
                                    "nameShort": "1호선",
                                    "color": "#0052a4",
                                    "vehicle": { "type": "SUBWAY" }
                                },
                                "stopCount": 3
                            }
                        }
                    ]
                }]
            }]
        }"##;

        let route = GoogleRoutesClient::parse_routes_response(json, origin(), destination()).unwrap();
        assert!((route.duration_s - 1500.0).abs() < f64::EPSILON);
        assert!((route.distance_m - 4200.0).abs() < f64::EPSILON);
        assert_eq!(route.steps.len(), 2);

        let walk = &route.steps[0];
        assert!(walk.is_walking());
        assert_eq!(walk.start, Some(origin()));
        assert!(walk.transit.is_none());

        let ride = route.steps[1].transit.as_ref().unwrap();
        assert_eq!(ride.line_short_name, "1호선");
        assert_eq!(ride.line_color.as_deref(), Some("#0052a4"));
        assert_eq!(ride.vehicle_type, "SUBWAY");
        assert_eq!(ride.departure_stop.name, "시청");
        assert!(ride.departure_stop.location.is_some());
        assert!(ride.arrival_stop.location.is_none());
        assert_eq!(ride.departure_time_text.as_deref(), Some("오전 8:35"));
        assert_eq!(ride.stop_count, 3);
    }

    #[test]
    fn test_field_mask_requests_walking_step_fields() {
        let fields: Vec<&str> = ROUTES_FIELD_MASK.split(',').collect();
        for field in [
            "routes.legs.steps.staticDuration",
            "routes.legs.steps.distanceMeters",
            "routes.legs.steps.polyline",
            "routes.legs.steps.transitDetails",
            "routes.legs.duration",
        ] {
            assert!(fields.contains(&field), "missing {field}");
        }
        assert!(fields.iter().all(|f| !f.trim().is_empty() && f.trim() == *f));
    }

    #[test]
    fn test_walking_step_duration_and_distance() {
        let json = r#"{ "routes": [{ "legs": [{ "steps": [{
            "travelMode": "WALK",
            "staticDuration": "290s",
            "distanceMeters": 340,
            "polyline": { "encodedPolyline": "_p~iF~ps|U" }
        }] }] }] }"#;
        let route = GoogleRoutesClient::parse_routes_response(json, origin(), destination()).unwrap();
        let walk = &route.steps[0];
        assert_eq!(walk.duration_s, Some(290.0));
        assert_eq!(walk.distance_m, Some(340.0));
    }

    #[test]
    fn test_numeric_duration() {
        let json = r#"{ "routes": [{ "legs": [{ "duration": 600, "steps": [] }] }] }"#;
        let route = GoogleRoutesClient::parse_routes_response(json, origin(), destination()).unwrap();
        assert!((route.duration_s - 600.0).abs() < f64::EPSILON);
        assert!(route.distance_m.abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_routes_is_no_route() {
        for json in [r#"{}"#, r#"{ "routes": [] }"#, r#"{ "routes": [{ "legs": [] }] }"#] {
            let result = GoogleRoutesClient::parse_routes_response(json, origin(), destination());
            assert!(matches!(result, Err(TransitError::NoRoutesFound { .. })));
        }
    }

    #[test]
    fn test_blank_line_color_dropped() {
        let json = r#"{ "routes": [{ "legs": [{ "steps": [{
            "travelMode": "TRANSIT",
            "transitDetails": { "transitLine": { "name": "N62", "color": "" } }
        }] }] }] }"#;
        let route = GoogleRoutesClient::parse_routes_response(json, origin(), destination()).unwrap();
        let ride = route.steps[0].transit.as_ref().unwrap();
        assert!(ride.line_color.is_none());
        assert_eq!(ride.departure_stop.name, "");
        assert_eq!(ride.stop_count, 0);
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = GoogleRoutesClient::parse_routes_response("not json", origin(), destination());
        assert!(matches!(result, Err(TransitError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_mock_client() {
        let mut mock = MockTransitRouteClient::new();
        mock.expect_compute_transit_route().returning(|_, _, _| {
            Ok(TransitRoute {
                distance_m: 1.0,
                duration_s: 2.0,
                steps: Vec::new(),
            })
        });
        let route = mock
            .compute_transit_route(origin(), destination(), None)
            .await
            .unwrap();
        assert!(route.steps.is_empty());
    }
}
