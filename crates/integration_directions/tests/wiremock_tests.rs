//! Integration tests for the direction clients (wiremock-based)

use domain::Coordinate;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use integration_directions::{
    DirectionsConfig, DirectionsError, DrivingProvider, KakaoDirectionsClient, OsrmClient,
    WalkingProvider,
};

fn config_for_mock(base_url: &str) -> DirectionsConfig {
    DirectionsConfig {
        kakao_base_url: base_url.to_string(),
        osrm_base_url: base_url.to_string(),
        ..DirectionsConfig::for_testing()
    }
}

fn city_hall() -> Coordinate {
    Coordinate::new(37.5665, 126.9780).unwrap()
}

fn hospital() -> Coordinate {
    Coordinate::new(37.5796, 126.9990).unwrap()
}

const fn sample_kakao_json() -> &'static str {
    r#"{
        "trans_id": "018e3d",
        "routes": [{
            "result_code": 0,
            "result_msg": "길찾기 성공",
            "summary": { "distance": 3120, "duration": 655 },
            "sections": [{
                "distance": 3120,
                "duration": 655,
                "roads": [
                    { "name": "세종대로", "distance": 900, "duration": 180,
                      "vertexes": [126.9780, 37.5665, 126.9772, 37.5702] },
                    { "name": "율곡로", "distance": 2220, "duration": 475,
                      "vertexes": [126.9850, 37.5750, 126.9990, 37.5796] }
                ]
            }]
        }]
    }"#
}

#[tokio::test]
async fn test_kakao_driving_route_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/directions"))
        .and(header("Authorization", "KakaoAK test-key"))
        .and(query_param("origin", "126.978,37.5665"))
        .and(query_param("destination", "126.999,37.5796"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_kakao_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = KakaoDirectionsClient::new(&config_for_mock(&server.uri())).unwrap();
    let route = client.driving_route(&city_hall(), &hospital()).await.unwrap();

    assert_eq!(route.path.len(), 4);
    assert!((route.distance_m - 3120.0).abs() < f64::EPSILON);
    assert!((route.duration_s - 655.0).abs() < f64::EPSILON);
    assert_eq!(route.road_name.as_deref(), Some("세종대로"));
}

#[tokio::test]
async fn test_kakao_result_code_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{ "routes": [{ "result_code": 105, "result_msg": "출발지 주변의 도로를 탐색할 수 없음" }] }"#,
        ))
        .mount(&server)
        .await;

    let client = KakaoDirectionsClient::new(&config_for_mock(&server.uri())).unwrap();
    let result = client.driving_route(&city_hall(), &hospital()).await;

    assert!(matches!(result, Err(DirectionsError::NoRoute(_))));
}

#[tokio::test]
async fn test_kakao_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/directions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = KakaoDirectionsClient::new(&config_for_mock(&server.uri())).unwrap();
    let result = client.driving_route(&city_hall(), &hospital()).await;

    assert!(matches!(result, Err(DirectionsError::MissingApiKey(_))));
}

#[tokio::test]
async fn test_kakao_server_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/directions"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = KakaoDirectionsClient::new(&config_for_mock(&server.uri())).unwrap();
    let result = client.driving_route(&city_hall(), &hospital()).await;

    assert!(matches!(
        result,
        Err(DirectionsError::HttpStatus { status: 502 })
    ));
}

#[tokio::test]
async fn test_kakao_quota_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/directions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = KakaoDirectionsClient::new(&config_for_mock(&server.uri())).unwrap();
    let result = client.driving_route(&city_hall(), &hospital()).await;

    assert!(matches!(result, Err(DirectionsError::QuotaExhausted)));
}

#[tokio::test]
async fn test_kakao_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/directions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = KakaoDirectionsClient::new(&config_for_mock(&server.uri())).unwrap();
    let result = client.driving_route(&city_hall(), &hospital()).await;

    assert!(matches!(result, Err(DirectionsError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_osrm_walking_route_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route/v1/foot/126.978,37.5665;126.999,37.5796"))
        .and(query_param("overview", "full"))
        .and(query_param("geometries", "polyline"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{ "code": "Ok", "routes": [{ "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@", "distance": 2400.5, "duration": 1800.0 }] }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = OsrmClient::new(&config_for_mock(&server.uri())).unwrap();
    let route = client.walking_route(&city_hall(), &hospital()).await.unwrap();

    assert_eq!(route.path.len(), 3);
    assert!((route.distance_m - 2400.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_osrm_no_route_on_400() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route/v1/foot/126.978,37.5665;126.999,37.5796"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{ "code": "NoRoute", "message": "Impossible route between points" }"#,
        ))
        .mount(&server)
        .await;

    let client = OsrmClient::new(&config_for_mock(&server.uri())).unwrap();
    let result = client.walking_route(&city_hall(), &hospital()).await;

    assert!(matches!(result, Err(DirectionsError::NoRoute(_))));
}

#[tokio::test]
async fn test_osrm_unreachable_server() {
    let config = DirectionsConfig {
        osrm_base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
        ..DirectionsConfig::default()
    };
    let client = OsrmClient::new(&config).unwrap();
    let result = client.walking_route(&city_hall(), &hospital()).await;

    assert!(matches!(
        result,
        Err(DirectionsError::Unreachable(_) | DirectionsError::Timeout { .. })
    ));
}
