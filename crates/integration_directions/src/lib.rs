#![forbid(unsafe_code)]
//! Road and foot directions for CareRoute
//!
//! Provides driving directions via the
//! [Kakao Mobility](https://developers.kakaomobility.com) directions API and
//! pedestrian paths via an [OSRM](https://project-osrm.org) server running the
//! foot profile.
//!
//! # Architecture
//!
//! The crate follows a provider pattern: [`DrivingProvider`] is implemented by
//! [`KakaoDirectionsClient`], [`WalkingProvider`] by [`OsrmClient`]. Both return
//! geometry already decoded into [`domain::Coordinate`] values.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::Coordinate;
//! use integration_directions::{DirectionsConfig, DrivingProvider, KakaoDirectionsClient};
//!
//! let config = DirectionsConfig {
//!     kakao_api_key: Some("key".to_string()),
//!     ..DirectionsConfig::default()
//! };
//! let client = KakaoDirectionsClient::new(&config)?;
//!
//! let origin = Coordinate::new(37.5665, 126.9780)?;
//! let hospital = Coordinate::new(37.5796, 126.9990)?;
//! let route = client.driving_route(&origin, &hospital).await?;
//! println!("{:.1} km via {:?}", route.distance_m / 1000.0, route.road_name);
//! ```

mod config;
mod error;
mod kakao;
mod models;
mod osrm;
mod provider;

pub use config::DirectionsConfig;
pub use error::DirectionsError;
pub use kakao::KakaoDirectionsClient;
pub use models::{DrivingRoute, WalkingRoute};
pub use osrm::OsrmClient;
pub use provider::{DrivingProvider, WalkingProvider};
#[cfg(test)]
pub use provider::{MockDrivingProvider, MockWalkingProvider};
