//! Public transit integration for CareRoute
//!
//! Provides transit routing via the Google Routes API
//! ([`computeRoutes`](https://developers.google.com/maps/documentation/routes)) and
//! a secondary nearby-stop coverage check. Coverage defaults to the Kakao Local
//! category search, which covers Korean subway stations and bus stops. A
//! HAFAS-based [transport.rest](https://v6.db.transport.rest) client is
//! available for European deployments.
//!
//! # Architecture
//!
//! The crate follows a client-trait pattern consistent with other integration crates.
//! [`TransitRouteClient`] defines transit route computation, implemented by
//! [`GoogleRoutesClient`]. [`StopCoverageClient`] answers "are there stops near
//! this point", implemented by [`KakaoLocalClient`] and [`HafasTransitClient`].
//! Nearby-stop lookups are cached per rounded coordinate.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_transit::{GoogleRoutesClient, LatLng, TransitConfig, TransitRouteClient};
//!
//! let config = TransitConfig {
//!     api_key: Some("key".to_string()),
//!     ..TransitConfig::default()
//! };
//! let client = GoogleRoutesClient::new(&config)?;
//!
//! let route = client
//!     .compute_transit_route(LatLng::new(37.5665, 126.9780), LatLng::new(37.5796, 126.9990), None)
//!     .await?;
//! ```

mod config;
mod coverage;
mod error;
mod google_routes;
mod hafas;
mod kakao_local;
mod models;

pub use config::{HafasConfig, KakaoLocalConfig, TransitConfig};
pub use coverage::StopCoverageClient;
pub use error::TransitError;
pub use google_routes::{GoogleRoutesClient, ROUTES_FIELD_MASK, TransitRouteClient};
pub use hafas::HafasTransitClient;
pub use kakao_local::KakaoLocalClient;
pub use models::{LatLng, NearbyStop, RouteStep, StopDetails, TransitDetails, TransitRoute};
