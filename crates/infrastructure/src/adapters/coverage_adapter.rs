//! Coverage adapter - Implements TransitCoveragePort using a nearby-stop lookup

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::TransitCoveragePort;
use async_trait::async_trait;
use domain::Coordinate;
use integration_transit::{
    HafasConfig, HafasTransitClient, KakaoLocalClient, KakaoLocalConfig, LatLng,
    StopCoverageClient,
};
use tracing::{debug, instrument};

use super::map_transit_error;

/// Secondary transit provider: counts stops near a location
pub struct StopCoverageAdapter {
    client: Arc<dyn StopCoverageClient>,
}

impl std::fmt::Debug for StopCoverageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopCoverageAdapter")
            .field("provider", &self.client.provider_name())
            .finish()
    }
}

impl StopCoverageAdapter {
    /// Wrap an existing client
    #[must_use]
    pub fn new(client: Arc<dyn StopCoverageClient>) -> Self {
        Self { client }
    }

    /// Kakao Local category search
    ///
    /// # Errors
    ///
    /// Returns an error if no key is configured or the HTTP client fails to
    /// initialize.
    pub fn kakao_local(config: &KakaoLocalConfig) -> Result<Self, ApplicationError> {
        let client =
            KakaoLocalClient::new(config).map_err(|e| map_transit_error("kakao-local", e))?;
        Ok(Self::new(Arc::new(client)))
    }

    /// HAFAS `locations/nearby` lookup
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn hafas(config: &HafasConfig) -> Result<Self, ApplicationError> {
        let client = HafasTransitClient::new(config).map_err(|e| map_transit_error("hafas", e))?;
        Ok(Self::new(Arc::new(client)))
    }
}

#[async_trait]
impl TransitCoveragePort for StopCoverageAdapter {
    #[instrument(skip(self))]
    async fn nearby_stop_count(&self, location: &Coordinate) -> Result<usize, ApplicationError> {
        let stops = self
            .client
            .find_nearby_stops(LatLng::new(location.lat(), location.lng()))
            .await
            .map_err(|e| map_transit_error(self.client.provider_name(), e))?;

        debug!(count = stops.len(), "Nearby stops found");
        Ok(stops.len())
    }
}

#[cfg(test)]
mod tests {
    use integration_transit::{NearbyStop, TransitError};

    use super::*;

    struct FixedClient(Option<usize>);

    #[async_trait]
    impl StopCoverageClient for FixedClient {
        async fn find_nearby_stops(&self, location: LatLng) -> Result<Vec<NearbyStop>, TransitError> {
            let count = self
                .0
                .ok_or(TransitError::HttpStatus { status: 503 })?;
            Ok((0..count)
                .map(|i| NearbyStop {
                    id: i.to_string(),
                    name: format!("Stop {i}"),
                    location: Some(location),
                    distance_m: Some(100),
                })
                .collect())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn origin() -> Coordinate {
        Coordinate::new(37.5665, 126.9780).unwrap()
    }

    #[tokio::test]
    async fn counts_stops() {
        let adapter = StopCoverageAdapter::new(Arc::new(FixedClient(Some(3))));
        assert_eq!(adapter.nearby_stop_count(&origin()).await, Ok(3));

        let adapter = StopCoverageAdapter::new(Arc::new(FixedClient(Some(0))));
        assert_eq!(adapter.nearby_stop_count(&origin()).await, Ok(0));
    }

    #[tokio::test]
    async fn failure_names_the_provider() {
        let adapter = StopCoverageAdapter::new(Arc::new(FixedClient(None)));
        assert!(matches!(
            adapter.nearby_stop_count(&origin()).await,
            Err(ApplicationError::ProviderUnavailable(ref m)) if m.starts_with("fixed")
        ));
    }

    #[test]
    fn kakao_local_requires_key() {
        assert!(matches!(
            StopCoverageAdapter::kakao_local(&KakaoLocalConfig::default()),
            Err(ApplicationError::CredentialMissing(_))
        ));
        assert!(StopCoverageAdapter::kakao_local(&KakaoLocalConfig::for_testing()).is_ok());
        assert!(StopCoverageAdapter::hafas(&HafasConfig::for_testing()).is_ok());
    }
}
