//! Nearby-stop coverage
//!
//! Before an estimated transit route is offered, a coverage client confirms
//! that stops exist around the origin. Lookups are cached per coordinate
//! rounded to four decimals (about eleven meters).

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::error::TransitError;
use crate::models::{LatLng, NearbyStop};

const CACHE_KEY_SCALE: f64 = 10_000.0;
const CACHE_CAPACITY: u64 = 1_000;

/// Trait for nearby-stop coverage clients
#[async_trait]
pub trait StopCoverageClient: Send + Sync {
    /// Find stops near a position, nearest first
    async fn find_nearby_stops(&self, location: LatLng) -> Result<Vec<NearbyStop>, TransitError>;

    /// Short provider name for logs and errors
    fn provider_name(&self) -> &'static str;
}

/// Time-limited cache of nearby-stop lookups
pub(crate) struct StopCache {
    cache: Option<Cache<(i64, i64), Vec<NearbyStop>>>,
}

impl StopCache {
    /// `ttl_minutes == 0` disables caching
    pub(crate) fn new(ttl_minutes: u32) -> Self {
        let cache = (ttl_minutes > 0).then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(Duration::from_secs(u64::from(ttl_minutes) * 60))
                .build()
        });
        Self { cache }
    }

    pub(crate) const fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn key(location: LatLng) -> (i64, i64) {
        (
            (location.latitude * CACHE_KEY_SCALE).round() as i64,
            (location.longitude * CACHE_KEY_SCALE).round() as i64,
        )
    }

    /// Serve `location` from the cache or run `fetch` and remember its result
    ///
    /// Failures are not cached.
    pub(crate) async fn get_or_fetch<F, Fut>(
        &self,
        location: LatLng,
        fetch: F,
    ) -> Result<Vec<NearbyStop>, TransitError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<NearbyStop>, TransitError>>,
    {
        let Some(cache) = &self.cache else {
            return fetch().await;
        };

        let key = Self::key(location);
        if let Some(stops) = cache.get(&key).await {
            debug!(count = stops.len(), "Nearby stops served from cache");
            return Ok(stops);
        }

        let stops = fetch().await?;
        cache.insert(key, stops.clone()).await;
        Ok(stops)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn stop(name: &str) -> NearbyStop {
        NearbyStop {
            id: name.to_string(),
            name: name.to_string(),
            location: None,
            distance_m: None,
        }
    }

    #[test]
    fn test_key_rounds_nearby_points_together() {
        let a = StopCache::key(LatLng::new(37.566_51, 126.978_02));
        let b = StopCache::key(LatLng::new(37.566_54, 126.977_98));
        let c = StopCache::key(LatLng::new(37.567_5, 126.978));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_fetch() {
        let cache = StopCache::new(5);
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let stops = cache
                .get_or_fetch(LatLng::new(37.5665, 126.978), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![stop("시청역")])
                })
                .await
                .unwrap();
            assert_eq!(stops.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = StopCache::new(5);
        let location = LatLng::new(37.5665, 126.978);
        let failed = cache
            .get_or_fetch(location, || async { Err(TransitError::QuotaExhausted) })
            .await;
        assert!(failed.is_err());

        let stops = cache
            .get_or_fetch(location, || async { Ok(vec![stop("시청역")]) })
            .await
            .unwrap();
        assert_eq!(stops.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let cache = StopCache::new(0);
        assert!(!cache.is_enabled());
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            cache
                .get_or_fetch(LatLng::new(37.5665, 126.978), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
