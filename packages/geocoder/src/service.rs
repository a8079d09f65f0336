//! Provider chain and cached lookups.
//!
//! The service tries each enabled provider in priority order. Failures
//! and misses fall through to the next provider; reverse lookups that
//! exhaust the chain return a coordinate placeholder so callers always
//! get something renderable, while forward lookups surface
//! [`GeocodeError::NotFound`].

use std::sync::Mutex;
use std::time::Duration;

use safety_map_store_models::GeoPoint;

use crate::cache::{self, BoundedCache};
use crate::service_registry::{self, GeocodingService, ProviderConfig};
use crate::{GeocodeError, GeocodeSource, PlaceSummary, google, nominatim};

/// Default per-request timeout for external providers.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of entries held by each direction's cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Runtime configuration for the geocoding facade.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Google Maps API key; Google is skipped when absent.
    pub api_key: Option<String>,
    /// Per-request timeout for external providers.
    pub timeout: Duration,
    /// Maximum entries held by each direction's cache.
    pub cache_capacity: usize,
    /// Entry lifetime; `None` keeps entries until evicted.
    pub cache_ttl: Option<Duration>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: None,
        }
    }
}

/// Multi-provider geocoder with bounded result caches.
pub struct GeocoderService {
    client: reqwest::Client,
    services: Vec<GeocodingService>,
    api_key: Option<String>,
    timeout: Duration,
    reverse_cache: Mutex<BoundedCache<(i64, i64), PlaceSummary>>,
    forward_cache: Mutex<BoundedCache<String, GeoPoint>>,
}

impl GeocoderService {
    /// Builds the service from the embedded provider registry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        Self::with_services(config, service_registry::enabled_services())
    }

    fn with_services(
        config: GeocoderConfig,
        services: Vec<GeocodingService>,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("safety-map/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            services,
            api_key: config.api_key.filter(|key| !key.is_empty()),
            timeout: config.timeout,
            reverse_cache: Mutex::new(BoundedCache::new(config.cache_capacity, config.cache_ttl)),
            forward_cache: Mutex::new(BoundedCache::new(config.cache_capacity, config.cache_ttl)),
        })
    }

    /// Resolves coordinates to a place, consulting the cache first.
    ///
    /// Never fails: when every provider errors or misses, the coordinate
    /// placeholder is returned and cached like any other result.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> PlaceSummary {
        let key = cache::coordinate_key(latitude, longitude);
        let cached = {
            let mut cache = self.reverse_cache.lock().expect("reverse cache mutex poisoned");
            cache.get(&key)
        };
        if let Some(hit) = cached {
            log::debug!("Reverse geocode cache hit for ({latitude:.4}, {longitude:.4})");
            return hit;
        }

        let summary = self.resolve_reverse(latitude, longitude).await;
        self.reverse_cache
            .lock()
            .expect("reverse cache mutex poisoned")
            .insert(key, summary.clone());
        summary
    }

    /// Resolves a free-form place name to coordinates, consulting the
    /// cache first. Only successful resolutions are cached.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NotFound`] when the query is empty or no
    /// provider produced a match.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub async fn forward(&self, place: &str) -> Result<GeoPoint, GeocodeError> {
        let query = place.trim();
        if query.is_empty() {
            return Err(GeocodeError::NotFound);
        }
        let key = query.to_lowercase();
        let cached = {
            let mut cache = self.forward_cache.lock().expect("forward cache mutex poisoned");
            cache.get(&key)
        };
        if let Some(hit) = cached {
            log::debug!("Forward geocode cache hit for '{query}'");
            return Ok(hit);
        }

        for svc in &self.services {
            let result = match &svc.provider {
                ProviderConfig::GoogleMaps { base_url, .. } => {
                    let Some(api_key) = self.api_key.as_deref() else {
                        log::debug!("Skipping {}: no API key configured", svc.id);
                        continue;
                    };
                    google::forward(&self.client, base_url, api_key, query).await
                }
                ProviderConfig::Nominatim { base_url, .. } => {
                    nominatim::forward(&self.client, base_url, query).await
                }
            };
            match result {
                Ok(Some(point)) => {
                    self.forward_cache
                        .lock()
                        .expect("forward cache mutex poisoned")
                        .insert(key, point);
                    return Ok(point);
                }
                Ok(None) => log::debug!("{} had no match for '{query}'", svc.id),
                Err(e) => {
                    let e = self.normalize(e);
                    log::warn!("Forward geocode via {} failed: {e}", svc.id);
                }
            }
        }
        Err(GeocodeError::NotFound)
    }

    async fn resolve_reverse(&self, latitude: f64, longitude: f64) -> PlaceSummary {
        for svc in &self.services {
            let result = match &svc.provider {
                ProviderConfig::GoogleMaps {
                    base_url,
                    result_type,
                } => {
                    let Some(api_key) = self.api_key.as_deref() else {
                        log::debug!("Skipping {}: no API key configured", svc.id);
                        continue;
                    };
                    google::reverse(
                        &self.client,
                        base_url,
                        api_key,
                        result_type,
                        latitude,
                        longitude,
                    )
                    .await
                }
                ProviderConfig::Nominatim { base_url, zoom } => {
                    nominatim::reverse(&self.client, base_url, *zoom, latitude, longitude).await
                }
            };
            match result {
                Ok(Some(summary)) => return summary,
                Ok(None) => {
                    log::debug!("{} had no match for ({latitude:.4}, {longitude:.4})", svc.id);
                }
                Err(e) => {
                    let e = self.normalize(e);
                    log::warn!("Reverse geocode via {} failed: {e}", svc.id);
                }
            }
        }
        placeholder_summary(latitude, longitude)
    }

    /// Reclassifies client-side timeouts so they surface distinctly from
    /// other transport errors.
    fn normalize(&self, err: GeocodeError) -> GeocodeError {
        match err {
            GeocodeError::Http(e) if e.is_timeout() => GeocodeError::Timeout {
                seconds: self.timeout.as_secs(),
            },
            other => other,
        }
    }
}

/// Placeholder produced when every provider fails or misses: the
/// coordinates become the place name so the caller always has something
/// to display.
#[must_use]
pub fn placeholder_summary(latitude: f64, longitude: f64) -> PlaceSummary {
    PlaceSummary {
        place_name: format!("Location ({latitude:.4}, {longitude:.4})"),
        full_address: String::new(),
        source: GeocodeSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unroutable_nominatim() -> GeocodingService {
        GeocodingService {
            id: "nominatim".to_string(),
            name: "Unreachable Nominatim".to_string(),
            enabled: true,
            priority: 1,
            provider: ProviderConfig::Nominatim {
                base_url: "http://127.0.0.1:9".to_string(),
                zoom: 18,
            },
        }
    }

    fn test_config() -> GeocoderConfig {
        GeocoderConfig {
            api_key: None,
            timeout: Duration::from_millis(500),
            cache_capacity: 16,
            cache_ttl: None,
        }
    }

    #[test]
    fn placeholder_formats_coordinates() {
        let summary = placeholder_summary(28.613_87, 77.208_99);
        assert_eq!(summary.place_name, "Location (28.6139, 77.2090)");
        assert!(summary.full_address.is_empty());
        assert_eq!(summary.source, GeocodeSource::Fallback);
    }

    #[tokio::test]
    async fn reverse_exhaustion_yields_cached_placeholder() {
        let service =
            GeocoderService::with_services(test_config(), vec![unroutable_nominatim()]).unwrap();
        let first = service.reverse(28.6139, 77.2090).await;
        assert_eq!(first.source, GeocodeSource::Fallback);
        assert_eq!(first.place_name, "Location (28.6139, 77.2090)");

        let second = service.reverse(28.6139, 77.2090).await;
        assert_eq!(first, second);
        assert_eq!(service.reverse_cache.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn forward_exhaustion_is_not_found_and_uncached() {
        let service =
            GeocoderService::with_services(test_config(), vec![unroutable_nominatim()]).unwrap();
        let err = service.forward("nowhere in particular").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NotFound));
        assert!(service.forward_cache.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn google_is_skipped_without_api_key() {
        let google_only = GeocodingService {
            id: "google".to_string(),
            name: "Google Maps Geocoding API".to_string(),
            enabled: true,
            priority: 1,
            provider: ProviderConfig::GoogleMaps {
                base_url: "http://127.0.0.1:9".to_string(),
                result_type: "street_address".to_string(),
            },
        };
        let service =
            GeocoderService::with_services(test_config(), vec![google_only]).unwrap();
        let err = service.forward("anywhere").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NotFound));
    }

    #[tokio::test]
    async fn empty_forward_query_is_not_found() {
        let service = GeocoderService::with_services(test_config(), Vec::new()).unwrap();
        let err = service.forward("   ").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NotFound));
    }
}
