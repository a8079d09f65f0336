use std::str::FromStr;
use std::time::Duration;

use safety_map_store_models::GeoPoint;

/// Runtime configuration for the API server, sourced from environment
/// variables with sensible defaults for local development.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub google_maps_api_key: Option<String>,
    pub default_center: GeoPoint,
    pub default_radius_km: f64,
    pub heatmap_point_limit: usize,
    pub geocode_cache_capacity: usize,
    pub geocode_cache_ttl: Option<Duration>,
    pub external_timeout: Duration,
    pub static_dir: String,
}

impl AppConfig {
    /// Reads configuration from the process environment. Unset or
    /// unparseable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let cache_ttl_secs: u64 = env_parsed("GEOCODE_CACHE_TTL_SECS", 0);

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parsed("PORT", 8080),
            google_maps_api_key: std::env::var("GOOGLE_MAPS_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            default_center: GeoPoint::new(
                env_parsed("DEFAULT_CENTER_LAT", 28.6139),
                env_parsed("DEFAULT_CENTER_LNG", 77.2090),
            ),
            default_radius_km: env_parsed("DEFAULT_RADIUS_KM", 5.0),
            heatmap_point_limit: env_parsed(
                "HEATMAP_POINT_LIMIT",
                safety_map_heatmap::DEFAULT_POINT_LIMIT,
            ),
            geocode_cache_capacity: env_parsed(
                "GEOCODE_CACHE_CAPACITY",
                safety_map_geocoder::service::DEFAULT_CACHE_CAPACITY,
            ),
            geocode_cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
            external_timeout: Duration::from_secs(env_parsed("EXTERNAL_TIMEOUT_SECS", 5)),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "frontend".to_string()),
        }
    }
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsed_falls_back_on_unset() {
        let port: u16 = env_parsed("SAFETY_MAP_TEST_UNSET_PORT", 8080);
        assert_eq!(port, 8080);

        let radius: f64 = env_parsed("SAFETY_MAP_TEST_UNSET_RADIUS", 5.0);
        assert!((radius - 5.0).abs() < f64::EPSILON);
    }
}
