//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`].

use serde::Deserialize;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"google"`, `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service is active in the geocoding pipeline.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Execution order; lower values run first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Google Maps Geocoding API.
    GoogleMaps {
        /// API base URL (e.g., `"https://maps.googleapis.com/maps/api/geocode/json"`).
        base_url: String,
        /// Pipe-separated `result_type` filter sent with reverse lookups.
        result_type: String,
    },
    /// Nominatim / `OpenStreetMap` geocoder.
    Nominatim {
        /// API base URL (e.g., `"https://nominatim.openstreetmap.org"`).
        base_url: String,
        /// Reverse lookup zoom level (18 resolves to building level).
        #[serde(default = "default_zoom")]
        zoom: u8,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_zoom() -> u8 {
    18
}

impl GeocodingService {
    /// Returns the provider's base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::GoogleMaps { base_url, .. }
            | ProviderConfig::Nominatim { base_url, .. } => base_url,
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("google", include_str!("../services/google.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 2;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        let services = all_services();
        assert_eq!(services.len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn service_ids_are_unique() {
        let services = all_services();
        let mut seen = BTreeSet::new();
        for svc in &services {
            assert!(seen.insert(&svc.id), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn all_services_have_required_fields() {
        for svc in &all_services() {
            assert!(!svc.id.is_empty(), "Service has empty id");
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
            assert!(
                !svc.base_url().is_empty(),
                "Service {} has empty base_url",
                svc.id
            );
        }
    }

    #[test]
    fn google_runs_before_nominatim() {
        let services = enabled_services();
        for window in services.windows(2) {
            assert!(
                window[0].priority <= window[1].priority,
                "Services not sorted by priority: {} ({}) > {} ({})",
                window[0].id,
                window[0].priority,
                window[1].id,
                window[1].priority
            );
        }
        assert_eq!(services[0].id, "google");
    }
}
