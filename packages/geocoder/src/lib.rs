#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding facade for the safety map.
//!
//! Resolves coordinates to human-readable places (reverse) and place
//! names back to coordinates (forward) using a multi-provider strategy
//! configured via TOML files in `services/`:
//!
//! 1. **Google Maps Geocoding API** (priority 1): requires an API key;
//!    skipped when none is configured.
//! 2. **Nominatim / OpenStreetMap** (priority 2): free, no API key,
//!    rate limited on the public instance.
//!
//! Providers are loaded from the [`service_registry`] and tried in
//! priority order. A provider failure falls through to the next one;
//! reverse lookups that exhaust the chain produce a coordinate
//! placeholder instead of an error, so callers always get something
//! renderable. Results are memoized in bounded in-memory caches.

pub mod cache;
pub mod google;
pub mod nominatim;
pub mod service;
pub mod service_registry;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use service::{GeocoderConfig, GeocoderService, placeholder_summary};

/// A resolved place with display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSummary {
    /// Short display name (e.g., a road or locality).
    pub place_name: String,
    /// Full formatted address; empty for placeholder results.
    pub full_address: String,
    /// Which provider resolved this place.
    pub source: GeocodeSource,
}

/// Which geocoding provider resolved a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeSource {
    /// Google Maps Geocoding API.
    Google,
    /// Nominatim / `OpenStreetMap`.
    Nominatim,
    /// Coordinate placeholder produced after provider exhaustion.
    Fallback,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider did not answer within the request timeout.
    #[error("Geocoding request timed out after {seconds}s")]
    Timeout {
        /// Configured timeout that elapsed.
        seconds: u64,
    },

    /// Provider answered with a non-OK payload status.
    #[error("Provider rejected the request: {message}")]
    Upstream {
        /// Status or message reported by the provider.
        message: String,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// No provider produced a match.
    #[error("No match found")]
    NotFound,
}
