//! Nominatim / `OpenStreetMap` geocoder client.
//!
//! Fallback provider: free and keyless, but the public instance is
//! strictly rate limited (1 request per second).
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use crate::{GeocodeError, GeocodeSource, PlaceSummary};
use safety_map_store_models::GeoPoint;

/// Address keys checked when picking a display name, most specific
/// first.
const NAME_PREFERENCE: &[&str] = &[
    "amenity",
    "shop",
    "building",
    "road",
    "neighbourhood",
    "suburb",
    "village",
    "town",
    "city",
];

/// Resolves coordinates to a place via the Nominatim reverse endpoint.
///
/// Returns `Ok(None)` when Nominatim cannot geocode the location.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the rate limit is
/// exceeded, or the response cannot be parsed.
pub async fn reverse(
    client: &reqwest::Client,
    base_url: &str,
    zoom: u8,
    latitude: f64,
    longitude: f64,
) -> Result<Option<PlaceSummary>, GeocodeError> {
    let url = format!("{base_url}/reverse");
    let lat = latitude.to_string();
    let lon = longitude.to_string();
    let zoom = zoom.to_string();
    let resp = client
        .get(&url)
        .query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("format", "json"),
            ("zoom", zoom.as_str()),
            ("addressdetails", "1"),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::Upstream {
            message: "Nominatim rate limit exceeded".to_string(),
        });
    }

    let body: serde_json::Value = resp.error_for_status()?.json().await?;
    parse_reverse(&body)
}

/// Resolves a free-form place name to coordinates via the Nominatim
/// search endpoint.
///
/// Returns `Ok(None)` when the query has no match.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the rate limit is
/// exceeded, or the response cannot be parsed.
pub async fn forward(
    client: &reqwest::Client,
    base_url: &str,
    place: &str,
) -> Result<Option<GeoPoint>, GeocodeError> {
    let url = format!("{base_url}/search");
    let resp = client
        .get(&url)
        .query(&[("q", place), ("format", "json"), ("limit", "1")])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::Upstream {
            message: "Nominatim rate limit exceeded".to_string(),
        });
    }

    let body: serde_json::Value = resp.error_for_status()?.json().await?;
    parse_forward(&body)
}

/// Parses a Nominatim reverse response.
fn parse_reverse(body: &serde_json::Value) -> Result<Option<PlaceSummary>, GeocodeError> {
    if !body.is_object() {
        return Err(GeocodeError::Parse {
            message: "Nominatim reverse response is not an object".to_string(),
        });
    }
    // {"error": "Unable to geocode"} is a miss, not a failure.
    if body.get("error").is_some() {
        return Ok(None);
    }

    let Some(display_name) = body["display_name"].as_str().filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let place_name = preferred_component(&body["address"])
        .unwrap_or_else(|| "Unknown Location".to_string());

    Ok(Some(PlaceSummary {
        place_name,
        full_address: display_name.to_string(),
        source: GeocodeSource::Nominatim,
    }))
}

/// Parses a Nominatim search response.
fn parse_forward(body: &serde_json::Value) -> Result<Option<GeoPoint>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim search response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some(GeoPoint::new(lat, lon)))
}

/// Picks the most specific named address key, if any.
fn preferred_component(address: &serde_json::Value) -> Option<String> {
    NAME_PREFERENCE
        .iter()
        .find_map(|key| address[*key].as_str().map(String::from))
}
