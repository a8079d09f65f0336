//! Google Maps Geocoding API client.
//!
//! Primary provider when an API key is configured. Both directions use
//! the same endpoint: `latlng` for reverse lookups, `address` for
//! forward ones.
//!
//! See <https://developers.google.com/maps/documentation/geocoding>

use crate::{GeocodeError, GeocodeSource, PlaceSummary};
use safety_map_store_models::GeoPoint;

/// Address component types checked when picking a display name, most
/// specific first.
const NAME_PREFERENCE: &[&[&str]] = &[
    &["establishment", "point_of_interest", "premise"],
    &["route"],
    &["locality"],
];

/// Resolves coordinates to a place via the Google Geocoding API.
///
/// `result_type` is a pipe-separated filter restricting which address
/// types Google may return. Returns `Ok(None)` when Google reports no
/// result for the location.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the provider
/// rejects the request, or the response cannot be parsed.
pub async fn reverse(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    result_type: &str,
    latitude: f64,
    longitude: f64,
) -> Result<Option<PlaceSummary>, GeocodeError> {
    let latlng = format!("{latitude},{longitude}");
    let resp = client
        .get(base_url)
        .query(&[
            ("latlng", latlng.as_str()),
            ("key", api_key),
            ("result_type", result_type),
        ])
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = resp.json().await?;
    parse_reverse(&body)
}

/// Resolves a free-form place name to coordinates via the Google
/// Geocoding API.
///
/// Returns `Ok(None)` when Google reports no result for the query.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the provider
/// rejects the request, or the response cannot be parsed.
pub async fn forward(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    place: &str,
) -> Result<Option<GeoPoint>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[("address", place), ("key", api_key)])
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = resp.json().await?;
    parse_forward(&body)
}

/// Checks the payload-level status, which is separate from the HTTP
/// status: `"ZERO_RESULTS"` is a successful miss, anything else but
/// `"OK"` is a provider failure.
fn check_status(body: &serde_json::Value) -> Result<bool, GeocodeError> {
    match body["status"].as_str() {
        Some("OK") => Ok(true),
        Some("ZERO_RESULTS") => Ok(false),
        Some(other) => Err(GeocodeError::Upstream {
            message: other.to_string(),
        }),
        None => Err(GeocodeError::Parse {
            message: "Missing status in Google response".to_string(),
        }),
    }
}

/// Parses a Google reverse geocoding response.
fn parse_reverse(body: &serde_json::Value) -> Result<Option<PlaceSummary>, GeocodeError> {
    if !check_status(body)? {
        return Ok(None);
    }
    let Some(first) = body["results"].as_array().and_then(|r| r.first()) else {
        return Ok(None);
    };

    let full_address = first["formatted_address"].as_str().unwrap_or("").to_string();
    let place_name = preferred_component(first).unwrap_or_else(|| {
        full_address
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| "Unknown Location".to_string(), String::from)
    });

    Ok(Some(PlaceSummary {
        place_name,
        full_address,
        source: GeocodeSource::Google,
    }))
}

/// Parses a Google forward geocoding response.
fn parse_forward(body: &serde_json::Value) -> Result<Option<GeoPoint>, GeocodeError> {
    if !check_status(body)? {
        return Ok(None);
    }
    let Some(first) = body["results"].as_array().and_then(|r| r.first()) else {
        return Ok(None);
    };

    let location = &first["geometry"]["location"];
    let lat = location["lat"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Google response".to_string(),
    })?;
    let lng = location["lng"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "Missing lng in Google response".to_string(),
    })?;

    Ok(Some(GeoPoint::new(lat, lng)))
}

/// Picks the most specific named address component, if any.
fn preferred_component(result: &serde_json::Value) -> Option<String> {
    let components = result["address_components"].as_array()?;
    for wanted in NAME_PREFERENCE {
        for component in components {
            let matched = component["types"].as_array().is_some_and(|types| {
                types
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .any(|t| wanted.contains(&t))
            });
            if !matched {
                continue;
            }
            if let Some(name) = component["long_name"].as_str() {
                return Some(name.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_prefers_establishment_component() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Connaught Place, New Delhi, Delhi 110001, India",
                "address_components": [
                    {"long_name": "Delhi", "types": ["locality", "political"]},
                    {"long_name": "Central Park", "types": ["establishment", "park"]}
                ]
            }]
        });
        let place = parse_reverse(&body).unwrap().unwrap();
        assert_eq!(place.place_name, "Central Park");
        assert_eq!(place.source, GeocodeSource::Google);
    }

    #[test]
    fn reverse_falls_back_to_first_address_segment() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Connaught Place, New Delhi, Delhi 110001, India",
                "address_components": []
            }]
        });
        let place = parse_reverse(&body).unwrap().unwrap();
        assert_eq!(place.place_name, "Connaught Place");
        assert_eq!(
            place.full_address,
            "Connaught Place, New Delhi, Delhi 110001, India"
        );
    }

    #[test]
    fn reverse_zero_results_is_a_miss() {
        let body = serde_json::json!({"status": "ZERO_RESULTS", "results": []});
        assert!(parse_reverse(&body).unwrap().is_none());
    }

    #[test]
    fn rejected_status_is_an_upstream_error() {
        let body = serde_json::json!({"status": "REQUEST_DENIED", "results": []});
        let err = parse_reverse(&body).unwrap_err();
        assert!(matches!(err, GeocodeError::Upstream { .. }));
    }

    #[test]
    fn parses_forward_coordinates() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [{
                "geometry": {"location": {"lat": 28.6139, "lng": 77.2090}}
            }]
        });
        let point = parse_forward(&body).unwrap().unwrap();
        assert!((point.latitude - 28.6139).abs() < 1e-9);
        assert!((point.longitude - 77.2090).abs() < 1e-9);
    }

    #[test]
    fn forward_without_geometry_is_a_parse_error() {
        let body = serde_json::json!({"status": "OK", "results": [{}]});
        let err = parse_forward(&body).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }
}
