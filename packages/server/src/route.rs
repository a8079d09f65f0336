use safety_map_server_models::{ApiRoutePoint, ApiSafeRoute};

/// Suggests a route between two points with per-segment safety scores.
///
/// Placeholder: a straight line through the midpoint with canned
/// segment scores, until a road-network router lands.
#[must_use]
pub fn suggest_route(
    start_lat: f64,
    start_lng: f64,
    end_lat: f64,
    end_lng: f64,
) -> ApiSafeRoute {
    let points = vec![
        ApiRoutePoint {
            latitude: start_lat,
            longitude: start_lng,
            safety_score: 85,
        },
        ApiRoutePoint {
            latitude: f64::midpoint(start_lat, end_lat),
            longitude: f64::midpoint(start_lng, end_lng),
            safety_score: 70,
        },
        ApiRoutePoint {
            latitude: end_lat,
            longitude: end_lng,
            safety_score: 90,
        },
    ];

    ApiSafeRoute {
        points,
        overall_safety_score: 85,
        distance_km: 2.5,
        duration_minutes: 15,
        warnings: vec![
            "Avoid dark alley near point 3".to_string(),
            "Well-lit route recommended".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_passes_through_midpoint() {
        let route = suggest_route(28.0, 77.0, 29.0, 78.0);

        assert_eq!(route.points.len(), 3);
        assert!((route.points[1].latitude - 28.5).abs() < 1e-9);
        assert!((route.points[1].longitude - 77.5).abs() < 1e-9);
        assert_eq!(route.points[0].safety_score, 85);
        assert_eq!(route.points[2].safety_score, 90);
    }

    #[test]
    fn route_carries_overall_score_and_warnings() {
        let route = suggest_route(28.6139, 77.2090, 28.6200, 77.2150);

        assert_eq!(route.overall_safety_score, 85);
        assert_eq!(route.duration_minutes, 15);
        assert_eq!(route.warnings.len(), 2);
        assert!(route.warnings[1].contains("Well-lit"));
    }
}
