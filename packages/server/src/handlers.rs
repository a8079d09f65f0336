//! HTTP handler functions for the safety map API.

use actix_web::{HttpResponse, web};
use chrono::Timelike as _;
use safety_map_emergency::EmergencyError;
use safety_map_heatmap::{compute_heatmap, derive_safety_zone};
use safety_map_incident_models::IncidentType;
use safety_map_predict::PredictError;
use safety_map_server_models::{
    ApiContact, ApiCoordinates, ApiEmergencyEvent, ApiHealth, ApiHeatmap, ApiPlace, ApiReport,
    ApiRiskAssessment, ApiSafetyZone, ApiSosResponse, ApiVoteResult, ForwardGeocodeParams,
    HeatmapQueryParams, NumericParam, ReverseGeocodeParams, RiskRequest, RouteRequest, SosRequest,
    SubmitReportRequest, VoteRequest, ZoneQueryParams,
};
use safety_map_store::StoreError;
use safety_map_store_models::{GeoPoint, ReportDraft, ReportId};
use tokio::sync::broadcast::error::RecvError;

use crate::config::AppConfig;
use crate::events::{self, LiveEvent};
use crate::{AppState, route};

/// Radius of the report history pulled for a risk assessment, in
/// kilometers.
const HISTORY_RADIUS_KM: f64 = 1.0;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/incident-types`
///
/// Returns the incident type tags in their canonical order.
pub async fn incident_types() -> HttpResponse {
    HttpResponse::Ok().json(IncidentType::all())
}

/// `POST /api/reports`
///
/// Submits a new incident report and broadcasts it to alert streams.
pub async fn submit_report(
    state: web::Data<AppState>,
    request: web::Json<SubmitReportRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    let Some(latitude) = request.latitude.parse() else {
        return bad_request("latitude must be a number");
    };
    let Some(longitude) = request.longitude.parse() else {
        return bad_request("longitude must be a number");
    };

    let draft = ReportDraft {
        user_id: request.user_id,
        latitude,
        longitude,
        incident_type: request.incident_type,
        severity: request.severity,
        description: request.description,
    };

    match state.store.submit(draft).await {
        Ok(report) => {
            let api = ApiReport::from(report);
            state.events.publish(LiveEvent::ReportCreated(api.clone()));
            HttpResponse::Created().json(api)
        }
        Err(e) => store_error_response(&e),
    }
}

/// `GET /api/reports/{id}`
pub async fn get_report(state: web::Data<AppState>, path: web::Path<ReportId>) -> HttpResponse {
    match state.store.get_by_id(path.into_inner()).await {
        Ok(report) => HttpResponse::Ok().json(ApiReport::from(report)),
        Err(e) => store_error_response(&e),
    }
}

/// `POST /api/reports/{id}/vote`
///
/// Applies a community vote and returns the updated tallies.
pub async fn vote_on_report(
    state: web::Data<AppState>,
    path: web::Path<ReportId>,
    request: web::Json<VoteRequest>,
) -> HttpResponse {
    let action = request.into_inner().action;
    match state.store.apply_vote(path.into_inner(), action).await {
        Ok(outcome) => HttpResponse::Ok().json(ApiVoteResult::from(outcome)),
        Err(e) => store_error_response(&e),
    }
}

/// `GET /api/heatmap`
///
/// Returns weighted points and the area safety score for a radius query.
/// Center and radius default from configuration when omitted.
pub async fn heatmap(
    state: web::Data<AppState>,
    params: web::Query<HeatmapQueryParams>,
) -> HttpResponse {
    let Some(center) = area_center(params.lat.as_ref(), params.lng.as_ref(), &state.config) else {
        return bad_request("lat and lng must be numbers");
    };
    let Some(radius_km) = resolve_param(params.radius_km.as_ref(), state.config.default_radius_km)
    else {
        return bad_request("radiusKm must be a number");
    };
    let limit = params.limit.unwrap_or(state.config.heatmap_point_limit);

    match compute_heatmap(state.store.as_ref(), center, radius_km, limit).await {
        Ok(summary) => HttpResponse::Ok().json(ApiHeatmap::from(summary)),
        Err(e) => store_error_response(&e),
    }
}

/// `GET /api/zone`
///
/// Returns the safety zone summary around a point.
pub async fn zone(state: web::Data<AppState>, params: web::Query<ZoneQueryParams>) -> HttpResponse {
    let Some(center) = area_center(params.lat.as_ref(), params.lng.as_ref(), &state.config) else {
        return bad_request("lat and lng must be numbers");
    };
    let Some(radius_km) = resolve_param(params.radius_km.as_ref(), state.config.default_radius_km)
    else {
        return bad_request("radiusKm must be a number");
    };

    match derive_safety_zone(state.store.as_ref(), center, radius_km).await {
        Ok(zone) => HttpResponse::Ok().json(ApiSafetyZone::from(zone)),
        Err(e) => store_error_response(&e),
    }
}

/// `POST /api/risk`
///
/// Predicts the risk level around a location, feeding the model the
/// requested hour (or the current one) and the nearby report history.
pub async fn assess_risk(
    state: web::Data<AppState>,
    request: web::Json<RiskRequest>,
) -> HttpResponse {
    let Some(latitude) = request.latitude.parse() else {
        return bad_request("latitude must be a number");
    };
    let Some(longitude) = request.longitude.parse() else {
        return bad_request("longitude must be a number");
    };
    let location = GeoPoint::new(latitude, longitude);
    let hour = request
        .time_of_day
        .unwrap_or_else(|| chrono::Local::now().hour());

    let history = match state
        .store
        .query_near(location, HISTORY_RADIUS_KM, None)
        .await
    {
        Ok(history) => history,
        Err(e) => return store_error_response(&e),
    };

    match state.assessor.assess(location, hour, &history).await {
        Ok(assessment) => HttpResponse::Ok().json(ApiRiskAssessment::from(assessment)),
        Err(e) => predict_error_response(&e),
    }
}

/// `POST /api/emergency/sos`
///
/// Triggers an SOS event, broadcasts it to alert streams, and returns
/// the confirmation with the notified contacts.
pub async fn trigger_sos(
    state: web::Data<AppState>,
    request: web::Json<SosRequest>,
) -> HttpResponse {
    let Some(latitude) = request.latitude.parse() else {
        return bad_request("latitude must be a number");
    };
    let Some(longitude) = request.longitude.parse() else {
        return bad_request("longitude must be a number");
    };

    match state
        .coordinator
        .trigger_sos(&request.user_id, latitude, longitude)
    {
        Ok(event) => {
            let api = ApiEmergencyEvent::from(event);
            state.events.publish(LiveEvent::EmergencyAlert(api.clone()));
            HttpResponse::Ok().json(ApiSosResponse {
                message: "SOS activated! Help is on the way.".to_string(),
                event: api,
            })
        }
        Err(EmergencyError::Validation { message }) => bad_request(&message),
    }
}

/// `GET /api/emergency/contacts`
///
/// Returns the full ordered emergency contact directory.
pub async fn emergency_contacts(state: web::Data<AppState>) -> HttpResponse {
    let contacts: Vec<ApiContact> = state
        .coordinator
        .contacts()
        .iter()
        .cloned()
        .map(ApiContact::from)
        .collect();
    HttpResponse::Ok().json(contacts)
}

/// `POST /api/routes/safe`
///
/// Suggests a route between two points with per-segment safety scores.
pub async fn safe_route(request: web::Json<RouteRequest>) -> HttpResponse {
    let (Some(start_lat), Some(start_lng)) = (
        request.start.latitude.parse(),
        request.start.longitude.parse(),
    ) else {
        return bad_request("start coordinates must be numbers");
    };
    let (Some(end_lat), Some(end_lng)) =
        (request.end.latitude.parse(), request.end.longitude.parse())
    else {
        return bad_request("end coordinates must be numbers");
    };

    HttpResponse::Ok().json(route::suggest_route(start_lat, start_lng, end_lat, end_lng))
}

/// `GET /api/geocode/reverse`
///
/// Resolves coordinates to a place summary. Provider failures produce a
/// coordinate placeholder, never an error response.
pub async fn reverse_geocode(
    state: web::Data<AppState>,
    params: web::Query<ReverseGeocodeParams>,
) -> HttpResponse {
    let (Some(latitude), Some(longitude)) = (params.lat.parse(), params.lng.parse()) else {
        return bad_request("lat and lng must be numbers");
    };

    let place = state.geocoder.reverse(latitude, longitude).await;
    HttpResponse::Ok().json(ApiPlace::new(latitude, longitude, place))
}

/// `GET /api/geocode/forward`
///
/// Resolves a place name to coordinates, or 404 when nothing matches.
pub async fn forward_geocode(
    state: web::Data<AppState>,
    params: web::Query<ForwardGeocodeParams>,
) -> HttpResponse {
    match state.geocoder.forward(&params.place).await {
        Ok(point) => HttpResponse::Ok().json(ApiCoordinates::from(point)),
        Err(e) => {
            log::debug!("Forward geocode found nothing for '{}': {e}", params.place);
            HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("No match found for '{}'", params.place)
            }))
        }
    }
}

/// `GET /api/alerts/stream`
///
/// Server-sent events stream of live report and emergency alerts.
/// Lagged subscribers skip the events they missed and continue.
pub async fn alerts_stream(state: web::Data<AppState>) -> HttpResponse {
    let mut receiver = state.events.subscribe();
    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    yield Ok::<_, actix_web::Error>(web::Bytes::from(events::sse_frame(&event)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!("Alert stream subscriber lagged, skipped {skipped} event(s)");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"error": message}))
}

fn store_error_response(error: &StoreError) -> HttpResponse {
    match error {
        StoreError::Validation { message } => {
            log::debug!("Rejected report submission: {message}");
            bad_request(message)
        }
        StoreError::NotFound { id } => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Report {id} not found")
        })),
    }
}

fn predict_error_response(error: &PredictError) -> HttpResponse {
    log::error!("Risk assessment failed: {error}");
    match error {
        PredictError::Timeout { .. } => HttpResponse::GatewayTimeout().json(serde_json::json!({
            "error": "Risk assessment timed out"
        })),
        PredictError::Model { .. } => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Risk assessment failed"
            }))
        }
    }
}

/// Resolves an optional lenient numeric parameter. Absent means the
/// default; present but non-numeric means `None`.
fn resolve_param(param: Option<&NumericParam>, default: f64) -> Option<f64> {
    param.map_or(Some(default), NumericParam::parse)
}

/// Resolves the query center, defaulting each omitted axis from
/// configuration independently.
fn area_center(
    lat: Option<&NumericParam>,
    lng: Option<&NumericParam>,
    config: &AppConfig,
) -> Option<GeoPoint> {
    let latitude = resolve_param(lat, config.default_center.latitude)?;
    let longitude = resolve_param(lng, config.default_center.longitude)?;
    Some(GeoPoint::new(latitude, longitude))
}
