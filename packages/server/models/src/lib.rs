#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the safety map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the store's domain types to allow independent evolution of the
//! API contract.

use chrono::{DateTime, Utc};
use safety_map_emergency::{EmergencyContact, EmergencyEvent, EmergencyStatus};
use safety_map_geocoder::{GeocodeSource, PlaceSummary};
use safety_map_heatmap::{HeatmapPoint, HeatmapSummary, SafetyZone};
use safety_map_incident_models::{
    IncidentSeverity, IncidentType, ReportStatus, RiskLevel, SafetyColor, VoteAction,
};
use safety_map_predict::RiskAssessment;
use safety_map_store_models::{GeoPoint, IncidentReport, ReportId, VoteOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A numeric field that accepts either a JSON number or its string form.
///
/// Clients and query strings are lenient about coordinate types, so
/// every numeric input field goes through this before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericParam {
    /// Already numeric.
    Number(f64),
    /// Needs parsing.
    Text(String),
}

impl NumericParam {
    /// Returns the numeric value, parsing the string form if needed.
    #[must_use]
    pub fn parse(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Body of `POST /api/reports`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    /// Reporting user; anonymous when omitted.
    #[serde(default = "default_user")]
    pub user_id: String,
    /// Latitude.
    pub latitude: NumericParam,
    /// Longitude.
    pub longitude: NumericParam,
    /// Incident classification.
    #[serde(rename = "type", default)]
    pub incident_type: IncidentType,
    /// Severity value (1-5).
    #[serde(default = "default_severity")]
    pub severity: u8,
    /// Free-form details.
    #[serde(default)]
    pub description: String,
}

fn default_user() -> String {
    "anonymous".to_string()
}

const fn default_severity() -> u8 {
    3
}

/// An incident report as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReport {
    /// Unique report ID.
    pub id: ReportId,
    /// Reporting user.
    pub user_id: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Incident classification.
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    /// Severity level name.
    pub severity: IncidentSeverity,
    /// Severity numeric value (1-5).
    pub severity_value: u8,
    /// Free-form details.
    pub description: String,
    /// When the report was submitted (ISO 8601).
    pub reported_at: DateTime<Utc>,
    /// Whether community votes have verified the report.
    pub verified: bool,
    /// Supporting votes.
    pub upvotes: u32,
    /// Disputing votes.
    pub downvotes: u32,
    /// Lifecycle status.
    pub status: ReportStatus,
}

impl From<IncidentReport> for ApiReport {
    fn from(report: IncidentReport) -> Self {
        Self {
            id: report.id,
            user_id: report.user_id,
            latitude: report.location.latitude,
            longitude: report.location.longitude,
            incident_type: report.incident_type,
            severity: report.severity,
            severity_value: report.severity.value(),
            description: report.description,
            reported_at: report.reported_at,
            verified: report.verified,
            upvotes: report.upvotes,
            downvotes: report.downvotes,
            status: report.status,
        }
    }
}

/// Body of `POST /api/reports/{id}/vote`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    /// Whether the voter supports or disputes the report.
    pub action: VoteAction,
}

/// Vote tallies as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVoteResult {
    /// Supporting votes after the vote.
    pub upvotes: u32,
    /// Disputing votes after the vote.
    pub downvotes: u32,
    /// Whether the report is now verified.
    pub verified: bool,
}

impl From<VoteOutcome> for ApiVoteResult {
    fn from(outcome: VoteOutcome) -> Self {
        Self {
            upvotes: outcome.upvotes,
            downvotes: outcome.downvotes,
            verified: outcome.verified,
        }
    }
}

/// Query parameters for the heatmap endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQueryParams {
    /// Center latitude; server default when omitted.
    pub lat: Option<NumericParam>,
    /// Center longitude; server default when omitted.
    pub lng: Option<NumericParam>,
    /// Search radius in kilometers; server default when omitted.
    #[serde(alias = "radius")]
    pub radius_km: Option<NumericParam>,
    /// Maximum number of points to return.
    pub limit: Option<usize>,
}

/// Query parameters for the zone endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneQueryParams {
    /// Center latitude; server default when omitted.
    pub lat: Option<NumericParam>,
    /// Center longitude; server default when omitted.
    pub lng: Option<NumericParam>,
    /// Search radius in kilometers; server default when omitted.
    #[serde(alias = "radius")]
    pub radius_km: Option<NumericParam>,
}

/// A single weighted point in the heatmap response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHeatmapPoint {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Rendering weight derived from severity.
    pub weight: u32,
    /// Incident classification.
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
}

impl From<HeatmapPoint> for ApiHeatmapPoint {
    fn from(point: HeatmapPoint) -> Self {
        Self {
            latitude: point.location.latitude,
            longitude: point.location.longitude,
            weight: point.weight,
            incident_type: point.incident_type,
        }
    }
}

/// Heatmap response: weighted points plus the area's safety summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHeatmap {
    /// Queried center latitude.
    pub latitude: f64,
    /// Queried center longitude.
    pub longitude: f64,
    /// Queried radius in kilometers.
    pub radius_km: f64,
    /// Area safety score (0-100, higher is safer).
    pub safety_score: u8,
    /// Display color for the score.
    pub safety_color: SafetyColor,
    /// Number of reports contributing to the score.
    pub report_count: usize,
    /// Weighted points, capped at the requested limit.
    pub points: Vec<ApiHeatmapPoint>,
}

impl From<HeatmapSummary> for ApiHeatmap {
    fn from(summary: HeatmapSummary) -> Self {
        Self {
            latitude: summary.center.latitude,
            longitude: summary.center.longitude,
            radius_km: summary.radius_km,
            safety_score: summary.safety_score,
            safety_color: summary.safety_color,
            report_count: summary.report_count,
            points: summary
                .points
                .into_iter()
                .map(ApiHeatmapPoint::from)
                .collect(),
        }
    }
}

/// Safety zone response for map overlays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSafetyZone {
    /// Zone center latitude.
    pub latitude: f64,
    /// Zone center longitude.
    pub longitude: f64,
    /// Zone radius in meters.
    pub radius_meters: f64,
    /// Area safety score (0-100, higher is safer).
    pub safety_score: u8,
    /// Display color for the score.
    pub color_code: SafetyColor,
    /// When the zone was computed.
    pub last_updated: DateTime<Utc>,
    /// Number of reports inside the zone.
    pub active_report_count: usize,
}

impl From<SafetyZone> for ApiSafetyZone {
    fn from(zone: SafetyZone) -> Self {
        Self {
            latitude: zone.location.latitude,
            longitude: zone.location.longitude,
            radius_meters: zone.radius_meters,
            safety_score: zone.safety_score,
            color_code: zone.color_code,
            last_updated: zone.last_updated,
            active_report_count: zone.active_report_count,
        }
    }
}

/// Body of `POST /api/risk`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    /// Latitude of the location to assess.
    pub latitude: NumericParam,
    /// Longitude of the location to assess.
    pub longitude: NumericParam,
    /// Hour of day (0-23) the caller asks about; the current hour when
    /// omitted.
    pub time_of_day: Option<u32>,
}

/// Risk prediction as returned by the API.
///
/// The conversion stamps the current time as `assessed_at`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRiskAssessment {
    /// Risk score (0-100, higher is riskier).
    pub risk_score: f64,
    /// Risk bucket for the score.
    pub risk_level: RiskLevel,
    /// Display color derived from the risk score.
    pub safety_color: SafetyColor,
    /// Advisory strings for the risk level.
    pub suggestions: Vec<String>,
    /// When the assessment was made.
    pub assessed_at: DateTime<Utc>,
}

impl From<RiskAssessment> for ApiRiskAssessment {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            risk_score: assessment.score,
            risk_level: assessment.level,
            safety_color: assessment.color,
            suggestions: assessment.suggestions,
            assessed_at: Utc::now(),
        }
    }
}

/// Body of `POST /api/emergency/sos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosRequest {
    /// User triggering the alert; anonymous when omitted.
    #[serde(default = "default_user")]
    pub user_id: String,
    /// Latitude of the alert location.
    pub latitude: NumericParam,
    /// Longitude of the alert location.
    pub longitude: NumericParam,
}

/// An emergency contact as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContact {
    /// Contact label.
    pub name: String,
    /// Dialable number.
    pub number: String,
}

impl From<EmergencyContact> for ApiContact {
    fn from(contact: EmergencyContact) -> Self {
        Self {
            name: contact.name,
            number: contact.number,
        }
    }
}

/// An SOS broadcast as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEmergencyEvent {
    /// Unique event ID.
    pub event_id: Uuid,
    /// User who triggered the alert.
    pub user_id: String,
    /// Latitude of the alert location.
    pub latitude: f64,
    /// Longitude of the alert location.
    pub longitude: f64,
    /// When the alert was triggered.
    pub triggered_at: DateTime<Utc>,
    /// Alert lifecycle status.
    pub status: EmergencyStatus,
    /// Contacts that were notified.
    pub contacts_notified: Vec<ApiContact>,
}

impl From<EmergencyEvent> for ApiEmergencyEvent {
    fn from(event: EmergencyEvent) -> Self {
        Self {
            event_id: event.event_id,
            user_id: event.user_id,
            latitude: event.location.latitude,
            longitude: event.location.longitude,
            triggered_at: event.triggered_at,
            status: event.status,
            contacts_notified: event
                .contacts_notified
                .into_iter()
                .map(ApiContact::from)
                .collect(),
        }
    }
}

/// Response from the SOS endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSosResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The broadcast event.
    pub event: ApiEmergencyEvent,
}

/// Body of `POST /api/routes/safe`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Trip origin.
    pub start: RouteEndpoint,
    /// Trip destination.
    pub end: RouteEndpoint,
}

/// One end of a requested route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEndpoint {
    /// Latitude.
    pub latitude: NumericParam,
    /// Longitude.
    pub longitude: NumericParam,
}

/// A suggested route as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSafeRoute {
    /// Waypoints from origin to destination.
    pub points: Vec<ApiRoutePoint>,
    /// Overall route safety score (0-100, higher is safer).
    pub overall_safety_score: u8,
    /// Approximate length in kilometers.
    pub distance_km: f64,
    /// Approximate walking duration in minutes.
    pub duration_minutes: u32,
    /// Route-level warnings for the traveler.
    pub warnings: Vec<String>,
}

/// A single waypoint on a suggested route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRoutePoint {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Safety score of the segment around this point.
    pub safety_score: u8,
}

/// Query parameters for the reverse geocoding endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseGeocodeParams {
    /// Latitude to resolve.
    pub lat: NumericParam,
    /// Longitude to resolve.
    pub lng: NumericParam,
}

/// Query parameters for the forward geocoding endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardGeocodeParams {
    /// Free-form place name to resolve.
    pub place: String,
}

/// A resolved place as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlace {
    /// Queried latitude.
    pub latitude: f64,
    /// Queried longitude.
    pub longitude: f64,
    /// Short display name.
    pub place_name: String,
    /// Full formatted address; empty for placeholder results.
    pub full_address: String,
    /// Which provider resolved the place.
    pub source: GeocodeSource,
}

impl ApiPlace {
    /// Combines a resolved place with the coordinates it was queried at.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, place: PlaceSummary) -> Self {
        Self {
            latitude,
            longitude,
            place_name: place.place_name,
            full_address: place.full_address,
            source: place.source,
        }
    }
}

/// Coordinates as returned by the forward geocoding endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCoordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl From<GeoPoint> for ApiCoordinates {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_param_parses_both_forms() {
        assert_eq!(NumericParam::Number(28.6139).parse(), Some(28.6139));
        assert_eq!(NumericParam::Text(" 77.2090 ".to_string()).parse(), Some(77.2090));
        assert_eq!(NumericParam::Text("not a number".to_string()).parse(), None);
    }

    #[test]
    fn submit_request_accepts_string_coordinates() {
        let request: SubmitReportRequest = serde_json::from_value(serde_json::json!({
            "latitude": "28.6139",
            "longitude": 77.2090,
            "type": "THEFT",
            "severity": 4,
            "description": "Pickpocketing near the metro exit"
        }))
        .unwrap();
        assert_eq!(request.latitude.parse(), Some(28.6139));
        assert_eq!(request.longitude.parse(), Some(77.2090));
        assert_eq!(request.user_id, "anonymous");
        assert_eq!(request.incident_type, IncidentType::Theft);
    }

    #[test]
    fn submit_request_defaults() {
        let request: SubmitReportRequest = serde_json::from_value(serde_json::json!({
            "latitude": 28.6139,
            "longitude": 77.2090
        }))
        .unwrap();
        assert_eq!(request.severity, 3);
        assert_eq!(request.incident_type, IncidentType::Harassment);
        assert!(request.description.is_empty());
    }

    #[test]
    fn vote_request_accepts_lowercase_action() {
        let request: VoteRequest =
            serde_json::from_value(serde_json::json!({"action": "upvote"})).unwrap();
        assert_eq!(request.action, VoteAction::Upvote);
    }
}
