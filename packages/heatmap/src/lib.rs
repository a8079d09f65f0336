#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Heatmap aggregation and safety scoring.
//!
//! Derives weighted point sets and scalar safety scores from radius
//! queries against a [`ReportStore`]. The point list respects the display
//! limit; the score always reflects the full matched population.

use chrono::{DateTime, Utc};
use safety_map_incident_models::{IncidentType, SafetyColor};
use safety_map_store::{ReportStore, StoreError};
use safety_map_store_models::{GeoPoint, IncidentReport};
use serde::{Deserialize, Serialize};

/// Multiplier from severity to heat intensity.
const SEVERITY_WEIGHT_FACTOR: u32 = 10;

/// Score penalty per point of average severity.
const SEVERITY_SCORE_PENALTY: f64 = 15.0;

/// Default cap on the number of points returned for rendering.
pub const DEFAULT_POINT_LIMIT: usize = 50;

/// A weighted geographic point for density rendering. Derived on demand,
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Where the underlying report sits.
    pub location: GeoPoint,
    /// Heat intensity, `severity * 10`.
    pub weight: u32,
    /// Incident category of the underlying report.
    pub incident_type: IncidentType,
}

impl From<&IncidentReport> for HeatmapPoint {
    fn from(report: &IncidentReport) -> Self {
        Self {
            location: report.location,
            weight: u32::from(report.severity.value()) * SEVERITY_WEIGHT_FACTOR,
            incident_type: report.incident_type,
        }
    }
}

/// Aggregated heatmap for one radius query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSummary {
    /// Query center.
    pub center: GeoPoint,
    /// Query radius in kilometers.
    pub radius_km: f64,
    /// Weighted points, capped at the display limit.
    pub points: Vec<HeatmapPoint>,
    /// Score over the FULL matched set, not just the returned points.
    pub safety_score: u8,
    /// Color band for the score.
    pub safety_color: SafetyColor,
    /// Total number of matched reports.
    pub report_count: usize,
}

/// Point-in-time safety summary for a circular zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyZone {
    /// Zone center.
    pub location: GeoPoint,
    /// Zone radius in meters.
    pub radius_meters: f64,
    /// Score over the reports inside the zone.
    pub safety_score: u8,
    /// Color band for the score.
    pub color_code: SafetyColor,
    /// When this summary was computed.
    pub last_updated: DateTime<Utc>,
    /// Number of reports inside the zone.
    pub active_report_count: usize,
}

/// Safety score for a matched report set.
///
/// An empty set scores 100 (no evidence of risk). Otherwise the score is
/// `100 - mean(severity) * 15`, truncated to an integer and clamped to
/// 0-100, so it only falls as average severity rises.
#[must_use]
pub fn safety_score(reports: &[IncidentReport]) -> u8 {
    if reports.is_empty() {
        return 100;
    }

    let total: u32 = reports.iter().map(|r| u32::from(r.severity.value())).sum();
    #[allow(clippy::cast_precision_loss)] // report counts stay far below 2^52
    let avg = f64::from(total) / reports.len() as f64;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0-100
    let score = (100.0 - avg * SEVERITY_SCORE_PENALTY).clamp(0.0, 100.0) as u8;
    score
}

/// Builds the heatmap for a radius query.
///
/// Pulls the full matched set, scores it, and returns at most `limit`
/// weighted points. The limit caps only the rendered points; the score and
/// report count cover everything the query matched.
///
/// # Errors
///
/// Propagates [`StoreError`] from the spatial query.
pub async fn compute_heatmap(
    store: &dyn ReportStore,
    center: GeoPoint,
    radius_km: f64,
    limit: usize,
) -> Result<HeatmapSummary, StoreError> {
    let reports = store.query_near(center, radius_km, None).await?;
    let score = safety_score(&reports);

    Ok(HeatmapSummary {
        center,
        radius_km,
        points: reports.iter().take(limit).map(HeatmapPoint::from).collect(),
        safety_score: score,
        safety_color: SafetyColor::from_score(f64::from(score)),
        report_count: reports.len(),
    })
}

/// Builds a point-in-time safety zone summary around `center`.
///
/// # Errors
///
/// Propagates [`StoreError`] from the spatial query.
pub async fn derive_safety_zone(
    store: &dyn ReportStore,
    center: GeoPoint,
    radius_km: f64,
) -> Result<SafetyZone, StoreError> {
    let reports = store.query_near(center, radius_km, None).await?;
    let score = safety_score(&reports);

    Ok(SafetyZone {
        location: center,
        radius_meters: radius_km * 1000.0,
        safety_score: score,
        color_code: SafetyColor::from_score(f64::from(score)),
        last_updated: Utc::now(),
        active_report_count: reports.len(),
    })
}
