#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report record types owned by the report store.
//!
//! These are the domain shapes held in memory by the store: submitted
//! drafts, stored reports, geographic points, and vote outcomes. They are
//! distinct from the API response types in `safety_map_server_models`.

use chrono::{DateTime, Utc};
use safety_map_incident_models::{IncidentSeverity, IncidentType, ReportStatus};
use serde::{Deserialize, Serialize};

/// Unique identifier assigned to a stored report.
pub type ReportId = u64;

/// A geographic point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point without validating the coordinates.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Creates a point, validating that both coordinates are finite and
    /// within WGS84 range.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is non-finite, latitude is
    /// outside [-90, 90], or longitude is outside [-180, 180].
    pub const fn try_new(latitude: f64, longitude: f64) -> Result<Self, InvalidLocationError> {
        if latitude.is_finite()
            && longitude.is_finite()
            && latitude >= -90.0
            && latitude <= 90.0
            && longitude >= -180.0
            && longitude <= 180.0
        {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidLocationError {
                latitude,
                longitude,
            })
        }
    }
}

/// Error returned when coordinates fall outside WGS84 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidLocationError {
    /// The latitude that was provided.
    pub latitude: f64,
    /// The longitude that was provided.
    pub longitude: f64,
}

impl std::fmt::Display for InvalidLocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid location ({}, {}): latitude must be finite in [-90, 90] and longitude finite in [-180, 180]",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for InvalidLocationError {}

/// An incident report as held by the store.
///
/// The store exclusively owns these records; other components receive
/// cloned snapshots and mutate vote state only through the store's vote
/// entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    /// Unique, monotonically assigned identifier.
    pub id: ReportId,
    /// Reporting user. No ownership is enforced on this reference.
    pub user_id: String,
    /// Where the incident happened.
    pub location: GeoPoint,
    /// Incident category from the canonical taxonomy.
    pub incident_type: IncidentType,
    /// Severity level (1-5).
    pub severity: IncidentSeverity,
    /// Free-text description, possibly empty.
    pub description: String,
    /// Server-side creation time. Immutable after creation.
    pub reported_at: DateTime<Utc>,
    /// Whether community votes promoted this report. Transitions
    /// false to true exactly once and never reverts.
    pub verified: bool,
    /// Number of confirming votes.
    pub upvotes: u32,
    /// Number of disputing votes.
    pub downvotes: u32,
    /// Lifecycle state.
    pub status: ReportStatus,
}

/// A submitted report before the store assigns identity and defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    /// Reporting user.
    pub user_id: String,
    /// Latitude in degrees, unvalidated.
    pub latitude: f64,
    /// Longitude in degrees, unvalidated.
    pub longitude: f64,
    /// Incident category.
    pub incident_type: IncidentType,
    /// Severity as supplied by the caller, validated on submit.
    pub severity: u8,
    /// Free-text description.
    pub description: String,
}

/// Counter and verification state after a vote has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    /// Confirming vote count after the vote.
    pub upvotes: u32,
    /// Disputing vote count after the vote.
    pub downvotes: u32,
    /// Verification state after the vote.
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_accepts_wgs84_range() {
        assert!(GeoPoint::try_new(28.6139, 77.2090).is_ok());
        assert!(GeoPoint::try_new(90.0, 180.0).is_ok());
        assert!(GeoPoint::try_new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::try_new(0.0, 0.0).is_ok());
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(GeoPoint::try_new(90.1, 0.0).is_err());
        assert!(GeoPoint::try_new(-90.1, 0.0).is_err());
        assert!(GeoPoint::try_new(0.0, 180.1).is_err());
        assert!(GeoPoint::try_new(0.0, -180.1).is_err());
    }

    #[test]
    fn try_new_rejects_non_finite() {
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::try_new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::try_new(f64::NEG_INFINITY, f64::NAN).is_err());
    }
}
