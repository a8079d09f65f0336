#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident taxonomy types and severity definitions.
//!
//! This crate defines the canonical incident type taxonomy used across the
//! safety-map system, the 1-5 severity scale, and the two score mappings
//! shared by every surface that renders a score: safety color bands and
//! risk levels.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity level for an incident, from 1 (minimal) to 5 (critical).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentSeverity {
    /// Level 1: Discomfort without immediate danger
    Minimal = 1,
    /// Level 2: Concerning but low-risk situations
    Low = 2,
    /// Level 3: Situations warranting real caution
    Moderate = 3,
    /// Level 4: Direct threats to personal safety
    High = 4,
    /// Level 5: Violent or life-threatening incidents
    Critical = 5,
}

impl IncidentSeverity {
    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minimal),
            2 => Ok(Self::Low),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::High),
            5 => Ok(Self::Critical),
            _ => Err(InvalidSeverityError { value }),
        }
    }
}

/// Error returned when attempting to create an [`IncidentSeverity`] from an
/// invalid numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Categories of safety incidents reported by users.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
    /// Verbal abuse, catcalling, or intimidating behavior
    #[default]
    Harassment,
    /// Being followed or persistently watched
    Stalking,
    /// Physical attack or attempted attack
    Assault,
    /// Property taken without force
    Theft,
    /// Property taken by force or threat
    Robbery,
    /// Area with inadequate street lighting
    PoorLighting,
    /// General unsafe conditions not tied to a specific event
    UnsafeArea,
    /// Incidents that don't fit any other category
    Other,
}

impl IncidentType {
    /// Returns all variants of this enum, in submission-form display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Harassment,
            Self::Stalking,
            Self::Assault,
            Self::Theft,
            Self::Robbery,
            Self::PoorLighting,
            Self::UnsafeArea,
            Self::Other,
        ]
    }
}

/// Lifecycle state of an incident report.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    /// Newly submitted, awaiting community review
    #[default]
    Pending,
    /// In active circulation on the map
    Active,
}

/// A community vote cast on an incident report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteAction {
    /// Confirms the report as accurate.
    #[serde(alias = "upvote")]
    Upvote,
    /// Disputes the report.
    #[serde(alias = "downvote")]
    Downvote,
}

/// Color band for rendering a safety score on the map.
///
/// This is the single shared mapping from scores to colors; heatmaps, safety
/// zones, and risk assessments all derive their color through it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyColor {
    /// Score 80-100
    Green,
    /// Score 60-79
    Yellow,
    /// Score 40-59
    Orange,
    /// Score below 40
    Red,
}

impl SafetyColor {
    /// Maps a safety score to its color band.
    ///
    /// Thresholds: `>= 80` green, `>= 60` yellow, `>= 40` orange, below that
    /// red. Boundary scores land in the band they open.
    #[must_use]
    pub const fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Green
        } else if score >= 60.0 {
            Self::Yellow
        } else if score >= 40.0 {
            Self::Orange
        } else {
            Self::Red
        }
    }
}

/// Risk level bucket for a predicted risk score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Risk score below 30
    Low,
    /// Risk score 30-59
    Moderate,
    /// Risk score 60-79
    High,
    /// Risk score 80 and above
    Critical,
}

impl RiskLevel {
    /// Maps a risk score to its level bucket.
    ///
    /// Thresholds: `< 30` low, `< 60` moderate, `< 80` high, otherwise
    /// critical. A score sitting exactly on a threshold belongs to the
    /// higher-risk bucket (30.0 is moderate, 80.0 is critical).
    #[must_use]
    pub const fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score < 60.0 {
            Self::Moderate
        } else if score < 80.0 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Returns the fixed advisory messages attached to this risk level.
    #[must_use]
    pub const fn advisories(self) -> &'static [&'static str] {
        match self {
            Self::Low => &["Area appears safe", "Normal precautions recommended"],
            Self::Moderate => &[
                "Exercise caution",
                "Stay in well-lit areas",
                "Share your location with trusted contacts",
            ],
            Self::High => &[
                "High risk area",
                "Avoid if possible",
                "Travel with a companion",
                "Keep emergency contacts ready",
            ],
            Self::Critical => &[
                "DANGER: Avoid this area",
                "Do not travel alone",
                "Call emergency services if needed",
                "Use the SOS feature",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_value_roundtrip() {
        for v in 1..=5u8 {
            let severity = IncidentSeverity::from_value(v).unwrap();
            assert_eq!(severity.value(), v);
        }
        assert!(IncidentSeverity::from_value(0).is_err());
        assert!(IncidentSeverity::from_value(6).is_err());
    }

    #[test]
    fn safety_color_band_boundaries() {
        assert_eq!(SafetyColor::from_score(100.0), SafetyColor::Green);
        assert_eq!(SafetyColor::from_score(80.0), SafetyColor::Green);
        assert_eq!(SafetyColor::from_score(79.0), SafetyColor::Yellow);
        assert_eq!(SafetyColor::from_score(60.0), SafetyColor::Yellow);
        assert_eq!(SafetyColor::from_score(59.0), SafetyColor::Orange);
        assert_eq!(SafetyColor::from_score(40.0), SafetyColor::Orange);
        assert_eq!(SafetyColor::from_score(39.0), SafetyColor::Red);
        assert_eq!(SafetyColor::from_score(0.0), SafetyColor::Red);
    }

    #[test]
    fn risk_level_boundaries_round_up() {
        assert_eq!(RiskLevel::from_score(29.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(59.9), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(60.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(79.9), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Critical);
    }

    #[test]
    fn every_risk_level_carries_advisories() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            assert!(!level.advisories().is_empty(), "{level:?} has no advisories");
        }
    }

    #[test]
    fn incident_type_defaults_to_harassment() {
        assert_eq!(IncidentType::default(), IncidentType::Harassment);
        assert!(IncidentType::all().contains(&IncidentType::default()));
    }
}
