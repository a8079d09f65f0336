#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk prediction facade.
//!
//! Wraps an injected [`RiskModel`] with the assessment policy: a bounded
//! call time, score clamping, threshold level classification, advisory
//! copy, and the late-night score bump. The model sees the caller-supplied
//! hour; the night bump keys off the server's current hour.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, Timelike};
use safety_map_incident_models::{RiskLevel, SafetyColor};
use safety_map_store_models::{GeoPoint, IncidentReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(5);

/// Score added during night hours.
const NIGHT_RISK_BUMP: f64 = 15.0;

/// Advisory appended alongside the night bump.
const NIGHT_ADVISORY: &str = "Night travel increases risk";

/// Errors that can occur during risk assessment.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The model call exceeded the configured bound. There is no fallback
    /// model; this propagates to the caller.
    #[error("risk model timed out after {seconds}s")]
    Timeout {
        /// The bound that was exceeded, in seconds.
        seconds: u64,
    },

    /// The model itself failed.
    #[error("risk model failed: {message}")]
    Model {
        /// Description of what went wrong.
        message: String,
    },
}

/// Scoring function contract for risk models.
///
/// Implementations must be deterministic for identical inputs and return a
/// score in 0-100 (higher = riskier). Out-of-range scores are clamped by
/// the facade.
#[async_trait]
pub trait RiskModel: Send + Sync {
    /// Scores the risk around `location` for the given hour, using the
    /// matched report history.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::Model`] if scoring fails.
    async fn score(
        &self,
        location: GeoPoint,
        hour_of_day: u32,
        history: &[IncidentReport],
    ) -> Result<f64, PredictError>;
}

/// Deterministic history-driven baseline model.
///
/// Stands in where no trained classifier is wired up: risk grows with
/// report density and average severity around the location, with a flat
/// boost for evening and small hours. Always in range, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRiskModel;

#[async_trait]
impl RiskModel for HeuristicRiskModel {
    async fn score(
        &self,
        _location: GeoPoint,
        hour_of_day: u32,
        history: &[IncidentReport],
    ) -> Result<f64, PredictError> {
        #[allow(clippy::cast_precision_loss)] // capped at 20 first
        let count_term = history.len().min(20) as f64 * 2.0;

        let severity_term = if history.is_empty() {
            0.0
        } else {
            let total: u32 = history.iter().map(|r| u32::from(r.severity.value())).sum();
            #[allow(clippy::cast_precision_loss)] // report counts stay small
            let avg = f64::from(total) / history.len() as f64;
            avg * 8.0
        };

        let hour_term = if (18..=23).contains(&hour_of_day) || hour_of_day <= 4 {
            10.0
        } else {
            0.0
        };

        Ok((count_term + severity_term + hour_term).clamp(0.0, 100.0))
    }
}

/// A leveled risk assessment for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Final score, including any night bump, clamped to 0-100.
    pub score: f64,
    /// Level classified from the score BEFORE the night bump.
    pub level: RiskLevel,
    /// Color band of the final score.
    pub color: SafetyColor,
    /// Level advisories, plus the night advisory when the bump applied.
    pub suggestions: Vec<String>,
}

/// Policy wrapper around an injected [`RiskModel`].
#[derive(Clone)]
pub struct RiskAssessor {
    model: Arc<dyn RiskModel>,
    timeout: Duration,
}

impl RiskAssessor {
    /// Creates an assessor that bounds each model call to `timeout`.
    #[must_use]
    pub fn new(model: Arc<dyn RiskModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Assesses risk around `location`.
    ///
    /// `hour_of_day` feeds the model only. The night bump keys off the
    /// server's current local hour, not `hour_of_day`.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::Timeout`] if the model call exceeds the
    /// bound, or propagates the model's own failure.
    pub async fn assess(
        &self,
        location: GeoPoint,
        hour_of_day: u32,
        history: &[IncidentReport],
    ) -> Result<RiskAssessment, PredictError> {
        self.assess_at(location, hour_of_day, history, Local::now().hour())
            .await
    }

    /// [`assess`](Self::assess) with the wall-clock hour supplied, keeping
    /// both sides of the night branch reachable from tests.
    async fn assess_at(
        &self,
        location: GeoPoint,
        hour_of_day: u32,
        history: &[IncidentReport],
        current_hour: u32,
    ) -> Result<RiskAssessment, PredictError> {
        let scored = tokio::time::timeout(
            self.timeout,
            self.model.score(location, hour_of_day, history),
        )
        .await
        .map_err(|_| {
            log::warn!("Risk model exceeded {}s bound", self.timeout.as_secs());
            PredictError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        })??;

        Ok(finalize(scored, current_hour))
    }
}

/// Applies assessment policy to a raw model score.
///
/// Clamps, classifies the level, assembles advisories, then applies the
/// night bump. Ordering is load-bearing: the level reflects the pre-bump
/// score while the returned score and color are post-bump, so a night bump
/// can shift the color band without relabeling the level.
fn finalize(raw_score: f64, current_hour: u32) -> RiskAssessment {
    let score = raw_score.clamp(0.0, 100.0);
    let level = RiskLevel::from_score(score);

    let mut suggestions: Vec<String> = level
        .advisories()
        .iter()
        .map(ToString::to_string)
        .collect();

    let final_score = if is_night_hour(current_hour) {
        suggestions.push(NIGHT_ADVISORY.to_string());
        (score + NIGHT_RISK_BUMP).min(100.0)
    } else {
        score
    };

    RiskAssessment {
        score: final_score,
        level,
        color: SafetyColor::from_score(final_score),
        suggestions,
    }
}

/// Whether an hour (0-23) falls in the higher-risk night window, 20:00
/// through 05:59.
#[must_use]
pub const fn is_night_hour(hour: u32) -> bool {
    hour >= 20 || hour <= 5
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use safety_map_incident_models::{IncidentSeverity, IncidentType, ReportStatus};

    use super::*;

    struct FixedModel(f64);

    #[async_trait]
    impl RiskModel for FixedModel {
        async fn score(
            &self,
            _location: GeoPoint,
            _hour_of_day: u32,
            _history: &[IncidentReport],
        ) -> Result<f64, PredictError> {
            Ok(self.0)
        }
    }

    struct SleepyModel;

    #[async_trait]
    impl RiskModel for SleepyModel {
        async fn score(
            &self,
            _location: GeoPoint,
            _hour_of_day: u32,
            _history: &[IncidentReport],
        ) -> Result<f64, PredictError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(0.0)
        }
    }

    fn report(severity: u8) -> IncidentReport {
        IncidentReport {
            id: 1,
            user_id: "tester".to_string(),
            location: GeoPoint::new(28.6139, 77.2090),
            incident_type: IncidentType::Harassment,
            severity: IncidentSeverity::from_value(severity).unwrap(),
            description: String::new(),
            reported_at: Utc::now(),
            verified: false,
            upvotes: 0,
            downvotes: 0,
            status: ReportStatus::Pending,
        }
    }

    #[test]
    fn night_window_is_twenty_through_five() {
        for hour in [20, 21, 22, 23, 0, 1, 2, 3, 4, 5] {
            assert!(is_night_hour(hour), "hour {hour} should be night");
        }
        for hour in 6..20 {
            assert!(!is_night_hour(hour), "hour {hour} should be day");
        }
    }

    #[test]
    fn daytime_score_passes_through_unchanged() {
        let assessment = finalize(70.0, 12);

        assert!((assessment.score - 70.0).abs() < f64::EPSILON);
        assert_eq!(assessment.level, RiskLevel::High);
        assert_eq!(assessment.color, SafetyColor::Yellow);
        assert_eq!(assessment.suggestions.len(), RiskLevel::High.advisories().len());
    }

    #[test]
    fn night_bump_keeps_the_pre_bump_level() {
        let assessment = finalize(70.0, 22);

        // Score and color move with the bump; the level does not.
        assert!((assessment.score - 85.0).abs() < f64::EPSILON);
        assert_eq!(assessment.level, RiskLevel::High);
        assert_eq!(assessment.color, SafetyColor::Green);
        assert_eq!(
            assessment.suggestions.last().map(String::as_str),
            Some(NIGHT_ADVISORY)
        );
    }

    #[test]
    fn night_bump_clamps_at_one_hundred() {
        let assessment = finalize(95.0, 2);
        assert!((assessment.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(assessment.level, RiskLevel::Critical);
    }

    #[test]
    fn out_of_range_model_scores_are_clamped_before_classification() {
        assert_eq!(finalize(130.0, 12).level, RiskLevel::Critical);
        assert!((finalize(130.0, 12).score - 100.0).abs() < f64::EPSILON);
        assert_eq!(finalize(-10.0, 12).level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn assessor_times_out_slow_models() {
        let assessor = RiskAssessor::new(Arc::new(SleepyModel), Duration::from_millis(10));

        let err = assessor
            .assess(GeoPoint::new(0.0, 0.0), 12, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Timeout { .. }), "{err}");
    }

    #[tokio::test]
    async fn assessor_applies_policy_to_model_output() {
        let assessor = RiskAssessor::new(Arc::new(FixedModel(45.0)), DEFAULT_MODEL_TIMEOUT);

        let assessment = assessor
            .assess_at(GeoPoint::new(0.0, 0.0), 12, &[], 12)
            .await
            .unwrap();
        assert_eq!(assessment.level, RiskLevel::Moderate);
        assert!((assessment.score - 45.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn heuristic_is_deterministic_and_grows_with_history() {
        let model = HeuristicRiskModel;
        let location = GeoPoint::new(28.6139, 77.2090);
        let history: Vec<IncidentReport> = (0..4).map(|_| report(4)).collect();

        let quiet = model.score(location, 12, &[]).await.unwrap();
        let busy = model.score(location, 12, &history).await.unwrap();
        let busy_again = model.score(location, 12, &history).await.unwrap();

        assert!((busy - busy_again).abs() < f64::EPSILON);
        assert!(busy > quiet);
        assert!((0.0..=100.0).contains(&busy));
    }

    #[tokio::test]
    async fn heuristic_scores_evenings_above_midday() {
        let model = HeuristicRiskModel;
        let location = GeoPoint::new(28.6139, 77.2090);
        let history: Vec<IncidentReport> = (0..4).map(|_| report(3)).collect();

        let midday = model.score(location, 12, &history).await.unwrap();
        let evening = model.score(location, 21, &history).await.unwrap();
        assert!(evening > midday);
    }
}
