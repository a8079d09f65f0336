#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report storage trait and the vote/verification state machine.
//!
//! The [`ReportStore`] trait is the seam between aggregation logic and
//! storage: handlers and the heatmap work against the trait, so the
//! in-memory implementation in [`memory`] can later be swapped for a
//! durable backend without touching either.

pub mod memory;
pub mod vote;

use async_trait::async_trait;
use safety_map_incident_models::VoteAction;
use safety_map_store_models::{GeoPoint, IncidentReport, ReportDraft, ReportId, VoteOutcome};

pub use memory::InMemoryReportStore;

/// Errors that can occur during report store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Submitted draft failed validation.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of what was rejected.
        message: String,
    },

    /// No report exists with the requested id.
    #[error("report {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: ReportId,
    },
}

/// Trait all report stores implement.
///
/// The store exclusively owns report records. Reads hand out cloned
/// snapshots; the only mutation paths are [`submit`](Self::submit) and
/// [`apply_vote`](Self::apply_vote), and neither can partially apply.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Stores a draft as a new report, assigning the next unique id, the
    /// server-side timestamp, and the initial vote/verification state
    /// (`verified = false`, zero votes, `PENDING`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the coordinates are not finite
    /// WGS84 values or the severity is outside 1-5. Out-of-range values are
    /// rejected, never clamped.
    async fn submit(&self, draft: ReportDraft) -> Result<IncidentReport, StoreError>;

    /// Returns a snapshot of the report with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids.
    async fn get_by_id(&self, id: ReportId) -> Result<IncidentReport, StoreError>;

    /// Returns snapshots of every report within `radius_km` geodesic
    /// kilometers of `center`, ordered by distance ascending (id ascending
    /// on ties), truncated to `limit` when one is given.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the in-memory store never fails here.
    async fn query_near(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: Option<usize>,
    ) -> Result<Vec<IncidentReport>, StoreError>;

    /// Applies a community vote to the report with the given id and runs
    /// the auto-verification rule (see [`vote::auto_verify`]).
    ///
    /// Votes on one report serialize; votes on different reports do not
    /// block each other. `verified` never reverts once set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids.
    async fn apply_vote(&self, id: ReportId, action: VoteAction) -> Result<VoteOutcome, StoreError>;
}
