//! Thread-safe in-memory report store.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use safety_map_incident_models::{IncidentSeverity, ReportStatus, VoteAction};
use safety_map_spatial::ReportIndex;
use safety_map_store_models::{GeoPoint, IncidentReport, ReportDraft, ReportId, VoteOutcome};

use crate::{ReportStore, StoreError, vote};

/// Mutable internals guarded by the store's outer lock.
struct StoreInner {
    next_id: ReportId,
    reports: BTreeMap<ReportId, Arc<RwLock<IncidentReport>>>,
    index: ReportIndex,
}

/// In-memory [`ReportStore`] backed by an id map and an R-tree.
///
/// The outer lock guards id assignment, the map, and the spatial index.
/// Each report body sits behind its own lock, so applying a vote to one
/// report never blocks votes on another; the read-increment-check-write
/// sequence runs entirely under that report's write lock, which rules out
/// lost counter updates. All lock acquisitions panic on poisoning.
pub struct InMemoryReportStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryReportStore {
    /// Creates an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                next_id: 1,
                reports: BTreeMap::new(),
                index: ReportIndex::new(),
            }),
        }
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(draft: &ReportDraft) -> Result<(GeoPoint, IncidentSeverity), StoreError> {
    let location =
        GeoPoint::try_new(draft.latitude, draft.longitude).map_err(|e| StoreError::Validation {
            message: e.to_string(),
        })?;
    let severity =
        IncidentSeverity::from_value(draft.severity).map_err(|e| StoreError::Validation {
            message: e.to_string(),
        })?;
    Ok((location, severity))
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn submit(&self, draft: ReportDraft) -> Result<IncidentReport, StoreError> {
        let (location, severity) = validate(&draft)?;

        let mut inner = self.inner.write().expect("store lock poisoned");
        let id = inner.next_id;
        inner.next_id += 1;

        let report = IncidentReport {
            id,
            user_id: draft.user_id,
            location,
            incident_type: draft.incident_type,
            severity,
            description: draft.description,
            reported_at: Utc::now(),
            verified: false,
            upvotes: 0,
            downvotes: 0,
            status: ReportStatus::Pending,
        };

        inner.index.insert(id, location);
        inner
            .reports
            .insert(id, Arc::new(RwLock::new(report.clone())));
        drop(inner);

        log::debug!(
            "Stored report {id} ({}) at ({}, {})",
            report.incident_type,
            location.latitude,
            location.longitude
        );
        Ok(report)
    }

    async fn get_by_id(&self, id: ReportId) -> Result<IncidentReport, StoreError> {
        let entry = {
            let inner = self.inner.read().expect("store lock poisoned");
            inner.reports.get(&id).cloned()
        };
        let entry = entry.ok_or(StoreError::NotFound { id })?;
        let report = entry.read().expect("report lock poisoned");
        Ok(report.clone())
    }

    async fn query_near(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: Option<usize>,
    ) -> Result<Vec<IncidentReport>, StoreError> {
        let inner = self.inner.read().expect("store lock poisoned");
        let matches = inner.index.within_radius(center, radius_km);

        let mut reports = Vec::with_capacity(matches.len());
        for (id, _) in matches {
            if let Some(entry) = inner.reports.get(&id) {
                reports.push(entry.read().expect("report lock poisoned").clone());
            }
        }
        drop(inner);

        if let Some(limit) = limit {
            reports.truncate(limit);
        }
        Ok(reports)
    }

    async fn apply_vote(
        &self,
        id: ReportId,
        action: VoteAction,
    ) -> Result<VoteOutcome, StoreError> {
        let entry = {
            let inner = self.inner.read().expect("store lock poisoned");
            inner.reports.get(&id).cloned()
        }
        .ok_or(StoreError::NotFound { id })?;

        let mut report = entry.write().expect("report lock poisoned");
        match action {
            VoteAction::Upvote => report.upvotes += 1,
            VoteAction::Downvote => report.downvotes += 1,
        }

        if !report.verified && vote::auto_verify(report.upvotes, report.downvotes) {
            report.verified = true;
            log::info!(
                "Report {id} auto-verified at {}/{} votes",
                report.upvotes,
                report.downvotes
            );
        }

        Ok(VoteOutcome {
            upvotes: report.upvotes,
            downvotes: report.downvotes,
            verified: report.verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use safety_map_incident_models::IncidentType;

    use super::*;

    fn draft(latitude: f64, longitude: f64, severity: u8) -> ReportDraft {
        ReportDraft {
            user_id: "tester".to_string(),
            latitude,
            longitude,
            incident_type: IncidentType::Harassment,
            severity,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn submit_assigns_increasing_ids_and_defaults() {
        let store = InMemoryReportStore::new();

        let first = store.submit(draft(28.6139, 77.2090, 3)).await.unwrap();
        let second = store.submit(draft(28.6140, 77.2091, 5)).await.unwrap();

        assert!(second.id > first.id);
        assert!(!first.verified);
        assert_eq!(first.upvotes, 0);
        assert_eq!(first.downvotes, 0);
        assert_eq!(first.status, ReportStatus::Pending);
        assert_eq!(first.severity, IncidentSeverity::Moderate);
        assert_eq!(second.severity, IncidentSeverity::Critical);
    }

    #[tokio::test]
    async fn submit_rejects_out_of_range_severity() {
        let store = InMemoryReportStore::new();

        for severity in [0, 6, 200] {
            let err = store
                .submit(draft(28.6139, 77.2090, severity))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Validation { .. }), "{err}");
        }
    }

    #[tokio::test]
    async fn submit_rejects_malformed_coordinates() {
        let store = InMemoryReportStore::new();

        for (lat, lng) in [(91.0, 0.0), (0.0, -181.0), (f64::NAN, 77.0)] {
            let err = store.submit(draft(lat, lng, 3)).await.unwrap_err();
            assert!(matches!(err, StoreError::Validation { .. }), "{err}");
        }
    }

    #[tokio::test]
    async fn get_by_id_unknown_is_not_found() {
        let store = InMemoryReportStore::new();

        let err = store.get_by_id(999).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 999 }));
    }

    #[tokio::test]
    async fn submitted_report_round_trips_through_zero_radius_query() {
        let store = InMemoryReportStore::new();
        let report = store.submit(draft(28.6139, 77.2090, 3)).await.unwrap();

        let found = store.query_near(report.location, 0.0, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, report.id);
    }

    #[tokio::test]
    async fn query_near_orders_by_distance_and_honors_limit() {
        let store = InMemoryReportStore::new();
        let center = GeoPoint::new(28.6139, 77.2090);

        let far = store.submit(draft(28.6539, 77.2090, 2)).await.unwrap();
        let near = store.submit(draft(28.6149, 77.2090, 4)).await.unwrap();
        // Outside a 10 km radius entirely.
        store.submit(draft(28.9139, 77.2090, 1)).await.unwrap();

        let all = store.query_near(center, 10.0, None).await.unwrap();
        assert_eq!(
            all.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![near.id, far.id]
        );

        let capped = store.query_near(center, 10.0, Some(1)).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].id, near.id);
    }

    #[tokio::test]
    async fn vote_on_unknown_report_is_not_found() {
        let store = InMemoryReportStore::new();

        let err = store.apply_vote(1, VoteAction::Upvote).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 1 }));
    }

    #[tokio::test]
    async fn five_clean_upvotes_verify_a_report() {
        let store = InMemoryReportStore::new();
        let report = store.submit(draft(28.6139, 77.2090, 3)).await.unwrap();

        store.apply_vote(report.id, VoteAction::Downvote).await.unwrap();
        store.apply_vote(report.id, VoteAction::Downvote).await.unwrap();

        let mut outcome = None;
        for _ in 0..5 {
            outcome = Some(store.apply_vote(report.id, VoteAction::Upvote).await.unwrap());
        }
        let outcome = outcome.unwrap();

        // 5 upvotes against 2 downvotes: 5 >= 5 and 5 > 4.
        assert_eq!(outcome.upvotes, 5);
        assert_eq!(outcome.downvotes, 2);
        assert!(outcome.verified);
    }

    #[tokio::test]
    async fn heavy_downvotes_block_auto_verification() {
        let store = InMemoryReportStore::new();
        let report = store.submit(draft(28.6139, 77.2090, 3)).await.unwrap();

        for _ in 0..3 {
            store.apply_vote(report.id, VoteAction::Downvote).await.unwrap();
        }
        let mut outcome = None;
        for _ in 0..5 {
            outcome = Some(store.apply_vote(report.id, VoteAction::Upvote).await.unwrap());
        }

        // 5 > 2*3 is false.
        assert!(!outcome.unwrap().verified);
    }

    #[tokio::test]
    async fn verification_never_reverts() {
        let store = InMemoryReportStore::new();
        let report = store.submit(draft(28.6139, 77.2090, 3)).await.unwrap();

        for _ in 0..5 {
            store.apply_vote(report.id, VoteAction::Upvote).await.unwrap();
        }
        assert!(store.get_by_id(report.id).await.unwrap().verified);

        for _ in 0..50 {
            let outcome = store.apply_vote(report.id, VoteAction::Downvote).await.unwrap();
            assert!(outcome.verified);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_upvotes_lose_no_updates() {
        let store = Arc::new(InMemoryReportStore::new());
        let report = store.submit(draft(28.6139, 77.2090, 3)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            let id = report.id;
            handles.push(tokio::spawn(async move {
                store.apply_vote(id, VoteAction::Upvote).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let report = store.get_by_id(report.id).await.unwrap();
        assert_eq!(report.upvotes, 50);
    }
}
