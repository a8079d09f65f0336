#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index over report positions.
//!
//! Backs the report store's radius queries: report positions go into an
//! R-tree, candidate lookup prunes by a padded degree envelope, and the
//! exact haversine distance decides membership. Distances are always true
//! geodesic kilometers, never degree thresholds.

use rstar::{AABB, RTree, RTreeObject};
use safety_map_store_models::{GeoPoint, ReportId};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude, used to pad query envelopes.
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// A report position stored in the R-tree.
struct PositionEntry {
    id: ReportId,
    /// `[longitude, latitude]`, matching the tree's x/y axes.
    position: [f64; 2],
}

impl RTreeObject for PositionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// R-tree index from report positions to report ids.
///
/// Positions are immutable once inserted; reports are never deleted, so the
/// index only grows.
pub struct ReportIndex {
    tree: RTree<PositionEntry>,
}

impl ReportIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Indexes a report position.
    pub fn insert(&mut self, id: ReportId, location: GeoPoint) {
        self.tree.insert(PositionEntry {
            id,
            position: [location.longitude, location.latitude],
        });
    }

    /// Number of indexed positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns `(id, distance_km)` for every report within `radius_km` of
    /// `center`, ordered by distance ascending with id ascending on ties.
    ///
    /// Candidates come from an envelope intersection padded to cover the
    /// radius; the haversine distance then filters exactly, so a report
    /// sitting precisely on the radius is included.
    #[must_use]
    pub fn within_radius(&self, center: GeoPoint, radius_km: f64) -> Vec<(ReportId, f64)> {
        let envelope = radius_envelope(center, radius_km);

        let mut matches: Vec<(ReportId, f64)> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|entry| {
                let position = GeoPoint::new(entry.position[1], entry.position[0]);
                let distance = haversine_km(center, position);
                (distance <= radius_km).then_some((entry.id, distance))
            })
            .collect();

        matches.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        matches
    }
}

impl Default for ReportIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Great-circle distance between two points in kilometers.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Degree-space bounding box guaranteed to contain every point within
/// `radius_km` of `center`.
///
/// Longitude padding widens with latitude (1 degree of longitude shrinks
/// toward the poles); the exact distance filter discards the corners this
/// over-covers.
fn radius_envelope(center: GeoPoint, radius_km: f64) -> AABB<[f64; 2]> {
    let lat_delta = radius_km / KM_PER_DEGREE_LAT;
    let lng_delta = (radius_km / (KM_PER_DEGREE_LAT * center.latitude.to_radians().cos())).abs();

    AABB::from_corners(
        [center.longitude - lng_delta, center.latitude - lat_delta],
        [center.longitude + lng_delta, center.latitude + lat_delta],
    )
}
