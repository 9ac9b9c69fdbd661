use crate::algorithms::geodetic;
use crate::core::{GeoFix, LocalPosition, Translation, SCENE_LIMIT_M, SUPERSEDE_RADIUS_M};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A fix paired with the viewer's scene position at the moment it arrived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationEstimate {
    pub fix: GeoFix,
    pub position: LocalPosition,
}

impl LocationEstimate {
    pub fn new(fix: GeoFix, position: LocalPosition) -> Self {
        Self { fix, position }
    }

    /// Geodetic offset from this estimate's position to `position`
    pub fn translation_to(&self, position: &LocalPosition) -> Translation {
        Translation {
            latitude_translation: self.position.z - position.z,
            longitude_translation: position.x - self.position.x,
            altitude_translation: position.y - self.position.y,
        }
    }

    /// Location of a scene position, reprojected from this estimate's fix
    pub fn translated_location(&self, position: &LocalPosition) -> GeoFix {
        self.fix.translated(&self.translation_to(position))
    }

    /// Preference order: tighter accuracy first, then newer fix
    pub fn preference(&self, other: &Self) -> Ordering {
        self.fix
            .horizontal_accuracy
            .total_cmp(&other.fix.horizontal_accuracy)
            .then_with(|| other.fix.timestamp_ms.cmp(&self.fix.timestamp_ms))
    }

    /// True when `older` was taken at the same ground position and can never
    /// again be preferred over this estimate
    pub fn supersedes(&self, older: &Self) -> bool {
        geodetic::radius_contains(&self.position, SUPERSEDE_RADIUS_M, &older.position)
            && self.fix.horizontal_accuracy <= older.fix.horizontal_accuracy
            && self.fix.timestamp_ms >= older.fix.timestamp_ms
    }
}

/// Rolling set of location estimates bounded by a ground-plane radius
#[derive(Debug, Clone)]
pub struct LocationEstimateStore {
    estimates: Vec<LocationEstimate>,
    radius_m: f64,
}

impl Default for LocationEstimateStore {
    fn default() -> Self {
        Self::with_radius(SCENE_LIMIT_M)
    }
}

impl LocationEstimateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a custom eviction radius (meters)
    pub fn with_radius(radius_m: f64) -> Self {
        Self {
            estimates: Vec::new(),
            radius_m,
        }
    }

    /// Record `fix` at the current viewer position.
    ///
    /// Returns `None` without storing anything while the tracking frame is
    /// not established.
    pub fn add_estimate(
        &mut self,
        fix: GeoFix,
        current_position: Option<LocalPosition>,
    ) -> Option<&LocationEstimate> {
        self.insert_estimate(fix, current_position)?;
        self.estimates.last()
    }

    /// [`add_estimate`](Self::add_estimate) returning the new estimate and
    /// every older estimate it superseded.
    ///
    /// An estimate is superseded when the new one sits at the same ground
    /// position with equal-or-tighter accuracy and an equal-or-newer
    /// timestamp; it could never again be preferred over the new one.
    pub fn insert_estimate(
        &mut self,
        fix: GeoFix,
        current_position: Option<LocalPosition>,
    ) -> Option<(LocationEstimate, Vec<LocationEstimate>)> {
        let position = current_position?;
        let estimate = LocationEstimate::new(fix, position);

        let (superseded, kept): (Vec<_>, Vec<_>) = self
            .estimates
            .drain(..)
            .partition(|existing| estimate.supersedes(existing));
        self.estimates = kept;
        self.estimates.push(estimate);

        log::trace!(
            "Added estimate ({:.6}, {:.6}) ±{:.1} m at scene ({:.2}, {:.2}, {:.2}), {} superseded, {} held",
            fix.latitude(),
            fix.longitude(),
            fix.horizontal_accuracy,
            position.x,
            position.y,
            position.z,
            superseded.len(),
            self.estimates.len()
        );
        Some((estimate, superseded))
    }

    /// Drop every estimate outside the radius around `current_position`.
    ///
    /// Returns the evicted estimates in insertion order.
    pub fn evict_stale(&mut self, current_position: &LocalPosition) -> Vec<LocationEstimate> {
        let radius = self.radius_m;
        let (kept, evicted): (Vec<_>, Vec<_>) = self
            .estimates
            .drain(..)
            .partition(|estimate| geodetic::radius_contains(current_position, radius, &estimate.position));
        self.estimates = kept;

        if !evicted.is_empty() {
            log::debug!(
                "Evicted {} stale estimates, {} remain",
                evicted.len(),
                self.estimates.len()
            );
        }
        evicted
    }

    /// Most trusted estimate, `None` when the store is empty
    pub fn best_estimate(&self) -> Option<&LocationEstimate> {
        self.estimates.iter().min_by(|a, b| a.preference(b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationEstimate> {
        self.estimates.iter()
    }

    pub fn as_slice(&self) -> &[LocationEstimate] {
        &self.estimates
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoPoint;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn fix(accuracy: f64, timestamp_ms: u64) -> GeoFix {
        GeoFix::new(GeoPoint::new(48.8584, 2.2945, 35.0), accuracy, timestamp_ms)
    }

    #[test]
    fn test_add_requires_tracking() {
        let mut store = LocationEstimateStore::new();

        assert!(store.add_estimate(fix(5.0, 1), None).is_none());
        assert!(store.is_empty());

        let added = store.add_estimate(fix(5.0, 2), Some(Vector3::new(1.0, 0.0, 2.0)));
        assert_eq!(added.map(|e| e.fix.timestamp_ms), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_best_estimate_prefers_accuracy() {
        let candidates = [
            (fix(2.0, 3), Vector3::new(0.0, 0.0, 0.0)),
            (fix(5.0, 1), Vector3::new(5.0, 0.0, 0.0)),
            (fix(5.0, 2), Vector3::new(0.0, 0.0, -5.0)),
        ];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

        // Insertion order must not matter
        for order in orders {
            let mut store = LocationEstimateStore::new();
            for index in order {
                let (fix, position) = candidates[index];
                store.add_estimate(fix, Some(position));
            }

            assert_eq!(store.len(), 3);
            let best = store.best_estimate().unwrap();
            assert_eq!(best.fix.horizontal_accuracy, 2.0, "order {:?}", order);
            assert_eq!(best.fix.timestamp_ms, 3, "order {:?}", order);
        }
    }

    #[test]
    fn test_best_estimate_breaks_ties_by_recency() {
        let candidates = [
            (fix(3.0, 20), Vector3::new(0.0, 0.0, 0.0)),
            (fix(3.0, 10), Vector3::new(0.0, 0.0, -5.0)),
        ];

        for order in [[0, 1], [1, 0]] {
            let mut store = LocationEstimateStore::new();
            for index in order {
                let (fix, position) = candidates[index];
                store.add_estimate(fix, Some(position));
            }

            assert_eq!(store.best_estimate().unwrap().fix.timestamp_ms, 20, "order {:?}", order);
        }
    }

    #[test]
    fn test_stationary_viewer_keeps_one_estimate() {
        let mut store = LocationEstimateStore::new();
        let here = Some(Vector3::new(3.0, 1.5, -4.0));

        for timestamp in 0..5_000 {
            store.add_estimate(fix(5.0, timestamp), here);
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.best_estimate().unwrap().fix.timestamp_ms, 4_999);
    }

    #[test]
    fn test_insert_reports_superseded_estimates() {
        let mut store = LocationEstimateStore::new();
        let here = Vector3::new(0.0, 0.0, 0.0);

        store.add_estimate(fix(8.0, 1), Some(here));
        store.add_estimate(fix(4.0, 2), Some(Vector3::new(0.0, 0.0, -20.0)));

        // Height is ignored when matching ground positions
        let (added, superseded) = store
            .insert_estimate(fix(6.0, 3), Some(here + Vector3::new(0.0, 2.0, 0.0)))
            .unwrap();

        assert_eq!(added.fix.timestamp_ms, 3);
        assert_eq!(superseded.len(), 1);
        assert_eq!(superseded[0].fix.timestamp_ms, 1);
        let remaining: Vec<u64> = store.iter().map(|e| e.fix.timestamp_ms).collect();
        assert_eq!(remaining, vec![2, 3]);
    }

    #[test]
    fn test_tighter_or_newer_estimate_is_never_superseded() {
        let mut store = LocationEstimateStore::new();
        let here = Some(Vector3::zeros());

        store.add_estimate(fix(2.0, 1), here);
        // Looser but newer: the tighter one stays
        store.add_estimate(fix(5.0, 2), here);
        // Tighter but older: the newer one stays
        store.add_estimate(fix(1.0, 0), here);

        assert_eq!(store.len(), 3);
        assert_eq!(store.best_estimate().unwrap().fix.timestamp_ms, 0);
    }

    #[test]
    fn test_best_estimate_empty() {
        assert!(LocationEstimateStore::new().best_estimate().is_none());
    }

    #[test]
    fn test_evict_stale_keeps_estimates_within_radius() {
        let mut store = LocationEstimateStore::new();

        store.add_estimate(fix(5.0, 1), Some(Vector3::new(0.0, 0.0, 0.0)));
        store.add_estimate(fix(5.0, 2), Some(Vector3::new(60.0, 300.0, -80.0)));
        store.add_estimate(fix(5.0, 3), Some(Vector3::new(150.0, 0.0, 0.0)));
        store.add_estimate(fix(5.0, 4), Some(Vector3::new(100.0, 0.0, 120.0)));

        let current = Vector3::new(100.0, 0.0, 0.0);
        let evicted = store.evict_stale(&current);

        // Height differences never count towards the radius
        let remaining: Vec<u64> = store.iter().map(|e| e.fix.timestamp_ms).collect();
        assert_eq!(remaining, vec![1, 2, 3]);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].fix.timestamp_ms, 4);

        for estimate in store.iter() {
            assert!(geodetic::ground_distance(&estimate.position, &current) <= 100.0);
        }
    }

    #[test]
    fn test_old_estimate_at_current_position_survives() {
        let mut store = LocationEstimateStore::new();
        store.add_estimate(fix(5.0, 0), Some(Vector3::new(10.0, 0.0, 10.0)));

        assert!(store.evict_stale(&Vector3::new(10.0, 0.0, 10.0)).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_translation_to_scene_axes() {
        let estimate = LocationEstimate::new(fix(5.0, 1), Vector3::new(1.0, 2.0, 3.0));
        let translation = estimate.translation_to(&Vector3::new(4.0, 1.0, -7.0));

        assert_abs_diff_eq!(translation.latitude_translation, 10.0);
        assert_abs_diff_eq!(translation.longitude_translation, 3.0);
        assert_abs_diff_eq!(translation.altitude_translation, -1.0);
    }

    #[test]
    fn test_translated_location_moves_north_for_negative_z() {
        let estimate = LocationEstimate::new(fix(5.0, 1), Vector3::zeros());
        let north = estimate.translated_location(&Vector3::new(0.0, 0.0, -50.0));

        assert!(north.latitude() > estimate.fix.latitude());
        assert_abs_diff_eq!(north.longitude(), estimate.fix.longitude(), epsilon = 1e-12);
        assert_abs_diff_eq!(estimate.fix.distance_to(&north), 50.0, epsilon = 1e-3);
        assert_eq!(north.horizontal_accuracy, 5.0);
    }
}
