//! Area-of-interest selection tests
//!
//! Tests for the adaptive nearest-cluster heuristic: dense regions get a
//! tight radius from the 4th-nearest neighbor, sparse regions widen to the
//! first far warehouse near the nearest one, and isolated nearest
//! warehouses collapse the area to themselves.

use proptest::prelude::*;

use shared::geo::{haversine_km, nearest_cluster, EARTH_RADIUS_KM};
use shared::types::GeoPoint;

const USER: GeoPoint = GeoPoint {
    latitude: 0.0,
    longitude: 0.0,
};

/// A point `km` due east of the origin on the equator
fn east(km: f64) -> GeoPoint {
    GeoPoint::new(0.0, km.to_degrees() / EARTH_RADIUS_KM)
}

/// A point `km` due north of the origin
fn north(km: f64) -> GeoPoint {
    GeoPoint::new(km.to_degrees() / EARTH_RADIUS_KM, 0.0)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario D: user distances [1, 3, 4, 6, 9, 25] km with the 4th-nearest
    /// 5 km from the nearest: outer radius 6 km selects the first four
    #[test]
    fn test_dense_cluster_uses_fourth_neighbor() {
        let points = vec![
            east(1.0),
            east(3.0),
            east(4.0),
            east(6.0),
            east(9.0),
            east(25.0),
        ];

        let selected = nearest_cluster(USER, &points);
        assert_eq!(selected, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_selection_ignores_input_order() {
        // Same warehouses as the dense scenario, shuffled
        let points = vec![
            east(9.0),
            east(1.0),
            east(25.0),
            east(4.0),
            east(3.0),
            east(6.0),
        ];

        let selected = nearest_cluster(USER, &points);
        assert_eq!(selected, vec![1, 4, 3, 5]);
    }

    #[test]
    fn test_fewer_than_four_selects_all() {
        let points = vec![east(2.0), east(40.0), east(300.0)];
        let selected = nearest_cluster(USER, &points);
        assert_eq!(selected, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_warehouse() {
        let selected = nearest_cluster(USER, &[east(120.0)]);
        assert_eq!(selected, vec![0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(nearest_cluster(USER, &[]).is_empty());
    }

    /// The 4th-nearest is far from the nearest, but a farther warehouse sits
    /// within 20 km of it: the radius widens to that warehouse
    #[test]
    fn test_sparse_scan_widens_radius() {
        let points = vec![
            east(10.0),
            east(12.0),
            east(13.0),
            north(28.0), // ~29.7 km from the nearest warehouse
            east(29.0),  // 19 km from the nearest warehouse
        ];

        let selected = nearest_cluster(USER, &points);
        assert_eq!(selected.len(), 5);
    }

    /// Nothing within 20 km of an isolated nearest warehouse: the area
    /// collapses to that single warehouse
    #[test]
    fn test_isolated_nearest_collapses() {
        let points = vec![east(5.0), north(40.0), north(50.0), north(60.0)];
        let selected = nearest_cluster(USER, &points);
        assert_eq!(selected, vec![0]);
    }

    #[test]
    fn test_result_is_sorted_by_distance() {
        let points = vec![east(6.0), east(1.0), east(4.0), east(3.0)];
        let selected = nearest_cluster(USER, &points);
        assert_eq!(selected, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_boundary_distance_included() {
        // The 4th-nearest sits exactly on the outer radius and is included
        let points = vec![east(1.0), east(2.0), east(3.0), east(4.0), east(80.0)];
        let selected = nearest_cluster(USER, &points);
        assert_eq!(selected, vec![0, 1, 2, 3]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn points_strategy() -> impl Strategy<Value = Vec<GeoPoint>> {
        prop::collection::vec((0.1f64..800.0, prop::bool::ANY), 1..12).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(km, northward)| if northward { north(km) } else { east(km) })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A non-empty input always selects at least the nearest point
        #[test]
        fn prop_nearest_always_selected(points in points_strategy()) {
            let selected = nearest_cluster(USER, &points);
            prop_assert!(!selected.is_empty());

            let distances: Vec<f64> = points.iter().map(|&p| haversine_km(USER, p)).collect();
            let nearest = selected[0];
            for (i, d) in distances.iter().enumerate() {
                prop_assert!(distances[nearest] <= d + 1e-9, "point {} is closer", i);
            }
        }

        /// Selected indices are valid, unique, and ordered by distance
        #[test]
        fn prop_selection_well_formed(points in points_strategy()) {
            let selected = nearest_cluster(USER, &points);
            let distances: Vec<f64> = points.iter().map(|&p| haversine_km(USER, p)).collect();

            let mut seen = std::collections::HashSet::new();
            for &i in &selected {
                prop_assert!(i < points.len());
                prop_assert!(seen.insert(i));
            }
            for pair in selected.windows(2) {
                prop_assert!(distances[pair[0]] <= distances[pair[1]] + 1e-9);
            }
        }

        /// The selection is a prefix of the distance ranking: no skipped-over
        /// closer warehouse is ever excluded
        #[test]
        fn prop_selection_is_distance_prefix(points in points_strategy()) {
            let selected = nearest_cluster(USER, &points);
            let distances: Vec<f64> = points.iter().map(|&p| haversine_km(USER, p)).collect();

            let outer = selected
                .iter()
                .map(|&i| distances[i])
                .fold(f64::MIN, f64::max);
            let excluded_closer = (0..points.len())
                .filter(|i| !selected.contains(i))
                .any(|i| distances[i] < outer - 1e-9);

            prop_assert!(!excluded_closer);
        }
    }
}
