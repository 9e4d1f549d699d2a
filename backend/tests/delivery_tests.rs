//! Delivery estimation tests
//!
//! Tests for the estimator pipeline: candidate filtering by stock,
//! nearest-warehouse selection with first-encountered tie-breaking, and
//! distance/weight banding.

use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::geo::{delivery_days, haversine_km, nearest_index, EARTH_RADIUS_KM};
use shared::types::GeoPoint;

/// A point `km` east of `origin` along its parallel
fn east_of(origin: GeoPoint, km: f64) -> GeoPoint {
    let km_per_degree = EARTH_RADIUS_KM * 1f64.to_radians() * origin.latitude.to_radians().cos();
    GeoPoint::new(origin.latitude, origin.longitude + km / km_per_degree)
}

/// Candidate warehouse as the estimator sees it after the stock query
#[derive(Debug, Clone)]
struct Candidate {
    name: &'static str,
    location: GeoPoint,
    stock: i32,
}

/// The estimator's selection step: stocked candidates only, nearest wins,
/// first encountered on ties
fn select_nearest(user: GeoPoint, candidates: &[Candidate]) -> Option<(&'static str, f64)> {
    let stocked: Vec<&Candidate> = candidates.iter().filter(|c| c.stock > 0).collect();
    let distances: Vec<f64> = stocked
        .iter()
        .map(|c| haversine_km(user, c.location))
        .collect();
    nearest_index(&distances).map(|i| (stocked[i].name, distances[i]))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario C: a closer warehouse without stock is skipped; the stocked
    /// one at 12 km wins and a light item lands in the 2-day band
    #[test]
    fn test_estimate_skips_empty_warehouses() {
        let user = GeoPoint::new(17.0, 78.0);
        let candidates = vec![
            Candidate {
                name: "near-empty",
                location: east_of(user, 5.0),
                stock: 0,
            },
            Candidate {
                name: "stocked",
                location: east_of(user, 12.0),
                stock: 20,
            },
        ];

        let (name, distance) = select_nearest(user, &candidates).unwrap();
        assert_eq!(name, "stocked");
        assert!((distance - 12.0).abs() < 0.1);
        assert_eq!(delivery_days(distance, Some(Decimal::ONE)), 2);
    }

    #[test]
    fn test_estimate_no_stock_anywhere() {
        let user = GeoPoint::new(17.0, 78.0);
        let candidates = vec![Candidate {
            name: "empty",
            location: east_of(user, 5.0),
            stock: 0,
        }];

        assert!(select_nearest(user, &candidates).is_none());
    }

    #[test]
    fn test_estimate_tie_first_encountered_wins() {
        let user = GeoPoint::new(17.0, 78.0);
        let location = east_of(user, 30.0);
        let candidates = vec![
            Candidate {
                name: "first",
                location,
                stock: 3,
            },
            Candidate {
                name: "second",
                location,
                stock: 500,
            },
        ];

        let (name, _) = select_nearest(user, &candidates).unwrap();
        assert_eq!(name, "first");
    }

    #[test]
    fn test_band_boundaries_light() {
        assert_eq!(delivery_days(50.0, None), 2);
        assert_eq!(delivery_days(50.001, None), 3);
        assert_eq!(delivery_days(100.0, None), 3);
        assert_eq!(delivery_days(100.001, None), 4);
        assert_eq!(delivery_days(200.0, None), 4);
        assert_eq!(delivery_days(200.001, None), 5);
        assert_eq!(delivery_days(500.0, None), 5);
        assert_eq!(delivery_days(500.001, None), 7);
    }

    #[test]
    fn test_band_boundaries_heavy() {
        let heavy = Some(Decimal::from(10));
        assert_eq!(delivery_days(50.0, heavy), 3);
        assert_eq!(delivery_days(100.0, heavy), 4);
        assert_eq!(delivery_days(200.0, heavy), 5);
        assert_eq!(delivery_days(500.0, heavy), 7);
        assert_eq!(delivery_days(501.0, heavy), 10);
    }

    #[test]
    fn test_weight_threshold_two_kg_is_light() {
        assert_eq!(delivery_days(40.0, Some(Decimal::from(2))), 2);
        assert_eq!(
            delivery_days(40.0, Some(Decimal::new(2001, 3))), // 2.001 kg
            3
        );
    }

    #[test]
    fn test_east_of_helper_distance() {
        let origin = GeoPoint::new(17.0, 78.0);
        let moved = east_of(origin, 12.0);
        assert!((haversine_km(origin, moved) - 12.0).abs() < 0.05);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn weight_strategy() -> impl Strategy<Value = Option<Decimal>> {
        prop_oneof![
            Just(None),
            (1i64..=10000i64).prop_map(|n| Some(Decimal::new(n, 2))), // 0.01 to 100.00 kg
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Estimates only ever take the five documented values
        #[test]
        fn prop_days_in_band_set(distance in 0.0f64..2000.0, weight in weight_strategy()) {
            let days = delivery_days(distance, weight);
            prop_assert!([2, 3, 4, 5, 7, 10].contains(&days));
        }

        /// More distance never means fewer days
        #[test]
        fn prop_days_monotonic_in_distance(
            near in 0.0f64..2000.0,
            delta in 0.0f64..2000.0,
            weight in weight_strategy()
        ) {
            let far = near + delta;
            prop_assert!(delivery_days(far, weight) >= delivery_days(near, weight));
        }

        /// Heavy items never beat light items over the same distance
        #[test]
        fn prop_heavy_never_faster(distance in 0.0f64..2000.0) {
            let light = delivery_days(distance, Some(Decimal::ONE));
            let heavy = delivery_days(distance, Some(Decimal::from(20)));
            prop_assert!(heavy >= light);
        }

        /// The selected candidate is never farther than any stocked one
        #[test]
        fn prop_selection_is_minimal(
            distances in prop::collection::vec((1.0f64..500.0, prop::bool::ANY), 1..10)
        ) {
            let user = GeoPoint::new(17.0, 78.0);
            let candidates: Vec<Candidate> = distances
                .iter()
                .map(|&(km, stocked)| Candidate {
                    name: "w",
                    location: east_of(user, km),
                    stock: i32::from(stocked),
                })
                .collect();

            let selected = select_nearest(user, &candidates);
            let any_stocked = candidates.iter().any(|c| c.stock > 0);
            prop_assert_eq!(selected.is_some(), any_stocked);

            if let Some((_, distance)) = selected {
                for candidate in candidates.iter().filter(|c| c.stock > 0) {
                    let other = haversine_km(user, candidate.location);
                    prop_assert!(distance <= other + 1e-9);
                }
            }
        }
    }
}
