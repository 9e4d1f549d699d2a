//! Geospatial math for warehouse selection and delivery estimation
//!
//! Pure functions only: haversine distances, delivery-day banding, and the
//! adaptive nearest-cluster selection used to build warehouse shortlists.

use rust_decimal::Decimal;

use crate::types::GeoPoint;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Two warehouses within this distance of each other count as one cluster
pub const CLUSTER_NEIGHBOR_KM: f64 = 20.0;

/// Outer radii within one meter of the nearest distance collapse the
/// area of interest to the single nearest warehouse
pub const AREA_COLLAPSE_EPSILON_KM: f64 = 0.001;

/// Items above this weight fall in the heavy delivery bands
pub const HEAVY_ITEM_THRESHOLD_KG: u32 = 2;

/// Great-circle distance between two points in kilometers (haversine)
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    // Rounding can nudge h past 1 for near-antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Delivery-days estimate from distance and item weight.
///
/// A missing weight is defined to fall in the light (<= 2 kg) bands.
pub fn delivery_days(distance_km: f64, weight_kg: Option<Decimal>) -> u32 {
    let heavy = weight_kg
        .map(|w| w > Decimal::from(HEAVY_ITEM_THRESHOLD_KG))
        .unwrap_or(false);

    match (distance_km, heavy) {
        (d, false) if d <= 50.0 => 2,
        (d, true) if d <= 50.0 => 3,
        (d, false) if d <= 100.0 => 3,
        (d, true) if d <= 100.0 => 4,
        (d, false) if d <= 200.0 => 4,
        (d, true) if d <= 200.0 => 5,
        (d, false) if d <= 500.0 => 5,
        (d, true) if d <= 500.0 => 7,
        (_, false) => 7,
        (_, true) => 10,
    }
}

/// Index of the first minimum distance, or `None` for an empty slice.
///
/// Ties are broken by iteration order: the first candidate encountered with
/// the minimum distance wins.
pub fn nearest_index(distances: &[f64]) -> Option<usize> {
    let mut nearest: Option<(usize, f64)> = None;
    for (i, &d) in distances.iter().enumerate() {
        match nearest {
            Some((_, best)) if d >= best => {}
            _ => nearest = Some((i, d)),
        }
    }
    nearest.map(|(i, _)| i)
}

/// Select the nearest cluster of points around `user`.
///
/// Returns indices into `points`, nearest first. The outer radius adapts to
/// point density: the 4th-nearest neighbor sets it when close to the nearest
/// point, otherwise the first farther point within [`CLUSTER_NEIGHBOR_KM`] of
/// the nearest does; with no such point the selection collapses to the
/// nearest point alone. Fewer than four points select everything.
pub fn nearest_cluster(user: GeoPoint, points: &[GeoPoint]) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }

    let distances: Vec<f64> = points.iter().map(|&p| haversine_km(user, p)).collect();

    // Stable sort keeps first-encountered ordering between equal distances
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

    let nearest = points[order[0]];
    let nearest_distance = distances[order[0]];

    let outer_radius = if order.len() < 4 {
        distances[order[order.len() - 1]]
    } else {
        let fourth = order[3];
        if haversine_km(nearest, points[fourth]) <= CLUSTER_NEIGHBOR_KM {
            distances[fourth]
        } else {
            order[4..]
                .iter()
                .find(|&&i| haversine_km(nearest, points[i]) <= CLUSTER_NEIGHBOR_KM)
                .map(|&i| distances[i])
                .unwrap_or(nearest_distance)
        }
    };

    if outer_radius - nearest_distance < AREA_COLLAPSE_EPSILON_KM {
        return vec![order[0]];
    }

    order
        .into_iter()
        .filter(|&i| distances[i] <= outer_radius)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Degrees of longitude on the equator for a given east-west distance
    fn east_deg(km: f64) -> f64 {
        km.to_degrees() / EARTH_RADIUS_KM
    }

    /// Degrees of latitude for a given north-south distance
    fn north_deg(km: f64) -> f64 {
        km.to_degrees() / EARTH_RADIUS_KM
    }

    fn east(km: f64) -> GeoPoint {
        GeoPoint::new(0.0, east_deg(km))
    }

    #[test]
    fn test_haversine_zero_distance() {
        let p = GeoPoint::new(17.0, 78.0);
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn test_haversine_one_degree_on_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let expected = EARTH_RADIUS_KM * 1f64.to_radians();
        assert!((haversine_km(a, b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_pole_to_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(90.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((haversine_km(a, b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = GeoPoint::new(13.7563, 100.5018);
        let b = GeoPoint::new(18.7883, 98.9853);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_delivery_days_light_bands() {
        assert_eq!(delivery_days(10.0, Some(Decimal::ONE)), 2);
        assert_eq!(delivery_days(50.0, Some(Decimal::ONE)), 2);
        assert_eq!(delivery_days(75.0, Some(Decimal::ONE)), 3);
        assert_eq!(delivery_days(150.0, Some(Decimal::ONE)), 4);
        assert_eq!(delivery_days(400.0, Some(Decimal::ONE)), 5);
        assert_eq!(delivery_days(800.0, Some(Decimal::ONE)), 7);
    }

    #[test]
    fn test_delivery_days_heavy_bands() {
        let heavy = Some(Decimal::from(5));
        assert_eq!(delivery_days(10.0, heavy), 3);
        assert_eq!(delivery_days(75.0, heavy), 4);
        assert_eq!(delivery_days(150.0, heavy), 5);
        assert_eq!(delivery_days(400.0, heavy), 7);
        assert_eq!(delivery_days(800.0, heavy), 10);
    }

    #[test]
    fn test_delivery_days_threshold_weight_is_light() {
        // Exactly 2 kg is not heavy
        assert_eq!(delivery_days(10.0, Some(Decimal::from(2))), 2);
    }

    #[test]
    fn test_delivery_days_missing_weight_is_light() {
        assert_eq!(delivery_days(10.0, None), 2);
        assert_eq!(delivery_days(800.0, None), 7);
    }

    #[test]
    fn test_nearest_index_picks_minimum() {
        assert_eq!(nearest_index(&[5.0, 12.0, 3.5, 9.0]), Some(2));
    }

    #[test]
    fn test_nearest_index_tie_first_wins() {
        assert_eq!(nearest_index(&[7.0, 3.0, 3.0, 9.0]), Some(1));
    }

    #[test]
    fn test_nearest_index_empty() {
        assert_eq!(nearest_index(&[]), None);
    }

    #[test]
    fn test_cluster_empty() {
        let user = GeoPoint::new(0.0, 0.0);
        assert!(nearest_cluster(user, &[]).is_empty());
    }

    #[test]
    fn test_cluster_under_four_selects_all() {
        let user = GeoPoint::new(0.0, 0.0);
        let points = vec![east(3.0), east(8.0)];
        assert_eq!(nearest_cluster(user, &points), vec![0, 1]);
    }

    #[test]
    fn test_cluster_dense_fourth_neighbor_radius() {
        // Distances to user: [1, 3, 4, 6, 9, 25]; W1-W4 are 5 km apart,
        // so the 4th-nearest sets the radius and the first four are selected.
        let user = GeoPoint::new(0.0, 0.0);
        let points = vec![
            east(1.0),
            east(3.0),
            east(4.0),
            east(6.0),
            east(9.0),
            east(25.0),
        ];
        assert_eq!(nearest_cluster(user, &points), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cluster_scan_finds_farther_neighbor() {
        // The 4th-nearest (28 km due north) is ~29.7 km from the nearest
        // warehouse, but the 5th (29 km east) is ~19 km from it, so the
        // outer radius widens to 29 km and all five are selected.
        let user = GeoPoint::new(0.0, 0.0);
        let points = vec![
            east(10.0),
            east(12.0),
            east(13.0),
            GeoPoint::new(north_deg(28.0), 0.0),
            east(29.0),
        ];
        assert_eq!(nearest_cluster(user, &points).len(), 5);
    }

    #[test]
    fn test_cluster_collapses_to_nearest() {
        // No warehouse within 20 km of the nearest: area collapses to it
        let user = GeoPoint::new(0.0, 0.0);
        let points = vec![
            east(5.0),
            GeoPoint::new(north_deg(40.0), 0.0),
            GeoPoint::new(north_deg(50.0), 0.0),
            GeoPoint::new(north_deg(60.0), 0.0),
        ];
        assert_eq!(nearest_cluster(user, &points), vec![0]);
    }

    #[test]
    fn test_cluster_result_ordered_nearest_first() {
        let user = GeoPoint::new(0.0, 0.0);
        let points = vec![east(6.0), east(1.0), east(4.0), east(3.0)];
        assert_eq!(nearest_cluster(user, &points), vec![1, 3, 2, 0]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn point_strategy() -> impl Strategy<Value = GeoPoint> {
            (-85.0f64..85.0, -180.0f64..180.0).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
        }

        proptest! {
            #[test]
            fn prop_haversine_symmetric(a in point_strategy(), b in point_strategy()) {
                prop_assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
            }

            #[test]
            fn prop_haversine_non_negative(a in point_strategy(), b in point_strategy()) {
                prop_assert!(haversine_km(a, b) >= 0.0);
            }

            /// No two points are farther apart than half the circumference
            #[test]
            fn prop_haversine_bounded(a in point_strategy(), b in point_strategy()) {
                let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
                prop_assert!(haversine_km(a, b) <= half_circumference + 1e-6);
            }
        }
    }
}
