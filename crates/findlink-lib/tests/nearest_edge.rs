//! End-to-end checks of index build plus nearest-edge queries through the public API

use findlink_lib::{
    EdgeId, IndexConfig, NearestEdgeQuery, NetworkError, Polyline, QueryOptions, SpatialIndex,
    SpherePoint, project_onto_edge,
};
use geo::{Coord, LineString};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn point(lat: f64, lon: f64) -> SpherePoint {
    SpherePoint::from_lat_lon_degrees(lat, lon).unwrap()
}

/// Road-like network: random walks inside a box, some with repeated points
fn road_network(rng: &mut StdRng, links: usize) -> Vec<Polyline> {
    (0..links)
        .map(|i| {
            let mut lon = 126.9 + rng.random_range(0.0..0.3);
            let mut lat = 37.4 + rng.random_range(0.0..0.2);
            let len = rng.random_range(2..12);
            let mut coords = Vec::with_capacity(len);
            for _ in 0..len {
                coords.push(Coord { x: lon, y: lat });
                // Occasionally repeat a point, like sloppy source data does
                if rng.random_range(0..10) > 0 {
                    lon += rng.random_range(-0.003..0.003);
                    lat += rng.random_range(-0.003..0.003);
                }
            }
            Polyline::from_line_string(&LineString::new(coords))
                .unwrap()
                .with_feature_id(format!("link-{i}"))
        })
        .collect()
}

/// Nearest edge by scanning every polyline directly
fn scan_nearest(polylines: &[Polyline], target: &SpherePoint) -> Option<(EdgeId, f64)> {
    let mut best: Option<(EdgeId, f64)> = None;
    for (position, polyline) in polylines.iter().enumerate() {
        if polyline.validate().is_err() {
            continue;
        }
        for (offset, edge) in polyline.edges().enumerate() {
            if edge.is_degenerate() {
                continue;
            }
            let (_, distance) = project_onto_edge(target, &edge);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((EdgeId::new(position, offset), distance));
            }
        }
    }
    best
}

#[test]
fn test_query_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(2024);
    let polylines = road_network(&mut rng, 500);
    let index = SpatialIndex::build(polylines.clone()).unwrap();
    let query = NearestEdgeQuery::new(&index, QueryOptions::default());

    for _ in 0..500 {
        let target = point(
            rng.random_range(37.35..37.65),
            rng.random_range(126.85..127.25),
        );
        let (expected_id, expected_distance) = scan_nearest(&polylines, &target).unwrap();
        let result = query.find_closest_edge(&target).unwrap();
        assert_eq!(result.edge, expected_id);
        assert_eq!(result.distance, expected_distance);
    }
}

#[test]
fn test_query_matches_linear_scan_with_small_leaves() {
    let mut rng = StdRng::seed_from_u64(7);
    let polylines = road_network(&mut rng, 200);
    let config = IndexConfig {
        leaf_capacity: 1,
        max_depth: 64,
    };
    let index = SpatialIndex::build_with_config(polylines.clone(), config).unwrap();
    let query = NearestEdgeQuery::new(&index, QueryOptions::default());

    for _ in 0..200 {
        let target = point(rng.random_range(37.3..37.7), rng.random_range(126.8..127.3));
        let (expected_id, _) = scan_nearest(&polylines, &target).unwrap();
        assert_eq!(query.find_closest_edge(&target).unwrap().edge, expected_id);
    }
}

#[test]
fn test_far_away_target() {
    let mut rng = StdRng::seed_from_u64(3);
    let polylines = road_network(&mut rng, 100);
    let index = SpatialIndex::build(polylines.clone()).unwrap();
    let query = NearestEdgeQuery::new(&index, QueryOptions::default());

    // Antipode of Seoul is in the South Atlantic
    let target = point(-37.5, -53.0);
    let (expected_id, expected_distance) = scan_nearest(&polylines, &target).unwrap();
    let result = query.find_closest_edge(&target).unwrap();
    assert_eq!(result.edge, expected_id);
    assert_eq!(result.distance, expected_distance);
    assert!(result.distance_meters() > 19_000_000.0);
}

#[test]
fn test_result_resolves_to_feature() {
    let polylines = vec![
        Polyline::from_lat_lon_degrees(&[(37.50, 127.00), (37.50, 127.01)])
            .unwrap()
            .with_feature_id("north"),
        Polyline::from_lat_lon_degrees(&[(37.49, 127.00), (37.49, 127.01)])
            .unwrap()
            .with_feature_id("south"),
    ];
    let index = SpatialIndex::build(polylines).unwrap();
    let query = NearestEdgeQuery::new(&index, QueryOptions::default());

    let result = query.find_closest_edge_lat_lon(37.491, 127.005).unwrap();
    let polyline = index.polyline(result.edge.polyline).unwrap();
    assert_eq!(polyline.feature_id(), Some("south"));
}

#[test]
fn test_k_nearest_sorted_and_distinct() {
    let mut rng = StdRng::seed_from_u64(11);
    let index = SpatialIndex::build(road_network(&mut rng, 300)).unwrap();
    let query = NearestEdgeQuery::new(&index, QueryOptions::default().with_max_results(25));

    let results = query.find_edges(&point(37.5, 127.05));
    assert_eq!(results.len(), 25);
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
        assert_ne!(pair[0].edge, pair[1].edge);
    }
}

#[test]
fn test_empty_network_is_an_error() {
    let polylines = vec![Polyline::from_lat_lon_degrees(&[(1.0, 1.0)]).unwrap()];
    assert_eq!(
        SpatialIndex::build(polylines).unwrap_err(),
        NetworkError::EmptyNetwork
    );
}
