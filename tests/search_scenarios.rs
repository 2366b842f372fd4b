//! End-to-end search scenarios on the sample graphs.
//!
//! Run with: cargo test --test search_scenarios

use layered_knn::exact::exact_knn_from;
use layered_knn::{
    fixtures, knn_search, knn_search_with, DistanceMetric, LayeredGraph, LayeredKnnError, Metric,
    PointId, SearchParams,
};
use std::time::Duration;

const QUERY: [f32; 2] = [160.0, 60.0];

fn ids(list: &[PointId]) -> Vec<u64> {
    list.iter().map(|id| id.as_u64()).collect()
}

fn init_logging() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[test]
fn test_simple_model_descends_through_hubs() {
    init_logging();
    let graph = fixtures::simple().unwrap();
    let trace = knn_search(&graph, &QUERY, 2, 3).unwrap();

    let layers: Vec<usize> = trace.iter().map(|s| s.layer).collect();
    assert_eq!(layers, vec![2, 1, 0]);

    let entries: Vec<u64> = trace.iter().map(|s| s.entry_point.as_u64()).collect();
    assert_eq!(entries, vec![0, 1, 4]);

    let final_step = trace.final_step().unwrap();
    assert_eq!(final_step.ef, 3);
    assert_eq!(final_step.width, 3);
    assert_eq!(final_step.k, 2);
    assert_eq!(ids(&trace.neighbor_ids()), vec![4, 5]);

    let distances: Vec<f32> = trace.neighbors().iter().map(|n| n.distance).collect();
    assert!((distances[0] - 14.142_136).abs() < 1e-3);
    assert!((distances[1] - 90.553_85).abs() < 1e-3);
}

#[test]
fn test_upper_layers_search_with_width_one() {
    let graph = fixtures::simple().unwrap();
    let trace = knn_search(&graph, &QUERY, 2, 3).unwrap();
    for step in trace.iter().filter(|s| !s.is_final()) {
        assert_eq!((step.ef, step.width), (1, 1));
        assert_eq!(step.result.len(), 1);
        assert_eq!(step.current_point, step.result[0].id);
    }
}

#[test]
fn test_base_width_never_below_k() {
    let graph = fixtures::simple().unwrap();
    let trace = knn_search(&graph, &QUERY, 3, 1).unwrap();
    let final_step = trace.final_step().unwrap();
    assert_eq!(final_step.ef, 1);
    assert_eq!(final_step.width, 3);
    assert_eq!(ids(&trace.neighbor_ids()), vec![4, 5, 3]);
    assert_eq!(
        final_step.to_string(),
        "Layer 0: search from point 4 with ef=1 (width 3) found 3 of 3 requested neighbors: 4 (14.14), 5 (90.55), 3 (110.45)"
    );
}

#[test]
fn test_raising_ef_never_worsens_best_on_fixtures() {
    for fixture in fixtures::all().unwrap() {
        let graph = &fixture.graph;
        for x in (0..=760).step_by(40) {
            for y in (0..=560).step_by(40) {
                let query = [x as f32, y as f32];
                for k in 1..=3 {
                    let mut running = f32::INFINITY;
                    for ef in 1..=graph.len() {
                        let trace = knn_search(graph, &query, k, ef).unwrap();
                        let best = trace.neighbors()[0].distance;
                        assert!(
                            best <= running,
                            "{}: ef={} got {} after {} at ({}, {}), k={}",
                            fixture.name,
                            ef,
                            best,
                            running,
                            x,
                            y,
                            k
                        );
                        running = best;
                    }
                }
            }
        }
    }
}

#[test]
fn test_k_larger_than_reachable_returns_everything_reachable() {
    let graph = fixtures::simple().unwrap();
    let trace = knn_search(&graph, &QUERY, 20, 20).unwrap();
    // Point 0 has no layer-0 edges, so only the other eight are reachable.
    assert_eq!(ids(&trace.neighbor_ids()), vec![4, 1, 5, 3, 2, 7, 6, 8]);
}

#[test]
fn test_query_on_a_point_finds_it_first() {
    let graph = fixtures::simple().unwrap();
    let trace = knn_search(&graph, &[250.0, 50.0], 1, 4).unwrap();
    let best = trace.neighbors()[0];
    assert_eq!(best.id, PointId(5));
    assert_eq!(best.distance, 0.0);
}

#[test]
fn test_single_layer_graph_yields_one_step() {
    let graph = layered_knn::GraphBuilder::new()
        .point(layered_knn::Point::planar(0, 0.0, 0.0, 0))
        .point(layered_knn::Point::planar(1, 3.0, 4.0, 0))
        .edge(0, 1, 0)
        .entry_point(0)
        .build()
        .unwrap();
    let trace = knn_search(&graph, &[3.0, 4.0], 2, 2).unwrap();
    assert_eq!(trace.len(), 1);
    assert_eq!(ids(&trace.neighbor_ids()), vec![1, 0]);
}

#[test]
fn test_missing_entry_point_is_reported() {
    let json = r#"{
        "points": [
            {"id": 0, "coords": [0.0, 0.0]},
            {"id": 1, "coords": [1.0, 0.0]}
        ],
        "edges": [{"a": 0, "b": 1, "layer": 0}],
        "layer_count": 1,
        "entry_point": 7
    }"#;
    let graph: LayeredGraph = serde_json::from_str(json).unwrap();
    assert!(graph.validate().is_err());

    let err = knn_search(&graph, &[0.0, 0.0], 1, 1).unwrap_err();
    assert_eq!(err, LayeredKnnError::EntryPointNotFound(PointId(7)));
    assert_eq!(err.to_string(), "entry point not found: 7");
}

#[test]
fn test_graph_json_with_mixed_dimensions_is_rejected() {
    let json = r#"{
        "points": [
            {"id": 0, "coords": [0.0, 0.0]},
            {"id": 1, "coords": [1.0, 0.0, 5.0]}
        ],
        "edges": [{"a": 0, "b": 1, "layer": 0}],
        "layer_count": 1,
        "entry_point": 0
    }"#;
    let graph: LayeredGraph = serde_json::from_str(json).unwrap();
    assert!(graph.validate().is_err());

    assert!(matches!(
        knn_search(&graph, &[0.0, 0.0], 2, 2),
        Err(LayeredKnnError::InvalidGraph(_))
    ));
    assert!(matches!(
        exact_knn_from(&graph, &[0.0, 0.0], 2, PointId(0), 0, &DistanceMetric::Euclidean),
        Err(LayeredKnnError::InvalidGraph(_))
    ));
}

#[test]
fn test_graph_json_accepts_alternate_field_names() {
    let json = r#"{
        "points": [
            {"id": 0, "coordinates": [0.0, 0.0], "native_layer": 1, "max_layer": 1},
            {"id": 1, "coordinates": [2.0, 0.0]},
            {"id": 2, "coordinates": [4.0, 0.0]}
        ],
        "edges": [
            {"from": 0, "to": 1, "layer": 0},
            {"from": 1, "to": 2, "layer": 0}
        ],
        "layers": 2,
        "entry_point_id": 0
    }"#;
    let graph: LayeredGraph = serde_json::from_str(json).unwrap();
    graph.validate().unwrap();

    let trace = knn_search(&graph, &[5.0, 0.0], 1, 1).unwrap();
    assert_eq!(trace.len(), 2);
    assert_eq!(ids(&trace.neighbor_ids()), vec![2]);
}

#[test]
fn test_invalid_arguments_are_rejected() {
    let graph = fixtures::simple().unwrap();
    assert!(matches!(
        knn_search(&graph, &QUERY, 0, 3),
        Err(LayeredKnnError::InvalidArgument(_))
    ));
    assert!(matches!(
        knn_search(&graph, &QUERY, 2, 0),
        Err(LayeredKnnError::InvalidArgument(_))
    ));
    assert!(matches!(
        knn_search(&graph, &[160.0], 2, 3),
        Err(LayeredKnnError::DimensionMismatch { expected: 2, actual: 1 })
    ));
    assert!(matches!(
        knn_search(&graph, &[f32::INFINITY, 60.0], 2, 3),
        Err(LayeredKnnError::InvalidArgument(_))
    ));
}

#[test]
fn test_expired_deadline_times_out() {
    let graph = fixtures::classic().unwrap();
    let params = SearchParams::new(3).with_ef(8).with_timeout(Duration::ZERO);
    let err = knn_search_with(&graph, &[400.0, 220.0], &params, &DistanceMetric::Euclidean)
        .unwrap_err();
    assert_eq!(err, LayeredKnnError::Timeout);
}

/// L-infinity distance, not shipped with the crate.
struct Chebyshev;

impl Metric for Chebyshev {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f32::max)
    }
}

#[test]
fn test_custom_metric_matches_exact_reference() {
    for fixture in fixtures::all().unwrap() {
        let graph = &fixture.graph;
        let query = [330.0, 170.0];
        let params = SearchParams::new(4).with_ef(graph.len());

        for metric in [&Chebyshev as &dyn Metric, &DistanceMetric::Manhattan] {
            let trace = knn_search_with(graph, &query, &params, metric).unwrap();
            let entry = trace.final_step().unwrap().entry_point;
            let exact = exact_knn_from(graph, &query, 4, entry, 0, metric).unwrap();

            let found: Vec<f32> = trace.neighbors().iter().map(|n| n.distance).collect();
            let expected: Vec<f32> = exact.iter().map(|n| n.distance).collect();
            assert_eq!(found, expected, "{}", fixture.name);
        }
    }
}

#[test]
fn test_concurrent_queries_share_one_graph() {
    let graph = fixtures::classic().unwrap();
    let queries: Vec<[f32; 2]> = (0..8)
        .map(|i| [100.0 + 75.0 * i as f32, 80.0 + 40.0 * i as f32])
        .collect();
    let expected: Vec<Vec<PointId>> = queries
        .iter()
        .map(|q| knn_search(&graph, q, 3, 5).unwrap().neighbor_ids())
        .collect();

    let graph = &graph;
    std::thread::scope(|scope| {
        let handles: Vec<_> = queries
            .iter()
            .map(|q| scope.spawn(move || knn_search(graph, q, 3, 5).unwrap().neighbor_ids()))
            .collect();
        for (handle, want) in handles.into_iter().zip(&expected) {
            assert_eq!(&handle.join().unwrap(), want);
        }
    });
}

#[test]
fn test_trace_is_json_step_list() {
    let graph = fixtures::simple().unwrap();
    let trace = knn_search(&graph, &QUERY, 2, 3).unwrap();
    let json = serde_json::to_value(&trace).unwrap();

    let steps = json.as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[2]["layer"], 0);
    assert_eq!(steps[2]["result"][0]["id"], 4);
    assert_eq!(steps[0]["visited"], serde_json::json!([0, 1, 2]));
}

#[test]
fn test_final_step_display() {
    let graph = fixtures::simple().unwrap();
    let trace = knn_search(&graph, &QUERY, 2, 3).unwrap();
    assert_eq!(
        trace.final_step().unwrap().to_string(),
        "Layer 0: search from point 4 with ef=3 found 2 of 2 requested neighbors: 4 (14.14), 5 (90.55)"
    );
    assert_eq!(
        trace.steps()[0].to_string(),
        "Layer 2: greedy search from point 0 settled on point 1 after visiting 3 points"
    );
}
