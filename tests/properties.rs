//! Invariants checked over seeded random layered graphs.
//!
//! Run with: cargo test --test properties

use layered_knn::exact::{exact_knn_from, reachable_at_layer};
use layered_knn::{knn_search, GraphBuilder, KnnTrace, LayeredGraph, Point, PointId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const SEEDS: [u64; 6] = [1, 7, 42, 99, 1234, 2024];
const LAYERS: usize = 3;

/// Random planar graph: point 0 spans every layer, the rest get a geometric
/// layer draw. Each visible point links to a few random peers per layer.
fn random_graph(rng: &mut StdRng, n: u64) -> LayeredGraph {
    let mut points = Vec::new();
    let mut max_layers = Vec::new();
    for id in 0..n {
        let mut layer = 0;
        while layer + 1 < LAYERS && rng.gen_bool(0.35) {
            layer += 1;
        }
        if id == 0 {
            layer = LAYERS - 1;
        }
        max_layers.push(layer);
        points.push(Point::planar(
            id,
            rng.gen_range(0.0..500.0),
            rng.gen_range(0.0..500.0),
            layer,
        ));
    }

    let mut builder = GraphBuilder::new()
        .points(points)
        .layers(LAYERS)
        .entry_point(0)
        .derive_max_layers(false);

    for layer in 0..LAYERS {
        let visible: Vec<u64> = (0..n).filter(|&id| max_layers[id as usize] >= layer).collect();
        if visible.len() < 2 {
            continue;
        }
        for &a in &visible {
            for _ in 0..rng.gen_range(1..=3) {
                let b = visible[rng.gen_range(0..visible.len())];
                if a != b {
                    builder = builder.edge(a, b, layer);
                }
            }
        }
    }

    builder.build().unwrap()
}

fn random_query(rng: &mut StdRng) -> [f32; 2] {
    [rng.gen_range(-50.0..550.0), rng.gen_range(-50.0..550.0)]
}

fn cases() -> impl Iterator<Item = (LayeredGraph, [f32; 2], StdRng)> {
    SEEDS.iter().map(|&seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.gen_range(12..40);
        let graph = random_graph(&mut rng, n);
        let query = random_query(&mut rng);
        (graph, query, rng)
    })
}

fn base_entry(trace: &KnnTrace) -> PointId {
    trace.final_step().unwrap().entry_point
}

#[test]
fn test_result_size_bounded_by_k_and_reachability() {
    for (graph, query, mut rng) in cases() {
        for _ in 0..10 {
            let k = rng.gen_range(1..=graph.len() + 5);
            let ef = rng.gen_range(1..=graph.len());
            let trace = knn_search(&graph, &query, k, ef).unwrap();

            let reachable = reachable_at_layer(&graph, base_entry(&trace), 0).len();
            let found = trace.neighbors().len();
            assert!(found <= k);
            assert!(found <= reachable);
            assert!(found >= 1);
        }
    }
}

#[test]
fn test_results_sorted_and_unique() {
    for (graph, query, mut rng) in cases() {
        let k = rng.gen_range(1..=graph.len());
        let trace = knn_search(&graph, &query, k, 2 * k).unwrap();

        for step in &trace {
            assert!(step
                .result
                .windows(2)
                .all(|w| w[0].distance <= w[1].distance));
            let unique: HashSet<PointId> = step.result.iter().map(|n| n.id).collect();
            assert_eq!(unique.len(), step.result.len());
        }
    }
}

#[test]
fn test_every_layer_is_traced_within_its_width() {
    for (graph, query, _) in cases() {
        let trace = knn_search(&graph, &query, 3, 5).unwrap();
        assert_eq!(trace.len(), graph.layer_count());

        for (i, step) in trace.iter().enumerate() {
            assert_eq!(step.layer, graph.layer_count() - 1 - i);
            assert!(step.result.len() <= step.width);
            if step.is_final() {
                assert!(step.result.len() <= step.k);
                assert_eq!(step.ef, 5);
                assert_eq!(step.width, 5);
            } else {
                assert_eq!((step.ef, step.width), (1, 1));
            }
        }

        for pair in trace.steps().windows(2) {
            assert_eq!(pair[1].entry_point, pair[0].current_point);
        }
    }
}

#[test]
fn test_visited_is_a_unique_superset() {
    for (graph, query, _) in cases() {
        let trace = knn_search(&graph, &query, 4, 6).unwrap();
        for step in &trace {
            let visited: HashSet<PointId> = step.visited.iter().copied().collect();
            assert_eq!(visited.len(), step.visited.len());
            assert_eq!(step.distances.len(), step.visited.len());
            assert!(step.result.iter().all(|n| visited.contains(&n.id)));
            assert!(step.candidates_explored.iter().all(|id| visited.contains(id)));
            assert_eq!(step.visited.first(), Some(&step.entry_point));
        }
    }
}

#[test]
fn test_repeated_queries_are_identical() {
    for (graph, query, _) in cases() {
        let first = knn_search(&graph, &query, 5, 7).unwrap();
        let second = knn_search(&graph, &query, 5, 7).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_wider_search_never_loses_to_narrower_baseline() {
    for (graph, query, _) in cases() {
        let n = graph.len();
        let full = knn_search(&graph, &query, 1, n).unwrap();
        let best_full = full.neighbors()[0].distance;

        let exact = exact_knn_from(
            &graph,
            &query,
            1,
            base_entry(&full),
            0,
            &layered_knn::DistanceMetric::Euclidean,
        )
        .unwrap();
        assert_eq!(best_full, exact[0].distance);

        for ef in 1..=n {
            let best = knn_search(&graph, &query, 1, ef).unwrap().neighbors()[0].distance;
            assert!(best >= best_full, "ef={} beat the exhaustive search", ef);
        }
    }
}
