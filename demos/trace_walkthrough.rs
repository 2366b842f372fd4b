//! Walk a query through one of the sample graphs and print every layer.
//!
//! Run with: cargo run --example trace_walkthrough -- [fixture] [x] [y] [k] [ef]
//!
//! Defaults to the "simple" fixture, query (160, 60), k = 2, ef = 3.

use layered_knn::exact::{exact_knn, recall_at_k};
use layered_knn::{fixtures, knn_search_with_stats, DistanceMetric, SearchParams};
use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let name = args.first().map(String::as_str).unwrap_or("simple");
    let x: f32 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(160.0);
    let y: f32 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(60.0);
    let k: usize = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(2);
    let ef: usize = args.get(4).map(|s| s.parse()).transpose()?.unwrap_or(3);

    let fixture = fixtures::all()?
        .into_iter()
        .find(|f| f.name == name)
        .ok_or_else(|| format!("unknown fixture {:?}", name))?;
    let graph = &fixture.graph;
    let query = [x, y];

    println!("Fixture: {} ({})", fixture.name, fixture.description);
    println!(
        "{} points, {} edges, {} layers, entry point {}",
        graph.len(),
        graph.edges().len(),
        graph.layer_count(),
        graph.entry_point_id()
    );
    println!("Query: ({}, {}), k={}, ef={}\n", x, y, k, ef);

    let params = SearchParams::new(k).with_ef(ef);
    let (trace, stats) = knn_search_with_stats(graph, &query, &params, &DistanceMetric::Euclidean)?;

    for step in &trace {
        println!("{}", step);
        println!("  explored: {:?}", step.candidates_explored);
        println!("  visited:  {:?}", step.visited);
    }

    let exact = exact_knn(graph, &query, k, 0, &DistanceMetric::Euclidean)?;
    let truth: Vec<_> = exact.iter().map(|n| n.id).collect();
    println!(
        "\nRecall@{} against exhaustive scan: {:.2}",
        k,
        recall_at_k(&trace.neighbor_ids(), &truth, k)
    );
    println!("{}\n", stats.summary());

    println!("{}", serde_json::to_string_pretty(&trace)?);
    Ok(())
}
