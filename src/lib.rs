//! layered-knn: k-nearest-neighbor search over a prebuilt layered proximity graph.
//!
//! A [`LayeredGraph`] is an immutable stack of proximity graphs over the same
//! points: the top layer is sparse, layer 0 holds every point. A query enters
//! at the top, greedily descends one layer at a time, and finishes with a
//! wider search at layer 0.
//!
//! # Features
//!
//! - **Layer search**: bounded-width best-first expansion ([`search_layer`])
//! - **K-NN driver**: top-down descent with a per-layer trace ([`knn_search`])
//! - **Pluggable metrics**: Euclidean by default, any [`Metric`] impl accepted
//! - **Exact reference**: brute-force ground truth and recall ([`exact`])
//! - **Sample graphs**: the static 2-D graphs in [`fixtures`]
//!
//! # Example
//!
//! ```
//! use layered_knn::{fixtures, knn_search};
//!
//! let graph = fixtures::simple().unwrap();
//! let trace = knn_search(&graph, &[160.0, 60.0], 2, 3).unwrap();
//!
//! for step in &trace {
//!     println!("{}", step);
//! }
//! for neighbor in trace.neighbors() {
//!     println!("{} at {:.2}", neighbor.id, neighbor.distance);
//! }
//! ```

pub mod constants;
pub mod distance;
pub mod error;
pub mod exact;
pub mod fixtures;
pub mod graph;
pub mod metrics;
pub mod point;
pub mod search;
pub mod types;

// Re-export commonly used types at crate root
pub use distance::{DistanceMetric, Metric};
pub use error::{LayeredKnnError, Result};
pub use exact::{exact_knn, recall_at_k};
pub use graph::{build_graph, GraphBuilder, GraphData, LayeredGraph};
pub use metrics::SearchStatistics;
pub use point::{Edge, Point};
pub use search::{
    knn_search, knn_search_with, knn_search_with_stats, search_layer, KnnTrace, LayerSearch,
    Neighbor, SearchParams, TraceRecorder, TraceStep,
};
pub use types::PointId;
