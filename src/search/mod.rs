//! Query algorithms over a [`LayeredGraph`](crate::LayeredGraph).
//!
//! - [`layer`]: bounded-width search within one layer
//! - [`knn`]: top-down descent across all layers
//! - [`trace`]: per-layer snapshots recorded by the descent

pub mod knn;
pub mod layer;
pub mod trace;

pub use knn::{knn_search, knn_search_with, knn_search_with_stats, SearchParams};
pub use layer::{search_layer, LayerSearch};
pub use trace::{KnnTrace, Neighbor, TraceRecorder, TraceStep};
