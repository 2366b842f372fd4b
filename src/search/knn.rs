//! Top-down k-nearest-neighbor driver (K-NN-SEARCH).
//!
//! Starting at the graph's entry point on the top layer, every layer above 0
//! is searched greedily (width 1) and its best point becomes the entry for
//! the layer below. Layer 0 is searched with width `max(ef, k)` and the
//! result is cut to the `k` nearest. One [`TraceStep`] is recorded per layer;
//! the final one keeps the caller's `ef` next to the width actually used.

use crate::constants::search::{DEFAULT_EF, DEFAULT_K, UPPER_LAYER_EF};
use crate::distance::{DistanceMetric, Metric};
use crate::error::{LayeredKnnError, Result};
use crate::graph::{LayeredGraph, NodeId};
use crate::metrics::{SearchStatistics, SearchStatsBuilder};
use crate::search::layer::{check_query, walk_layer, LayerWalk, ScoredNode};
use crate::search::trace::{KnnTrace, TraceRecorder, TraceStep};
use std::time::{Duration, Instant};
use tracing::debug;

/// Parameters of a k-NN query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Number of neighbors to return.
    pub k: usize,
    /// Result-set width at layer 0.
    pub ef: usize,
    /// Deadline checked before each layer's search.
    pub timeout: Option<Duration>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            ef: DEFAULT_EF,
            timeout: None,
        }
    }
}

impl SearchParams {
    /// Parameters asking for `k` neighbors with the default width.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Set the layer-0 width.
    pub fn with_ef(mut self, ef: usize) -> Self {
        self.ef = ef;
        self
    }

    /// Abort the query at the next layer boundary once `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject `k < 1` and `ef < 1`.
    pub fn validate(&self) -> Result<()> {
        if self.k < 1 {
            return Err(LayeredKnnError::invalid_argument("k must be at least 1"));
        }
        if self.ef < 1 {
            return Err(LayeredKnnError::invalid_argument("ef must be at least 1"));
        }
        Ok(())
    }

    /// Width actually used at layer 0: never narrower than `k`.
    pub fn base_layer_width(&self) -> usize {
        self.ef.max(self.k)
    }
}

/// Find the `k` nearest points to `query` using Euclidean distance.
///
/// Returns one trace step per layer, top layer first; the last step holds the
/// answer (see [`KnnTrace::neighbors`]).
///
/// ```
/// use layered_knn::{fixtures, knn_search, PointId};
///
/// let graph = fixtures::simple().unwrap();
/// let trace = knn_search(&graph, &[160.0, 60.0], 2, 3).unwrap();
///
/// assert_eq!(trace.len(), 3);
/// assert_eq!(trace.neighbor_ids(), vec![PointId(4), PointId(5)]);
/// ```
pub fn knn_search(graph: &LayeredGraph, query: &[f32], k: usize, ef: usize) -> Result<KnnTrace> {
    let params = SearchParams::new(k).with_ef(ef);
    knn_search_with(graph, query, &params, &DistanceMetric::Euclidean)
}

/// Find the nearest points to `query` with explicit parameters and metric.
pub fn knn_search_with<M: Metric + ?Sized>(
    graph: &LayeredGraph,
    query: &[f32],
    params: &SearchParams,
    metric: &M,
) -> Result<KnnTrace> {
    knn_search_with_stats(graph, query, params, metric).map(|(trace, _)| trace)
}

/// Like [`knn_search_with`], also reporting how much work the query did.
///
/// # Errors
///
/// - [`LayeredKnnError::InvalidArgument`] for `k < 1`, `ef < 1` or a
///   non-finite query.
/// - [`LayeredKnnError::InvalidGraph`] if the graph has no layers or its
///   points disagree on their dimension.
/// - [`LayeredKnnError::EntryPointNotFound`] if the declared entry point is
///   not in the graph. Checked before any layer is searched.
/// - [`LayeredKnnError::DimensionMismatch`] if the query dimension differs
///   from the graph's.
/// - [`LayeredKnnError::Timeout`] if the deadline passed at a layer boundary.
pub fn knn_search_with_stats<M: Metric + ?Sized>(
    graph: &LayeredGraph,
    query: &[f32],
    params: &SearchParams,
    metric: &M,
) -> Result<(KnnTrace, SearchStatistics)> {
    let start = Instant::now();
    params.validate()?;

    if graph.layer_count() < 1 {
        return Err(LayeredKnnError::invalid_graph("layer count must be at least 1"));
    }
    let entry_id = graph.entry_point_id();
    let mut entry = graph
        .slot(entry_id)
        .ok_or(LayeredKnnError::EntryPointNotFound(entry_id))?;
    check_query(graph, query)?;

    let mut recorder = TraceRecorder::with_capacity(graph.layer_count());
    let mut stats = SearchStatsBuilder::new();

    for layer in (1..graph.layer_count()).rev() {
        check_deadline(start, params.timeout)?;

        let walk = walk_layer(graph, query, &[entry], UPPER_LAYER_EF, layer, metric);
        let next = walk.result.first().map(|n| n.slot).unwrap_or(entry);

        debug!(
            layer,
            from = %graph.point_at(entry).id,
            to = %graph.point_at(next).id,
            visited = walk.discovered.len(),
            "greedy descent"
        );

        stats.add_layer(walk.discovered.len(), walk.explored.len());
        recorder.record(trace_step(
            graph,
            layer,
            entry,
            next,
            UPPER_LAYER_EF,
            UPPER_LAYER_EF,
            params.k,
            &walk.result,
            &walk,
        ));
        entry = next;
    }

    check_deadline(start, params.timeout)?;

    let width = params.base_layer_width();
    let walk = walk_layer(graph, query, &[entry], width, 0, metric);
    let nearest = &walk.result[..walk.result.len().min(params.k)];

    debug!(
        from = %graph.point_at(entry).id,
        width,
        visited = walk.discovered.len(),
        found = nearest.len(),
        "base layer search"
    );

    stats.add_layer(walk.discovered.len(), walk.explored.len());
    stats.results_returned(nearest.len());
    recorder.record(trace_step(
        graph, 0, entry, entry, params.ef, width, params.k, nearest, &walk,
    ));

    stats.set_query_time(start.elapsed());
    Ok((recorder.finish(), stats.build()))
}

fn check_deadline(start: Instant, timeout: Option<Duration>) -> Result<()> {
    match timeout {
        Some(limit) if start.elapsed() >= limit => Err(LayeredKnnError::Timeout),
        _ => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
fn trace_step(
    graph: &LayeredGraph,
    layer: usize,
    entry: NodeId,
    current: NodeId,
    ef: usize,
    width: usize,
    k: usize,
    result: &[ScoredNode],
    walk: &LayerWalk,
) -> TraceStep {
    let id = |slot: NodeId| graph.point_at(slot).id;
    TraceStep {
        layer,
        entry_point: id(entry),
        current_point: id(current),
        ef,
        width,
        k,
        result: LayerWalk::neighbors(graph, result),
        candidates_explored: walk.explored.iter().map(|n| id(n.slot)).collect(),
        visited: walk.discovered.iter().map(|n| id(n.slot)).collect(),
        distances: walk
            .discovered
            .iter()
            .map(|n| (id(n.slot), n.distance))
            .collect(),
    }
}
