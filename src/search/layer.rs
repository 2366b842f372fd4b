//! Bounded-width greedy expansion within a single layer (SEARCH-LAYER).
//!
//! Two heaps drive the search:
//!
//! - `candidates` is a min-heap of points still to expand.
//! - `results` is a max-heap holding at most `ef` best points so far (W).
//!
//! The loop pops the nearest candidate and stops as soon as it is farther
//! than the worst kept result. Neighbors of that candidate are admitted if
//! they beat the worst result as it stood at the pop, or if W is not yet full;
//! eviction always drops the current farthest. With `ef = 1` this is plain
//! greedy descent.
//!
//! Ties are broken by discovery order: the earliest discovered candidate is
//! expanded first and the earliest discovered of the farthest results is
//! evicted first. Results are returned nearest first, ties by discovery.

use crate::distance::Metric;
use crate::error::{LayeredKnnError, Result};
use crate::graph::{LayeredGraph, NodeId};
use crate::search::trace::Neighbor;
use crate::types::PointId;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::trace;

/// A point slot with its distance and discovery sequence number.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScoredNode {
    pub(crate) slot: NodeId,
    pub(crate) distance: f32,
    pub(crate) seq: usize,
}

impl PartialEq for ScoredNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredNode {}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredNode {
    /// Nearer first; among equal distances, earlier discovered first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Max-heap key for the result set: farthest on top, earliest discovered
/// among ties.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Farthest(ScoredNode);

impl PartialOrd for Farthest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Farthest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .distance
            .total_cmp(&other.0.distance)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

/// Raw outcome of one layer walk, still in slot space.
#[derive(Debug, Clone)]
pub(crate) struct LayerWalk {
    /// Kept results, nearest first.
    pub(crate) result: Vec<ScoredNode>,
    /// Candidates in pop order.
    pub(crate) explored: Vec<ScoredNode>,
    /// Every touched point in discovery order.
    pub(crate) discovered: Vec<ScoredNode>,
}

impl LayerWalk {
    pub(crate) fn neighbors(graph: &LayeredGraph, nodes: &[ScoredNode]) -> Vec<Neighbor> {
        nodes
            .iter()
            .map(|n| Neighbor::new(graph.point_at(n.slot).id, n.distance))
            .collect()
    }

    fn into_search(self, graph: &LayeredGraph) -> LayerSearch {
        LayerSearch {
            result: Self::neighbors(graph, &self.result),
            candidates_explored: Self::neighbors(graph, &self.explored),
            visited: Self::neighbors(graph, &self.discovered),
        }
    }
}

/// Outcome of [`search_layer`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSearch {
    /// Best points found (at most `ef`), nearest first.
    pub result: Vec<Neighbor>,
    /// Points popped off the candidate queue, in pop order.
    pub candidates_explored: Vec<Neighbor>,
    /// Every distinct point touched, in discovery order.
    pub visited: Vec<Neighbor>,
}

/// Search one layer of `graph` for the `ef` points nearest to `query`.
///
/// Every entry point must exist and be visible at `layer`.
///
/// # Errors
///
/// - [`LayeredKnnError::InvalidArgument`] if `entry_points` is empty, `ef` is
///   zero, the layer does not exist, an entry point is unknown or not present
///   at `layer`, or the query has non-finite coordinates.
/// - [`LayeredKnnError::DimensionMismatch`] if the query dimension differs from
///   the graph's.
/// - [`LayeredKnnError::InvalidGraph`] if the graph's points disagree on their
///   dimension (possible only for deserialized graphs).
pub fn search_layer<M: Metric + ?Sized>(
    graph: &LayeredGraph,
    query: &[f32],
    entry_points: &[PointId],
    ef: usize,
    layer: usize,
    metric: &M,
) -> Result<LayerSearch> {
    if entry_points.is_empty() {
        return Err(LayeredKnnError::invalid_argument(
            "layer search needs at least one entry point",
        ));
    }
    if ef < 1 {
        return Err(LayeredKnnError::invalid_argument("ef must be at least 1"));
    }
    if layer >= graph.layer_count() {
        return Err(LayeredKnnError::invalid_argument(format!(
            "layer {} does not exist in a graph with {} layers",
            layer,
            graph.layer_count()
        )));
    }
    check_query(graph, query)?;

    let mut entry_slots = Vec::with_capacity(entry_points.len());
    for &id in entry_points {
        let slot = graph.slot(id).ok_or_else(|| {
            LayeredKnnError::invalid_argument(format!("unknown entry point {}", id))
        })?;
        if !graph.point_at(slot).is_visible_at(layer) {
            return Err(LayeredKnnError::invalid_argument(format!(
                "entry point {} is not present at layer {}",
                id, layer
            )));
        }
        entry_slots.push(slot);
    }

    Ok(walk_layer(graph, query, &entry_slots, ef, layer, metric).into_search(graph))
}

/// Reject queries the metric cannot compare against graph points, and
/// graphs whose points the metric cannot compare against each query.
pub(crate) fn check_query(graph: &LayeredGraph, query: &[f32]) -> Result<()> {
    graph.check_dimensions()?;
    if query.len() != graph.dimension() {
        return Err(LayeredKnnError::dimension_mismatch(
            graph.dimension(),
            query.len(),
        ));
    }
    if query.iter().any(|c| !c.is_finite()) {
        return Err(LayeredKnnError::invalid_argument(
            "query coordinates must be finite",
        ));
    }
    Ok(())
}

/// The search loop proper. Arguments are assumed valid.
pub(crate) fn walk_layer<M: Metric + ?Sized>(
    graph: &LayeredGraph,
    query: &[f32],
    entry_slots: &[NodeId],
    ef: usize,
    layer: usize,
    metric: &M,
) -> LayerWalk {
    let mut visited = vec![false; graph.len()];
    let mut discovered: Vec<ScoredNode> = Vec::with_capacity(ef + entry_slots.len());
    let mut explored: Vec<ScoredNode> = Vec::new();
    let mut candidates: BinaryHeap<Reverse<ScoredNode>> = BinaryHeap::with_capacity(ef);
    let mut results: BinaryHeap<Farthest> = BinaryHeap::with_capacity(ef + 1);

    for &slot in entry_slots {
        if visited[slot] {
            continue;
        }
        visited[slot] = true;
        let node = ScoredNode {
            slot,
            distance: metric.distance(query, &graph.point_at(slot).coords),
            seq: discovered.len(),
        };
        discovered.push(node);
        candidates.push(Reverse(node));
        results.push(Farthest(node));
        if results.len() > ef {
            results.pop();
        }
    }

    while let Some(Reverse(current)) = candidates.pop() {
        explored.push(current);

        // Farthest kept distance as of this pop; admissions below compare
        // against it even after W changes.
        let worst_dist = results.peek().map(|f| f.0.distance).unwrap_or(f32::INFINITY);
        if current.distance > worst_dist {
            trace!(
                layer,
                point = %graph.point_at(current.slot).id,
                distance = current.distance,
                worst = worst_dist,
                "nearest candidate cannot improve the result set"
            );
            break;
        }

        for &neighbor in graph.neighbor_slots(current.slot, layer) {
            if visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            let node = ScoredNode {
                slot: neighbor,
                distance: metric.distance(query, &graph.point_at(neighbor).coords),
                seq: discovered.len(),
            };
            discovered.push(node);

            if node.distance < worst_dist || results.len() < ef {
                candidates.push(Reverse(node));
                results.push(Farthest(node));
                if results.len() > ef {
                    results.pop();
                }
            }
        }
    }

    let mut result: Vec<ScoredNode> = results.into_iter().map(|f| f.0).collect();
    result.sort();

    LayerWalk {
        result,
        explored,
        discovered,
    }
}
