//! Exact nearest-neighbor reference for evaluating graph search.
//!
//! Computes distances to every candidate point and keeps the k closest. Used
//! as ground truth in tests and demos; O(n) per query.

use crate::distance::Metric;
use crate::error::{LayeredKnnError, Result};
use crate::graph::{LayeredGraph, NodeId};
use crate::search::layer::{check_query, ScoredNode};
use crate::search::trace::Neighbor;
use crate::types::PointId;
use std::collections::{BinaryHeap, HashSet, VecDeque};

/// The `k` points visible at `layer` nearest to `query`, nearest first.
///
/// Ties are ordered by position in the graph's point list.
pub fn exact_knn<M: Metric + ?Sized>(
    graph: &LayeredGraph,
    query: &[f32],
    k: usize,
    layer: usize,
    metric: &M,
) -> Result<Vec<Neighbor>> {
    check_layer(graph, layer)?;
    check_query(graph, query)?;

    let slots = (0..graph.len()).filter(|&slot| graph.point_at(slot).is_visible_at(layer));
    Ok(top_k(graph, query, k, slots, metric))
}

/// Like [`exact_knn`], restricted to the points reachable from `start`
/// through layer-`layer` edges.
///
/// This is the best any search entering the layer at `start` can return.
pub fn exact_knn_from<M: Metric + ?Sized>(
    graph: &LayeredGraph,
    query: &[f32],
    k: usize,
    start: PointId,
    layer: usize,
    metric: &M,
) -> Result<Vec<Neighbor>> {
    check_layer(graph, layer)?;
    check_query(graph, query)?;

    let slots = reachable_slots(graph, start, layer);
    Ok(top_k(graph, query, k, slots.into_iter(), metric))
}

/// Points reachable from `start` using only layer-`layer` edges, in
/// breadth-first order with `start` first.
///
/// Empty if `start` is unknown or not present at `layer`.
pub fn reachable_at_layer(graph: &LayeredGraph, start: PointId, layer: usize) -> Vec<PointId> {
    reachable_slots(graph, start, layer)
        .into_iter()
        .map(|slot| graph.point_at(slot).id)
        .collect()
}

/// Fraction of the first `k` ground-truth ids found among the first `k`
/// predicted ids.
pub fn recall_at_k(predicted: &[PointId], ground_truth: &[PointId], k: usize) -> f32 {
    if k == 0 {
        return 0.0;
    }
    let pred_set: HashSet<PointId> = predicted.iter().take(k).copied().collect();
    let truth_set: HashSet<PointId> = ground_truth.iter().take(k).copied().collect();

    let intersection = pred_set.intersection(&truth_set).count();
    intersection as f32 / k as f32
}

fn check_layer(graph: &LayeredGraph, layer: usize) -> Result<()> {
    if layer >= graph.layer_count() {
        return Err(LayeredKnnError::invalid_argument(format!(
            "layer {} does not exist in a graph with {} layers",
            layer,
            graph.layer_count()
        )));
    }
    Ok(())
}

fn reachable_slots(graph: &LayeredGraph, start: PointId, layer: usize) -> Vec<NodeId> {
    let Some(start) = graph.slot(start) else {
        return Vec::new();
    };
    if layer >= graph.layer_count() || !graph.point_at(start).is_visible_at(layer) {
        return Vec::new();
    }

    let mut seen = vec![false; graph.len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);
    seen[start] = true;

    while let Some(slot) = queue.pop_front() {
        order.push(slot);
        for &next in graph.neighbor_slots(slot, layer) {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    order
}

fn top_k<M: Metric + ?Sized>(
    graph: &LayeredGraph,
    query: &[f32],
    k: usize,
    slots: impl Iterator<Item = NodeId>,
    metric: &M,
) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }
    // Max-heap on (distance, slot): the top is the current worst kept point.
    let mut heap: BinaryHeap<ScoredNode> = BinaryHeap::with_capacity(k + 1);

    for slot in slots {
        let node = ScoredNode {
            slot,
            distance: metric.distance(query, &graph.point_at(slot).coords),
            seq: slot,
        };
        heap.push(node);
        if heap.len() > k {
            heap.pop();
        }
    }

    let nearest = heap.into_sorted_vec();
    nearest
        .iter()
        .map(|n| Neighbor::new(graph.point_at(n.slot).id, n.distance))
        .collect()
}
