//! Per-layer snapshots of a k-NN query.
//!
//! The driver hands one [`TraceStep`] per visited layer to a
//! [`TraceRecorder`]; the finished [`KnnTrace`] is owned by the caller and is
//! what visualizers replay.

use crate::types::PointId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A point together with its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The matched point.
    pub id: PointId,
    /// Distance from the query.
    pub distance: f32,
}

impl Neighbor {
    /// Create a new Neighbor.
    #[inline]
    pub fn new(id: PointId, distance: f32) -> Self {
        Self { id, distance }
    }
}

impl From<Neighbor> for (PointId, f32) {
    fn from(neighbor: Neighbor) -> Self {
        (neighbor.id, neighbor.distance)
    }
}

/// Search state captured at the end of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Layer this step searched.
    pub layer: usize,
    /// Point the layer search started from.
    pub entry_point: PointId,
    /// Representative point: the next entry point above layer 0, the layer-0
    /// entry point on the final step.
    pub current_point: PointId,
    /// Result-set width asked for: 1 above layer 0, the caller's `ef` on the
    /// final step.
    pub ef: usize,
    /// Result-set width actually searched with. Differs from `ef` only on
    /// the final step, where it is raised to `k`.
    pub width: usize,
    /// Number of neighbors requested by the query.
    pub k: usize,
    /// Result set, nearest first. Truncated to `k` on the final step.
    pub result: Vec<Neighbor>,
    /// Points popped from the candidate queue, in pop order.
    pub candidates_explored: Vec<PointId>,
    /// Every point touched, in discovery order, each exactly once.
    pub visited: Vec<PointId>,
    /// Distance from the query of every visited point.
    pub distances: BTreeMap<PointId, f32>,
}

impl TraceStep {
    /// Whether this is the layer-0 step carrying the final answer.
    pub fn is_final(&self) -> bool {
        self.layer == 0
    }

    /// Nearest point found on this layer.
    pub fn best(&self) -> Option<&Neighbor> {
        self.result.first()
    }

    /// Distance of a visited point from the query.
    pub fn distance_to(&self, id: PointId) -> Option<f32> {
        self.distances.get(&id).copied()
    }

    /// Whether `id` was touched on this layer.
    pub fn was_visited(&self, id: PointId) -> bool {
        self.distances.contains_key(&id)
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_final() {
            write!(f, "Layer 0: search from point {} with ef={}", self.entry_point, self.ef)?;
            if self.width != self.ef {
                write!(f, " (width {})", self.width)?;
            }
            write!(
                f,
                " found {} of {} requested neighbors",
                self.result.len(),
                self.k
            )?;
            for (rank, neighbor) in self.result.iter().enumerate() {
                let sep = if rank == 0 { ": " } else { ", " };
                write!(f, "{}{} ({:.2})", sep, neighbor.id, neighbor.distance)?;
            }
            Ok(())
        } else {
            write!(
                f,
                "Layer {}: greedy search from point {} settled on point {} after visiting {} points",
                self.layer,
                self.entry_point,
                self.current_point,
                self.visited.len()
            )
        }
    }
}

/// Accumulates trace steps in call order.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    steps: Vec<TraceStep>,
}

impl TraceRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder sized for a graph with `layers` layers.
    pub fn with_capacity(layers: usize) -> Self {
        Self {
            steps: Vec::with_capacity(layers),
        }
    }

    /// Append a step.
    pub fn record(&mut self, step: TraceStep) {
        self.steps.push(step);
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Seal the recorded steps.
    pub fn finish(self) -> KnnTrace {
        KnnTrace { steps: self.steps }
    }
}

/// The finished, read-only trace of one k-NN query, top layer first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnnTrace {
    steps: Vec<TraceStep>,
}

impl KnnTrace {
    /// All steps, top layer first.
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// The layer-0 step, if the query got that far.
    pub fn final_step(&self) -> Option<&TraceStep> {
        self.steps.last().filter(|step| step.is_final())
    }

    /// The k nearest neighbors, nearest first.
    pub fn neighbors(&self) -> &[Neighbor] {
        self.final_step().map(|step| step.result.as_slice()).unwrap_or(&[])
    }

    /// Ids of the k nearest neighbors, nearest first.
    pub fn neighbor_ids(&self) -> Vec<PointId> {
        self.neighbors().iter().map(|n| n.id).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return true if the trace has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over the steps.
    pub fn iter(&self) -> std::slice::Iter<'_, TraceStep> {
        self.steps.iter()
    }

    /// Take ownership of the steps.
    pub fn into_steps(self) -> Vec<TraceStep> {
        self.steps
    }
}

impl<'a> IntoIterator for &'a KnnTrace {
    type Item = &'a TraceStep;
    type IntoIter = std::slice::Iter<'a, TraceStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(layer: usize, result: &[(u64, f32)]) -> TraceStep {
        let result: Vec<Neighbor> = result
            .iter()
            .map(|&(id, d)| Neighbor::new(PointId(id), d))
            .collect();
        TraceStep {
            layer,
            entry_point: PointId(0),
            current_point: result.first().map(|n| n.id).unwrap_or(PointId(0)),
            ef: 3,
            width: 3,
            k: 2,
            candidates_explored: result.iter().map(|n| n.id).collect(),
            visited: result.iter().map(|n| n.id).collect(),
            distances: result.iter().map(|n| (n.id, n.distance)).collect(),
            result,
        }
    }

    #[test]
    fn test_recorder_preserves_order() {
        let mut recorder = TraceRecorder::with_capacity(3);
        assert!(recorder.is_empty());
        recorder.record(step(2, &[(1, 72.1)]));
        recorder.record(step(1, &[(4, 14.1)]));
        recorder.record(step(0, &[(4, 14.1), (5, 90.5)]));
        assert_eq!(recorder.len(), 3);

        let trace = recorder.finish();
        let layers: Vec<usize> = trace.iter().map(|s| s.layer).collect();
        assert_eq!(layers, vec![2, 1, 0]);
        assert_eq!(trace.neighbor_ids(), vec![PointId(4), PointId(5)]);
    }

    #[test]
    fn test_neighbors_empty_without_final_step() {
        let mut recorder = TraceRecorder::new();
        recorder.record(step(1, &[(4, 14.1)]));
        let trace = recorder.finish();
        assert!(trace.final_step().is_none());
        assert!(trace.neighbors().is_empty());
    }

    #[test]
    fn test_step_lookups() {
        let s = step(0, &[(4, 14.0), (5, 90.5)]);
        assert_eq!(s.best().map(|n| n.id), Some(PointId(4)));
        assert_eq!(s.distance_to(PointId(5)), Some(90.5));
        assert!(s.was_visited(PointId(4)));
        assert!(!s.was_visited(PointId(8)));
    }

    #[test]
    fn test_display() {
        let upper = step(2, &[(1, 72.1)]);
        assert_eq!(
            upper.to_string(),
            "Layer 2: greedy search from point 0 settled on point 1 after visiting 1 points"
        );

        let base = step(0, &[(4, 14.14), (5, 90.55)]);
        assert_eq!(
            base.to_string(),
            "Layer 0: search from point 0 with ef=3 found 2 of 2 requested neighbors: 4 (14.14), 5 (90.55)"
        );

        let widened = TraceStep {
            ef: 1,
            k: 3,
            ..step(0, &[(4, 14.14)])
        };
        assert_eq!(
            widened.to_string(),
            "Layer 0: search from point 0 with ef=1 (width 3) found 1 of 3 requested neighbors: 4 (14.14)"
        );
    }

    #[test]
    fn test_trace_serializes_as_step_list() {
        let mut recorder = TraceRecorder::new();
        recorder.record(step(0, &[(4, 14.0)]));
        let json = serde_json::to_value(recorder.finish()).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["layer"], 0);
        assert_eq!(json[0]["distances"]["4"], 14.0);
    }
}
