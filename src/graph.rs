//! Immutable layered proximity graph.
//!
//! A [`LayeredGraph`] owns its points and edges and never changes after
//! construction. Neighbor lists are flattened per layer at construction time
//! so searches only do slice lookups:
//!
//! - Points are addressed internally by dense slots (their position in the
//!   point list); [`PointId`] is only used at the API boundary.
//! - An edge at layer `L` contributes each endpoint to the other's layer-`L`
//!   list, but only if that endpoint is itself visible at `L`.
//! - Neighbor order follows edge declaration order, which keeps searches
//!   deterministic.
//!
//! Graphs come from two places. [`build_graph`] and [`GraphBuilder`] validate
//! every invariant before handing out a graph. Deserializing a [`GraphData`]
//! trusts the supplier and only indexes the data; the search driver re-checks
//! what it depends on.

use crate::constants::graph::INLINE_NEIGHBORS;
use crate::error::{LayeredKnnError, Result};
use crate::point::{Edge, Point};
use crate::types::PointId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Dense slot of a point inside a graph.
pub(crate) type NodeId = usize;

type Neighbors = SmallVec<[NodeId; INLINE_NEIGHBORS]>;

/// Plain, serializable form of a layered graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub points: Vec<Point>,
    pub edges: Vec<Edge>,
    #[serde(alias = "layers")]
    pub layer_count: usize,
    #[serde(alias = "entry_point_id")]
    pub entry_point: PointId,
}

/// An immutable multi-layer proximity graph.
///
/// Safe to share across threads; every query allocates its own working state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "GraphData", into = "GraphData")]
pub struct LayeredGraph {
    points: Vec<Point>,
    edges: Vec<Edge>,
    slots: HashMap<PointId, NodeId>,
    /// `adjacency[layer][slot]`
    adjacency: Vec<Vec<Neighbors>>,
    layer_count: usize,
    entry_point: PointId,
    dim: usize,
    /// First point whose dimension differs from `dim`, if any.
    ragged: Option<PointId>,
}

/// Validate points and edges and return an immutable graph.
///
/// Fails with [`LayeredKnnError::InvalidGraph`] if any structural invariant
/// does not hold.
pub fn build_graph(
    points: Vec<Point>,
    edges: Vec<Edge>,
    layer_count: usize,
    entry_point: PointId,
) -> Result<LayeredGraph> {
    let graph = LayeredGraph::from(GraphData {
        points,
        edges,
        layer_count,
        entry_point,
    });
    graph.validate()?;

    debug!(
        points = graph.len(),
        edges = graph.edges.len(),
        layers = graph.layer_count,
        entry_point = %graph.entry_point,
        "built layered graph"
    );
    Ok(graph)
}

impl From<GraphData> for LayeredGraph {
    fn from(data: GraphData) -> Self {
        let GraphData {
            points,
            edges,
            layer_count,
            entry_point,
        } = data;

        let mut slots = HashMap::with_capacity(points.len());
        for (slot, point) in points.iter().enumerate() {
            slots.entry(point.id).or_insert(slot);
        }

        let mut adjacency: Vec<Vec<Neighbors>> =
            (0..layer_count).map(|_| vec![Neighbors::new(); points.len()]).collect();
        let mut linked = HashSet::with_capacity(edges.len());
        let mut collapsed = 0usize;

        for edge in &edges {
            if edge.a == edge.b || edge.layer >= layer_count {
                continue;
            }
            let (Some(&a), Some(&b)) = (slots.get(&edge.a), slots.get(&edge.b)) else {
                continue;
            };
            if !linked.insert(edge.key()) {
                collapsed += 1;
                continue;
            }
            let lists = &mut adjacency[edge.layer];
            if points[b].is_visible_at(edge.layer) {
                lists[a].push(b);
            }
            if points[a].is_visible_at(edge.layer) {
                lists[b].push(a);
            }
        }

        if collapsed > 0 {
            debug!(collapsed, "collapsed duplicate edges");
        }

        let dim = points.first().map(Point::dim).unwrap_or(0);
        let ragged = points.iter().find(|p| p.dim() != dim).map(|p| p.id);
        Self {
            points,
            edges,
            slots,
            adjacency,
            layer_count,
            entry_point,
            dim,
            ragged,
        }
    }
}

impl From<LayeredGraph> for GraphData {
    fn from(graph: LayeredGraph) -> Self {
        Self {
            points: graph.points,
            edges: graph.edges,
            layer_count: graph.layer_count,
            entry_point: graph.entry_point,
        }
    }
}

impl LayeredGraph {
    /// Check every structural invariant of the graph.
    pub fn validate(&self) -> Result<()> {
        if self.layer_count < 1 {
            return Err(LayeredKnnError::invalid_graph("layer count must be at least 1"));
        }
        if self.dim == 0 {
            return Err(LayeredKnnError::invalid_graph(
                "points must have at least one coordinate",
            ));
        }

        let mut seen = HashSet::with_capacity(self.points.len());
        for point in &self.points {
            if !seen.insert(point.id) {
                return Err(LayeredKnnError::invalid_graph(format!(
                    "duplicate point id {}",
                    point.id
                )));
            }
            if point.dim() != self.dim {
                return Err(LayeredKnnError::invalid_graph(format!(
                    "point {} has {} coordinates, expected {}",
                    point.id,
                    point.dim(),
                    self.dim
                )));
            }
            if point.coords.iter().any(|c| !c.is_finite()) {
                return Err(LayeredKnnError::invalid_graph(format!(
                    "point {} has non-finite coordinates",
                    point.id
                )));
            }
            if point.max_layer >= self.layer_count {
                return Err(LayeredKnnError::invalid_graph(format!(
                    "point {} reaches layer {} but the graph has {} layers",
                    point.id, point.max_layer, self.layer_count
                )));
            }
            if point.native_layer > point.max_layer {
                return Err(LayeredKnnError::invalid_graph(format!(
                    "point {} is inserted at layer {} above its max layer {}",
                    point.id, point.native_layer, point.max_layer
                )));
            }
        }

        for edge in &self.edges {
            if edge.a == edge.b {
                return Err(LayeredKnnError::invalid_graph(format!(
                    "self-loop on point {} at layer {}",
                    edge.a, edge.layer
                )));
            }
            if edge.layer >= self.layer_count {
                return Err(LayeredKnnError::invalid_graph(format!(
                    "edge {}-{} belongs to layer {} but the graph has {} layers",
                    edge.a, edge.b, edge.layer, self.layer_count
                )));
            }
            for id in [edge.a, edge.b] {
                let point = self.point(id).ok_or_else(|| {
                    LayeredKnnError::invalid_graph(format!(
                        "edge {}-{} references unknown point {}",
                        edge.a, edge.b, id
                    ))
                })?;
                if !point.is_visible_at(edge.layer) {
                    return Err(LayeredKnnError::invalid_graph(format!(
                        "edge {}-{} at layer {} reaches point {} whose max layer is {}",
                        edge.a, edge.b, edge.layer, id, point.max_layer
                    )));
                }
            }
        }

        let entry = self.entry_point().ok_or_else(|| {
            LayeredKnnError::invalid_graph(format!(
                "entry point {} is not in the point set",
                self.entry_point
            ))
        })?;
        if entry.max_layer != self.top_layer() {
            return Err(LayeredKnnError::invalid_graph(format!(
                "entry point {} reaches layer {}, expected the top layer {}",
                entry.id,
                entry.max_layer,
                self.top_layer()
            )));
        }

        Ok(())
    }

    /// Number of layers; layers are numbered `0..layer_count()`.
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Index of the topmost layer.
    pub fn top_layer(&self) -> usize {
        self.layer_count.saturating_sub(1)
    }

    /// The declared entry point id.
    pub fn entry_point_id(&self) -> PointId {
        self.entry_point
    }

    /// The declared entry point, if it is part of the point set.
    pub fn entry_point(&self) -> Option<&Point> {
        self.point(self.entry_point)
    }

    /// Whether `id` is the graph's entry point.
    pub fn is_entry_point(&self, id: PointId) -> bool {
        id == self.entry_point
    }

    /// Look up a point by id.
    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.slot(id).map(|slot| &self.points[slot])
    }

    /// All points in declaration order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Points visible at `layer`.
    pub fn points_at_layer(&self, layer: usize) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter().filter(move |p| p.is_visible_at(layer))
    }

    /// Neighbors of `id` at exactly `layer`, in edge declaration order.
    ///
    /// Empty if the point is unknown or the layer does not exist.
    pub fn neighbors(&self, id: PointId, layer: usize) -> impl Iterator<Item = &Point> + '_ {
        let slots: &[NodeId] = match self.slot(id) {
            Some(slot) => self.neighbor_slots(slot, layer),
            None => &[],
        };
        slots.iter().map(move |&slot| &self.points[slot])
    }

    /// Coordinate dimension of the first point (0 for an empty graph). All
    /// points share it unless [`validate`](Self::validate) fails.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Fail if points disagree on their dimension. Only unvalidated
    /// (deserialized) graphs can.
    pub(crate) fn check_dimensions(&self) -> Result<()> {
        match self.ragged {
            Some(id) => Err(LayeredKnnError::invalid_graph(format!(
                "point {} does not have {} coordinates like the first point",
                id, self.dim
            ))),
            None => Ok(()),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return true if the graph has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub(crate) fn slot(&self, id: PointId) -> Option<NodeId> {
        self.slots.get(&id).copied()
    }

    #[inline]
    pub(crate) fn point_at(&self, slot: NodeId) -> &Point {
        &self.points[slot]
    }

    #[inline]
    pub(crate) fn neighbor_slots(&self, slot: NodeId, layer: usize) -> &[NodeId] {
        match self.adjacency.get(layer) {
            Some(lists) => &lists[slot],
            None => &[],
        }
    }
}

/// Fluent construction of a validated [`LayeredGraph`].
///
/// By default each point's `max_layer` is raised to the highest layer any of
/// its edges belongs to, so fixtures only need to declare insertion layers.
///
/// ```
/// use layered_knn::{GraphBuilder, Point};
///
/// let graph = GraphBuilder::new()
///     .point(Point::planar(0, 0.0, 0.0, 1))
///     .point(Point::planar(1, 1.0, 0.0, 0))
///     .edge(0, 1, 0)
///     .entry_point(0)
///     .build()
///     .unwrap();
/// assert_eq!(graph.layer_count(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    points: Vec<Point>,
    edges: Vec<Edge>,
    layer_count: Option<usize>,
    entry_point: Option<PointId>,
    derive_max_layers: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            edges: Vec::new(),
            layer_count: None,
            entry_point: None,
            derive_max_layers: true,
        }
    }

    /// Add a point.
    pub fn point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    /// Add several points.
    pub fn points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points.extend(points);
        self
    }

    /// Connect `a` and `b` at `layer`.
    pub fn edge(mut self, a: u64, b: u64, layer: usize) -> Self {
        self.edges.push(Edge::new(a, b, layer));
        self
    }

    /// Add several edges.
    pub fn edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Set the number of layers. Defaults to one above the highest `max_layer`.
    pub fn layers(mut self, layer_count: usize) -> Self {
        self.layer_count = Some(layer_count);
        self
    }

    /// Designate the entry point.
    pub fn entry_point(mut self, id: u64) -> Self {
        self.entry_point = Some(PointId(id));
        self
    }

    /// Toggle deriving `max_layer` from incident edges (on by default).
    pub fn derive_max_layers(mut self, enabled: bool) -> Self {
        self.derive_max_layers = enabled;
        self
    }

    /// Validate and build the graph.
    pub fn build(mut self) -> Result<LayeredGraph> {
        let entry_point = self
            .entry_point
            .ok_or_else(|| LayeredKnnError::invalid_graph("no entry point declared"))?;

        if self.derive_max_layers {
            let mut reach: HashMap<PointId, usize> = HashMap::new();
            for edge in &self.edges {
                for id in [edge.a, edge.b] {
                    let top = reach.entry(id).or_insert(0);
                    *top = (*top).max(edge.layer);
                }
            }
            for point in &mut self.points {
                let edge_top = reach.get(&point.id).copied().unwrap_or(0);
                point.max_layer = point.max_layer.max(point.native_layer).max(edge_top);
            }
        }

        let layer_count = self.layer_count.unwrap_or_else(|| {
            self.points
                .iter()
                .map(|p| p.max_layer + 1)
                .max()
                .unwrap_or(0)
        });

        build_graph(self.points, self.edges, layer_count, entry_point)
    }
}
