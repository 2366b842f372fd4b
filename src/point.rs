use crate::types::PointId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A graph point with an ID, coordinates and its layer span.
/// Coordinates are stored in an Arc for cheap cloning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    #[serde(alias = "coordinates")]
    pub coords: Arc<[f32]>,
    /// Layer the point was notionally inserted at. Informational only.
    #[serde(default)]
    pub native_layer: usize,
    /// Highest layer the point participates in.
    #[serde(default)]
    pub max_layer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Point {
    /// Create a new point inserted at `native_layer`.
    ///
    /// `max_layer` starts equal to `native_layer`; use [`Point::with_max_layer`]
    /// or let [`crate::GraphBuilder`] derive it from the edges.
    pub fn new(id: u64, coords: Vec<f32>, native_layer: usize) -> Self {
        Self {
            id: PointId(id),
            coords: coords.into(),
            native_layer,
            max_layer: native_layer,
            label: None,
        }
    }

    /// Create a point in the plane.
    pub fn planar(id: u64, x: f32, y: f32, native_layer: usize) -> Self {
        Self::new(id, vec![x, y], native_layer)
    }

    /// Set the highest layer this point participates in.
    pub fn with_max_layer(mut self, max_layer: usize) -> Self {
        self.max_layer = max_layer;
        self
    }

    /// Attach a display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Return the dimensionality of this point.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// A point is visible at `layer` iff its `max_layer` reaches it.
    #[inline]
    pub fn is_visible_at(&self, layer: usize) -> bool {
        self.max_layer >= layer
    }
}

/// An undirected connection between two points, belonging to exactly one layer.
///
/// Accepts both `a`/`b` and `from`/`to` field names when deserialized; the
/// orientation carries no meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    #[serde(alias = "from")]
    pub a: PointId,
    #[serde(alias = "to")]
    pub b: PointId,
    pub layer: usize,
}

impl Edge {
    /// Create a new edge between `a` and `b` at `layer`.
    pub fn new(a: u64, b: u64, layer: usize) -> Self {
        Self {
            a: PointId(a),
            b: PointId(b),
            layer,
        }
    }

    /// Orientation-free key, equal for `{a, b}` and `{b, a}` on the same layer.
    pub fn key(&self) -> (PointId, PointId, usize) {
        (self.a.min(self.b), self.a.max(self.b), self.layer)
    }
}
