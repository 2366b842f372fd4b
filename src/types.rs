//! Core newtypes for type-safe graph operations.
//!
//! Points are addressed by a caller-chosen [`PointId`]. Internally the graph
//! works with dense slot indices; keeping the two apart at the type level
//! prevents passing one where the other is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a point in a layered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct PointId(pub u64);

impl PointId {
    /// Create a new PointId.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PointId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<PointId> for u64 {
    #[inline]
    fn from(id: PointId) -> Self {
        id.0
    }
}
