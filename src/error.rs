//! Error types for layered-knn operations.
//!
//! Every failure is detected synchronously and surfaced to the caller
//! immediately. Searches perform no I/O, so nothing here is transient.

use crate::types::PointId;
use thiserror::Error;

/// Result type alias using [`LayeredKnnError`].
pub type Result<T> = std::result::Result<T, LayeredKnnError>;

/// Errors that can occur while building or querying a layered graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayeredKnnError {
    /// The graph violates a structural invariant (duplicate ids, dangling
    /// edges, misplaced entry point, ...).
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// The graph's declared entry point is not part of its point set.
    #[error("entry point not found: {0}")]
    EntryPointNotFound(PointId),

    /// A search argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Query dimensions do not match the graph's coordinate dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the points stored in the graph.
        expected: usize,
        /// Dimension of the query that was supplied.
        actual: usize,
    },

    /// The per-query deadline elapsed between two layers.
    #[error("operation timed out")]
    Timeout,
}

impl LayeredKnnError {
    /// Creates a new `InvalidGraph` error.
    pub fn invalid_graph(msg: impl Into<String>) -> Self {
        Self::InvalidGraph(msg.into())
    }

    /// Creates a new `InvalidArgument` error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a new `DimensionMismatch` error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}
