//! Distance metrics used to compare a query against graph points.
//!
//! Searches are generic over the [`Metric`] trait, so callers can plug in
//! their own dissimilarity. [`DistanceMetric`] covers the common cases and
//! defaults to Euclidean.

pub mod scalar;

pub use scalar::{euclidean_distance, euclidean_distance_squared, manhattan_distance};

/// A dissimilarity between two points of the same dimensionality.
///
/// Implementations must be symmetric, non-negative, and zero for identical
/// coordinates. Mismatched dimensions are a caller error and may panic.
pub trait Metric: Send + Sync {
    /// Compute the distance between `a` and `b`.
    fn distance(&self, a: &[f32], b: &[f32]) -> f32;
}

/// Supported distance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Straight-line (L2) distance. Used by [`crate::knn_search`].
    #[default]
    Euclidean,
    /// L2 without the final sqrt; same neighbor ordering, cheaper.
    EuclideanSquared,
    /// Sum of absolute coordinate differences (L1).
    Manhattan,
}

impl DistanceMetric {
    /// Distance between `a` and `b` under this metric.
    ///
    /// Panics if the slices differ in length.
    #[inline]
    pub fn compute(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::EuclideanSquared => euclidean_distance_squared(a, b),
            DistanceMetric::Manhattan => manhattan_distance(a, b),
        }
    }
}

impl Metric for DistanceMetric {
    #[inline]
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        self.compute(a, b)
    }
}
