//! Scalar distance kernels over point coordinates.
//!
//! Graph points live in low dimensions (the sample graphs are planar), so
//! plain iterator loops are all that is needed here.

/// Euclidean (L2) distance between two coordinate slices.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Sum of squared coordinate differences.
///
/// Orders neighbors exactly like [`euclidean_distance`] without the sqrt.
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    check_dims(a, b);
    a.iter().zip(b).fold(0.0, |acc, (x, y)| {
        let d = x - y;
        acc + d * d
    })
}

/// Manhattan (L1) distance: sum of absolute coordinate differences.
#[inline]
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    check_dims(a, b);
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + (x - y).abs())
}

#[inline]
fn check_dims(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len(), "Point dimensions must match");
}
