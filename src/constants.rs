//! Default search parameters and storage sizes.

/// Constants for k-nearest-neighbor queries.
pub mod search {
    /// Default result-set width at layer 0.
    pub const DEFAULT_EF: usize = 1;

    /// Default number of neighbors returned.
    pub const DEFAULT_K: usize = 1;

    /// Width used for the greedy descent through every layer above 0.
    pub const UPPER_LAYER_EF: usize = 1;
}

/// Constants for graph storage.
pub mod graph {
    /// Neighbors stored inline per (point, layer) before spilling to the heap.
    /// Sample graphs rarely exceed this degree.
    pub const INLINE_NEIGHBORS: usize = 8;
}
