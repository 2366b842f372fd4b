//! Per-query work counters.
//!
//! [`knn_search_with_stats`](crate::knn_search_with_stats) fills one
//! [`SearchStatistics`] per query:
//!
//! ```
//! use layered_knn::{fixtures, knn_search_with_stats, DistanceMetric, SearchParams};
//!
//! let graph = fixtures::simple().unwrap();
//! let params = SearchParams::new(2).with_ef(3);
//! let (trace, stats) =
//!     knn_search_with_stats(&graph, &[160.0, 60.0], &params, &DistanceMetric::Euclidean).unwrap();
//!
//! assert_eq!(stats.layers_searched, trace.len());
//! println!("{}", stats.summary());
//! ```

use std::time::Duration;

/// Work done by a single k-NN query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchStatistics {
    /// Wall time from argument validation to the finished trace.
    pub query_time: Duration,
    /// Number of layers searched.
    pub layers_searched: usize,
    /// Points touched across all layers. Each costs one distance computation.
    pub nodes_visited: usize,
    /// Candidates popped off the exploration queue across all layers.
    pub candidates_explored: usize,
    /// Neighbors returned to the caller.
    pub results_returned: usize,
}

impl SearchStatistics {
    /// Query time in milliseconds.
    pub fn query_time_ms(&self) -> f32 {
        self.query_time.as_secs_f32() * 1000.0
    }

    /// Mean number of points touched per searched layer.
    pub fn visited_per_layer(&self) -> f32 {
        if self.layers_searched == 0 {
            return 0.0;
        }
        self.nodes_visited as f32 / self.layers_searched as f32
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} layers, {} points visited, {} expanded, {} returned in {:.3}ms",
            self.layers_searched,
            self.nodes_visited,
            self.candidates_explored,
            self.results_returned,
            self.query_time_ms()
        )
    }
}

/// Accumulates counters while a query runs.
#[derive(Debug, Default)]
pub struct SearchStatsBuilder {
    stats: SearchStatistics,
}

impl SearchStatsBuilder {
    /// Start with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished layer search.
    pub fn add_layer(&mut self, visited: usize, explored: usize) {
        self.stats.layers_searched += 1;
        self.stats.nodes_visited += visited;
        self.stats.candidates_explored += explored;
    }

    /// Record the number of neighbors handed back.
    pub fn results_returned(&mut self, count: usize) {
        self.stats.results_returned = count;
    }

    /// Record the elapsed wall time.
    pub fn set_query_time(&mut self, duration: Duration) {
        self.stats.query_time = duration;
    }

    /// Finish collecting.
    pub fn build(self) -> SearchStatistics {
        self.stats
    }
}
