//! Community detection traits.

use super::partition::Partition;
use crate::error::Result;
use crate::store::GraphStore;

/// Trait for community detection algorithms.
pub trait CommunityDetection {
    /// Detect communities in a graph.
    ///
    /// Returns a partition covering every node of `graph`.
    fn detect(&self, graph: &GraphStore) -> Result<Partition>;

    /// Get the resolution parameter (if applicable).
    fn resolution(&self) -> f64 {
        1.0
    }
}
