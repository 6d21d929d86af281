//! Community detection for social graphs.
//!
//! Given a graph, find natural groupings where nodes within groups are
//! densely connected, and connections between groups are sparse.
//!
//! ## The Modularity Objective
//!
//! Louvain optimizes **modularity** Q, which compares the actual number of
//! edges within communities to the expected number in a random graph with the
//! same degree sequence:
//!
//! ```text
//! Q = (1/2m) × Σ[A_ij - γ(k_i × k_j)/(2m)] × δ(c_i, c_j)
//! ```
//!
//! Where:
//! - m = total edge weight (sum of all edges)
//! - A_ij = edge weight between i and j
//! - k_i = degree of node i
//! - γ = resolution parameter
//! - δ(c_i, c_j) = 1 if i and j are in same community
//!
//! A good partition has Q > 0: more internal edges than expected by chance.
//! Every node alone scores `-Σ (k_i / 2m)²`, at most 0.
//!
//! ## The Resolution Parameter γ
//!
//! - **γ = 1**: Standard modularity (default)
//! - **γ > 1**: Smaller communities (higher penalty for merging)
//! - **γ < 1**: Larger communities (lower penalty for merging)
//!
//! ## Usage
//!
//! ```rust
//! use socgraph::community::{CommunityDetection, Louvain};
//! use socgraph::store::GraphStore;
//!
//! // Two disconnected pairs
//! let graph = GraphStore::from_index_edges(4, [(0, 1), (2, 3)]).unwrap();
//!
//! let partition = Louvain::new().detect(&graph).unwrap();
//! assert_eq!(partition.assignment(), &[0, 0, 1, 1]);
//! assert!(partition.modularity() > 0.0);
//! ```
//!
//! ## References
//!
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."

mod louvain;
mod partition;
mod traits;
mod weighted;

pub use louvain::Louvain;
pub use partition::{LevelSummary, Partition};
pub use traits::CommunityDetection;

use crate::error::{Error, Result};
use crate::store::GraphStore;

/// Modularity (γ = 1) of an arbitrary assignment on `graph`.
///
/// Community ids may be any values; only equality matters. A graph without
/// edges scores 0.
pub fn modularity(graph: &GraphStore, assignment: &[usize]) -> Result<f64> {
    if assignment.len() != graph.node_count() {
        return Err(Error::DimensionMismatch {
            expected: graph.node_count(),
            found: assignment.len(),
        });
    }
    let (communities, _) = weighted::renumber(assignment);
    Ok(weighted::WeightedGraph::from_store(graph).modularity(&communities, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modularity_ignores_label_values() {
        let g = GraphStore::from_index_edges(4, [(0, 1), (2, 3)]).unwrap();
        let a = modularity(&g, &[0, 0, 1, 1]).unwrap();
        let b = modularity(&g, &[42, 42, 7, 7]).unwrap();
        assert_eq!(a, b);
        assert!((a - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_modularity_length_mismatch() {
        let g = GraphStore::from_index_edges(3, [(0, 1)]).unwrap();
        assert!(matches!(
            modularity(&g, &[0, 0]),
            Err(Error::DimensionMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_modularity_no_edges() {
        let g = GraphStore::from_index_edges(3, Vec::new()).unwrap();
        assert_eq!(modularity(&g, &[0, 1, 2]).unwrap(), 0.0);
    }
}
