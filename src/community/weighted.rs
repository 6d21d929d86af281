//! Weighted meta-graph used between Louvain levels.

use crate::store::GraphStore;
use std::collections::HashMap;

/// Undirected weighted graph with explicit self-loops.
///
/// At the first level every edge has weight 1 and there are no self-loops.
/// After aggregation, node `c` stands for a whole community: its self-loop
/// holds the total weight of edges inside that community, and edges between
/// meta-nodes hold the total weight crossing between the two communities.
/// Self-loops only feed the degree and modularity terms; they never appear in
/// `adj`.
#[derive(Debug, Clone)]
pub(crate) struct WeightedGraph {
    pub(crate) n: usize,
    /// node -> [(neighbor, weight)], neighbor ascending, no self entries
    pub(crate) adj: Vec<Vec<(usize, f64)>>,
    pub(crate) self_loops: Vec<f64>,
    /// k_i = sum of incident weights + 2 * self-loop
    pub(crate) degrees: Vec<f64>,
    /// m: every edge once, self-loops included
    pub(crate) total_weight: f64,
}

impl WeightedGraph {
    pub(crate) fn from_store(graph: &GraphStore) -> Self {
        let n = graph.node_count();
        let adj: Vec<Vec<(usize, f64)>> = (0..n)
            .map(|v| {
                graph
                    .neighbors_unchecked(v)
                    .iter()
                    .map(|&u| (u as usize, 1.0))
                    .collect()
            })
            .collect();
        Self::from_parts(adj, vec![0.0; n])
    }

    fn from_parts(adj: Vec<Vec<(usize, f64)>>, self_loops: Vec<f64>) -> Self {
        let n = adj.len();
        let degrees: Vec<f64> = adj
            .iter()
            .zip(&self_loops)
            .map(|(row, &sl)| row.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * sl)
            .collect();
        let total_weight = degrees.iter().sum::<f64>() / 2.0;
        Self {
            n,
            adj,
            self_loops,
            degrees,
            total_weight,
        }
    }

    /// Modularity of `communities` (one id per node, ids `< n`).
    ///
    /// ```text
    /// Q = Σ_c [ in_c / m − γ (tot_c / 2m)² ]
    /// ```
    ///
    /// where `in_c` is the weight inside `c` (each edge once, self-loops
    /// included) and `tot_c` the summed degree of its members.
    pub(crate) fn modularity(&self, communities: &[usize], resolution: f64) -> f64 {
        let m = self.total_weight;
        if m == 0.0 {
            return 0.0;
        }

        let mut internal = vec![0.0; self.n];
        let mut total = vec![0.0; self.n];
        for i in 0..self.n {
            let c = communities[i];
            total[c] += self.degrees[i];
            internal[c] += self.self_loops[i];
            for &(j, w) in &self.adj[i] {
                if i < j && communities[j] == c {
                    internal[c] += w;
                }
            }
        }

        internal
            .iter()
            .zip(&total)
            .map(|(&inside, &tot)| inside / m - resolution * (tot / (2.0 * m)).powi(2))
            .sum()
    }

    /// Collapse each community into one node.
    ///
    /// `communities` must already be numbered `0..n_communities`.
    pub(crate) fn aggregate(&self, communities: &[usize], n_communities: usize) -> Self {
        let mut self_loops = vec![0.0; n_communities];
        let mut between: HashMap<(usize, usize), f64> = HashMap::new();

        for i in 0..self.n {
            let ci = communities[i];
            self_loops[ci] += self.self_loops[i];
            for &(j, w) in &self.adj[i] {
                if i >= j {
                    continue;
                }
                let cj = communities[j];
                if ci == cj {
                    self_loops[ci] += w;
                } else {
                    let key = if ci < cj { (ci, cj) } else { (cj, ci) };
                    *between.entry(key).or_insert(0.0) += w;
                }
            }
        }

        let mut adj = vec![Vec::new(); n_communities];
        for ((a, b), w) in between {
            adj[a].push((b, w));
            adj[b].push((a, w));
        }
        for row in &mut adj {
            row.sort_unstable_by_key(|&(j, _)| j);
        }

        Self::from_parts(adj, self_loops)
    }
}

/// Renumber ids to `0..k` in order of first appearance. Returns `(ids, k)`.
pub(crate) fn renumber(assignment: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let ids: Vec<usize> = assignment
        .iter()
        .map(|&c| {
            let next = mapping.len();
            *mapping.entry(c).or_insert(next)
        })
        .collect();
    (ids, mapping.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> GraphStore {
        GraphStore::from_index_edges(
            6,
            [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)],
        )
        .unwrap()
    }

    #[test]
    fn test_degrees_and_weight() {
        let wg = WeightedGraph::from_store(&two_triangles());
        assert_eq!(wg.total_weight, 7.0);
        assert_eq!(wg.degrees, vec![2.0, 2.0, 3.0, 3.0, 2.0, 2.0]);
    }

    #[test]
    fn test_modularity_of_natural_split() {
        let wg = WeightedGraph::from_store(&two_triangles());
        let q = wg.modularity(&[0, 0, 0, 1, 1, 1], 1.0);
        // each side: 3 internal edges, degree sum 7
        let expected = 2.0 * (3.0 / 7.0 - (7.0f64 / 14.0).powi(2));
        assert!((q - expected).abs() < 1e-12);

        let singletons = wg.modularity(&[0, 1, 2, 3, 4, 5], 1.0);
        assert!(singletons < 0.0);
        assert!(q > singletons);
    }

    #[test]
    fn test_aggregate_preserves_modularity() {
        let wg = WeightedGraph::from_store(&two_triangles());
        let split = [0, 0, 0, 1, 1, 1];
        let meta = wg.aggregate(&split, 2);

        assert_eq!(meta.n, 2);
        assert_eq!(meta.self_loops, vec![3.0, 3.0]);
        assert_eq!(meta.adj[0], vec![(1, 1.0)]);
        assert_eq!(meta.total_weight, wg.total_weight);
        assert_eq!(meta.degrees, vec![7.0, 7.0]);

        let q_fine = wg.modularity(&split, 1.0);
        let q_meta = meta.modularity(&[0, 1], 1.0);
        assert!((q_fine - q_meta).abs() < 1e-12);
    }

    #[test]
    fn test_renumber_first_appearance() {
        let (ids, k) = renumber(&[7, 3, 7, 9, 3]);
        assert_eq!(ids, vec![0, 1, 0, 2, 1]);
        assert_eq!(k, 3);
    }
}
