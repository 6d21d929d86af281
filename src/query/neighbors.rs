//! Common neighbors and degree centrality.

use crate::error::Result;
use crate::store::GraphStore;
use std::cmp::Ordering;

/// Neighborhood queries over a [`GraphStore`].
#[derive(Debug, Clone, Copy)]
pub struct NeighborQuery<'g> {
    graph: &'g GraphStore,
}

impl<'g> NeighborQuery<'g> {
    /// Borrow `graph` for neighborhood queries.
    pub fn new(graph: &'g GraphStore) -> Self {
        Self { graph }
    }

    /// Nodes adjacent to both `u` and `v`, ascending.
    ///
    /// Both adjacency slices are sorted, so this is a linear merge.
    pub fn common_connections(&self, u: usize, v: usize) -> Result<Vec<usize>> {
        let a = self.graph.neighbors(u)?;
        let b = self.graph.neighbors(v)?;

        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    out.push(a[i] as usize);
                    i += 1;
                    j += 1;
                }
            }
        }
        Ok(out)
    }

    /// The `k` highest-degree nodes as `(index, degree)`.
    ///
    /// Ordered by degree descending, then index ascending, which makes the
    /// ranking total and reproducible. Returns every node if `k` exceeds the
    /// node count.
    pub fn top_by_degree(&self, k: usize) -> Vec<(usize, usize)> {
        let n = self.graph.node_count();
        let k = k.min(n);
        if k == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, usize)> = self.graph.degrees().enumerate().collect();
        let by_rank = |a: &(usize, usize), b: &(usize, usize)| b.1.cmp(&a.1).then(a.0.cmp(&b.0));

        if k < n {
            let _ = ranked.select_nth_unstable_by(k - 1, by_rank);
            ranked.truncate(k);
        }
        ranked.sort_unstable_by(by_rank);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn scenario() -> GraphStore {
        GraphStore::from_index_edges(6, [(0, 1), (1, 2), (2, 3), (0, 2), (4, 5)]).unwrap()
    }

    #[test]
    fn test_common_connections() {
        let g = scenario();
        let q = NeighborQuery::new(&g);
        assert_eq!(q.common_connections(0, 1).unwrap(), vec![2]);
        assert_eq!(q.common_connections(1, 3).unwrap(), vec![2]);
        assert_eq!(q.common_connections(0, 4).unwrap(), Vec::<usize>::new());
        assert_eq!(q.common_connections(0, 0).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_common_connections_out_of_range() {
        let g = scenario();
        let q = NeighborQuery::new(&g);
        assert!(matches!(
            q.common_connections(0, 6),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_top_by_degree() {
        let g = scenario();
        let q = NeighborQuery::new(&g);
        assert_eq!(q.top_by_degree(1), vec![(2, 3)]);
        // ties on degree 2 and 1 resolved by ascending index
        assert_eq!(q.top_by_degree(3), vec![(2, 3), (0, 2), (1, 2)]);
        assert_eq!(q.top_by_degree(0), Vec::new());
        let all = q.top_by_degree(100);
        assert_eq!(all.len(), 6);
        assert_eq!(&all[3..], &[(3, 1), (4, 1), (5, 1)]);
    }

    #[test]
    fn test_top_by_degree_empty_graph() {
        let g = GraphStore::from_index_edges(0, Vec::new()).unwrap();
        assert!(NeighborQuery::new(&g).top_by_degree(5).is_empty());
    }
}
