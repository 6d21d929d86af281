//! Bounded breadth-first search.
//!
//! BFS discovers nodes in order of hop distance, so the first time the target
//! is reached the recorded parent chain is a shortest path. `max_depth` caps
//! how many layers are expanded; it never turns the search into an
//! approximation.
//!
//! Neighbors are expanded in ascending index order (the store keeps adjacency
//! sorted), so among several shortest paths the same one is always returned.

use crate::error::{Error, Result};
use crate::store::GraphStore;
use rand::prelude::*;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

/// Shortest-hop path search over a [`GraphStore`].
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    graph: &'g GraphStore,
}

impl<'g> PathFinder<'g> {
    /// Borrow `graph` for path queries.
    pub fn new(graph: &'g GraphStore) -> Self {
        Self { graph }
    }

    /// Shortest path from `source` to `target` using at most `max_depth` edges.
    ///
    /// Returns the node sequence, both ends included, or an empty vector when
    /// no such path exists.
    pub fn find_path(&self, source: usize, target: usize, max_depth: usize) -> Result<Vec<usize>> {
        let n = self.graph.node_count();
        if source >= n {
            return Err(Error::out_of_range(source, n));
        }
        if target >= n {
            return Err(Error::out_of_range(target, n));
        }

        if source == target {
            return Ok(vec![source]);
        }
        if max_depth == 0 {
            return Ok(Vec::new());
        }
        if self.graph.contains_edge(source, target)? {
            return Ok(vec![source, target]);
        }

        // parent[v] = node v was discovered from; the source maps to itself.
        let mut parent: HashMap<usize, usize> = HashMap::new();
        let _ = parent.insert(source, source);
        let mut frontier = vec![source];

        for depth in 1..=max_depth {
            let mut next = Vec::new();
            for &node in &frontier {
                for &neighbor in self.graph.neighbors_unchecked(node) {
                    let neighbor = neighbor as usize;
                    if parent.contains_key(&neighbor) {
                        continue;
                    }
                    let _ = parent.insert(neighbor, node);
                    if neighbor == target {
                        debug!(source, target, depth, "path found");
                        return Ok(unwind(&parent, source, target));
                    }
                    next.push(neighbor);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(Vec::new())
    }

    /// Hop distance from `source` to every reachable node (source included, at 0).
    pub fn distances_from(&self, source: usize) -> Result<HashMap<usize, usize>> {
        let n = self.graph.node_count();
        if source >= n {
            return Err(Error::out_of_range(source, n));
        }

        let mut dist = HashMap::new();
        let _ = dist.insert(source, 0usize);
        let mut queue = VecDeque::from([source]);

        while let Some(node) = queue.pop_front() {
            let d = dist[&node];
            for &neighbor in self.graph.neighbors_unchecked(node) {
                let neighbor = neighbor as usize;
                if !dist.contains_key(&neighbor) {
                    let _ = dist.insert(neighbor, d + 1);
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(dist)
    }

    /// Mean shortest-path length, estimated from up to `sample` random sources.
    ///
    /// Every pair `(s, v)` with `s` sampled and `v` reachable from `s`,
    /// `v != s`, contributes one distance. Returns `0.0` if no pair exists.
    pub fn average_shortest_path(&self, sample: usize, seed: u64) -> f64 {
        let n = self.graph.node_count();
        let sample = sample.min(n);
        let mut rng = StdRng::seed_from_u64(seed);
        let sources = rand::seq::index::sample(&mut rng, n, sample);

        let mut total = 0u64;
        let mut pairs = 0u64;
        for (i, source) in sources.iter().enumerate() {
            if (i + 1) % 100 == 0 {
                info!(done = i + 1, sample, "average shortest path progress");
            }
            // `source < n` by construction
            if let Ok(dist) = self.distances_from(source) {
                for &d in dist.values().filter(|&&d| d > 0) {
                    total += d as u64;
                    pairs += 1;
                }
            }
        }

        if pairs == 0 {
            0.0
        } else {
            total as f64 / pairs as f64
        }
    }
}

fn unwind(parent: &HashMap<usize, usize>, source: usize, target: usize) -> Vec<usize> {
    let mut path = vec![target];
    let mut cur = target;
    while cur != source {
        cur = parent[&cur];
        path.push(cur);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> GraphStore {
        // 0-1, 1-2, 2-3, 0-2, 4-5
        GraphStore::from_index_edges(6, [(0, 1), (1, 2), (2, 3), (0, 2), (4, 5)]).unwrap()
    }

    #[test]
    fn test_same_node() {
        let g = scenario();
        let pf = PathFinder::new(&g);
        assert_eq!(pf.find_path(3, 3, 0).unwrap(), vec![3]);
    }

    #[test]
    fn test_direct_neighbor() {
        let g = scenario();
        let pf = PathFinder::new(&g);
        assert_eq!(pf.find_path(0, 2, 1).unwrap(), vec![0, 2]);
        assert_eq!(pf.find_path(0, 2, 0).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_scenario_path() {
        let g = scenario();
        let pf = PathFinder::new(&g);
        assert_eq!(pf.find_path(0, 3, 3).unwrap(), vec![0, 2, 3]);
    }

    #[test]
    fn test_depth_cutoff() {
        // chain 0-1-2-3-4
        let g = GraphStore::from_index_edges(5, [(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let pf = PathFinder::new(&g);
        assert!(pf.find_path(0, 4, 3).unwrap().is_empty());
        assert_eq!(pf.find_path(0, 4, 4).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_unreachable() {
        let g = scenario();
        let pf = PathFinder::new(&g);
        assert!(pf.find_path(0, 5, 10).unwrap().is_empty());
    }

    #[test]
    fn test_lowest_index_route_wins() {
        // 0 -> {1, 2} -> 3: two shortest paths, expansion order picks via 1
        let g = GraphStore::from_index_edges(4, [(0, 2), (0, 1), (2, 3), (1, 3)]).unwrap();
        let pf = PathFinder::new(&g);
        assert_eq!(pf.find_path(0, 3, 5).unwrap(), vec![0, 1, 3]);
    }

    #[test]
    fn test_out_of_range() {
        let g = scenario();
        let pf = PathFinder::new(&g);
        assert!(matches!(
            pf.find_path(0, 6, 3),
            Err(Error::IndexOutOfRange { index: 6, .. })
        ));
        assert!(pf.find_path(9, 0, 3).is_err());
        assert!(pf.distances_from(6).is_err());
    }

    #[test]
    fn test_distances_from() {
        let g = scenario();
        let pf = PathFinder::new(&g);
        let d = pf.distances_from(3).unwrap();
        assert_eq!(d.len(), 4);
        assert_eq!(d[&3], 0);
        assert_eq!(d[&2], 1);
        assert_eq!(d[&0], 2);
        assert!(!d.contains_key(&4));
    }

    #[test]
    fn test_average_shortest_path() {
        // single edge: every sampled source sees one pair at distance 1
        let g = GraphStore::from_index_edges(2, [(0, 1)]).unwrap();
        let pf = PathFinder::new(&g);
        assert_eq!(pf.average_shortest_path(10, 7), 1.0);

        let empty = GraphStore::from_index_edges(3, Vec::new()).unwrap();
        assert_eq!(PathFinder::new(&empty).average_shortest_path(3, 7), 0.0);
    }
}
