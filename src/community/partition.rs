//! Result of a community detection run.

use crate::error::{Error, Result};
use serde::Serialize;

/// Statistics for one Louvain level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSummary {
    /// Nodes in the (meta-)graph at this level.
    pub nodes: usize,
    /// Communities found at this level.
    pub communities: usize,
    /// Node moves made during local moving.
    pub moves: usize,
    /// Full sweeps made during local moving.
    pub sweeps: usize,
    /// Modularity after this level, measured on the original graph.
    pub modularity: f64,
}

/// A node → community mapping, total over the graph.
///
/// Community ids are consecutive from 0, numbered by the lowest node index in
/// each community.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    assignment: Vec<usize>,
    community_count: usize,
    modularity: f64,
    levels: Vec<LevelSummary>,
}

impl Partition {
    pub(crate) fn new(
        assignment: Vec<usize>,
        community_count: usize,
        modularity: f64,
        levels: Vec<LevelSummary>,
    ) -> Self {
        Self {
            assignment,
            community_count,
            modularity,
            levels,
        }
    }

    /// Every node in its own community.
    pub(crate) fn singletons(n: usize, modularity: f64) -> Self {
        Self::new((0..n).collect(), n, modularity, Vec::new())
    }

    /// Community id per node index.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Consume the partition, keeping only the assignment.
    pub fn into_assignment(self) -> Vec<usize> {
        self.assignment
    }

    /// Community of node `v`.
    pub fn community_of(&self, v: usize) -> Result<usize> {
        self.assignment
            .get(v)
            .copied()
            .ok_or_else(|| Error::out_of_range(v, self.assignment.len()))
    }

    /// Number of distinct communities.
    pub fn community_count(&self) -> usize {
        self.community_count
    }

    /// Modularity of this partition on the input graph.
    pub fn modularity(&self) -> f64 {
        self.modularity
    }

    /// Per-level statistics, finest level first.
    pub fn levels(&self) -> &[LevelSummary] {
        &self.levels
    }

    /// Size of each community, indexed by community id.
    pub fn community_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.community_count];
        for &c in &self.assignment {
            sizes[c] += 1;
        }
        sizes
    }

    /// Up to `k` communities with more than `min_size` members, as
    /// `(community, size)`, largest first, ties by lower id.
    pub fn largest(&self, k: usize, min_size: usize) -> Vec<(usize, usize)> {
        let mut sized: Vec<(usize, usize)> = self
            .community_sizes()
            .into_iter()
            .enumerate()
            .filter(|&(_, size)| size > min_size)
            .collect();
        sized.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        sized.truncate(k);
        sized
    }

    /// Members of community `c`, ascending.
    pub fn members(&self, c: usize) -> Vec<usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter(|&(_, &cc)| cc == c)
            .map(|(v, _)| v)
            .collect()
    }
}
