//! Immutable graph storage.
//!
//! A [`GraphStore`] is produced exactly once, by [`GraphBuilder::finish`], and
//! is read-only afterwards. There is no "loaded" flag to check: a store that
//! exists is a store that is complete.
//!
//! ## Layout
//!
//! Adjacency is kept in compressed sparse row (CSR) form:
//!
//! ```text
//! offsets: [0, 2, 4, 7, 8, 9, 10]          (len = N + 1)
//! targets: [1 2 | 0 2 | 0 1 3 | 2 | 5 | 4]  (len = 2 * edges)
//! ```
//!
//! `neighbors(v)` is the slice `targets[offsets[v]..offsets[v + 1]]`, sorted
//! ascending and duplicate-free, so membership tests are binary searches and
//! every traversal sees neighbors in index order regardless of input order.
//!
//! Each undirected edge is stored as two directed halves. `edge_count()`
//! reports undirected edges.
//!
//! ## Ids and indices
//!
//! External ids are 1-based (`1..=N`), internal indices 0-based (`0..N`).
//! Ids are translated at two boundaries only: ingestion ([`GraphBuilder`]'s
//! `add_location` and `add_edge`) and the user-facing
//! [`network`](crate::network) layer. Both go through [`index_of`] and
//! [`external_id`]; everything in between works on indices.

mod builder;
mod location;

pub use builder::{EdgeRecord, GraphBuilder, IngestStats, LocationRecord};
pub use location::Location;

use crate::error::{Error, Result};
use petgraph::graph::{NodeIndex, UnGraph};

/// Internal node index as stored in adjacency slices.
pub type NodeIx = u32;

/// Translate a 1-based external id into a 0-based index.
///
/// Returns `None` when `external_id` is outside `[1, node_count]`.
#[inline]
pub fn index_of(external_id: u64, node_count: usize) -> Option<usize> {
    if external_id == 0 || external_id > node_count as u64 {
        None
    } else {
        Some((external_id - 1) as usize)
    }
}

/// Translate a 0-based index into its 1-based external id.
#[inline]
pub fn external_id(index: usize) -> u64 {
    index as u64 + 1
}

/// Read-only social graph: adjacency, degrees, and optional locations.
#[derive(Debug, Clone)]
pub struct GraphStore {
    offsets: Vec<usize>,
    targets: Vec<NodeIx>,
    locations: Vec<[f32; 2]>,
}

impl GraphStore {
    pub(crate) fn from_parts(
        offsets: Vec<usize>,
        targets: Vec<NodeIx>,
        locations: Vec<[f32; 2]>,
    ) -> Self {
        debug_assert_eq!(offsets.len(), locations.len() + 1);
        Self {
            offsets,
            targets,
            locations,
        }
    }

    /// Build a store from 0-based index pairs, without locations.
    ///
    /// Pairs referencing indices `>= node_count` or self-loops are dropped the
    /// same way [`GraphBuilder`] drops them.
    pub fn from_index_edges<I>(node_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut builder = GraphBuilder::new(node_count)?;
        for (u, v) in edges {
            let _ = builder.add_index_edge(u, v);
        }
        Ok(builder.finish().0)
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.locations.len()
    }

    /// Number of undirected edges (each counted once).
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    #[inline]
    fn check(&self, v: usize) -> Result<()> {
        if v < self.node_count() {
            Ok(())
        } else {
            Err(Error::out_of_range(v, self.node_count()))
        }
    }

    /// Neighbors of `v`, sorted ascending.
    pub fn neighbors(&self, v: usize) -> Result<&[NodeIx]> {
        self.check(v)?;
        Ok(self.neighbors_unchecked(v))
    }

    /// Neighbors of `v` for an index already known to be in range.
    #[inline]
    pub(crate) fn neighbors_unchecked(&self, v: usize) -> &[NodeIx] {
        &self.targets[self.offsets[v]..self.offsets[v + 1]]
    }

    /// Degree of `v`.
    pub fn degree(&self, v: usize) -> Result<usize> {
        self.check(v)?;
        Ok(self.degree_unchecked(v))
    }

    #[inline]
    pub(crate) fn degree_unchecked(&self, v: usize) -> usize {
        self.offsets[v + 1] - self.offsets[v]
    }

    /// Degrees of all nodes in index order.
    pub fn degrees(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.offsets.windows(2).map(|w| w[1] - w[0])
    }

    /// Whether the undirected edge `(u, v)` exists.
    pub fn contains_edge(&self, u: usize, v: usize) -> Result<bool> {
        self.check(u)?;
        self.check(v)?;
        Ok(self
            .neighbors_unchecked(u)
            .binary_search(&(v as NodeIx))
            .is_ok())
    }

    /// Location of `v`, or `None` if it has the "no location" sentinel.
    pub fn location(&self, v: usize) -> Result<Option<Location>> {
        self.check(v)?;
        Ok(Location::from_stored(self.locations[v]))
    }

    /// Number of nodes with a usable location.
    pub fn located_count(&self) -> usize {
        self.locations
            .iter()
            .filter(|&&raw| !location::is_sentinel(raw))
            .count()
    }

    /// Raw stored coordinates, sentinel included.
    pub(crate) fn raw_locations(&self) -> &[[f32; 2]] {
        &self.locations
    }

    /// Export to a petgraph undirected graph (node `i` is index `i`).
    pub fn to_ungraph(&self) -> UnGraph<(), ()> {
        let mut graph = UnGraph::with_capacity(self.node_count(), self.edge_count());
        for _ in 0..self.node_count() {
            let _ = graph.add_node(());
        }
        for u in 0..self.node_count() {
            for &v in self.neighbors_unchecked(u) {
                let v = v as usize;
                if u < v {
                    let _ = graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
                }
            }
        }
        graph
    }
}
