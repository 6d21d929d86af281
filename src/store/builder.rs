//! Batch construction of a [`GraphStore`].

use super::location::{Location, SENTINEL};
use super::{index_of, GraphStore, NodeIx};
use crate::error::{Error, Result};
use serde::Serialize;
use smallvec::SmallVec;
use std::time::Instant;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Builder-side neighbor list. Most users have a handful of connections, so
/// short lists stay inline and only hubs spill to the heap.
type NeighborList = SmallVec<[NodeIx; 8]>;

/// A location record as produced by a loader (1-based id).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationRecord {
    /// External id.
    pub id: u64,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub long: f64,
}

/// A connection record as produced by a loader (1-based ids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    /// External id of the user owning the line.
    pub id: u64,
    /// External ids of that user's connections.
    pub neighbors: Vec<u64>,
}

/// Counters for data-quality problems seen during ingestion.
///
/// None of these are errors: the offending record or edge is dropped and
/// ingestion continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Location records accepted (including explicit `(0, 0)`).
    pub locations: u64,
    /// Location records rejected: malformed, out-of-range id, or bad coordinates.
    pub invalid_locations: u64,
    /// Undirected edges accepted, before deduplication.
    pub connections: u64,
    /// Connection tokens that could not be parsed.
    pub invalid_connections: u64,
    /// Edges referencing an id outside `[1, node_count]`.
    pub out_of_range: u64,
    /// Edges from a node to itself.
    pub self_loops: u64,
}

impl IngestStats {
    /// Every rejected edge, whatever the reason.
    pub fn invalid_edges(&self) -> u64 {
        self.invalid_connections + self.out_of_range + self.self_loops
    }

    /// Every rejected record or edge.
    pub fn invalid_records(&self) -> u64 {
        self.invalid_locations + self.invalid_edges()
    }
}

/// Accumulates location and edge records, then freezes them into a
/// [`GraphStore`].
///
/// Storage is sized to `node_count` up front; records may arrive in any
/// number of batches and in any order.
///
/// ```
/// use socgraph::store::GraphBuilder;
///
/// let mut builder = GraphBuilder::new(3).unwrap();
/// builder.add_location(1, 40.4, -3.7);
/// builder.add_edges(1, [2, 3, 3]);
/// let (graph, stats) = builder.finish();
///
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(stats.invalid_records(), 0);
/// ```
#[derive(Debug)]
pub struct GraphBuilder {
    adjacency: Vec<NeighborList>,
    locations: Vec<[f32; 2]>,
    stats: IngestStats,
}

impl GraphBuilder {
    /// Create a builder for ids `1..=node_count`.
    pub fn new(node_count: usize) -> Result<Self> {
        if node_count > NodeIx::MAX as usize {
            return Err(Error::InvalidParameter {
                name: "node_count",
                message: "exceeds the u32 index space",
            });
        }
        Ok(Self {
            adjacency: vec![NeighborList::new(); node_count],
            locations: vec![SENTINEL; node_count],
            stats: IngestStats::default(),
        })
    }

    /// Number of nodes the builder was sized for.
    pub fn node_count(&self) -> usize {
        self.locations.len()
    }

    /// Counters so far.
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Record a location. Returns `false` if the record was rejected.
    pub fn add_location(&mut self, id: u64, lat: f64, long: f64) -> bool {
        let Some(ix) = index_of(id, self.node_count()) else {
            self.stats.invalid_locations += 1;
            return false;
        };
        if !Location::is_valid(lat, long) {
            self.stats.invalid_locations += 1;
            return false;
        }
        self.locations[ix] = [lat as f32, long as f32];
        self.stats.locations += 1;
        true
    }

    /// Count a location line the loader could not parse.
    pub fn reject_location(&mut self) {
        self.stats.invalid_locations += 1;
    }

    /// Count connection tokens the loader could not parse.
    pub fn reject_connections(&mut self, count: u64) {
        self.stats.invalid_connections += count;
    }

    /// Add one undirected edge between two external ids.
    ///
    /// Returns `false` if either id is out of range or the edge is a self-loop.
    /// Duplicates are accepted here and collapsed by [`finish`](Self::finish).
    pub fn add_edge(&mut self, a: u64, b: u64) -> bool {
        let n = self.node_count();
        let (Some(u), Some(v)) = (index_of(a, n), index_of(b, n)) else {
            self.stats.out_of_range += 1;
            return false;
        };
        self.add_index_edge(u, v)
    }

    /// [`add_edge`](Self::add_edge) for 0-based indices.
    pub(crate) fn add_index_edge(&mut self, u: usize, v: usize) -> bool {
        let n = self.node_count();
        if u >= n || v >= n {
            self.stats.out_of_range += 1;
            return false;
        }
        if u == v {
            self.stats.self_loops += 1;
            return false;
        }
        self.adjacency[u].push(v as NodeIx);
        self.adjacency[v].push(u as NodeIx);
        self.stats.connections += 1;
        true
    }

    /// Add every edge `(id, n)` for `n` in `neighbors`. Returns how many were
    /// accepted.
    pub fn add_edges<I>(&mut self, id: u64, neighbors: I) -> usize
    where
        I: IntoIterator<Item = u64>,
    {
        neighbors
            .into_iter()
            .filter(|&n| self.add_edge(id, n))
            .count()
    }

    /// Ingest a batch of location records.
    pub fn extend_locations<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = LocationRecord>,
    {
        for r in records {
            let _ = self.add_location(r.id, r.lat, r.long);
        }
    }

    /// Ingest a batch of connection records.
    pub fn extend_edges<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        for r in records {
            let _ = self.add_edges(r.id, r.neighbors);
        }
    }

    /// Sort and deduplicate every neighbor list and compact into CSR.
    pub fn finish(self) -> (GraphStore, IngestStats) {
        let start = Instant::now();
        let Self {
            mut adjacency,
            locations,
            stats,
        } = self;

        normalize(&mut adjacency);

        let total: usize = adjacency.iter().map(|l| l.len()).sum();
        let mut offsets = Vec::with_capacity(adjacency.len() + 1);
        let mut targets = Vec::with_capacity(total);
        offsets.push(0);
        for list in adjacency.drain(..) {
            targets.extend_from_slice(&list);
            offsets.push(targets.len());
        }

        let graph = GraphStore::from_parts(offsets, targets, locations);
        debug!(?stats, "ingestion counters");
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            invalid = stats.invalid_records(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "graph finalized"
        );
        (graph, stats)
    }
}

#[cfg(feature = "parallel")]
fn normalize(adjacency: &mut [NeighborList]) {
    adjacency.par_iter_mut().for_each(|list| {
        list.sort_unstable();
        list.dedup();
    });
}

#[cfg(not(feature = "parallel"))]
fn normalize(adjacency: &mut [NeighborList]) {
    for list in adjacency.iter_mut() {
        list.sort_unstable();
        list.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_edge_is_noop() {
        let mut b = GraphBuilder::new(3).unwrap();
        assert!(b.add_edge(1, 2));
        assert!(b.add_edge(1, 2));
        assert!(b.add_edge(2, 1));
        let (g, stats) = b.finish();

        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(0).unwrap(), 1);
        assert_eq!(g.degree(1).unwrap(), 1);
        // duplicates are not data-quality errors
        assert_eq!(stats.invalid_records(), 0);
    }

    #[test]
    fn test_rejects_out_of_range_and_self_loops() {
        let mut b = GraphBuilder::new(3).unwrap();
        assert_eq!(b.add_edges(1, [0, 4, 1, 2]), 1);
        assert!(!b.add_edge(9, 1));
        let (g, stats) = b.finish();

        assert_eq!(g.edge_count(), 1);
        assert_eq!(stats.out_of_range, 3);
        assert_eq!(stats.self_loops, 1);
        assert_eq!(stats.invalid_edges(), 4);
    }

    #[test]
    fn test_index_edges_share_validation() {
        let mut b = GraphBuilder::new(3).unwrap();
        assert!(b.add_index_edge(0, 2));
        assert!(!b.add_index_edge(1, 1));
        assert!(!b.add_index_edge(0, 3));
        let (g, stats) = b.finish();

        assert_eq!(g.neighbors(2).unwrap(), &[0]);
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.self_loops, 1);
        assert_eq!(stats.out_of_range, 1);
    }

    #[test]
    fn test_locations() {
        let mut b = GraphBuilder::new(4).unwrap();
        assert!(b.add_location(1, 40.5, -3.75));
        assert!(!b.add_location(2, 91.0, 0.0));
        assert!(!b.add_location(5, 1.0, 1.0));
        assert!(b.add_location(3, 0.0, 0.0));
        b.reject_location();
        let (g, stats) = b.finish();

        let loc = g.location(0).unwrap().unwrap();
        assert_eq!((loc.lat, loc.long), (40.5, -3.75));
        assert_eq!(g.location(1).unwrap(), None);
        // explicit (0, 0) is indistinguishable from missing
        assert_eq!(g.location(2).unwrap(), None);
        assert_eq!(g.location(3).unwrap(), None);
        assert_eq!(stats.locations, 2);
        assert_eq!(stats.invalid_locations, 3);
    }

    #[test]
    fn test_batched_ingestion_matches_single_batch() {
        let records: Vec<EdgeRecord> = (1..=6)
            .map(|id| EdgeRecord {
                id,
                neighbors: vec![(id % 6) + 1, ((id + 2) % 6) + 1],
            })
            .collect();

        let mut single = GraphBuilder::new(6).unwrap();
        single.extend_edges(records.clone());
        let (a, _) = single.finish();

        let mut batched = GraphBuilder::new(6).unwrap();
        for chunk in records.chunks(2) {
            batched.extend_edges(chunk.to_vec());
        }
        let (b, _) = batched.finish();

        for v in 0..6 {
            assert_eq!(a.neighbors(v).unwrap(), b.neighbors(v).unwrap());
        }
    }

    #[test]
    fn test_hub_spills_and_stays_sorted() {
        let n = 100u64;
        let mut b = GraphBuilder::new(n as usize).unwrap();
        b.add_edges(1, (2..=n).rev());
        let (g, _) = b.finish();
        let ns = g.neighbors(0).unwrap();
        assert_eq!(ns.len(), 99);
        assert!(ns.windows(2).all(|w| w[0] < w[1]));
    }
}
