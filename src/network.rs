//! The user-facing view of a loaded graph.
//!
//! [`SocialNetwork`] speaks in 1-based user ids and translates to and from
//! internal indices at its boundary; nothing below it sees an external id.
//! An id outside `[1, N]` is [`Error::IndexOutOfRange`] with the id as given.

use crate::community::{CommunityDetection, Partition};
use crate::config::LoadConfig;
use crate::error::{Error, Result};
use crate::loader::Loader;
use crate::query::{GeoQuery, NeighborQuery, PathFinder};
use crate::stats::{DegreePolicy, DegreeStats};
use crate::store::{external_id, index_of, GraphStore, IngestStats, Location};
use serde::Serialize;
use std::path::Path;

/// One user's record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    /// External user id.
    pub id: u64,
    /// Coordinates, if the user has a usable location.
    pub location: Option<Location>,
    /// Connected user ids, ascending.
    pub connections: Vec<u64>,
}

/// Whole-graph overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    /// Number of users.
    pub nodes: usize,
    /// Undirected connections, each counted once.
    pub edges: usize,
    /// Users with a usable location.
    pub located: usize,
    /// `(id, degree)` of the best-connected user, lowest id on ties.
    pub most_connected: Option<(u64, usize)>,
    /// Degree distribution under the requested policy.
    pub degrees: DegreeStats,
    /// What ingestion dropped.
    pub ingest: IngestStats,
}

/// A community partition addressed by user id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Communities {
    partition: Partition,
}

impl Communities {
    /// The underlying index-based partition.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Number of communities.
    pub fn count(&self) -> usize {
        self.partition.community_count()
    }

    /// Modularity of the partition.
    pub fn modularity(&self) -> f64 {
        self.partition.modularity()
    }

    /// Community of user `id`.
    pub fn community_of(&self, id: u64) -> Result<usize> {
        let n = self.partition.assignment().len();
        let v = index_of(id, n).ok_or_else(|| Error::out_of_range(id, n))?;
        self.partition.community_of(v)
    }

    /// User ids in community `c`, ascending.
    pub fn members(&self, c: usize) -> Vec<u64> {
        self.partition
            .members(c)
            .into_iter()
            .map(external_id)
            .collect()
    }

    /// `(user id, community)` for every user, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.partition
            .assignment()
            .iter()
            .enumerate()
            .map(|(v, &c)| (external_id(v), c))
    }

    /// Up to `k` communities with more than `min_size` members, as
    /// `(community, size)`, largest first.
    pub fn largest(&self, k: usize, min_size: usize) -> Vec<(usize, usize)> {
        self.partition.largest(k, min_size)
    }
}

/// A loaded social graph plus what ingestion had to drop.
#[derive(Debug, Clone)]
pub struct SocialNetwork {
    graph: GraphStore,
    ingest: IngestStats,
}

impl SocialNetwork {
    /// Load from a location file and a connection file.
    pub fn from_paths(
        locations: impl AsRef<Path>,
        connections: impl AsRef<Path>,
        config: &LoadConfig,
    ) -> Result<Self> {
        let (graph, ingest) = Loader::new(config.clone()).load(locations, connections)?;
        Ok(Self::from_parts(graph, ingest))
    }

    /// Wrap an already-built store.
    pub fn from_parts(graph: GraphStore, ingest: IngestStats) -> Self {
        Self { graph, ingest }
    }

    /// The index-based store.
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Ingestion counters.
    pub fn ingest(&self) -> &IngestStats {
        &self.ingest
    }

    /// Number of users.
    pub fn user_count(&self) -> usize {
        self.graph.node_count()
    }

    fn index(&self, id: u64) -> Result<usize> {
        index_of(id, self.graph.node_count())
            .ok_or_else(|| Error::out_of_range(id, self.graph.node_count()))
    }

    fn ids(indices: impl IntoIterator<Item = usize>) -> Vec<u64> {
        indices.into_iter().map(external_id).collect()
    }

    /// Location and connections of user `id`.
    pub fn query_user(&self, id: u64) -> Result<UserInfo> {
        let v = self.index(id)?;
        Ok(UserInfo {
            id,
            location: self.graph.location(v)?,
            connections: Self::ids(self.graph.neighbors(v)?.iter().map(|&u| u as usize)),
        })
    }

    /// Users within `max_distance` of `(lat, long)`, nearest first.
    pub fn find_users_near(
        &self,
        lat: f64,
        long: f64,
        max_distance: f64,
        limit: usize,
    ) -> Result<Vec<(u64, f64)>> {
        Ok(GeoQuery::new(&self.graph)
            .nearest(lat, long, max_distance, limit)?
            .into_iter()
            .map(|(v, d)| (external_id(v), d))
            .collect())
    }

    /// Users connected to both `a` and `b`, ascending.
    pub fn find_common_connections(&self, a: u64, b: u64) -> Result<Vec<u64>> {
        let (u, v) = (self.index(a)?, self.index(b)?);
        Ok(Self::ids(NeighborQuery::new(&self.graph).common_connections(u, v)?))
    }

    /// The `k` best-connected users as `(id, degree)`.
    pub fn find_users_with_most_connections(&self, k: usize) -> Vec<(u64, usize)> {
        NeighborQuery::new(&self.graph)
            .top_by_degree(k)
            .into_iter()
            .map(|(v, d)| (external_id(v), d))
            .collect()
    }

    /// A shortest path from `a` to `b` of at most `max_depth` hops, or empty.
    pub fn find_path_between_users(&self, a: u64, b: u64, max_depth: usize) -> Result<Vec<u64>> {
        let (u, v) = (self.index(a)?, self.index(b)?);
        Ok(Self::ids(PathFinder::new(&self.graph).find_path(u, v, max_depth)?))
    }

    /// Mean hop distance over up to `sample` random sources.
    pub fn average_shortest_path(&self, sample: usize, seed: u64) -> f64 {
        PathFinder::new(&self.graph).average_shortest_path(sample, seed)
    }

    /// Run `detector` over the whole graph.
    pub fn detect_communities<D: CommunityDetection + ?Sized>(
        &self,
        detector: &D,
    ) -> Result<Communities> {
        Ok(Communities {
            partition: detector.detect(&self.graph)?,
        })
    }

    /// Sizes, degree statistics, and ingestion counters.
    pub fn summary(&self, policy: DegreePolicy) -> GraphSummary {
        let most_connected = self.find_users_with_most_connections(1).first().copied();
        GraphSummary {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            located: self.graph.located_count(),
            most_connected,
            degrees: DegreeStats::compute(&self.graph, policy),
            ingest: self.ingest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::Louvain;
    use crate::store::GraphBuilder;

    /// Edges 1-2, 2-3, 3-4, 1-3, 5-6; users 1 and 2 are located.
    fn scenario() -> SocialNetwork {
        let mut b = GraphBuilder::new(6).unwrap();
        b.add_location(1, 40.0, -3.0);
        b.add_location(2, 40.05, -3.0);
        b.add_edges(1, [2, 3]);
        b.add_edges(2, [3]);
        b.add_edges(3, [4]);
        b.add_edges(5, [6]);
        let (graph, ingest) = b.finish();
        SocialNetwork::from_parts(graph, ingest)
    }

    #[test]
    fn test_query_user() {
        let net = scenario();
        let user = net.query_user(3).unwrap();
        assert_eq!(user.connections, vec![1, 2, 4]);
        assert_eq!(user.location, None);

        let user = net.query_user(1).unwrap();
        assert_eq!(user.location.map(|l| l.lat), Some(40.0));
    }

    #[test]
    fn test_out_of_range_ids() {
        let net = scenario();
        for id in [0, 7] {
            assert!(matches!(
                net.query_user(id),
                Err(Error::IndexOutOfRange { index, len: 6 }) if index == id
            ));
        }
        assert!(net.find_common_connections(1, 99).is_err());
        assert!(net.find_path_between_users(0, 1, 3).is_err());
    }

    #[test]
    fn test_queries_use_external_ids() {
        let net = scenario();
        assert_eq!(net.find_path_between_users(1, 4, 3).unwrap(), vec![1, 3, 4]);
        assert!(net.find_path_between_users(1, 5, 3).unwrap().is_empty());
        assert_eq!(net.find_common_connections(1, 2).unwrap(), vec![3]);
        assert_eq!(net.find_users_with_most_connections(1), vec![(3, 3)]);
    }

    #[test]
    fn test_find_users_near() {
        let net = scenario();
        let near = net.find_users_near(40.0, -3.0, 0.1, 10).unwrap();
        assert_eq!(near.len(), 2);
        assert_eq!(near[0], (1, 0.0));
        assert_eq!(near[1].0, 2);
        assert!(net.find_users_near(40.0, -3.0, 0.01, 10).unwrap().len() == 1);
    }

    #[test]
    fn test_detect_communities() {
        let net = scenario();
        let communities = net.detect_communities(&Louvain::new()).unwrap();
        assert_eq!(communities.count(), 2);
        assert_eq!(communities.members(0), vec![1, 2, 3, 4]);
        assert_eq!(communities.members(1), vec![5, 6]);
        assert_eq!(communities.community_of(6).unwrap(), 1);
        assert!(communities.community_of(0).is_err());
        assert_eq!(communities.largest(1, 0), vec![(0, 4)]);
        assert_eq!(communities.iter().count(), 6);
    }

    #[test]
    fn test_summary() {
        let net = scenario();
        let s = net.summary(DegreePolicy::ActiveOnly);
        assert_eq!(s.nodes, 6);
        assert_eq!(s.edges, 5);
        assert_eq!(s.located, 2);
        assert_eq!(s.most_connected, Some((3, 3)));
        assert_eq!(s.degrees.count, 6);
        assert_eq!(s.ingest.connections, 5);
    }
}
