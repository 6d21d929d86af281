//! End-to-end: files on disk through the loader and the user-id facade.

use socgraph::config::LoadConfig;
use socgraph::{AnalysisConfig, DegreePolicy, Error, SocialNetwork};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes the two input files; edges 1-2, 2-3, 3-4, 1-3, 5-6, six users.
///
/// Connection lines list each edge from either side (or both) and include
/// one out-of-range id, one self-loop, and one garbage token.
fn fixture() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let locations = dir.path().join("locations.txt");
    let connections = dir.path().join("connections.txt");

    fs::write(
        &locations,
        "40.4168,-3.7038\n40.4200,-3.7000\n41.3874,2.1686\nbad line\n0,0\n37.3891,-5.9845\n",
    )
    .unwrap();
    fs::write(&connections, "2, 3\n1\n2, 4, 3\n99\n6\nfoo, 5\n").unwrap();

    (dir, locations, connections)
}

fn load() -> (TempDir, SocialNetwork) {
    let (dir, loc, con) = fixture();
    let net = SocialNetwork::from_paths(&loc, &con, &LoadConfig::default()).unwrap();
    (dir, net)
}

#[test]
fn loads_and_counts_rejects() {
    let (_dir, net) = load();
    let g = net.graph();
    assert_eq!(g.node_count(), 6);
    assert_eq!(g.edge_count(), 5);

    let ingest = net.ingest();
    assert_eq!(ingest.locations, 5);
    assert_eq!(ingest.invalid_locations, 1);
    assert_eq!(ingest.out_of_range, 1);
    assert_eq!(ingest.self_loops, 1);
    assert_eq!(ingest.invalid_connections, 1);
}

#[test]
fn degrees_and_queries() {
    let (_dir, net) = load();
    let g = net.graph();
    assert_eq!(g.degree(0).unwrap(), 2);
    assert_eq!(g.degree(2).unwrap(), 3);
    assert_eq!(g.degree(4).unwrap(), 1);

    assert_eq!(net.find_path_between_users(1, 4, 3).unwrap(), vec![1, 3, 4]);
    assert!(net.find_path_between_users(1, 5, 3).unwrap().is_empty());
    assert_eq!(net.find_common_connections(1, 2).unwrap(), vec![3]);
    assert_eq!(net.find_users_with_most_connections(1), vec![(3, 3)]);
}

#[test]
fn user_records() {
    let (_dir, net) = load();
    let user = net.query_user(1).unwrap();
    assert_eq!(user.connections, vec![2, 3]);
    assert!(user.location.is_some());

    // "bad line" and "0,0" both leave the user without a location
    assert!(net.query_user(4).unwrap().location.is_none());
    assert!(net.query_user(5).unwrap().location.is_none());

    assert!(matches!(
        net.query_user(7),
        Err(Error::IndexOutOfRange { index: 7, len: 6 })
    ));
}

#[test]
fn users_near_madrid() {
    let (_dir, net) = load();
    let near = net.find_users_near(40.4168, -3.7038, 0.1, 10).unwrap();
    let ids: Vec<u64> = near.iter().map(|&(id, _)| id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(near[0].1 < near[1].1);
}

#[test]
fn communities_split_the_components() {
    let (_dir, net) = load();
    let config = AnalysisConfig::default();
    let communities = net
        .detect_communities(&config.louvain.to_louvain())
        .unwrap();

    assert_eq!(communities.count(), 2);
    assert_eq!(communities.members(0), vec![1, 2, 3, 4]);
    assert_eq!(communities.members(1), vec![5, 6]);
    assert!((communities.modularity() - 0.32).abs() < 1e-9);
}

#[test]
fn summary_reports_everything() {
    let (_dir, net) = load();
    let s = net.summary(DegreePolicy::ActiveOnly);
    assert_eq!(s.nodes, 6);
    assert_eq!(s.edges, 5);
    assert_eq!(s.located, 4);
    assert_eq!(s.most_connected, Some((3, 3)));
    assert_eq!(s.degrees.max, 3);
    assert_eq!(s.degrees.median, 1.5);

    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["nodes"], 6);
    assert_eq!(json["ingest"]["self_loops"], 1);
}

#[test]
fn max_nodes_truncates_input() {
    let (_dir, loc, con) = fixture();
    let config = LoadConfig {
        max_nodes: Some(3),
        chunk_size: 1,
        ..Default::default()
    };
    let net = SocialNetwork::from_paths(&loc, &con, &config).unwrap();
    assert_eq!(net.user_count(), 3);
    // 1-2, 1-3, 2-3 survive; 3-4 points past the end
    assert_eq!(net.graph().edge_count(), 3);
    assert_eq!(net.ingest().out_of_range, 1);
}

#[test]
fn average_path_is_seeded() {
    let (_dir, net) = load();
    let a = net.average_shortest_path(500, 42);
    let b = net.average_shortest_path(500, 42);
    assert_eq!(a, b);
    assert!(a >= 1.0);
}
