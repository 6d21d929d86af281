//! # socgraph
//!
//! In-memory social graph analysis: build once from raw connection and
//! location data, then answer structural queries over the frozen graph.
//!
//! - [`store`]: chunked construction ([`GraphBuilder`]) and the immutable CSR
//!   store ([`GraphStore`]).
//! - [`query`]: bounded BFS paths, common neighbors, degree ranking, geo lookup.
//! - [`community`]: Louvain modularity optimization.
//! - [`stats`]: degree distribution summaries.
//! - [`loader`] and [`network`]: file ingestion and the 1-based user-id facade.
//!
//! ```
//! use socgraph::{GraphStore, PathFinder};
//!
//! let graph = GraphStore::from_index_edges(4, [(0, 1), (1, 2), (2, 3), (0, 2)]).unwrap();
//! let path = PathFinder::new(&graph).find_path(0, 3, 3).unwrap();
//! assert_eq!(path, vec![0, 2, 3]);
//! ```
//!
//! The `parallel` feature (default) uses rayon for adjacency finalization,
//! geo scans, and degree statistics; results match the sequential build.

pub mod community;
pub mod config;
/// Error types used across `socgraph`.
pub mod error;
pub mod loader;
pub mod network;
pub mod query;
pub mod stats;
pub mod store;

pub use error::{Error, Result};

pub use community::{modularity, CommunityDetection, LevelSummary, Louvain, Partition};
pub use config::AnalysisConfig;
pub use loader::Loader;
pub use network::{Communities, GraphSummary, SocialNetwork, UserInfo};
pub use query::{GeoQuery, NeighborQuery, PathFinder};
pub use stats::{DegreePolicy, DegreeStats};
pub use store::{GraphBuilder, GraphStore, IngestStats, Location};
