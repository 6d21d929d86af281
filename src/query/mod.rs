//! Read-only queries over a [`GraphStore`](crate::store::GraphStore).
//!
//! Each query type is a thin borrow of the store: constructing one is free,
//! and any number of them can run concurrently against the same graph.
//!
//! | Query | Operation |
//! |-------|-----------|
//! | [`PathFinder`] | bounded BFS shortest path, hop distances |
//! | [`NeighborQuery`] | common neighbors, top-k by degree |
//! | [`GeoQuery`] | users within a radius of a point |

mod geo;
mod neighbors;
mod path;

pub use geo::GeoQuery;
pub use neighbors::NeighborQuery;
pub use path::PathFinder;
