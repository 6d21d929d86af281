//! Nearest-user lookup by planar distance.
//!
//! Distances are Euclidean in degree space, `sqrt(dlat² + dlong²)`. That is a
//! rough proxy near the equator and increasingly wrong toward the poles, but
//! it is what the radius parameter is expressed in.
//!
//! Every call is a full scan over the location array. With the `parallel`
//! feature the scan is split across threads; candidates are then sorted by
//! `(distance, index)`, so the result does not depend on the schedule.

use crate::error::{Error, Result};
use crate::store::GraphStore;
use crate::store::Location;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Geospatial queries over a [`GraphStore`].
#[derive(Debug, Clone, Copy)]
pub struct GeoQuery<'g> {
    graph: &'g GraphStore,
}

impl<'g> GeoQuery<'g> {
    /// Borrow `graph` for location queries.
    pub fn new(graph: &'g GraphStore) -> Self {
        Self { graph }
    }

    /// Up to `limit` nodes within `max_distance` of `(lat, long)`, as
    /// `(index, distance)`, nearest first; ties go to the lower index.
    ///
    /// Nodes without a location are never returned.
    pub fn nearest(
        &self,
        lat: f64,
        long: f64,
        max_distance: f64,
        limit: usize,
    ) -> Result<Vec<(usize, f64)>> {
        if !lat.is_finite() || !long.is_finite() {
            return Err(Error::InvalidParameter {
                name: "lat/long",
                message: "must be finite",
            });
        }
        if max_distance.is_nan() || max_distance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "max_distance",
                message: "must be non-negative",
            });
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits = self.scan(lat, long, max_distance);
        hits.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(limit);
        Ok(hits)
    }

    #[cfg(feature = "parallel")]
    fn scan(&self, lat: f64, long: f64, max_distance: f64) -> Vec<(usize, f64)> {
        self.graph
            .raw_locations()
            .par_iter()
            .enumerate()
            .filter_map(|(i, &raw)| candidate(i, raw, lat, long, max_distance))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn scan(&self, lat: f64, long: f64, max_distance: f64) -> Vec<(usize, f64)> {
        self.graph
            .raw_locations()
            .iter()
            .enumerate()
            .filter_map(|(i, &raw)| candidate(i, raw, lat, long, max_distance))
            .collect()
    }
}

#[inline]
fn candidate(i: usize, raw: [f32; 2], lat: f64, long: f64, max_distance: f64) -> Option<(usize, f64)> {
    let loc = Location::from_stored(raw)?;
    let d = loc.planar_distance(lat, long);
    (d <= max_distance).then_some((i, d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GraphBuilder;

    fn located() -> GraphStore {
        let mut b = GraphBuilder::new(6).unwrap();
        b.add_location(1, 10.0, 10.0);
        b.add_location(2, 10.5, 10.0);
        b.add_location(3, 10.0, 9.5);
        b.add_location(4, 12.0, 12.0);
        // 5 has no location; 6 is the explicit sentinel
        b.add_location(6, 0.0, 0.0);
        b.finish().0
    }

    #[test]
    fn test_nearest_sorted_with_index_ties() {
        let g = located();
        let q = GeoQuery::new(&g);
        let hits = q.nearest(10.0, 10.0, 1.0, 10).unwrap();
        assert_eq!(hits, vec![(0, 0.0), (1, 0.5), (2, 0.5)]);
    }

    #[test]
    fn test_nearest_limit_and_radius() {
        let g = located();
        let q = GeoQuery::new(&g);
        assert_eq!(q.nearest(10.0, 10.0, 1.0, 2).unwrap().len(), 2);
        assert_eq!(q.nearest(10.0, 10.0, 0.1, 10).unwrap(), vec![(0, 0.0)]);
        assert!(q.nearest(10.0, 10.0, 1.0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_sentinel_never_returned() {
        let g = located();
        let q = GeoQuery::new(&g);
        let hits = q.nearest(0.0, 0.0, 1000.0, 100).unwrap();
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|&(i, _)| i < 4));
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_invalid_parameters() {
        let g = located();
        let q = GeoQuery::new(&g);
        assert!(q.nearest(f64::NAN, 0.0, 1.0, 1).is_err());
        assert!(q.nearest(0.0, 0.0, -1.0, 1).is_err());
    }
}
