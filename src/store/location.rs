//! Per-node coordinates.

use serde::Serialize;

/// Stored value for "no location".
pub(crate) const SENTINEL: [f32; 2] = [0.0, 0.0];

/// A `(lat, long)` pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    /// Latitude, `[-90, 90]`.
    pub lat: f64,
    /// Longitude, `[-180, 180]`.
    pub long: f64,
}

impl Location {
    /// Whether the coordinates are finite and within the lat/long ranges.
    pub fn is_valid(lat: f64, long: f64) -> bool {
        lat.is_finite()
            && long.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&long)
    }

    pub(crate) fn from_stored(raw: [f32; 2]) -> Option<Self> {
        if is_sentinel(raw) {
            None
        } else {
            Some(Self {
                lat: f64::from(raw[0]),
                long: f64::from(raw[1]),
            })
        }
    }

    /// Planar Euclidean distance in degrees.
    #[inline]
    pub fn planar_distance(&self, lat: f64, long: f64) -> f64 {
        planar_distance(self.lat, self.long, lat, long)
    }
}

#[inline]
pub(crate) fn is_sentinel(raw: [f32; 2]) -> bool {
    raw == SENTINEL
}

#[inline]
pub(crate) fn planar_distance(lat_a: f64, long_a: f64, lat_b: f64, long_b: f64) -> f64 {
    ((lat_a - lat_b).powi(2) + (long_a - long_b).powi(2)).sqrt()
}
