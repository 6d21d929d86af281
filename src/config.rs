//! Analysis configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "path": { "max_depth": 5 }, "louvain": { "resolution": 0.8 } }
//! ```

use crate::community::Louvain;
use crate::error::{Error, Result};
use crate::stats::DegreePolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input parsing.
    pub load: LoadConfig,
    /// Path queries and path-length sampling.
    pub path: PathConfig,
    /// Geo lookup.
    pub geo: GeoConfig,
    /// Degree ranking.
    pub top: TopConfig,
    /// Community detection.
    pub louvain: LouvainConfig,
    /// Degree statistics.
    pub stats: StatsConfig,
}

impl AnalysisConfig {
    /// Read a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail deep inside a query.
    pub fn validate(&self) -> Result<()> {
        if self.load.chunk_size == 0 {
            return Err(Error::InvalidParameter {
                name: "load.chunk_size",
                message: "must be at least 1",
            });
        }
        if !self.geo.max_distance.is_finite() || self.geo.max_distance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "geo.max_distance",
                message: "must be finite and non-negative",
            });
        }
        self.louvain.to_louvain().validate()
    }
}

/// Input parsing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Records parsed per batch.
    pub chunk_size: usize,
    /// Node count; when absent, the location file's line count.
    pub max_nodes: Option<usize>,
    /// Field separator byte.
    pub delimiter: u8,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100_000,
            max_nodes: None,
            delimiter: b',',
        }
    }
}

/// Path search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Hop limit for `find_path`.
    pub max_depth: usize,
    /// Sources sampled by average shortest path.
    pub sample: usize,
    /// RNG seed for sampling.
    pub seed: u64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            sample: 500,
            seed: 42,
        }
    }
}

/// Geo lookup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Planar distance cutoff in degrees.
    pub max_distance: f64,
    /// Maximum results.
    pub limit: usize,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            max_distance: 0.1,
            limit: 10,
        }
    }
}

/// Degree ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopConfig {
    /// Users listed.
    pub limit: usize,
}

impl Default for TopConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Louvain parameters; see [`Louvain`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LouvainConfig {
    /// Resolution γ; higher values give smaller communities.
    pub resolution: f64,
    /// Aggregation levels at most.
    pub max_levels: usize,
    /// Local-moving sweeps per level at most.
    pub max_sweeps: usize,
    /// Stop once a level improves modularity by less than this.
    pub min_modularity_gain: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_levels: 10,
            max_sweeps: 100,
            min_modularity_gain: 1e-7,
        }
    }
}

impl LouvainConfig {
    /// Build the detector.
    pub fn to_louvain(&self) -> Louvain {
        Louvain::new()
            .with_resolution(self.resolution)
            .with_max_levels(self.max_levels)
            .with_max_sweeps(self.max_sweeps)
            .with_min_modularity_gain(self.min_modularity_gain)
    }
}

/// Degree statistics settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Whether isolated users count.
    pub degree_policy: DegreePolicy,
}
