//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! Louvain is a multi-level, greedy modularity optimization algorithm:
//!
//! 1. **Phase A (Local Moving)**: Start with each node in its own community.
//!    Sweep nodes in ascending index order, moving each to the neighboring
//!    community with the largest positive modularity gain, until a sweep
//!    makes no move.
//!
//! 2. **Phase B (Aggregation)**: Build a meta-graph where communities become
//!    single nodes. Edge weights are sums of edges between communities.
//!    Self-loops represent internal community edges.
//!
//! 3. **Iterate**: Repeat A and B on the meta-graph until a level makes no
//!    move, modularity improves by less than `min_modularity_gain`, or
//!    `max_levels` is reached.
//!
//! The levels run as an explicit loop over an explicit [`WeightedGraph`], so
//! stack depth is constant and each level is reported in
//! [`Partition::levels`].
//!
//! ## Gain
//!
//! Moving node `i` (degree `k_i`) out of `C_i` and into `C`:
//!
//! ```text
//! ΔQ(i→C) = [k_i,in(C)   − γ·k_i·Σ_tot(C)          / 2m]
//!         − [k_i,in(C_i) − γ·k_i·(Σ_tot(C_i) − k_i) / 2m]
//! ```
//!
//! `k_i,in(C)` is the edge weight from `i` into `C`, `Σ_tot(C)` the degree
//! sum of `C`. Only strictly positive gains move a node, and candidate
//! communities are scanned in ascending id order so that equal gains resolve
//! to the lowest id. Every move raises modularity, so the result never scores
//! below the all-singletons partition.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use super::partition::{LevelSummary, Partition};
use super::traits::CommunityDetection;
use super::weighted::{renumber, WeightedGraph};
use crate::error::{Error, Result};
use crate::store::GraphStore;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Gains within this margin of the current best are treated as ties.
const GAIN_TOLERANCE: f64 = 1e-12;

/// Louvain community detection algorithm.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution parameter (gamma).
    resolution: f64,
    /// Maximum sweeps per level.
    max_sweeps: usize,
    /// Maximum levels of aggregation.
    max_levels: usize,
    /// Minimum modularity improvement to continue.
    min_modularity_gain: f64,
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            max_sweeps: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set maximum sweeps per level.
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Set maximum aggregation levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Set the modularity improvement below which aggregation stops.
    pub fn with_min_modularity_gain(mut self, epsilon: f64) -> Self {
        self.min_modularity_gain = epsilon;
        self
    }

    /// Check the parameters without running.
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: "must be finite and positive",
            });
        }
        if self.max_sweeps == 0 {
            return Err(Error::InvalidParameter {
                name: "max_sweeps",
                message: "must be at least 1",
            });
        }
        if self.min_modularity_gain.is_nan() {
            return Err(Error::InvalidParameter {
                name: "min_modularity_gain",
                message: "must not be NaN",
            });
        }
        Ok(())
    }

    /// Phase A: local moving on a weighted graph.
    /// Returns (communities, moves, sweeps).
    fn local_moving(&self, wg: &WeightedGraph) -> (Vec<usize>, usize, usize) {
        let n = wg.n;
        let two_m = 2.0 * wg.total_weight;

        let mut communities: Vec<usize> = (0..n).collect();
        let mut sigma_tot = wg.degrees.clone();

        // Scratch: weight from the current node into each touched community.
        let mut weight_to = vec![0.0; n];
        let mut touched: Vec<usize> = Vec::new();

        let mut moves = 0;
        let mut sweeps = 0;

        while sweeps < self.max_sweeps {
            sweeps += 1;
            let mut sweep_moves = 0;

            for node in 0..n {
                let current = communities[node];
                let ki = wg.degrees[node];

                for &(neighbor, w) in &wg.adj[node] {
                    let c = communities[neighbor];
                    if weight_to[c] == 0.0 {
                        touched.push(c);
                    }
                    weight_to[c] += w;
                }
                touched.sort_unstable();
                touched.dedup();

                // Take the node out of its community.
                sigma_tot[current] -= ki;
                let stay = weight_to[current] - self.resolution * ki * sigma_tot[current] / two_m;

                let mut best = current;
                let mut best_gain = 0.0;
                for &c in &touched {
                    if c == current {
                        continue;
                    }
                    let gain =
                        weight_to[c] - self.resolution * ki * sigma_tot[c] / two_m - stay;
                    if gain > best_gain + GAIN_TOLERANCE {
                        best_gain = gain;
                        best = c;
                    }
                }

                sigma_tot[best] += ki;
                if best != current {
                    communities[node] = best;
                    sweep_moves += 1;
                }

                for &c in &touched {
                    weight_to[c] = 0.0;
                }
                touched.clear();
            }

            debug!(sweep = sweeps, moves = sweep_moves, "local moving sweep");
            moves += sweep_moves;
            if sweep_moves == 0 {
                break;
            }
        }

        (communities, moves, sweeps)
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for Louvain {
    fn detect(&self, graph: &GraphStore) -> Result<Partition> {
        self.validate()?;
        let start = Instant::now();
        let n = graph.node_count();

        if graph.edge_count() == 0 {
            if n > 0 {
                warn!(nodes = n, "graph has no edges; every node is its own community");
            }
            return Ok(Partition::singletons(n, 0.0));
        }

        let mut current = WeightedGraph::from_store(graph);
        let singletons: Vec<usize> = (0..n).collect();
        let mut prev_modularity = current.modularity(&singletons, self.resolution);

        // membership[v] = meta-node holding original node v at the current level
        let mut membership = singletons;
        let mut levels = Vec::new();

        for level in 0..self.max_levels {
            // Phase A: local moving
            let (partition, moves, sweeps) = self.local_moving(&current);
            if moves == 0 {
                break;
            }

            let (partition, n_communities) = renumber(&partition);
            let modularity = current.modularity(&partition, self.resolution);
            for m in membership.iter_mut() {
                *m = partition[*m];
            }

            debug!(
                level,
                nodes = current.n,
                communities = n_communities,
                moves,
                sweeps,
                modularity,
                "louvain level"
            );
            levels.push(LevelSummary {
                nodes: current.n,
                communities: n_communities,
                moves,
                sweeps,
                modularity,
            });

            let gain = modularity - prev_modularity;
            prev_modularity = modularity;
            if gain < self.min_modularity_gain || n_communities == current.n {
                break;
            }

            // Phase B: aggregate
            current = current.aggregate(&partition, n_communities);
        }

        let (assignment, community_count) = renumber(&membership);
        info!(
            nodes = n,
            communities = community_count,
            levels = levels.len(),
            modularity = prev_modularity,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "louvain finished"
        );

        Ok(Partition::new(
            assignment,
            community_count,
            prev_modularity,
            levels,
        ))
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}
