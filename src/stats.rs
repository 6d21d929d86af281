//! Degree statistics.
//!
//! The median and quartiles use linear interpolation between closest ranks,
//! so the median of an even-length sample is the mean of its two middle
//! values. The 90th percentile is a nearest-rank value, `sorted[⌊0.9·n⌋]`,
//! so it is always a degree that actually occurs.
//!
//! Whether isolated (degree-0) users belong in the sample is a policy choice:
//! in a follower graph most of them are accounts with missing data rather
//! than genuinely unconnected users. [`DegreePolicy::ActiveOnly`] (the
//! default) leaves them out.

use crate::store::GraphStore;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which nodes contribute to [`DegreeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreePolicy {
    /// Only nodes with at least one connection.
    #[default]
    ActiveOnly,
    /// Every node, isolated ones included.
    IncludeIsolated,
}

/// Summary of the degree distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DegreeStats {
    /// Nodes in the sample.
    pub count: usize,
    /// Mean degree.
    pub mean: f64,
    /// Median degree.
    pub median: f64,
    /// 90th percentile (nearest rank).
    pub p90: f64,
    /// Largest degree.
    pub max: usize,
    /// Smallest degree.
    pub min: usize,
    /// Tukey fences `(Q1 - 1.5 IQR, Q3 + 1.5 IQR)`.
    pub fences: (f64, f64),
    /// Nodes whose degree falls outside the fences.
    pub outliers: usize,
}

impl DegreeStats {
    /// Compute over every node of `graph` selected by `policy`.
    ///
    /// An empty sample yields all-zero statistics.
    pub fn compute(graph: &GraphStore, policy: DegreePolicy) -> Self {
        let mut degrees: Vec<usize> = match policy {
            DegreePolicy::ActiveOnly => graph.degrees().filter(|&d| d > 0).collect(),
            DegreePolicy::IncludeIsolated => graph.degrees().collect(),
        };
        sort(&mut degrees);
        Self::from_sorted(&degrees)
    }

    /// Compute from an ascending-sorted sample.
    pub fn from_sorted(sorted: &[usize]) -> Self {
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Self::default();
        };
        let count = sorted.len();
        let mean = sorted.iter().map(|&d| d as f64).sum::<f64>() / count as f64;
        let fences = tukey_fences(sorted);
        let outliers = sorted
            .iter()
            .filter(|&&d| (d as f64) < fences.0 || (d as f64) > fences.1)
            .count();

        Self {
            count,
            mean,
            median: quantile(sorted, 0.5),
            p90: nearest_rank(sorted, 0.9) as f64,
            max,
            min,
            fences,
            outliers,
        }
    }
}

#[cfg(feature = "parallel")]
fn sort(values: &mut [usize]) {
    values.par_sort_unstable();
}

#[cfg(not(feature = "parallel"))]
fn sort(values: &mut [usize]) {
    values.sort_unstable();
}

/// Quantile `q ∈ [0, 1]` of an ascending-sorted, non-empty sample.
pub fn quantile(sorted: &[usize], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * frac
}

/// Element at rank `⌊q·n⌋` of an ascending-sorted, non-empty sample.
pub fn nearest_rank(sorted: &[usize], q: f64) -> usize {
    debug_assert!(!sorted.is_empty());
    let rank = (q.clamp(0.0, 1.0) * sorted.len() as f64) as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Interquartile-range fences of an ascending-sorted, non-empty sample.
pub fn tukey_fences(sorted: &[usize]) -> (f64, f64) {
    let q1 = quantile(sorted, 0.25);
    let q3 = quantile(sorted, 0.75);
    let iqr = q3 - q1;
    (q1 - 1.5 * iqr, q3 + 1.5 * iqr)
}
