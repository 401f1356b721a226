//! Cluster count selection policies.

use crate::cluster::fit_kmeans;
use crate::error::AnalyzerError;

/// Cluster count when the elbow scan cannot run.
const DEFAULT_K: usize = 3;

/// Hard ceiling for the bucketed policy.
const MAX_BUCKETED_K: usize = 15;

/// Upper bound on the elbow scan when the caller has no preference.
pub const DEFAULT_ELBOW_MAX_K: usize = 10;

/// How the per-category cluster count is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterCountPolicy {
    /// Fixed thresholds on the article count. The production default.
    #[default]
    Bucketed,
    /// Scan candidate counts and pick the inertia-curve knee.
    Elbow,
}

/// Maps a category's article count to a target cluster count.
///
/// Small pools get fixed sizes; from 200 articles the count scales at one
/// cluster per 25 articles, clamped to `[8, 15]`. Monotonically
/// non-decreasing in `n`.
#[must_use]
pub fn bucketed_cluster_count(n: usize) -> usize {
    if n < 30 {
        3
    } else if n < 60 {
        5
    } else if n < 120 {
        8
    } else if n < 200 {
        10
    } else {
        (n / 25).clamp(8, MAX_BUCKETED_K)
    }
}

/// Picks a cluster count by the elbow heuristic.
///
/// Fits k-means for every candidate `k` in `2..=min(max_k, n / 3)` and keeps
/// each fit's inertia. The chosen `k` sits at the maximum second difference
/// of the inertia curve, the point where the curve flattens hardest; the
/// first maximum wins. Fewer than 4 candidates fall back to 3.
///
/// # Errors
///
/// Returns [`AnalyzerError`] if any candidate fit fails.
pub fn elbow_cluster_count(
    vectors: &[Vec<f32>],
    max_k: usize,
    seed: u64,
) -> Result<usize, AnalyzerError> {
    let upper = max_k.min(vectors.len() / 3);
    let candidates: Vec<usize> = (2..=upper).collect();
    if candidates.len() < 4 {
        return Ok(DEFAULT_K);
    }

    let mut inertias = Vec::with_capacity(candidates.len());
    for &k in &candidates {
        let partition = fit_kmeans(vectors, k, seed)?;
        inertias.push(partition.inertia);
    }

    Ok(knee_candidate(&candidates, &inertias))
}

/// `(inertia[i-1] - inertia[i]) - (inertia[i] - inertia[i+1])` over interior
/// indices, then the candidate one past the winning interior point.
fn knee_candidate(candidates: &[usize], inertias: &[f64]) -> usize {
    let mut best_index = 0;
    let mut best_change = f64::NEG_INFINITY;
    for i in 1..inertias.len() - 1 {
        let change = (inertias[i - 1] - inertias[i]) - (inertias[i] - inertias[i + 1]);
        if change > best_change {
            best_change = change;
            best_index = i - 1;
        }
    }
    candidates[best_index + 1]
}
