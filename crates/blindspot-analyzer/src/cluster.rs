//! K-means wrapper around `linfa-clustering`.

use linfa::prelude::*;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::error::AnalyzerError;

/// Fixed seed for every production fit. Analysis runs on the same snapshot
/// must partition identically.
pub const KMEANS_SEED: u64 = 42;

/// Output of one k-means fit.
///
/// `labels.len()` equals the observation count; `centroids.len()` equals `k`.
#[derive(Debug, Clone)]
pub struct KmeansPartition {
    /// Cluster index per observation, `0..k`.
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f32>>,
    /// Sum of squared distances to the assigned centroids.
    pub inertia: f64,
}

/// Fits k-means over the given vectors and returns the partition.
///
/// Deterministic for a fixed `seed`. Does not decide `k`; callers pick it via
/// the selector policies.
///
/// # Errors
///
/// Returns [`AnalyzerError::InvalidInput`] if the vector list is empty or
/// ragged, or `k` is outside `1..=n`; [`AnalyzerError::Clustering`] if the
/// underlying fit fails.
pub fn fit_kmeans(
    vectors: &[Vec<f32>],
    k: usize,
    seed: u64,
) -> Result<KmeansPartition, AnalyzerError> {
    if vectors.is_empty() {
        return Err(AnalyzerError::InvalidInput(
            "no vectors to cluster".to_string(),
        ));
    }
    let dim = vectors[0].len();
    if dim == 0 {
        return Err(AnalyzerError::InvalidInput(
            "zero-dimensional vectors".to_string(),
        ));
    }
    if vectors.iter().any(|v| v.len() != dim) {
        return Err(AnalyzerError::InvalidInput(format!(
            "vectors must share one dimension (expected {dim})"
        )));
    }
    if k == 0 || k > vectors.len() {
        return Err(AnalyzerError::InvalidInput(format!(
            "cluster count {k} out of range for {} vectors",
            vectors.len()
        )));
    }

    let mut flat = Vec::with_capacity(vectors.len() * dim);
    for vector in vectors {
        flat.extend_from_slice(vector);
    }
    let records = Array2::from_shape_vec((vectors.len(), dim), flat)
        .map_err(|e| AnalyzerError::InvalidInput(format!("observation matrix: {e}")))?;
    let dataset = DatasetBase::from(records);

    let rng = Xoshiro256Plus::seed_from_u64(seed);
    let model = KMeans::params_with_rng(k, rng)
        .fit(&dataset)
        .map_err(|e| AnalyzerError::Clustering(format!("k-means fit failed: {e}")))?;

    let labels = model.predict(dataset.records()).to_vec();
    let centroids = model
        .centroids()
        .rows()
        .into_iter()
        .map(|row| row.to_vec())
        .collect();
    let inertia = f64::from(model.inertia());

    Ok(KmeansPartition {
        labels,
        centroids,
        inertia,
    })
}
