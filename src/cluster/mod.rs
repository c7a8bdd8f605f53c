//! Partition embeddings into `k` groups with seeded k-means.
//!
//! The fit itself is `linfa-clustering`'s k-means++ with restarts; this
//! module validates `k`, guarantees every cluster keeps a member, and
//! reports inertia as the plain sum of squared distances.

pub mod keywords;

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::{KMeans as LinfaKMeans, KMeansInit};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{DocscopeError, Result};
use crate::reduce::{squared_distance, Matrix};

pub use keywords::{cluster_keywords, label_clusters};

/// Number of k-means++ restarts; the lowest-inertia run wins
pub const DEFAULT_RESTARTS: usize = 10;
const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

/// Cluster label per document, in collection order
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub labels: Vec<usize>,
    pub k: usize,
    /// `k × d` member means
    pub centroids: Matrix,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

impl ClusterAssignment {
    /// Indices of the documents in `cluster`
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, &label)| label == cluster)
            .map(|(i, _)| i)
    }

    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub restarts: usize,
    pub seed: u64,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            restarts: DEFAULT_RESTARTS,
            seed: crate::config::DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Fit `k` clusters to the rows of `data`.
    ///
    /// Fails with `InvalidK` unless `1 <= k <= n`.
    pub fn fit(&self, data: &Matrix) -> Result<ClusterAssignment> {
        let n = data.nrows();
        if self.k == 0 || self.k > n {
            return Err(DocscopeError::InvalidK { k: self.k, n });
        }

        // k-means++ cannot seed more centres than there are distinct points
        let init = if distinct_rows(data, self.k) >= self.k {
            KMeansInit::KMeansPlusPlus
        } else {
            KMeansInit::Random
        };

        let dataset = DatasetBase::from(data.clone());
        let model = LinfaKMeans::params_with_rng(self.k, StdRng::seed_from_u64(self.seed))
            .n_runs(self.restarts)
            .max_n_iterations(MAX_ITERATIONS)
            .tolerance(TOLERANCE)
            .init_method(init)
            .fit(&dataset)
            .map_err(|e| DocscopeError::Clustering(format!("k-means fit failed: {}", e)))?;

        let predicted: Array1<usize> = model.predict(data);
        let mut labels = predicted.to_vec();
        if relocate_empty(data, model.centroids(), &mut labels, self.k) {
            tracing::debug!(k = self.k, "moved documents into empty clusters");
        }

        let centroids = member_means(data, &labels, self.k);
        let inertia: f64 = data
            .rows()
            .into_iter()
            .zip(labels.iter())
            .map(|(x, &label)| squared_distance(x, centroids.row(label)))
            .sum();
        tracing::debug!(k = self.k, inertia, "k-means fitted");

        Ok(ClusterAssignment {
            labels,
            k: self.k,
            centroids,
            inertia,
        })
    }
}

/// Cluster labels in `[0, k)` for each row of `data`
pub fn group(data: &Matrix, k: usize, seed: u64) -> Result<Vec<usize>> {
    Ok(KMeans::new(k).with_seed(seed).fit(data)?.labels)
}

/// Distinct rows, counting no further than `limit`
fn distinct_rows(data: &Matrix, limit: usize) -> usize {
    let mut seen: Vec<ArrayView1<f64>> = Vec::new();
    for row in data.rows() {
        if !seen.iter().any(|s| *s == row) {
            seen.push(row);
            if seen.len() >= limit {
                break;
            }
        }
    }
    seen.len()
}

/// Give each empty cluster the point farthest from its current centre,
/// taken from a cluster that keeps at least one other member. Returns
/// whether anything moved.
fn relocate_empty(data: &Matrix, centroids: &Array2<f64>, labels: &mut [usize], k: usize) -> bool {
    let mut counts = vec![0usize; k];
    for &label in labels.iter() {
        counts[label] += 1;
    }

    let mut moved = false;
    for empty in 0..k {
        if counts[empty] != 0 {
            continue;
        }
        let distance = |i: usize| squared_distance(data.row(i), centroids.row(labels[i]));
        let donor = (0..labels.len())
            .filter(|&i| counts[labels[i]] > 1)
            .max_by(|&a, &b| distance(a).total_cmp(&distance(b)).then(b.cmp(&a)));
        let Some(i) = donor else {
            continue;
        };
        counts[labels[i]] -= 1;
        counts[empty] += 1;
        labels[i] = empty;
        moved = true;
    }
    moved
}

fn member_means(data: &Matrix, labels: &[usize], k: usize) -> Matrix {
    let mut centroids = Array2::zeros((k, data.ncols()));
    for c in 0..k {
        let members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == c).collect();
        if let Some(mean) = data.select(Axis(0), &members).mean_axis(Axis(0)) {
            centroids.row_mut(c).assign(&mean);
        }
    }
    centroids
}
