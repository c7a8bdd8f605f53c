//! Dimensionality reduction for the visualization path.
//!
//! Three interchangeable strategies share one signature so a
//! [`ReductionMethod`] maps straight to its implementation. High-dimensional
//! embeddings destined for a cluster map go through [`staged_reduce`], which
//! first projects linearly to [`STAGE_DIM`] dimensions.

pub mod pca;
pub mod tsne;
pub mod umap;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DocscopeError, Result};

/// Intermediate dimensionality for staged reduction
pub const STAGE_DIM: usize = 10;

/// One row per document
pub type Matrix = Array2<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMethod {
    Pca,
    Tsne,
    Umap,
}

impl ReductionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReductionMethod::Pca => "pca",
            ReductionMethod::Tsne => "tsne",
            ReductionMethod::Umap => "umap",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReductionMethod::Pca => "PCA",
            ReductionMethod::Tsne => "TSNE",
            ReductionMethod::Umap => "UMAP",
        }
    }
}

impl FromStr for ReductionMethod {
    type Err = DocscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pca" => Ok(ReductionMethod::Pca),
            "tsne" | "t-sne" => Ok(ReductionMethod::Tsne),
            "umap" => Ok(ReductionMethod::Umap),
            _ => Err(DocscopeError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for every strategy. Each method reads only its own fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionParams {
    /// t-SNE effective neighbourhood size
    pub perplexity: f64,
    /// t-SNE attraction multiplier during the first iterations
    pub early_exaggeration: f64,
    /// t-SNE step size; `None` picks `max(n / exaggeration / 4, 50)`
    pub learning_rate: Option<f64>,
    /// t-SNE gradient steps
    pub n_iter: usize,
    /// UMAP local neighbourhood size (local vs. global balance)
    pub n_neighbors: usize,
    /// UMAP minimum spacing of embedded points
    pub min_dist: f64,
    /// UMAP optimisation epochs
    pub n_epochs: usize,
    /// Seed for every random draw
    pub seed: u64,
}

impl Default for ReductionParams {
    fn default() -> Self {
        Self {
            perplexity: 30.0,
            early_exaggeration: 12.0,
            learning_rate: None,
            n_iter: 1000,
            n_neighbors: 15,
            min_dist: 0.1,
            n_epochs: 500,
            seed: crate::config::DEFAULT_SEED,
        }
    }
}

impl ReductionParams {
    /// Parameters tuned for cluster separation on an `n`-document corpus.
    ///
    /// Neighbourhood sizes shrink with `n` so small corpora stay stable.
    pub fn for_clusters(n: usize) -> Self {
        Self {
            perplexity: ((n / 5).min(40) as f64).max(1.0),
            early_exaggeration: 20.0,
            n_neighbors: (n / 3).clamp(2, 30),
            min_dist: 0.3,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

type Strategy = fn(&Matrix, usize, &ReductionParams) -> Result<Matrix>;

fn strategy(method: ReductionMethod) -> Strategy {
    match method {
        ReductionMethod::Pca => pca::fit_transform,
        ReductionMethod::Tsne => tsne::fit_transform,
        ReductionMethod::Umap => umap::fit_transform,
    }
}

/// Project `vectors` to `target_dim` dimensions with the chosen method.
///
/// Output has one row per input row. Empty input gives empty output.
pub fn reduce(
    vectors: &Matrix,
    method: ReductionMethod,
    target_dim: usize,
    params: &ReductionParams,
) -> Result<Matrix> {
    if vectors.nrows() == 0 {
        return Ok(Array2::zeros((0, target_dim)));
    }
    if target_dim == 0 {
        return Err(DocscopeError::InvalidDimension {
            target: 0,
            ambient: vectors.ncols(),
        });
    }
    tracing::debug!(
        method = method.as_str(),
        n = vectors.nrows(),
        ambient = vectors.ncols(),
        target_dim,
        "reducing"
    );
    strategy(method)(vectors, target_dim, params)
}

/// Linear pre-reduction to [`STAGE_DIM`] dimensions; a pass-through when the
/// ambient dimensionality is already at or below it.
pub fn pre_reduce(vectors: &Matrix) -> Result<Matrix> {
    if vectors.ncols() > STAGE_DIM {
        pca::project(vectors, STAGE_DIM)
    } else {
        Ok(vectors.clone())
    }
}

/// [`pre_reduce`] followed by [`reduce`]
pub fn staged_reduce(
    vectors: &Matrix,
    method: ReductionMethod,
    target_dim: usize,
    params: &ReductionParams,
) -> Result<Matrix> {
    let staged = pre_reduce(vectors)?;
    reduce(&staged, method, target_dim, params)
}

/// Stored `f32` embeddings as an `n × d` matrix. Ragged rows are rejected.
pub fn to_f64(vectors: &[Vec<f32>]) -> Result<Matrix> {
    let n = vectors.len();
    let d = vectors.first().map(Vec::len).unwrap_or(0);
    let mut matrix = Array2::zeros((n, d));
    for (i, vector) in vectors.iter().enumerate() {
        if vector.len() != d {
            return Err(DocscopeError::DimensionMismatch {
                id: format!("row {}", i),
                expected: d,
                found: vector.len(),
            });
        }
        for (slot, &x) in matrix.row_mut(i).iter_mut().zip(vector.iter()) {
            *slot = f64::from(x);
        }
    }
    Ok(matrix)
}

pub(crate) fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// `n × n` squared Euclidean distances between rows
pub(crate) fn pairwise_squared_distances(data: &Matrix) -> Matrix {
    let n = data.nrows();
    let mut distances = Array2::zeros((n, n));
    Zip::indexed(&mut distances)
        .par_for_each(|(i, j), d| *d = squared_distance(data.row(i), data.row(j)));
    distances
}

/// Standard normal draw (Box-Muller)
pub(crate) fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(n: usize, d: usize) -> Matrix {
        Array2::from_shape_fn((n, d), |(i, j)| {
            ((i * 31 + j * 17) % 23) as f64 / 23.0 + if j == i % d { 1.0 } else { 0.0 }
        })
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("tsne".parse::<ReductionMethod>().unwrap(), ReductionMethod::Tsne);
        assert_eq!(" UMAP ".parse::<ReductionMethod>().unwrap(), ReductionMethod::Umap);
        assert_eq!("pca".parse::<ReductionMethod>().unwrap(), ReductionMethod::Pca);
    }

    #[test]
    fn test_unknown_method_rejected() {
        assert!(matches!(
            "isomap".parse::<ReductionMethod>(),
            Err(DocscopeError::InvalidMethod(name)) if name == "isomap"
        ));
    }

    #[test]
    fn test_cluster_params_scale_with_n() {
        let small = ReductionParams::for_clusters(6);
        assert_eq!(small.perplexity, 1.0);
        assert_eq!(small.n_neighbors, 2);

        let large = ReductionParams::for_clusters(1000);
        assert_eq!(large.perplexity, 40.0);
        assert_eq!(large.n_neighbors, 30);
        assert_eq!(large.min_dist, 0.3);
    }

    // ── staging ─────────────────────────────────────────────────────────

    #[test]
    fn test_pre_reduce_targets_stage_dim() {
        let data = wide(20, 64);
        let staged = pre_reduce(&data).unwrap();
        assert_eq!(staged.dim(), (20, STAGE_DIM));
    }

    #[test]
    fn test_pre_reduce_pads_when_rows_are_few() {
        let data = wide(6, 768);
        let staged = pre_reduce(&data).unwrap();
        assert_eq!(staged.dim(), (6, STAGE_DIM));
        assert!(staged.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_pre_reduce_passes_low_dim_through() {
        let data = wide(8, STAGE_DIM);
        assert_eq!(pre_reduce(&data).unwrap(), data);
    }

    #[test]
    fn test_staged_equals_direct_for_low_dim() {
        let data = wide(12, 5);
        let params = ReductionParams::default();
        let staged = staged_reduce(&data, ReductionMethod::Pca, 2, &params).unwrap();
        let direct = reduce(&data, ReductionMethod::Pca, 2, &params).unwrap();
        assert_eq!(staged, direct);
    }

    #[test]
    fn test_every_method_yields_n_by_target() {
        let data = wide(15, 32);
        let params = ReductionParams {
            n_iter: 300,
            n_epochs: 100,
            ..ReductionParams::for_clusters(15)
        };
        for method in [ReductionMethod::Pca, ReductionMethod::Tsne, ReductionMethod::Umap] {
            let out = staged_reduce(&data, method, 2, &params).unwrap();
            assert_eq!(out.dim(), (15, 2), "{}", method);
            assert!(out.iter().all(|x| x.is_finite()), "{}", method);
        }
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let data = wide(15, 12);
        let params = ReductionParams {
            n_iter: 300,
            n_epochs: 100,
            ..ReductionParams::for_clusters(15)
        };
        for method in [ReductionMethod::Tsne, ReductionMethod::Umap] {
            let a = reduce(&data, method, 2, &params).unwrap();
            let b = reduce(&data, method, 2, &params).unwrap();
            assert_eq!(a, b, "{}", method);
        }
    }

    #[test]
    fn test_empty_input_and_zero_target() {
        let params = ReductionParams::default();
        let empty = Array2::zeros((0, 4));
        assert!(reduce(&empty, ReductionMethod::Tsne, 2, &params).unwrap().is_empty());
        assert!(matches!(
            reduce(&wide(4, 3), ReductionMethod::Pca, 0, &params),
            Err(DocscopeError::InvalidDimension { target: 0, .. })
        ));
    }

    #[test]
    fn test_to_f64_rejects_ragged_rows() {
        let ok = to_f64(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(ok.dim(), (2, 2));
        assert_eq!(ok[[1, 0]], 3.0);
        assert!(matches!(
            to_f64(&[vec![1.0, 2.0], vec![3.0]]),
            Err(DocscopeError::DimensionMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_pairwise_distances_symmetric() {
        let data = wide(5, 3);
        let d = pairwise_squared_distances(&data);
        for i in 0..5 {
            assert_eq!(d[[i, i]], 0.0);
            for j in 0..5 {
                assert_eq!(d[[i, j]], d[[j, i]]);
            }
        }
    }
}
