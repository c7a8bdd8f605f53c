//! Principal component analysis on top of `linfa-reduction`.
//!
//! Output is always `n × k`: components beyond the data's rank are zero
//! filled, and each component's sign is fixed so its largest-magnitude score
//! is positive.

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_reduction::Pca;
use ndarray::{s, Array2, Axis};

use super::{Matrix, ReductionParams};
use crate::error::{DocscopeError, Result};

/// Below this total variance every row is treated as the same point
const NEGLIGIBLE_VARIANCE: f64 = 1e-12;

pub fn fit_transform(data: &Matrix, target_dim: usize, _params: &ReductionParams) -> Result<Matrix> {
    let ambient = data.ncols();
    if target_dim > ambient {
        return Err(DocscopeError::InvalidDimension {
            target: target_dim,
            ambient,
        });
    }
    project(data, target_dim)
}

/// Scores of the top `k` principal components, one row per input row.
pub fn project(data: &Matrix, k: usize) -> Result<Matrix> {
    let (n, d) = data.dim();
    let mut scores = Array2::zeros((n, k));

    // A centred n-row matrix has rank at most n - 1
    let rank_cap = k.min(d).min(n.saturating_sub(1));
    if rank_cap == 0 || total_variance(data) < NEGLIGIBLE_VARIANCE {
        return Ok(scores);
    }

    let dataset = DatasetBase::from(data.clone());
    let model = Pca::<f64>::params(rank_cap)
        .whiten(false)
        .fit(&dataset)
        .map_err(|e| DocscopeError::Reduction(format!("PCA fit failed: {}", e)))?;
    let projected: Array2<f64> = model.predict(data);

    scores.slice_mut(s![.., ..rank_cap]).assign(&projected);
    fix_signs(&mut scores);
    Ok(scores)
}

fn total_variance(data: &Matrix) -> f64 {
    data.var_axis(Axis(0), 0.0).sum()
}

fn fix_signs(scores: &mut Matrix) {
    for mut column in scores.columns_mut() {
        let pivot = column
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        if pivot < 0.0 {
            column.mapv_inplace(|x| -x);
        }
    }
}
