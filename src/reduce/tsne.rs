//! Exact t-SNE (van der Maaten & Hinton, 2008).
//!
//! O(n²) per iteration, which is fine for corpora of a few thousand
//! documents. Pairwise work runs on rayon through `ndarray::Zip`; every
//! element is computed independently so results are bit-identical for a
//! fixed seed.

use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::{gaussian, pairwise_squared_distances, pca, squared_distance, Matrix, ReductionParams};
use crate::error::Result;

const EXAGGERATION_ITERATIONS: usize = 250;
const INITIAL_MOMENTUM: f64 = 0.5;
const FINAL_MOMENTUM: f64 = 0.8;
const MIN_GAIN: f64 = 0.01;
const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const PERPLEXITY_STEPS: usize = 100;

pub fn fit_transform(data: &Matrix, target_dim: usize, params: &ReductionParams) -> Result<Matrix> {
    let n = data.nrows();
    if n < 3 {
        return pca::project(data, target_dim);
    }

    let perplexity = params.perplexity.clamp(1.0, (n - 1) as f64);
    let p = joint_probabilities(data, perplexity);
    let learning_rate = params
        .learning_rate
        .unwrap_or_else(|| (n as f64 / params.early_exaggeration / 4.0).max(50.0));

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut y = Array2::from_shape_simple_fn((n, target_dim), || gaussian(&mut rng) * 1e-4);
    let mut update = Array2::<f64>::zeros((n, target_dim));
    let mut gains = Array2::<f64>::ones((n, target_dim));

    for iter in 0..params.n_iter {
        let (exaggeration, momentum) = if iter < EXAGGERATION_ITERATIONS {
            (params.early_exaggeration, INITIAL_MOMENTUM)
        } else {
            (1.0, FINAL_MOMENTUM)
        };

        let grad = gradient(&p, &y, exaggeration);

        Zip::from(&mut y)
            .and(&mut update)
            .and(&mut gains)
            .and(&grad)
            .for_each(|pos, step, gain, &g| {
                *gain = if (g > 0.0) != (*step > 0.0) {
                    *gain + 0.2
                } else {
                    (*gain * 0.8).max(MIN_GAIN)
                };
                *step = momentum * *step - learning_rate * *gain * g;
                *pos += *step;
            });
        recenter(&mut y);

        if iter % 250 == 0 {
            tracing::debug!(iter, exaggeration, "t-SNE step");
        }
    }

    Ok(y)
}

/// Symmetrised input affinities `P` with the requested perplexity
fn joint_probabilities(data: &Matrix, perplexity: f64) -> Matrix {
    let n = data.nrows();
    let distances = pairwise_squared_distances(data);

    let target_entropy = perplexity.ln();
    let conditional: Vec<Array1<f64>> = (0..n)
        .into_par_iter()
        .map(|i| conditional_row(distances.row(i), i, target_entropy))
        .collect();

    let norm = 2.0 * n as f64;
    Array2::from_shape_fn((n, n), |(i, j)| {
        ((conditional[i][j] + conditional[j][i]) / norm).max(1e-12)
    })
}

/// Binary search on the Gaussian precision so the row's entropy matches
/// `ln(perplexity)`.
fn conditional_row(distances: ArrayView1<f64>, i: usize, target_entropy: f64) -> Array1<f64> {
    let mut beta: f64 = 1.0;
    let mut beta_min = f64::NEG_INFINITY;
    let mut beta_max = f64::INFINITY;
    let mut row = Array1::<f64>::zeros(distances.len());

    for _ in 0..PERPLEXITY_STEPS {
        let mut sum = 0.0_f64;
        let mut weighted = 0.0_f64;
        for (j, &d) in distances.iter().enumerate() {
            row[j] = if j == i { 0.0 } else { (-d * beta).exp() };
            sum += row[j];
            weighted += d * row[j];
        }
        if sum <= f64::MIN_POSITIVE {
            // Bandwidth too narrow: every neighbour underflowed
            beta_max = beta;
            beta = if beta_min.is_finite() { (beta + beta_min) / 2.0 } else { beta / 2.0 };
            continue;
        }

        let entropy = sum.ln() + beta * weighted / sum;
        let diff = entropy - target_entropy;
        if diff.abs() < PERPLEXITY_TOLERANCE {
            break;
        }
        if diff > 0.0 {
            beta_min = beta;
            beta = if beta_max.is_finite() { (beta + beta_max) / 2.0 } else { beta * 2.0 };
        } else {
            beta_max = beta;
            beta = if beta_min.is_finite() { (beta + beta_min) / 2.0 } else { beta / 2.0 };
        }
    }

    let sum = row.sum();
    if sum > 0.0 {
        row /= sum;
    }
    row
}

fn gradient(p: &Matrix, y: &Matrix, exaggeration: f64) -> Matrix {
    let n = y.nrows();
    let mut num = Array2::<f64>::zeros((n, n));
    Zip::indexed(&mut num).par_for_each(|(i, j), v| {
        if i != j {
            *v = 1.0 / (1.0 + squared_distance(y.row(i), y.row(j)));
        }
    });
    let z = num.sum().max(f64::MIN_POSITIVE);

    let mut grad = Array2::<f64>::zeros(y.raw_dim());
    Zip::indexed(&mut grad).par_for_each(|(i, d), g| {
        *g = (0..n)
            .filter(|&j| j != i)
            .map(|j| {
                let q = (num[[i, j]] / z).max(1e-12);
                4.0 * (exaggeration * p[[i, j]] - q) * num[[i, j]] * (y[[i, d]] - y[[j, d]])
            })
            .sum();
    });
    grad
}

fn recenter(y: &mut Matrix) {
    if let Some(mean) = y.mean_axis(Axis(0)) {
        *y -= &mean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> Matrix {
        let mut data = Array2::zeros((16, 4));
        for i in 0..8 {
            let jitter = i as f64 * 0.01;
            data.row_mut(2 * i).assign(&array![jitter, 0.0, 0.0, jitter]);
            data.row_mut(2 * i + 1)
                .assign(&array![10.0 + jitter, 10.0, 10.0, jitter]);
        }
        data
    }

    fn params() -> ReductionParams {
        ReductionParams {
            perplexity: 4.0,
            n_iter: 500,
            ..ReductionParams::default()
        }
    }

    #[test]
    fn test_conditional_row_is_distribution() {
        let distances = array![0.0, 1.0, 4.0, 9.0];
        let row = conditional_row(distances.view(), 0, 2f64.ln());
        assert_eq!(row[0], 0.0);
        assert!((row.sum() - 1.0).abs() < 1e-9);
        assert!(row[1] > row[2] && row[2] > row[3]);
    }

    #[test]
    fn test_joint_probabilities_symmetric() {
        let p = joint_probabilities(&two_blobs(), 4.0);
        for i in 0..p.nrows() {
            for j in 0..p.ncols() {
                assert!((p[[i, j]] - p[[j, i]]).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_separates_blobs() {
        let y = fit_transform(&two_blobs(), 2, &params()).unwrap();
        let within = squared_distance(y.row(0), y.row(2));
        let across = squared_distance(y.row(0), y.row(1));
        assert!(across > within, "across {} within {}", across, within);
    }

    #[test]
    fn test_layout_is_finite_and_centred() {
        let y = fit_transform(&two_blobs(), 2, &params()).unwrap();
        assert_eq!(y.dim(), (16, 2));
        assert!(y.iter().all(|x| x.is_finite()));
        let mean = y.mean_axis(Axis(0)).unwrap();
        assert!(mean.iter().all(|m| m.abs() < 1e-6));
    }

    #[test]
    fn test_tiny_input_falls_back_to_pca() {
        let y = fit_transform(&array![[1.0, 2.0], [3.0, 4.0]], 2, &params()).unwrap();
        assert_eq!(y.dim(), (2, 2));
    }
}
