//! UMAP (McInnes, Healy & Melville, 2018) for small corpora.
//!
//! Exact k-nearest-neighbour graph, smooth-kNN calibration, fuzzy-union
//! symmetrisation, PCA initial layout, then seeded SGD with negative
//! sampling. Optimisation is sequential so a fixed seed reproduces the layout.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::{pairwise_squared_distances, pca, squared_distance, Matrix, ReductionParams};
use crate::error::Result;

const SPREAD: f64 = 1.0;
const NEGATIVE_SAMPLES: usize = 5;
const SMOOTH_K_STEPS: usize = 64;
const SMOOTH_K_TOLERANCE: f64 = 1e-5;
const GRADIENT_CLIP: f64 = 4.0;
const INIT_SCALE: f64 = 10.0;

/// One weighted edge of the fuzzy graph
#[derive(Debug, Clone, Copy)]
struct Edge {
    head: usize,
    tail: usize,
    epochs_per_sample: f64,
}

pub fn fit_transform(data: &Matrix, target_dim: usize, params: &ReductionParams) -> Result<Matrix> {
    let n = data.nrows();
    if n < 3 {
        return pca::project(data, target_dim);
    }

    let k = params.n_neighbors.clamp(2, n - 1);
    let graph = fuzzy_graph(data, k);
    let edges = edges_from_graph(&graph);
    let (a, b) = fit_ab(params.min_dist);
    tracing::debug!(k, edges = edges.len(), a, b, "UMAP graph built");

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut y = initial_layout(data, target_dim, &mut rng)?;
    optimize(&mut y, &edges, a, b, params.n_epochs, &mut rng);
    Ok(y)
}

/// Symmetric membership strengths `w_ij ∈ [0, 1]`
fn fuzzy_graph(data: &Matrix, k: usize) -> Matrix {
    let n = data.nrows();
    let distances = pairwise_squared_distances(data);
    let directed: Vec<Array1<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut neighbors: Vec<(usize, f64)> = distances
                .row(i)
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, &d2)| (j, d2.sqrt()))
                .collect();
            neighbors.sort_by(|x, y| x.1.total_cmp(&y.1).then(x.0.cmp(&y.0)));
            neighbors.truncate(k);

            let rho = neighbors
                .iter()
                .map(|&(_, d)| d)
                .find(|&d| d > 0.0)
                .unwrap_or(0.0);
            let sigma = smooth_knn_sigma(&neighbors, rho, k);

            let mut row = Array1::<f64>::zeros(n);
            for (j, d) in neighbors {
                row[j] = (-((d - rho).max(0.0)) / sigma).exp();
            }
            row
        })
        .collect();

    Array2::from_shape_fn((n, n), |(i, j)| {
        let (w, wt) = (directed[i][j], directed[j][i]);
        w + wt - w * wt
    })
}

/// Bandwidth such that the neighbour memberships sum to `log2(k)`
fn smooth_knn_sigma(neighbors: &[(usize, f64)], rho: f64, k: usize) -> f64 {
    let target = (k as f64).log2();
    let mut lo = 0.0_f64;
    let mut hi = f64::INFINITY;
    let mut sigma = 1.0_f64;

    for _ in 0..SMOOTH_K_STEPS {
        let total: f64 = neighbors
            .iter()
            .map(|&(_, d)| (-((d - rho).max(0.0)) / sigma).exp())
            .sum();
        if (total - target).abs() < SMOOTH_K_TOLERANCE {
            break;
        }
        if total > target {
            hi = sigma;
            sigma = (lo + hi) / 2.0;
        } else {
            lo = sigma;
            sigma = if hi.is_finite() { (lo + hi) / 2.0 } else { sigma * 2.0 };
        }
    }

    let mean_distance = neighbors.iter().map(|&(_, d)| d).sum::<f64>() / neighbors.len().max(1) as f64;
    sigma.max(1e-3 * mean_distance).max(1e-12)
}

fn edges_from_graph(graph: &Matrix) -> Vec<Edge> {
    let max_weight = graph.iter().copied().fold(0.0_f64, f64::max);
    if max_weight <= 0.0 {
        return Vec::new();
    }

    graph
        .indexed_iter()
        .filter(|&((head, tail), &w)| head != tail && w > 0.0)
        .map(|((head, tail), &w)| Edge {
            head,
            tail,
            epochs_per_sample: max_weight / w,
        })
        .collect()
}

/// Fit `1 / (1 + a·x^(2b))` to the offset-exponential target curve for
/// `min_dist` by coarse-to-fine least-squares grid search.
pub fn fit_ab(min_dist: f64) -> (f64, f64) {
    let xs: Vec<f64> = (1..=300).map(|i| i as f64 * 3.0 * SPREAD / 300.0).collect();
    let target: Vec<f64> = xs
        .iter()
        .map(|&x| if x < min_dist { 1.0 } else { (-(x - min_dist) / SPREAD).exp() })
        .collect();
    let error = |a: f64, b: f64| -> f64 {
        xs.iter()
            .zip(target.iter())
            .map(|(&x, &t)| {
                let fit = 1.0 / (1.0 + a * x.powf(2.0 * b));
                (fit - t) * (fit - t)
            })
            .sum()
    };

    let (mut best_a, mut best_b) = (1.0, 1.0);
    let mut best = error(best_a, best_b);
    let (mut a_step, mut b_step) = (0.5, 0.25);
    let (mut a_lo, mut a_hi, mut b_lo, mut b_hi) = (0.05, 10.0, 0.1, 3.0);

    for _ in 0..6 {
        let mut a = a_lo;
        while a <= a_hi {
            let mut b = b_lo;
            while b <= b_hi {
                let e = error(a, b);
                if e < best {
                    best = e;
                    best_a = a;
                    best_b = b;
                }
                b += b_step;
            }
            a += a_step;
        }
        a_lo = (best_a - a_step).max(1e-3);
        a_hi = best_a + a_step;
        b_lo = (best_b - b_step).max(1e-3);
        b_hi = best_b + b_step;
        a_step /= 5.0;
        b_step /= 5.0;
    }

    (best_a, best_b)
}

/// PCA layout rescaled to `[0, INIT_SCALE]` per axis. Flat axes are filled
/// with uniform noise.
fn initial_layout(data: &Matrix, target_dim: usize, rng: &mut StdRng) -> Result<Matrix> {
    let mut y = pca::project(data, target_dim)?;
    for mut column in y.columns_mut() {
        let (lo, hi) = column
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        let range = hi - lo;
        for v in column.iter_mut() {
            *v = if range > 1e-12 {
                (*v - lo) / range * INIT_SCALE
            } else {
                rng.gen::<f64>() * INIT_SCALE
            };
        }
    }
    Ok(y)
}

fn optimize(y: &mut Matrix, edges: &[Edge], a: f64, b: f64, n_epochs: usize, rng: &mut StdRng) {
    let (n, dims) = y.dim();
    let mut next_sample: Vec<f64> = edges.iter().map(|e| e.epochs_per_sample).collect();
    let mut delta = vec![0.0_f64; dims];

    for epoch in 0..n_epochs {
        let alpha = 1.0 - epoch as f64 / n_epochs as f64;

        for (e, edge) in edges.iter().enumerate() {
            if next_sample[e] > (epoch + 1) as f64 {
                continue;
            }
            let (i, j) = (edge.head, edge.tail);

            let d2 = squared_distance(y.row(i), y.row(j));
            let attract = if d2 > 0.0 {
                -2.0 * a * b * d2.powf(b - 1.0) / (1.0 + a * d2.powf(b))
            } else {
                0.0
            };
            for (d, step) in delta.iter_mut().enumerate() {
                *step = clip(attract * (y[[i, d]] - y[[j, d]])) * alpha;
            }
            for (d, &step) in delta.iter().enumerate() {
                y[[i, d]] += step;
                y[[j, d]] -= step;
            }

            for _ in 0..NEGATIVE_SAMPLES {
                let k = rng.gen_range(0..n);
                if k == i {
                    continue;
                }
                let d2 = squared_distance(y.row(i), y.row(k));
                let repel = if d2 > 0.0 {
                    2.0 * b / ((0.001 + d2) * (1.0 + a * d2.powf(b)))
                } else {
                    0.0
                };
                for d in 0..dims {
                    let g = if repel > 0.0 {
                        clip(repel * (y[[i, d]] - y[[k, d]]))
                    } else {
                        GRADIENT_CLIP
                    };
                    y[[i, d]] += g * alpha;
                }
            }

            next_sample[e] += edge.epochs_per_sample;
        }
    }
}

fn clip(v: f64) -> f64 {
    v.clamp(-GRADIENT_CLIP, GRADIENT_CLIP)
}
