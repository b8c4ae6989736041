//! Ordinary least squares with an intercept, via the normal equations.

use crate::error::MlError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Relative pivot below which a feature is treated as linearly dependent.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Fitted OLS parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsSolution {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    /// Columns whose coefficient was pinned to zero (constant or collinear).
    pub dropped: Vec<usize>,
}

/// Minimize `||y - X b - c||²` over `b` and `c`.
///
/// Columns are centered and scaled to unit norm before solving so the pivot
/// tolerance is independent of feature units. Rank-deficient inputs still
/// produce a least-squares solution: dependent columns get a zero coefficient.
pub fn fit(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<OlsSolution, MlError> {
    let (n, p) = x.dim();
    if y.len() != n {
        return Err(MlError::shape_mismatch(n, y.len()));
    }
    if n == 0 {
        return Err(MlError::training("cannot fit on zero samples"));
    }
    if p == 0 {
        return Err(MlError::training("cannot fit without feature columns"));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(MlError::training("input contains NaN or infinity"));
    }

    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| MlError::training("cannot average zero samples"))?;
    let y_mean = y.sum() / n as f64;

    let xc = &x - &x_mean;
    let yc = y.mapv(|v| v - y_mean);

    let norms: Array1<f64> = xc
        .axis_iter(Axis(1))
        .map(|col| col.dot(&col).sqrt())
        .collect();
    let mut xs = xc;
    for (mut col, &norm) in xs.axis_iter_mut(Axis(1)).zip(norms.iter()) {
        if norm > 0.0 {
            col.mapv_inplace(|v| v / norm);
        }
    }

    let gram = xs.t().dot(&xs);
    let rhs = xs.t().dot(&yc);
    let (scaled, dropped) = solve_symmetric(gram, rhs);

    let coefficients: Array1<f64> = scaled
        .iter()
        .zip(norms.iter())
        .map(|(&b, &norm)| if norm > 0.0 { b / norm } else { 0.0 })
        .collect();
    let intercept = y_mean - x_mean.dot(&coefficients);

    Ok(OlsSolution {
        coefficients,
        intercept,
        dropped,
    })
}

/// Solve `A b = r` for symmetric positive semi-definite `A` by Gaussian
/// elimination along the diagonal. A pivot at or below the tolerance marks a
/// dependent column; its unknown is fixed at zero.
fn solve_symmetric(mut a: Array2<f64>, mut r: Array1<f64>) -> (Array1<f64>, Vec<usize>) {
    let p = r.len();
    let mut dropped = Vec::new();

    for k in 0..p {
        let pivot = a[[k, k]];
        if pivot <= PIVOT_TOLERANCE {
            dropped.push(k);
            continue;
        }
        for i in (k + 1)..p {
            let factor = a[[i, k]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..p {
                a[[i, j]] -= factor * a[[k, j]];
            }
            r[i] -= factor * r[k];
        }
    }

    let mut b = Array1::<f64>::zeros(p);
    for k in (0..p).rev() {
        if dropped.contains(&k) {
            continue;
        }
        let tail: f64 = ((k + 1)..p).map(|j| a[[k, j]] * b[j]).sum();
        b[k] = (r[k] - tail) / a[[k, k]];
    }
    (b, dropped)
}
