//! Second-eigenvector approximation by implicit power iteration.
//!
//! Both strategies power-iterate a normalized affinity operator built from the
//! data matrix `M` (rows are data points, affinity `A = M Mᵀ`) and the `rho`
//! vector (`rho = A·1`). `A` itself is never formed: each pass is one `Mᵀ v`
//! followed by one `M w`, so a pass costs O(nnz) on sparse data.
//!
//! ```text
//! Ckvw03:  v ← R^{-1/2} M Mᵀ R^{-1/2} v      dominant direction: sqrt(rho)
//! Ckvw06:  v ← D R^{-1} M Mᵀ D^{-1} v        dominant direction: D = sqrt(rho / pSum)
//! ```
//!
//! Before every pass the vector is orthonormalized against the known dominant
//! direction, so the iteration converges toward the second eigenvector.
//! `floor(log2(n))` passes are made, following Cheng, Kannan, Vempala & Wang.
//!
//! # References
//!
//! - Cheng, Kannan, Vempala, Wang (2006). "A divide-and-merge methodology for clustering"
//! - Kannan, Vempala, Vetta (2004). "On clusterings: Good, bad and spectral"

use crate::matrix::{dot, matrix_times, scale, transpose_times, MatrixView};
use rand::{Rng, RngCore};

/// Approximates the second eigenvector of a region's implicit affinity operator.
///
/// Implementations receive the region's `rho` vector and its sum `p_sum`
/// (already computed by the cut) and must return one value per row.
pub trait EigenvectorStrategy: Send + Sync {
    /// Return an approximate second eigenvector, one entry per row of `matrix`.
    fn second_eigenvector(
        &self,
        matrix: &MatrixView<'_>,
        rho: &[f64],
        p_sum: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<f64>;
}

/// Power iteration on `R^{-1/2} M Mᵀ R^{-1/2}` (the 2003 formulation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ckvw03;

/// Power iteration on `D R^{-1} M Mᵀ D^{-1}` with `D = sqrt(rho / pSum)`
/// (the 2006 formulation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ckvw06;

impl EigenvectorStrategy for Ckvw03 {
    fn second_eigenvector(
        &self,
        matrix: &MatrixView<'_>,
        rho: &[f64],
        _p_sum: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let n = rho.len();
        let r_inv: Vec<f64> = rho.iter().map(|&r| inverse_sqrt(r)).collect();
        let base: Vec<f64> = rho.iter().zip(&r_inv).map(|(r, ri)| r * ri).collect();

        let mut v = random_start(n, rng);
        for _ in 0..power_iterations(n) {
            orthonormalize(&mut v, &base);
            // (R^{-1/2} M)ᵀ v = Mᵀ (R^{-1/2} v)
            let scaled: Vec<f64> = v.iter().zip(&r_inv).map(|(x, ri)| x * ri).collect();
            let w = transpose_times(matrix, &scaled);
            v = matrix_times(matrix, &w);
            v.iter_mut().zip(&r_inv).for_each(|(x, ri)| *x *= ri);
        }
        v
    }
}

impl EigenvectorStrategy for Ckvw06 {
    fn second_eigenvector(
        &self,
        matrix: &MatrixView<'_>,
        rho: &[f64],
        p_sum: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        let n = rho.len();
        // pi = rho / pSum, D = sqrt(pi), pi D^{-1} = D
        let d: Vec<f64> = rho
            .iter()
            .map(|&r| {
                let pi = if p_sum != 0.0 { r / p_sum } else { 0.0 };
                if pi > 0.0 {
                    pi.sqrt()
                } else {
                    0.0
                }
            })
            .collect();

        let mut v = random_start(n, rng);
        for _ in 0..power_iterations(n) {
            orthonormalize(&mut v, &d);

            for (x, &di) in v.iter_mut().zip(&d) {
                if di != 0.0 {
                    *x /= di;
                }
            }
            let w = transpose_times(matrix, &v);
            v = matrix_times(matrix, &w);
            for ((x, &di), &ri) in v.iter_mut().zip(&d).zip(rho) {
                if ri != 0.0 {
                    *x *= di / ri;
                }
            }
        }
        v
    }
}

/// Number of power-iteration passes for `n` rows: `floor(log2(n))`.
pub fn power_iterations(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n.ilog2() as usize
    }
}

/// Remove the component of `v` along `other` by adjusting `v[0]`, then rescale
/// `v` by `1 / (v·v)`.
///
/// After the adjustment `v·other == 0`. When `other[0]` is zero the first
/// coordinate cannot absorb the projection and is left alone. When `v·v` is
/// zero, or its reciprocal is not finite, `v` is left unscaled.
pub fn orthonormalize(v: &mut [f64], other: &[f64]) {
    if v.is_empty() || other.is_empty() {
        return;
    }
    let rest = dot(&v[1..], &other[1..]);
    if other[0] != 0.0 {
        v[0] = -rest / other[0];
    }

    let self_dot = dot(v, v);
    let factor = 1.0 / self_dot;
    if self_dot == 0.0 || !factor.is_finite() {
        return;
    }
    scale(v, factor);
}

fn random_start(n: usize, rng: &mut dyn RngCore) -> Vec<f64> {
    (0..n).map(|_| rng.random::<f64>()).collect()
}

fn inverse_sqrt(x: f64) -> f64 {
    if x > 0.0 {
        1.0 / x.sqrt()
    } else {
        0.0
    }
}
