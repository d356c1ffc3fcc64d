//! Vector arithmetic over dense accumulators and borrowed rows.
//!
//! Accumulators (centroid sums, the `x`/`y` cut sums, power-iteration vectors)
//! are always dense `f64` slices; the operand row may be dense or sparse, and a
//! sparse operand only costs its number of non-zeros.

use super::{MatrixView, Row};

/// Dense dot product.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Squared Euclidean norm of a dense vector.
pub fn norm_sq(v: &[f64]) -> f64 {
    dot(v, v)
}

/// `acc += row`
pub fn add_row(acc: &mut [f64], row: &Row<'_>) {
    add_scaled_row(acc, row, 1.0);
}

/// `acc -= row`
pub fn sub_row(acc: &mut [f64], row: &Row<'_>) {
    add_scaled_row(acc, row, -1.0);
}

/// `acc += factor * row`
pub fn add_scaled_row(acc: &mut [f64], row: &Row<'_>, factor: f64) {
    for (c, x) in row.iter() {
        acc[c] += factor * x;
    }
}

/// `v *= factor`
pub fn scale(v: &mut [f64], factor: f64) {
    v.iter_mut().for_each(|x| *x *= factor);
}

/// `Mᵀ v`, a vector of length `columns`, without forming `Mᵀ`.
pub(crate) fn transpose_times(matrix: &MatrixView<'_>, v: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; matrix.columns()];
    for (row, &weight) in matrix.iter_rows().zip(v) {
        if weight != 0.0 {
            add_scaled_row(&mut out, &row, weight);
        }
    }
    out
}

/// `M w`, a vector of length `rows`.
pub(crate) fn matrix_times(matrix: &MatrixView<'_>, w: &[f64]) -> Vec<f64> {
    matrix.iter_rows().map(|row| row.dot(w)).collect()
}
