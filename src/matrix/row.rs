//! Borrowed and owned row vectors.

use ndarray::{Array1, ArrayView1};
use sprs::vec::{IntoSparseVecIter, VectorIterator};
use sprs::{CsVec, CsVecView};

/// A borrowed row of a [`DataMatrix`](super::DataMatrix).
///
/// Both storages expose the same non-zero iteration, so the clustering code is
/// written once. Sparse rows only ever touch their stored entries.
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    /// Contiguous dense row.
    Dense(ArrayView1<'a, f64>),
    /// One outer slice of a CSR matrix, indices strictly increasing.
    Sparse(CsVecView<'a, f64>),
}

impl<'a> Row<'a> {
    /// Logical length.
    pub fn len(&self) -> usize {
        match self {
            Row::Dense(v) => v.len(),
            Row::Sparse(v) => v.dim(),
        }
    }

    /// True for a zero-length row.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the row is backed by sparse storage.
    pub fn is_sparse(&self) -> bool {
        matches!(self, Row::Sparse(_))
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        match self {
            Row::Dense(v) => v.iter().filter(|x| **x != 0.0).count(),
            Row::Sparse(v) => v.data().iter().filter(|x| **x != 0.0).count(),
        }
    }

    /// Value at column `i` (zero if not stored).
    pub fn get(&self, i: usize) -> f64 {
        match self {
            Row::Dense(v) => v.get(i).copied().unwrap_or(0.0),
            Row::Sparse(v) => v.get(i).copied().unwrap_or(0.0),
        }
    }

    /// Iterate `(column, value)` pairs. Dense rows yield every column.
    pub fn iter(&self) -> RowIter<'a> {
        match *self {
            Row::Dense(v) => RowIter::Dense(v.into_iter().enumerate()),
            Row::Sparse(v) => RowIter::Sparse(v.into_sparse_vec_iter()),
        }
    }

    /// Dot product with a dense accumulator of the same length.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        match self {
            Row::Dense(v) => v.iter().zip(dense).map(|(a, b)| a * b).sum(),
            Row::Sparse(v) => v.dot(dense),
        }
    }

    /// Dot product with another row.
    pub fn dot_row(&self, other: &Row<'_>) -> f64 {
        match (self, other) {
            (Row::Dense(a), Row::Dense(b)) => a.dot(b),
            (Row::Dense(d), Row::Sparse(s)) => sparse_dot_dense(s, d),
            (Row::Sparse(s), Row::Dense(d)) => sparse_dot_dense(s, d),
            (Row::Sparse(a), Row::Sparse(b)) => a.dot(b),
        }
    }

    /// Squared Euclidean norm.
    pub fn norm_sq(&self) -> f64 {
        match self {
            Row::Dense(v) => v.iter().map(|x| x * x).sum(),
            Row::Sparse(v) => v.data().iter().map(|x| x * x).sum(),
        }
    }

    /// Copy into an owned vector with the same storage kind.
    pub fn to_vector(&self) -> RowVector {
        match self {
            Row::Dense(v) => RowVector::Dense(v.to_owned()),
            Row::Sparse(v) => RowVector::Sparse(v.to_owned()),
        }
    }
}

fn sparse_dot_dense(sparse: &CsVecView<'_, f64>, dense: &ArrayView1<'_, f64>) -> f64 {
    sparse.iter().map(|(c, &x)| x * dense[c]).sum()
}

/// Iterator over the `(column, value)` pairs of a [`Row`].
#[derive(Clone)]
pub enum RowIter<'a> {
    #[doc(hidden)]
    Dense(std::iter::Enumerate<ndarray::iter::Iter<'a, f64, ndarray::Ix1>>),
    #[doc(hidden)]
    Sparse(VectorIterator<'a, f64, usize>),
}

impl Iterator for RowIter<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowIter::Dense(it) => it.next().map(|(c, &x)| (c, x)),
            RowIter::Sparse(it) => it.next().map(|(c, &x)| (c, x)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            RowIter::Dense(it) => it.size_hint(),
            RowIter::Sparse(it) => it.size_hint(),
        }
    }
}

/// An owned dense or sparse vector, e.g. a cluster centroid.
#[derive(Debug, Clone, PartialEq)]
pub enum RowVector {
    /// Dense storage.
    Dense(Array1<f64>),
    /// Sparse storage with sorted indices.
    Sparse(CsVec<f64>),
}

impl RowVector {
    /// Logical length.
    pub fn len(&self) -> usize {
        match self {
            RowVector::Dense(v) => v.len(),
            RowVector::Sparse(v) => v.dim(),
        }
    }

    /// True for a zero-length vector.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at index `i` (zero if not stored).
    pub fn get(&self, i: usize) -> f64 {
        self.as_row().get(i)
    }

    /// Borrow as a [`Row`] to reuse the row arithmetic.
    pub fn as_row(&self) -> Row<'_> {
        match self {
            RowVector::Dense(v) => Row::Dense(v.view()),
            RowVector::Sparse(v) => Row::Sparse(v.view()),
        }
    }

    /// Densify.
    pub fn to_dense(&self) -> Array1<f64> {
        match self {
            RowVector::Dense(v) => v.clone(),
            RowVector::Sparse(v) => v.to_dense(),
        }
    }
}
