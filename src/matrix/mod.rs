//! Data matrices: dense or sparse row-vectors, and row-masked views over them.
//!
//! The clustering core never mutates its input. It reads rows through
//! [`MatrixView`], a base matrix plus a list of row indices, so every recursive
//! split is a new index list rather than a copy of the data.
//!
//! | Storage | Row access | Non-zero iteration |
//! |---------|------------|--------------------|
//! | Dense (`ndarray::Array2`) | O(1) | every column |
//! | Sparse (`sprs::CsMat`, CSR) | O(1) | stored entries only |

mod ops;
mod row;

pub use ops::{add_row, add_scaled_row, dot, norm_sq, scale, sub_row};
pub(crate) use ops::{matrix_times, transpose_times};
pub use row::{Row, RowIter, RowVector};

use crate::error::{Error, Result};
use ndarray::Array2;
use sprs::{CsMat, TriMat};

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    Dense(Array2<f64>),
    Sparse(CsMat<f64>),
}

/// An immutable collection of data points, one per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMatrix {
    storage: Storage,
}

impl DataMatrix {
    /// Wrap a dense `rows × columns` array.
    pub fn dense(data: Array2<f64>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self {
            storage: Storage::Dense(data),
        }
    }

    /// Build a dense matrix from row vectors of equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        let mut flat = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            if row.len() != columns {
                return Err(Error::DimensionMismatch {
                    expected: columns,
                    found: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), columns), flat).map_err(|e| {
            Error::InvalidParameter {
                name: "rows",
                message: e.to_string(),
            }
        })?;
        Ok(Self::dense(data))
    }

    /// Build a sparse matrix from `(column, value)` pairs per row.
    ///
    /// Pairs may come in any order. Duplicate columns are summed and explicit
    /// zeros are skipped.
    pub fn from_sparse_rows(columns: usize, rows: &[Vec<(usize, f64)>]) -> Result<Self> {
        let mut tri = TriMat::new((rows.len(), columns));
        for (r, row) in rows.iter().enumerate() {
            for &(c, x) in row {
                if c >= columns {
                    return Err(Error::DimensionMismatch {
                        expected: columns,
                        found: c + 1,
                    });
                }
                if x != 0.0 {
                    tri.add_triplet(r, c, x);
                }
            }
        }
        Ok(Self {
            storage: Storage::Sparse(tri.to_csr()),
        })
    }

    /// Wrap a `sprs` matrix. CSC input is converted to row-major storage.
    pub fn sparse(matrix: &CsMat<f64>) -> Self {
        Self {
            storage: Storage::Sparse(matrix.to_csr()),
        }
    }

    /// Number of data points.
    pub fn rows(&self) -> usize {
        match &self.storage {
            Storage::Dense(a) => a.nrows(),
            Storage::Sparse(s) => s.rows(),
        }
    }

    /// Dimensionality of each data point.
    pub fn columns(&self) -> usize {
        match &self.storage {
            Storage::Dense(a) => a.ncols(),
            Storage::Sparse(s) => s.cols(),
        }
    }

    /// Whether rows are stored sparsely.
    pub fn is_sparse(&self) -> bool {
        matches!(self.storage, Storage::Sparse(_))
    }

    /// Borrow row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.rows()`.
    pub fn row(&self, i: usize) -> Row<'_> {
        match &self.storage {
            Storage::Dense(a) => Row::Dense(a.row(i)),
            Storage::Sparse(s) => match s.outer_view(i) {
                Some(v) => Row::Sparse(v),
                None => panic!("row index {i} out of bounds for {} rows", s.rows()),
            },
        }
    }

    /// Iterate all rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows()).map(move |i| self.row(i))
    }

    /// A view over every row, in order.
    pub fn view(&self) -> MatrixView<'_> {
        MatrixView {
            base: self,
            rows: (0..self.rows()).collect(),
        }
    }

    /// A view over the given rows (in the given order, repeats allowed).
    pub fn select_rows(&self, rows: Vec<usize>) -> Result<MatrixView<'_>> {
        if let Some(&index) = rows.iter().find(|&&r| r >= self.rows()) {
            return Err(Error::RowOutOfBounds {
                index,
                rows: self.rows(),
            });
        }
        Ok(MatrixView { base: self, rows })
    }

    /// Copy of this matrix with every row divided by its Euclidean norm.
    ///
    /// All-zero rows are left as zeros.
    pub fn unit_rows(&self) -> DataMatrix {
        match &self.storage {
            Storage::Dense(a) => {
                let mut scaled = a.clone();
                for mut row in scaled.rows_mut() {
                    let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
                    if norm > 0.0 && norm.is_finite() {
                        row.mapv_inplace(|x| x / norm);
                    }
                }
                DataMatrix::dense(scaled)
            }
            Storage::Sparse(s) => {
                let mut scaled = s.clone();
                for mut row in scaled.outer_iterator_mut() {
                    let norm = row.data().iter().map(|x| x * x).sum::<f64>().sqrt();
                    if norm > 0.0 && norm.is_finite() {
                        row.map_inplace(|x| x / norm);
                    }
                }
                DataMatrix {
                    storage: Storage::Sparse(scaled),
                }
            }
        }
    }
}

/// A read-only, row-masked view of a [`DataMatrix`].
///
/// Local row `i` of the view is row `indices()[i]` of the base matrix. Masking
/// a view again composes the index lists, so lookups stay one hop deep no
/// matter how often a region is split.
#[derive(Debug, Clone)]
pub struct MatrixView<'a> {
    base: &'a DataMatrix,
    rows: Vec<usize>,
}

impl<'a> MatrixView<'a> {
    /// Number of rows in the view.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Dimensionality of the base matrix.
    pub fn columns(&self) -> usize {
        self.base.columns()
    }

    /// Whether the base matrix is sparse.
    pub fn is_sparse(&self) -> bool {
        self.base.is_sparse()
    }

    /// Borrow local row `i`.
    pub fn row(&self, i: usize) -> Row<'a> {
        self.base.row(self.rows[i])
    }

    /// Base-matrix indices of the view's rows.
    pub fn indices(&self) -> &[usize] {
        &self.rows
    }

    /// Iterate the view's rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = Row<'a>> + '_ {
        let base = self.base;
        self.rows.iter().map(move |&r| base.row(r))
    }

    /// Sub-view of local rows `local`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if any local index is out of range.
    pub fn select(&self, local: &[usize]) -> MatrixView<'a> {
        MatrixView {
            base: self.base,
            rows: local.iter().map(|&i| self.rows[i]).collect(),
        }
    }

    /// Column-wise sum of all rows.
    pub fn row_sum(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.columns()];
        for row in self.iter_rows() {
            add_row(&mut sums, &row);
        }
        sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_rows_dimension_mismatch() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            DataMatrix::from_rows(&rows),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_sparse_rows_sorted_and_merged() {
        let m = DataMatrix::from_sparse_rows(4, &[vec![(3, 1.0), (0, 2.0), (3, 1.0)], vec![]])
            .unwrap();
        assert!(m.is_sparse());
        assert_eq!(m.rows(), 2);
        assert_eq!(m.row(0).iter().collect::<Vec<_>>(), vec![(0, 2.0), (3, 2.0)]);
        assert_eq!(m.row(1).iter().count(), 0);
        assert_eq!(m.columns(), 4);
    }

    #[test]
    fn test_sparse_rows_skip_zeros_and_keep_empty_tail() {
        let m = DataMatrix::from_sparse_rows(3, &[vec![(1, 0.0), (2, 5.0)], vec![], vec![]])
            .unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.row(0).iter().collect::<Vec<_>>(), vec![(2, 5.0)]);
        assert_eq!(m.row(2).len(), 3);
        assert_eq!(m.row(2).nnz(), 0);
    }

    #[test]
    #[should_panic]
    fn test_sparse_row_out_of_bounds_panics() {
        let m = DataMatrix::from_sparse_rows(2, &[vec![(0, 1.0)]]).unwrap();
        let _ = m.row(1);
    }

    #[test]
    fn test_sparse_rows_column_out_of_range() {
        assert!(DataMatrix::from_sparse_rows(2, &[vec![(2, 1.0)]]).is_err());
    }

    #[test]
    fn test_from_csmat_matches_rows() {
        let mut tri = sprs::TriMat::new((2, 3));
        tri.add_triplet(0, 2, 4.0);
        tri.add_triplet(1, 0, 1.0);
        tri.add_triplet(1, 1, 2.0);
        let csr: CsMat<f64> = tri.to_csr();
        let csc: CsMat<f64> = tri.to_csc();

        let a = DataMatrix::sparse(&csr);
        let b = DataMatrix::sparse(&csc);
        assert_eq!(a, b);
        assert!(a.is_sparse());
        assert_eq!(a.row(0).get(2), 4.0);
        assert_eq!(a.row(1).get(1), 2.0);
        assert_eq!(a.row(1).iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 2.0)]);
    }

    #[test]
    fn test_unit_rows_keeps_zero_rows() {
        let m = DataMatrix::dense(array![[3.0, 4.0], [0.0, 0.0]]);
        let u = m.unit_rows();
        assert!((u.row(0).norm_sq() - 1.0).abs() < 1e-12);
        assert_eq!(u.row(1).norm_sq(), 0.0);

        let s = DataMatrix::from_sparse_rows(3, &[vec![(0, 2.0), (2, 2.0)], vec![]]).unwrap();
        let su = s.unit_rows();
        assert!((su.row(0).norm_sq() - 1.0).abs() < 1e-12);
        assert_eq!(su.row(1).nnz(), 0);
    }

    #[test]
    fn test_view_composition_is_flat() {
        let m = DataMatrix::dense(array![[0.0], [1.0], [2.0], [3.0], [4.0]]);
        let v = m.select_rows(vec![4, 2, 0, 1]).unwrap();
        let sub = v.select(&[1, 3]);
        assert_eq!(sub.indices(), &[2, 1]);
        assert_eq!(sub.row(0).get(0), 2.0);
        assert_eq!(sub.row_sum(), vec![3.0]);
    }

    #[test]
    fn test_select_rows_out_of_bounds() {
        let m = DataMatrix::dense(array![[0.0], [1.0]]);
        assert_eq!(
            m.select_rows(vec![0, 2]).unwrap_err(),
            Error::RowOutOfBounds { index: 2, rows: 2 }
        );
    }

    #[test]
    fn test_fortran_layout_is_normalized() {
        let a = array![[1.0, 2.0], [3.0, 4.0]].reversed_axes();
        let m = DataMatrix::dense(a);
        assert_eq!(m.row(0).iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 3.0)]);
    }
}
