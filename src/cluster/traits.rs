//! Clustering traits.

use super::assignments::Assignments;
use crate::error::Result;
use crate::matrix::DataMatrix;

/// Trait for clustering algorithms over a [`DataMatrix`].
pub trait Clustering {
    /// Cluster the rows of `matrix`, choosing the number of clusters.
    fn cluster(&self, matrix: &DataMatrix) -> Result<Assignments>;

    /// Cluster the rows of `matrix` into at most `k` clusters.
    fn cluster_k(&self, matrix: &DataMatrix, k: usize) -> Result<Assignments>;

    /// Cluster dense row vectors and return one label per row.
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        let matrix = DataMatrix::from_rows(data)?;
        self.cluster(&matrix)?.hard_labels()
    }
}
