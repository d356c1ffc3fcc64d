//! Clustering output: which cluster(s) each data point belongs to.

use crate::error::{Error, Result};
use crate::matrix::{add_row, DataMatrix, RowVector};
use ndarray::Array1;
use sprs::{CsMat, TriMat};

/// Cluster membership of one data point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// Exactly one cluster.
    Hard(usize),
    /// Any number of clusters (possibly none).
    Soft(Vec<usize>),
}

impl Assignment {
    /// Cluster ids this point belongs to.
    pub fn clusters(&self) -> &[usize] {
        match self {
            Assignment::Hard(c) => std::slice::from_ref(c),
            Assignment::Soft(cs) => cs,
        }
    }
}

/// Per-row cluster assignments plus the number of clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignments {
    assignments: Vec<Assignment>,
    num_clusters: usize,
}

impl Assignments {
    /// Validate and wrap arbitrary assignments.
    pub fn new(assignments: Vec<Assignment>, num_clusters: usize) -> Result<Self> {
        for a in &assignments {
            if let Some(&c) = a.clusters().iter().find(|&&c| c >= num_clusters) {
                return Err(Error::InvalidClusterCount {
                    requested: c + 1,
                    n_items: num_clusters,
                });
            }
        }
        Ok(Self {
            assignments,
            num_clusters,
        })
    }

    /// Hard assignments from contiguous labels `0..num_clusters`.
    pub(crate) fn from_labels(labels: Vec<usize>, num_clusters: usize) -> Self {
        Self {
            assignments: labels.into_iter().map(Assignment::Hard).collect(),
            num_clusters,
        }
    }

    /// Number of assigned data points.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True if no data points are assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of clusters.
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Assignment of data point `i`.
    pub fn get(&self, i: usize) -> Option<&Assignment> {
        self.assignments.get(i)
    }

    /// Iterate assignments in row order.
    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.assignments.iter()
    }

    /// One label per row.
    ///
    /// Fails with [`Error::Unsupported`] if any row has a soft assignment that
    /// is not exactly one cluster.
    pub fn hard_labels(&self) -> Result<Vec<usize>> {
        self.assignments
            .iter()
            .enumerate()
            .map(|(i, a)| match a.clusters() {
                [c] => Ok(*c),
                cs => Err(Error::Unsupported(format!(
                    "row {i} belongs to {} clusters; hard labels need exactly one",
                    cs.len()
                ))),
            })
            .collect()
    }

    /// Member rows of each cluster, in row order.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.num_clusters];
        for (i, a) in self.assignments.iter().enumerate() {
            for &c in a.clusters() {
                members[c].push(i);
            }
        }
        members
    }

    /// Number of rows in each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_clusters];
        for &c in self.assignments.iter().flat_map(Assignment::clusters) {
            sizes[c] += 1;
        }
        sizes
    }

    /// Mean of the rows of `matrix` in each cluster.
    ///
    /// Sparse matrices give sparse centroids. A cluster with no members gets a
    /// zero vector.
    pub fn centroids(&self, matrix: &DataMatrix) -> Result<Vec<RowVector>> {
        if matrix.rows() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                found: matrix.rows(),
            });
        }
        let sizes = self.cluster_sizes();

        if matrix.is_sparse() {
            let mut tri = TriMat::new((self.num_clusters, matrix.columns()));
            for (i, a) in self.assignments.iter().enumerate() {
                for &c in a.clusters() {
                    let inv = 1.0 / sizes[c] as f64;
                    for (col, x) in matrix.row(i).iter() {
                        tri.add_triplet(c, col, x * inv);
                    }
                }
            }
            let means: CsMat<f64> = tri.to_csr();
            Ok(means
                .outer_iterator()
                .map(|centroid| RowVector::Sparse(centroid.to_owned()))
                .collect())
        } else {
            let mut sums = vec![vec![0.0; matrix.columns()]; self.num_clusters];
            for (i, a) in self.assignments.iter().enumerate() {
                for &c in a.clusters() {
                    add_row(&mut sums[c], &matrix.row(i));
                }
            }
            Ok(sums
                .into_iter()
                .zip(sizes)
                .map(|(sum, size)| {
                    let mut centroid = Array1::from(sum);
                    if size > 0 {
                        centroid /= size as f64;
                    }
                    RowVector::Dense(centroid)
                })
                .collect())
        }
    }
}

impl<'a> IntoIterator for &'a Assignments {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_rejects_out_of_range_cluster() {
        let bad = Assignments::new(vec![Assignment::Hard(0), Assignment::Hard(2)], 2);
        assert!(bad.is_err());
    }

    #[test]
    fn test_hard_labels_rejects_soft() {
        let a = Assignments::new(
            vec![Assignment::Hard(0), Assignment::Soft(vec![0, 1])],
            2,
        )
        .unwrap();
        assert!(matches!(a.hard_labels(), Err(Error::Unsupported(_))));
        assert_eq!(a.cluster_sizes(), vec![2, 1]);
        assert_eq!(a.clusters(), vec![vec![0, 1], vec![1]]);

        let single = Assignments::new(vec![Assignment::Soft(vec![1])], 2).unwrap();
        assert_eq!(single.hard_labels().unwrap(), vec![1]);
    }

    #[test]
    fn test_dense_centroids() {
        let m = DataMatrix::dense(array![[1.0, 2.0], [3.0, 4.0], [10.0, 0.0]]);
        let a = Assignments::from_labels(vec![0, 0, 1], 3);
        let c = a.centroids(&m).unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c[0].to_dense(), array![2.0, 3.0]);
        assert_eq!(c[1].to_dense(), array![10.0, 0.0]);
        assert_eq!(c[2].to_dense(), array![0.0, 0.0]);
    }

    #[test]
    fn test_sparse_centroids_stay_sparse() {
        let m = DataMatrix::from_sparse_rows(4, &[vec![(0, 2.0)], vec![(3, 4.0)], vec![(1, 1.0)]])
            .unwrap();
        let a = Assignments::from_labels(vec![0, 0, 1], 2);
        let c = a.centroids(&m).unwrap();
        match &c[0] {
            RowVector::Sparse(v) => {
                assert_eq!(v.indices(), &[0, 3]);
                assert_eq!(v.data(), &[1.0, 2.0]);
            }
            other => panic!("expected sparse centroid, got {other:?}"),
        }
        assert_eq!(c[1].get(1), 1.0);
    }

    #[test]
    fn test_sparse_centroids_merge_shared_columns() {
        let m = DataMatrix::from_sparse_rows(
            3,
            &[vec![(0, 1.0), (2, 3.0)], vec![(0, 3.0)], vec![(1, 5.0)]],
        )
        .unwrap();
        let a = Assignments::from_labels(vec![0, 0, 0], 2);
        let c = a.centroids(&m).unwrap();
        match &c[0] {
            RowVector::Sparse(v) => {
                assert_eq!(v.indices(), &[0, 1, 2]);
                assert!((v.data()[0] - 4.0 / 3.0).abs() < 1e-12);
                assert!((v.data()[2] - 1.0).abs() < 1e-12);
            }
            other => panic!("expected sparse centroid, got {other:?}"),
        }
        assert_eq!(c[1].len(), 3);
        assert_eq!(c[1].as_row().nnz(), 0);
    }

    #[test]
    fn test_centroids_row_mismatch() {
        let m = DataMatrix::dense(array![[1.0], [2.0]]);
        let a = Assignments::from_labels(vec![0], 1);
        assert!(matches!(
            a.centroids(&m),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
