//! # sunder
//!
//! Spectral divide-and-merge clustering over dense or sparse row vectors.
//!
//! Rows are split top-down by minimum-conductance spectral cuts, computed with
//! power iteration against the implicit similarity matrix `M Mᵀ` (never formed),
//! then merged bottom-up under a relaxed-correlation or k-means objective
//! evaluated from running sums.
//!
//! ```rust
//! use sunder::{DataMatrix, SpectralClustering};
//!
//! let matrix = DataMatrix::from_sparse_rows(
//!     4,
//!     &[
//!         vec![(0, 1.0), (1, 0.2)],
//!         vec![(0, 0.9)],
//!         vec![(2, 1.0), (3, 0.1)],
//!         vec![(3, 1.0), (2, 0.3)],
//!     ],
//! )
//! .unwrap();
//!
//! let assignments = SpectralClustering::new().with_seed(1).cluster(&matrix).unwrap();
//! assert_eq!(assignments.len(), 4);
//! let centroids = assignments.centroids(&matrix).unwrap();
//! assert_eq!(centroids.len(), assignments.num_clusters());
//! ```
//!
//! The `parallel` feature runs the two halves of every cut on the rayon pool.

pub mod cluster;
/// Error types used across `sunder`.
pub mod error;
pub mod matrix;
pub mod metrics;


pub use cluster::{
    Assignment, Assignments, Ckvw03, Ckvw06, Clustering, EigenvectorStrategy, Objective,
    SpectralClustering,
};
pub use error::{Error, Result};
pub use matrix::{DataMatrix, MatrixView, Row, RowVector};
pub use metrics::{ari, nmi, purity};
