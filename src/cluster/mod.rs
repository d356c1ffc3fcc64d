//! Spectral divide-and-merge clustering.
//!
//! Clustering proceeds in two phases over the rows of a [`DataMatrix`]:
//!
//! 1. **Divide**: recursively cut the data in two along an approximate second
//!    eigenvector of the row-similarity matrix `A = M Mᵀ`, choosing the prefix
//!    of minimum conductance. `A` is never materialized.
//! 2. **Merge**: walk the resulting tree bottom-up and decide at every node
//!    whether its children stay separate clusters.
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`eigenvector`] | power iteration for the second eigenvector ([`Ckvw03`], [`Ckvw06`]) |
//! | [`eigen_cut`] | `rho`/`pSum` statistics, the conductance sweep, closed-form objectives |
//! | [`objective`] | relaxed correlation, k-means cohesion, combinable partial results |
//! | [`spectral`] | the [`SpectralClustering`] controller |
//! | [`assignments`] | hard/soft output and centroids |
//!
//! ## Choosing an eigenvector strategy
//!
//! | Strategy | Operator | Notes |
//! |----------|----------|-------|
//! | [`Ckvw03`] | `R^{-1/2} A R^{-1/2}` | symmetric, the default |
//! | [`Ckvw06`] | `D R^{-1} A D^{-1}`, `D = sqrt(rho / pSum)` | random-walk normalization |
//!
//! ## Choosing an objective
//!
//! Full clustering always uses the relaxed-correlation cost. The budget-bounded
//! search can instead maximize k-means cohesion, which always prefers more
//! clusters and so effectively asks for the best `max_clusters`-way partition.
//!
//! ## Usage
//!
//! ```rust
//! use sunder::cluster::{Ckvw06, Clustering, SpectralClustering};
//!
//! let data = vec![
//!     vec![1.0, 0.1, 0.0, 0.0],
//!     vec![1.0, 0.0, 0.0, 0.0],
//!     vec![0.9, 0.2, 0.0, 0.0],
//!     vec![0.0, 0.0, 0.1, 1.0],
//!     vec![0.0, 0.0, 0.0, 1.0],
//!     vec![0.0, 0.0, 0.2, 0.9],
//! ];
//!
//! let labels = SpectralClustering::new()
//!     .with_strategy(Ckvw06)
//!     .with_seed(7)
//!     .fit_predict(&data)
//!     .unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[3]);
//! ```
//!
//! [`DataMatrix`]: crate::matrix::DataMatrix

pub mod assignments;
pub mod eigen_cut;
pub mod eigenvector;
pub mod objective;
pub mod spectral;
mod traits;

pub use assignments::{Assignment, Assignments};
pub use eigen_cut::{compute_cut, compute_rho_sum, CutResult, RhoSum};
pub use eigenvector::{Ckvw03, Ckvw06, EigenvectorStrategy};
pub use objective::{LimitedResult, Objective, PartialStats, RegionStats};
pub use spectral::SpectralClustering;
pub use traits::Clustering;
