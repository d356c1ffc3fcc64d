//! Divide-and-merge spectral clustering.
//!
//! The data is first split top-down into a binary tree of regions by repeated
//! minimum-conductance cuts ([`compute_cut`]), then merged bottom-up: at every
//! internal node the algorithm decides how many of its children's clusters to
//! keep.
//!
//! # Modes
//!
//! | Mode | Entry point | Decision at each node |
//! |------|-------------|-----------------------|
//! | Full | [`SpectralClustering::cluster`] | split iff the children's relaxed-correlation cost is strictly below the merged cost |
//! | Budget-bounded | [`SpectralClustering::cluster_limited`] | best result for every cluster count `1..=max_clusters` |
//!
//! In budget-bounded mode every node keeps, for each cluster count `k`, the
//! best-scoring combination of a left result with `i` clusters and a right
//! result with `k - i` clusters. Candidates are scored from their
//! [`PartialStats`](super::objective::PartialStats) alone; the assignment array
//! is only built for the winner of each `k`.
//!
//! ```text
//! node(region, budget):
//!     cut = compute_cut(region)
//!     if degenerate(cut): return [single]
//!     L = node(cut.left,  budget - 1)
//!     R = node(cut.right, budget - 1)
//!     results[1] = single
//!     results[k] = best { L[i] ⊕ R[j] : i + j = k ≤ budget }
//! ```
//!
//! With the k-means objective the best score is non-decreasing in `k`
//! (splitting a cluster never lowers cohesion), so the largest admissible
//! count tends to win; the relaxed-correlation cost has a genuine optimum.
//!
//! # Pre-scaling
//!
//! Rows are scaled to unit length before the first cut so that `row_i·row_j`
//! is the cosine similarity and every region's diagonal is its row count.
//!
//! # Determinism
//!
//! Each node seeds its own RNG from its parent's seed and its branch, so a
//! fixed seed gives the same clustering with or without the `parallel` feature.
//!
//! # Example
//!
//! ```rust
//! use sunder::{DataMatrix, SpectralClustering};
//!
//! let mut rows = Vec::new();
//! for i in 0..6 {
//!     rows.push(vec![1.0, 0.1 * i as f64, 0.0, 0.0]);
//! }
//! for i in 0..6 {
//!     rows.push(vec![0.0, 0.0, 0.1 * i as f64, 1.0]);
//! }
//! let matrix = DataMatrix::from_rows(&rows).unwrap();
//!
//! let assignments = SpectralClustering::new()
//!     .with_seed(42)
//!     .cluster_limited(&matrix, 2, false)
//!     .unwrap();
//! assert_eq!(assignments.num_clusters(), 2);
//! ```
//!
//! # References
//!
//! - Cheng, Kannan, Vempala, Wang (2006). "A divide-and-merge methodology for clustering"
//! - Kannan, Vempala, Vetta (2004). "On clusterings: Good, bad and spectral"

use super::assignments::Assignments;
use super::eigen_cut::{compute_cut, compute_rho_sum};
use super::eigenvector::{Ckvw03, EigenvectorStrategy};
use super::objective::{interleave, LimitedResult, Objective, PartialStats, RegionStats};
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::matrix::{DataMatrix, MatrixView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Default weight of the intra-cluster term of the relaxed-correlation cost.
pub const DEFAULT_ALPHA: f64 = 0.2;

/// Divide-and-merge spectral clustering.
///
/// `S` picks how the second eigenvector of each region is approximated.
#[derive(Debug, Clone)]
pub struct SpectralClustering<S = Ckvw03> {
    /// Weight of dissimilarity inside clusters.
    alpha: f64,
    /// Weight of similarity across clusters.
    beta: f64,
    /// Seed for the power-iteration start vectors.
    seed: Option<u64>,
    strategy: S,
}

impl Default for SpectralClustering<Ckvw03> {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralClustering<Ckvw03> {
    /// Relaxed-correlation weights `alpha = 0.2`, `beta = 0.8`, the 2003
    /// eigenvector strategy, and a fresh random seed per call.
    pub fn new() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: 1.0 - DEFAULT_ALPHA,
            seed: None,
            strategy: Ckvw03,
        }
    }
}

/// Hard assignments of one region, local row order, with the partial sums
/// the parent needs to score it.
struct Node {
    assignments: Vec<usize>,
    num_clusters: usize,
    stats: PartialStats,
}

impl Node {
    fn single(region: &RegionStats) -> Self {
        Self {
            assignments: vec![0; region.rows],
            num_clusters: 1,
            stats: region.single_cluster(),
        }
    }
}

/// Region summary without a column-sum pass. Only valid for at most one row.
fn leaf_region(region: &MatrixView<'_>) -> RegionStats {
    let self_similarity = region.iter_rows().map(|r| r.norm_sq()).sum();
    RegionStats {
        rows: region.rows(),
        p_sum: self_similarity,
        self_similarity,
    }
}

impl<S: EigenvectorStrategy> SpectralClustering<S> {
    /// Set the intra-cluster weight; `beta` becomes `1 - alpha`.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self.beta = 1.0 - alpha;
        self
    }

    /// Override the inter-cluster weight independently of `alpha`.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Swap the eigenvector strategy, keeping every other setting.
    pub fn with_strategy<T: EigenvectorStrategy>(self, strategy: T) -> SpectralClustering<T> {
        SpectralClustering {
            alpha: self.alpha,
            beta: self.beta,
            seed: self.seed,
            strategy,
        }
    }

    /// Intra-cluster weight.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Inter-cluster weight.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// The configured seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The objective the budget search scores with.
    pub fn objective(&self, use_kmeans: bool) -> Objective {
        if use_kmeans {
            Objective::KMeans
        } else {
            Objective::RelaxedCorrelation {
                alpha: self.alpha,
                beta: self.beta,
            }
        }
    }

    /// Cluster with an automatically chosen number of clusters.
    ///
    /// Every internal node of the cut tree keeps its children's clusters only
    /// when that lowers the relaxed-correlation cost of the node's region.
    pub fn cluster(&self, matrix: &DataMatrix) -> Result<Assignments> {
        self.validate(matrix)?;
        let scaled = matrix.unit_rows();
        let seed = self.root_seed();

        let node = self.full_cluster(&scaled.view(), seed);
        info!(
            rows = matrix.rows(),
            clusters = node.num_clusters,
            "divide-and-merge clustering finished"
        );
        Ok(Assignments::from_labels(node.assignments, node.num_clusters))
    }

    /// Cluster into at most `max_clusters` clusters, returning the best
    /// solution under the relaxed-correlation cost (or the k-means cohesion
    /// when `use_kmeans` is set).
    ///
    /// Ties between cluster counts go to the smaller count.
    pub fn cluster_limited(
        &self,
        matrix: &DataMatrix,
        max_clusters: usize,
        use_kmeans: bool,
    ) -> Result<Assignments> {
        let objective = self.objective(use_kmeans);
        let results = self.limited_results(matrix, max_clusters, use_kmeans)?;

        let mut best: Option<LimitedResult> = None;
        for candidate in results.into_iter().flatten() {
            let replace = best
                .as_ref()
                .map_or(true, |b| objective.prefers(candidate.score(), b.score()));
            if replace {
                best = Some(candidate);
            }
        }
        let best = best.ok_or(Error::EmptyInput)?;

        info!(
            rows = matrix.rows(),
            max_clusters,
            clusters = best.num_clusters(),
            score = best.score(),
            "budget-bounded clustering finished"
        );
        let num_clusters = best.num_clusters();
        Ok(Assignments::from_labels(best.into_assignments(), num_clusters))
    }

    /// The best clustering for every cluster count `k ≤ max_clusters`.
    ///
    /// Index `k` of the returned vector holds the best result with exactly `k`
    /// clusters, or `None` when the cut tree cannot produce `k` clusters.
    /// Index 0 is always `None`; index 1 is always present.
    pub fn limited_results(
        &self,
        matrix: &DataMatrix,
        max_clusters: usize,
        use_kmeans: bool,
    ) -> Result<Vec<Option<LimitedResult>>> {
        self.validate(matrix)?;
        if max_clusters == 0 {
            return Err(Error::InvalidParameter {
                name: "max_clusters",
                message: "must be at least 1".to_string(),
            });
        }
        if max_clusters > matrix.rows() {
            return Err(Error::InvalidClusterCount {
                requested: max_clusters,
                n_items: matrix.rows(),
            });
        }

        let objective = self.objective(use_kmeans);
        let scaled = matrix.unit_rows();
        let seed = self.root_seed();
        let mut results = self.limited_cluster(&scaled.view(), max_clusters, &objective, seed);
        results.resize(max_clusters + 1, None);
        Ok(results)
    }

    fn validate(&self, matrix: &DataMatrix) -> Result<()> {
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::InvalidParameter {
                name: "alpha",
                message: format!("must be in [0, 1], got {}", self.alpha),
            });
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(Error::InvalidParameter {
                name: "beta",
                message: format!("must be finite and non-negative, got {}", self.beta),
            });
        }
        if matrix.rows() == 0 {
            return Err(Error::EmptyInput);
        }
        Ok(())
    }

    fn root_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }

    fn full_cluster(&self, region: &MatrixView<'_>, seed: u64) -> Node {
        let rows = region.rows();
        if rows <= 1 {
            return Node::single(&leaf_region(region));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let cut = compute_cut(region, &self.strategy, &mut rng);
        let stats = cut.rho_sum().region();
        if cut.is_degenerate() {
            debug!(rows, "no valid cut, region is one cluster");
            return Node::single(&stats);
        }

        let (left, right) = join(
            || self.full_cluster(cut.left(), child_seed(seed, 0)),
            || self.full_cluster(cut.right(), child_seed(seed, 1)),
        );

        let cost = self.objective(false);
        let split_stats = left.stats.combine(right.stats);
        let merged = cost.score(&stats.single_cluster(), &stats);
        let split = cost.score(&split_stats, &stats);
        debug!(
            rows,
            left = cut.left().rows(),
            right = cut.right().rows(),
            merged,
            split,
            "merge decision"
        );

        if cost.prefers(split, merged) {
            Node {
                assignments: interleave(
                    &left.assignments,
                    left.num_clusters,
                    &right.assignments,
                    cut.left_reordering(),
                    cut.right_reordering(),
                ),
                num_clusters: left.num_clusters + right.num_clusters,
                stats: split_stats,
            }
        } else {
            Node::single(&stats)
        }
    }

    fn limited_cluster(
        &self,
        region: &MatrixView<'_>,
        budget: usize,
        objective: &Objective,
        seed: u64,
    ) -> Vec<Option<LimitedResult>> {
        let rows = region.rows();
        if budget <= 1 || rows <= 1 {
            let stats = if rows <= 1 {
                leaf_region(region)
            } else {
                compute_rho_sum(region).region()
            };
            return vec![None, Some(LimitedResult::single(&stats, objective))];
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let cut = compute_cut(region, &self.strategy, &mut rng);
        let stats = cut.rho_sum().region();
        let mut results = vec![None; budget + 1];
        results[1] = Some(LimitedResult::single(&stats, objective));
        if cut.is_degenerate() {
            debug!(rows, budget, "no valid cut, region is one cluster");
            return results;
        }

        let (left, right) = join(
            || self.limited_cluster(cut.left(), budget - 1, objective, child_seed(seed, 0)),
            || self.limited_cluster(cut.right(), budget - 1, objective, child_seed(seed, 1)),
        );

        // Score every pair from its sums; remember only the winner per count.
        let mut winners: Vec<Option<(f64, &LimitedResult, &LimitedResult)>> = vec![None; budget + 1];
        for l in left.iter().flatten() {
            for r in right.iter().flatten() {
                let k = l.num_clusters() + r.num_clusters();
                if k > budget {
                    continue;
                }
                let score = objective.score(&l.stats().combine(*r.stats()), &stats);
                let better = winners[k].map_or(true, |(best, _, _)| objective.prefers(score, best));
                if better {
                    winners[k] = Some((score, l, r));
                }
            }
        }

        let mut candidates = 0;
        for (k, winner) in winners.into_iter().enumerate() {
            if let Some((_, l, r)) = winner {
                results[k] = Some(LimitedResult::combine(
                    l,
                    r,
                    cut.left_reordering(),
                    cut.right_reordering(),
                    &stats,
                    objective,
                ));
                candidates += 1;
            }
        }
        debug!(
            rows,
            budget,
            left = cut.left().rows(),
            right = cut.right().rows(),
            candidates,
            "combined child results"
        );
        results
    }
}

impl<S: EigenvectorStrategy> Clustering for SpectralClustering<S> {
    fn cluster(&self, matrix: &DataMatrix) -> Result<Assignments> {
        SpectralClustering::cluster(self, matrix)
    }

    fn cluster_k(&self, matrix: &DataMatrix, k: usize) -> Result<Assignments> {
        self.cluster_limited(matrix, k, false)
    }
}

#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    (a(), b())
}

/// Seed of child `branch` of a node seeded with `seed` (splitmix64).
fn child_seed(seed: u64, branch: u64) -> u64 {
    let mut z = seed.wrapping_add((branch + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
