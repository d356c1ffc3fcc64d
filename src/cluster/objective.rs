//! Merge objectives and budget-bounded partial results.
//!
//! # Relaxed correlation
//!
//! A disagreement cost over all pairs of rows (lower is better):
//!
//! ```text
//! cost = α · Σ_{i~j} (1 - s_ij)  +  β · Σ_{i≁j} s_ij
//!      = α · (pairs - intra)     +  β · (total - intra)
//!
//! total = Σ_{i<j} s_ij = (pSum - Σ_i s_ii) / 2
//! ```
//!
//! where `i~j` means "same cluster" and `intra` is the similarity summed over
//! same-cluster pairs. With unit rows `Σ_i s_ii = n`, giving the familiar
//! `(pSum - n) / 2`.
//!
//! # K-means
//!
//! A cohesion score (higher is better): `Σ_C Σ_{i∈C} centroid_C · row_i`,
//! which equals `Σ_C |s_C|² / |C|` for cluster sums `s_C`. Refining a cluster
//! never lowers it.
//!
//! # Partial statistics
//!
//! Both objectives decompose over clusters, so a [`LimitedResult`] keeps the
//! per-cluster sums ([`PartialStats`]) and two sibling results combine in O(1)
//! without touching the data again.

/// O(1) summary of a region: its size, `pSum`, and the diagonal of its
/// implicit affinity matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    /// Number of rows.
    pub rows: usize,
    /// Total of the implicit affinity matrix.
    pub p_sum: f64,
    /// `Σ row_i · row_i`.
    pub self_similarity: f64,
}

impl RegionStats {
    /// Similarity summed over all unordered pairs of distinct rows.
    pub fn total_pair_similarity(&self) -> f64 {
        (self.p_sum - self.self_similarity) / 2.0
    }

    /// Number of unordered pairs of distinct rows.
    pub fn pair_count(&self) -> f64 {
        let n = self.rows as f64;
        n * (n - 1.0) / 2.0
    }

    /// Statistics of the whole region taken as one cluster.
    pub fn single_cluster(&self) -> PartialStats {
        PartialStats {
            intra_similarity: self.total_pair_similarity(),
            pair_count: self.pair_count(),
            cohesion: if self.rows > 0 {
                self.p_sum / self.rows as f64
            } else {
                0.0
            },
        }
    }
}

/// Same-cluster similarity and pair count of a clustering.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntraStats {
    /// Σ similarity over same-cluster pairs.
    pub similarity: f64,
    /// Number of same-cluster pairs.
    pub pairs: f64,
}

impl IntraStats {
    /// Stats of two disjoint clusterings taken together.
    pub fn combine(self, other: Self) -> Self {
        Self {
            similarity: self.similarity + other.similarity,
            pairs: self.pairs + other.pairs,
        }
    }
}

/// Relaxed-correlation cost of a clustering of `region`.
pub fn relaxed_correlation(alpha: f64, beta: f64, intra: IntraStats, region: &RegionStats) -> f64 {
    let inter = region.total_pair_similarity() - intra.similarity;
    alpha * (intra.pairs - intra.similarity) + beta * inter
}

/// Per-cluster sums from which either objective is evaluated in O(1).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialStats {
    /// Σ similarity over same-cluster pairs.
    pub intra_similarity: f64,
    /// Number of same-cluster pairs.
    pub pair_count: f64,
    /// Σ_C |s_C|² / |C|.
    pub cohesion: f64,
}

impl PartialStats {
    /// Stats of two disjoint clusterings taken together.
    pub fn combine(self, other: Self) -> Self {
        Self {
            intra_similarity: self.intra_similarity + other.intra_similarity,
            pair_count: self.pair_count + other.pair_count,
            cohesion: self.cohesion + other.cohesion,
        }
    }

    /// The relaxed-correlation part.
    pub fn intra(&self) -> IntraStats {
        IntraStats {
            similarity: self.intra_similarity,
            pairs: self.pair_count,
        }
    }
}

/// Objective used to rank candidate clusterings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Objective {
    /// Disagreement cost weighted by `alpha` (intra) and `beta` (inter).
    RelaxedCorrelation {
        /// Weight of same-cluster dissimilarity.
        alpha: f64,
        /// Weight of cross-cluster similarity.
        beta: f64,
    },
    /// K-means cohesion.
    KMeans,
}

impl Objective {
    /// Evaluate `stats` as a clustering of `region`.
    pub fn score(&self, stats: &PartialStats, region: &RegionStats) -> f64 {
        match *self {
            Objective::RelaxedCorrelation { alpha, beta } => {
                relaxed_correlation(alpha, beta, stats.intra(), region)
            }
            Objective::KMeans => stats.cohesion,
        }
    }

    /// Whether `candidate` is strictly better than `incumbent`.
    pub fn prefers(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Objective::RelaxedCorrelation { .. } => candidate < incumbent,
            Objective::KMeans => candidate > incumbent,
        }
    }
}

/// A clustering of one region that can be combined with a sibling's in O(1)
/// (plus the assignment copy).
#[derive(Debug, Clone, PartialEq)]
pub struct LimitedResult {
    assignments: Vec<usize>,
    num_clusters: usize,
    score: f64,
    stats: PartialStats,
}

impl LimitedResult {
    /// Every row of `region` in cluster 0.
    pub fn single(region: &RegionStats, objective: &Objective) -> Self {
        let stats = region.single_cluster();
        Self {
            assignments: vec![0; region.rows],
            num_clusters: 1,
            score: objective.score(&stats, region),
            stats,
        }
    }

    /// Join the results of the two halves of a cut of `region`.
    ///
    /// `left_reordering[k]` is the region-local row of the `k`-th left row
    /// (likewise for the right). Right cluster ids are shifted past the left's.
    pub fn combine(
        left: &Self,
        right: &Self,
        left_reordering: &[usize],
        right_reordering: &[usize],
        region: &RegionStats,
        objective: &Objective,
    ) -> Self {
        let stats = left.stats.combine(right.stats);
        Self {
            assignments: interleave(
                &left.assignments,
                left.num_clusters,
                &right.assignments,
                left_reordering,
                right_reordering,
            ),
            num_clusters: left.num_clusters + right.num_clusters,
            score: objective.score(&stats, region),
            stats,
        }
    }

    /// Cluster id per row of the region.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Number of clusters.
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Objective value within the region this result was built for.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// The combinable sums behind [`score`](Self::score).
    pub fn stats(&self) -> &PartialStats {
        &self.stats
    }

    pub(crate) fn into_assignments(self) -> Vec<usize> {
        self.assignments
    }
}

/// Map left/right assignments back onto the parent region's rows, shifting
/// right cluster ids by `left_clusters`.
pub(crate) fn interleave(
    left: &[usize],
    left_clusters: usize,
    right: &[usize],
    left_reordering: &[usize],
    right_reordering: &[usize],
) -> Vec<usize> {
    let mut out = vec![0; left_reordering.len() + right_reordering.len()];
    for (&row, &cluster) in left_reordering.iter().zip(left) {
        out[row] = cluster;
    }
    for (&row, &cluster) in right_reordering.iter().zip(right) {
        out[row] = cluster + left_clusters;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(rows: usize, p_sum: f64) -> RegionStats {
        RegionStats {
            rows,
            p_sum,
            self_similarity: rows as f64,
        }
    }

    #[test]
    fn test_single_cluster_stats() {
        let r = region(4, 10.0);
        let s = r.single_cluster();
        assert_eq!(s.pair_count, 6.0);
        assert_eq!(s.intra_similarity, 3.0);
        assert_eq!(s.cohesion, 2.5);
    }

    #[test]
    fn test_merged_cost_has_no_inter_term() {
        let r = region(4, 10.0);
        let s = r.single_cluster();
        let obj = Objective::RelaxedCorrelation {
            alpha: 0.25,
            beta: 100.0,
        };
        assert!((obj.score(&s, &r) - 0.25 * (6.0 - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_prefers_direction() {
        let rc = Objective::RelaxedCorrelation {
            alpha: 0.5,
            beta: 0.5,
        };
        assert!(rc.prefers(1.0, 2.0));
        assert!(!rc.prefers(2.0, 2.0));
        assert!(Objective::KMeans.prefers(2.0, 1.0));
        assert!(!Objective::KMeans.prefers(1.0, 1.0));
    }

    #[test]
    fn test_interleave_maps_back() {
        let out = interleave(&[0, 1], 2, &[0, 0, 1], &[3, 0], &[1, 4, 2]);
        assert_eq!(out, vec![1, 2, 3, 0, 2]);
    }

    #[test]
    fn test_combine_adds_stats_and_rescores() {
        // Two singleton halves of a 2-row region with similarity 0.5.
        let half = region(1, 1.0);
        let parent = region(2, 3.0);
        let obj = Objective::RelaxedCorrelation {
            alpha: 0.4,
            beta: 0.6,
        };
        let a = LimitedResult::single(&half, &obj);
        let b = LimitedResult::single(&half, &obj);
        let joined = LimitedResult::combine(&a, &b, &[1], &[0], &parent, &obj);

        assert_eq!(joined.num_clusters(), 2);
        assert_eq!(joined.assignments(), &[1, 0]);
        assert_eq!(joined.stats().pair_count, 0.0);
        // cost = β · 0.5
        assert!((joined.score() - 0.3).abs() < 1e-12);

        let km = LimitedResult::combine(
            &LimitedResult::single(&half, &Objective::KMeans),
            &LimitedResult::single(&half, &Objective::KMeans),
            &[0],
            &[1],
            &parent,
            &Objective::KMeans,
        );
        assert_eq!(km.score(), 2.0);
    }
}
