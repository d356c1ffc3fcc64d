//! Minimum-conductance spectral cuts.
//!
//! A cut orders the rows of a region by an approximate second eigenvector and
//! then sweeps the prefixes of that order, keeping the split with the lowest
//! **conductance**:
//!
//! ```text
//! φ(c) = u(c) / min(ρ_X(c), ρ_Y(c))
//!
//! X = first c sorted rows, Y = the rest
//! u(c)  = Σ_{i∈X, j∈Y} row_i·row_j = x·y        (x, y = column sums of X, Y)
//! ρ_X(c) = Σ_{i∈X} rho_i,  ρ_Y(c) = pSum - ρ_X(c)
//! ```
//!
//! The sweep never touches the pairwise affinity matrix. Moving row `r` from
//! `Y` to `X` updates the cross similarity in O(nnz(r)):
//!
//! ```text
//! u' = u - x·r + y·r - r·r        (y still contains r)
//! ```
//!
//! so the whole sweep is linear in the non-zeros of the region.
//!
//! The objectives used to decide between merging and splitting are evaluated
//! from `rho`, `pSum` and per-cluster running sums only.

use super::eigenvector::EigenvectorStrategy;
use super::objective::{relaxed_correlation, IntraStats, RegionStats};
use crate::matrix::{add_row, dot, norm_sq, sub_row, MatrixView};
use rand::RngCore;

/// Similarity of every row to the region's column sum.
#[derive(Debug, Clone, PartialEq)]
pub struct RhoSum {
    /// Column-wise sum of all rows.
    pub row_sums: Vec<f64>,
    /// `rho[i] = row_sums · row_i`, the row sums of the implicit affinity matrix.
    pub rho: Vec<f64>,
    /// `Σ rho`, the total of the implicit affinity matrix.
    pub p_sum: f64,
    /// `Σ row_i · row_i`, the diagonal of the implicit affinity matrix.
    pub self_similarity: f64,
}

impl RhoSum {
    /// Number of rows the statistics were computed over.
    pub fn rows(&self) -> usize {
        self.rho.len()
    }

    /// The O(1) summary used by the objectives.
    pub fn region(&self) -> RegionStats {
        RegionStats {
            rows: self.rows(),
            p_sum: self.p_sum,
            self_similarity: self.self_similarity,
        }
    }
}

/// Compute the column sums, `rho` and `pSum` of a region in O(nnz).
pub fn compute_rho_sum(matrix: &MatrixView<'_>) -> RhoSum {
    let row_sums = matrix.row_sum();
    let mut rho = Vec::with_capacity(matrix.rows());
    let mut p_sum = 0.0;
    let mut self_similarity = 0.0;
    for row in matrix.iter_rows() {
        let r = row.dot(&row_sums);
        p_sum += r;
        self_similarity += row.norm_sq();
        rho.push(r);
    }
    RhoSum {
        row_sums,
        rho,
        p_sum,
        self_similarity,
    }
}

/// The outcome of one spectral cut of a region.
///
/// Reorderings are local row indices of the region that was cut; `left` and
/// `right` are views over exactly those rows, in that order.
#[derive(Debug, Clone)]
pub struct CutResult<'a> {
    stats: RhoSum,
    conductance: Option<f64>,
    left: MatrixView<'a>,
    right: MatrixView<'a>,
    left_reordering: Vec<usize>,
    right_reordering: Vec<usize>,
}

/// Cut `matrix` into two regions of low conductance.
///
/// If no candidate cut has a finite conductance (e.g. every row is zero), the
/// whole region is returned on the left and the right is empty; callers treat
/// that as an unsplittable region.
pub fn compute_cut<'a, S>(matrix: &MatrixView<'a>, strategy: &S, rng: &mut dyn RngCore) -> CutResult<'a>
where
    S: EigenvectorStrategy + ?Sized,
{
    let n = matrix.rows();
    let stats = compute_rho_sum(matrix);
    let v = strategy.second_eigenvector(matrix, &stats.rho, stats.p_sum, rng);

    let mut reordering: Vec<usize> = (0..n).collect();
    reordering.sort_by(|&a, &b| v[a].total_cmp(&v[b]));
    let sorted_rho: Vec<f64> = reordering.iter().map(|&i| stats.rho[i]).collect();
    let sorted = matrix.select(&reordering);

    let best = min_conductance_cut(&sorted, &sorted_rho, stats.p_sum, &stats.row_sums);
    let cut_index = best.map_or(n, |(c, _)| c);
    tracing::trace!(
        rows = n,
        p_sum = stats.p_sum,
        cut_index,
        conductance = ?best.map(|(_, phi)| phi),
        "spectral cut"
    );

    let right_reordering = reordering.split_off(cut_index);
    let left_reordering = reordering;
    CutResult {
        left: matrix.select(&left_reordering),
        right: matrix.select(&right_reordering),
        conductance: best.map(|(_, phi)| phi),
        stats,
        left_reordering,
        right_reordering,
    }
}

/// Sweep the rows of `sorted` in order and return `(c, φ(c))` for the prefix
/// length of minimum conductance.
///
/// Candidates are `c ∈ [1, n-2]`, or just `c = 1` for two rows. `rho` must be
/// in the same order as the rows of `sorted`. Candidates whose denominator is
/// not positive are skipped; ties keep the longest prefix. Returns `None` when
/// no candidate is valid (fewer than two rows, or all denominators
/// degenerate).
pub fn min_conductance_cut(
    sorted: &MatrixView<'_>,
    rho: &[f64],
    p_sum: f64,
    row_sums: &[f64],
) -> Option<(usize, f64)> {
    let n = sorted.rows();
    if n < 2 {
        return None;
    }

    // Dense over all columns: O(columns) per call on top of the O(nnz) sweep.
    let mut x = vec![0.0; sorted.columns()];
    let mut y = row_sums.to_vec();
    let first = sorted.row(0);
    add_row(&mut x, &first);
    sub_row(&mut y, &first);

    let mut rho_x = rho[0];
    let mut rho_y = p_sum - rho[0];
    let mut u = dot(&x, &y);
    let mut best = conductance(u, rho_x, rho_y).map(|phi| (1, phi));

    let last = if n == 2 { 1 } else { n - 2 };
    for (i, &rho_i) in rho.iter().enumerate().take(last).skip(1) {
        let row = sorted.row(i);
        u = u - row.dot(&x) + row.dot(&y) - row.norm_sq();
        add_row(&mut x, &row);
        sub_row(&mut y, &row);
        rho_x += rho_i;
        rho_y -= rho_i;

        if let Some(phi) = conductance(u, rho_x, rho_y) {
            if best.map_or(true, |(_, b)| phi <= b) {
                best = Some((i + 1, phi));
            }
        }
    }
    best
}

fn conductance(u: f64, rho_x: f64, rho_y: f64) -> Option<f64> {
    let denominator = rho_x.min(rho_y);
    if denominator > 0.0 {
        let phi = u / denominator;
        phi.is_finite().then_some(phi)
    } else {
        None
    }
}

impl<'a> CutResult<'a> {
    /// Column sums, `rho` and `pSum` of the region that was cut.
    pub fn rho_sum(&self) -> &RhoSum {
        &self.stats
    }

    /// `pSum` of the region that was cut.
    pub fn p_sum(&self) -> f64 {
        self.stats.p_sum
    }

    /// Rows in the region that was cut.
    pub fn rows(&self) -> usize {
        self.stats.rows()
    }

    /// Conductance of the chosen cut, if one was found.
    pub fn conductance(&self) -> Option<f64> {
        self.conductance
    }

    /// True when one side received every row, i.e. no real split happened.
    pub fn is_degenerate(&self) -> bool {
        self.left.rows() == self.rows() || self.right.rows() == self.rows()
    }

    /// Rows of the first region.
    pub fn left(&self) -> &MatrixView<'a> {
        &self.left
    }

    /// Rows of the second region.
    pub fn right(&self) -> &MatrixView<'a> {
        &self.right
    }

    /// Local indices (in the cut region) of the left rows, in left order.
    pub fn left_reordering(&self) -> &[usize] {
        &self.left_reordering
    }

    /// Local indices (in the cut region) of the right rows, in right order.
    pub fn right_reordering(&self) -> &[usize] {
        &self.right_reordering
    }

    /// K-means score of the whole region as one cluster:
    /// `Σ_i centroid·row_i = pSum / n`.
    pub fn kmeans_objective(&self) -> f64 {
        self.stats.region().single_cluster().cohesion
    }

    /// K-means score when the left and right regions carry the given
    /// clusterings.
    pub fn kmeans_split_objective(
        &self,
        left_clusters: usize,
        left_assignments: &[usize],
        right_clusters: usize,
        right_assignments: &[usize],
    ) -> f64 {
        kmeans_objective(&self.left, left_assignments, left_clusters)
            + kmeans_objective(&self.right, right_assignments, right_clusters)
    }

    /// Relaxed-correlation cost of keeping the region as a single cluster:
    /// `alpha · (n(n-1)/2 - (pSum - Σ row_i·row_i)/2)`.
    pub fn merged_objective(&self, alpha: f64, beta: f64) -> f64 {
        let region = self.stats.region();
        let single = region.single_cluster();
        relaxed_correlation(alpha, beta, single.intra(), &region)
    }

    /// Relaxed-correlation cost when the left and right regions carry the
    /// given clusterings.
    pub fn split_objective(
        &self,
        alpha: f64,
        beta: f64,
        left_clusters: usize,
        left_assignments: &[usize],
        right_clusters: usize,
        right_assignments: &[usize],
    ) -> f64 {
        let intra = intra_cluster_stats(&self.left, left_assignments, left_clusters)
            .combine(intra_cluster_stats(&self.right, right_assignments, right_clusters));
        relaxed_correlation(alpha, beta, intra, &self.stats.region())
    }
}

/// Intra-cluster similarity and pair count of a clustering of `matrix`.
///
/// Each row is compared against the running sum of the rows already seen in
/// its cluster, so the cost is O(nnz) plus `num_clusters × columns` memory.
pub fn intra_cluster_stats(
    matrix: &MatrixView<'_>,
    assignments: &[usize],
    num_clusters: usize,
) -> IntraStats {
    let mut sums = vec![vec![0.0; matrix.columns()]; num_clusters];
    let mut sizes = vec![0usize; num_clusters];
    let mut stats = IntraStats::default();
    for (row, &a) in matrix.iter_rows().zip(assignments) {
        stats.similarity += row.dot(&sums[a]);
        stats.pairs += sizes[a] as f64;
        add_row(&mut sums[a], &row);
        sizes[a] += 1;
    }
    stats
}

/// K-means score of a clustering: `Σ_C Σ_{i∈C} centroid_C·row_i = Σ_C |s_C|² / |C|`.
pub fn kmeans_objective(matrix: &MatrixView<'_>, assignments: &[usize], num_clusters: usize) -> f64 {
    let mut sums = vec![vec![0.0; matrix.columns()]; num_clusters];
    let mut sizes = vec![0usize; num_clusters];
    for (row, &a) in matrix.iter_rows().zip(assignments) {
        add_row(&mut sums[a], &row);
        sizes[a] += 1;
    }
    sums.iter()
        .zip(&sizes)
        .filter(|(_, size)| **size > 0)
        .map(|(s, &size)| norm_sq(s) / size as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::eigenvector::Ckvw03;
    use crate::matrix::DataMatrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(v: &[f64]) -> Vec<f64> {
        let n = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        v.iter().map(|x| x / n).collect()
    }

    fn small_matrix() -> DataMatrix {
        DataMatrix::from_rows(&[
            unit(&[1.0, 0.1, 0.0]),
            unit(&[0.9, 0.2, 0.1]),
            unit(&[1.0, 0.0, 0.3]),
            unit(&[0.1, 1.0, 0.2]),
            unit(&[0.0, 0.8, 0.4]),
            unit(&[0.3, 0.1, 1.0]),
            unit(&[0.2, 0.3, 0.9]),
            unit(&[0.5, 0.5, 0.5]),
        ])
        .unwrap()
    }

    /// Cross similarity computed directly from the pairwise dot products.
    fn brute_force_conductance(view: &MatrixView<'_>, c: usize) -> Option<f64> {
        let n = view.rows();
        let mut u = 0.0;
        let (mut rho_x, mut rho_y) = (0.0, 0.0);
        for i in 0..n {
            let mut rho_i = 0.0;
            for j in 0..n {
                let s = view.row(i).dot_row(&view.row(j));
                rho_i += s;
                if i < c && j >= c {
                    u += s;
                }
            }
            if i < c {
                rho_x += rho_i;
            } else {
                rho_y += rho_i;
            }
        }
        let d = f64::min(rho_x, rho_y);
        (d > 0.0).then(|| u / d)
    }

    #[test]
    fn test_rho_sum_matches_affinity_row_sums() {
        let m = small_matrix();
        let view = m.view();
        let stats = compute_rho_sum(&view);

        let mut total = 0.0;
        for i in 0..view.rows() {
            let direct: f64 = (0..view.rows())
                .map(|j| view.row(i).dot_row(&view.row(j)))
                .sum();
            assert!((stats.rho[i] - direct).abs() < 1e-12);
            total += direct;
        }
        assert!((stats.p_sum - total).abs() < 1e-10);
        assert!((stats.self_similarity - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_rho_sum_sparse_matches_dense() {
        let rows = vec![
            vec![(0, 1.0), (3, 2.0)],
            vec![(1, 1.0)],
            vec![(0, 0.5), (1, 0.5), (3, 1.0)],
        ];
        let sparse = DataMatrix::from_sparse_rows(4, &rows).unwrap();
        let dense = DataMatrix::from_rows(&[
            vec![1.0, 0.0, 0.0, 2.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.5, 0.5, 0.0, 1.0],
        ])
        .unwrap();
        let a = compute_rho_sum(&sparse.view());
        let b = compute_rho_sum(&dense.view());
        assert_eq!(a, b);
    }

    #[test]
    fn test_sweep_matches_brute_force_minimum() {
        let m = small_matrix();
        let view = m.view();
        let stats = compute_rho_sum(&view);

        // Sweep over a fixed, arbitrary order.
        let order = [3, 0, 5, 1, 7, 4, 2, 6];
        let sorted = view.select(&order);
        let sorted_rho: Vec<f64> = order.iter().map(|&i| stats.rho[i]).collect();
        let (c, phi) =
            min_conductance_cut(&sorted, &sorted_rho, stats.p_sum, &stats.row_sums).unwrap();

        let brute: Vec<f64> = (1..order.len() - 1)
            .map(|k| brute_force_conductance(&sorted, k).unwrap())
            .collect();
        let min = brute.iter().cloned().fold(f64::INFINITY, f64::min);

        assert!((phi - min).abs() < 1e-9, "sweep {phi} vs brute {min}");
        assert!((brute[c - 1] - phi).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_never_peels_off_the_last_row() {
        // c = 4 would give conductance 0 but lies outside [1, n-2].
        let rows = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ];
        let m = DataMatrix::from_rows(&rows).unwrap();
        let view = m.view();
        let stats = compute_rho_sum(&view);
        let best = min_conductance_cut(&view, &stats.rho, stats.p_sum, &stats.row_sums);
        assert_eq!(best, Some((2, 0.5)));
    }

    #[test]
    fn test_sweep_ties_keep_longest_prefix() {
        // c = 1 and c = 2 both give 1/2 and 2/4.
        let rows = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ];
        let m = DataMatrix::from_rows(&rows).unwrap();
        let view = m.view();
        let stats = compute_rho_sum(&view);
        let best = min_conductance_cut(&view, &stats.rho, stats.p_sum, &stats.row_sums);
        assert_eq!(best, Some((2, 0.5)));
    }

    #[test]
    fn test_compute_cut_matches_brute_force_on_eigen_order() {
        let m = small_matrix();
        let view = m.view();
        let mut rng = StdRng::seed_from_u64(3);
        let cut = compute_cut(&view, &Ckvw03, &mut rng);

        let mut order = cut.left_reordering().to_vec();
        order.extend_from_slice(cut.right_reordering());
        let sorted = view.select(&order);
        let min = (1..order.len() - 1)
            .filter_map(|k| brute_force_conductance(&sorted, k))
            .fold(f64::INFINITY, f64::min);

        let brute_at_cut = brute_force_conductance(&sorted, cut.left().rows()).unwrap();
        assert!((brute_at_cut - min).abs() < 1e-9);
        assert!((cut.conductance().unwrap() - min).abs() < 1e-9);
    }

    #[test]
    fn test_reorderings_partition_rows() {
        let m = small_matrix();
        let view = m.view();
        let mut rng = StdRng::seed_from_u64(11);
        let cut = compute_cut(&view, &Ckvw03, &mut rng);

        let mut all: Vec<usize> = cut
            .left_reordering()
            .iter()
            .chain(cut.right_reordering())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..8).collect::<Vec<_>>());
        assert!(!cut.is_degenerate());
        assert_eq!(cut.left().rows(), cut.left_reordering().len());
        assert_eq!(cut.right().rows(), cut.right_reordering().len());
    }

    #[test]
    fn test_all_zero_rows_are_unsplittable() {
        let m = DataMatrix::from_rows(&vec![vec![0.0; 3]; 5]).unwrap();
        let view = m.view();
        let mut rng = StdRng::seed_from_u64(0);
        let cut = compute_cut(&view, &Ckvw03, &mut rng);
        assert!(cut.is_degenerate());
        assert_eq!(cut.left().rows(), 5);
        assert_eq!(cut.conductance(), None);
    }

    #[test]
    fn test_two_rows_always_split() {
        let m = DataMatrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let cut = compute_cut(&m.view(), &Ckvw03, &mut rng);
        assert_eq!(cut.left().rows(), 1);
        assert_eq!(cut.right().rows(), 1);
    }

    #[test]
    fn test_merged_objective_closed_form() {
        // Hand-computed: rows e0, e0, e1 -> pSum = 2 + 2 + 1 = 5, n = 3.
        let m = DataMatrix::from_rows(&[vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let cut = compute_cut(&m.view(), &Ckvw03, &mut rng);
        assert!((cut.p_sum() - 5.0).abs() < 1e-12);

        let (alpha, beta) = (0.4, 0.6);
        // pairs = 3, intra similarity = (5 - 3) / 2 = 1
        let expected = alpha * (3.0 - 1.0);
        assert!((cut.merged_objective(alpha, beta) - expected).abs() < 1e-12);

        let n = 3.0;
        let from_formula = alpha * (n * (n - 1.0) / 2.0 - (cut.p_sum() - n) / 2.0);
        assert!((cut.merged_objective(alpha, beta) - from_formula).abs() < 1e-12);
    }

    #[test]
    fn test_split_objective_matches_direct_sums() {
        let m = small_matrix();
        let view = m.view();
        let mut rng = StdRng::seed_from_u64(5);
        let cut = compute_cut(&view, &Ckvw03, &mut rng);

        let left_n = cut.left().rows();
        let right_n = cut.right().rows();
        let left_assign = vec![0; left_n];
        let right_assign: Vec<usize> = (0..right_n).map(|i| i % 2).collect();
        let (alpha, beta) = (0.3, 0.7);
        let got = cut.split_objective(alpha, beta, 1, &left_assign, 2, &right_assign);

        // Direct: label every original row, then sum over all pairs.
        let mut labels = vec![0usize; view.rows()];
        for (k, &i) in cut.left_reordering().iter().enumerate() {
            labels[i] = left_assign[k];
        }
        for (k, &i) in cut.right_reordering().iter().enumerate() {
            labels[i] = 1 + right_assign[k];
        }
        let (mut intra_cost, mut inter_sim) = (0.0, 0.0);
        for i in 0..view.rows() {
            for j in (i + 1)..view.rows() {
                let s = view.row(i).dot_row(&view.row(j));
                if labels[i] == labels[j] {
                    intra_cost += 1.0 - s;
                } else {
                    inter_sim += s;
                }
            }
        }
        let expected = alpha * intra_cost + beta * inter_sim;
        assert!((got - expected).abs() < 1e-9, "{got} vs {expected}");
    }

    #[test]
    fn test_kmeans_objectives() {
        let m = small_matrix();
        let view = m.view();
        let mut rng = StdRng::seed_from_u64(9);
        let cut = compute_cut(&view, &Ckvw03, &mut rng);

        // Whole region: centroid = mean row.
        let n = view.rows() as f64;
        let centroid: Vec<f64> = cut.rho_sum().row_sums.iter().map(|s| s / n).collect();
        let direct: f64 = view.iter_rows().map(|r| r.dot(&centroid)).sum();
        assert!((cut.kmeans_objective() - direct).abs() < 1e-9);

        // Splitting can only raise the k-means score.
        let left = vec![0; cut.left().rows()];
        let right = vec![0; cut.right().rows()];
        assert!(cut.kmeans_split_objective(1, &left, 1, &right) >= cut.kmeans_objective() - 1e-12);
    }
}
