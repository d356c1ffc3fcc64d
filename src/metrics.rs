//! Agreement between a clustering and reference labels.
//!
//! | Metric | Range | Best | Notes |
//! |--------|-------|------|-------|
//! | [`ari`] | [-1, 1] | 1 | chance-corrected pair counting |
//! | [`nmi`] | [0, 1] | 1 | `2 I(U;V) / (H(U) + H(V))` |
//! | [`purity`] | [0, 1] | 1 | rewards over-clustering |
//!
//! All three are invariant to relabeling. Slices of different lengths, or
//! empty slices, score 0.
//!
//! ```rust
//! use sunder::metrics::{ari, nmi, purity};
//!
//! let pred = [1, 1, 0, 0];
//! let truth = [0, 0, 1, 1];
//! assert!((ari(&pred, &truth) - 1.0).abs() < 1e-10);
//! assert!((nmi(&pred, &truth) - 1.0).abs() < 1e-10);
//! assert!((purity(&pred, &truth) - 1.0).abs() < 1e-10);
//! ```
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions"
//! - Strehl & Ghosh (2002). "Cluster ensembles"

use std::collections::HashMap;

/// Joint and marginal label counts of two labelings.
struct Contingency {
    n: usize,
    joint: HashMap<(usize, usize), usize>,
    pred: HashMap<usize, usize>,
    truth: HashMap<usize, usize>,
}

impl Contingency {
    fn new(pred: &[usize], truth: &[usize]) -> Option<Self> {
        if pred.len() != truth.len() || pred.is_empty() {
            return None;
        }
        let mut table = Self {
            n: pred.len(),
            joint: HashMap::new(),
            pred: HashMap::new(),
            truth: HashMap::new(),
        };
        for (&p, &t) in pred.iter().zip(truth) {
            *table.joint.entry((p, t)).or_insert(0) += 1;
            *table.pred.entry(p).or_insert(0) += 1;
            *table.truth.entry(t).or_insert(0) += 1;
        }
        Some(table)
    }

    fn entropy(&self, counts: &HashMap<usize, usize>) -> f64 {
        let n = self.n as f64;
        counts
            .values()
            .map(|&c| c as f64 / n)
            .filter(|&p| p > 0.0)
            .map(|p| -p * p.ln())
            .sum()
    }
}

fn comb2(n: usize) -> f64 {
    if n < 2 {
        0.0
    } else {
        (n * (n - 1) / 2) as f64
    }
}

/// Adjusted Rand Index. 0 for chance agreement, 1 for identical partitions.
pub fn ari(pred: &[usize], truth: &[usize]) -> f64 {
    let Some(table) = Contingency::new(pred, truth) else {
        return 0.0;
    };

    let index: f64 = table.joint.values().map(|&c| comb2(c)).sum();
    let sum_a: f64 = table.pred.values().map(|&c| comb2(c)).sum();
    let sum_b: f64 = table.truth.values().map(|&c| comb2(c)).sum();

    let expected = sum_a * sum_b / comb2(table.n).max(1.0);
    let max_index = (sum_a + sum_b) / 2.0;
    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        // both labelings are trivial (all-one or all-singleton)
        return 1.0;
    }
    (index - expected) / denom
}

/// Normalized Mutual Information. 1 when both labelings are constant.
pub fn nmi(pred: &[usize], truth: &[usize]) -> f64 {
    let Some(table) = Contingency::new(pred, truth) else {
        return 0.0;
    };

    let n = table.n as f64;
    let mut mi = 0.0;
    for (&(p, t), &count) in &table.joint {
        let p_joint = count as f64 / n;
        let p_p = table.pred[&p] as f64 / n;
        let p_t = table.truth[&t] as f64 / n;
        mi += p_joint * (p_joint / (p_p * p_t)).ln();
    }

    let denom = table.entropy(&table.pred) + table.entropy(&table.truth);
    if denom > 0.0 {
        2.0 * mi / denom
    } else {
        1.0
    }
}

/// Fraction of points whose cluster's majority reference label is their own.
pub fn purity(pred: &[usize], truth: &[usize]) -> f64 {
    let Some(table) = Contingency::new(pred, truth) else {
        return 0.0;
    };

    let mut majority: HashMap<usize, usize> = HashMap::new();
    for (&(p, _), &count) in &table.joint {
        let best = majority.entry(p).or_insert(0);
        *best = (*best).max(count);
    }
    majority.values().sum::<usize>() as f64 / table.n as f64
}
