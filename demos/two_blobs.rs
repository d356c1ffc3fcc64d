use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sunder::cluster::Ckvw06;
use sunder::{ari, DataMatrix, SpectralClustering};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two noisy topics over a 6-term vocabulary: terms 0-2 vs terms 3-5.
    let mut rng = StdRng::seed_from_u64(2024);
    let noise = Normal::<f64>::new(0.0, 0.05)?;

    let mut rows: Vec<Vec<(usize, f64)>> = Vec::new();
    let mut truth = Vec::new();
    for topic in 0..2 {
        for _ in 0..25 {
            let row = (0..3)
                .map(|t| {
                    let weight: f64 = if t == 0 { 1.0 } else { 0.3 };
                    (3 * topic + t, (weight + noise.sample(&mut rng)).abs())
                })
                .collect();
            rows.push(row);
            truth.push(topic);
        }
    }
    let matrix = DataMatrix::from_sparse_rows(6, &rows)?;

    let full = SpectralClustering::new().with_seed(1).cluster(&matrix)?;
    let limited = SpectralClustering::new()
        .with_strategy(Ckvw06)
        .with_seed(1)
        .cluster_limited(&matrix, 4, false)?;
    let kmeans = SpectralClustering::new()
        .with_seed(1)
        .cluster_limited(&matrix, 2, true)?;

    for (name, assignments) in [("full", &full), ("limited", &limited), ("kmeans", &kmeans)] {
        let labels = assignments.hard_labels()?;
        println!(
            "{name:>8}: clusters={} sizes={:?} ari={:.3}",
            assignments.num_clusters(),
            assignments.cluster_sizes(),
            ari(&labels, &truth)
        );
    }

    for (k, centroid) in full.centroids(&matrix)?.iter().enumerate() {
        let dense: Vec<String> = centroid.to_dense().iter().map(|x| format!("{x:.2}")).collect();
        println!("  centroid {k}: [{}]", dense.join(", "));
    }

    Ok(())
}
