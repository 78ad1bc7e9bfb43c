//! Seeded Lloyd k-means with restarts
//!
//! A deliberately small clustering routine for low-dimensional behavioral
//! feature matrices. Initialization samples `k` distinct input rows as
//! starting centroids; the best of `n_init` restarts (lowest inertia) wins.
//! All randomness flows from the explicit seed, so repeated fits over the
//! same data produce identical labels.

use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Configuration for a k-means fit.
#[derive(Debug, Clone, Copy)]
pub struct KMeansConfig {
    /// Number of clusters.
    pub k: usize,
    /// Seed for centroid initialization.
    pub seed: u64,
    /// Number of random restarts; the lowest-inertia run is kept.
    pub n_init: usize,
    /// Maximum Lloyd iterations per restart.
    pub max_iter: usize,
}

impl KMeansConfig {
    /// Standard configuration: 10 restarts, 100 iterations.
    #[must_use]
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            seed,
            n_init: 10,
            max_iter: 100,
        }
    }
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster id per input row, in input order.
    pub labels: Vec<usize>,
    /// Cluster centroids, indexed by cluster id.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from each row to its centroid.
    pub inertia: f64,
}

/// Fits k-means over `rows`.
///
/// Returns `None` when `rows` is empty, `config.k` is zero, or `config.k`
/// exceeds the number of rows; callers are expected to surface those as
/// validation failures.
#[must_use]
pub fn fit(config: &KMeansConfig, rows: &[Vec<f64>]) -> Option<KMeansFit> {
    if rows.is_empty() || config.k == 0 || config.k > rows.len() {
        return None;
    }

    let mut rng = Pcg64::seed_from_u64(config.seed);
    let mut best: Option<KMeansFit> = None;
    for _ in 0..config.n_init.max(1) {
        let init = rand::seq::index::sample(&mut rng, rows.len(), config.k);
        let centroids = init.iter().map(|i| rows[i].clone()).collect::<Vec<_>>();
        let run = lloyd(rows, centroids, config.max_iter);
        let better = best
            .as_ref()
            .is_none_or(|b| run.inertia < b.inertia);
        if better {
            best = Some(run);
        }
    }
    best
}

fn lloyd(rows: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iter: usize) -> KMeansFit {
    let k = centroids.len();
    let mut labels = vec![0_usize; rows.len()];

    for _ in 0..max_iter {
        let mut changed = false;
        for (row, label) in rows.iter().zip(labels.iter_mut()) {
            let nearest = nearest_centroid(row, &centroids);
            if nearest != *label {
                *label = nearest;
                changed = true;
            }
        }

        // Recompute centroids; a cluster that lost all rows keeps its
        // previous centroid.
        let mut sums = vec![vec![0.0; rows[0].len()]; k];
        let mut counts = vec![0_usize; k];
        for (row, &label) in rows.iter().zip(&labels) {
            counts[label] += 1;
            for (sum, v) in sums[label].iter_mut().zip(row) {
                *sum += v;
            }
        }
        for (cluster, (sum, &count)) in sums.iter().zip(&counts).enumerate() {
            if count > 0 {
                #[expect(clippy::cast_precision_loss)]
                let n = count as f64;
                centroids[cluster] = sum.iter().map(|s| s / n).collect();
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = rows
        .iter()
        .zip(&labels)
        .map(|(row, &label)| squared_distance(row, &centroids[label]))
        .sum();
    KMeansFit {
        labels,
        centroids,
        inertia,
    }
}

fn nearest_centroid(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(row, centroid);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![-0.1, 0.0],
            vec![10.0, 10.1],
            vec![10.1, 10.0],
            vec![9.9, 10.0],
        ]
    }

    #[test]
    fn test_rejects_invalid_k() {
        let rows = two_blobs();
        assert!(fit(&KMeansConfig::new(0, 42), &rows).is_none());
        assert!(fit(&KMeansConfig::new(7, 42), &rows).is_none());
        assert!(fit(&KMeansConfig::new(1, 42), &[]).is_none());
    }

    #[test]
    fn test_separates_well_spread_blobs() {
        let rows = two_blobs();
        let result = fit(&KMeansConfig::new(2, 42), &rows).unwrap();
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[0], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[4]);
        assert_eq!(result.labels[3], result.labels[5]);
        assert_ne!(result.labels[0], result.labels[3]);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let rows = two_blobs();
        let a = fit(&KMeansConfig::new(2, 42), &rows).unwrap();
        let b = fit(&KMeansConfig::new(2, 42), &rows).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_k_equal_to_row_count() {
        let rows = two_blobs();
        let result = fit(&KMeansConfig::new(rows.len(), 42), &rows).unwrap();
        let mut seen = result.labels.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), rows.len());
    }
}
