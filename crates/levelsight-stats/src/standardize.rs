//! Per-column z-score standardization
//!
//! Fitted on one matrix and applicable to any other matrix with the same
//! column layout, so the same transform can be reused across data splits.

use crate::descriptive::DescriptiveStats;

/// Column-wise standardizer (zero mean, unit variance).
///
/// Columns with zero variance are left centered but unscaled to avoid
/// dividing by zero.
#[derive(Debug, Clone)]
pub struct Standardizer {
    /// Per-column means of the fitting data.
    pub means: Vec<f64>,
    /// Per-column standard deviations of the fitting data.
    pub std_devs: Vec<f64>,
}

impl Standardizer {
    /// Fits means and standard deviations from `rows`.
    ///
    /// All rows must have the same number of columns. Returns `None` for an
    /// empty matrix.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let n_cols = rows.first()?.len();
        let mut means = Vec::with_capacity(n_cols);
        let mut std_devs = Vec::with_capacity(n_cols);
        for col in 0..n_cols {
            let stats = DescriptiveStats::from_values(rows.iter().map(|r| Some(r[col])))?;
            means.push(stats.mean);
            std_devs.push(stats.std_dev);
        }
        Some(Self { means, std_devs })
    }

    /// Applies the fitted transform to `rows`, returning a new matrix.
    #[must_use]
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Applies the fitted transform to a single row.
    #[must_use]
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .map(|(v, (mean, std_dev))| {
                let centered = v - mean;
                if *std_dev > 0.0 { centered / std_dev } else { centered }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_empty() {
        assert!(Standardizer::fit(&[]).is_none());
    }

    #[test]
    fn test_zero_mean_unit_variance() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaler = Standardizer::fit(&rows).unwrap();
        let transformed = scaler.transform(&rows);

        for col in 0..2 {
            let mean = transformed.iter().map(|r| r[col]).sum::<f64>() / 3.0;
            let var = transformed.iter().map(|r| r[col].powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_column_is_centered_not_scaled() {
        let rows = vec![vec![7.0], vec![7.0], vec![7.0]];
        let scaler = Standardizer::fit(&rows).unwrap();
        let transformed = scaler.transform(&rows);
        assert!(transformed.iter().all(|r| r[0] == 0.0));
    }
}
