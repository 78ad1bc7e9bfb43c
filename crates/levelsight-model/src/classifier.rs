//! Classifier and attribution capabilities
//!
//! The pipeline consumes classification through two narrow traits so the
//! concrete model stays swappable. The bundled implementation is a
//! batch-gradient logistic regression over internally standardized inputs:
//! fully deterministic (zero initialization, fixed epoch count), which the
//! reproducibility guarantees depend on.

use levelsight_stats::standardize::Standardizer;

/// A fitted binary classifier exposing class probabilities.
pub trait SuccessModel {
    /// Success probability in [0, 1] for each input row.
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64>;
}

/// Global feature-attribution capability.
///
/// Implementations return one non-negative importance weight per feature
/// column, aligned with the model's feature order. The null implementation
/// returns an empty vector; callers treat that as "attribution
/// unavailable" and degrade, never fail.
pub trait Attributor {
    /// Per-feature global importance over `rows`; empty when unavailable.
    fn global_importance(&self, rows: &[Vec<f64>]) -> Vec<f64>;
}

/// Attributor used when no attribution backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAttributor;

impl Attributor for NullAttributor {
    fn global_importance(&self, _rows: &[Vec<f64>]) -> Vec<f64> {
        Vec::new()
    }
}

/// Hyperparameters for the logistic-regression fit.
#[derive(Debug, Clone, Copy)]
pub struct LogisticConfig {
    /// Gradient step size.
    pub learning_rate: f64,
    /// Number of full-batch gradient passes.
    pub epochs: usize,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
        }
    }
}

/// Logistic regression over standardized features.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    scaler: Standardizer,
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticRegression {
    /// Fits the model on `rows` / `labels`.
    ///
    /// Returns `None` for an empty matrix. The fit is deterministic:
    /// weights start at zero and every pass visits rows in input order.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>], labels: &[bool], config: &LogisticConfig) -> Option<Self> {
        if rows.is_empty() || rows.len() != labels.len() {
            return None;
        }
        let scaler = Standardizer::fit(rows)?;
        let standardized = scaler.transform(rows);
        let n_features = standardized[0].len();
        #[expect(clippy::cast_precision_loss)]
        let n = rows.len() as f64;

        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        for _ in 0..config.epochs {
            let mut grad_weights = vec![0.0; n_features];
            let mut grad_bias = 0.0;
            for (row, &label) in standardized.iter().zip(labels) {
                let error = sigmoid(dot(&weights, row) + bias) - f64::from(u8::from(label));
                for (grad, value) in grad_weights.iter_mut().zip(row) {
                    *grad += error * value;
                }
                grad_bias += error;
            }
            for (weight, grad) in weights.iter_mut().zip(&grad_weights) {
                *weight -= config.learning_rate * grad / n;
            }
            bias -= config.learning_rate * grad_bias / n;
        }

        Some(Self {
            scaler,
            weights,
            bias,
        })
    }

    /// Fitted weights in standardized-feature space.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl SuccessModel for LogisticRegression {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter()
            .map(|row| {
                let standardized = self.scaler.transform_row(row);
                sigmoid(dot(&self.weights, &standardized) + self.bias)
            })
            .collect()
    }
}

impl Attributor for LogisticRegression {
    /// Mean absolute per-feature contribution `|w_j · z_j|` over `rows`,
    /// the linear-model analogue of a global SHAP summary.
    fn global_importance(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        if rows.is_empty() {
            return vec![0.0; self.weights.len()];
        }
        let mut totals = vec![0.0; self.weights.len()];
        for row in rows {
            let standardized = self.scaler.transform_row(row);
            for ((total, weight), value) in totals.iter_mut().zip(&self.weights).zip(&standardized)
            {
                *total += (weight * value).abs();
            }
        }
        #[expect(clippy::cast_precision_loss)]
        let n = rows.len() as f64;
        for total in &mut totals {
            *total /= n;
        }
        totals
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Linearly separable toy data: success iff first feature is large.
    fn separable() -> (Vec<Vec<f64>>, Vec<bool>) {
        let rows = vec![
            vec![1.0, 5.0],
            vec![2.0, 4.0],
            vec![3.0, 6.0],
            vec![10.0, 5.0],
            vec![11.0, 4.0],
            vec![12.0, 6.0],
        ];
        let labels = vec![false, false, false, true, true, true];
        (rows, labels)
    }

    #[test]
    fn test_fit_rejects_empty_or_mismatched() {
        assert!(LogisticRegression::fit(&[], &[], &LogisticConfig::default()).is_none());
        assert!(
            LogisticRegression::fit(&[vec![1.0]], &[true, false], &LogisticConfig::default())
                .is_none()
        );
    }

    #[test]
    fn test_learns_separable_data() {
        let (rows, labels) = separable();
        let model = LogisticRegression::fit(&rows, &labels, &LogisticConfig::default()).unwrap();
        let probs = model.predict_proba(&rows);
        for (p, &label) in probs.iter().zip(&labels) {
            assert!((0.0..=1.0).contains(p));
            if label {
                assert!(*p > 0.5);
            } else {
                assert!(*p < 0.5);
            }
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (rows, labels) = separable();
        let config = LogisticConfig::default();
        let a = LogisticRegression::fit(&rows, &labels, &config).unwrap();
        let b = LogisticRegression::fit(&rows, &labels, &config).unwrap();
        assert_eq!(a.predict_proba(&rows), b.predict_proba(&rows));
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn test_importance_highlights_predictive_feature() {
        let (rows, labels) = separable();
        let model = LogisticRegression::fit(&rows, &labels, &LogisticConfig::default()).unwrap();
        let importance = model.global_importance(&rows);
        assert_eq!(importance.len(), 2);
        // Feature 0 drives the label; feature 1 is noise.
        assert!(importance[0] > importance[1]);
    }

    #[test]
    fn test_null_attributor_is_empty() {
        let (rows, _) = separable();
        assert!(NullAttributor.global_importance(&rows).is_empty());
    }
}
