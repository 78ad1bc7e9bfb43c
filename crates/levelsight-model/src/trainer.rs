//! Leakage-safe success-model training
//!
//! Ordering here is the whole point: sessions are split into train and
//! validation FIRST, then imputation medians are computed from the training
//! split only and applied to both sides. Validation statistics never feed
//! back into training, and the stored medians are reused verbatim for any
//! later inference over the full table.

use levelsight_analysis::{
    ValidationError,
    session::{Feature, SessionRecord},
};
use levelsight_stats::{auc::roc_auc, descriptive::median};
use rand::{SeedableRng, seq::SliceRandom};
use rand_pcg::Pcg64;

use crate::classifier::{LogisticConfig, LogisticRegression, SuccessModel};

/// Minimum number of outcome-labeled sessions required to train.
pub const MIN_LABELED_SESSIONS: usize = 5;

/// Seed for the train/validation shuffle.
pub const SPLIT_SEED: u64 = 42;

/// Fraction of labeled sessions held out for validation.
const VALIDATION_FRACTION: f64 = 0.2;

/// A trained success model together with everything later stages need to
/// reuse it without recomputation.
#[derive(Debug, Clone)]
pub struct TrainedSuccessModel {
    /// The fitted classifier.
    pub model: LogisticRegression,
    /// Feature columns the model was trained on, in matrix order.
    pub features: Vec<Feature>,
    /// Validation AUC; NaN when it could not be computed.
    pub val_auc: f64,
    /// Imputation medians from the training split, aligned with
    /// `features`. Reused for all later inference; never recomputed.
    pub medians: Vec<f64>,
}

impl TrainedSuccessModel {
    /// Column names in matrix order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name().to_owned()).collect()
    }

    /// Builds the model's input matrix for `sessions`, imputing missing
    /// values with the stored training medians.
    #[must_use]
    pub fn feature_matrix(&self, sessions: &[SessionRecord]) -> Vec<Vec<f64>> {
        sessions
            .iter()
            .map(|record| {
                self.features
                    .iter()
                    .zip(&self.medians)
                    .map(|(feature, &fill)| feature.value(record).unwrap_or(fill))
                    .collect()
            })
            .collect()
    }

    /// Success probabilities for `sessions`, in [0, 1].
    #[must_use]
    pub fn predict(&self, sessions: &[SessionRecord]) -> Vec<f64> {
        self.model.predict_proba(&self.feature_matrix(sessions))
    }
}

/// Trains the success model on the outcome-labeled subset of `sessions`.
///
/// # Errors
///
/// Returns [`ValidationError::TooFewLabeled`] when fewer than
/// [`MIN_LABELED_SESSIONS`] sessions carry an outcome.
pub fn train_success_model(
    sessions: &[SessionRecord],
) -> Result<TrainedSuccessModel, ValidationError> {
    let features = Feature::MODEL_CANDIDATES.to_vec();

    let labeled: Vec<&SessionRecord> = sessions
        .iter()
        .filter(|s| s.success_flag.is_some())
        .collect();
    if labeled.len() < MIN_LABELED_SESSIONS {
        return Err(ValidationError::TooFewLabeled {
            available: labeled.len(),
            required: MIN_LABELED_SESSIONS,
        });
    }

    let labels: Vec<bool> = labeled.iter().map(|s| s.success_flag == Some(true)).collect();
    let (train_idx, val_idx) = split_labeled(&labels, SPLIT_SEED);

    // Imputation medians from the training split ONLY.
    let medians: Vec<f64> = features
        .iter()
        .map(|feature| {
            median(train_idx.iter().map(|&i| feature.value(labeled[i])))
                .unwrap_or(0.0)
        })
        .collect();

    let build_matrix = |indices: &[usize]| -> Vec<Vec<f64>> {
        indices
            .iter()
            .map(|&i| {
                features
                    .iter()
                    .zip(&medians)
                    .map(|(feature, &fill)| feature.value(labeled[i]).unwrap_or(fill))
                    .collect()
            })
            .collect()
    };
    let x_train = build_matrix(&train_idx);
    let y_train: Vec<bool> = train_idx.iter().map(|&i| labels[i]).collect();
    let x_val = build_matrix(&val_idx);
    let y_val: Vec<bool> = val_idx.iter().map(|&i| labels[i]).collect();

    let model = LogisticRegression::fit(&x_train, &y_train, &LogisticConfig::default())
        .ok_or(ValidationError::TooFewLabeled {
            available: labeled.len(),
            required: MIN_LABELED_SESSIONS,
        })?;

    let val_proba = model.predict_proba(&x_val);
    let val_auc = match roc_auc(&y_val, &val_proba) {
        Some(auc) => auc,
        None => {
            eprintln!(
                "warning: validation AUC undefined (single-class validation split); recording NaN"
            );
            f64::NAN
        }
    };

    Ok(TrainedSuccessModel {
        model,
        features,
        val_auc,
        medians,
    })
}

/// Splits labeled-session indices into (train, validation).
///
/// Stratified by label when both classes have at least two members, else a
/// plain shuffle split. Deterministic for a given label vector and seed;
/// both partitions are returned in ascending index order.
#[must_use]
pub fn split_labeled(labels: &[bool], seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = Pcg64::seed_from_u64(seed);
    let positives: Vec<usize> = (0..labels.len()).filter(|&i| labels[i]).collect();
    let negatives: Vec<usize> = (0..labels.len()).filter(|&i| !labels[i]).collect();

    let mut train = Vec::new();
    let mut val = Vec::new();
    if positives.len() >= 2 && negatives.len() >= 2 {
        for class in [negatives, positives] {
            let (class_train, class_val) = shuffle_split(class, &mut rng);
            train.extend(class_train);
            val.extend(class_val);
        }
    } else {
        let all: Vec<usize> = (0..labels.len()).collect();
        let (all_train, all_val) = shuffle_split(all, &mut rng);
        train = all_train;
        val = all_val;
    }
    train.sort_unstable();
    val.sort_unstable();
    (train, val)
}

fn shuffle_split(mut indices: Vec<usize>, rng: &mut Pcg64) -> (Vec<usize>, Vec<usize>) {
    indices.shuffle(rng);
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_val = ((indices.len() as f64 * VALIDATION_FRACTION).round() as usize)
        .clamp(1, indices.len().saturating_sub(1).max(1));
    let train = indices.split_off(n_val);
    (train, indices)
}
