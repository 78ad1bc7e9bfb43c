//! Play-style archetype clustering and centroid labeling
//!
//! Sessions are clustered over standardized behavioral features, then each
//! cluster is named from its centroid's z-score profile via an ordered rule
//! list. The rules intentionally read relative to zero: a centroid at 0.3
//! on `action_count` means "clearly above the average session", not an
//! absolute action count.
//!
//! Names come only from centroid statistics, never from individual
//! sessions, so the label vocabulary stays stable as data grows.

use std::collections::BTreeMap;

use levelsight_stats::{
    descriptive::median,
    kmeans::{self, KMeansConfig},
    standardize::Standardizer,
};

use crate::{
    ValidationError,
    session::{Feature, SessionRecord},
};

/// Seed for k-means initialization; fixed so clustering is reproducible.
pub const CLUSTER_SEED: u64 = 42;

/// Centroid labeling rules, evaluated top to bottom; first match wins.
///
/// Thresholds are in standardized (z-score) units. Order is significant: a
/// centroid satisfying several rules takes the earliest label.
const LABEL_RULES: [(&str, fn(&CentroidProfile) -> bool); 3] = [
    ("explorer", |p| {
        p.get(Feature::ActionCount) > 0.3 && p.get(Feature::BacktrackRatio) > 0.3
    }),
    ("cautious", |p| {
        p.get(Feature::MeanDecisionTime) > 0.3 && p.get(Feature::BacktrackRatio) < -0.2
    }),
    ("greedy", |p| {
        p.get(Feature::ActionCount) > 0.3 && p.get(Feature::AttemptCount) < -0.2
    }),
];

/// Label for centroids matching no rule.
const DEFAULT_LABEL: &str = "balanced";

/// Standardized centroid coordinates keyed by behavioral feature.
struct CentroidProfile<'a> {
    features: &'a [Feature],
    coords: &'a [f64],
}

impl CentroidProfile<'_> {
    fn get(&self, feature: Feature) -> f64 {
        self.features
            .iter()
            .position(|&f| f == feature)
            .map_or(0.0, |i| self.coords[i])
    }
}

/// Archetype clustering stage.
#[derive(Debug, Clone, Copy)]
pub struct ArchetypeClusterer {
    /// Desired number of clusters.
    pub clusters: usize,
    /// Seed for k-means initialization.
    pub seed: u64,
}

impl ArchetypeClusterer {
    /// Clusterer with the standard fixed seed.
    #[must_use]
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            seed: CLUSTER_SEED,
        }
    }

    /// Clusters `sessions` into archetypes, writing each record's
    /// `archetype` id and returning the cluster-id → name mapping.
    ///
    /// Missing feature values are filled with the in-table median of their
    /// column (the success model's training medians are deliberately not
    /// used here; clustering is unsupervised and has no train/validation
    /// split to protect).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySessions`] for an empty table and
    /// [`ValidationError::BadClusterCount`] when the requested cluster
    /// count is zero or exceeds the session count. `clusters == n_sessions`
    /// is accepted (every session its own cluster).
    pub fn assign(
        &self,
        sessions: &mut [SessionRecord],
    ) -> Result<BTreeMap<usize, String>, ValidationError> {
        if sessions.is_empty() {
            return Err(ValidationError::EmptySessions);
        }
        if self.clusters == 0 || self.clusters > sessions.len() {
            return Err(ValidationError::BadClusterCount {
                requested: self.clusters,
                available: sessions.len(),
            });
        }

        let features = &Feature::BEHAVIORAL;
        let matrix = median_filled_matrix(sessions, features);
        let scaler = Standardizer::fit(&matrix).ok_or(ValidationError::EmptySessions)?;
        let standardized = scaler.transform(&matrix);

        let fit = kmeans::fit(&KMeansConfig::new(self.clusters, self.seed), &standardized)
            .ok_or(ValidationError::BadClusterCount {
                requested: self.clusters,
                available: sessions.len(),
            })?;

        for (record, &label) in sessions.iter_mut().zip(&fit.labels) {
            record.archetype = Some(label);
        }

        Ok(fit
            .centroids
            .iter()
            .enumerate()
            .map(|(id, coords)| {
                let profile = CentroidProfile {
                    features,
                    coords,
                };
                (id, label_centroid(&profile).to_owned())
            })
            .collect())
    }
}

fn label_centroid(profile: &CentroidProfile<'_>) -> &'static str {
    LABEL_RULES
        .iter()
        .find(|(_, applies)| applies(profile))
        .map_or(DEFAULT_LABEL, |(name, _)| name)
}

/// Feature matrix with per-column median fill for missing values; a column
/// with no observed value at all falls back to zero.
fn median_filled_matrix(sessions: &[SessionRecord], features: &[Feature]) -> Vec<Vec<f64>> {
    let fills: Vec<f64> = features
        .iter()
        .map(|f| median(sessions.iter().map(|s| f.value(s))).unwrap_or(0.0))
        .collect();
    sessions
        .iter()
        .map(|record| {
            features
                .iter()
                .zip(&fills)
                .map(|(f, &fill)| f.value(record).unwrap_or(fill))
                .collect()
        })
        .collect()
}
