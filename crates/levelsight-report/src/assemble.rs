//! Summary and per-level report construction
//!
//! Predictions for the full session table are recomputed here with the
//! training medians stored by the trainer; recomputing medians over the
//! full table would let validation rows influence imputation and
//! reintroduce the leakage the trainer was careful to avoid.
//!
//! The top-feature ranking is computed once, globally, and reused
//! identically in every level's report.

use std::collections::{BTreeMap, BTreeSet};

use levelsight_analysis::session::SessionRecord;
use levelsight_model::{classifier::Attributor, trainer::TrainedSuccessModel};
use levelsight_stats::descriptive::mean;
use serde::Serialize;

/// Maximum number of entries in the top-feature ranking.
pub const TOP_FEATURE_LIMIT: usize = 8;

/// Process-wide run summary, persisted as `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Number of raw telemetry events ingested.
    pub n_events: usize,
    /// Number of aggregated sessions.
    pub n_sessions: usize,
    /// Number of distinct players.
    pub n_players: usize,
    /// Number of distinct levels.
    pub n_levels: usize,
    /// Validation AUC of the success model; `null` when it was NaN.
    pub val_auc_success: Option<f64>,
    /// Feature columns the model was trained on.
    pub features_used: Vec<String>,
    /// Archetype cluster id → name.
    pub archetype_names: BTreeMap<usize, String>,
}

/// Per-level diagnostic report, persisted as `levels/level_<id>.json`.
#[derive(Debug, Clone, Serialize)]
pub struct LevelReport {
    /// Level identifier.
    pub level_id: String,
    /// Number of sessions played on this level.
    pub n_sessions: usize,
    /// Mean predicted success probability over the level's sessions.
    pub predicted_success_rate: Option<f64>,
    /// Fraction of the level's sessions per archetype name; fractions are
    /// rounded to 3 decimals and always sum to exactly 1.0.
    pub archetype_distribution: BTreeMap<String, f64>,
    /// The shared global top-feature ranking (identical across levels).
    pub top_features: Vec<(String, f64)>,
}

/// Writes `pred_success` for every record using the stored model.
pub fn apply_predictions(sessions: &mut [SessionRecord], trained: &TrainedSuccessModel) {
    let predictions = trained.predict(sessions);
    for (record, prediction) in sessions.iter_mut().zip(predictions) {
        record.pred_success = Some(prediction);
    }
}

/// Joins archetype names onto records from the cluster-id → name map.
pub fn join_archetype_names(sessions: &mut [SessionRecord], names: &BTreeMap<usize, String>) {
    for record in sessions {
        record.archetype_name = record
            .archetype
            .and_then(|id| names.get(&id))
            .cloned();
    }
}

/// Computes the global top-feature ranking: at most
/// [`TOP_FEATURE_LIMIT`] entries, sorted by descending importance, ties
/// broken by first-seen feature order.
///
/// Returns an empty ranking (with a stderr note) when the attribution
/// capability is unavailable.
#[must_use]
pub fn global_top_features(
    attributor: &dyn Attributor,
    trained: &TrainedSuccessModel,
    sessions: &[SessionRecord],
) -> Vec<(String, f64)> {
    let importance = attributor.global_importance(&trained.feature_matrix(sessions));
    if importance.is_empty() {
        eprintln!("warning: feature attribution unavailable; reports carry an empty ranking");
        return Vec::new();
    }

    let mut ranking: Vec<(String, f64)> = trained
        .feature_names()
        .into_iter()
        .zip(importance)
        .collect();
    // Stable sort: tied weights keep first-seen feature order.
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking.truncate(TOP_FEATURE_LIMIT);
    ranking
}

/// Builds the process-wide summary.
#[must_use]
pub fn build_summary(
    n_events: usize,
    sessions: &[SessionRecord],
    trained: &TrainedSuccessModel,
    archetype_names: &BTreeMap<usize, String>,
) -> Summary {
    let players: BTreeSet<&str> = sessions.iter().map(|s| s.player_id.as_str()).collect();
    let levels: BTreeSet<&str> = sessions.iter().map(|s| s.level_id.as_str()).collect();
    Summary {
        n_events,
        n_sessions: sessions.len(),
        n_players: players.len(),
        n_levels: levels.len(),
        val_auc_success: (!trained.val_auc.is_nan()).then_some(trained.val_auc),
        features_used: trained.feature_names(),
        archetype_names: archetype_names.clone(),
    }
}

/// Builds one report per distinct level id, in sorted level order.
///
/// Expects predictions applied and archetype names joined beforehand.
#[must_use]
pub fn build_level_reports(
    sessions: &[SessionRecord],
    top_features: &[(String, f64)],
) -> Vec<LevelReport> {
    let mut by_level: BTreeMap<&str, Vec<&SessionRecord>> = BTreeMap::new();
    for record in sessions {
        by_level.entry(&record.level_id).or_default().push(record);
    }

    by_level
        .into_iter()
        .map(|(level_id, group)| LevelReport {
            level_id: level_id.to_owned(),
            n_sessions: group.len(),
            predicted_success_rate: mean(group.iter().map(|s| s.pred_success)),
            archetype_distribution: archetype_distribution(&group),
            top_features: top_features.to_vec(),
        })
        .collect()
}

/// Archetype fractions rounded to 3 decimals.
///
/// Naive rounding can make the fractions sum to 0.999 or 1.001, so the
/// rounding deficit is redistributed to the largest remainders
/// (largest-remainder method); the published fractions always sum to
/// exactly 1.0.
fn archetype_distribution(group: &[&SessionRecord]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in group {
        let name = record.archetype_name.as_deref().unwrap_or("unknown");
        *counts.entry(name).or_default() += 1;
    }
    let total = group.len() as f64;

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut milli: Vec<(&str, u64, f64)> = counts
        .iter()
        .map(|(&name, &count)| {
            let exact = count as f64 / total * 1000.0;
            (name, exact.floor() as u64, exact - exact.floor())
        })
        .collect();

    let assigned: u64 = milli.iter().map(|(_, floor, _)| floor).sum();
    let deficit = 1000_u64.saturating_sub(assigned);
    // Ties in the remainder resolve by name order (counts is a BTreeMap).
    let mut by_remainder: Vec<usize> = (0..milli.len()).collect();
    by_remainder.sort_by(|&a, &b| milli[b].2.total_cmp(&milli[a].2));
    for &i in by_remainder.iter().take(deficit as usize) {
        milli[i].1 += 1;
    }

    #[expect(clippy::cast_precision_loss)]
    milli
        .into_iter()
        .map(|(name, thousandths, _)| (name.to_owned(), thousandths as f64 / 1000.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use levelsight_model::{classifier::NullAttributor, trainer::train_success_model};

    use super::*;

    fn session(index: usize, level: &str, success: bool, archetype: usize) -> SessionRecord {
        let mut record = SessionRecord::new(
            format!("S{index}"),
            format!("P{}", index % 4),
            level.into(),
        );
        record.success_flag = Some(success);
        record.session_time = Some(20.0 + index as f64);
        record.attempt_count = 1;
        record.action_count = 5 + (index as u64) % 9;
        record.mean_decision_time = Some(150.0 + 5.0 * index as f64);
        record.backtrack_ratio = Some(0.2);
        record.completion_time_ms = Some(20_000.0);
        record.archetype = Some(archetype);
        record
    }

    fn enriched_table() -> (Vec<SessionRecord>, TrainedSuccessModel, BTreeMap<usize, String>) {
        let mut sessions: Vec<_> = (0..24)
            .map(|i| {
                session(
                    i,
                    if i % 3 == 0 { "L0" } else { "L1" },
                    i % 2 == 0,
                    i % 2,
                )
            })
            .collect();
        let trained = train_success_model(&sessions).unwrap();
        let names: BTreeMap<usize, String> =
            [(0, "balanced".to_owned()), (1, "explorer".to_owned())].into();
        apply_predictions(&mut sessions, &trained);
        join_archetype_names(&mut sessions, &names);
        (sessions, trained, names)
    }

    #[test]
    fn test_predictions_applied_within_bounds() {
        let (sessions, _, _) = enriched_table();
        for record in &sessions {
            let p = record.pred_success.unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_summary_counts() {
        let (sessions, trained, names) = enriched_table();
        let summary = build_summary(240, &sessions, &trained, &names);
        assert_eq!(summary.n_events, 240);
        assert_eq!(summary.n_sessions, 24);
        assert_eq!(summary.n_players, 4);
        assert_eq!(summary.n_levels, 2);
        assert_eq!(summary.features_used, trained.feature_names());
        if let Some(auc) = summary.val_auc_success {
            assert!((0.0..=1.0).contains(&auc));
        }
    }

    #[test]
    fn test_level_reports_cover_levels_and_sum_to_one() {
        let (sessions, trained, _) = enriched_table();
        let ranking = global_top_features(&trained.model, &trained, &sessions);
        let reports = build_level_reports(&sessions, &ranking);
        assert_eq!(reports.len(), 2);
        for report in &reports {
            let sum: f64 = report.archetype_distribution.values().sum();
            assert!((sum - 1.0).abs() < 1e-6, "sum was {sum}");
            assert!(report.top_features.len() <= TOP_FEATURE_LIMIT);
            assert!(report.predicted_success_rate.is_some());
        }
        assert_eq!(reports[0].level_id, "L0");
        assert_eq!(reports[1].level_id, "L1");
    }

    #[test]
    fn test_top_features_sorted_descending() {
        let (sessions, trained, _) = enriched_table();
        let ranking = global_top_features(&trained.model, &trained, &sessions);
        assert!(!ranking.is_empty());
        assert!(ranking.len() <= TOP_FEATURE_LIMIT);
        for pair in ranking.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_null_attributor_degrades_to_empty_ranking() {
        let (sessions, trained, _) = enriched_table();
        let ranking = global_top_features(&NullAttributor, &trained, &sessions);
        assert!(ranking.is_empty());
        let reports = build_level_reports(&sessions, &ranking);
        assert!(reports.iter().all(|r| r.top_features.is_empty()));
    }

    #[test]
    fn test_distribution_rounding_sums_exactly() {
        // 3 archetypes over 7 sessions: naive 3-decimal rounding of
        // 3/7, 2/7, 2/7 sums to 0.999.
        let names: BTreeMap<usize, String> = [
            (0, "balanced".to_owned()),
            (1, "explorer".to_owned()),
            (2, "cautious".to_owned()),
        ]
        .into();
        let mut sessions: Vec<_> = (0..7).map(|i| session(i, "L0", true, i % 3)).collect();
        join_archetype_names(&mut sessions, &names);
        let group: Vec<&SessionRecord> = sessions.iter().collect();
        let distribution = archetype_distribution(&group);
        let sum: f64 = distribution.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // The two 2/7 fractions (remainder .714) take the extra
        // thousandths; 3/7 (remainder .571) keeps its floor.
        assert_eq!(distribution["balanced"], 0.428);
        assert_eq!(distribution["explorer"], 0.286);
        assert_eq!(distribution["cautious"], 0.286);
    }

    #[test]
    fn test_nan_auc_serializes_as_null() {
        let (sessions, mut trained, names) = enriched_table();
        trained.val_auc = f64::NAN;
        let summary = build_summary(10, &sessions, &trained, &names);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"val_auc_success\":null"));
    }
}
