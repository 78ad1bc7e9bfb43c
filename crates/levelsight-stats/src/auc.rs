//! Rank-based ROC AUC
//!
//! Computed via the Mann-Whitney U statistic with average ranks for tied
//! scores, which matches the usual trapezoidal ROC integration without
//! materializing the curve.

/// Area under the ROC curve for binary `labels` against `scores`.
///
/// Returns `None` when the inputs are empty, have mismatched lengths, or
/// contain only a single class (AUC is undefined in those cases).
#[must_use]
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Option<f64> {
    if labels.is_empty() || labels.len() != scores.len() {
        return None;
    }
    let n_pos = labels.iter().filter(|&&l| l).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order = (0..scores.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average ranks within tied-score groups (1-based ranks).
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        #[expect(clippy::cast_precision_loss)]
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = labels
        .iter()
        .zip(&ranks)
        .filter_map(|(&label, &rank)| label.then_some(rank))
        .sum();
    #[expect(clippy::cast_precision_loss)]
    let (p, n) = (n_pos as f64, n_neg as f64);
    Some((rank_sum_pos - p * (p + 1.0) / 2.0) / (p * n))
}
