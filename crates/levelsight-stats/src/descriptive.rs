//! Descriptive statistics over `f64` datasets with missing-value handling
//!
//! Telemetry-derived feature columns routinely contain gaps (events without
//! timestamps, sessions without actions), so the entry points here accept
//! `Option<f64>` iterators and ignore `None` and non-finite values rather
//! than poisoning the result.

/// Summary statistics for a single feature column.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// The minimum observed value.
    pub min: f64,
    /// The maximum observed value.
    pub max: f64,
    /// The arithmetic mean.
    pub mean: f64,
    /// The median (average of the two middle values for even counts).
    pub median: f64,
    /// The population standard deviation.
    pub std_dev: f64,
    /// Number of finite values the statistics were computed from.
    pub count: usize,
}

impl DescriptiveStats {
    /// Computes statistics over the finite values of `values`.
    ///
    /// Returns `None` if no finite value remains after filtering.
    #[must_use]
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut finite = values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);

        let count = finite.len();
        #[expect(clippy::cast_precision_loss)]
        let n = count as f64;
        let min = finite[0];
        let max = finite[count - 1];
        let mean = finite.iter().sum::<f64>() / n;
        let median = median_of_sorted(&finite);
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
            count,
        })
    }
}

/// Mean of the finite values, or `None` if there are none.
#[must_use]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut count = 0_usize;
    for v in values.into_iter().flatten().filter(|v| v.is_finite()) {
        sum += v;
        count += 1;
    }
    #[expect(clippy::cast_precision_loss)]
    (count > 0).then(|| sum / count as f64)
}

/// Median of the finite values, or `None` if there are none.
#[must_use]
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut finite = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    Some(median_of_sorted(&finite))
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
