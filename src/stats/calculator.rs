//! Statistics Calculator Module
//! Handles descriptive statistics and the per-group aggregate functions.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics for one column or group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStats {
    pub group_name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// An aggregate function over the present values of one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Mean,
    Median,
    Min,
    Max,
    /// Number of present values.
    Count,
    /// Percentage (0-100) of values strictly below the threshold.
    ShareBelow(f64),
}

impl Statistic {
    /// Evaluate over present values only. `None` when there is nothing to aggregate.
    pub fn evaluate(&self, values: &[f64]) -> Option<f64> {
        match self {
            Statistic::Mean => StatsCalculator::mean(values),
            Statistic::Median => StatsCalculator::median(values),
            Statistic::Min => StatsCalculator::min(values),
            Statistic::Max => StatsCalculator::max(values),
            Statistic::Count => (!values.is_empty()).then_some(values.len() as f64),
            Statistic::ShareBelow(threshold) => StatsCalculator::share_below(values, *threshold),
        }
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> GroupStats {
        let n = values.len();
        if n == 0 {
            return GroupStats::default();
        }

        let sorted = Self::sorted(values);

        let std = if n > 1 { values.iter().std_dev() } else { f64::NAN };

        GroupStats {
            group_name: String::new(),
            count: n,
            mean: values.iter().sum::<f64>() / n as f64,
            std,
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Arithmetic mean, summed in slice order.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sorted = Self::sorted(values);
        let n = sorted.len();
        Some(if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        })
    }

    pub fn min(values: &[f64]) -> Option<f64> {
        values.iter().copied().reduce(f64::min)
    }

    pub fn max(values: &[f64]) -> Option<f64> {
        values.iter().copied().reduce(f64::max)
    }

    /// Percentage of values strictly below `threshold`.
    pub fn share_below(values: &[f64], threshold: f64) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let below = values.iter().filter(|&&v| v < threshold).count();
        Some(below as f64 / values.len() as f64 * 100.0)
    }

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}
