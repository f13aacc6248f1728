//! Completion-time statistics.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Summary statistics over completion durations, in days.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationStats {
    pub count: usize,
    pub avg: f64,
    pub median: f64,
    pub p90: f64,
    /// Share of durations within the on-time threshold, as a percentage.
    pub on_time_rate: f64,
}

impl DurationStats {
    /// Compute statistics over `durations`. An empty input yields all zeroes.
    ///
    /// Percentiles use the nearest-rank-below convention the dashboard was
    /// built on: `median = sorted[n / 2]`, `p90 = sorted[floor(n * 0.9)]`.
    pub fn from_durations(durations: &[f64], on_time_threshold: f64) -> Self {
        if durations.is_empty() {
            return Self::default();
        }

        let mut sorted = durations.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        let total: f64 = sorted.iter().sum();
        let on_time = sorted.iter().filter(|d| **d <= on_time_threshold).count();
        let p90_index = ((n as f64 * 0.9) as usize).min(n - 1);

        Self {
            count: n,
            avg: round2(total / n as f64),
            median: sorted[n / 2],
            p90: sorted[p90_index],
            on_time_rate: round2(on_time as f64 / n as f64 * 100.0),
        }
    }
}

/// Round to two decimal places, ties to even on the exact binary value.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round to one decimal place, same convention as [`round2`].
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

fn round_to(value: f64, dp: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(dp))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Arithmetic mean, zero for no samples.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
