//! Snapshot invariant checks.
//!
//! Validation only reports. A snapshot that breaks an invariant is never
//! patched up here; the caller decides whether to serve it or reject it.

use std::fmt;

use crate::leaderboard::Leaderboard;
use crate::snapshot::SlaData;
use crate::summary::StatusLabel;
use crate::trend::is_chronological;

/// Upper bound of a percentage field.
pub const PERCENT_MAX: f64 = 100.0;

/// A broken snapshot invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Status breakdown does not add up to `summary.total_orders`.
    StatusTotalMismatch { status_sum: u128, total_orders: u64 },
    /// done + in progress + not done exceeds `summary.total_orders`.
    CountsExceedTotal { classified: u128, total_orders: u64 },
    /// A status bucket disagrees with the matching summary counter.
    StatusCounterMismatch {
        label: StatusLabel,
        status: u64,
        summary: u64,
    },
    OpenOrdersExceedTotal { open_orders: u64, total_orders: u64 },
    /// A percentage outside `[0, 100]` or not finite.
    RateOutOfRange { field: &'static str, value: f64 },
    /// A duration that is negative or not finite.
    InvalidDuration { field: &'static str, value: f64 },
    /// p90 below the median.
    PercentileOrder { median: f64, p90: f64 },
    NegativeAmount { field: String },
    /// Leaderboard scores increase somewhere along the ranking.
    UnrankedLeaderboard { field: &'static str },
    /// Monthly trend months are not strictly ascending.
    TrendOutOfOrder,
}

impl Violation {
    /// Stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StatusTotalMismatch { .. } => "status_total_mismatch",
            Self::CountsExceedTotal { .. } => "counts_exceed_total",
            Self::StatusCounterMismatch { .. } => "status_counter_mismatch",
            Self::OpenOrdersExceedTotal { .. } => "open_orders_exceed_total",
            Self::RateOutOfRange { .. } => "rate_out_of_range",
            Self::InvalidDuration { .. } => "invalid_duration",
            Self::PercentileOrder { .. } => "percentile_order",
            Self::NegativeAmount { .. } => "negative_amount",
            Self::UnrankedLeaderboard { .. } => "unranked_leaderboard",
            Self::TrendOutOfOrder => "trend_out_of_order",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusTotalMismatch {
                status_sum,
                total_orders,
            } => write!(
                f,
                "status counts sum to {status_sum} but total_orders is {total_orders}"
            ),
            Self::CountsExceedTotal {
                classified,
                total_orders,
            } => write!(
                f,
                "done + in_progress + not_done = {classified} exceeds total_orders {total_orders}"
            ),
            Self::StatusCounterMismatch {
                label,
                status,
                summary,
            } => write!(
                f,
                "status[\"{label}\"] is {status} but the summary counter is {summary}"
            ),
            Self::OpenOrdersExceedTotal {
                open_orders,
                total_orders,
            } => write!(
                f,
                "open_orders {open_orders} exceeds total_orders {total_orders}"
            ),
            Self::RateOutOfRange { field, value } => {
                write!(f, "{field} = {value} is outside [0, {PERCENT_MAX}]")
            }
            Self::InvalidDuration { field, value } => {
                write!(f, "{field} = {value} is not a non-negative duration")
            }
            Self::PercentileOrder { median, p90 } => {
                write!(f, "p90_duration {p90} is below median_duration {median}")
            }
            Self::NegativeAmount { field } => write!(f, "{field} is negative"),
            Self::UnrankedLeaderboard { field } => write!(f, "{field} is not ranked by score"),
            Self::TrendOutOfOrder => write!(f, "monthly_trend months are not ascending"),
        }
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

/// Check every snapshot invariant and collect the violations.
pub fn validate(data: &SlaData) -> ValidationReport {
    let mut report = ValidationReport::default();
    let summary = &data.summary;

    let status_sum = data.status.sum();
    if status_sum != u128::from(summary.total_orders) {
        report.push(Violation::StatusTotalMismatch {
            status_sum,
            total_orders: summary.total_orders,
        });
    }

    let classified = summary.classified_orders();
    if classified > u128::from(summary.total_orders) {
        report.push(Violation::CountsExceedTotal {
            classified,
            total_orders: summary.total_orders,
        });
    }

    for (label, counter) in [
        (StatusLabel::Done, summary.done_orders),
        (StatusLabel::InProgress, summary.in_progress_orders),
        (StatusLabel::NotDone, summary.not_done_orders),
    ] {
        let status = data.status.get(label);
        if status != counter {
            report.push(Violation::StatusCounterMismatch {
                label,
                status,
                summary: counter,
            });
        }
    }

    if summary.open_orders > summary.total_orders {
        report.push(Violation::OpenOrdersExceedTotal {
            open_orders: summary.open_orders,
            total_orders: summary.total_orders,
        });
    }

    check_rate(&mut report, "on_time_rate", summary.on_time_rate);
    if let Some(rate) = summary.completion_rate {
        check_rate(&mut report, "completion_rate", rate);
    }

    let durations = [
        ("avg_duration", summary.avg_duration),
        ("median_duration", summary.median_duration),
        ("p90_duration", summary.p90_duration),
    ];
    let mut durations_ok = true;
    for (field, value) in durations {
        if !value.is_finite() || value < 0.0 {
            durations_ok = false;
            report.push(Violation::InvalidDuration { field, value });
        }
    }
    if durations_ok && summary.p90_duration < summary.median_duration {
        report.push(Violation::PercentileOrder {
            median: summary.median_duration,
            p90: summary.p90_duration,
        });
    }

    if summary.total_amount.is_negative() {
        report.push(Violation::NegativeAmount {
            field: "summary.total_amount".to_string(),
        });
    }
    for (name, amount) in data.top_projects.iter() {
        if amount.is_negative() {
            report.push(Violation::NegativeAmount {
                field: format!("top_projects[\"{name}\"]"),
            });
        }
    }
    for point in &data.monthly_trend {
        if point.amount.is_negative() {
            report.push(Violation::NegativeAmount {
                field: format!("monthly_trend[\"{}\"].amount", point.month),
            });
        }
    }

    check_ranked(&mut report, "top_suppliers", &data.top_suppliers);
    check_ranked(&mut report, "top_projects", &data.top_projects);
    check_ranked(&mut report, "equipment_distribution", &data.equipment_distribution);

    if !is_chronological(&data.monthly_trend) {
        report.push(Violation::TrendOutOfOrder);
    }

    report
}

fn check_rate(report: &mut ValidationReport, field: &'static str, value: f64) {
    if !value.is_finite() || !(0.0..=PERCENT_MAX).contains(&value) {
        report.push(Violation::RateOutOfRange { field, value });
    }
}

fn check_ranked<V: PartialOrd>(
    report: &mut ValidationReport,
    field: &'static str,
    board: &Leaderboard<V>,
) {
    if !board.is_ranked() {
        report.push(Violation::UnrankedLeaderboard { field });
    }
}
