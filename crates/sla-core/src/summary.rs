//! Summary counters and status breakdown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;

/// Aggregate counters and duration statistics for one reporting period.
///
/// Durations are in days. `on_time_rate` and `completion_rate` are
/// percentages in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_orders: u64,
    pub done_orders: u64,
    pub in_progress_orders: u64,
    pub not_done_orders: u64,
    /// Share of timed orders completed within the SLA window, in percent.
    pub on_time_rate: f64,
    pub total_amount: Amount,
    pub avg_duration: f64,
    pub median_duration: f64,
    pub p90_duration: f64,
    pub open_orders: u64,
    pub last_update: NaiveDate,
    /// Only written by the JSON producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
}

impl Summary {
    /// All-zero summary stamped with `last_update`.
    pub fn empty(last_update: NaiveDate) -> Self {
        Self {
            total_orders: 0,
            done_orders: 0,
            in_progress_orders: 0,
            not_done_orders: 0,
            on_time_rate: 0.0,
            total_amount: Amount::ZERO,
            avg_duration: 0.0,
            median_duration: 0.0,
            p90_duration: 0.0,
            open_orders: 0,
            last_update,
            completion_rate: None,
        }
    }

    /// Sum of the three per-status counters. Widened so that counters near
    /// `u64::MAX` cannot overflow.
    pub fn classified_orders(&self) -> u128 {
        u128::from(self.done_orders)
            + u128::from(self.in_progress_orders)
            + u128::from(self.not_done_orders)
    }
}

/// The fixed status label set used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLabel {
    Done,
    InProgress,
    NotDone,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 3] = [Self::Done, Self::InProgress, Self::NotDone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "Done",
            Self::InProgress => "In Progress",
            Self::NotDone => "Not Done",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order counts per status label. All three labels are required on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "Done")]
    pub done: u64,
    #[serde(rename = "In Progress")]
    pub in_progress: u64,
    #[serde(rename = "Not Done")]
    pub not_done: u64,
}

impl StatusCounts {
    pub fn get(&self, label: StatusLabel) -> u64 {
        match label {
            StatusLabel::Done => self.done,
            StatusLabel::InProgress => self.in_progress,
            StatusLabel::NotDone => self.not_done,
        }
    }

    /// Sum over all labels, widened like [`Summary::classified_orders`].
    pub fn sum(&self) -> u128 {
        u128::from(self.done) + u128::from(self.in_progress) + u128::from(self.not_done)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusLabel, u64)> + '_ {
        StatusLabel::ALL.into_iter().map(|l| (l, self.get(l)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_use_dashboard_labels() {
        let json = r#"{"Done": 3, "In Progress": 2, "Not Done": 1}"#;
        let counts: StatusCounts = serde_json::from_str(json).unwrap();

        assert_eq!(counts.get(StatusLabel::Done), 3);
        assert_eq!(counts.get(StatusLabel::InProgress), 2);
        assert_eq!(counts.sum(), 6);

        let out = serde_json::to_string(&counts).unwrap();
        assert_eq!(out, r#"{"Done":3,"In Progress":2,"Not Done":1}"#);
    }

    #[test]
    fn test_status_counts_require_every_label() {
        let json = r#"{"Done": 3, "In Progress": 2}"#;
        let err = serde_json::from_str::<StatusCounts>(json).unwrap_err();
        assert!(err.to_string().contains("Not Done"));
    }

    #[test]
    fn test_summary_parses_producer_shape() {
        let json = r#"{
            "total_orders": 10,
            "done_orders": 6,
            "in_progress_orders": 3,
            "not_done_orders": 1,
            "on_time_rate": 83.33,
            "total_amount": 12500.75,
            "avg_duration": 2.4,
            "median_duration": 2,
            "p90_duration": 5,
            "open_orders": 4,
            "last_update": "2025-03-01"
        }"#;
        let summary: Summary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.classified_orders(), 10);
        assert_eq!(summary.median_duration, 2.0);
        assert_eq!(summary.last_update, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(summary.completion_rate.is_none());
    }

    #[test]
    fn test_summary_rejects_negative_counter() {
        let mut value = serde_json::to_value(Summary::empty(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        ))
        .unwrap();
        value["done_orders"] = serde_json::json!(-1);
        assert!(serde_json::from_value::<Summary>(value).is_err());
    }
}
