//! Monthly trend points.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// One month of order volume, keyed by `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    pub month: String,
    pub orders: u64,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
}

impl MonthlyTrendPoint {
    pub fn new(month: impl Into<String>, orders: u64, amount: Amount) -> Self {
        Self {
            month: month.into(),
            orders,
            amount,
            done: None,
            completion_rate: None,
        }
    }
}

/// True when months are strictly ascending, which is how the producer sorts them.
pub fn is_chronological(points: &[MonthlyTrendPoint]) -> bool {
    points.windows(2).all(|w| w[0].month < w[1].month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_point_without_optional_fields() {
        let point: MonthlyTrendPoint =
            serde_json::from_str(r#"{"month": "2025-02", "orders": 12, "amount": 4300.5}"#)
                .unwrap();
        assert_eq!(point.amount.inner(), dec!(4300.5));
        assert!(point.done.is_none());

        let out = serde_json::to_string(&point).unwrap();
        assert!(!out.contains("completion_rate"));
    }

    #[test]
    fn test_chronological_order() {
        let points = vec![
            MonthlyTrendPoint::new("2024-12", 1, Amount::ZERO),
            MonthlyTrendPoint::new("2025-01", 2, Amount::ZERO),
        ];
        assert!(is_chronological(&points));

        let reversed: Vec<_> = points.into_iter().rev().collect();
        assert!(!is_chronological(&reversed));
    }
}
