//! Derivation against the producer-written sample snapshot.
//!
//! The sample `data.js` was produced from its own `ORDERS_DATA`, so deriving
//! KPIs from those orders must reproduce `SLA_DATA` exactly.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sla_core::validate;
use sla_kpi::{compute_sla_data, KpiConfig};
use sla_loader::load_file;
use std::path::PathBuf;

fn sample() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../sla-loader/tests/fixtures/sample_data.js")
}

#[test]
fn test_derivation_reproduces_sample_snapshot() {
    let (expected, orders) = load_file(sample()).unwrap().into_parts();
    let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();

    let derived = compute_sla_data(&orders, &KpiConfig::default(), today);

    assert_eq!(derived.summary, expected.summary);
    assert_eq!(derived.status, expected.status);
    assert_eq!(derived.top_suppliers, expected.top_suppliers);
    assert_eq!(derived.suppliers, expected.suppliers);
    assert_eq!(derived.top_projects, expected.top_projects);
    assert_eq!(derived.projects_orders, expected.projects_orders);
    assert_eq!(derived.equipment_distribution, expected.equipment_distribution);
    assert_eq!(derived.equipment_cost, expected.equipment_cost);
    assert_eq!(derived.monthly_trend, expected.monthly_trend);
    assert_eq!(derived, expected);
    assert!(validate(&derived).is_clean());
}

#[test]
fn test_hand_computed_summary() {
    let (_, orders) = load_file(sample()).unwrap().into_parts();
    let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    let summary = compute_sla_data(&orders, &KpiConfig::default(), today).summary;

    // Durations 2, 5, 2: two of three within 3 days.
    assert_eq!(summary.on_time_rate, 66.67);
    assert_eq!(summary.avg_duration, 3.0);
    assert_eq!(summary.median_duration, 2.0);
    assert_eq!(summary.p90_duration, 5.0);
    // 1250 + "SAR 4,100.50" + 2000
    assert_eq!(summary.total_amount.inner(), dec!(7350.50));
    assert_eq!(summary.open_orders, 2);
}

#[test]
fn test_tighter_threshold_lowers_on_time_rate() {
    let (_, orders) = load_file(sample()).unwrap().into_parts();
    let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    let config = KpiConfig {
        on_time_threshold_days: 1.0,
        ..Default::default()
    };

    assert_eq!(compute_sla_data(&orders, &config, today).summary.on_time_rate, 0.0);
}
