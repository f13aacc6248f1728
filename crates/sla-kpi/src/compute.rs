//! Snapshot derivation from job order records.

use chrono::NaiveDate;
use sla_core::{
    non_empty, Amount, Leaderboard, MonthlyTrendPoint, OrderRecord, SlaData, StatusCounts,
    Summary,
};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::KpiConfig;
use crate::parse::{order_cost, parse_days};
use crate::stats::{round2, DurationStats};
use crate::tally::Tally;

/// Bucket for orders that carry no name in an amount-ranked column.
pub const UNKNOWN: &str = "Unknown";

/// Derive the full SLA snapshot from `orders`.
///
/// Orders without a job order number are not tracked and are skipped.
/// `today` becomes `summary.last_update`.
pub fn compute_sla_data(orders: &[OrderRecord], config: &KpiConfig, today: NaiveDate) -> SlaData {
    let tracked: Vec<&OrderRecord> = orders.iter().filter(|o| o.is_tracked()).collect();
    if tracked.len() < orders.len() {
        debug!(
            skipped = orders.len() - tracked.len(),
            "Skipping orders without a job order number"
        );
    }

    let status = classify(&tracked);

    let durations: Vec<f64> = tracked
        .iter()
        .filter_map(|o| o.completion_days.as_ref())
        .filter(|cell| cell.is_truthy())
        .map(parse_days)
        .collect();
    let stats = DurationStats::from_durations(&durations, config.on_time_threshold_days);

    let total_amount: Amount = tracked
        .iter()
        .filter(|o| o.cost.as_ref().is_some_and(|c| c.is_truthy()))
        .map(|o| order_cost(o.cost.as_ref()))
        .sum();

    let summary = Summary {
        total_orders: tracked.len() as u64,
        done_orders: status.done,
        in_progress_orders: status.in_progress,
        not_done_orders: status.not_done,
        on_time_rate: stats.on_time_rate,
        total_amount: total_amount.round_dp(2),
        avg_duration: stats.avg,
        median_duration: stats.median,
        p90_duration: stats.p90,
        open_orders: tracked.iter().filter(|o| !o.is_completed()).count() as u64,
        last_update: today,
        completion_rate: None,
    };

    let mut supplier_orders: Tally<u64> = Tally::default();
    let mut supplier_amounts: Tally<Amount> = Tally::default();
    let mut project_orders: Tally<u64> = Tally::default();
    let mut project_amounts: Tally<Amount> = Tally::default();
    let mut equipment_orders: Tally<u64> = Tally::default();
    let mut equipment_amounts: Tally<Amount> = Tally::default();
    let mut months: BTreeMap<String, (u64, Amount)> = BTreeMap::new();

    for order in &tracked {
        let cost = order_cost(order.cost.as_ref());
        let supplier = non_empty(&order.supplier);
        let project = non_empty(&order.project);
        let equipment = non_empty(&order.equipment_type);

        if let Some(name) = supplier {
            supplier_orders.add(name, 1);
        }
        if let Some(name) = project {
            project_orders.add(name, 1);
        }
        if let Some(name) = equipment {
            equipment_orders.add(name, 1);
        }

        supplier_amounts.add(supplier.unwrap_or(UNKNOWN), cost);
        project_amounts.add(project.unwrap_or(UNKNOWN), cost);
        equipment_amounts.add(equipment.unwrap_or(UNKNOWN), cost);

        if let Some(month) = order.month() {
            let entry = months.entry(month.to_string()).or_default();
            entry.0 += 1;
            entry.1 += cost;
        }
    }

    let top_projects = project_amounts.ranked(config.project_limit);
    let equipment_distribution = equipment_orders.ranked(config.equipment_limit);

    let data = SlaData {
        summary,
        status,
        top_suppliers: supplier_orders.ranked(config.supplier_limit),
        top_projects: top_projects.clone(),
        equipment_distribution: equipment_distribution.clone(),
        monthly_trend: months
            .into_iter()
            .map(|(month, (orders, amount))| MonthlyTrendPoint::new(month, orders, amount))
            .collect(),
        suppliers: supplier_amounts.ranked(config.supplier_limit),
        projects_orders: project_orders.ranked(config.project_limit),
        projects_amounts: top_projects,
        equipment_count: equipment_distribution,
        equipment_cost: equipment_amounts.ranked(config.equipment_limit),
        company_breakdown: Leaderboard::new(),
    };

    debug!(
        total_orders = data.summary.total_orders,
        done = data.status.done,
        durations = stats.count,
        on_time_rate = data.summary.on_time_rate,
        total_amount = %data.summary.total_amount,
        months = data.monthly_trend.len(),
        "Derived SLA snapshot"
    );

    data
}

/// Completion rate over orders, as a percentage with two decimals.
pub fn completion_rate(status: &StatusCounts) -> f64 {
    let total = status.sum();
    if total == 0 {
        return 0.0;
    }
    round2(status.done as f64 / total as f64 * 100.0)
}

fn classify(orders: &[&OrderRecord]) -> StatusCounts {
    let mut status = StatusCounts::default();
    for order in orders {
        match (order.was_performed(), order.is_completed()) {
            (true, true) => status.done += 1,
            (true, false) => status.in_progress += 1,
            (false, _) => status.not_done += 1,
        }
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sla_core::{validate, CellValue};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
    }

    fn order(no: &str) -> OrderRecord {
        OrderRecord::new(no)
    }

    #[test]
    fn test_no_orders_yields_empty_snapshot() {
        let data = compute_sla_data(&[], &KpiConfig::default(), today());
        assert_eq!(data, SlaData::empty(Summary::empty(today())));
        assert!(validate(&data).is_clean());
    }

    #[test]
    fn test_status_classification() {
        let mut done = order("JO-1");
        done.performed = Some("Yes".to_string());
        done.completion_date = Some("2025-01-02".to_string());

        let mut in_progress = order("JO-2");
        in_progress.performed = Some("Yes".to_string());

        // Completed but not by logistics.
        let mut external = order("JO-3");
        external.performed = Some("No".to_string());
        external.completion_date = Some("2025-01-05".to_string());

        let data = compute_sla_data(
            &[done, in_progress, external],
            &KpiConfig::default(),
            today(),
        );

        assert_eq!(data.status.done, 1);
        assert_eq!(data.status.in_progress, 1);
        assert_eq!(data.status.not_done, 1);
        assert_eq!(data.summary.open_orders, 1);
        assert_eq!(data.summary.total_orders, 3);
        assert!(validate(&data).is_clean());
    }

    #[test]
    fn test_orders_without_job_number_are_skipped() {
        let untracked = OrderRecord::new("");
        let data = compute_sla_data(&[untracked, order("JO-1")], &KpiConfig::default(), today());
        assert_eq!(data.summary.total_orders, 1);
    }

    #[test]
    fn test_unreadable_duration_counts_as_zero() {
        let mut a = order("JO-1");
        a.completion_days = Some(CellValue::from("n/a"));
        let mut b = order("JO-2");
        b.completion_days = Some(CellValue::from(6));
        // Zero is not a recorded duration.
        let mut c = order("JO-3");
        c.completion_days = Some(CellValue::from(0));

        let data = compute_sla_data(&[a, b, c], &KpiConfig::default(), today());
        assert_eq!(data.summary.avg_duration, 3.0);
        assert_eq!(data.summary.median_duration, 6.0);
        assert_eq!(data.summary.on_time_rate, 50.0);
    }

    #[test]
    fn test_missing_names_bucket_amounts_under_unknown() {
        let mut named = order("JO-1");
        named.supplier = Some("Bahri".to_string());
        named.cost = Some(CellValue::from(100));
        let mut anonymous = order("JO-2");
        anonymous.cost = Some(CellValue::from(400));

        let data = compute_sla_data(&[named, anonymous], &KpiConfig::default(), today());

        // Counts only cover named orders; amounts keep every order.
        assert_eq!(data.top_suppliers.len(), 1);
        let suppliers: Vec<&str> = data.suppliers.names().collect();
        assert_eq!(suppliers, vec![UNKNOWN, "Bahri"]);
        assert_eq!(data.top_projects.get(UNKNOWN).unwrap().inner(), dec!(500));
        assert!(data.equipment_distribution.is_empty());
    }

    #[test]
    fn test_leaderboard_limits_and_ties() {
        let orders: Vec<OrderRecord> = (0..12)
            .map(|i| {
                let mut o = order(&format!("JO-{i}"));
                o.supplier = Some(format!("Supplier {i}"));
                o
            })
            .collect();
        let config = KpiConfig {
            supplier_limit: 3,
            ..Default::default()
        };

        let data = compute_sla_data(&orders, &config, today());
        let names: Vec<&str> = data.top_suppliers.names().collect();
        // All tied at 1: first seen wins.
        assert_eq!(names, vec!["Supplier 0", "Supplier 1", "Supplier 2"]);
    }

    #[test]
    fn test_monthly_trend_sorted_by_month() {
        let mut march = order("JO-1");
        march.job_order_date = Some("2025-03-04".to_string());
        march.cost = Some(CellValue::from("200"));
        let mut january = order("JO-2");
        january.job_order_date = Some("2025-01-20T08:00:00".to_string());
        let mut undated = order("JO-3");
        undated.cost = Some(CellValue::from(999));

        let data = compute_sla_data(&[march, january, undated], &KpiConfig::default(), today());

        let months: Vec<&str> = data.monthly_trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2025-01", "2025-03"]);
        assert_eq!(data.monthly_trend[1].amount.inner(), dec!(200));
        assert_eq!(data.summary.total_amount.inner(), dec!(1199));
    }

    #[test]
    fn test_total_amount_rounds_to_cents() {
        let mut a = order("JO-1");
        a.cost = Some(CellValue::from("10.004"));
        let mut b = order("JO-2");
        b.cost = Some(CellValue::from("0.003"));

        let data = compute_sla_data(&[a, b], &KpiConfig::default(), today());
        assert_eq!(data.summary.total_amount.inner(), dec!(10.01));
    }

    #[test]
    fn test_completion_rate() {
        let status = StatusCounts {
            done: 2,
            in_progress: 1,
            not_done: 0,
        };
        assert_eq!(completion_rate(&status), 66.67);
        assert_eq!(completion_rate(&StatusCounts::default()), 0.0);
    }
}
