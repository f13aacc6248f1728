//! Payments derivation from job order records.
//!
//! Only invoice-applicable orders count. Leaderboards here rank order counts;
//! rows without a name are left out rather than bucketed.

use chrono::NaiveDate;
use sla_core::{
    non_empty, Amount, CellValue, InvoiceTrendPoint, OrderRecord, PaymentStatusCounts,
    PaymentsData, PaymentsSummary,
};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::KpiConfig;
use crate::parse::{order_cost, parse_days};
use crate::stats::{mean, round1};
use crate::tally::Tally;

/// Payment states counted as pending.
pub const PENDING_STATES: [&str; 3] = ["Pending Approval", "Pending", "Under Review"];

/// Derive the `PAYMENTS_DATA` payload from `orders`.
///
/// Untracked orders (no job order number) are skipped as in
/// [`compute_sla_data`](crate::compute_sla_data).
pub fn compute_payments_data(
    orders: &[OrderRecord],
    config: &KpiConfig,
    today: NaiveDate,
) -> PaymentsData {
    let invoiced: Vec<&OrderRecord> = orders
        .iter()
        .filter(|o| o.is_tracked() && o.is_invoiced())
        .collect();
    let total = invoiced.len() as u64;

    let paid = invoiced
        .iter()
        .filter(|o| o.payment_status.as_deref() == Some("Paid"))
        .count() as u64;
    let pending = invoiced
        .iter()
        .filter(|o| {
            o.payment_status
                .as_deref()
                .is_some_and(|s| PENDING_STATES.contains(&s))
        })
        .count() as u64;
    let other = total - paid - pending;

    let total_amount: Amount = invoiced
        .iter()
        .filter(|o| o.cost.as_ref().is_some_and(|c| c.is_truthy()))
        .map(|o| order_cost(o.cost.as_ref()))
        .sum();

    let completion = day_samples(invoiced.iter().map(|o| o.completion_days.as_ref()));
    let payment_cycle = day_samples(invoiced.iter().map(|o| o.payment_cycle_days.as_ref()));
    let invoice_receive = day_samples(invoiced.iter().map(|o| o.invoice_receive_days.as_ref()));

    let payment_rate = if total == 0 {
        0.0
    } else {
        paid as f64 / total as f64 * 100.0
    };

    let mut suppliers: Tally<u64> = Tally::default();
    let mut projects: Tally<u64> = Tally::default();
    let mut equipment: Tally<u64> = Tally::default();
    let mut requesters: Tally<u64> = Tally::default();
    let mut months: BTreeMap<String, (u64, Amount)> = BTreeMap::new();

    for order in &invoiced {
        if let Some(name) = non_empty(&order.supplier) {
            suppliers.add(name, 1);
        }
        if let Some(name) = non_empty(&order.project) {
            projects.add(name, 1);
        }
        if let Some(name) = non_empty(&order.equipment_type) {
            equipment.add(name, 1);
        }
        if let Some(name) = non_empty(&order.requester) {
            requesters.add(name, 1);
        }
        if let Some(month) = order.month() {
            let entry = months.entry(month.to_string()).or_default();
            entry.0 += 1;
            entry.1 += order_cost(order.cost.as_ref());
        }
    }

    let data = PaymentsData {
        summary: PaymentsSummary {
            total_invoices: total,
            paid_invoices: paid,
            pending_invoices: pending,
            other_status: other,
            total_amount: total_amount.round_dp(2),
            avg_completion_days: round1(mean(&completion)),
            avg_payment_cycle: round1(mean(&payment_cycle)),
            avg_invoice_receive: round1(mean(&invoice_receive)),
            payment_rate: round1(payment_rate),
            last_update: today,
        },
        payment_status: PaymentStatusCounts {
            paid,
            pending,
            other,
        },
        suppliers: suppliers.ranked(config.payment_supplier_limit),
        projects: projects.ranked(config.project_limit),
        equipment_requested: equipment.ranked(config.equipment_limit),
        requesters: requesters.ranked(config.requester_limit),
        monthly_trend: months
            .into_iter()
            .map(|(month, (invoices, amount))| InvoiceTrendPoint {
                month,
                invoices,
                amount,
            })
            .collect(),
    };

    debug!(
        total_invoices = data.summary.total_invoices,
        paid = paid,
        pending = pending,
        payment_rate = data.summary.payment_rate,
        "Derived payments snapshot"
    );

    data
}

/// Day counts from the truthy cells.
fn day_samples<'a>(cells: impl Iterator<Item = Option<&'a CellValue>>) -> Vec<f64> {
    cells.flatten().filter(|c| c.is_truthy()).map(parse_days).collect()
}
