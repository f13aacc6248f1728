//! Payments dashboard payload.
//!
//! Covers the invoice-applicable subset of the job orders. Written next to
//! the SLA payload as `PAYMENTS_DATA`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::leaderboard::Leaderboard;

/// Invoice counters and averages. Day averages and `payment_rate` carry one
/// decimal; `payment_rate` is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentsSummary {
    pub total_invoices: u64,
    pub paid_invoices: u64,
    pub pending_invoices: u64,
    pub other_status: u64,
    pub total_amount: Amount,
    pub avg_completion_days: f64,
    pub avg_payment_cycle: f64,
    pub avg_invoice_receive: f64,
    pub payment_rate: f64,
    pub last_update: NaiveDate,
}

impl PaymentsSummary {
    pub fn empty(last_update: NaiveDate) -> Self {
        Self {
            total_invoices: 0,
            paid_invoices: 0,
            pending_invoices: 0,
            other_status: 0,
            total_amount: Amount::ZERO,
            avg_completion_days: 0.0,
            avg_payment_cycle: 0.0,
            avg_invoice_receive: 0.0,
            payment_rate: 0.0,
            last_update,
        }
    }
}

/// Invoice counts per payment state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusCounts {
    #[serde(rename = "Paid")]
    pub paid: u64,
    /// Every pending-like state ("Pending Approval", "Pending", "Under Review").
    #[serde(rename = "Pending Approval")]
    pub pending: u64,
    #[serde(rename = "Other")]
    pub other: u64,
}

/// Invoices raised in one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTrendPoint {
    pub month: String,
    pub invoices: u64,
    pub amount: Amount,
}

/// The `PAYMENTS_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentsData {
    pub summary: PaymentsSummary,
    pub payment_status: PaymentStatusCounts,
    pub suppliers: Leaderboard<u64>,
    pub projects: Leaderboard<u64>,
    pub equipment_requested: Leaderboard<u64>,
    pub requesters: Leaderboard<u64>,
    pub monthly_trend: Vec<InvoiceTrendPoint>,
}

impl PaymentsData {
    pub fn empty(last_update: NaiveDate) -> Self {
        Self {
            summary: PaymentsSummary::empty(last_update),
            payment_status: PaymentStatusCounts::default(),
            suppliers: Leaderboard::new(),
            projects: Leaderboard::new(),
            equipment_requested: Leaderboard::new(),
            requesters: Leaderboard::new(),
            monthly_trend: Vec::new(),
        }
    }
}
