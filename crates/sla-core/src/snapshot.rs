//! The snapshot payload consumed by the SLA dashboard.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::leaderboard::Leaderboard;
use crate::order::OrderRecord;
use crate::payments::PaymentsData;
use crate::summary::{StatusCounts, Summary};
use crate::trend::MonthlyTrendPoint;

/// Summary-bearing structure bound to `SLA_DATA`.
///
/// The first six fields are the dashboard contract and are required on
/// load. The remaining leaderboards are written by the producer for the
/// drill-down views and default to empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaData {
    pub summary: Summary,
    pub status: StatusCounts,
    /// Supplier -> order count.
    pub top_suppliers: Leaderboard<u64>,
    /// Project -> total cost.
    pub top_projects: Leaderboard<Amount>,
    /// Equipment type -> order count.
    pub equipment_distribution: Leaderboard<u64>,
    pub monthly_trend: Vec<MonthlyTrendPoint>,

    /// Supplier -> total cost.
    #[serde(default, skip_serializing_if = "Leaderboard::is_empty")]
    pub suppliers: Leaderboard<Amount>,
    /// Project -> order count.
    #[serde(default, skip_serializing_if = "Leaderboard::is_empty")]
    pub projects_orders: Leaderboard<u64>,
    #[serde(default, skip_serializing_if = "Leaderboard::is_empty")]
    pub projects_amounts: Leaderboard<Amount>,
    #[serde(default, skip_serializing_if = "Leaderboard::is_empty")]
    pub equipment_count: Leaderboard<u64>,
    #[serde(default, skip_serializing_if = "Leaderboard::is_empty")]
    pub equipment_cost: Leaderboard<Amount>,
    /// Company -> order count.
    #[serde(default, skip_serializing_if = "Leaderboard::is_empty")]
    pub company_breakdown: Leaderboard<u64>,
}

impl SlaData {
    /// Keys every `SLA_DATA` payload must carry.
    pub const REQUIRED_KEYS: [&'static str; 6] = [
        "summary",
        "status",
        "top_suppliers",
        "top_projects",
        "equipment_distribution",
        "monthly_trend",
    ];

    /// Placeholder snapshot with every counter at zero and every mapping empty.
    pub fn empty(summary: Summary) -> Self {
        Self {
            summary,
            status: StatusCounts::default(),
            top_suppliers: Leaderboard::new(),
            top_projects: Leaderboard::new(),
            equipment_distribution: Leaderboard::new(),
            monthly_trend: Vec::new(),
            suppliers: Leaderboard::new(),
            projects_orders: Leaderboard::new(),
            projects_amounts: Leaderboard::new(),
            equipment_count: Leaderboard::new(),
            equipment_cost: Leaderboard::new(),
            company_breakdown: Leaderboard::new(),
        }
    }
}

/// Provenance block written by the JSON producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub last_update: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet: Option<String>,
    #[serde(default)]
    pub total_records: u64,
}

/// One complete, immutable snapshot: the SLA payload plus its order rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    sla: SlaData,
    orders: Vec<OrderRecord>,
    metadata: Option<SnapshotMetadata>,
    payments: Option<PaymentsData>,
}

impl Snapshot {
    pub fn new(sla: SlaData, orders: Vec<OrderRecord>) -> Self {
        Self {
            sla,
            orders,
            metadata: None,
            payments: None,
        }
    }

    pub fn with_metadata(mut self, metadata: SnapshotMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach the payments payload derived from the same orders.
    pub fn with_payments(mut self, payments: PaymentsData) -> Self {
        self.payments = Some(payments);
        self
    }

    pub fn sla(&self) -> &SlaData {
        &self.sla
    }

    pub fn summary(&self) -> &Summary {
        &self.sla.summary
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn metadata(&self) -> Option<&SnapshotMetadata> {
        self.metadata.as_ref()
    }

    pub fn payments(&self) -> Option<&PaymentsData> {
        self.payments.as_ref()
    }

    /// The two top-level values the dashboard binds.
    pub fn into_parts(self) -> (SlaData, Vec<OrderRecord>) {
        (self.sla, self.orders)
    }
}
