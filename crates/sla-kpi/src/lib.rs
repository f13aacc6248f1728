//! KPI derivation for the SLA dashboard.
//!
//! Turns raw job order records into the [`SlaData`](sla_core::SlaData)
//! snapshot the dashboard renders:
//! - Status classification and open order count
//! - Completion duration statistics and on-time rate
//! - Supplier, project and equipment leaderboards
//! - Monthly order volume
//! - The payments payload over invoice-applicable orders

pub mod compute;
pub mod config;
pub mod parse;
pub mod payments;
pub mod stats;
mod tally;

pub use compute::{completion_rate, compute_sla_data, UNKNOWN};
pub use config::KpiConfig;
pub use parse::{order_cost, parse_cost, parse_days};
pub use payments::{compute_payments_data, PENDING_STATES};
pub use stats::{mean, round1, round2, DurationStats};
