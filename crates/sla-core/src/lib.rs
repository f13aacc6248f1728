//! Core data model for the SLA dashboard snapshot.
//!
//! This crate provides the types every other crate in the workspace shares:
//! - `SlaData`, `Summary`, `StatusCounts`: the summary-bearing payload
//! - `Leaderboard`: ordered name-to-score rankings
//! - `OrderRecord`, `CellValue`: detail rows as exported from the sheet
//! - `PaymentsData`: the invoice-side payload
//! - `Amount`: exact decimal money
//! - `validate`: invariant checks that flag, never correct

pub mod amount;
pub mod leaderboard;
pub mod order;
pub mod payments;
pub mod snapshot;
pub mod summary;
pub mod trend;
pub mod validate;

pub use amount::Amount;
pub use leaderboard::Leaderboard;
pub use order::{non_empty, CellValue, OrderRecord};
pub use payments::{InvoiceTrendPoint, PaymentStatusCounts, PaymentsData, PaymentsSummary};
pub use snapshot::{SlaData, Snapshot, SnapshotMetadata};
pub use summary::{StatusCounts, StatusLabel, Summary};
pub use trend::{is_chronological, MonthlyTrendPoint};
pub use validate::{validate, ValidationReport, Violation};
