//! SLA dashboard snapshot tool.
//!
//! Wires the loader, KPI derivation, writer and telemetry crates into the
//! `check`, `rebuild` and `watch` commands.

pub mod app;
pub mod config;
pub mod error;

pub use app::{read_orders, Application, CheckReport, RebuildReport};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
