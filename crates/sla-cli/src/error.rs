//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Load error: {0}")]
    Load(#[from] sla_loader::LoadError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] sla_persistence::PersistenceError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] sla_telemetry::TelemetryError),

    #[error("Snapshot has {count} invariant violation(s), first: {first}")]
    Violations { count: usize, first: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
