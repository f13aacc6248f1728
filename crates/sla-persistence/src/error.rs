//! Persistence error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace {path}: {source}")]
    Replace {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
