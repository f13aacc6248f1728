//! Loader error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The payload is not syntactically valid.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A required field is missing or has the wrong type.
    #[error("Schema error in `{field}`: {reason}")]
    Schema { field: String, reason: String },

    /// Strict mode refused a snapshot that breaks its invariants.
    #[error("Snapshot rejected with {count} invariant violation(s): {first}")]
    Invariant { count: usize, first: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::Schema {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Field named by a schema error.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Schema { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse_error",
            Self::Schema { .. } => "schema_error",
            Self::Invariant { .. } => "invariant_error",
            Self::Io(_) => "io_error",
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
