//! Error types for the query crate.

use thiserror::Error;

/// Errors raised while building a query.
///
/// These are detected without touching the store and surface at the call
/// that triggered them. Failures reported by the store itself are not
/// wrapped here: they keep the store's own error type.
#[derive(Debug, Error)]
pub enum QueryError {
    /// `where`/`and` was called without a usable filter.
    #[error("a condition is required: pass a single field/value mapping or a predicate")]
    InvalidCondition,

    /// A named operation received arguments it cannot interpret.
    #[error("invalid arguments for '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    /// Neither the builder nor its context define the operation.
    #[error("undefined operation '{name}' for query")]
    UnknownOperation { name: String },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

impl QueryError {
    pub(crate) fn invalid_argument(operation: &str, reason: impl Into<String>) -> Self {
        QueryError::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_operation(name: &str) -> Self {
        QueryError::UnknownOperation {
            name: name.to_string(),
        }
    }
}

/// Result type for query building operations.
pub type Result<T> = std::result::Result<T, QueryError>;
