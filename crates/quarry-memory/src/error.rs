//! Error types for the in-memory store.

use thiserror::Error;

/// Errors reported by the in-memory store.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// An `order_by` named an index the table does not define.
    #[error("index '{index}' was not found on table '{table}'")]
    UnknownIndex { table: String, index: String },

    /// An arithmetic aggregate met a value that is not a number.
    #[error("expected type NUMBER but found {found} in field '{field}'")]
    NotNumeric { field: String, found: &'static str },

    /// A document was inserted with a primary key already in use.
    #[error("duplicate primary key {key} in table '{table}'")]
    DuplicateKey { table: String, key: String },

    /// An update tried to give a document another primary key.
    #[error("primary key '{field}' cannot be changed in table '{table}'")]
    PrimaryKeyChanged { table: String, field: String },

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
