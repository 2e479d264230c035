//! Quarry memory - an in-process document store for quarry queries.
//!
//! [`MemoryStore`] keeps named tables of JSON documents behind a shared
//! lock. Its [`MemoryCollection`] handles implement the scoped-collection
//! capability: applying a condition records it, and terminal operations run
//! the recorded pipeline against the table's current rows.
//!
//! Store semantics:
//!
//! - Documents are keyed by their table's primary key (`id` unless the table
//!   was created with another); a UUID v4 is generated when an inserted
//!   document has none. Updates may repeat a document's key but never change it.
//! - `order_by` sorts by its own keys only. Ties keep insertion order, so a
//!   later sort fully supersedes an earlier one.
//! - Documents missing a sort field come after those that have it when
//!   ascending, before them when descending.
//! - Aggregates skip documents lacking the field (or holding `null`);
//!   `sum`/`average` over a non-number fail with [`MemoryError::NotNumeric`].
//! - The primary key is always usable as an index; other indexes are defined
//!   with [`MemoryStore::index_create`].

mod collection;
mod error;
mod pipeline;
mod store;

pub use collection::MemoryCollection;
pub use error::{MemoryError, Result};
pub use store::{MemoryStore, PRIMARY_KEY};
