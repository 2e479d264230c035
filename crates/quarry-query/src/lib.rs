//! Quarry query - deferred, chainable queries over document collections.
//!
//! A [`QueryBuilder`] records filtering and shaping operations without
//! touching the store. When a result is needed, the recorded conditions are
//! folded left to right over a base collection and a single terminal
//! operation runs against the outcome. It supports:
//!
//! - Equality filters and predicate expressions (comparisons, regex, boolean
//!   combinators, closures)
//! - Projection (`pluck`) and field presence (`has_fields`)
//! - Ascending and descending ordering by field or index, and limits
//! - Aggregates: count, sum, average, max, min
//! - Named fragments resolved through a context and merged into a query
//!
//! # Quick Start
//!
//! ```rust
//! use quarry_query::{Predicate, QueryBuilder};
//!
//! // Any `ScopedCollection` can be the base; `()` is enough to build.
//! let query = QueryBuilder::new(())
//!     .where_(Predicate::field("age").gte(18))
//!     .unwrap()
//!     .has_fields(["email"])
//!     .order(["name"])
//!     .limit(20);
//!
//! assert_eq!(
//!     query.conditions().tags(),
//!     vec!["filter", "has_fields", "order_by", "limit"]
//! );
//! ```
//!
//! # Resolution
//!
//! ```text
//! scoped = conditions.fold(base, |collection, condition| collection.apply(condition))
//! ```
//!
//! - The fold is strictly sequential: no reordering, deduplication or
//!   short-circuiting.
//! - Every terminal call resolves again from the base collection.
//! - Store failures keep the store's own error type.
//!
//! # Stores
//!
//! | Trait | Role |
//! |-------|------|
//! | [`ScopedCollection`] | apply a condition; count, aggregate, fetch |
//! | [`WritableCollection`] | insert, update, delete and look up by key |
//! | [`DocumentBackend`] | hand out collections by name |

mod condition;
mod error;
mod filter;
mod fragment;
mod op;
mod order;
mod query;
mod scoped;
pub mod value;

// Re-export public API
pub use condition::{Condition, ConditionList};
pub use error::{QueryError, Result};
pub use filter::{FieldRef, Filter, IntoFilter, Predicate};
pub use fragment::{FragmentFn, FragmentProvider, Fragments, FragmentsBuilder};
pub use op::Op;
pub use order::{compare_documents, compare_field, Dir, OrderKey, OrderTarget};
pub use query::QueryBuilder;
pub use scoped::{DocumentBackend, ScopedCollection, WritableCollection};
pub use value::Document;
