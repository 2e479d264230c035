//! Quarry - a document store adapter with chainable, composable queries.
//!
//! Quarry persists entities as JSON documents and queries them through a
//! deferred builder. The crate ties together:
//!
//! - **Query core** ([`quarry_query`]): [`QueryBuilder`], conditions,
//!   predicates and named fragments
//! - **Stores**: the [`DocumentBackend`] contract and the in-process
//!   [`MemoryStore`]
//! - **Mapping**: [`Entity`], [`Mapper`] and per-collection identity fields
//! - **Adapter**: [`Adapter`] CRUD passthroughs and [`Command`]s
//! - **Repositories**: [`Repository`] with reusable named queries
//! - **Configuration**: [`ConnectionConfig`] parsed from
//!   `rethinkdb://[:auth_key@]host[:port]/db`
//! - **Logging**: [`logging::init_tracing`]
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{Adapter, Entity, Mapper, MemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     id: Option<String>,
//!     name: String,
//!     age: Option<u32>,
//! }
//!
//! impl Entity for User {
//!     type Id = String;
//!     fn id(&self) -> Option<&String> { self.id.as_ref() }
//!     fn set_id(&mut self, id: String) { self.id = Some(id); }
//! }
//!
//! let adapter = Adapter::connect(
//!     Mapper::new().collection("users"),
//!     "rethinkdb://localhost:28015/test",
//!     |_config| Ok::<_, quarry::MemoryError>(MemoryStore::new()),
//! )
//! .unwrap();
//!
//! for (name, age) in [("L", Some(32)), ("MG", Some(31)), ("S", None)] {
//!     adapter
//!         .create("users", Some(User { id: None, name: name.into(), age }))
//!         .unwrap();
//! }
//!
//! let query = adapter.query("users").unwrap();
//! assert_eq!(query.sum("age").unwrap(), 63.0);
//!
//! let oldest: Vec<User> = adapter
//!     .fetch("users", &query.desc(["age"]).limit(1))
//!     .unwrap();
//! assert_eq!(oldest[0].name, "L");
//! ```

mod adapter;
mod command;
mod config;
mod entity;
mod error;
pub mod logging;
mod repository;

pub use adapter::{Adapter, CollectionOf};
pub use command::Command;
pub use config::{ConnectionConfig, DEFAULT_PORT, SCHEME};
pub use entity::{CollectionMapping, Entity, Mapper, DEFAULT_IDENTITY};
pub use error::{AdapterError, ConfigError, Result};
pub use repository::{Repository, RepositoryBuilder};

// Re-export the query core and the in-memory store
pub use quarry_memory::{MemoryCollection, MemoryError, MemoryStore};
pub use quarry_query::{
    Condition, ConditionList, Dir, Document, DocumentBackend, Filter, FragmentProvider, Fragments,
    OrderKey, Predicate, QueryBuilder, QueryError, ScopedCollection, WritableCollection,
};

pub use quarry_query;
