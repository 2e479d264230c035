//! Store capabilities consumed by the query builder.
//!
//! The builder never talks to a database directly. It folds its conditions
//! over a [`ScopedCollection`] and calls one terminal operation on the
//! result. Write passthroughs go through [`WritableCollection`], and
//! [`DocumentBackend`] hands out unscoped collections by name.

use serde_json::Value;

use crate::condition::Condition;
use crate::value::Document;

/// A collection with zero or more conditions already applied.
///
/// Applying a condition returns a new value and leaves the receiver
/// untouched, so a scoped collection can be cloned and reused as the base
/// of any number of queries. Terminal operations execute against the store;
/// their failures are reported with the store's own [`Error`](Self::Error).
///
/// Aggregates only consider documents carrying the field with a non-null
/// value.
pub trait ScopedCollection: Clone {
    /// Failure reported by the store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies one condition, producing a narrower scope.
    fn apply(&self, condition: &Condition) -> Result<Self, Self::Error>;

    /// Number of documents in scope.
    fn count(&self) -> Result<u64, Self::Error>;

    /// Sum of a numeric field; `0` when nothing is in scope.
    fn sum(&self, field: &str) -> Result<f64, Self::Error>;

    /// Mean of a numeric field; `None` when nothing is in scope.
    fn average(&self, field: &str) -> Result<Option<f64>, Self::Error>;

    /// Largest value of a field; `None` when nothing is in scope.
    fn max(&self, field: &str) -> Result<Option<Value>, Self::Error>;

    /// Smallest value of a field; `None` when nothing is in scope.
    fn min(&self, field: &str) -> Result<Option<Value>, Self::Error>;

    /// Every document in scope.
    fn fetch_all(&self) -> Result<Vec<Document>, Self::Error>;
}

/// Write access to the documents of a scoped collection.
pub trait WritableCollection: ScopedCollection {
    /// Stores a new document and returns its primary key.
    ///
    /// A key is generated when the document does not carry one.
    fn insert(&self, document: Document) -> Result<Value, Self::Error>;

    /// Merges `changes` into every document in scope; returns how many changed.
    fn update(&self, changes: Document) -> Result<u64, Self::Error>;

    /// Removes every document in scope; returns how many were removed.
    fn delete(&self) -> Result<u64, Self::Error>;

    /// Looks a document up by primary key.
    fn get(&self, key: &Value) -> Result<Option<Document>, Self::Error>;
}

/// A store that hands out collections by name.
pub trait DocumentBackend {
    /// Collection handle type.
    type Collection: WritableCollection;

    /// Returns the unscoped collection with the given name.
    fn collection(&self, name: &str) -> Self::Collection;
}
