//! Write operations on a resolved query.

use quarry_query::{Document, QueryBuilder, WritableCollection};
use serde_json::Value;

use crate::error::{AdapterError, Result};

/// Runs writes against the documents a query selects.
///
/// The query is resolved once, when the command is created.
#[derive(Debug, Clone)]
pub struct Command<C> {
    collection: C,
}

impl<C: WritableCollection> Command<C> {
    /// Resolves `query` into a command.
    pub fn new(query: &QueryBuilder<C>) -> Result<Self> {
        let collection = query.scoped().map_err(AdapterError::store)?;
        Ok(Command { collection })
    }

    /// Inserts a document; returns its primary key.
    pub fn create(&self, document: Document) -> Result<Value> {
        self.collection.insert(document).map_err(AdapterError::store)
    }

    /// Merges `document` into every selected document.
    pub fn update(&self, document: Document) -> Result<u64> {
        self.collection.update(document).map_err(AdapterError::store)
    }

    /// Removes every selected document.
    pub fn delete(&self) -> Result<u64> {
        self.collection.delete().map_err(AdapterError::store)
    }

    /// Alias for [`delete`](Self::delete).
    pub fn clear(&self) -> Result<u64> {
        self.delete()
    }

    /// Looks a document up by primary key.
    pub fn get(&self, key: &Value) -> Result<Option<Document>> {
        self.collection.get(key).map_err(AdapterError::store)
    }

    /// The resolved collection.
    pub fn collection(&self) -> &C {
        &self.collection
    }
}
