//! Entities and their mapping onto collections.

use std::collections::HashMap;

use quarry_query::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AdapterError, Result};

/// Identity field used when a collection does not name one.
pub const DEFAULT_IDENTITY: &str = "id";

/// A value persisted as one document.
///
/// The entity serializes to a JSON object whose identity field holds
/// [`id`](Self::id). A `None` identity means the entity has not been stored
/// yet.
///
/// ```
/// use quarry::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     id: Option<String>,
///     name: String,
/// }
///
/// impl Entity for User {
///     type Id = String;
///
///     fn id(&self) -> Option<&String> {
///         self.id.as_ref()
///     }
///
///     fn set_id(&mut self, id: String) {
///         self.id = Some(id);
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned {
    /// Identity type; must round-trip through the store's keys.
    type Id: Serialize + DeserializeOwned + Clone;

    /// The entity's identity, if it has been assigned.
    fn id(&self) -> Option<&Self::Id>;

    /// Assigns the identity, typically after creation.
    fn set_id(&mut self, id: Self::Id);
}

/// How one collection maps to and from documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMapping {
    name: String,
    identity: String,
}

impl CollectionMapping {
    /// Maps `name` with the default identity field.
    pub fn new(name: impl Into<String>) -> Self {
        CollectionMapping::with_identity(name, DEFAULT_IDENTITY)
    }

    /// Maps `name` with a custom identity field.
    pub fn with_identity(name: impl Into<String>, identity: impl Into<String>) -> Self {
        CollectionMapping {
            name: name.into(),
            identity: identity.into(),
        }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity field name.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Serializes an entity into a document.
    ///
    /// A `null` identity is dropped so the store can generate one.
    pub fn serialize<E: Serialize>(&self, entity: &E) -> Result<Document> {
        match serde_json::to_value(entity)? {
            Value::Object(mut doc) => {
                if doc.get(&self.identity).is_some_and(Value::is_null) {
                    doc.remove(&self.identity);
                }
                Ok(doc)
            }
            _ => Err(AdapterError::NotADocument {
                collection: self.name.clone(),
            }),
        }
    }

    /// Deserializes one document into an entity.
    pub fn deserialize<E: DeserializeOwned>(&self, doc: Document) -> Result<E> {
        Ok(serde_json::from_value(Value::Object(doc))?)
    }

    /// Deserializes documents into entities, preserving order.
    pub fn deserialize_all<E: DeserializeOwned>(&self, docs: Vec<Document>) -> Result<Vec<E>> {
        docs.into_iter().map(|doc| self.deserialize(doc)).collect()
    }

    /// Converts an identity into the value stored in the identity field.
    pub fn identity_value<I: Serialize>(&self, id: &I) -> Result<Value> {
        Ok(serde_json::to_value(id)?)
    }

    /// Converts a stored key back into an identity.
    pub fn identity_from<I: DeserializeOwned>(&self, key: Value) -> Result<I> {
        Ok(serde_json::from_value(key)?)
    }
}

/// Registry of mapped collections.
///
/// ```
/// use quarry::Mapper;
///
/// let mapper = Mapper::new()
///     .collection("users")
///     .collection_with_identity("articles", "_id");
///
/// assert_eq!(mapper.get("articles").unwrap().identity(), "_id");
/// assert!(mapper.get("comments").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    collections: HashMap<String, CollectionMapping>,
}

impl Mapper {
    /// Creates an empty mapper.
    pub fn new() -> Self {
        Mapper::default()
    }

    /// Maps a collection with the default identity field.
    pub fn collection(self, name: impl Into<String>) -> Self {
        self.map(CollectionMapping::new(name))
    }

    /// Maps a collection with a custom identity field.
    pub fn collection_with_identity(
        self,
        name: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        self.map(CollectionMapping::with_identity(name, identity))
    }

    /// Adds a mapping, replacing any previous one for the same collection.
    pub fn map(mut self, mapping: CollectionMapping) -> Self {
        self.collections.insert(mapping.name.clone(), mapping);
        self
    }

    /// Looks up the mapping of a collection.
    pub fn get(&self, name: &str) -> Result<&CollectionMapping> {
        self.collections
            .get(name)
            .ok_or_else(|| AdapterError::UnmappedCollection {
                collection: name.to_string(),
            })
    }

    /// Mapped collection names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
