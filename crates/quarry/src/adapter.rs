//! The adapter: entity persistence and query entry points.

use std::sync::Arc;

use quarry_query::{DocumentBackend, FragmentProvider, QueryBuilder};
use serde::de::DeserializeOwned;

use crate::command::Command;
use crate::config::ConnectionConfig;
use crate::entity::{CollectionMapping, Entity, Mapper};
use crate::error::{AdapterError, Result};

/// Collection handle type of a backend.
pub type CollectionOf<B> = <B as DocumentBackend>::Collection;

/// Persists entities and builds queries for mapped collections.
///
/// Every operation names its collection, which must be registered with the
/// [`Mapper`]. Write operations take the entity as an `Option` so a missing
/// entity is reported as [`AdapterError::NullEntity`] rather than silently
/// ignored.
///
/// # Example
///
/// ```
/// use quarry::{Adapter, Entity, Mapper, MemoryStore};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct User {
///     id: Option<String>,
///     name: String,
/// }
///
/// impl Entity for User {
///     type Id = String;
///     fn id(&self) -> Option<&String> { self.id.as_ref() }
///     fn set_id(&mut self, id: String) { self.id = Some(id); }
/// }
///
/// let adapter = Adapter::new(Mapper::new().collection("users"), MemoryStore::new());
///
/// let user = adapter
///     .create("users", Some(User { id: None, name: "L".into() }))
///     .unwrap();
/// let found: Option<User> = adapter.find("users", user.id()).unwrap();
/// assert_eq!(found.unwrap().name, "L");
/// ```
#[derive(Debug)]
pub struct Adapter<B> {
    mapper: Mapper,
    backend: B,
    config: Option<ConnectionConfig>,
}

impl<B: DocumentBackend> Adapter<B> {
    /// Creates an adapter over an already connected backend.
    pub fn new(mapper: Mapper, backend: B) -> Self {
        Adapter {
            mapper,
            backend,
            config: None,
        }
    }

    /// Parses `uri` and hands the settings to `connector` to build the backend.
    pub fn connect<F, E>(mapper: Mapper, uri: &str, connector: F) -> Result<Self>
    where
        F: FnOnce(&ConnectionConfig) -> std::result::Result<B, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let config = ConnectionConfig::from_uri(uri)?;
        tracing::debug!(host = %config.host, port = config.port, db = %config.db, "connecting");
        let backend = connector(&config).map_err(AdapterError::store)?;
        Ok(Adapter {
            mapper,
            backend,
            config: Some(config),
        })
    }

    /// Connection settings, when built with [`connect`](Self::connect).
    pub fn config(&self) -> Option<&ConnectionConfig> {
        self.config.as_ref()
    }

    /// The collection registry.
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn mapping(&self, collection: &str) -> Result<&CollectionMapping> {
        self.mapper.get(collection)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Creates the entity when it has no identity, updates it otherwise.
    pub fn persist<E: Entity>(&self, collection: &str, entity: Option<E>) -> Result<E> {
        let entity = require(collection, "persist", entity)?;
        if entity.id().is_some() {
            self.update(collection, Some(&entity))?;
            Ok(entity)
        } else {
            self.create(collection, Some(entity))
        }
    }

    /// Inserts the entity and assigns the identity the store reports.
    ///
    /// A key that does not convert into `E::Id` fails the call and the
    /// inserted document is removed again.
    pub fn create<E: Entity>(&self, collection: &str, entity: Option<E>) -> Result<E> {
        let mut entity = require(collection, "create", entity)?;
        let mapping = self.mapping(collection)?;

        let document = mapping.serialize(&entity)?;
        let key = self.command(&self.query(collection)?)?.create(document)?;

        match mapping.identity_from(key.clone()) {
            Ok(id) => {
                tracing::debug!(collection, key = %key, "created entity");
                entity.set_id(id);
                Ok(entity)
            }
            Err(err) => {
                self.command(&self.find_query(collection, &key)?)?.delete()?;
                tracing::debug!(collection, key = %key, "removed entity with unusable key");
                Err(err)
            }
        }
    }

    /// Merges the entity's fields into the stored document; returns how many
    /// changed.
    pub fn update<E: Entity>(&self, collection: &str, entity: Option<&E>) -> Result<u64> {
        let entity = require(collection, "update", entity)?;
        let id = identity(collection, entity)?;
        let document = self.mapping(collection)?.serialize(entity)?;

        let updated = self.command(&self.find_query(collection, id)?)?.update(document)?;
        tracing::debug!(collection, updated, "updated entity");
        Ok(updated)
    }

    /// Removes the stored document of the entity; returns how many were removed.
    pub fn delete<E: Entity>(&self, collection: &str, entity: Option<&E>) -> Result<u64> {
        let entity = require(collection, "delete", entity)?;
        let id = identity(collection, entity)?;

        let deleted = self.command(&self.find_query(collection, id)?)?.delete()?;
        tracing::debug!(collection, deleted, "deleted entity");
        Ok(deleted)
    }

    /// Removes every document of the collection.
    pub fn clear(&self, collection: &str) -> Result<u64> {
        let cleared = self.command(&self.query(collection)?)?.clear()?;
        tracing::debug!(collection, cleared, "cleared collection");
        Ok(cleared)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Every entity of the collection.
    pub fn all<E: DeserializeOwned>(&self, collection: &str) -> Result<Vec<E>> {
        self.fetch(collection, &self.query(collection)?)
    }

    /// The entity with the given identity; `None` when there is no identity
    /// or no such entity.
    pub fn find<E: Entity>(&self, collection: &str, id: Option<&E::Id>) -> Result<Option<E>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let document = self
            .find_query(collection, id)?
            .first()
            .map_err(AdapterError::store)?;
        document
            .map(|doc| self.mapping(collection)?.deserialize(doc))
            .transpose()
    }

    /// Not supported: documents have no sequential primary keys.
    pub fn first<E: Entity>(&self, _collection: &str) -> Result<Option<E>> {
        Err(AdapterError::Unsupported { operation: "first" })
    }

    /// Not supported: documents have no sequential primary keys.
    pub fn last<E: Entity>(&self, _collection: &str) -> Result<Option<E>> {
        Err(AdapterError::Unsupported { operation: "last" })
    }

    /// Runs `query` and deserializes the documents it returns.
    pub fn fetch<E: DeserializeOwned>(
        &self,
        collection: &str,
        query: &QueryBuilder<CollectionOf<B>>,
    ) -> Result<Vec<E>> {
        let documents = query.all().map_err(AdapterError::store)?;
        self.mapping(collection)?.deserialize_all(documents)
    }

    // ========================================================================
    // Queries and commands
    // ========================================================================

    /// An empty query over a mapped collection.
    pub fn query(&self, collection: &str) -> Result<QueryBuilder<CollectionOf<B>>> {
        self.mapping(collection)?;
        Ok(QueryBuilder::new(self.backend.collection(collection)))
    }

    /// A query over a mapped collection with an optional context, populated
    /// by `block`.
    pub fn query_with<F>(
        &self,
        collection: &str,
        context: Option<Arc<dyn FragmentProvider<CollectionOf<B>>>>,
        block: F,
    ) -> Result<QueryBuilder<CollectionOf<B>>>
    where
        F: FnOnce(QueryBuilder<CollectionOf<B>>) -> quarry_query::Result<QueryBuilder<CollectionOf<B>>>,
    {
        self.mapping(collection)?;
        Ok(QueryBuilder::from_block(
            self.backend.collection(collection),
            context,
            block,
        )?)
    }

    /// A command acting on the documents `query` selects.
    pub fn command(&self, query: &QueryBuilder<CollectionOf<B>>) -> Result<Command<CollectionOf<B>>> {
        Command::new(query)
    }

    fn find_query<I: serde::Serialize>(
        &self,
        collection: &str,
        id: &I,
    ) -> Result<QueryBuilder<CollectionOf<B>>> {
        let mapping = self.mapping(collection)?;
        let id = mapping.identity_value(id)?;
        Ok(self.query(collection)?.where_eq(mapping.identity(), id))
    }
}

fn require<T>(collection: &str, operation: &'static str, entity: Option<T>) -> Result<T> {
    entity.ok_or_else(|| AdapterError::NullEntity {
        collection: collection.to_string(),
        operation,
    })
}

fn identity<'a, E: Entity>(collection: &str, entity: &'a E) -> Result<&'a E::Id> {
    entity.id().ok_or_else(|| AdapterError::MissingIdentity {
        collection: collection.to_string(),
    })
}
