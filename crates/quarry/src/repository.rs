//! Repositories: one collection, its entity type and its named queries.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use quarry_query::{DocumentBackend, Fragments, FragmentsBuilder, QueryBuilder};
use serde_json::Value;

use crate::adapter::{Adapter, CollectionOf};
use crate::entity::Entity;
use crate::error::Result;

/// Entity access for one collection, with reusable named queries.
///
/// Named queries are fragments: each one builds on a fresh query of the
/// collection, and any query the repository hands out can call them by name
/// through [`QueryBuilder::call`]. Calling a fragment merges its conditions
/// after the caller's own, so `rank.by_author(author)` filters by author and
/// then sorts by rank.
///
/// ```
/// use std::sync::Arc;
///
/// use quarry::{Adapter, Entity, Mapper, MemoryStore, Repository};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Article {
///     id: Option<String>,
///     author_id: u32,
///     comments_count: u32,
/// }
///
/// impl Entity for Article {
///     type Id = String;
///     fn id(&self) -> Option<&String> { self.id.as_ref() }
///     fn set_id(&mut self, id: String) { self.id = Some(id); }
/// }
///
/// let adapter = Arc::new(Adapter::new(Mapper::new().collection("articles"), MemoryStore::new()));
/// let articles = Repository::<Article, _>::builder(adapter, "articles")
///     .unwrap()
///     .fragment("rank", |q, _| Ok(q.desc(["comments_count"])))
///     .fragment("by_author", |q, args| q.call("where", &[json!({"author_id": args[0]})]))
///     .build();
///
/// let query = articles.fragment("rank", &[]).unwrap().call("by_author", &[json!(1)]).unwrap();
/// assert_eq!(query.conditions().tags(), vec!["order_by", "filter"]);
/// ```
pub struct Repository<E, B: DocumentBackend> {
    adapter: Arc<Adapter<B>>,
    collection: String,
    fragments: Arc<Fragments<CollectionOf<B>>>,
    entity: PhantomData<fn() -> E>,
}

/// Builder for a [`Repository`].
pub struct RepositoryBuilder<E, B: DocumentBackend> {
    adapter: Arc<Adapter<B>>,
    collection: String,
    fragments: FragmentsBuilder<CollectionOf<B>>,
    entity: PhantomData<fn() -> E>,
}

impl<E, B> RepositoryBuilder<E, B>
where
    E: Entity,
    B: DocumentBackend,
    CollectionOf<B>: Send + Sync + 'static,
{
    /// Registers a named query.
    pub fn fragment<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(QueryBuilder<CollectionOf<B>>, &[Value]) -> quarry_query::Result<QueryBuilder<CollectionOf<B>>>
            + Send
            + Sync
            + 'static,
    {
        self.fragments = self.fragments.fragment(name, f);
        self
    }

    /// Finishes the repository.
    pub fn build(self) -> Repository<E, B> {
        Repository {
            adapter: self.adapter,
            collection: self.collection,
            fragments: self.fragments.build(),
            entity: PhantomData,
        }
    }
}

impl<E, B> Repository<E, B>
where
    E: Entity,
    B: DocumentBackend,
    CollectionOf<B>: Send + Sync + 'static,
{
    /// A repository without named queries.
    pub fn new(adapter: Arc<Adapter<B>>, collection: impl Into<String>) -> Result<Self> {
        Ok(Self::builder(adapter, collection)?.build())
    }

    /// Starts a repository over a mapped collection.
    pub fn builder(
        adapter: Arc<Adapter<B>>,
        collection: impl Into<String>,
    ) -> Result<RepositoryBuilder<E, B>> {
        let collection = collection.into();
        adapter.mapper().get(&collection)?;
        let base = adapter.backend().collection(&collection);
        Ok(RepositoryBuilder {
            adapter,
            collection,
            fragments: Fragments::builder(base),
            entity: PhantomData,
        })
    }

    /// The collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The adapter the repository writes through.
    pub fn adapter(&self) -> &Arc<Adapter<B>> {
        &self.adapter
    }

    /// A query whose unknown operations resolve to this repository's
    /// named queries, populated by `block`.
    pub fn query<F>(&self, block: F) -> Result<QueryBuilder<CollectionOf<B>>>
    where
        F: FnOnce(QueryBuilder<CollectionOf<B>>) -> quarry_query::Result<QueryBuilder<CollectionOf<B>>>,
    {
        Ok(block(self.fragments.query())?)
    }

    /// Builds the named query `name`.
    pub fn fragment(&self, name: &str, args: &[Value]) -> Result<QueryBuilder<CollectionOf<B>>> {
        Ok(self.fragments.invoke(name, args)?)
    }

    /// Runs a query and returns the entities it selects.
    pub fn fetch(&self, query: &QueryBuilder<CollectionOf<B>>) -> Result<Vec<E>> {
        self.adapter.fetch(&self.collection, query)
    }

    /// Every entity of the collection.
    pub fn all(&self) -> Result<Vec<E>> {
        self.adapter.all(&self.collection)
    }

    /// The entity with the given identity.
    pub fn find(&self, id: Option<&E::Id>) -> Result<Option<E>> {
        self.adapter.find(&self.collection, id)
    }

    /// Creates or updates the entity.
    pub fn persist(&self, entity: E) -> Result<E> {
        self.adapter.persist(&self.collection, Some(entity))
    }

    /// Creates the entity.
    pub fn create(&self, entity: E) -> Result<E> {
        self.adapter.create(&self.collection, Some(entity))
    }

    /// Updates the entity.
    pub fn update(&self, entity: &E) -> Result<u64> {
        self.adapter.update(&self.collection, Some(entity))
    }

    /// Deletes the entity.
    pub fn delete(&self, entity: &E) -> Result<u64> {
        self.adapter.delete(&self.collection, Some(entity))
    }

    /// Deletes every entity of the collection.
    pub fn clear(&self) -> Result<u64> {
        self.adapter.clear(&self.collection)
    }
}

impl<E, B: DocumentBackend> fmt::Debug for Repository<E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &self.collection)
            .field("fragments", &self.fragments)
            .finish()
    }
}
