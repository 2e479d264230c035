//! Named query fragments and contextual dispatch.
//!
//! A context is anything that can answer "give me the query fragment called
//! `name`". When [`QueryBuilder::call`] meets a name that is not one of its
//! own condition methods, it asks the builder's context for a fragment and
//! merges the fragment's conditions after its own. This is how a repository
//! exposes reusable scopes that combine with ad hoc queries:
//!
//! ```
//! use quarry_query::Fragments;
//! use serde_json::json;
//!
//! let articles = Fragments::builder(())
//!     .fragment("by_author", |q, args| q.call("where", &[json!({"author_id": args[0]})]))
//!     .fragment("rank", |q, _| Ok(q.desc(["comments_count"])))
//!     .build();
//!
//! let query = articles
//!     .invoke("rank", &[])
//!     .unwrap()
//!     .call("by_author", &[json!(1)])
//!     .unwrap();
//!
//! assert_eq!(query.conditions().tags(), vec!["order_by", "filter"]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::error::{QueryError, Result};
use crate::query::QueryBuilder;

/// Supplies named query fragments to a [`QueryBuilder`].
pub trait FragmentProvider<C>: Send + Sync {
    /// Builds the fragment called `name`.
    ///
    /// Returns `Ok(None)` when the provider does not define `name`.
    fn fragment(&self, name: &str, args: &[Value]) -> Result<Option<QueryBuilder<C>>>;
}

/// Builds a fragment from a fresh query and the call's arguments.
pub type FragmentFn<C> =
    Arc<dyn Fn(QueryBuilder<C>, &[Value]) -> Result<QueryBuilder<C>> + Send + Sync>;

/// A registry of named fragments over one base collection.
///
/// Every fragment receives a fresh query on the registry's collection whose
/// context is the registry itself, so fragments can call other fragments.
pub struct Fragments<C> {
    collection: C,
    fragments: HashMap<String, FragmentFn<C>>,
    this: Weak<Fragments<C>>,
}

/// Builder for a [`Fragments`] registry.
pub struct FragmentsBuilder<C> {
    collection: C,
    fragments: HashMap<String, FragmentFn<C>>,
}

impl<C> FragmentsBuilder<C> {
    /// Registers a fragment, replacing any previous one with the same name.
    pub fn fragment<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(QueryBuilder<C>, &[Value]) -> Result<QueryBuilder<C>> + Send + Sync + 'static,
    {
        self.fragments.insert(name.into(), Arc::new(f));
        self
    }

    /// Finishes the registry.
    pub fn build(self) -> Arc<Fragments<C>> {
        let FragmentsBuilder {
            collection,
            fragments,
        } = self;
        Arc::new_cyclic(|this| Fragments {
            collection,
            fragments,
            this: this.clone(),
        })
    }
}

impl<C> Fragments<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Starts a registry over `collection`.
    pub fn builder(collection: C) -> FragmentsBuilder<C> {
        FragmentsBuilder {
            collection,
            fragments: HashMap::new(),
        }
    }

    /// The base collection fragments are built on.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// A fresh, empty query with this registry as its context.
    pub fn query(&self) -> QueryBuilder<C> {
        match self.this.upgrade() {
            Some(this) => {
                let context: Arc<dyn FragmentProvider<C>> = this;
                QueryBuilder::with_context(self.collection.clone(), context)
            }
            None => QueryBuilder::new(self.collection.clone()),
        }
    }

    /// Builds the fragment called `name`.
    ///
    /// Fails with [`QueryError::UnknownOperation`] if it is not registered.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<QueryBuilder<C>> {
        self.fragment(name, args)?
            .ok_or_else(|| QueryError::unknown_operation(name))
    }

    /// Returns `true` if a fragment called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// Registered fragment names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fragments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<C> FragmentProvider<C> for Fragments<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn fragment(&self, name: &str, args: &[Value]) -> Result<Option<QueryBuilder<C>>> {
        match self.fragments.get(name) {
            Some(build) => build(self.query(), args).map(Some),
            None => Ok(None),
        }
    }
}

impl<C> fmt::Debug for Fragments<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.fragments.keys().collect();
        names.sort_unstable();
        f.debug_struct("Fragments").field("names", &names).finish()
    }
}
