//! Query builder and resolution.
//!
//! The [`QueryBuilder`] records conditions through a fluent API and resolves
//! them against its base collection only when a terminal method runs.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::condition::{Condition, ConditionList};
use crate::error::{QueryError, Result};
use crate::filter::{Filter, IntoFilter};
use crate::fragment::FragmentProvider;
use crate::order::OrderKey;
use crate::scoped::ScopedCollection;
use crate::value::Document;

/// A deferred query over a document collection.
///
/// Condition methods consume the builder and return it with one more
/// condition recorded; nothing touches the store until a terminal method
/// ([`all`](Self::all), [`count`](Self::count), [`sum`](Self::sum), ...)
/// folds the conditions over the base collection. Each terminal call
/// resolves again from the base, so a builder can be executed any number of
/// times.
///
/// Clone a builder to branch it: the copy shares no mutable state with the
/// original.
///
/// # Example
///
/// ```
/// use quarry_query::QueryBuilder;
///
/// let query = QueryBuilder::new(())
///     .where_eq("published", true)
///     .desc(["created_at"])
///     .limit(10);
///
/// assert_eq!(query.conditions().tags(), vec!["filter", "order_by", "limit"]);
/// ```
pub struct QueryBuilder<C> {
    collection: C,
    conditions: ConditionList,
    context: Option<Arc<dyn FragmentProvider<C>>>,
}

impl<C> QueryBuilder<C> {
    /// Creates an empty query over `collection`.
    pub fn new(collection: C) -> Self {
        QueryBuilder {
            collection,
            conditions: ConditionList::new(),
            context: None,
        }
    }

    /// Creates an empty query whose unknown operations are routed to `context`.
    pub fn with_context(collection: C, context: Arc<dyn FragmentProvider<C>>) -> Self {
        QueryBuilder {
            collection,
            conditions: ConditionList::new(),
            context: Some(context),
        }
    }

    /// Creates a query and lets `block` record its initial conditions.
    ///
    /// ```
    /// use quarry_query::QueryBuilder;
    ///
    /// let query = QueryBuilder::from_block((), None, |q| {
    ///     Ok(q.where_(("name", "L"))?.limit(1))
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(query.conditions().len(), 2);
    /// ```
    pub fn from_block<F>(
        collection: C,
        context: Option<Arc<dyn FragmentProvider<C>>>,
        block: F,
    ) -> Result<Self>
    where
        F: FnOnce(Self) -> Result<Self>,
    {
        let query = QueryBuilder {
            collection,
            conditions: ConditionList::new(),
            context,
        };
        block(query)
    }

    fn push(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    // ========================================================================
    // Condition methods
    // ========================================================================

    /// Restricts the query to documents matching `filter`.
    ///
    /// Accepts a one-key mapping (`("id", 23)`, `json!({"id": 23})`) or a
    /// [`Predicate`](crate::Predicate). Fails with
    /// [`QueryError::InvalidCondition`] when no usable filter is given.
    pub fn where_(self, filter: impl IntoFilter) -> Result<Self> {
        let filter = filter.into_filter()?;
        Ok(self.push(Condition::Filter(filter)))
    }

    /// Alias for [`where_`](Self::where_).
    pub fn and(self, filter: impl IntoFilter) -> Result<Self> {
        self.where_(filter)
    }

    /// Restricts the query to documents whose `field` equals `value`.
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Condition::Filter(Filter::eq(field, value)))
    }

    /// Keeps only the named fields of each document.
    pub fn pluck<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Condition::Pluck(fields.into_iter().map(Into::into).collect()))
    }

    /// Keeps documents that carry every named field.
    pub fn has_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Condition::HasFields(
            fields.into_iter().map(Into::into).collect(),
        ))
    }

    /// Caps the number of documents returned.
    pub fn limit(self, count: usize) -> Self {
        self.push(Condition::Limit(count))
    }

    /// Sorts ascending by the given fields or index keys.
    ///
    /// Only the last order directive of a query determines the final order.
    pub fn order<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<OrderKey>,
    {
        self.push(Condition::OrderBy(keys.into_iter().map(Into::into).collect()))
    }

    /// Alias for [`order`](Self::order).
    pub fn asc<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<OrderKey>,
    {
        self.order(keys)
    }

    /// Sorts descending by the given fields or index keys.
    pub fn desc<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<OrderKey>,
    {
        self.push(Condition::OrderBy(
            keys.into_iter().map(|key| OrderKey::descending(key.into())).collect(),
        ))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The recorded conditions, in application order.
    pub fn conditions(&self) -> &ConditionList {
        &self.conditions
    }

    /// The base collection the query resolves against.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// The context unknown operations are routed to, if any.
    pub fn context(&self) -> Option<&Arc<dyn FragmentProvider<C>>> {
        self.context.as_ref()
    }
}

impl<C: Clone> QueryBuilder<C> {
    /// Returns a new query with this query's conditions followed by `other`'s.
    ///
    /// Neither input is modified. The result keeps this query's collection
    /// and context.
    pub fn merge(&self, other: &QueryBuilder<C>) -> Self {
        QueryBuilder {
            collection: self.collection.clone(),
            conditions: self.conditions.concat(&other.conditions),
            context: self.context.clone(),
        }
    }

    /// Invokes an operation by name.
    ///
    /// Condition methods (`where`, `and`, `pluck`, `has_fields`, `limit`,
    /// `order`, `asc`, `desc`) are resolved first, taking JSON arguments.
    /// Any other name is looked up in the context; the fragment it returns
    /// is merged after this query's conditions. A name neither side knows
    /// fails with [`QueryError::UnknownOperation`].
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Self> {
        if let Some(query) = self.call_native(name, args)? {
            return Ok(query);
        }

        let context = self
            .context
            .as_ref()
            .ok_or_else(|| QueryError::unknown_operation(name))?;

        match context.fragment(name, args)? {
            Some(fragment) => {
                tracing::debug!(
                    fragment = name,
                    conditions = fragment.conditions.len(),
                    "merging query fragment"
                );
                Ok(self.merge(&fragment))
            }
            None => Err(QueryError::unknown_operation(name)),
        }
    }

    fn call_native(&self, name: &str, args: &[Value]) -> Result<Option<Self>> {
        let query = self.clone();
        let query = match name {
            "where" | "and" => {
                if args.len() > 1 {
                    return Err(QueryError::invalid_argument(
                        name,
                        "expected a single condition",
                    ));
                }
                query.where_(args.first().cloned())?
            }
            "pluck" => query.pluck(field_names(name, args)?),
            "has_fields" => query.has_fields(field_names(name, args)?),
            "limit" => query.limit(limit_count(args)?),
            "order" | "asc" => query.order(order_keys(name, args)?),
            "desc" => query.desc(order_keys(name, args)?),
            _ => return Ok(None),
        };
        Ok(Some(query))
    }
}

impl<C: ScopedCollection> QueryBuilder<C> {
    /// Folds the conditions over the base collection.
    ///
    /// The store is not contacted; only terminal operations on the returned
    /// collection execute.
    pub fn scoped(&self) -> std::result::Result<C, C::Error> {
        tracing::trace!(conditions = self.conditions.len(), "resolving query");
        self.conditions.fold(&self.collection)
    }

    /// Every matching document.
    pub fn all(&self) -> std::result::Result<Vec<Document>, C::Error> {
        self.scoped()?.fetch_all()
    }

    /// The first matching document, if any.
    pub fn first(&self) -> std::result::Result<Option<Document>, C::Error> {
        let scoped = self.scoped()?.apply(&Condition::Limit(1))?;
        Ok(scoped.fetch_all()?.into_iter().next())
    }

    /// Returns `true` if no document matches.
    pub fn is_empty(&self) -> std::result::Result<bool, C::Error> {
        Ok(self.all()?.is_empty())
    }

    /// Number of matching documents.
    pub fn count(&self) -> std::result::Result<u64, C::Error> {
        self.scoped()?.count()
    }

    /// Sum of `field` over the matching documents.
    pub fn sum(&self, field: &str) -> std::result::Result<f64, C::Error> {
        self.scoped()?.sum(field)
    }

    /// Mean of `field` over the matching documents.
    pub fn average(&self, field: &str) -> std::result::Result<Option<f64>, C::Error> {
        self.scoped()?.average(field)
    }

    /// Alias for [`average`](Self::average).
    pub fn avg(&self, field: &str) -> std::result::Result<Option<f64>, C::Error> {
        self.average(field)
    }

    /// Largest value of `field` among the documents that have it.
    pub fn max(&self, field: &str) -> std::result::Result<Option<Value>, C::Error> {
        self.with_field(field)?.max(field)
    }

    /// Smallest value of `field` among the documents that have it.
    pub fn min(&self, field: &str) -> std::result::Result<Option<Value>, C::Error> {
        self.with_field(field)?.min(field)
    }

    fn with_field(&self, field: &str) -> std::result::Result<C, C::Error> {
        self.scoped()?
            .apply(&Condition::HasFields(vec![field.to_string()]))
    }
}

impl<C: Clone> Clone for QueryBuilder<C> {
    fn clone(&self) -> Self {
        QueryBuilder {
            collection: self.collection.clone(),
            conditions: self.conditions.clone(),
            context: self.context.clone(),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for QueryBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("collection", &self.collection)
            .field("conditions", &self.conditions)
            .field("context", &self.context.is_some())
            .finish()
    }
}

fn field_names(operation: &str, args: &[Value]) -> Result<Vec<String>> {
    args.iter()
        .map(|arg| {
            arg.as_str().map(str::to_string).ok_or_else(|| {
                QueryError::invalid_argument(operation, format!("expected field name, got {arg}"))
            })
        })
        .collect()
}

fn limit_count(args: &[Value]) -> Result<usize> {
    let [count] = args else {
        return Err(QueryError::invalid_argument(
            "limit",
            format!("expected one count, got {} arguments", args.len()),
        ));
    };
    count
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            QueryError::invalid_argument("limit", format!("expected a non-negative integer, got {count}"))
        })
}

fn order_keys(operation: &str, args: &[Value]) -> Result<Vec<OrderKey>> {
    args.iter()
        .map(|arg| match arg {
            Value::String(field) => Ok(OrderKey::field(field.as_str())),
            Value::Object(map) if map.len() == 1 => map
                .get("index")
                .and_then(Value::as_str)
                .map(OrderKey::index)
                .ok_or_else(|| bad_order_key(operation, arg)),
            _ => Err(bad_order_key(operation, arg)),
        })
        .collect()
}

fn bad_order_key(operation: &str, arg: &Value) -> QueryError {
    QueryError::invalid_argument(
        operation,
        format!("expected field name or {{\"index\": name}}, got {arg}"),
    )
}
