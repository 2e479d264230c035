//! Filters and predicate expressions.
//!
//! A [`Filter`] is what `where`/`and` record: either a single field/value
//! equality mapping or an opaque [`Predicate`]. Predicates are plain data
//! (apart from [`Predicate::custom`]) so a store can translate them into its
//! own query language, and every predicate can also evaluate itself against
//! a document for stores that filter in-process.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::{QueryError, Result};
use crate::op::Op;
use crate::value::{self, Document};

/// A predicate expression over a single document.
///
/// # Example
///
/// ```
/// use quarry_query::Predicate;
/// use serde_json::json;
///
/// let adult = Predicate::field("age").gte(18).and(Predicate::field("name").ne("root"));
///
/// let doc = json!({"name": "L", "age": 32});
/// assert!(adult.matches(doc.as_object().unwrap()));
/// ```
#[derive(Clone)]
pub enum Predicate {
    /// Compares a field against a value.
    Compare { field: String, op: Op, value: Value },
    /// String field matches a regular expression.
    Matches { field: String, regex: Regex },
    /// Every predicate must match.
    And(Vec<Predicate>),
    /// At least one predicate must match.
    Or(Vec<Predicate>),
    /// The predicate must not match.
    Not(Box<Predicate>),
    /// Arbitrary test over the whole document.
    Custom(Arc<dyn Fn(&Document) -> bool + Send + Sync>),
}

impl Predicate {
    /// Starts a comparison on the named field.
    pub fn field(name: impl Into<String>) -> FieldRef {
        FieldRef { field: name.into() }
    }

    /// Wraps a closure evaluated against each document.
    pub fn custom<F>(test: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom(Arc::new(test))
    }

    /// Combines two predicates; both must match.
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut all) => {
                all.push(other);
                Predicate::And(all)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    /// Combines two predicates; either may match.
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut any) => {
                any.push(other);
                Predicate::Or(any)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    /// Inverts the predicate.
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluates the predicate against a document.
    ///
    /// A missing field never satisfies a comparison.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Predicate::Compare { field, op, value } => doc
                .get(field)
                .is_some_and(|actual| op.holds(actual, value)),
            Predicate::Matches { field, regex } => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| regex.is_match(s)),
            Predicate::And(all) => all.iter().all(|p| p.matches(doc)),
            Predicate::Or(any) => any.iter().any(|p| p.matches(doc)),
            Predicate::Not(inner) => !inner.matches(doc),
            Predicate::Custom(test) => test(doc),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { field, op, value } => f
                .debug_struct("Compare")
                .field("field", field)
                .field("op", op)
                .field("value", value)
                .finish(),
            Predicate::Matches { field, regex } => f
                .debug_struct("Matches")
                .field("field", field)
                .field("regex", &regex.as_str())
                .finish(),
            Predicate::And(all) => f.debug_tuple("And").field(all).finish(),
            Predicate::Or(any) => f.debug_tuple("Or").field(any).finish(),
            Predicate::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Predicate::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// A field awaiting a comparison; see [`Predicate::field`].
#[derive(Debug, Clone)]
pub struct FieldRef {
    field: String,
}

impl FieldRef {
    fn compare(self, op: Op, value: impl Into<Value>) -> Predicate {
        Predicate::Compare {
            field: self.field,
            op,
            value: value.into(),
        }
    }

    /// Field equals value.
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Eq, value)
    }

    /// Field differs from value.
    pub fn ne(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Ne, value)
    }

    /// Field is greater than value.
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Gt, value)
    }

    /// Field is greater than or equal to value.
    pub fn gte(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Gte, value)
    }

    /// Field is less than value.
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Lt, value)
    }

    /// Field is less than or equal to value.
    pub fn lte(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Lte, value)
    }

    /// String field starts with prefix.
    pub fn starts_with(self, prefix: &str) -> Predicate {
        self.compare(Op::StartsWith, prefix)
    }

    /// String field ends with suffix.
    pub fn ends_with(self, suffix: &str) -> Predicate {
        self.compare(Op::EndsWith, suffix)
    }

    /// String field contains a substring, or array field contains an element.
    pub fn contains(self, value: impl Into<Value>) -> Predicate {
        self.compare(Op::Contains, value)
    }

    /// Field equals one of the given values.
    pub fn is_in<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let options: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.compare(Op::In, Value::Array(options))
    }

    /// String field matches a regular expression.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn matches(self, pattern: &str) -> Result<Predicate> {
        let regex = Regex::new(pattern)?;
        Ok(Predicate::Matches {
            field: self.field,
            regex,
        })
    }
}

/// The argument of a `filter` condition.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Single field/value equality mapping, e.g. `{"id": 23}`.
    Eq { field: String, value: Value },
    /// Opaque predicate expression.
    Predicate(Predicate),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Builds an equality filter from a JSON object with exactly one key.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_mapping(map),
            _ => Err(QueryError::InvalidCondition),
        }
    }

    fn from_mapping(map: Document) -> Result<Self> {
        if map.len() != 1 {
            return Err(QueryError::InvalidCondition);
        }
        map.into_iter()
            .next()
            .map(|(field, value)| Filter::Eq { field, value })
            .ok_or(QueryError::InvalidCondition)
    }

    /// Evaluates the filter against a document.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => doc
                .get(field)
                .is_some_and(|actual| value::values_equal(actual, value)),
            Filter::Predicate(predicate) => predicate.matches(doc),
        }
    }
}

impl From<Predicate> for Filter {
    fn from(predicate: Predicate) -> Self {
        Filter::Predicate(predicate)
    }
}

/// Conversion into a [`Filter`], checked at call time.
///
/// Implemented for filters, predicates, `(field, value)` pairs, JSON
/// objects and maps, and `Option`s of those. `None`, and mappings that do
/// not hold exactly one key, fail with [`QueryError::InvalidCondition`].
pub trait IntoFilter {
    fn into_filter(self) -> Result<Filter>;
}

impl IntoFilter for Filter {
    fn into_filter(self) -> Result<Filter> {
        Ok(self)
    }
}

impl IntoFilter for Predicate {
    fn into_filter(self) -> Result<Filter> {
        Ok(Filter::Predicate(self))
    }
}

impl IntoFilter for Value {
    fn into_filter(self) -> Result<Filter> {
        Filter::from_json(self)
    }
}

impl IntoFilter for Document {
    fn into_filter(self) -> Result<Filter> {
        Filter::from_mapping(self)
    }
}

impl<K, V> IntoFilter for (K, V)
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_filter(self) -> Result<Filter> {
        Ok(Filter::eq(self.0, self.1))
    }
}

impl<T: IntoFilter> IntoFilter for Option<T> {
    fn into_filter(self) -> Result<Filter> {
        self.ok_or(QueryError::InvalidCondition)?.into_filter()
    }
}
