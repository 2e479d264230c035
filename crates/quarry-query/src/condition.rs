//! Recorded query conditions.
//!
//! A [`ConditionList`] is the ordered record of every operation requested on
//! a query builder. Nothing is evaluated while it grows: the list is folded
//! over a base collection only when a result is needed.

use std::fmt;

use crate::filter::Filter;
use crate::order::OrderKey;
use crate::scoped::ScopedCollection;

/// A single deferred operation.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Restrict to documents matching the filter.
    Filter(Filter),
    /// Keep only the named fields of each document.
    Pluck(Vec<String>),
    /// Keep documents that carry every named field.
    HasFields(Vec<String>),
    /// Cap the number of documents.
    Limit(usize),
    /// Sort by the given keys.
    OrderBy(Vec<OrderKey>),
}

impl Condition {
    /// Returns the operation tag of this condition.
    pub fn tag(&self) -> &'static str {
        match self {
            Condition::Filter(_) => "filter",
            Condition::Pluck(_) => "pluck",
            Condition::HasFields(_) => "has_fields",
            Condition::Limit(_) => "limit",
            Condition::OrderBy(_) => "order_by",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Ordered sequence of conditions.
///
/// Order is significant: conditions are applied strictly left to right, and
/// a later `order_by` does not remove an earlier one from the list.
#[derive(Debug, Clone, Default)]
pub struct ConditionList {
    conditions: Vec<Condition>,
}

impl ConditionList {
    /// Creates an empty list.
    pub fn new() -> Self {
        ConditionList::default()
    }

    /// Appends a condition.
    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Returns a new list holding this list's conditions followed by `other`'s.
    pub fn concat(&self, other: &ConditionList) -> ConditionList {
        let mut conditions = Vec::with_capacity(self.len() + other.len());
        conditions.extend(self.conditions.iter().cloned());
        conditions.extend(other.conditions.iter().cloned());
        ConditionList { conditions }
    }

    /// Number of recorded conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterates over the conditions in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    /// Returns the operation tags in application order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.conditions.iter().map(Condition::tag).collect()
    }

    /// Applies every condition to `base`, left to right.
    ///
    /// The first error reported by the collection aborts the fold and is
    /// returned unchanged. With no conditions the result is a copy of `base`.
    pub fn fold<C: ScopedCollection>(&self, base: &C) -> Result<C, C::Error> {
        self.conditions
            .iter()
            .try_fold(base.clone(), |scoped, condition| scoped.apply(condition))
    }
}

impl From<Vec<Condition>> for ConditionList {
    fn from(conditions: Vec<Condition>) -> Self {
        ConditionList { conditions }
    }
}

impl<'a> IntoIterator for &'a ConditionList {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}
