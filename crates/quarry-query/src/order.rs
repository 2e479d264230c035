//! Ordering keys for `order_by` conditions.

use std::cmp::Ordering;
use std::fmt;

use crate::value::{self, Document};

/// Direction of one ordering key. Ascending unless wrapped with `desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    /// Orients a natural (ascending) comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        if self == Dir::Desc {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        })
    }
}

/// What an [`OrderKey`] sorts by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderTarget {
    /// A document field.
    Field(String),
    /// A named secondary index of the collection.
    Index(String),
}

impl OrderTarget {
    /// Returns the field or index name.
    pub fn name(&self) -> &str {
        match self {
            OrderTarget::Field(name) | OrderTarget::Index(name) => name,
        }
    }
}

/// A single ordering key: a field or index and a direction.
///
/// Strings convert into ascending field keys:
///
/// ```
/// use quarry_query::{Dir, OrderKey};
///
/// let key: OrderKey = "age".into();
/// assert_eq!(key, OrderKey::field("age"));
/// assert_eq!(key.descending().dir, Dir::Desc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderKey {
    /// The field or index to sort by.
    pub target: OrderTarget,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderKey {
    /// Ascending key on a field.
    pub fn field(name: impl Into<String>) -> Self {
        OrderKey {
            target: OrderTarget::Field(name.into()),
            dir: Dir::Asc,
        }
    }

    /// Ascending key on a named index.
    pub fn index(name: impl Into<String>) -> Self {
        OrderKey {
            target: OrderTarget::Index(name.into()),
            dir: Dir::Asc,
        }
    }

    /// Returns the same key sorted descending.
    pub fn descending(self) -> Self {
        OrderKey {
            dir: Dir::Desc,
            ..self
        }
    }

    /// Returns `true` if the key names an index rather than a field.
    pub fn is_index(&self) -> bool {
        matches!(self.target, OrderTarget::Index(_))
    }
}

impl From<&str> for OrderKey {
    fn from(name: &str) -> Self {
        OrderKey::field(name)
    }
}

impl From<String> for OrderKey {
    fn from(name: String) -> Self {
        OrderKey::field(name)
    }
}

/// Compares one field of two documents in the given direction.
///
/// Documents lacking the field sort after those that have it, before the
/// direction is applied.
pub fn compare_field(a: &Document, b: &Document, field: &str, dir: Dir) -> Ordering {
    let ordering = match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => value::compare_values(x, y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    };
    dir.apply(ordering)
}

/// Compares two documents by a list of `(field, direction)` keys.
///
/// The first key is the primary sort key, the second breaks ties, and so on.
pub fn compare_documents<S: AsRef<str>>(a: &Document, b: &Document, keys: &[(S, Dir)]) -> Ordering {
    for (field, dir) in keys {
        let ordering = compare_field(a, b, field.as_ref(), *dir);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Dir::Desc.to_string(), "desc");
    }

    #[test]
    fn key_constructors() {
        let key = OrderKey::index("by_age").descending();
        assert!(key.is_index());
        assert_eq!(key.target.name(), "by_age");
        assert_eq!(key.dir, Dir::Desc);

        let key: OrderKey = String::from("name").into();
        assert!(!key.is_index());
        assert_eq!(key.dir, Dir::Asc);
    }

    #[test]
    fn missing_fields_sort_last_ascending() {
        let l = doc(json!({"name": "L", "age": 32}));
        let s = doc(json!({"name": "S"}));

        assert_eq!(compare_field(&l, &s, "age", Dir::Asc), Ordering::Less);
        assert_eq!(compare_field(&l, &s, "age", Dir::Desc), Ordering::Greater);
    }

    #[test]
    fn compare_by_multiple_keys() {
        let a = doc(json!({"team": 1, "name": "b"}));
        let b = doc(json!({"team": 1, "name": "a"}));

        assert_eq!(
            compare_documents(&a, &b, &[("team", Dir::Asc), ("name", Dir::Asc)]),
            Ordering::Greater
        );
        assert_eq!(
            compare_documents(&a, &b, &[("team", Dir::Asc), ("name", Dir::Desc)]),
            Ordering::Less
        );
        assert_eq!(
            compare_documents::<&str>(&a, &b, &[]),
            Ordering::Equal
        );
    }
}
