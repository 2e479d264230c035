//! Comparison operators used by [`Predicate`](crate::Predicate) expressions.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::value;

/// How a document field is compared against an expected value.
///
/// `Gt`, `Gte`, `Lt` and `Lte` only hold between values of the same kind,
/// so `"10" > 9` is false rather than decided by type order. `Eq` treats
/// `31` and `31.0` as equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// String prefix.
    StartsWith,
    /// String suffix.
    EndsWith,
    /// Substring of a string field, or element of an array field.
    Contains,
    /// The field equals one element of an expected array.
    In,
}

impl Op {
    /// Evaluates `actual <op> expected`.
    pub fn holds(self, actual: &Value, expected: &Value) -> bool {
        match self {
            Op::Eq => value::values_equal(actual, expected),
            Op::Ne => !value::values_equal(actual, expected),
            Op::Gt => ranked(actual, expected, |o| o == Ordering::Greater),
            Op::Gte => ranked(actual, expected, |o| o != Ordering::Less),
            Op::Lt => ranked(actual, expected, |o| o == Ordering::Less),
            Op::Lte => ranked(actual, expected, |o| o != Ordering::Greater),
            Op::StartsWith => strings(actual, expected, |s, prefix| s.starts_with(prefix)),
            Op::EndsWith => strings(actual, expected, |s, suffix| s.ends_with(suffix)),
            Op::Contains => match actual {
                Value::String(s) => expected.as_str().is_some_and(|needle| s.contains(needle)),
                Value::Array(items) => items.iter().any(|item| value::values_equal(item, expected)),
                _ => false,
            },
            Op::In => expected
                .as_array()
                .is_some_and(|options| options.iter().any(|o| value::values_equal(actual, o))),
        }
    }

    /// Operator name as used in query descriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "ge",
            Op::Lt => "lt",
            Op::Lte => "le",
            Op::StartsWith => "starts_with",
            Op::EndsWith => "ends_with",
            Op::Contains => "contains",
            Op::In => "in",
        }
    }
}

fn ranked(actual: &Value, expected: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    !actual.is_null()
        && value::same_kind(actual, expected)
        && accept(value::compare_values(actual, expected))
}

fn strings(actual: &Value, expected: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (actual, expected) {
        (Value::String(s), Value::String(pattern)) => test(s, pattern),
        _ => false,
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
