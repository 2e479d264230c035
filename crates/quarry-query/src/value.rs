//! Document values and their comparison.
//!
//! Documents are JSON objects. Field values are compared with a total
//! ordering that mirrors the store's type order, so sorting never has to
//! give up on mixed-type fields:
//!
//! ```text
//! array < bool < null < number < object < string
//! ```

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Returns the value of `field` when it is present and not `null`.
///
/// A `null` field is treated as absent by `has_fields` and by the
/// aggregate operations.
pub fn present<'a>(doc: &'a Document, field: &str) -> Option<&'a Value> {
    match doc.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

/// Returns `true` if the document carries every field with a non-null value.
pub fn has_fields<S: AsRef<str>>(doc: &Document, fields: &[S]) -> bool {
    fields.iter().all(|field| present(doc, field.as_ref()).is_some())
}

/// Returns a copy of the document restricted to the named fields.
///
/// Fields the document lacks are left out rather than filled with `null`.
pub fn project<S: AsRef<str>>(doc: &Document, fields: &[S]) -> Document {
    fields
        .iter()
        .filter_map(|field| {
            let field = field.as_ref();
            doc.get(field).map(|value| (field.to_string(), value.clone()))
        })
        .collect()
}

/// Returns the display name of a value's type.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Bool(_) => "bool",
        Value::Null => "null",
        Value::Number(_) => "number",
        Value::Object(_) => "object",
        Value::String(_) => "string",
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Array(_) => 0,
        Value::Bool(_) => 1,
        Value::Null => 2,
        Value::Number(_) => 3,
        Value::Object(_) => 4,
        Value::String(_) => 5,
    }
}

/// Returns `true` if both values are of the same comparable kind.
pub fn same_kind(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b)
}

/// Compares two numbers, handling mixed integer and float representations.
pub fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    let a = a.as_f64().unwrap_or(f64::NAN);
    let b = b.as_f64().unwrap_or(f64::NAN);
    a.total_cmp(&b)
}

/// Compares two values using the store's type order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ordering = compare_values(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::Object(a), Value::Object(b)) => compare_objects(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_objects(a: &Document, b: &Document) -> Ordering {
    let mut left: Vec<_> = a.iter().collect();
    let mut right: Vec<_> = b.iter().collect();
    left.sort_by(|x, y| x.0.cmp(y.0));
    right.sort_by(|x, y| x.0.cmp(y.0));

    for ((ka, va), (kb, vb)) in left.iter().zip(right.iter()) {
        let ordering = ka.cmp(kb).then_with(|| compare_values(va, vb));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

/// Returns `true` if both values are equal; `31` equals `31.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Equal
}
