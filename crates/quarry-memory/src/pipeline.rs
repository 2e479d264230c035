//! Execution of recorded conditions over table rows.

use std::cmp::Ordering;

use quarry_query::value::{self, Document};
use quarry_query::{compare_documents, Condition, Dir, OrderKey, OrderTarget};
use serde_json::Value;

use crate::error::{MemoryError, Result};
use crate::store::{Row, Table};

/// Runs `stages` over the rows of `table`, in insertion order.
///
/// A missing table behaves as an empty one.
pub(crate) fn run(name: &str, table: Option<&Table>, stages: &[Condition]) -> Result<Vec<Row>> {
    let Some(table) = table else {
        return Ok(Vec::new());
    };

    let mut rows = table.rows().to_vec();
    for stage in stages {
        match stage {
            Condition::Filter(filter) => rows.retain(|row| filter.matches(&row.doc)),
            Condition::Pluck(fields) => {
                if !fields.is_empty() {
                    for row in &mut rows {
                        row.doc = value::project(&row.doc, fields);
                    }
                }
            }
            Condition::HasFields(fields) => rows.retain(|row| value::has_fields(&row.doc, fields)),
            Condition::Limit(count) => rows.truncate(*count),
            Condition::OrderBy(keys) => {
                let keys = sort_keys(name, table, keys)?;
                sort(&mut rows, &keys);
            }
        }
    }
    Ok(rows)
}

fn sort_keys(name: &str, table: &Table, keys: &[OrderKey]) -> Result<Vec<(String, Dir)>> {
    let mut resolved = Vec::with_capacity(keys.len());
    for key in keys {
        match &key.target {
            OrderTarget::Field(field) => resolved.push((field.clone(), key.dir)),
            OrderTarget::Index(index) => {
                let fields = table
                    .index_fields(index)
                    .ok_or_else(|| MemoryError::UnknownIndex {
                        table: name.to_string(),
                        index: index.clone(),
                    })?;
                resolved.extend(fields.into_iter().map(|field| (field, key.dir)));
            }
        }
    }
    Ok(resolved)
}

// Ties fall back to insertion order, not to any earlier sort.
fn sort(rows: &mut [Row], keys: &[(String, Dir)]) {
    rows.sort_by(|a, b| compare_documents(&a.doc, &b.doc, keys).then(a.seq.cmp(&b.seq)));
}

fn numbers<'a>(docs: &'a [Row], field: &'a str) -> impl Iterator<Item = Result<f64>> + 'a {
    docs.iter()
        .filter_map(move |row| value::present(&row.doc, field))
        .map(move |v| {
            v.as_f64().ok_or_else(|| MemoryError::NotNumeric {
                field: field.to_string(),
                found: value::type_name(v),
            })
        })
}

pub(crate) fn sum(rows: &[Row], field: &str) -> Result<f64> {
    numbers(rows, field).sum()
}

pub(crate) fn average(rows: &[Row], field: &str) -> Result<Option<f64>> {
    let values = numbers(rows, field).collect::<Result<Vec<f64>>>()?;
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
}

pub(crate) fn extreme(rows: &[Row], field: &str, wanted: Ordering) -> Option<Value> {
    rows.iter()
        .filter_map(|row| value::present(&row.doc, field))
        .fold(None, |best: Option<&Value>, candidate| match best {
            Some(current) if value::compare_values(candidate, current) != wanted => Some(current),
            _ => Some(candidate),
        })
        .cloned()
}

pub(crate) fn documents(rows: Vec<Row>) -> Vec<Document> {
    rows.into_iter().map(|row| row.doc).collect()
}
