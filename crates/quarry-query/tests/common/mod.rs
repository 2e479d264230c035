//! A small in-process collection used to exercise resolution.

#![allow(dead_code)]

use std::sync::Arc;

use quarry_query::value::{self, Document};
use quarry_query::{compare_documents, Condition, OrderTarget, ScopedCollection};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FakeError {
    #[error("index '{0}' does not exist")]
    UnknownIndex(String),
}

/// Evaluates conditions eagerly over a shared vector and records their tags.
#[derive(Debug, Clone)]
pub struct VecCollection {
    docs: Arc<Vec<Document>>,
    pub applied: Vec<&'static str>,
}

impl VecCollection {
    pub fn new(docs: Vec<Value>) -> Self {
        let docs = docs
            .into_iter()
            .filter_map(|doc| match doc {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        VecCollection {
            docs: Arc::new(docs),
            applied: Vec::new(),
        }
    }

    fn values<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.docs.iter().filter_map(move |doc| value::present(doc, field))
    }
}

impl ScopedCollection for VecCollection {
    type Error = FakeError;

    fn apply(&self, condition: &Condition) -> Result<Self, FakeError> {
        let mut docs: Vec<Document> = self.docs.as_ref().clone();
        match condition {
            Condition::Filter(filter) => docs.retain(|doc| filter.matches(doc)),
            Condition::Pluck(fields) if !fields.is_empty() => {
                docs = docs.iter().map(|doc| value::project(doc, fields)).collect();
            }
            Condition::Pluck(_) => {}
            Condition::HasFields(fields) => docs.retain(|doc| value::has_fields(doc, fields)),
            Condition::Limit(n) => docs.truncate(*n),
            Condition::OrderBy(keys) => {
                let mut fields = Vec::with_capacity(keys.len());
                for key in keys {
                    match &key.target {
                        OrderTarget::Field(name) => fields.push((name.clone(), key.dir)),
                        OrderTarget::Index(name) => {
                            return Err(FakeError::UnknownIndex(name.clone()))
                        }
                    }
                }
                docs.sort_by(|a, b| compare_documents(a, b, &fields));
            }
        }
        let mut applied = self.applied.clone();
        applied.push(condition.tag());
        Ok(VecCollection {
            docs: Arc::new(docs),
            applied,
        })
    }

    fn count(&self) -> Result<u64, FakeError> {
        Ok(self.docs.len() as u64)
    }

    fn sum(&self, field: &str) -> Result<f64, FakeError> {
        Ok(self.values(field).filter_map(Value::as_f64).sum())
    }

    fn average(&self, field: &str) -> Result<Option<f64>, FakeError> {
        let numbers: Vec<f64> = self.values(field).filter_map(Value::as_f64).collect();
        if numbers.is_empty() {
            return Ok(None);
        }
        Ok(Some(numbers.iter().sum::<f64>() / numbers.len() as f64))
    }

    fn max(&self, field: &str) -> Result<Option<Value>, FakeError> {
        Ok(self
            .values(field)
            .max_by(|a, b| value::compare_values(a, b))
            .cloned())
    }

    fn min(&self, field: &str) -> Result<Option<Value>, FakeError> {
        Ok(self
            .values(field)
            .min_by(|a, b| value::compare_values(a, b))
            .cloned())
    }

    fn fetch_all(&self) -> Result<Vec<Document>, FakeError> {
        Ok(self.docs.as_ref().clone())
    }
}
