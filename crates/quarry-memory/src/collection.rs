//! Lazy scoped collections over a [`MemoryStore`] table.

use std::cmp::Ordering;
use std::collections::HashMap;

use quarry_query::value::Document;
use quarry_query::{Condition, ScopedCollection, WritableCollection};
use serde_json::Value;

use crate::error::{MemoryError, Result};
use crate::pipeline;
use crate::store::{MemoryStore, Row, Table};

/// A table with zero or more conditions applied.
///
/// Applying a condition only records it; the table is read when a terminal
/// operation runs, and every run sees the table's current contents.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    store: MemoryStore,
    table: String,
    stages: Vec<Condition>,
}

impl MemoryCollection {
    pub(crate) fn new(store: MemoryStore, table: String) -> Self {
        MemoryCollection {
            store,
            table,
            stages: Vec::new(),
        }
    }

    /// Name of the underlying table.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Conditions recorded so far.
    pub fn stages(&self) -> &[Condition] {
        &self.stages
    }

    fn execute(&self) -> Result<Vec<Row>> {
        let tables = self.store.read()?;
        self.run(&tables)
    }

    fn run(&self, tables: &HashMap<String, Table>) -> Result<Vec<Row>> {
        let rows = pipeline::run(&self.table, tables.get(&self.table), &self.stages)?;
        tracing::debug!(
            table = %self.table,
            stages = self.stages.len(),
            rows = rows.len(),
            "executed scoped pipeline"
        );
        Ok(rows)
    }

    // Callers hold the write guard so the scope cannot shift before the write.
    fn scoped_seqs(&self, tables: &HashMap<String, Table>) -> Result<Vec<u64>> {
        Ok(self.run(tables)?.into_iter().map(|row| row.seq).collect())
    }
}

impl ScopedCollection for MemoryCollection {
    type Error = MemoryError;

    fn apply(&self, condition: &Condition) -> Result<Self> {
        let mut scoped = self.clone();
        scoped.stages.push(condition.clone());
        Ok(scoped)
    }

    fn count(&self) -> Result<u64> {
        Ok(self.execute()?.len() as u64)
    }

    fn sum(&self, field: &str) -> Result<f64> {
        pipeline::sum(&self.execute()?, field)
    }

    fn average(&self, field: &str) -> Result<Option<f64>> {
        pipeline::average(&self.execute()?, field)
    }

    fn max(&self, field: &str) -> Result<Option<Value>> {
        Ok(pipeline::extreme(&self.execute()?, field, Ordering::Greater))
    }

    fn min(&self, field: &str) -> Result<Option<Value>> {
        Ok(pipeline::extreme(&self.execute()?, field, Ordering::Less))
    }

    fn fetch_all(&self) -> Result<Vec<Document>> {
        Ok(pipeline::documents(self.execute()?))
    }
}

impl WritableCollection for MemoryCollection {
    /// Inserts into the underlying table; recorded conditions do not apply.
    fn insert(&self, document: Document) -> Result<Value> {
        let mut tables = self.store.write()?;
        let key = tables
            .entry(self.table.clone())
            .or_default()
            .insert(&self.table, document)?;
        tracing::debug!(table = %self.table, key = %key, "inserted document");
        Ok(key)
    }

    fn update(&self, changes: Document) -> Result<u64> {
        let mut tables = self.store.write()?;
        let seqs = self.scoped_seqs(&tables)?;
        let updated = match tables.get_mut(&self.table) {
            Some(table) => table.merge(&self.table, &seqs, &changes)?,
            None => 0,
        };
        tracing::debug!(table = %self.table, updated, "updated documents");
        Ok(updated)
    }

    fn delete(&self) -> Result<u64> {
        let mut tables = self.store.write()?;
        let seqs = self.scoped_seqs(&tables)?;
        let deleted = match tables.get_mut(&self.table) {
            Some(table) => table.remove(&seqs),
            None => 0,
        };
        tracing::debug!(table = %self.table, deleted, "deleted documents");
        Ok(deleted)
    }

    /// Looks up by primary key in the underlying table.
    fn get(&self, key: &Value) -> Result<Option<Document>> {
        let tables = self.store.read()?;
        Ok(tables
            .get(&self.table)
            .and_then(|table| table.find(key))
            .map(|row| row.doc.clone()))
    }
}
