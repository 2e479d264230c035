//! Tables, rows and the shared store handle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use quarry_query::value::{self, Document};
use quarry_query::DocumentBackend;
use serde_json::Value;

use crate::collection::MemoryCollection;
use crate::error::{MemoryError, Result};

/// Default field holding each document's primary key.
///
/// A table's primary key is always usable as an index name.
pub const PRIMARY_KEY: &str = "id";

/// A stored document tagged with its insertion sequence number.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub seq: u64,
    pub doc: Document,
}

#[derive(Debug)]
pub(crate) struct Table {
    primary_key: String,
    rows: Vec<Row>,
    next_seq: u64,
    indexes: HashMap<String, Vec<String>>,
}

impl Default for Table {
    fn default() -> Self {
        Table::new(PRIMARY_KEY)
    }
}

impl Table {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Table {
            primary_key: primary_key.into(),
            rows: Vec::new(),
            next_seq: 0,
            indexes: HashMap::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Fields an index sorts by; the primary key is always indexed.
    pub fn index_fields(&self, index: &str) -> Option<Vec<String>> {
        if index == self.primary_key {
            return Some(vec![self.primary_key.clone()]);
        }
        self.indexes.get(index).cloned()
    }

    pub fn find(&self, key: &Value) -> Option<&Row> {
        self.rows.iter().find(|row| {
            row.doc
                .get(&self.primary_key)
                .is_some_and(|id| value::values_equal(id, key))
        })
    }

    pub fn insert(&mut self, table: &str, mut doc: Document) -> Result<Value> {
        let key = match value::present(&doc, &self.primary_key) {
            Some(key) => key.clone(),
            None => {
                let key = Value::String(uuid::Uuid::new_v4().to_string());
                doc.insert(self.primary_key.clone(), key.clone());
                key
            }
        };

        if self.find(&key).is_some() {
            return Err(MemoryError::DuplicateKey {
                table: table.to_string(),
                key: key.to_string(),
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.push(Row { seq, doc });
        Ok(key)
    }

    /// Merges `changes` into the rows with the given sequence numbers.
    ///
    /// Changes may repeat a row's primary key but never replace it; a
    /// rejected update leaves every row untouched.
    pub fn merge(&mut self, table: &str, seqs: &[u64], changes: &Document) -> Result<u64> {
        if let Some(key) = changes.get(&self.primary_key) {
            let rekeyed = self
                .rows
                .iter()
                .filter(|row| seqs.contains(&row.seq))
                .any(|row| {
                    !row.doc
                        .get(&self.primary_key)
                        .is_some_and(|current| value::values_equal(current, key))
                });
            if rekeyed {
                return Err(MemoryError::PrimaryKeyChanged {
                    table: table.to_string(),
                    field: self.primary_key.clone(),
                });
            }
        }

        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|row| seqs.contains(&row.seq)) {
            for (field, value) in changes {
                row.doc.insert(field.clone(), value.clone());
            }
            updated += 1;
        }
        Ok(updated)
    }

    /// Removes the rows with the given sequence numbers.
    pub fn remove(&mut self, seqs: &[u64]) -> u64 {
        let before = self.rows.len();
        self.rows.retain(|row| !seqs.contains(&row.seq));
        (before - self.rows.len()) as u64
    }
}

/// A thread-safe, cloneable handle to a set of in-memory tables.
///
/// Clones share the same tables. Tables are created on first insert, or
/// explicitly with [`table_create`](Self::table_create).
///
/// # Example
///
/// ```
/// use quarry_memory::MemoryStore;
/// use quarry_query::{QueryBuilder, WritableCollection};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// let users = store.table("users");
/// users.insert(json!({"name": "L", "age": 32}).as_object().unwrap().clone()).unwrap();
///
/// let query = QueryBuilder::new(users).where_eq("name", "L");
/// assert_eq!(query.count().unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Returns an unscoped handle on the named table.
    pub fn table(&self, name: impl Into<String>) -> MemoryCollection {
        MemoryCollection::new(self.clone(), name.into())
    }

    /// Creates an empty table if it does not exist yet.
    pub fn table_create(&self, name: &str) -> Result<()> {
        self.table_create_with_primary_key(name, PRIMARY_KEY)
    }

    /// Creates an empty table keyed by `primary_key` if it does not exist yet.
    ///
    /// An existing table keeps its primary key.
    pub fn table_create_with_primary_key(&self, name: &str, primary_key: &str) -> Result<()> {
        self.write()?
            .entry(name.to_string())
            .or_insert_with(|| Table::new(primary_key));
        Ok(())
    }

    /// Names of every table, sorted.
    pub fn table_list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Defines a secondary index sorting by `fields`, in order.
    ///
    /// Redefining an index replaces its fields.
    pub fn index_create<I, S>(&self, table: &str, index: &str, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.write()?
            .entry(table.to_string())
            .or_default()
            .indexes
            .insert(index.to_string(), fields);
        Ok(())
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables.read().map_err(|_| MemoryError::Poisoned)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables.write().map_err(|_| MemoryError::Poisoned)
    }
}

impl DocumentBackend for MemoryStore {
    type Collection = MemoryCollection;

    fn collection(&self, name: &str) -> MemoryCollection {
        self.table(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn insert_generates_missing_keys() {
        let mut table = Table::default();
        let key = table.insert("users", doc(json!({"name": "L"}))).unwrap();
        assert!(key.is_string());
        assert_eq!(table.rows()[0].doc.get(PRIMARY_KEY), Some(&key));

        let key = table
            .insert("users", doc(json!({"id": null, "name": "MG"})))
            .unwrap();
        assert!(key.is_string());
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let mut table = Table::default();
        table.insert("users", doc(json!({"id": 1}))).unwrap();
        let err = table.insert("users", doc(json!({"id": 1.0}))).unwrap_err();
        assert!(matches!(err, MemoryError::DuplicateKey { .. }));
    }

    #[test]
    fn merge_and_remove_by_sequence() {
        let mut table = Table::default();
        table.insert("t", doc(json!({"id": 1}))).unwrap();
        table.insert("t", doc(json!({"id": 2}))).unwrap();

        assert_eq!(table.merge("t", &[1], &doc(json!({"name": "x"}))).unwrap(), 1);
        assert_eq!(table.rows()[1].doc.get("name"), Some(&json!("x")));

        assert_eq!(table.remove(&[0, 1]), 2);
        assert!(table.rows().is_empty());
    }

    #[test]
    fn merge_keeps_primary_keys() {
        let mut table = Table::default();
        table.insert("users", doc(json!({"id": 1, "name": "L"}))).unwrap();
        table.insert("users", doc(json!({"id": 2, "name": "MG"}))).unwrap();

        let err = table
            .merge("users", &[1], &doc(json!({"id": 1, "name": "S"})))
            .unwrap_err();
        assert!(matches!(err, MemoryError::PrimaryKeyChanged { ref field, .. } if field == "id"));
        assert_eq!(table.rows()[1].doc.get("name"), Some(&json!("MG")));
        assert_eq!(table.find(&json!(1)).map(|row| row.seq), Some(0));

        // Repeating the current key is not a change.
        let updated = table
            .merge("users", &[1], &doc(json!({"id": 2.0, "age": 31})))
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(table.rows()[1].doc.get("age"), Some(&json!(31)));
    }

    #[test]
    fn primary_key_is_an_index() {
        let table = Table::default();
        assert_eq!(table.index_fields("id"), Some(vec!["id".to_string()]));
        assert_eq!(table.index_fields("by_age"), None);
    }

    #[test]
    fn custom_primary_key() {
        let mut table = Table::new("uid");
        let key = table.insert("users", doc(json!({"name": "L"}))).unwrap();
        assert_eq!(table.rows()[0].doc.get("uid"), Some(&key));
        assert!(table.rows()[0].doc.get("id").is_none());
        assert!(table.find(&key).is_some());
        assert_eq!(table.index_fields("uid"), Some(vec!["uid".to_string()]));
        assert_eq!(table.index_fields("id"), None);
    }

    #[test]
    fn tables_are_shared_between_clones() {
        let store = MemoryStore::new();
        store.clone().table_create("b").unwrap();
        store.index_create("a", "by_age", ["age"]).unwrap();
        assert_eq!(store.table_list().unwrap(), vec!["a", "b"]);
    }
}
