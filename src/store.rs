//! In-memory record store.
//!
//! Holds the records most recently fetched from the upstream API, plus
//! anything created through the CRUD endpoints. Contents live only as long
//! as the process: a successful fetch replaces the whole collection.
//!
//! Records are open-schema JSON objects. The store only interprets one
//! field, `id`, which must be an integer and unique across the collection.
//! Insertion order is preserved and `update` replaces in place, so callers
//! observe a stable ordering across mutations.

use serde_json::{Map, Value};
use thiserror::Error;

/// A single open-schema record: a JSON object keyed by field name.
pub type Record = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Item not found")]
    NotFound,
    #[error("Item must have an 'id' field")]
    MissingId,
    #[error("Item with this ID already exists")]
    DuplicateId,
}

/// Returns the integer `id` of a record, if it carries one.
pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

/// Insertion-ordered collection of records, unique by `id`.
#[derive(Debug, Default)]
pub struct DataStore {
    items: Vec<Record>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents, in insertion order.
    pub fn list(&self) -> &[Record] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Linear scan for the first record with a matching `id`.
    pub fn get(&self, id: i64) -> Result<&Record, StoreError> {
        self.items
            .iter()
            .find(|record| record_id(record) == Some(id))
            .ok_or(StoreError::NotFound)
    }

    /// Appends a record. The record must carry an integer `id` that is not
    /// already present in the store.
    pub fn create(&mut self, record: Record) -> Result<Record, StoreError> {
        let id = record_id(&record).ok_or(StoreError::MissingId)?;
        if self.items.iter().any(|r| record_id(r) == Some(id)) {
            return Err(StoreError::DuplicateId);
        }
        self.items.push(record.clone());
        Ok(record)
    }

    /// Replaces the record with the given `id` wholesale, keeping its
    /// position. The replacement may change or drop its own `id`, but a
    /// replacement `id` that already belongs to a different record is
    /// rejected so the uniqueness invariant holds.
    pub fn update(&mut self, id: i64, record: Record) -> Result<Record, StoreError> {
        let position = self
            .items
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or(StoreError::NotFound)?;
        if let Some(new_id) = record_id(&record) {
            if new_id != id && self.items.iter().any(|r| record_id(r) == Some(new_id)) {
                return Err(StoreError::DuplicateId);
            }
        }
        self.items[position] = record.clone();
        Ok(record)
    }

    /// Removes and returns the record with the given `id`.
    pub fn delete(&mut self, id: i64) -> Result<Record, StoreError> {
        let position = self
            .items
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or(StoreError::NotFound)?;
        Ok(self.items.remove(position))
    }

    /// Wholesale replacement, used after a successful upstream fetch.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        self.items = records;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().expect("test record is an object").clone()
    }

    #[test]
    fn create_then_get_returns_same_record() {
        let mut store = DataStore::new();
        let created = store
            .create(record(json!({"id": 1, "name": "a"})))
            .expect("create should succeed");
        assert_eq!(created, record(json!({"id": 1, "name": "a"})));
        assert_eq!(store.get(1).expect("get should find it"), &created);
    }

    #[test]
    fn create_without_id_is_rejected() {
        let mut store = DataStore::new();
        let err = store.create(record(json!({"name": "a"}))).unwrap_err();
        assert_eq!(err, StoreError::MissingId);
        assert!(store.is_empty());
    }

    #[test]
    fn create_with_duplicate_id_leaves_store_unchanged() {
        let mut store = DataStore::new();
        store
            .create(record(json!({"id": 1, "name": "a"})))
            .expect("first create should succeed");
        let err = store
            .create(record(json!({"id": 1, "name": "b"})))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateId);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).expect("original survives")["name"], "a");
    }

    #[test]
    fn records_may_differ_structurally() {
        let mut store = DataStore::new();
        store
            .create(record(json!({"id": 1, "name": "a"})))
            .expect("create");
        store
            .create(record(json!({"id": 2, "score": 9.5, "tags": ["x"]})))
            .expect("create with different shape");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn delete_then_get_fails_with_not_found() {
        let mut store = DataStore::new();
        store
            .create(record(json!({"id": 1, "name": "a"})))
            .expect("create");
        let removed = store.delete(1).expect("delete should succeed");
        assert_eq!(removed["name"], "a");
        assert_eq!(store.get(1).unwrap_err(), StoreError::NotFound);
    }

    #[test]
    fn delete_on_empty_store_fails_with_not_found() {
        let mut store = DataStore::new();
        assert_eq!(store.delete(1).unwrap_err(), StoreError::NotFound);
    }

    #[test]
    fn update_missing_id_leaves_store_unchanged() {
        let mut store = DataStore::new();
        store
            .create(record(json!({"id": 1, "name": "a"})))
            .expect("create");
        let err = store
            .update(2, record(json!({"id": 2, "name": "b"})))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).expect("untouched")["name"], "a");
    }

    #[test]
    fn update_preserves_size_and_position() {
        let mut store = DataStore::new();
        store.create(record(json!({"id": 1}))).expect("create");
        store.create(record(json!({"id": 2}))).expect("create");
        store.create(record(json!({"id": 3}))).expect("create");
        store
            .update(2, record(json!({"id": 2, "name": "replaced"})))
            .expect("update should succeed");
        assert_eq!(store.len(), 3);
        assert_eq!(record_id(&store.list()[1]), Some(2));
        assert_eq!(store.list()[1]["name"], "replaced");
    }

    #[test]
    fn update_rejects_id_owned_by_another_record() {
        let mut store = DataStore::new();
        store.create(record(json!({"id": 1}))).expect("create");
        store.create(record(json!({"id": 2}))).expect("create");
        let err = store
            .update(2, record(json!({"id": 1, "name": "clash"})))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateId);
        assert_eq!(store.list()[1], record(json!({"id": 2})));
    }

    #[test]
    fn update_may_change_its_own_id() {
        let mut store = DataStore::new();
        store.create(record(json!({"id": 1}))).expect("create");
        store
            .update(1, record(json!({"id": 7, "name": "moved"})))
            .expect("update to a fresh id should succeed");
        assert_eq!(store.get(7).expect("reachable under new id")["name"], "moved");
        assert_eq!(store.get(1).unwrap_err(), StoreError::NotFound);
    }

    #[test]
    fn replace_all_swaps_contents_wholesale() {
        let mut store = DataStore::new();
        store.create(record(json!({"id": 1}))).expect("create");
        store.replace_all(vec![
            record(json!({"id": 10})),
            record(json!({"id": 11})),
        ]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap_err(), StoreError::NotFound);
        assert!(store.get(10).is_ok());
    }
}
