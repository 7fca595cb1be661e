//! In-memory record store for tests and dry runs.

use super::{ApiArgs, Collection, RecordStore};
use crate::error::ApiError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Record store keeping every collection in insertion order.
///
/// Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<Collection, Vec<Value>>>,
    fail_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without going through the async contract.
    pub fn insert(&self, collection: Collection, record: Value) -> Result<(), ApiError> {
        let mut records = self.records.write();
        let entries = records.entry(collection).or_default();
        if collection.is_append_only() {
            entries.push(record);
            return Ok(());
        }
        let key = collection.record_key(&record)?;
        match entries
            .iter_mut()
            .find(|existing| collection.record_key(existing).ok().as_deref() == Some(key.as_str()))
        {
            Some(existing) => *existing = record,
            None => entries.push(record),
        }
        Ok(())
    }

    /// Snapshot of a collection.
    pub fn records(&self, collection: Collection) -> Vec<Value> {
        self.records
            .read()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every subsequent post and delete fail with a transport error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, collection: Collection) -> Result<(), ApiError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Transport(format!(
                "writes to {} are disabled",
                collection
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(
        &self,
        _args: &ApiArgs,
        collection: Collection,
        id: &str,
    ) -> Result<Value, ApiError> {
        let records = self.records.read();
        records
            .get(&collection)
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|record| collection.record_key(record).ok().as_deref() == Some(id))
            })
            .cloned()
            .ok_or_else(|| ApiError::not_found(collection.name(), id))
    }

    async fn list(&self, _args: &ApiArgs, collection: Collection) -> Result<Vec<Value>, ApiError> {
        Ok(self.records(collection))
    }

    async fn post(
        &self,
        _args: &ApiArgs,
        collection: Collection,
        record: &Value,
    ) -> Result<(), ApiError> {
        self.check_writable(collection)?;
        self.insert(collection, record.clone())
    }

    async fn delete(
        &self,
        _args: &ApiArgs,
        collection: Collection,
        id: &str,
    ) -> Result<(), ApiError> {
        self.check_writable(collection)?;
        let mut records = self.records.write();
        let entries = records.entry(collection).or_default();
        let before = entries.len();
        entries.retain(|record| collection.record_key(record).ok().as_deref() != Some(id));
        if entries.len() == before {
            return Err(ApiError::not_found(collection.name(), id));
        }
        Ok(())
    }
}
