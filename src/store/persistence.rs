//! Sled-backed record store for local, offline operation.
//!
//! One tree per collection, JSON-encoded values keyed by the collection's key
//! field. Events are keyed by a monotonically generated id.

use super::{ApiArgs, Collection, RecordStore};
use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub struct SledRecordStore {
    db: sled::Db,
}

impl SledRecordStore {
    pub fn open(path: &Path) -> Result<Self, ApiError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn tree(&self, collection: Collection) -> Result<sled::Tree, ApiError> {
        Ok(self.db.open_tree(collection.name())?)
    }

    fn decode(collection: Collection, bytes: &[u8]) -> Result<Value, ApiError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::malformed(format!("stored {} record", collection), e))
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), ApiError> {
        self.db.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SledRecordStore {
    async fn get(
        &self,
        _args: &ApiArgs,
        collection: Collection,
        id: &str,
    ) -> Result<Value, ApiError> {
        let tree = self.tree(collection)?;
        match tree.get(id.as_bytes())? {
            Some(bytes) => Self::decode(collection, &bytes),
            None => Err(ApiError::not_found(collection.name(), id)),
        }
    }

    async fn list(&self, _args: &ApiArgs, collection: Collection) -> Result<Vec<Value>, ApiError> {
        let tree = self.tree(collection)?;
        tree.iter()
            .values()
            .map(|value| Self::decode(collection, &value?))
            .collect()
    }

    async fn post(
        &self,
        _args: &ApiArgs,
        collection: Collection,
        record: &Value,
    ) -> Result<(), ApiError> {
        let tree = self.tree(collection)?;
        let key = if collection.is_append_only() {
            self.db.generate_id()?.to_be_bytes().to_vec()
        } else {
            collection.record_key(record)?.into_bytes()
        };
        let bytes = serde_json::to_vec(record)
            .map_err(|e| ApiError::malformed(format!("{} record", collection), e))?;
        tree.insert(key, bytes)?;
        debug!(collection = %collection, "record stored");
        Ok(())
    }

    async fn delete(
        &self,
        _args: &ApiArgs,
        collection: Collection,
        id: &str,
    ) -> Result<(), ApiError> {
        let tree = self.tree(collection)?;
        match tree.remove(id.as_bytes())? {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(collection.name(), id)),
        }
    }
}
