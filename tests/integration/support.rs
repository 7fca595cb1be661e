//! Shared fixtures and recording doubles.

use async_trait::async_trait;
use carton::error::ApiError;
use carton::events::{EventBatch, EventNotifier};
use carton::store::{ApiArgs, Collection, MemoryRecordStore, RecordStore};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

/// Ordered log of collaborator calls shared between doubles.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Record store that logs every write before delegating to memory.
pub struct RecordingStore {
    pub inner: MemoryRecordStore,
    log: CallLog,
}

impl RecordingStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: MemoryRecordStore::new(),
            log,
        }
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn get(&self, args: &ApiArgs, collection: Collection, id: &str) -> Result<Value, ApiError> {
        self.inner.get(args, collection, id).await
    }

    async fn list(&self, args: &ApiArgs, collection: Collection) -> Result<Vec<Value>, ApiError> {
        self.inner.list(args, collection).await
    }

    async fn post(&self, args: &ApiArgs, collection: Collection, record: &Value) -> Result<(), ApiError> {
        self.log.lock().push(format!("persist:{}", collection));
        self.inner.post(args, collection, record).await
    }

    async fn delete(&self, args: &ApiArgs, collection: Collection, id: &str) -> Result<(), ApiError> {
        self.log.lock().push(format!("delete:{}", collection));
        self.inner.delete(args, collection, id).await
    }
}

/// Notifier that logs every write, optionally failing it.
pub struct RecordingNotifier {
    log: CallLog,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new(log: CallLog, fail: bool) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl EventNotifier for RecordingNotifier {
    async fn write(&self, batch: &EventBatch) -> Result<(), ApiError> {
        self.log.lock().push(format!("notify:{}", batch.events.len()));
        if self.fail {
            return Err(ApiError::Transport("queue unreachable".to_string()));
        }
        Ok(())
    }
}

pub fn account() -> Value {
    json!({
        "id": "ACT1",
        "email": "ops@example.com",
        "api_key": "api-123",
        "states": {"authority": "user", "active": "true"}
    })
}

pub fn assembly(components: &[&str], inputs: Value) -> Value {
    json!({
        "id": "ASM1",
        "org_id": "ORG1",
        "account_id": "ops@example.com",
        "name": "web01",
        "json_claz": "Assembly",
        "tosca_type": "tosca.torpedo.ubuntu",
        "status": "launching",
        "state": "initialized",
        "inputs": inputs,
        "outputs": [
            {"key": "publicipv4", "value": "198.51.100.20"},
            {"key": "instance_id", "value": "one-77"}
        ],
        "policies": [
            {"name": "backup", "ptype": "schedule", "status": "done"},
            {"name": "scale-up", "ptype": "scaling", "status": "initializing",
             "rules": [{"key": "max", "value": "4"}]}
        ],
        "components": components
    })
}
