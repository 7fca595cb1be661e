//! Record Store
//!
//! Port to the remote record store holding assemblies, components, requests,
//! flavors, accounts and events. The core only speaks JSON values per
//! collection; typed decoding happens in the owning modules.

pub mod http;
pub mod memory;
pub mod persistence;

use crate::error::ApiError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;
pub use persistence::SledRecordStore;

/// Record collections addressed by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Assembly,
    Components,
    Requests,
    Flavors,
    Accounts,
    Events,
}

impl Collection {
    /// Path segment of the collection.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Assembly => "assembly",
            Collection::Components => "components",
            Collection::Requests => "requests",
            Collection::Flavors => "flavors",
            Collection::Accounts => "accounts",
            Collection::Events => "events",
        }
    }

    /// Field identifying a record within the collection.
    pub fn key_field(&self) -> &'static str {
        match self {
            Collection::Accounts => "email",
            _ => "id",
        }
    }

    /// Events are appended, everything else is upserted by key.
    pub fn is_append_only(&self) -> bool {
        matches!(self, Collection::Events)
    }

    /// Extract the identifying key of `record`.
    pub fn record_key(&self, record: &Value) -> Result<String, ApiError> {
        record
            .get(self.key_field())
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ApiError::malformed(
                    format!("{} record", self.name()),
                    format!("missing '{}' field", self.key_field()),
                )
            })
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Requester-scoped credentials attached to every record store call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiArgs {
    pub url: String,
    pub email: String,
    pub org_id: String,
    pub master_key: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for ApiArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiArgs")
            .field("url", &self.url)
            .field("email", &self.email)
            .field("org_id", &self.org_id)
            .field("master_key", &"<redacted>")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Record fetch/update contract.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record by id. Absent records fail with `NotFound` or
    /// `EmptyResult` depending on how the backend reports them.
    async fn get(&self, args: &ApiArgs, collection: Collection, id: &str)
        -> Result<Value, ApiError>;

    /// List every record of a collection visible to `args`.
    async fn list(&self, args: &ApiArgs, collection: Collection) -> Result<Vec<Value>, ApiError>;

    /// Create or update a record.
    async fn post(
        &self,
        args: &ApiArgs,
        collection: Collection,
        record: &Value,
    ) -> Result<(), ApiError>;

    async fn delete(&self, args: &ApiArgs, collection: Collection, id: &str)
        -> Result<(), ApiError>;
}

/// Decode a stored record into its typed form.
pub fn decode<T: DeserializeOwned>(collection: Collection, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::malformed(format!("{} record", collection.name()), e))
}
