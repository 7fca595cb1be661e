//! Requester accounts.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::store::{decode, Collection, RecordStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStates {
    #[serde(default)]
    pub authority: String,
    #[serde(default)]
    pub active: String,
    #[serde(default)]
    pub blocked: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub states: AccountStates,
}

#[async_trait]
pub trait AccountResolver: Send + Sync {
    async fn resolve(&self, email: &str) -> Result<Account, ApiError>;
}

/// Account lookup against the record store, keyed by email.
pub struct RecordAccountResolver {
    store: Arc<dyn RecordStore>,
    api: ApiConfig,
}

impl RecordAccountResolver {
    pub fn new(store: Arc<dyn RecordStore>, api: ApiConfig) -> Self {
        Self { store, api }
    }
}

#[async_trait]
impl AccountResolver for RecordAccountResolver {
    async fn resolve(&self, email: &str) -> Result<Account, ApiError> {
        let args = self.api.args(email, "");
        let value = self.store.get(&args, Collection::Accounts, email).await?;
        decode(Collection::Accounts, value)
    }
}
