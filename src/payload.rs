//! Queue payloads
//!
//! A message on the request queue either carries the whole request inline or
//! only points at a stored request by id. The two are told apart by the
//! length of the cartons id.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::store::{decode, Collection, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Cartons ids shorter than this (after trimming) mark a reference payload.
pub const MIN_CARTONS_ID_LEN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub action: String,
    /// Cartons id
    #[serde(default)]
    pub cat_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(rename = "cattype", default)]
    pub cat_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A request ready to be processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requests {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub cat_id: String,
    #[serde(default)]
    pub cattype: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Payload {
    /// Decode a raw queue message.
    pub fn decode(raw: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(raw).map_err(|e| ApiError::malformed("payload", e))
    }

    /// True when the payload only references a stored request.
    pub fn is_reference(&self) -> bool {
        self.cat_id.trim().len() < MIN_CARTONS_ID_LEN
    }

    /// Turn the payload into a request, looking it up when the payload is
    /// only a reference.
    pub async fn convert(&self, lookup: &dyn RequestLookup) -> Result<Requests, ApiError> {
        if self.is_reference() {
            debug!(request = %self.id, account = %self.account_id, "list requests");
            return lookup.lookup(&self.id, &self.account_id).await;
        }
        Ok(Requests {
            action: self.action.clone(),
            category: self.category.clone(),
            account_id: self.account_id.clone(),
            cat_id: self.cat_id.clone(),
            created_at: self.created_at,
            ..Requests::default()
        })
    }
}

/// Fetches a stored request by id on behalf of an account.
#[async_trait]
pub trait RequestLookup: Send + Sync {
    async fn lookup(&self, id: &str, account_id: &str) -> Result<Requests, ApiError>;
}

pub struct RecordRequestLookup {
    store: Arc<dyn RecordStore>,
    api: ApiConfig,
}

impl RecordRequestLookup {
    pub fn new(store: Arc<dyn RecordStore>, api: ApiConfig) -> Self {
        Self { store, api }
    }
}

#[async_trait]
impl RequestLookup for RecordRequestLookup {
    async fn lookup(&self, id: &str, account_id: &str) -> Result<Requests, ApiError> {
        let args = self.api.args(account_id, "");
        let value = self.store.get(&args, Collection::Requests, id).await?;
        let requests: Requests = decode(Collection::Requests, value)?;
        debug!(request = %requests.id, action = %requests.action, "request found");
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RequestLookup for CountingLookup {
        async fn lookup(&self, id: &str, account_id: &str) -> Result<Requests, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Requests {
                id: id.to_string(),
                cat_id: "AIES00000001".to_string(),
                action: "start".to_string(),
                category: "state".to_string(),
                account_id: account_id.to_string(),
                ..Requests::default()
            })
        }
    }

    #[tokio::test]
    async fn test_short_cat_id_triggers_lookup() {
        let payload = Payload::decode(
            br#"{"id": "RQ1", "cat_id": "abc", "account_id": "ops@example.com"}"#,
        )
        .unwrap();
        assert!(payload.is_reference());

        let lookup = CountingLookup::default();
        let requests = payload.convert(&lookup).await.unwrap();
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert_eq!(requests.id, "RQ1");
        assert_eq!(requests.action, "start");
    }

    #[tokio::test]
    async fn test_full_cat_id_builds_request_inline() {
        let payload = Payload::decode(
            br#"{
                "action": "stop",
                "cat_id": "AIES00000042",
                "account_id": "ops@example.com",
                "cattype": "torpedo",
                "category": "control",
                "created_at": "2017-02-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(payload.cat_type, "torpedo");

        let lookup = CountingLookup::default();
        let requests = payload.convert(&lookup).await.unwrap();
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert_eq!(requests.cat_id, "AIES00000042");
        assert_eq!(requests.action, "stop");
        assert_eq!(requests.category, "control");
        assert!(requests.created_at.is_some());
    }

    #[test]
    fn test_padded_cat_id_is_reference() {
        let payload = Payload {
            cat_id: "   AIES1   ".to_string(),
            ..Payload::default()
        };
        assert!(payload.is_reference());
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        assert!(matches!(
            Payload::decode(b"not json"),
            Err(ApiError::Malformed { .. })
        ));
    }
}
