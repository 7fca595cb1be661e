//! Queue payload routing

use async_trait::async_trait;
use carton::config::ApiConfig;
use carton::error::ApiError;
use carton::handler::{MessageHandler, RequestProcessor};
use carton::payload::{Payload, RecordRequestLookup, Requests};
use carton::store::{Collection, MemoryRecordStore};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

#[derive(Default)]
struct Processed {
    actions: Mutex<Vec<String>>,
}

#[async_trait]
impl RequestProcessor for Processed {
    async fn process(&self, requests: &Requests, action: &str) -> Result<(), ApiError> {
        self.actions
            .lock()
            .push(format!("{}:{}", requests.cat_id, action));
        Ok(())
    }
}

fn store_with_request() -> Arc<MemoryRecordStore> {
    let store = Arc::new(MemoryRecordStore::new());
    store
        .insert(
            Collection::Requests,
            json!({
                "id": "RQ100",
                "cat_id": "AIES00000100",
                "cattype": "torpedo",
                "name": "web01",
                "action": "start",
                "category": "control",
                "account_id": "ops@example.com"
            }),
        )
        .unwrap();
    store
}

#[tokio::test]
async fn reference_and_inline_payloads_reach_processor() {
    let store = store_with_request();
    let processed = Arc::new(Processed::default());
    let handler = MessageHandler::new(
        Arc::new(RecordRequestLookup::new(store, ApiConfig::default())),
        processed.clone(),
    );

    handler
        .handle(br#"{"id": "RQ100", "cat_id": "", "account_id": "ops@example.com"}"#)
        .await
        .unwrap();
    handler
        .handle(br#"{"action": "stop", "cat_id": "AIES00000200", "category": "control"}"#)
        .await
        .unwrap();

    assert_eq!(
        *processed.actions.lock(),
        vec!["AIES00000100:start".to_string(), "AIES00000200:stop".to_string()]
    );
}

#[tokio::test]
async fn threshold_is_ten_trimmed_characters() {
    let store = store_with_request();
    let lookup = RecordRequestLookup::new(store, ApiConfig::default());

    let nine = Payload {
        id: "RQ100".to_string(),
        cat_id: "  AIES0001  ".to_string(),
        ..Payload::default()
    };
    assert!(nine.is_reference());
    assert_eq!(nine.convert(&lookup).await.unwrap().name, "web01");

    let ten = Payload {
        id: "RQ404".to_string(),
        cat_id: "AIES000001".to_string(),
        action: "reboot".to_string(),
        ..Payload::default()
    };
    assert!(!ten.is_reference());
    assert_eq!(ten.convert(&lookup).await.unwrap().action, "reboot");
}
