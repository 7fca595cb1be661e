//! Local sled-backed record store driving the engine end to end

use carton::assembly::{Assembly, AssemblyService};
use carton::config::ApiConfig;
use carton::lifecycle::Status;
use carton::store::{ApiArgs, Collection, RecordStore, SledRecordStore};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn status_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("records");

    {
        let store = Arc::new(SledRecordStore::open(&path).unwrap());
        store
            .post(
                &ApiArgs::default(),
                Collection::Assembly,
                &super::support::assembly(&[], json!([{"key": "cpu", "value": "2"}])),
            )
            .await
            .unwrap();
        let svc = AssemblyService::from_store(store.clone(), ApiConfig::default());
        let mut asm = svc.get("ASM1", "ops@example.com", "").await.unwrap();
        svc.set_status(&mut asm, Status::Running).await.unwrap();
        store.flush().unwrap();
    }

    let store = SledRecordStore::open(&path).unwrap();
    let value = store
        .get(&ApiArgs::default(), Collection::Assembly, "ASM1")
        .await
        .unwrap();
    let asm = Assembly::decode(value).unwrap();
    assert_eq!(asm.status, Status::Running);
    assert_eq!(asm.inputs.matched("status"), "running");
    assert_eq!(asm.inputs.matched("cpu"), "2");

    let events = store
        .list(&ApiArgs::default(), Collection::Events)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event_data"]["m"]["event_type"], "compute.instance.running");
}

#[tokio::test]
async fn list_all_reads_every_assembly() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(SledRecordStore::open(&temp.path().join("records")).unwrap());
    let svc = AssemblyService::from_store(store.clone(), ApiConfig::default());
    assert!(svc.list_all().await.is_err());

    let mut second = super::support::assembly(&[], json!([]));
    second["id"] = json!("ASM2");
    for record in [super::support::assembly(&[], json!([])), second] {
        store
            .post(&ApiArgs::default(), Collection::Assembly, &record)
            .await
            .unwrap();
    }

    let ids: Vec<String> = svc.list_all().await.unwrap().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["ASM1".to_string(), "ASM2".to_string()]);
}
