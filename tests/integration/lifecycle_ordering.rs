//! Persist-before-notify ordering of status transitions

use super::support::{self, CallLog, RecordingNotifier, RecordingStore};
use carton::assembly::{Assembly, AssemblyService};
use carton::component::RecordComponentResolver;
use carton::config::ApiConfig;
use carton::lifecycle::{State, Status};
use carton::store::Collection;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

fn service(log: &CallLog, fail_notify: bool) -> (AssemblyService, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new(log.clone()));
    store
        .inner
        .insert(Collection::Assembly, support::assembly(&[], json!([])))
        .unwrap();
    let api = ApiConfig::default();
    let svc = AssemblyService::new(
        store.clone(),
        Arc::new(RecordComponentResolver::new(store.clone(), api.clone())),
        Arc::new(RecordingNotifier::new(log.clone(), fail_notify)),
        api,
    );
    (svc, store)
}

#[tokio::test]
async fn every_status_change_persists_before_notifying() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let (svc, _) = service(&log, false);
    let mut asm = svc.fetch("ASM1", "ops@example.com", "ORG1").await.unwrap();

    for status in [Status::Launched, Status::Bootstrapped, Status::Running] {
        svc.set_status(&mut asm, status).await.unwrap();
    }

    assert_eq!(
        *log.lock(),
        vec![
            "persist:assembly",
            "notify:1",
            "persist:assembly",
            "notify:1",
            "persist:assembly",
            "notify:1",
        ]
    );
}

#[tokio::test]
async fn failed_notification_keeps_persisted_status() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let (svc, store) = service(&log, true);
    let mut asm = svc.fetch("ASM1", "ops@example.com", "ORG1").await.unwrap();

    let err = svc.set_status(&mut asm, Status::Running).await.unwrap_err();
    assert!(err.is_persisted_but_not_notified());
    assert_eq!(*log.lock(), vec!["persist:assembly", "notify:1"]);

    let saved = Assembly::decode(store.inner.records(Collection::Assembly)[0].clone()).unwrap();
    assert_eq!(saved.status, Status::Running);
}

#[tokio::test]
async fn set_state_only_persists() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let (svc, _) = service(&log, false);
    let mut asm = svc.fetch("ASM1", "ops@example.com", "ORG1").await.unwrap();

    svc.set_state(&mut asm, State::Stopped).await.unwrap();
    assert_eq!(*log.lock(), vec!["persist:assembly"]);
    assert!(asm.is_stopped());
    assert!(asm.is_alive());
}

#[tokio::test]
async fn policy_status_update_persists_whole_assembly() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let (svc, store) = service(&log, false);
    let mut asm = svc.fetch("ASM1", "ops@example.com", "ORG1").await.unwrap();
    assert_eq!(asm.policy_ops().map(|ops| ops.operation), Some("scale-up".to_string()));

    svc.update_policy_status(&mut asm, 1, Status::from("done"))
        .await
        .unwrap();

    let saved = Assembly::decode(store.inner.records(Collection::Assembly)[0].clone()).unwrap();
    assert!(saved.policy_ops().is_none());
    assert_eq!(saved.name, "web01");
}
