//! Carton composition merge rules

use super::support;
use carton::account::RecordAccountResolver;
use carton::assembly::AssemblyService;
use carton::carton::CartonComposer;
use carton::config::ApiConfig;
use carton::error::ApiError;
use carton::flavor::RecordFlavorResolver;
use carton::store::{Collection, MemoryRecordStore};
use serde_json::json;
use std::sync::Arc;

fn composer(store: Arc<MemoryRecordStore>) -> CartonComposer {
    let api = ApiConfig {
        ssh_user: "megadmin".to_string(),
        ..ApiConfig::default()
    };
    CartonComposer::new(
        Arc::new(AssemblyService::from_store(store.clone(), api.clone())),
        Arc::new(RecordAccountResolver::new(store.clone(), api.clone())),
        Arc::new(RecordFlavorResolver::new(store, api)),
    )
}

fn seeded(inputs: serde_json::Value) -> Arc<MemoryRecordStore> {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(Collection::Accounts, support::account()).unwrap();
    store
        .insert(Collection::Assembly, support::assembly(&["CMP_B", "CMP_A", " "], inputs))
        .unwrap();
    store
        .insert(
            Collection::Components,
            json!({
                "id": "CMP_A",
                "name": "api",
                "tosca_type": "tosca.torpedo.ubuntu",
                "inputs": [{"key": "provider", "value": "docker"}],
                "outputs": [{"key": "publicipv4", "value": "203.0.113.5"}],
                "repo": {"source": "github", "url": "https://git.example.io/api.git", "hook_enabled": true}
            }),
        )
        .unwrap();
    store
        .insert(
            Collection::Components,
            json!({"id": "CMP_B", "name": "worker", "tosca_type": "tosca.torpedo.ubuntu"}),
        )
        .unwrap();
    store
        .insert(
            Collection::Flavors,
            json!({"id": "FLV_M", "name": "medium", "cpu": "4", "ram": "8192", "disk": "80"}),
        )
        .unwrap();
    store
}

fn base_inputs() -> serde_json::Value {
    json!([
        {"key": "provider", "value": "one"},
        {"key": "region", "value": "chennai"},
        {"key": "privateipv4", "value": "10.1.0.4"},
        {"key": "quota_id", "value": " Q-9 "},
        {"key": "cpu", "value": "1"},
        {"key": "ram", "value": "1024"},
        {"key": "sshkey", "value": "deploy"},
        {"key": "root_password", "value": "czNjcmV0"}
    ])
}

#[tokio::test]
async fn component_overrides_only_provider_and_public_ip() {
    let carton = composer(seeded(base_inputs()))
        .mk_carton("AIES000001", "ASM1", "ops@example.com")
        .await
        .unwrap();

    let ids: Vec<&str> = carton.boxes.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["CMP_A", "CMP_B"]);

    let api = carton.find_box("CMP_A").unwrap();
    assert_eq!(api.provider, "docker");
    assert_eq!(api.public_ip, "203.0.113.5");

    let worker = carton.find_box("CMP_B").unwrap();
    assert_eq!(worker.provider, "one");
    assert_eq!(worker.public_ip, "198.51.100.20");

    for b in &carton.boxes {
        assert_eq!(b.carton_id, "ASM1");
        assert_eq!(b.cartons_id, "AIES000001");
        assert_eq!(b.org_id, "ORG1");
        assert_eq!(b.region, "chennai");
        assert_eq!(b.quota_id, "Q-9");
        assert_eq!(b.instance_id, "one-77");
        assert_eq!(b.vnets["privateipv4"], "10.1.0.4");
        assert_eq!(b.ssh.user, "megadmin");
        assert_eq!(b.compute.cpushare, "1");
        assert_eq!(b.policy_ops.as_ref().map(|p| p.index), Some(1));
        assert_eq!(b.api_args.api_key.as_deref(), Some("api-123"));
    }
}

#[tokio::test]
async fn repo_hook_receives_carton_and_box_ids() {
    let carton = composer(seeded(base_inputs()))
        .mk_carton("AIES000001", "ASM1", "ops@example.com")
        .await
        .unwrap();

    let api = carton.find_box("CMP_A").unwrap();
    assert_eq!(api.repo.hook.carton_id, "ASM1");
    assert_eq!(api.repo.hook.box_id, "CMP_A");
    let worker = carton.find_box("CMP_B").unwrap();
    assert!(worker.repo.hook.carton_id.is_empty());
}

#[tokio::test]
async fn box_network_maps_are_independent_copies() {
    let mut carton = composer(seeded(base_inputs()))
        .mk_carton("AIES000001", "ASM1", "ops@example.com")
        .await
        .unwrap();

    carton.boxes[0]
        .vnets
        .insert("privateipv4".to_string(), "10.9.9.9".to_string());
    assert_eq!(carton.boxes[1].vnets["privateipv4"], "10.1.0.4");
    assert_eq!(carton.vnets["privateipv4"], "10.1.0.4");
}

#[tokio::test]
async fn flavor_shape_applies_to_carton_and_boxes() {
    let mut inputs = base_inputs();
    if let Some(entries) = inputs.as_array_mut() {
        entries.push(json!({"key": "flavor_id", "value": "FLV_M"}));
    }
    let carton = composer(seeded(inputs))
        .mk_carton("AIES000001", "ASM1", "ops@example.com")
        .await
        .unwrap();

    assert_eq!(carton.compute.cpushare, "4");
    assert!(carton.boxes.iter().all(|b| b.compute.memory == "8192"));
}

#[tokio::test]
async fn missing_component_fails_composition() {
    let store = seeded(base_inputs());
    store
        .insert(
            Collection::Assembly,
            support::assembly(&["CMP_A", "CMP_GONE"], base_inputs()),
        )
        .unwrap();

    let err = composer(store)
        .mk_carton("AIES000001", "ASM1", "ops@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::PartialAggregation { ref component_id, resolved: 1, .. } if component_id == "CMP_GONE"
    ));
}

#[tokio::test]
async fn nameless_component_fails_composition() {
    let store = seeded(base_inputs());
    store
        .insert(Collection::Components, json!({"id": "CMP_B", "name": "  "}))
        .unwrap();

    let err = composer(store)
        .mk_carton("AIES000001", "ASM1", "ops@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Malformed { .. }));
}
