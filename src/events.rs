//! Lifecycle notifications.
//!
//! Events are written in batches to the notification transport. Status
//! events describe assembly status changes to the account owner; machine
//! events report per-box provisioning milestones.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::lifecycle::Status;
use crate::pairs::{patch, JsonPairs};
use crate::provision::ProvisionBox;
use crate::store::{Collection, RecordStore};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub const ASSEMBLY_ID: &str = "assembly_id";
pub const ACCOUNT_ID: &str = "account_id";
pub const EVENT_TYPE: &str = "event_type";
pub const VERTNAME: &str = "vertname";
pub const VERTTYPE: &str = "verttype";
pub const EMAIL: &str = "email";
pub const ALERT_MESSAGE: &str = "message";
pub const INSTANCE_PASSWORD: &str = "password";
pub const SSH_KEY: &str = "sshkey";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Status,
    Launched,
    Running,
    Stopped,
    Destroyed,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Addressed to the account owner
    User,
    /// Emitted on behalf of a provisioned machine
    Machine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    /// Metadata map
    #[serde(rename = "m")]
    pub metadata: BTreeMap<String, String>,
    /// Optional description lines
    #[serde(rename = "d", default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub accounts_id: String,
    pub event_action: EventAction,
    pub event_type: EventType,
    pub event_data: EventData,
    pub timestamp: DateTime<Local>,
}

/// Events written together in one transport call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    pub events: Vec<Event>,
}

impl EventBatch {
    pub fn single(event: Event) -> Self {
        Self {
            events: vec![event],
        }
    }
}

/// Status-change notification for an assembly. `subject` feeds the
/// human-readable description.
pub fn status_event(assembly_id: &str, account_id: &str, status: &Status, subject: &str) -> EventBatch {
    let mut description = JsonPairs::new();
    description.nuke_and_set(&patch([
        ("status", status.to_string()),
        ("description", status.description(subject)),
    ]));

    let metadata = BTreeMap::from([
        (ASSEMBLY_ID.to_string(), assembly_id.to_string()),
        (ACCOUNT_ID.to_string(), account_id.to_string()),
        (EVENT_TYPE.to_string(), status.event_type()),
    ]);

    EventBatch::single(Event {
        accounts_id: account_id.to_string(),
        event_action: EventAction::Status,
        event_type: EventType::User,
        event_data: EventData {
            metadata,
            description: description.to_strings(),
        },
        timestamp: Local::now(),
    })
}

/// Notification transport.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn write(&self, batch: &EventBatch) -> Result<(), ApiError>;
}

/// Writes events into the record store's event collection.
pub struct RecordEventNotifier {
    store: Arc<dyn RecordStore>,
    api: ApiConfig,
}

impl RecordEventNotifier {
    pub fn new(store: Arc<dyn RecordStore>, api: ApiConfig) -> Self {
        Self { store, api }
    }
}

#[async_trait]
impl EventNotifier for RecordEventNotifier {
    async fn write(&self, batch: &EventBatch) -> Result<(), ApiError> {
        for event in &batch.events {
            let args = self.api.args(&event.accounts_id, "");
            let value = serde_json::to_value(event)
                .map_err(|e| ApiError::malformed("event", e))?;
            self.store.post(&args, Collection::Events, &value).await?;
            debug!(account = %event.accounts_id, action = ?event.event_action, "event written");
        }
        Ok(())
    }
}

/// Notifier keeping batches in memory, optionally failing every write.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    batches: Mutex<Vec<EventBatch>>,
    fail: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn batches(&self) -> Vec<EventBatch> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl EventNotifier for MemoryNotifier {
    async fn write(&self, batch: &EventBatch) -> Result<(), ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("event transport unavailable".to_string()));
        }
        self.batches.lock().push(batch.clone());
        Ok(())
    }
}

fn deploy_line(w: &mut dyn Write, message: &str) -> Result<(), ApiError> {
    writeln!(w, "[deploy] [info] {}", message)
        .map_err(|e| ApiError::Transport(format!("Failed to write progress: {}", e)))
}

/// Report that provisioning of `b` reached `action`.
///
/// Progress lines go to `w`; the machine event goes to `notifier`. Running
/// events include the decoded root password, or the SSH key name when no
/// password is set.
pub async fn done_notify(
    b: &ProvisionBox,
    w: &mut dyn Write,
    action: EventAction,
    message: &str,
    notifier: &dyn EventNotifier,
) -> Result<(), ApiError> {
    let full_name = b.full_name();
    deploy_line(w, &format!("--- done {} box ", full_name))?;

    let mut metadata = BTreeMap::from([
        (VERTNAME.to_string(), full_name.clone()),
        (VERTTYPE.to_string(), b.tosca.clone()),
        (EMAIL.to_string(), b.account_id.clone()),
    ]);
    if !message.is_empty() {
        metadata.insert(ALERT_MESSAGE.to_string(), message.to_string());
    }
    if action == EventAction::Running {
        if b.ssh.password.is_empty() {
            metadata.insert(SSH_KEY.to_string(), b.ssh.prefix.clone());
        } else {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&b.ssh.password)
                .map_err(|e| ApiError::malformed(format!("root password of {}", full_name), e))?;
            metadata.insert(
                INSTANCE_PASSWORD.to_string(),
                String::from_utf8_lossy(&decoded).into_owned(),
            );
        }
    }

    let batch = EventBatch::single(Event {
        accounts_id: b.account_id.clone(),
        event_action: action,
        event_type: EventType::Machine,
        event_data: EventData {
            metadata,
            description: Vec::new(),
        },
        timestamp: Local::now(),
    });
    deploy_line(w, &format!("--- done {} box OK", full_name))?;
    notifier.write(&batch).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::BoxSsh;
    use crate::store::MemoryRecordStore;

    fn running_box(password: &str) -> ProvisionBox {
        ProvisionBox {
            name: "web01".to_string(),
            domain_name: "example.io".to_string(),
            tosca: "tosca.torpedo.ubuntu".to_string(),
            account_id: "ops@example.com".to_string(),
            ssh: BoxSsh {
                user: "root".to_string(),
                prefix: "deploy-key".to_string(),
                password: password.to_string(),
            },
            ..ProvisionBox::default()
        }
    }

    #[test]
    fn test_status_event_shape() {
        let batch = status_event("ASM1", "ops@example.com", &Status::Running, "web01");
        assert_eq!(batch.events.len(), 1);
        let event = &batch.events[0];
        assert_eq!(event.event_action, EventAction::Status);
        assert_eq!(event.event_type, EventType::User);
        assert_eq!(event.event_data.metadata[ASSEMBLY_ID], "ASM1");
        assert_eq!(event.event_data.metadata[EVENT_TYPE], "compute.instance.running");
        assert!(event
            .event_data
            .description
            .contains(&"description=web01 is running.".to_string()));
    }

    #[tokio::test]
    async fn test_done_notify_running_decodes_password() {
        let notifier = MemoryNotifier::new();
        let mut out = Vec::new();
        // "s3cret"
        let b = running_box("czNjcmV0");

        done_notify(&b, &mut out, EventAction::Running, "", &notifier)
            .await
            .unwrap();

        let progress = String::from_utf8(out).unwrap();
        assert!(progress.contains("--- done web01.example.io box OK"));
        let batches = notifier.batches();
        let metadata = &batches[0].events[0].event_data.metadata;
        assert_eq!(metadata[INSTANCE_PASSWORD], "s3cret");
        assert!(!metadata.contains_key(SSH_KEY));
        assert_eq!(batches[0].events[0].event_type, EventType::Machine);
    }

    #[tokio::test]
    async fn test_done_notify_running_without_password_uses_key() {
        let notifier = MemoryNotifier::new();
        let mut out = Vec::new();
        done_notify(&running_box(""), &mut out, EventAction::Running, "up", &notifier)
            .await
            .unwrap();
        let metadata = &notifier.batches()[0].events[0].event_data.metadata;
        assert_eq!(metadata[SSH_KEY], "deploy-key");
        assert_eq!(metadata[ALERT_MESSAGE], "up");
    }

    #[tokio::test]
    async fn test_record_notifier_posts_events() {
        let store = Arc::new(MemoryRecordStore::new());
        let notifier = RecordEventNotifier::new(store.clone(), ApiConfig::default());
        notifier
            .write(&status_event("ASM1", "ops@example.com", &Status::Stopped, "web01"))
            .await
            .unwrap();
        let events = store.records(Collection::Events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event_action"], "status");
    }
}
