//! Assembly persistence and lifecycle transitions.
//!
//! Every mutation persists the whole assembly. Status changes additionally
//! notify the account owner, strictly after the persist succeeded.

use super::Assembly;
use crate::component::{ComponentResolver, RecordComponentResolver};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::events::{status_event, EventBatch, EventNotifier, RecordEventNotifier};
use crate::lifecycle::{State, Status};
use crate::pairs::patch;
use crate::store::{Collection, RecordStore};
use chrono::Local;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input key stamped with the time of the last successful status write.
pub const LAST_SUCCESS_STATUS_UPDATE: &str = "lastsuccessstatusupdate";
/// Input key mirroring the current status.
pub const STATUS: &str = "status";

const STATUS_STAMP_FORMAT: &str = "%d %b %y %H:%M %z";

/// Loads, persists and transitions assemblies.
pub struct AssemblyService {
    store: Arc<dyn RecordStore>,
    components: Arc<dyn ComponentResolver>,
    notifier: Arc<dyn EventNotifier>,
    api: ApiConfig,
}

impl AssemblyService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        components: Arc<dyn ComponentResolver>,
        notifier: Arc<dyn EventNotifier>,
        api: ApiConfig,
    ) -> Self {
        Self {
            store,
            components,
            notifier,
            api,
        }
    }

    /// Wire components and events through the same record store.
    pub fn from_store(store: Arc<dyn RecordStore>, api: ApiConfig) -> Self {
        let components = Arc::new(RecordComponentResolver::new(store.clone(), api.clone()));
        let notifier = Arc::new(RecordEventNotifier::new(store.clone(), api.clone()));
        Self::new(store, components, notifier, api)
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub fn components(&self) -> &dyn ComponentResolver {
        self.components.as_ref()
    }

    /// Load an assembly without resolving its components.
    pub async fn fetch(&self, id: &str, email: &str, org_id: &str) -> Result<Assembly, ApiError> {
        let args = self.api.args(email, org_id);
        let value = self.store.get(&args, Collection::Assembly, id).await?;
        Assembly::decode(value)
    }

    /// Load an assembly and resolve every component it references.
    pub async fn get(&self, id: &str, email: &str, org_id: &str) -> Result<Assembly, ApiError> {
        let mut asm = self.fetch(id, email, org_id).await?;
        asm.dig(self.components.as_ref()).await?;
        Ok(asm)
    }

    /// Every assembly in the store, read with master credentials.
    pub async fn list_all(&self) -> Result<Vec<Assembly>, ApiError> {
        let records = self
            .store
            .list(&self.api.master_args(), Collection::Assembly)
            .await?;
        if records.is_empty() {
            return Err(ApiError::EmptyResult(Collection::Assembly.to_string()));
        }
        records.into_iter().map(Assembly::decode).collect()
    }

    /// Persist the whole assembly.
    pub async fn update(&self, asm: &Assembly) -> Result<(), ApiError> {
        let value = serde_json::to_value(asm).map_err(|e| ApiError::malformed("assembly", e))?;
        let args = self.api.args(&asm.account_id, &asm.org_id);
        if let Err(e) = self.store.post(&args, Collection::Assembly, &value).await {
            warn!(assembly = %asm.id, error = %e, "Failed to persist assembly");
            return Err(ApiError::PersistenceFailure {
                kind: "assembly",
                id: asm.id.clone(),
                source: Box::new(e),
            });
        }
        debug!(assembly = %asm.id, "assembly persisted");
        Ok(())
    }

    pub async fn delete(&self, asm: &Assembly) -> Result<(), ApiError> {
        let args = self.api.args(&asm.account_id, &asm.org_id);
        self.store
            .delete(&args, Collection::Assembly, &asm.id)
            .await?;
        info!(assembly = %asm.id, "assembly deleted");
        Ok(())
    }

    /// Stamp and persist `status`, then notify the owner.
    ///
    /// A notification failure leaves the persisted status in place and is
    /// reported as [`ApiError::NotificationFailure`].
    pub async fn set_status(&self, asm: &mut Assembly, status: Status) -> Result<(), ApiError> {
        let subject = asm.name.clone();
        self.transition(asm, status, &subject).await
    }

    /// Like [`set_status`](Self::set_status), describing the change with
    /// the failure that caused it.
    pub async fn set_status_err(
        &self,
        asm: &mut Assembly,
        status: Status,
        cause: &dyn std::error::Error,
    ) -> Result<(), ApiError> {
        self.transition(asm, status, &cause.to_string()).await
    }

    async fn transition(&self, asm: &mut Assembly, status: Status, subject: &str) -> Result<(), ApiError> {
        let stamp = Local::now().format(STATUS_STAMP_FORMAT).to_string();
        asm.inputs.nuke_and_set(&patch([
            (LAST_SUCCESS_STATUS_UPDATE, stamp),
            (STATUS, status.to_string()),
        ]));
        asm.status = status.clone();
        self.update(asm).await?;

        let batch = status_event(&asm.id, &asm.account_id, &status, subject);
        self.notifier
            .write(&batch)
            .await
            .map_err(|e| ApiError::NotificationFailure {
                assembly_id: asm.id.clone(),
                status: status.to_string(),
                source: Box::new(e),
            })?;
        info!(assembly = %asm.id, status = %status, "status updated");
        Ok(())
    }

    /// Persist a new state. No notification is sent.
    pub async fn set_state(&self, asm: &mut Assembly, state: State) -> Result<(), ApiError> {
        asm.state = state;
        self.update(asm).await
    }

    /// Emit the status event for `asm` without touching the store.
    pub async fn trigger_event(&self, asm: &Assembly, status: &Status) -> Result<(), ApiError> {
        let batch: EventBatch = status_event(&asm.id, &asm.account_id, status, &asm.name);
        self.notifier.write(&batch).await
    }

    pub async fn update_policy_status(
        &self,
        asm: &mut Assembly,
        index: usize,
        status: Status,
    ) -> Result<(), ApiError> {
        let len = asm.policies.len();
        let policy = asm
            .policies
            .get_mut(index)
            .ok_or(ApiError::PolicyIndexOutOfRange { index, len })?;
        policy.status = status;
        self.update(asm).await
    }

    /// Replace the given output keys and persist.
    pub async fn nuke_and_set_outputs(
        &self,
        asm: &mut Assembly,
        outputs: &BTreeMap<String, Vec<String>>,
    ) -> Result<(), ApiError> {
        if outputs.is_empty() {
            return Err(ApiError::NoOutputsFound);
        }
        debug!(assembly = %asm.id, keys = outputs.len(), "nuke and set outputs");
        asm.outputs.nuke_and_set(outputs);
        self.update(asm).await
    }

    /// Drop every input stored under `key` and persist.
    pub async fn nuke_keys_inputs(&self, asm: &mut Assembly, key: &str) -> Result<(), ApiError> {
        if key.is_empty() {
            return Err(ApiError::NoOutputsFound);
        }
        debug!(assembly = %asm.id, key, "nuke input keys");
        asm.inputs.nuke_keys(key);
        self.update(asm).await
    }
}
