//! Carton composition
//!
//! A carton is the provisioning package for one assembly instance: a
//! snapshot of the assembly's settings plus one box per resolved component.
//! Components may override provider and public IP; every other box field is
//! taken from the assembly.

use crate::account::AccountResolver;
use crate::assembly::{Assembly, AssemblyService};
use crate::error::ApiError;
use crate::flavor::FlavorResolver;
use crate::lifecycle::{State, Status};
use crate::provision::{BoxCompute, BoxSsh, PolicyOps, ProvisionBox};
use crate::store::ApiArgs;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carton {
    /// Assembly id
    pub id: String,
    /// Id of the assemblies group the assembly belongs to
    pub cartons_id: String,
    pub org_id: String,
    pub name: String,
    pub tosca: String,
    pub account_id: String,
    pub authority: String,
    pub api_args: ApiArgs,
    pub image_version: String,
    pub domain_name: String,
    pub ssh: BoxSsh,
    pub provider: String,
    pub public_ip: String,
    pub region: String,
    pub vnets: BTreeMap<String, String>,
    pub instance_id: String,
    pub policy_ops: Option<PolicyOps>,
    pub backup: bool,
    pub image_name: String,
    pub storage_type: String,
    pub quota_id: String,
    pub compute: BoxCompute,
    pub boxes: Vec<ProvisionBox>,
    pub status: Status,
    pub state: State,
}

impl Carton {
    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Box built from component `id`.
    pub fn find_box(&self, id: &str) -> Option<&ProvisionBox> {
        self.boxes.iter().find(|b| b.id == id)
    }
}

/// Builds cartons from stored assemblies.
pub struct CartonComposer {
    assemblies: Arc<AssemblyService>,
    accounts: Arc<dyn AccountResolver>,
    flavors: Arc<dyn FlavorResolver>,
}

impl CartonComposer {
    pub fn new(
        assemblies: Arc<AssemblyService>,
        accounts: Arc<dyn AccountResolver>,
        flavors: Arc<dyn FlavorResolver>,
    ) -> Self {
        Self {
            assemblies,
            accounts,
            flavors,
        }
    }

    /// Compose the carton for assembly `ay` of group `aies` on behalf of
    /// `email`.
    ///
    /// Fails as a whole when the account, the assembly, any of its
    /// components, or its flavor cannot be resolved.
    pub async fn mk_carton(&self, aies: &str, ay: &str, email: &str) -> Result<Carton, ApiError> {
        let api = self.assemblies.api();
        let account = self.accounts.resolve(email).await?;
        let asm = self.assemblies.get(ay, email, "").await?;

        let mut args = api.args(email, "");
        args.api_key = Some(account.api_key.clone());
        args.org_id = asm.org_id.clone();

        let compute = asm.resolve_compute(self.flavors.as_ref()).await?;
        let boxes = merge_boxes(&asm, aies, &args, &compute, &api.ssh_user)?;
        info!(assembly = %asm.id, boxes = boxes.len(), "carton composed");

        Ok(Carton {
            id: ay.to_string(),
            cartons_id: aies.to_string(),
            org_id: asm.org_id.clone(),
            name: asm.name.clone(),
            tosca: asm.tosca.to_string(),
            account_id: asm.account_id.clone(),
            authority: account.states.authority,
            api_args: args,
            image_version: asm.image_version().to_string(),
            domain_name: asm.domain().to_string(),
            ssh: asm.ssh(&api.ssh_user),
            provider: asm.provider().to_string(),
            public_ip: asm.public_ip().to_string(),
            region: asm.region().to_string(),
            vnets: asm.vnets(),
            instance_id: asm.instance_id().to_string(),
            policy_ops: asm.policy_ops(),
            backup: asm.is_backup(),
            image_name: asm.image_name().to_string(),
            storage_type: asm.storage_type(),
            quota_id: asm.quota_id().to_string(),
            compute,
            boxes,
            status: asm.status.clone(),
            state: asm.state.clone(),
        })
    }

    /// One box per component of an already dug assembly, ordered by
    /// component id.
    pub async fn mk_boxes(
        &self,
        asm: &Assembly,
        aies: &str,
        args: &ApiArgs,
    ) -> Result<Vec<ProvisionBox>, ApiError> {
        let compute = asm.resolve_compute(self.flavors.as_ref()).await?;
        merge_boxes(asm, aies, args, &compute, &self.assemblies.api().ssh_user)
    }
}

fn merge_boxes(
    asm: &Assembly,
    aies: &str,
    args: &ApiArgs,
    compute: &BoxCompute,
    ssh_user: &str,
) -> Result<Vec<ProvisionBox>, ApiError> {
    let vnets = asm.vnets();
    let instance_id = asm.instance_id();
    let policy_ops = asm.policy_ops();

    let mut boxes = Vec::with_capacity(asm.components().len());
    for (cid, component) in asm.components() {
        if cid.trim().is_empty() {
            continue;
        }
        let mut b = component.to_box()?;
        b.carton_id = asm.id.clone();
        b.cartons_id = aies.to_string();
        b.carton_name = asm.name.clone();
        b.account_id = asm.account_id.clone();
        b.org_id = asm.org_id.clone();
        b.api_args = args.clone();
        b.storage_type = asm.storage_type();
        if b.provider.trim().is_empty() {
            b.provider = asm.provider().to_string();
        }
        if b.public_ip.trim().is_empty() {
            b.public_ip = asm.public_ip().to_string();
        }
        if b.repo.is_enabled() {
            b.repo.hook.carton_id = asm.id.clone();
            b.repo.hook.box_id = cid.clone();
        }
        b.compute = compute.clone();
        b.policy_ops = policy_ops.clone();
        b.ssh = asm.ssh(ssh_user);
        b.region = asm.region().to_string();
        b.status = asm.status.clone();
        b.state = asm.state.clone();
        b.vnets = vnets.clone();
        b.instance_id = instance_id.to_string();
        b.quota_id = asm.quota_id().to_string();
        debug!(carton = %asm.id, box_id = %cid, name = %b.name, "box merged");
        boxes.push(b);
    }
    Ok(boxes)
}
