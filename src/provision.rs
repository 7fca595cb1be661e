//! Provisioning units handed to downstream provisioners.

use crate::error::ApiError;
use crate::lifecycle::{State, Status};
use crate::store::ApiArgs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PUBLIC_IPV4: &str = "publicipv4";
pub const PRIVATE_IPV4: &str = "privateipv4";
pub const PUBLIC_IPV6: &str = "publicipv6";
pub const PRIVATE_IPV6: &str = "privateipv6";

/// Compute shape of a box. Values are kept as the decimal strings they were
/// entered as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxCompute {
    pub cpushare: String,
    pub memory: String,
    pub swap: String,
    pub hdd: String,
}

impl BoxCompute {
    pub fn cpushare_value(&self) -> Result<i64, ApiError> {
        parse_quantity("cpushare", &self.cpushare)
    }

    pub fn memory_value(&self) -> Result<i64, ApiError> {
        parse_quantity("memory", &self.memory)
    }

    pub fn hdd_value(&self) -> Result<i64, ApiError> {
        parse_quantity("hdd", &self.hdd)
    }
}

/// Blank quantities count as zero; anything else must be an integer.
fn parse_quantity(field: &str, raw: &str) -> Result<i64, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|e| ApiError::malformed(format!("compute {} '{}'", field, raw), e))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSsh {
    pub user: String,
    /// Name of the SSH key the box is provisioned with
    pub prefix: String,
    /// Base64-encoded root password
    pub password: String,
}

/// Source repository hook for boxes built from code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoHook {
    pub enabled: bool,
    pub token: String,
    pub carton_id: String,
    pub box_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRepo {
    pub source: String,
    pub url: String,
    pub branch: String,
    pub hook: RepoHook,
}

impl BoxRepo {
    pub fn is_enabled(&self) -> bool {
        self.hook.enabled && !self.url.trim().is_empty()
    }
}

/// The next policy an assembly should execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOps {
    pub policy_type: String,
    /// Policy name, used as the operation to run
    pub operation: String,
    /// Position of the policy within its assembly
    pub index: usize,
    pub rules: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
}

/// A single provisionable unit with fully merged configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionBox {
    /// Id of the component this box was built from
    pub id: String,
    pub name: String,
    pub domain_name: String,
    pub tosca: String,
    pub carton_id: String,
    pub cartons_id: String,
    pub carton_name: String,
    pub account_id: String,
    pub org_id: String,
    pub api_args: ApiArgs,
    pub provider: String,
    pub public_ip: String,
    pub storage_type: String,
    pub compute: BoxCompute,
    pub ssh: BoxSsh,
    pub region: String,
    pub status: Status,
    pub state: State,
    pub vnets: BTreeMap<String, String>,
    pub instance_id: String,
    pub quota_id: String,
    pub policy_ops: Option<PolicyOps>,
    pub repo: BoxRepo,
    pub envs: BTreeMap<String, String>,
}

impl ProvisionBox {
    /// Name qualified by the box domain, when one is set.
    pub fn full_name(&self) -> String {
        if self.domain_name.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.domain_name)
        }
    }
}
