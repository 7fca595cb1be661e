//! Assembly
//!
//! The aggregate root of a deployment: a stored declarative definition that
//! references components and policies and carries the user's desired
//! configuration (`inputs`) alongside observed values (`outputs`).
//!
//! Decoding classifies the workload once from its dotted tosca type. The
//! component map is derived data filled by [`Assembly::dig`]; it is never
//! persisted.

mod attributes;
mod billing;
mod policy;
mod service;

pub use attributes::*;
pub use billing::{CPU, CPU_COST, DISK_COST, MEMORY_COST, RAM, RESOURCES, STORAGE};
pub use policy::{Policy, POLICY_INITIALIZING};
pub use service::{AssemblyService, LAST_SUCCESS_STATUS_UPDATE, STATUS};

use crate::component::{Component, ComponentResolver};
use crate::error::ApiError;
use crate::lifecycle::{State, Status};
use crate::pairs::JsonPairs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::error;

pub const CONTAINER: &str = "container";
pub const TORPEDO: &str = "torpedo";

/// Workload class derived from the second segment of the tosca type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadClass {
    Container,
    Vm,
    Other,
}

/// Dotted tosca type such as `tosca.torpedo.ubuntu`, validated at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToscaType {
    raw: String,
    class: WorkloadClass,
}

impl ToscaType {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let mut segments = raw.split('.');
        let second = match (segments.next(), segments.next()) {
            (Some(first), Some(second)) if !first.is_empty() && !second.is_empty() => second,
            _ => return Err(ApiError::InvalidToscaType(raw.to_string())),
        };
        let class = match second {
            CONTAINER => WorkloadClass::Container,
            TORPEDO => WorkloadClass::Vm,
            _ => WorkloadClass::Other,
        };
        Ok(Self {
            raw: raw.to_string(),
            class,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn class(&self) -> WorkloadClass {
        self.class
    }
}

impl TryFrom<String> for ToscaType {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ToscaType::parse(&value)
    }
}

impl From<ToscaType> for String {
    fn from(value: ToscaType) -> Self {
        value.raw
    }
}

impl fmt::Display for ToscaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub id: String,
    #[serde(default)]
    pub org_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub json_claz: String,
    #[serde(rename = "tosca_type")]
    pub tosca: ToscaType,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub inputs: JsonPairs,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub outputs: JsonPairs,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub policies: Vec<Policy>,
    #[serde(rename = "components", default, deserialize_with = "crate::pairs::nullable")]
    pub component_ids: Vec<String>,
    /// Resolved components keyed by id, filled by `dig`
    #[serde(skip)]
    components: BTreeMap<String, Component>,
}

impl Assembly {
    /// Decode a stored assembly record.
    pub fn decode(value: serde_json::Value) -> Result<Self, ApiError> {
        crate::store::decode(crate::store::Collection::Assembly, value)
    }

    /// Components resolved by the last `dig`, ordered by id.
    pub fn components(&self) -> &BTreeMap<String, Component> {
        &self.components
    }

    /// Resolve every non-blank component id in stored order.
    ///
    /// Stops at the first failure. The components resolved before it stay in
    /// place, so callers may inspect the partial aggregate.
    pub async fn dig(&mut self, resolver: &dyn ComponentResolver) -> Result<(), ApiError> {
        self.components = BTreeMap::new();
        for cid in &self.component_ids {
            let cid = cid.trim();
            if cid.is_empty() {
                continue;
            }
            match resolver.resolve(cid, &self.account_id, &self.org_id).await {
                Ok(component) => {
                    self.components.insert(cid.to_string(), component);
                }
                Err(e) => {
                    error!(component = cid, assembly = %self.id, error = %e, "Failed to get component");
                    return Err(ApiError::PartialAggregation {
                        component_id: cid.to_string(),
                        resolved: self.components.len(),
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn workload_class(&self) -> WorkloadClass {
        self.tosca.class()
    }

    pub fn is_container(&self) -> bool {
        self.workload_class() == WorkloadClass::Container
    }

    pub fn is_torpedo(&self) -> bool {
        self.workload_class() == WorkloadClass::Vm
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.is_destroyed()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    pub fn is_suspended(&self) -> bool {
        self.state.is_suspended()
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_yaml::to_string(self) {
            Ok(yaml) => f.write_str(&yaml),
            Err(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    pub fn assembly(tosca: &str, state: &str, inputs: serde_json::Value) -> Assembly {
        Assembly::decode(json!({
            "id": "ASM001",
            "org_id": "ORG001",
            "account_id": "ops@example.com",
            "name": "web01",
            "tosca_type": tosca,
            "status": "launching",
            "state": state,
            "inputs": inputs,
            "outputs": [],
            "components": []
        }))
        .unwrap()
    }
}
