//! Operational policies attached to an assembly.

use super::Assembly;
use crate::lifecycle::Status;
use crate::pairs::JsonPairs;
use crate::provision::PolicyOps;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status marking the policy that should run next.
pub const POLICY_INITIALIZING: &str = "initializing";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    #[serde(rename = "ptype", default)]
    pub policy_type: String,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub resources: JsonPairs,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub rules: JsonPairs,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub properties: JsonPairs,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Policy {
    pub fn rules(&self) -> BTreeMap<String, String> {
        self.rules.to_map()
    }

    pub fn properties(&self) -> BTreeMap<String, String> {
        self.properties.to_map()
    }

    pub fn is_initializing(&self) -> bool {
        self.status.as_str() == POLICY_INITIALIZING
    }
}

impl Assembly {
    /// The first policy, in stored order, still waiting to run.
    pub fn policy_ops(&self) -> Option<PolicyOps> {
        self.policies
            .iter()
            .enumerate()
            .find(|(_, policy)| policy.is_initializing())
            .map(|(index, policy)| PolicyOps {
                policy_type: policy.policy_type.clone(),
                operation: policy.name.clone(),
                index,
                rules: policy.rules(),
                properties: policy.properties(),
            })
    }

    /// Policy at `index`, if any.
    pub fn policy(&self, index: usize) -> Option<&Policy> {
        self.policies.get(index)
    }
}
