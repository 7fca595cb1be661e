//! Components: deployable sub-units of an assembly.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::pairs::JsonPairs;
use crate::provision::{BoxRepo, ProvisionBox, RepoHook, PUBLIC_IPV4};
use crate::store::{decode, Collection, RecordStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const PROVIDER: &str = "provider";
pub const DOMAIN: &str = "domain";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRepo {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub hook_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "tosca_type")]
    pub tosca: String,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub inputs: JsonPairs,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub outputs: JsonPairs,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub envs: JsonPairs,
    #[serde(default)]
    pub repo: Option<ComponentRepo>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: String,
}

impl Component {
    /// Convert into a box carrying only what the component itself knows.
    /// Assembly-level settings are merged in by the carton composer.
    pub fn to_box(&self) -> Result<ProvisionBox, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::malformed(
                format!("component {}", self.id),
                "name is blank",
            ));
        }

        let repo = self
            .repo
            .as_ref()
            .map(|repo| BoxRepo {
                source: repo.source.clone(),
                url: repo.url.clone(),
                branch: repo.branch.clone(),
                hook: RepoHook {
                    enabled: repo.hook_enabled,
                    token: repo.token.clone(),
                    ..RepoHook::default()
                },
            })
            .unwrap_or_default();

        Ok(ProvisionBox {
            id: self.id.clone(),
            name: self.name.clone(),
            domain_name: self.inputs.matched(DOMAIN).to_string(),
            tosca: self.tosca.clone(),
            provider: self.inputs.matched(PROVIDER).to_string(),
            public_ip: self.outputs.matched(PUBLIC_IPV4).to_string(),
            repo,
            envs: self.envs.to_map(),
            ..ProvisionBox::default()
        })
    }
}

/// Resolves a component id within an account and organization.
#[async_trait]
pub trait ComponentResolver: Send + Sync {
    async fn resolve(&self, id: &str, account_id: &str, org_id: &str)
        -> Result<Component, ApiError>;
}

pub struct RecordComponentResolver {
    store: Arc<dyn RecordStore>,
    api: ApiConfig,
}

impl RecordComponentResolver {
    pub fn new(store: Arc<dyn RecordStore>, api: ApiConfig) -> Self {
        Self { store, api }
    }
}

#[async_trait]
impl ComponentResolver for RecordComponentResolver {
    async fn resolve(
        &self,
        id: &str,
        account_id: &str,
        org_id: &str,
    ) -> Result<Component, ApiError> {
        let args = self.api.args(account_id, org_id);
        let value = self.store.get(&args, Collection::Components, id).await?;
        decode(Collection::Components, value)
    }
}
