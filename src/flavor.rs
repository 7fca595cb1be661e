//! Flavor Resolver
//!
//! Named compute shapes with their hourly prices, resolved by id for an
//! account.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::pairs::JsonPairs;
use crate::provision::BoxCompute;
use crate::store::{decode, Collection, RecordStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CPU_COST: &str = "cpu_cost_per_hour";
pub const MEMORY_COST: &str = "memory_cost_per_hour";
pub const DISK_COST: &str = "disk_cost_per_hour";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    #[serde(default)]
    pub org_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub ram: String,
    #[serde(default)]
    pub disk: String,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub regions: Vec<String>,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub price: JsonPairs,
    #[serde(default, deserialize_with = "crate::pairs::nullable")]
    pub properties: JsonPairs,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
}

impl Flavor {
    pub fn compute(&self) -> BoxCompute {
        BoxCompute {
            cpushare: self.cpu.clone(),
            memory: self.ram.clone(),
            swap: String::new(),
            hdd: self.disk.clone(),
        }
    }

    pub fn cpu_cost(&self) -> &str {
        self.price.matched(CPU_COST)
    }

    pub fn memory_cost(&self) -> &str {
        self.price.matched(MEMORY_COST)
    }

    pub fn hdd_cost(&self) -> &str {
        self.price.matched(DISK_COST)
    }
}

/// Resolves a flavor id into its shape and price.
#[async_trait]
pub trait FlavorResolver: Send + Sync {
    async fn resolve(&self, account_id: &str, flavor_id: &str) -> Result<Flavor, ApiError>;
}

/// Flavor lookup against the record store.
pub struct RecordFlavorResolver {
    store: Arc<dyn RecordStore>,
    api: ApiConfig,
}

impl RecordFlavorResolver {
    pub fn new(store: Arc<dyn RecordStore>, api: ApiConfig) -> Self {
        Self { store, api }
    }
}

#[async_trait]
impl FlavorResolver for RecordFlavorResolver {
    async fn resolve(&self, account_id: &str, flavor_id: &str) -> Result<Flavor, ApiError> {
        let args = self.api.args(account_id, "");
        let value = self.store.get(&args, Collection::Flavors, flavor_id).await?;
        decode(Collection::Flavors, value)
    }
}
