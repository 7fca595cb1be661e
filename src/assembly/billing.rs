//! Billable resource usage.

use super::Assembly;
use crate::error::ApiError;
use crate::flavor::Flavor;
use crate::provision::BoxCompute;
use std::collections::BTreeMap;

pub const CPU: &str = "cpu";
pub const RAM: &str = "ram";
pub const STORAGE: &str = "storage";
pub const CPU_COST: &str = "cpu_cost";
pub const MEMORY_COST: &str = "memory_cost";
pub const DISK_COST: &str = "disk_cost";
pub const RESOURCES: &str = "resources";

const STORAGE_ONLY: &str = "storage";
const ALL_RESOURCES: &str = "cpu.ram.storage";
const ZERO_COST: &str = "0";

fn shape(compute: &BoxCompute) -> Result<BTreeMap<String, String>, ApiError> {
    Ok(BTreeMap::from([
        (CPU.to_string(), compute.cpushare_value()?.to_string()),
        (RAM.to_string(), compute.memory_value()?.to_string()),
        (STORAGE.to_string(), compute.hdd_value()?.to_string()),
    ]))
}

impl Assembly {
    /// Billable shape and hourly costs of the assembly's own compute.
    ///
    /// Containers are billed with container prices and carry no disk cost;
    /// every other class uses VM prices.
    pub fn resources(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let mut r = shape(&self.compute())?;
        if self.is_container() {
            r.insert(CPU_COST.to_string(), self.container_cpu_cost().to_string());
            r.insert(MEMORY_COST.to_string(), self.container_memory_cost().to_string());
        } else {
            r.insert(CPU_COST.to_string(), self.vm_cpu_cost().to_string());
            r.insert(MEMORY_COST.to_string(), self.vm_memory_cost().to_string());
            r.insert(DISK_COST.to_string(), self.vm_hdd_cost().to_string());
        }
        Ok(self.billable(r))
    }

    /// Price an alternate flavor instead of the assembly's own compute.
    pub fn resources_for(&self, flavor: Option<&Flavor>) -> Result<BTreeMap<String, String>, ApiError> {
        let Some(flavor) = flavor else {
            return self.resources();
        };
        let mut r = shape(&flavor.compute())?;
        r.insert(CPU_COST.to_string(), flavor.cpu_cost().to_string());
        r.insert(MEMORY_COST.to_string(), flavor.memory_cost().to_string());
        r.insert(DISK_COST.to_string(), flavor.hdd_cost().to_string());
        Ok(self.billable(r))
    }

    /// Stopped and suspended workloads only pay for storage.
    fn billable(&self, mut r: BTreeMap<String, String>) -> BTreeMap<String, String> {
        if self.is_stopped() || self.is_suspended() {
            r.insert(CPU_COST.to_string(), ZERO_COST.to_string());
            r.insert(MEMORY_COST.to_string(), ZERO_COST.to_string());
            r.insert(RESOURCES.to_string(), STORAGE_ONLY.to_string());
        } else {
            r.insert(RESOURCES.to_string(), ALL_RESOURCES.to_string());
        }
        r
    }
}
