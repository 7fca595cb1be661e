//! Derived read-only views over assembly inputs and outputs.
//!
//! Each accessor is a single lookup against the attribute store.

use super::Assembly;
use crate::component::{DOMAIN, PROVIDER};
use crate::error::ApiError;
use crate::flavor::FlavorResolver;
use crate::provision::{BoxCompute, BoxSsh, PRIVATE_IPV4, PRIVATE_IPV6, PUBLIC_IPV4, PUBLIC_IPV6};
use std::collections::BTreeMap;

pub const SSHKEY: &str = "sshkey";
pub const VNCPORT: &str = "vncport";
pub const VNCHOST: &str = "vnchost";
pub const INSTANCE_ID: &str = "instance_id";
pub const BACKUP: &str = "backup";
pub const BACKUP_NAME: &str = "backup_name";
pub const IMAGE_VERSION: &str = "version";
pub const REGION: &str = "region";
pub const QUOTA_ID: &str = "quota_id";
pub const FLAVOR_ID: &str = "flavor_id";
pub const STORAGE_TYPE: &str = "storage_type";
pub const ROOT_PASSWORD: &str = "root_password";
pub const CPU_SHARE: &str = "cpu";
pub const MEMORY: &str = "ram";
pub const HDD: &str = "hdd";
pub const VM_CPU_COST: &str = "vm_cpu_cost_per_hour";
pub const VM_MEMORY_COST: &str = "vm_ram_cost_per_hour";
pub const VM_DISK_COST: &str = "vm_disk_cost_per_hour";
pub const CONTAINER_CPU_COST: &str = "container_cpu_cost_per_hour";
pub const CONTAINER_MEMORY_COST: &str = "container_memory_cost_per_hour";
pub const YES: &str = "yes";

/// Disk size used when an assembly does not ask for one.
pub const DEFAULT_HDD: &str = "10";

impl Assembly {
    pub fn sshkey(&self) -> &str {
        self.inputs.matched(SSHKEY)
    }

    pub fn domain(&self) -> &str {
        self.inputs.matched(DOMAIN)
    }

    pub fn provider(&self) -> &str {
        self.inputs.matched(PROVIDER)
    }

    pub fn region(&self) -> &str {
        self.inputs.matched(REGION)
    }

    pub fn ipv4_pub(&self) -> &str {
        self.inputs.matched(PUBLIC_IPV4)
    }

    pub fn ipv4_pri(&self) -> &str {
        self.inputs.matched(PRIVATE_IPV4)
    }

    pub fn ipv6_pub(&self) -> &str {
        self.inputs.matched(PUBLIC_IPV6)
    }

    pub fn ipv6_pri(&self) -> &str {
        self.inputs.matched(PRIVATE_IPV6)
    }

    /// Requested network addresses, keyed by address family.
    pub fn vnets(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (PUBLIC_IPV4.to_string(), self.ipv4_pub().to_string()),
            (PRIVATE_IPV4.to_string(), self.ipv4_pri().to_string()),
            (PUBLIC_IPV6.to_string(), self.ipv6_pub().to_string()),
            (PRIVATE_IPV6.to_string(), self.ipv6_pri().to_string()),
        ])
    }

    /// Assigned public address, from outputs.
    pub fn public_ip(&self) -> &str {
        self.outputs.matched(PUBLIC_IPV4)
    }

    pub fn vnc_host(&self) -> &str {
        self.outputs.matched(VNCHOST)
    }

    pub fn vnc_port(&self) -> &str {
        self.outputs.matched(VNCPORT)
    }

    pub fn host_name(&self) -> &str {
        self.vnc_host()
    }

    pub fn instance_id(&self) -> &str {
        self.outputs.matched(INSTANCE_ID)
    }

    pub fn image_version(&self) -> &str {
        self.inputs.matched(IMAGE_VERSION)
    }

    pub fn image_name(&self) -> &str {
        self.inputs.matched(BACKUP_NAME)
    }

    pub fn quota_id(&self) -> &str {
        self.inputs.matched(QUOTA_ID).trim()
    }

    pub fn is_quota(&self) -> bool {
        !self.quota_id().is_empty()
    }

    pub fn storage_type(&self) -> String {
        self.inputs.matched(STORAGE_TYPE).to_lowercase()
    }

    pub fn is_backup(&self) -> bool {
        self.inputs.matched(BACKUP).trim() == YES
    }

    pub fn flavor_id(&self) -> &str {
        self.inputs.matched(FLAVOR_ID).trim()
    }

    pub fn password(&self) -> &str {
        self.inputs.matched(ROOT_PASSWORD)
    }

    pub fn cpushare(&self) -> &str {
        self.inputs.matched(CPU_SHARE)
    }

    pub fn memory(&self) -> &str {
        self.inputs.matched(MEMORY)
    }

    pub fn swap(&self) -> &str {
        ""
    }

    pub fn hdd(&self) -> &str {
        let hdd = self.inputs.matched(HDD);
        if hdd.trim().is_empty() {
            DEFAULT_HDD
        } else {
            hdd
        }
    }

    pub fn vm_cpu_cost(&self) -> &str {
        self.inputs.matched(VM_CPU_COST)
    }

    pub fn vm_memory_cost(&self) -> &str {
        self.inputs.matched(VM_MEMORY_COST)
    }

    pub fn vm_hdd_cost(&self) -> &str {
        self.inputs.matched(VM_DISK_COST)
    }

    pub fn container_cpu_cost(&self) -> &str {
        self.inputs.matched(CONTAINER_CPU_COST)
    }

    pub fn container_memory_cost(&self) -> &str {
        self.inputs.matched(CONTAINER_MEMORY_COST)
    }

    /// Name qualified by the domain, when one is set.
    pub fn full_name(&self) -> String {
        let domain = self.domain();
        if domain.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, domain)
        }
    }

    /// Compute shape taken directly from inputs.
    pub fn compute(&self) -> BoxCompute {
        BoxCompute {
            cpushare: self.cpushare().to_string(),
            memory: self.memory().to_string(),
            swap: self.swap().to_string(),
            hdd: self.hdd().to_string(),
        }
    }

    /// Compute shape of the assembly's flavor when one is set, otherwise
    /// the shape from inputs. Resolver failures are fatal.
    pub async fn resolve_compute(&self, flavors: &dyn FlavorResolver) -> Result<BoxCompute, ApiError> {
        let flavor_id = self.flavor_id();
        if flavor_id.is_empty() {
            return Ok(self.compute());
        }
        let flavor = flavors.resolve(&self.account_id, flavor_id).await?;
        Ok(flavor.compute())
    }

    pub fn ssh(&self, user: &str) -> BoxSsh {
        BoxSsh {
            user: user.to_string(),
            prefix: self.sshkey().to_string(),
            password: self.password().to_string(),
        }
    }
}
