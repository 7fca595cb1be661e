//! Configuration
//!
//! Explicit settings passed into every service that talks to the record
//! store. Nothing in the core reads process-wide state; the loader below is
//! the only place where files and environment variables are consulted.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use crate::logging::LoggingConfig;
pub use facade::ConfigLoader;

use crate::error::ApiError;
use crate::store::ApiArgs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:9000/v2";
pub const DEFAULT_SSH_USER: &str = "root";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_ssh_user() -> String {
    DEFAULT_SSH_USER.to_string()
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartonConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Control plane API settings shared by every record store call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the record store API
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Master key granting cross-account access
    #[serde(default)]
    pub master_key: String,

    /// Account used for master-credentialed listings
    #[serde(default)]
    pub master_user: String,

    /// Login user written into every box's SSH settings
    #[serde(default = "default_ssh_user")]
    pub ssh_user: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            master_key: String::new(),
            master_user: String::new(),
            ssh_user: default_ssh_user(),
        }
    }
}

impl ApiConfig {
    /// Credentials scoped to a requester.
    pub fn args(&self, email: &str, org_id: &str) -> ApiArgs {
        ApiArgs {
            url: self.url.clone(),
            email: email.to_string(),
            org_id: org_id.to_string(),
            master_key: self.master_key.clone(),
            api_key: None,
        }
    }

    /// Credentials of the configured master user.
    pub fn master_args(&self) -> ApiArgs {
        self.args(&self.master_user, "")
    }
}

/// Which record store backs the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Http,
    Local,
}

/// Record store selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory of the local store; None means the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolve_path(&self) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => paths::default_store_dir(),
        }
    }
}
