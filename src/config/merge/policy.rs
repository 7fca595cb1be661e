//! Built-in defaults every load starts from.

use crate::config::{DEFAULT_API_URL, DEFAULT_SSH_USER};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("api.url", DEFAULT_API_URL)?
        .set_default("api.master_key", "")?
        .set_default("api.master_user", "")?
        .set_default("api.ssh_user", DEFAULT_SSH_USER)?
        .set_default("store.backend", "http")
}
