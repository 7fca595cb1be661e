//! MergeService: orchestrates sources, applies merge policy, deserializes to CartonConfig.

use crate::config::sources::{environment, global_file};
use crate::config::CartonConfig;
use config::{ConfigError, File};
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources.
    /// Precedence: defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<CartonConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<CartonConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("carton.toml");
        fs::write(
            &path,
            r#"
[api]
url = "https://api.example.com/v2"
master_user = "admin@example.com"

[store]
backend = "local"
path = "/var/lib/carton"
"#,
        )
        .unwrap();

        let config = MergeService::load_from_file(&path).unwrap();
        assert_eq!(config.api.url, "https://api.example.com/v2");
        assert_eq!(config.api.master_user, "admin@example.com");
        assert_eq!(config.api.ssh_user, "root");
        assert_eq!(config.store.backend, StoreBackend::Local);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        assert!(MergeService::load_from_file(&temp.path().join("absent.toml")).is_err());
    }
}
