//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;
use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// Loader for configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load combat rule configuration. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        Self::load_as(path)
    }

    /// Load any TOML-deserializable configuration, such as a server config
    /// embedding a [`CombatConfig`] table.
    pub fn load_as<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
        let content = read_file(path)?;
        let config: T = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))?;

        Ok(config)
    }
}
