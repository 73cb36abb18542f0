//! Server configuration structures and loaders.
use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use combat_content::ConfigLoader;
use combat_core::CombatConfig;
use combat_runtime::RuntimeConfig;
use serde::Deserialize;

/// Everything the binary needs before content is loaded.
///
/// Read from a TOML file, then overridden by environment variables.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory holding `combat.toml`, the RON catalogs and `profiles.ron`.
    pub content_dir: PathBuf,
    /// Level data. Defaults to `content_dir/maps`.
    pub maps_dir: Option<PathBuf>,
    /// Enables the file log layer when set.
    pub log_dir: Option<PathBuf>,
    pub runtime: RuntimeSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("data"),
            maps_dir: None,
            log_dir: None,
            runtime: RuntimeSection::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub player_turn_timeout_ms: Option<u64>,
    pub rng_seed: Option<u64>,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            event_buffer_size: defaults.event_buffer_size,
            command_buffer_size: defaults.command_buffer_size,
            player_turn_timeout_ms: defaults.player_turn_timeout_ms,
            rng_seed: defaults.rng_seed,
        }
    }
}

impl ServerConfig {
    /// Load from `COMBAT_CONFIG` (default `combat-server.toml`) and apply
    /// environment overrides. A missing file means defaults.
    ///
    /// Environment variables:
    /// - `COMBAT_CONTENT_DIR` - content directory (default: `data`)
    /// - `COMBAT_MAPS_DIR` - level data directory (default: `<content>/maps`)
    /// - `COMBAT_LOG_DIR` - directory for `combat-server.log` (default: none)
    /// - `COMBAT_TURN_TIMEOUT_MS` - player turn timeout (default: none)
    /// - `COMBAT_RNG_SEED` - seed for combats started without one
    /// - `COMBAT_EVENT_BUFFER` - event channel capacity (default: 256)
    /// - `COMBAT_COMMAND_BUFFER` - command queue size (default: 32)
    pub fn from_env() -> Result<Self> {
        let path = env::var("COMBAT_CONFIG").unwrap_or_else(|_| "combat-server.toml".into());
        let mut config = Self::load(Path::new(&path))?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        ConfigLoader::load_as(path)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let parsed = |key: &str| lookup(key).and_then(|value| value.parse::<u64>().ok());

        if let Some(dir) = lookup("COMBAT_CONTENT_DIR") {
            self.content_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("COMBAT_MAPS_DIR") {
            self.maps_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("COMBAT_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = parsed("COMBAT_TURN_TIMEOUT_MS") {
            self.runtime.player_turn_timeout_ms = Some(ms);
        }
        if let Some(seed) = parsed("COMBAT_RNG_SEED") {
            self.runtime.rng_seed = Some(seed);
        }
        if let Some(capacity) = parsed("COMBAT_EVENT_BUFFER") {
            self.runtime.event_buffer_size = (capacity as usize).max(1);
        }
        if let Some(capacity) = parsed("COMBAT_COMMAND_BUFFER") {
            self.runtime.command_buffer_size = (capacity as usize).max(1);
        }
    }

    /// Runtime configuration around the loaded combat rules.
    pub fn runtime_config(&self, combat: CombatConfig) -> RuntimeConfig {
        RuntimeConfig {
            combat,
            event_buffer_size: self.runtime.event_buffer_size,
            command_buffer_size: self.runtime.command_buffer_size,
            player_turn_timeout_ms: self.runtime.player_turn_timeout_ms,
            rng_seed: self.runtime.rng_seed,
        }
    }
}
