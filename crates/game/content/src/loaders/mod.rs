//! Content loaders for reading combat data from files.
//!
//! Catalogs and profiles are RON, rule configuration is TOML and level data is
//! Tiled-style JSON reduced to a [`combat_core::CollisionMap`].

pub mod catalog;
pub mod config;
pub mod factory;
pub mod level;
pub mod profiles;

pub use catalog::{ClassLoader, MonsterLoader, SpellLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use level::LevelLoader;
pub use profiles::ProfileLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
