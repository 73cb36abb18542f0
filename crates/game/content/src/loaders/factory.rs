//! Content factory for building catalogs and oracles from a data directory.

use std::path::{Path, PathBuf};

use combat_core::{CombatConfig, PlayerProfile};
use tracing::{info, warn};

use crate::catalog::ContentCatalog;
use crate::collision::CollisionCache;
use crate::loaders::{
    ClassLoader, ConfigLoader, LoadResult, MonsterLoader, ProfileLoader, SpellLoader,
};

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── combat.toml
/// ├── spells.ron
/// ├── monsters.ron
/// ├── classes.ron
/// ├── profiles.ron
/// └── maps/
///     └── arena.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
    maps_dir: Option<PathBuf>,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            maps_dir: None,
        }
    }

    /// Reads level data from somewhere other than `data_dir/maps`.
    pub fn with_maps_dir(mut self, maps_dir: impl Into<PathBuf>) -> Self {
        self.maps_dir = Some(maps_dir.into());
        self
    }

    /// Load combat rules from `combat.toml`, or defaults when the file is absent.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("combat.toml");
        if !path.exists() {
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the spell, monster and class catalogs.
    pub fn load_catalog(&self) -> LoadResult<ContentCatalog> {
        let spells = SpellLoader::load(&self.data_dir.join("spells.ron"))?;
        let monsters = MonsterLoader::load(&self.data_dir.join("monsters.ron"))?;
        let classes = ClassLoader::load(&self.data_dir.join("classes.ron"))?;
        let catalog = ContentCatalog::from_parts(spells, monsters, classes);

        for (monster, spell) in catalog.dangling_monster_spells() {
            warn!(
                target: "content",
                monster = %monster,
                spell = %spell,
                "monster references an unknown spell"
            );
        }
        info!(
            target: "content",
            spells = catalog.spell_count(),
            monsters = catalog.monster_count(),
            classes = catalog.class_count(),
            "content catalog loaded"
        );
        Ok(catalog)
    }

    /// Load player profiles from `profiles.ron`. Absent file means no profiles.
    pub fn load_profiles(&self) -> LoadResult<Vec<PlayerProfile>> {
        let path = self.data_dir.join("profiles.ron");
        if !path.exists() {
            return Ok(Vec::new());
        }
        ProfileLoader::load(&path)
    }

    /// Collision cache reading level data lazily.
    pub fn collision_cache(&self) -> CollisionCache {
        CollisionCache::new(self.maps_dir())
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.maps_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("maps"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{MapId, MapOracle, MonsterCatalog, MonsterId, SpellCatalog, SpellId};

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[test]
    fn bundled_content_loads() {
        let factory = ContentFactory::new(data_dir());

        let catalog = factory.load_catalog().unwrap();
        assert!(catalog.dangling_monster_spells().is_empty());
        assert!(catalog.spell(&SpellId::from("pression")).is_some());
        assert!(catalog.monster(&MonsterId::from("piou")).is_some());

        let config = factory.load_config().unwrap();
        assert_eq!(config.wall_damage_per_tile, 9);

        assert!(!factory.load_profiles().unwrap().is_empty());
        assert!(
            factory
                .collision_cache()
                .collision(&MapId::from("arena"))
                .is_some()
        );
    }

    #[test]
    fn optional_files_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path()).with_maps_dir("/elsewhere");

        assert_eq!(factory.load_config().unwrap(), CombatConfig::default());
        assert!(factory.load_profiles().unwrap().is_empty());
        assert!(factory.load_catalog().is_err());
        assert_eq!(factory.maps_dir(), PathBuf::from("/elsewhere"));
    }
}
