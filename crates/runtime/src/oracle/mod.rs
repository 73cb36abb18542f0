//! Static content oracles bundled for the combat worker.
//!
//! [`OracleManager`] holds the catalogs, the collision oracle, the RNG and
//! the rule configuration, and lends them out as a [`CombatEnv`] for each
//! engine call. Everything here is immutable at runtime; dynamic state lives
//! in repositories.

use std::sync::Arc;

use combat_content::ContentCatalog;
use combat_core::{
    ClassCatalog, CollisionMap, CombatConfig, CombatEnv, EmptyCatalog, MapId, MapOracle,
    MonsterCatalog, PcgRng, SpellCatalog,
};

/// Map oracle that knows no map. Sessions created against it have no
/// collision data, so AI turns end immediately and movement is refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMaps;

impl MapOracle for NoMaps {
    fn collision(&self, _map: &MapId) -> Option<Arc<CollisionMap>> {
        None
    }
}

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) spells: Arc<dyn SpellCatalog>,
    pub(crate) monsters: Arc<dyn MonsterCatalog>,
    pub(crate) classes: Arc<dyn ClassCatalog>,
    pub(crate) maps: Arc<dyn MapOracle>,
    pub(crate) rng: PcgRng,
    pub(crate) config: Arc<CombatConfig>,
}

impl OracleManager {
    pub fn new(
        spells: Arc<dyn SpellCatalog>,
        monsters: Arc<dyn MonsterCatalog>,
        classes: Arc<dyn ClassCatalog>,
        maps: Arc<dyn MapOracle>,
        config: CombatConfig,
    ) -> Self {
        Self {
            spells,
            monsters,
            classes,
            maps,
            rng: PcgRng,
            config: Arc::new(config),
        }
    }

    /// One catalog serving spells, monsters and classes.
    pub fn from_catalog(
        catalog: Arc<ContentCatalog>,
        maps: Arc<dyn MapOracle>,
        config: CombatConfig,
    ) -> Self {
        Self::new(catalog.clone(), catalog.clone(), catalog, maps, config)
    }

    /// No content at all. Useful for wiring tests.
    pub fn empty() -> Self {
        let empty = Arc::new(EmptyCatalog);
        Self::new(
            empty.clone(),
            empty.clone(),
            empty,
            Arc::new(NoMaps),
            CombatConfig::default(),
        )
    }

    /// Replaces the rule configuration.
    pub fn with_config(mut self, config: CombatConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn collision(&self, map_id: &MapId) -> Option<Arc<CollisionMap>> {
        self.maps.collision(map_id)
    }

    /// Borrows every oracle as a [`CombatEnv`] for one engine call.
    pub fn as_env(&self) -> CombatEnv<'_> {
        CombatEnv::new(
            self.spells.as_ref(),
            self.monsters.as_ref(),
            self.classes.as_ref(),
            &self.rng,
            &self.config,
        )
    }
}
