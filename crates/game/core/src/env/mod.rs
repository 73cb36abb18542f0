//! Read-only collaborators of the combat engine.
//!
//! Catalogs expose static spell, monster and class definitions; the map
//! oracle serves collision data; the RNG oracle makes rolls reproducible.
//! [`CombatEnv`] bundles what the engine needs for one call so rules never
//! depend on concrete content implementations.
mod catalog;
mod map;
mod rng;

pub use catalog::{
    AreaPattern, BuffSide, CastPattern, ClassCatalog, ClassDef, EmptyCatalog, MonsterCatalog,
    MonsterDef, SpellCatalog, SpellDamage, SpellDef, SpellEffect, SpellRule, StatusTemplate,
};
pub use map::{CollisionMap, MapOracle};
pub use rng::{FixedRng, PcgRng, RngOracle, compute_seed};

use crate::config::CombatConfig;

/// Oracles and rules handed to every engine call.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    pub spells: &'a dyn SpellCatalog,
    pub monsters: &'a dyn MonsterCatalog,
    pub classes: &'a dyn ClassCatalog,
    pub rng: &'a dyn RngOracle,
    pub config: &'a CombatConfig,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        spells: &'a dyn SpellCatalog,
        monsters: &'a dyn MonsterCatalog,
        classes: &'a dyn ClassCatalog,
        rng: &'a dyn RngOracle,
        config: &'a CombatConfig,
    ) -> Self {
        Self {
            spells,
            monsters,
            classes,
            rng,
            config,
        }
    }

    pub fn spell(&self, id: &crate::state::SpellId) -> Option<&'a SpellDef> {
        self.spells.spell(id)
    }

    pub fn monster(&self, id: &crate::state::MonsterId) -> Option<&'a MonsterDef> {
        self.monsters.monster(id)
    }

    pub fn class(&self, id: &crate::state::ClassId) -> Option<&'a ClassDef> {
        self.classes.class(id)
    }
}

impl std::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
