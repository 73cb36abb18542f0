//! In-memory catalog serving every static definition the engine looks up.

use std::collections::HashMap;

use combat_core::{
    ClassCatalog, ClassDef, ClassId, MonsterCatalog, MonsterDef, MonsterId, SpellCatalog,
    SpellDef, SpellId,
};

/// Spell, monster and class definitions keyed by id.
#[derive(Clone, Debug, Default)]
pub struct ContentCatalog {
    spells: HashMap<SpellId, SpellDef>,
    monsters: HashMap<MonsterId, MonsterDef>,
    classes: HashMap<ClassId, ClassDef>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        spells: impl IntoIterator<Item = SpellDef>,
        monsters: impl IntoIterator<Item = MonsterDef>,
        classes: impl IntoIterator<Item = ClassDef>,
    ) -> Self {
        let mut catalog = Self::new();
        spells.into_iter().for_each(|def| catalog.insert_spell(def));
        monsters
            .into_iter()
            .for_each(|def| catalog.insert_monster(def));
        classes.into_iter().for_each(|def| catalog.insert_class(def));
        catalog
    }

    /// Later definitions replace earlier ones with the same id.
    pub fn insert_spell(&mut self, def: SpellDef) {
        self.spells.insert(def.id.clone(), def);
    }

    pub fn insert_monster(&mut self, def: MonsterDef) {
        self.monsters.insert(def.id.clone(), def);
    }

    pub fn insert_class(&mut self, def: ClassDef) {
        self.classes.insert(def.id.clone(), def);
    }

    pub fn spell_count(&self) -> usize {
        self.spells.len()
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Spells referenced by monsters but missing from the catalog.
    ///
    /// Such monsters fall back to flat damage during their turn, so a
    /// non-empty result usually means broken content.
    pub fn dangling_monster_spells(&self) -> Vec<(MonsterId, SpellId)> {
        let mut missing: Vec<_> = self
            .monsters
            .values()
            .flat_map(|def| {
                def.spells
                    .iter()
                    .filter(|spell| !self.spells.contains_key(*spell))
                    .map(|spell| (def.id.clone(), spell.clone()))
            })
            .collect();
        missing.sort();
        missing
    }
}

impl SpellCatalog for ContentCatalog {
    fn spell(&self, id: &SpellId) -> Option<&SpellDef> {
        self.spells.get(id)
    }
}

impl MonsterCatalog for ContentCatalog {
    fn monster(&self, id: &MonsterId) -> Option<&MonsterDef> {
        self.monsters.get(id)
    }
}

impl ClassCatalog for ContentCatalog {
    fn class(&self, id: &ClassId) -> Option<&ClassDef> {
        self.classes.get(id)
    }
}
