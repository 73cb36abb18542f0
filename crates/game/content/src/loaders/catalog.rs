//! Spell, monster and class catalog loaders.

use std::collections::HashSet;
use std::hash::Hash;
use std::path::Path;

use combat_core::{ClassDef, MonsterDef, SpellDef};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalogFile {
    pub spells: Vec<SpellDef>,
}

/// Monster catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterCatalogFile {
    pub monsters: Vec<MonsterDef>,
}

/// Class catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCatalogFile {
    pub classes: Vec<ClassDef>,
}

/// Fails on the first id that appears twice.
fn ensure_unique<'a, K, T>(
    kind: &str,
    items: &'a [T],
    key: impl Fn(&'a T) -> &'a K,
) -> LoadResult<()>
where
    K: Eq + Hash + std::fmt::Display + 'a,
{
    let mut seen = HashSet::new();
    for item in items {
        let id = key(item);
        if !seen.insert(id) {
            anyhow::bail!("Duplicate {} id '{}'", kind, id);
        }
    }
    Ok(())
}

/// Loader for spell definitions.
pub struct SpellLoader;

impl SpellLoader {
    /// Load a spell catalog from a RON file.
    ///
    /// Rejects duplicate ids and inverted range or damage intervals.
    pub fn load(path: &Path) -> LoadResult<Vec<SpellDef>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<SpellDef>> {
        let catalog: SpellCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;

        ensure_unique("spell", &catalog.spells, |def| &def.id)?;
        for def in &catalog.spells {
            if def.range_min > def.range_max {
                anyhow::bail!(
                    "Spell '{}' has range {}..{} with min above max",
                    def.id,
                    def.range_min,
                    def.range_max
                );
            }
            if let Some(damage) = def.damage
                && (damage.min > damage.max || damage.crit_min > damage.crit_max)
            {
                anyhow::bail!("Spell '{}' has an inverted damage interval", def.id);
            }
        }
        Ok(catalog.spells)
    }
}

/// Loader for monster definitions.
pub struct MonsterLoader;

impl MonsterLoader {
    /// Load a monster catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<MonsterDef>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<MonsterDef>> {
        let catalog: MonsterCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse monster catalog RON: {}", e))?;

        ensure_unique("monster", &catalog.monsters, |def| &def.id)?;
        if let Some(def) = catalog.monsters.iter().find(|def| def.base_hp == 0) {
            anyhow::bail!("Monster '{}' has no base hp", def.id);
        }
        Ok(catalog.monsters)
    }
}

/// Loader for class definitions.
pub struct ClassLoader;

impl ClassLoader {
    /// Load a class catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<ClassDef>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<ClassDef>> {
        let catalog: ClassCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse class catalog RON: {}", e))?;

        ensure_unique("class", &catalog.classes, |def| &def.id)?;
        Ok(catalog.classes)
    }
}
