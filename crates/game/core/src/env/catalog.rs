//! Static spell, monster and class definitions and the catalogs serving them.

use crate::config::LifeStealBasis;
use crate::state::{
    ClassId, CombatStats, DamageSpan, Element, MonsterId, SpellId, StatusEffect, StatusKind,
};

/// Targeting restriction of a spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastPattern {
    /// Any tile within range.
    #[default]
    Free,
    /// Target must share a row or a column with the caster.
    Orthogonal,
}

/// Base and critical damage intervals of a spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDamage {
    pub min: u32,
    pub max: u32,
    pub crit_min: u32,
    pub crit_max: u32,
    /// Base critical chance in percent. Zero disables critical hits.
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit_chance: u32,
}

/// Spell-specific conditional damage rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellRule {
    /// Consumes the caster's elemental charges for a damage bonus.
    ChargeSurge,
}

/// Tile set hit by a pattern damage effect, centered on the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AreaPattern {
    /// Target plus every tile within `radius` along both axes.
    Cross { radius: u32 },
    /// Target, the tile behind it, and the two tiles beside it
    /// (relative to the caster's facing).
    FrontCross,
    /// Every tile within Chebyshev distance `radius`.
    Square { radius: u32 },
    /// `length` tiles starting at the target, away from the caster.
    Line { length: u32 },
}

/// Which units an area buff affects, relative to the caster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuffSide {
    #[default]
    Allies,
    Enemies,
}

/// Status effect as declared by a spell.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusTemplate {
    pub id: String,
    pub kind: StatusKind,
    pub turns: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub amount: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DamageSpan>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Element,
}

impl StatusTemplate {
    pub fn instantiate(&self, source: &SpellId) -> StatusEffect {
        let mut effect = StatusEffect::new(self.id.clone(), self.kind, self.turns)
            .with_amount(self.amount)
            .with_source(source.as_str());
        if let Some(damage) = self.damage {
            effect = effect.with_damage(damage, self.element);
        }
        effect
    }
}

/// One step of a spell's effect pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellEffect {
    /// Rolls the spell damage against the unit on the target tile.
    Damage,
    /// Rolls the spell damage independently against every unit in the area.
    PatternDamage { area: AreaPattern },
    /// Heals the caster for the last damage of this cast.
    LifeSteal {
        #[cfg_attr(feature = "serde", serde(default))]
        basis: Option<LifeStealBasis>,
    },
    /// Pushes the target away from the caster.
    Push { distance: u32 },
    /// Moves the caster straight towards an aligned target until adjacent.
    PullCasterToMelee { distance: u32 },
    Status {
        status: StatusTemplate,
        #[cfg_attr(feature = "serde", serde(default))]
        on_caster: bool,
    },
    AreaBuff {
        radius: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        side: BuffSide,
        statuses: Vec<StatusTemplate>,
        /// When set, shield statuses get this percentage of the caster's max hp.
        #[cfg_attr(feature = "serde", serde(default))]
        shield_percent_of_max_hp: Option<u32>,
    },
    Capture { turns: u32 },
    SummonCaptured,
}

/// Static spell definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDef {
    pub id: SpellId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pa_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub range_min: u32,
    pub range_max: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pattern: CastPattern,
    #[cfg_attr(feature = "serde", serde(default))]
    pub line_of_sight: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_casts_per_turn: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_casts_per_target: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Element,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<SpellDamage>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<SpellEffect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rule: Option<SpellRule>,
}

/// Static monster definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterDef {
    pub id: MonsterId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub base_hp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hp_per_level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initiative: i32,
    /// Movement points per turn. Zero falls back to the configured default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pm: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells: Vec<SpellId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: CombatStats,
    #[cfg_attr(feature = "serde", serde(default))]
    pub capturable: bool,
    /// Flat damage interval used when the monster's first spell has no definition.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fallback_damage: Option<DamageSpan>,
}

impl MonsterDef {
    pub fn hp_at(&self, level: u32) -> u32 {
        self.base_hp + self.hp_per_level * level.saturating_sub(1)
    }
}

/// Static class definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDef {
    pub id: ClassId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Whether casting elemental spells accumulates charges.
    #[cfg_attr(feature = "serde", serde(default))]
    pub elemental_charges: bool,
}

/// Read-only spell lookup.
pub trait SpellCatalog: Send + Sync {
    fn spell(&self, id: &SpellId) -> Option<&SpellDef>;
}

/// Read-only monster lookup.
pub trait MonsterCatalog: Send + Sync {
    fn monster(&self, id: &MonsterId) -> Option<&MonsterDef>;
}

/// Read-only class lookup.
pub trait ClassCatalog: Send + Sync {
    fn class(&self, id: &ClassId) -> Option<&ClassDef>;
}

/// Catalog that knows nothing. Used where content is not wired.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyCatalog;

impl SpellCatalog for EmptyCatalog {
    fn spell(&self, _id: &SpellId) -> Option<&SpellDef> {
        None
    }
}

impl MonsterCatalog for EmptyCatalog {
    fn monster(&self, _id: &MonsterId) -> Option<&MonsterDef> {
        None
    }
}

impl ClassCatalog for EmptyCatalog {
    fn class(&self, _id: &ClassId) -> Option<&ClassDef> {
        None
    }
}

impl SpellCatalog for std::collections::HashMap<SpellId, SpellDef> {
    fn spell(&self, id: &SpellId) -> Option<&SpellDef> {
        self.get(id)
    }
}

impl MonsterCatalog for std::collections::HashMap<MonsterId, MonsterDef> {
    fn monster(&self, id: &MonsterId) -> Option<&MonsterDef> {
        self.get(id)
    }
}

impl ClassCatalog for std::collections::HashMap<ClassId, ClassDef> {
    fn class(&self, id: &ClassId) -> Option<&ClassDef> {
        self.get(id)
    }
}
