//! Out-of-combat player data consumed at join time.

use crate::state::{ClassId, Element, ElementValues, MonsterId, PlayerId, SpellId};

/// Combat characteristics of a player or monster.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CombatStats {
    pub initiative: i32,
    pub strength: i32,
    pub intelligence: i32,
    pub chance: i32,
    pub agility: i32,
    /// Added to a spell's base critical chance, in percent.
    pub crit_bonus: i32,
    /// Flat damage added to every element.
    pub damage_bonus: i32,
    /// Flat damage added per element.
    pub elemental_damage: ElementValues,
    /// Flat damage added on critical hits only.
    pub crit_damage_bonus: i32,
    /// Added to wall damage when this unit pushes something into an obstacle.
    pub push_damage: u32,
    pub tacle: u32,
    pub fuite: u32,
    /// Flat reduction per element.
    pub resistances: ElementValues,
}

impl CombatStats {
    /// Characteristic that scales damage of the given element.
    pub fn elemental_stat(&self, element: Element) -> i32 {
        match element {
            Element::Neutral | Element::Earth => self.strength,
            Element::Fire => self.intelligence,
            Element::Water => self.chance,
            Element::Air => self.agility,
        }
    }
}

/// A monster a player has captured and can later summon.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapturedMonster {
    pub monster_id: MonsterId,
    pub level: u32,
}

/// Persistent player profile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerProfile {
    pub player_id: PlayerId,
    pub name: String,
    pub class_id: ClassId,
    pub level: u32,
    pub hp: u32,
    pub hp_max: u32,
    /// Action points granted at the start of each turn.
    pub pa: u32,
    /// Movement points granted at the start of each turn.
    pub pm: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: CombatStats,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells: Vec<SpellId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub captured: Option<CapturedMonster>,
}

impl PlayerProfile {
    pub fn knows(&self, spell: &SpellId) -> bool {
        self.spells.contains(spell)
    }
}
