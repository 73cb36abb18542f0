//! Authoritative position-and-health snapshot.
//!
//! [`Snapshot`] is the only mutation surface for unit positions, hit points and
//! status effects. Every other component reads it through the accessors below
//! and writes through `upsert_*`, [`Snapshot::set_tile`], [`Snapshot::apply_damage`]
//! and [`Snapshot::heal`].
//!
//! Dead entries (hp = 0) stay in place until explicitly removed so turn-order
//! bookkeeping can still resolve them; alive-only queries skip them.

use std::collections::HashSet;

use crate::state::{
    Absorption, CombatIndex, EntityId, MonsterId, PlayerId, StatusEffects, SummonId, TilePos,
    UnitRef,
};

/// Player entry of the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerEntry {
    pub player_id: PlayerId,
    pub tile: TilePos,
    pub hp: u32,
    pub hp_max: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_effects: StatusEffects,
}

/// Monster entry of the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterEntry {
    pub combat_index: CombatIndex,
    pub entity_id: EntityId,
    pub monster_id: MonsterId,
    pub tile: TilePos,
    pub hp: u32,
    pub hp_max: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_effects: StatusEffects,
}

/// Summon entry of the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonEntry {
    pub summon_id: SummonId,
    pub owner_player_id: PlayerId,
    pub monster_id: MonsterId,
    pub level: u32,
    pub initiative: i32,
    pub tile: TilePos,
    pub hp: u32,
    pub hp_max: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_effects: StatusEffects,
}

/// Common view over the three entry kinds.
pub trait Combatant {
    fn unit(&self) -> UnitRef;
    fn tile(&self) -> TilePos;
    fn hp(&self) -> u32;
    fn hp_max(&self) -> u32;
    fn statuses(&self) -> &StatusEffects;

    fn is_alive(&self) -> bool {
        self.hp() > 0
    }
}

trait CombatantMut: Combatant {
    fn set_tile(&mut self, tile: TilePos);
    fn set_hp(&mut self, hp: u32);
    fn statuses_mut(&mut self) -> &mut StatusEffects;
}

macro_rules! impl_combatant {
    ($entry:ty, |$this:ident| $unit:expr) => {
        impl Combatant for $entry {
            fn unit(&self) -> UnitRef {
                let $this = self;
                $unit
            }
            fn tile(&self) -> TilePos {
                self.tile
            }
            fn hp(&self) -> u32 {
                self.hp
            }
            fn hp_max(&self) -> u32 {
                self.hp_max
            }
            fn statuses(&self) -> &StatusEffects {
                &self.status_effects
            }
        }

        impl CombatantMut for $entry {
            fn set_tile(&mut self, tile: TilePos) {
                self.tile = tile;
            }
            fn set_hp(&mut self, hp: u32) {
                self.hp = hp.min(self.hp_max);
            }
            fn statuses_mut(&mut self) -> &mut StatusEffects {
                &mut self.status_effects
            }
        }
    };
}

impl_combatant!(PlayerEntry, |e| UnitRef::Player(e.player_id));
impl_combatant!(MonsterEntry, |e| UnitRef::Monster(e.combat_index));
impl_combatant!(SummonEntry, |e| UnitRef::Summon(e.summon_id));

/// Outcome of a committed damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DamageApplied {
    /// Damage eaten by shields.
    pub absorbed: u32,
    /// Hit points actually removed.
    pub dealt: u32,
    pub hp_after: u32,
    /// True when this application took the unit from alive to dead.
    pub killed: bool,
}

/// Serializable combat state shared with clients.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    #[cfg_attr(feature = "serde", serde(default))]
    players: Vec<PlayerEntry>,
    #[cfg_attr(feature = "serde", serde(default))]
    monsters: Vec<MonsterEntry>,
    #[cfg_attr(feature = "serde", serde(default))]
    summons: Vec<SummonEntry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== read access =====

    pub fn players(&self) -> &[PlayerEntry] {
        &self.players
    }

    pub fn monsters(&self) -> &[MonsterEntry] {
        &self.monsters
    }

    pub fn summons(&self) -> &[SummonEntry] {
        &self.summons
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerEntry> {
        self.players.iter().find(|p| p.player_id == id)
    }

    pub fn monster(&self, index: CombatIndex) -> Option<&MonsterEntry> {
        self.monsters.iter().find(|m| m.combat_index == index)
    }

    pub fn summon(&self, id: SummonId) -> Option<&SummonEntry> {
        self.summons.iter().find(|s| s.summon_id == id)
    }

    pub fn combatant(&self, unit: UnitRef) -> Option<&dyn Combatant> {
        match unit {
            UnitRef::Player(id) => self.player(id).map(|e| e as &dyn Combatant),
            UnitRef::Monster(index) => self.monster(index).map(|e| e as &dyn Combatant),
            UnitRef::Summon(id) => self.summon(id).map(|e| e as &dyn Combatant),
        }
    }

    /// Every entry, dead or alive, players first.
    pub fn combatants(&self) -> impl Iterator<Item = &dyn Combatant> {
        self.players
            .iter()
            .map(|e| e as &dyn Combatant)
            .chain(self.monsters.iter().map(|e| e as &dyn Combatant))
            .chain(self.summons.iter().map(|e| e as &dyn Combatant))
    }

    pub fn living(&self) -> impl Iterator<Item = &dyn Combatant> {
        self.combatants().filter(|c| c.is_alive())
    }

    pub fn is_alive(&self, unit: UnitRef) -> bool {
        self.combatant(unit).is_some_and(|c| c.is_alive())
    }

    pub fn tile_of(&self, unit: UnitRef) -> Option<TilePos> {
        self.combatant(unit).map(|c| c.tile())
    }

    /// Living unit standing on `tile`, if any.
    pub fn unit_at(&self, tile: TilePos) -> Option<UnitRef> {
        self.living().find(|c| c.tile() == tile).map(|c| c.unit())
    }

    /// Tiles held by living units, optionally ignoring one unit.
    pub fn occupied_tiles(&self, except: Option<UnitRef>) -> HashSet<TilePos> {
        self.living()
            .filter(|c| Some(c.unit()) != except)
            .map(|c| c.tile())
            .collect()
    }

    pub fn living_players(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    pub fn living_monsters(&self) -> usize {
        self.monsters.iter().filter(|m| m.is_alive()).count()
    }

    /// The living summon owned by `owner`, if any.
    pub fn living_summon_of(&self, owner: PlayerId) -> Option<&SummonEntry> {
        self.summons
            .iter()
            .find(|s| s.owner_player_id == owner && s.is_alive())
    }

    // ===== mutation gateway =====

    pub fn upsert_player(&mut self, mut entry: PlayerEntry) {
        entry.hp = entry.hp.min(entry.hp_max);
        match self
            .players
            .iter_mut()
            .find(|p| p.player_id == entry.player_id)
        {
            Some(existing) => *existing = entry,
            None => self.players.push(entry),
        }
    }

    pub fn upsert_monster(&mut self, mut entry: MonsterEntry) {
        entry.hp = entry.hp.min(entry.hp_max);
        match self
            .monsters
            .iter_mut()
            .find(|m| m.combat_index == entry.combat_index)
        {
            Some(existing) => *existing = entry,
            None => self.monsters.push(entry),
        }
    }

    pub fn upsert_summon(&mut self, mut entry: SummonEntry) {
        entry.hp = entry.hp.min(entry.hp_max);
        match self
            .summons
            .iter_mut()
            .find(|s| s.summon_id == entry.summon_id)
        {
            Some(existing) => *existing = entry,
            None => self.summons.push(entry),
        }
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<PlayerEntry> {
        let position = self.players.iter().position(|p| p.player_id == id)?;
        Some(self.players.remove(position))
    }

    pub fn remove_summon(&mut self, id: SummonId) -> Option<SummonEntry> {
        let position = self.summons.iter().position(|s| s.summon_id == id)?;
        Some(self.summons.remove(position))
    }

    pub fn clear_summons(&mut self) {
        self.summons.clear();
    }

    fn combatant_mut(&mut self, unit: UnitRef) -> Option<&mut dyn CombatantMut> {
        match unit {
            UnitRef::Player(id) => self
                .players
                .iter_mut()
                .find(|p| p.player_id == id)
                .map(|e| e as &mut dyn CombatantMut),
            UnitRef::Monster(index) => self
                .monsters
                .iter_mut()
                .find(|m| m.combat_index == index)
                .map(|e| e as &mut dyn CombatantMut),
            UnitRef::Summon(id) => self
                .summons
                .iter_mut()
                .find(|s| s.summon_id == id)
                .map(|e| e as &mut dyn CombatantMut),
        }
    }

    /// Moves a unit. Returns false when the unit is unknown.
    pub fn set_tile(&mut self, unit: UnitRef, tile: TilePos) -> bool {
        match self.combatant_mut(unit) {
            Some(entry) => {
                entry.set_tile(tile);
                true
            }
            None => false,
        }
    }

    /// Overwrites hit points, clamped to `[0, hp_max]`.
    pub fn set_hp(&mut self, unit: UnitRef, hp: u32) -> bool {
        match self.combatant_mut(unit) {
            Some(entry) => {
                entry.set_hp(hp);
                true
            }
            None => false,
        }
    }

    /// Runs damage through the unit's shields and commits the rest to hp.
    ///
    /// Returns `None` for unknown or already dead units.
    pub fn apply_damage(&mut self, unit: UnitRef, amount: u32) -> Option<DamageApplied> {
        let entry = self.combatant_mut(unit)?;
        if !entry.is_alive() {
            return None;
        }

        let Absorption {
            absorbed,
            remaining,
        } = entry.statuses_mut().absorb(amount);
        let before = entry.hp();
        let after = before.saturating_sub(remaining);
        entry.set_hp(after);

        Some(DamageApplied {
            absorbed,
            dealt: before - after,
            hp_after: after,
            killed: after == 0,
        })
    }

    /// Restores hit points on a living unit. Returns the amount actually healed.
    pub fn heal(&mut self, unit: UnitRef, amount: u32) -> Option<u32> {
        let entry = self.combatant_mut(unit)?;
        if !entry.is_alive() {
            return None;
        }
        let before = entry.hp();
        entry.set_hp(before.saturating_add(amount));
        Some(entry.hp() - before)
    }

    pub fn statuses(&self, unit: UnitRef) -> Option<&StatusEffects> {
        self.combatant(unit).map(|c| c.statuses())
    }

    pub fn statuses_mut(&mut self, unit: UnitRef) -> Option<&mut StatusEffects> {
        self.combatant_mut(unit).map(|c| c.statuses_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StatusEffect;

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.upsert_player(PlayerEntry {
            player_id: PlayerId(1),
            tile: TilePos::new(0, 0),
            hp: 50,
            hp_max: 50,
            status_effects: StatusEffects::new(),
        });
        snapshot.upsert_monster(MonsterEntry {
            combat_index: CombatIndex(0),
            entity_id: EntityId(900),
            monster_id: MonsterId::from("piou"),
            tile: TilePos::new(3, 0),
            hp: 20,
            hp_max: 20,
            status_effects: StatusEffects::new(),
        });
        snapshot
    }

    #[test]
    fn upsert_clamps_hp_and_replaces_existing_entry() {
        let mut snapshot = snapshot();
        snapshot.upsert_player(PlayerEntry {
            player_id: PlayerId(1),
            tile: TilePos::new(4, 4),
            hp: 80,
            hp_max: 60,
            status_effects: StatusEffects::new(),
        });

        assert_eq!(snapshot.players().len(), 1);
        let player = snapshot.player(PlayerId(1)).unwrap();
        assert_eq!(player.hp, 60);
        assert_eq!(player.tile, TilePos::new(4, 4));
    }

    #[test]
    fn lethal_damage_keeps_dead_entry_out_of_alive_queries() {
        let mut snapshot = snapshot();
        let monster = UnitRef::Monster(CombatIndex(0));

        let applied = snapshot.apply_damage(monster, 35).unwrap();

        assert_eq!(applied.dealt, 20);
        assert!(applied.killed);
        assert_eq!(snapshot.monsters().len(), 1);
        assert_eq!(snapshot.living_monsters(), 0);
        assert_eq!(snapshot.unit_at(TilePos::new(3, 0)), None);
        assert!(snapshot.apply_damage(monster, 5).is_none());
    }

    #[test]
    fn shields_are_consumed_before_hp() {
        let mut snapshot = snapshot();
        let player = UnitRef::Player(PlayerId(1));
        snapshot
            .statuses_mut(player)
            .unwrap()
            .upsert(StatusEffect::shield("ward", 8, 2));

        let applied = snapshot.apply_damage(player, 10).unwrap();

        assert_eq!(applied.absorbed, 8);
        assert_eq!(applied.dealt, 2);
        assert_eq!(snapshot.player(PlayerId(1)).unwrap().hp, 48);
        assert!(snapshot.statuses(player).unwrap().is_empty());
    }

    #[test]
    fn heal_is_clamped_to_max() {
        let mut snapshot = snapshot();
        let player = UnitRef::Player(PlayerId(1));
        snapshot.apply_damage(player, 5);

        assert_eq!(snapshot.heal(player, 30), Some(5));
        assert_eq!(snapshot.player(PlayerId(1)).unwrap().hp, 50);
    }
}
