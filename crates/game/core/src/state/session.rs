//! The combat session aggregate.
//!
//! A [`CombatSession`] is created in [`CombatPhase::Prep`], fills up with
//! participants and expanded monster instances, runs the turn loop in
//! [`CombatPhase::Combat`] and is deleted by its owner once it reaches
//! [`CombatPhase::Ended`]. The [`Snapshot`] is materialized lazily from
//! participants and mob entries on first access.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::env::CollisionMap;
use crate::state::{
    Actor, CombatId, CombatIndex, Element, EntityId, MapId, MonsterEntry, MonsterId, PlayerEntry,
    PlayerId, PlayerProfile, Snapshot, SpellId, StatusEffects, SummonId, TilePos, UnitRef,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CombatPhase {
    Prep,
    Combat,
    Ended,
}

/// Kind of the actor currently playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TurnKind {
    #[default]
    Player,
    Monster,
    Summon,
}

impl From<UnitRef> for TurnKind {
    fn from(unit: UnitRef) -> Self {
        match unit {
            UnitRef::Player(_) => TurnKind::Player,
            UnitRef::Monster(_) => TurnKind::Monster,
            UnitRef::Summon(_) => TurnKind::Summon,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Aborted,
}

/// One member of a monster group as seen in the world.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupMember {
    pub monster_id: MonsterId,
    pub level: u32,
}

/// World monster group engaged by a combat start.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterGroup {
    pub entity_id: EntityId,
    pub members: Vec<GroupMember>,
}

/// A monster instance expanded from a group.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MobEntry {
    pub combat_index: CombatIndex,
    pub entity_id: EntityId,
    /// Position of the member inside its group.
    pub group_slot: u32,
    pub monster_id: MonsterId,
    pub level: u32,
    pub hp_max: u32,
    pub initiative: i32,
    pub pm: u32,
    pub tile: TilePos,
}

/// A player taking part in the combat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub profile: PlayerProfile,
    pub ready: bool,
    /// Mirror of the player's snapshot tile.
    pub tile: TilePos,
    /// Placement tile picked during prep.
    pub chosen_tile: Option<TilePos>,
    /// Max hp captured when combat starts, restored when it ends.
    pub hp_max_at_start: u32,
    pub last_move_seq: Option<u64>,
    /// Set once the player has left the combat.
    pub left: bool,
}

impl Participant {
    pub fn new(profile: PlayerProfile, tile: TilePos) -> Self {
        let hp_max = profile.hp_max;
        Self {
            profile,
            ready: false,
            tile,
            chosen_tile: None,
            hp_max_at_start: hp_max,
            last_move_seq: None,
            left: false,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.profile.player_id
    }
}

/// Remaining action and movement points of a player for the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TurnPool {
    pub pa: u32,
    pub pm: u32,
}

/// Per-actor spell usage.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SpellState {
    /// Turns left before each spell can be cast again.
    pub cooldowns: BTreeMap<SpellId, u32>,
    pub casts_this_turn: BTreeMap<SpellId, u32>,
    pub casts_per_target: BTreeMap<(SpellId, UnitRef), u32>,
}

impl SpellState {
    pub fn cooldown(&self, spell: &SpellId) -> u32 {
        self.cooldowns.get(spell).copied().unwrap_or(0)
    }

    pub fn casts(&self, spell: &SpellId) -> u32 {
        self.casts_this_turn.get(spell).copied().unwrap_or(0)
    }

    pub fn casts_on(&self, spell: &SpellId, target: UnitRef) -> u32 {
        self.casts_per_target
            .get(&(spell.clone(), target))
            .copied()
            .unwrap_or(0)
    }

    /// Clears per-turn counters and ticks cooldowns down by one.
    pub fn start_turn(&mut self) {
        self.casts_this_turn.clear();
        self.casts_per_target.clear();
        for turns in self.cooldowns.values_mut() {
            *turns = turns.saturating_sub(1);
        }
        self.cooldowns.retain(|_, turns| *turns > 0);
    }
}

/// An armed capture waiting for its target to die.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureState {
    pub target: CombatIndex,
    pub turns_left: u32,
}

/// Accumulated elemental charges of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementalCharges {
    pub element: Element,
    pub count: u32,
}

/// Authoritative state of one combat.
#[derive(Clone, Debug)]
pub struct CombatSession {
    pub id: CombatId,
    pub map_id: MapId,
    pub origin: TilePos,
    pub collision: Option<Arc<CollisionMap>>,
    /// Base seed of every roll in this combat.
    pub seed: u64,

    pub participants: Vec<Participant>,
    pub mob_entries: Vec<MobEntry>,

    pub phase: CombatPhase,
    pub turn: TurnKind,
    pub round: u32,
    pub actor_order: Vec<Actor>,
    pub actor_index: usize,
    pub active: Option<UnitRef>,

    pub pools: BTreeMap<PlayerId, TurnPool>,
    pub spell_state: BTreeMap<UnitRef, SpellState>,
    pub captures: BTreeMap<PlayerId, CaptureState>,
    pub charges: BTreeMap<PlayerId, ElementalCharges>,

    /// At most one AI turn is in flight.
    pub ai_running: bool,
    /// Client trusted to report monster-sourced damage.
    pub ai_driver: Option<PlayerId>,
    /// Set once a client snapshot bootstrap has been accepted.
    pub snapshot_locked: bool,
    pub outcome: Option<CombatOutcome>,

    /// Bumped whenever pending continuations must be invalidated.
    pub epoch: u64,
    pub(crate) roll_nonce: u64,
    pub(crate) next_summon_id: u32,
    pub(crate) move_seq: u64,
    pub(crate) cast_seq: u64,

    snapshot: Option<Snapshot>,
}

impl CombatSession {
    pub fn new(id: CombatId, map_id: MapId, origin: TilePos, seed: u64) -> Self {
        Self {
            id,
            map_id,
            origin,
            collision: None,
            seed,
            participants: Vec::new(),
            mob_entries: Vec::new(),
            phase: CombatPhase::Prep,
            turn: TurnKind::Player,
            round: 1,
            actor_order: Vec::new(),
            actor_index: 0,
            active: None,
            pools: BTreeMap::new(),
            spell_state: BTreeMap::new(),
            captures: BTreeMap::new(),
            charges: BTreeMap::new(),
            ai_running: false,
            ai_driver: None,
            snapshot_locked: false,
            outcome: None,
            epoch: 0,
            roll_nonce: 0,
            next_summon_id: 1,
            move_seq: 0,
            cast_seq: 0,
            snapshot: None,
        }
    }

    pub fn with_collision(mut self, collision: Option<Arc<CollisionMap>>) -> Self {
        self.collision = collision;
        self
    }

    pub fn participant(&self, player: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id() == player)
    }

    pub fn participant_mut(&mut self, player: PlayerId) -> Option<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.player_id() == player)
    }

    pub fn participant_ids(&self) -> Vec<PlayerId> {
        self.participants.iter().map(Participant::player_id).collect()
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.participant(player).is_some_and(|p| !p.left)
    }

    pub fn mob_entry(&self, index: CombatIndex) -> Option<&MobEntry> {
        self.mob_entries.iter().find(|m| m.combat_index == index)
    }

    pub fn active_player_id(&self) -> Option<PlayerId> {
        self.active.and_then(UnitRef::as_player)
    }

    pub fn active_monster(&self) -> Option<CombatIndex> {
        match self.active {
            Some(UnitRef::Monster(index)) => Some(index),
            _ => None,
        }
    }

    pub fn active_summon_id(&self) -> Option<SummonId> {
        match self.active {
            Some(UnitRef::Summon(id)) => Some(id),
            _ => None,
        }
    }

    pub fn current_actor(&self) -> Option<&Actor> {
        self.actor_order.get(self.actor_index)
    }

    /// Snapshot, built from participants and mob entries on first access.
    pub fn snapshot_mut(&mut self) -> &mut Snapshot {
        let participants = &self.participants;
        let mobs = &self.mob_entries;
        self.snapshot
            .get_or_insert_with(|| Self::materialize(participants, mobs))
    }

    /// Snapshot if it has been materialized.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    fn materialize(participants: &[Participant], mobs: &[MobEntry]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for participant in participants.iter().filter(|p| !p.left) {
            snapshot.upsert_player(PlayerEntry {
                player_id: participant.player_id(),
                tile: participant.tile,
                hp: participant.profile.hp,
                hp_max: participant.profile.hp_max,
                status_effects: StatusEffects::new(),
            });
        }
        for mob in mobs {
            snapshot.upsert_monster(MonsterEntry {
                combat_index: mob.combat_index,
                entity_id: mob.entity_id,
                monster_id: mob.monster_id.clone(),
                tile: mob.tile,
                hp: mob.hp_max,
                hp_max: mob.hp_max,
                status_effects: StatusEffects::new(),
            });
        }
        snapshot
    }

    pub(crate) fn next_cast_id(&mut self) -> u64 {
        self.cast_seq += 1;
        self.cast_seq
    }

    pub(crate) fn next_move_seq(&mut self) -> u64 {
        self.move_seq += 1;
        self.move_seq
    }

    pub(crate) fn allocate_summon_id(&mut self) -> SummonId {
        let id = SummonId(self.next_summon_id);
        self.next_summon_id += 1;
        id
    }

    /// Casts resolved by the server so far. Client reports quoting one of these are duplicates.
    pub fn last_cast_id(&self) -> u64 {
        self.cast_seq
    }

    pub fn is_walkable(&self, tile: TilePos) -> bool {
        self.collision
            .as_ref()
            .is_some_and(|map| map.is_walkable(tile))
    }

    pub fn in_bounds(&self, tile: TilePos) -> bool {
        self.collision.as_ref().is_some_and(|map| map.contains(tile))
    }
}
