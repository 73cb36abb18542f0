//! Authoritative combat state representation.
//!
//! This module owns the session aggregate, the client-visible snapshot and
//! the identifiers shared by every layer. Runtime layers read this state but
//! mutate it exclusively through the engine.
mod actor;
mod common;
mod profile;
mod session;
mod snapshot;
mod status;

pub use actor::{Actor, ActorKind};
pub use common::{
    ClassId, CombatId, CombatIndex, Element, ElementValues, EntityId, MapId, MonsterId, PlayerId,
    Side, SpellId, SummonId, TilePos, UnitRef,
};
pub use profile::{CapturedMonster, CombatStats, PlayerProfile};
pub use session::{
    CaptureState, CombatOutcome, CombatPhase, CombatSession, ElementalCharges, GroupMember,
    MobEntry, MonsterGroup, Participant, SpellState, TurnKind, TurnPool,
};
pub use snapshot::{
    Combatant, DamageApplied, MonsterEntry, PlayerEntry, Snapshot, SummonEntry,
};
pub use status::{Absorption, DamageSpan, StatusEffect, StatusEffects, StatusKind};
