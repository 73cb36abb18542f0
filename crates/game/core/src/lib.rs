//! Deterministic combat rules shared by the server runtime and its tools.
//!
//! `combat-core` defines the combat session aggregate, the authoritative
//! snapshot and every rule that mutates them: actor ordering, the turn/phase
//! machine, movement with the engagement malus, spell resolution and the
//! checksum used to audit client state. All mutation flows through
//! [`engine::CombatEngine`]; nothing in this crate performs I/O or reads a clock.
pub mod checksum;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod spell;
pub mod state;

#[cfg(test)]
pub(crate) mod testkit;

pub use checksum::{TurnMarker, checksum, session_checksum};
pub use config::{CombatConfig, LifeStealBasis, PlacementConfig};
pub use engine::{
    CombatEngine, CombatStart, MoveError, MoveOutcome, SessionError, TurnError, TurnStep,
    build_actor_order, create_session, expand_groups, repair_actor_order,
};
pub use env::{
    AreaPattern, BuffSide, CastPattern, ClassCatalog, ClassDef, CollisionMap, CombatEnv,
    EmptyCatalog, FixedRng, MapOracle, MonsterCatalog, MonsterDef, PcgRng, RngOracle,
    SpellCatalog, SpellDamage, SpellDef, SpellEffect, SpellRule, StatusTemplate, compute_seed,
};
pub use error::{CombatError, ErrorSeverity};
pub use event::{CombatEvent, DamageCause, ReadyState};
pub use spell::{CAPTURE_STATUS_ID, CastError, CastOutcome};
pub use state::{
    Actor, ActorKind, CapturedMonster, ClassId, CombatId, CombatIndex, CombatOutcome, CombatPhase,
    CombatSession, CombatStats, Combatant, DamageSpan, Element, ElementValues, EntityId,
    GroupMember, MapId, MobEntry, MonsterEntry, MonsterGroup, MonsterId, PlayerEntry, PlayerId,
    PlayerProfile, Side, Snapshot, SpellId, StatusEffect, StatusEffects, StatusKind, SummonEntry,
    SummonId, TilePos, TurnKind, UnitRef,
};
