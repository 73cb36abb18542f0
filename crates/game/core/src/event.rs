//! Outbound combat events.
//!
//! The engine appends events to a caller-provided buffer as it mutates a
//! session. The runtime wraps them into sequenced envelopes and broadcasts
//! them; nothing here knows about transport or audiences.

use crate::state::{
    CombatId, CombatOutcome, ElementalCharges, MapId, MobEntry, MonsterId, PlayerId, Snapshot,
    SpellId, StatusEffect, SummonEntry, TilePos, UnitRef,
};

/// What caused a damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DamageCause {
    Spell,
    /// Push that ended against an obstacle.
    Wall,
    /// Damage-over-time status ticking at turn start.
    Status,
    /// Legacy flat roll for monsters without a resolvable spell.
    Fallback,
    /// Client-reported damage accepted from a trusted reporter.
    Reported,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadyState {
    pub player_id: PlayerId,
    pub ready: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum CombatEvent {
    CombatCreated {
        combat_id: CombatId,
        map_id: MapId,
        origin: TilePos,
        participants: Vec<PlayerId>,
    },
    /// Initial mob roster, sent to joining players.
    JoinReady {
        mobs: Vec<MobEntry>,
    },
    CombatUpdated {
        participants: Vec<ReadyState>,
    },
    PlacementChosen {
        player_id: PlayerId,
        tile: TilePos,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    TurnStarted {
        unit: UnitRef,
        round: u32,
    },
    TurnEnded {
        unit: UnitRef,
    },
    UnitMoved {
        unit: UnitRef,
        path: Vec<TilePos>,
        seq: u64,
    },
    SpellCast {
        cast_id: u64,
        caster: UnitRef,
        spell_id: SpellId,
        target: TilePos,
        /// False for client-predicted casts relayed without resolution.
        authoritative: bool,
    },
    DamageApplied {
        source: Option<UnitRef>,
        target: UnitRef,
        /// Hit points removed.
        amount: u32,
        absorbed: u32,
        hp: u32,
        critical: bool,
        cast_id: Option<u64>,
        cause: DamageCause,
    },
    Healed {
        target: UnitRef,
        amount: u32,
        hp: u32,
    },
    UnitDisplaced {
        unit: UnitRef,
        from: TilePos,
        to: TilePos,
    },
    StatusApplied {
        target: UnitRef,
        status: StatusEffect,
    },
    StatusExpired {
        target: UnitRef,
        status_id: String,
    },
    CaptureArmed {
        player_id: PlayerId,
        target: UnitRef,
        turns: u32,
    },
    CaptureExpired {
        player_id: PlayerId,
    },
    MonsterCaptured {
        player_id: PlayerId,
        monster_id: MonsterId,
    },
    SummonSpawned {
        summon: SummonEntry,
    },
    ChargesChanged {
        player_id: PlayerId,
        charges: ElementalCharges,
    },
    UnitDied {
        unit: UnitRef,
    },
    /// Full snapshot broadcast. `resync` marks a correction after a checksum mismatch.
    CombatState {
        snapshot: Snapshot,
        checksum: u32,
        resync: bool,
    },
    CombatEnded {
        outcome: CombatOutcome,
    },
}

impl CombatEvent {
    /// Stable snake_case name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CombatCreated { .. } => "combat_created",
            Self::JoinReady { .. } => "join_ready",
            Self::CombatUpdated { .. } => "combat_updated",
            Self::PlacementChosen { .. } => "placement_chosen",
            Self::PlayerLeft { .. } => "player_left",
            Self::TurnStarted { .. } => "turn_started",
            Self::TurnEnded { .. } => "turn_ended",
            Self::UnitMoved { .. } => "unit_moved",
            Self::SpellCast { .. } => "spell_cast",
            Self::DamageApplied { .. } => "damage_applied",
            Self::Healed { .. } => "healed",
            Self::UnitDisplaced { .. } => "unit_displaced",
            Self::StatusApplied { .. } => "status_applied",
            Self::StatusExpired { .. } => "status_expired",
            Self::CaptureArmed { .. } => "capture_armed",
            Self::CaptureExpired { .. } => "capture_expired",
            Self::MonsterCaptured { .. } => "monster_captured",
            Self::SummonSpawned { .. } => "summon_spawned",
            Self::ChargesChanged { .. } => "charges_changed",
            Self::UnitDied { .. } => "unit_died",
            Self::CombatState { .. } => "combat_state",
            Self::CombatEnded { .. } => "combat_ended",
        }
    }
}
