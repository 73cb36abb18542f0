//! Inbound command vocabulary.
//!
//! Every command is attributed to the sending player; the runtime never
//! trusts an acting-player id carried inside the payload.

use serde::{Deserialize, Serialize};

use combat_core::{
    CombatId, MapId, MonsterGroup, PlayerId, Snapshot, SpellId, TilePos, UnitRef,
};

/// A command together with the identity of the connection that sent it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub command: ClientCommand,
}

impl ClientMessage {
    pub fn new(player_id: PlayerId, command: ClientCommand) -> Self {
        Self { player_id, command }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Opens a combat against world monster groups. The sender joins first.
    StartCombat {
        map_id: MapId,
        origin: TilePos,
        groups: Vec<MonsterGroup>,
        #[serde(default)]
        seed: Option<u64>,
    },
    JoinCombat {
        combat_id: CombatId,
    },
    Ready {
        combat_id: CombatId,
    },
    EndTurn {
        combat_id: CombatId,
    },
    /// During prep the last tile picks a placement slot; in combat the
    /// path is walked.
    Move {
        combat_id: CombatId,
        path: Vec<TilePos>,
        seq: u64,
    },
    CastSpell {
        combat_id: CombatId,
        spell_id: SpellId,
        target: TilePos,
    },
    ReportDamage {
        combat_id: CombatId,
        source: UnitRef,
        target: UnitRef,
        amount: u32,
        #[serde(default)]
        cast_id: Option<u64>,
    },
    /// First-to-report snapshot bootstrap.
    ReportState {
        combat_id: CombatId,
        snapshot: Snapshot,
    },
    ReportChecksum {
        combat_id: CombatId,
        checksum: u32,
    },
    Leave {
        combat_id: CombatId,
    },
}

impl ClientCommand {
    /// Target combat, absent only for [`ClientCommand::StartCombat`].
    pub fn combat_id(&self) -> Option<CombatId> {
        match self {
            Self::StartCombat { .. } => None,
            Self::JoinCombat { combat_id }
            | Self::Ready { combat_id }
            | Self::EndTurn { combat_id }
            | Self::Move { combat_id, .. }
            | Self::CastSpell { combat_id, .. }
            | Self::ReportDamage { combat_id, .. }
            | Self::ReportState { combat_id, .. }
            | Self::ReportChecksum { combat_id, .. }
            | Self::Leave { combat_id } => Some(*combat_id),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StartCombat { .. } => "start_combat",
            Self::JoinCombat { .. } => "join_combat",
            Self::Ready { .. } => "ready",
            Self::EndTurn { .. } => "end_turn",
            Self::Move { .. } => "move",
            Self::CastSpell { .. } => "cast_spell",
            Self::ReportDamage { .. } => "report_damage",
            Self::ReportState { .. } => "report_state",
            Self::ReportChecksum { .. } => "report_checksum",
            Self::Leave { .. } => "leave",
        }
    }
}

/// Local result of a command. Rejections never reach the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied {
        combat_id: CombatId,
    },
    Rejected {
        code: &'static str,
        reason: String,
    },
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn combat_id(&self) -> Option<CombatId> {
        match self {
            Self::Applied { combat_id } => Some(*combat_id),
            Self::Rejected { .. } => None,
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected { code, .. } => Some(code),
        }
    }
}
