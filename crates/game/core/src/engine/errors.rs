//! Rejections produced by session, turn and movement handlers.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{CombatPhase, MonsterId, PlayerId, TilePos, UnitRef};

/// Errors raised while creating, joining or synchronizing a session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown monster `{0}`")]
    UnknownMonster(MonsterId),

    #[error("combat needs at least one monster")]
    NoMonsters,

    #[error("combat is in phase {actual}, expected {expected}")]
    WrongPhase {
        expected: CombatPhase,
        actual: CombatPhase,
    },

    #[error("{0} is not a participant")]
    NotParticipant(PlayerId),

    #[error("{0} already joined")]
    AlreadyJoined(PlayerId),

    #[error("placement tile {0} is not available")]
    IllegalPlacement(TilePos),

    #[error("snapshot bootstrap already accepted")]
    SnapshotLocked,

    #[error("{reporter} is not trusted to report damage from {source_unit}")]
    UntrustedReport {
        reporter: PlayerId,
        source_unit: UnitRef,
    },

    #[error("damage of cast {0} was already resolved by the server")]
    DuplicateReport(u64),

    #[error("unit {0} is not alive")]
    UnitNotAlive(UnitRef),
}

impl CombatError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownMonster(_) | Self::NoMonsters => ErrorSeverity::Validation,
            Self::WrongPhase { .. } | Self::SnapshotLocked => ErrorSeverity::Recoverable,
            Self::NotParticipant(_) | Self::AlreadyJoined(_) => ErrorSeverity::Validation,
            Self::IllegalPlacement(_) => ErrorSeverity::Recoverable,
            Self::UntrustedReport { .. } => ErrorSeverity::Validation,
            Self::DuplicateReport(_) | Self::UnitNotAlive(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMonster(_) => "SESSION_UNKNOWN_MONSTER",
            Self::NoMonsters => "SESSION_NO_MONSTERS",
            Self::WrongPhase { .. } => "SESSION_WRONG_PHASE",
            Self::NotParticipant(_) => "SESSION_NOT_PARTICIPANT",
            Self::AlreadyJoined(_) => "SESSION_ALREADY_JOINED",
            Self::IllegalPlacement(_) => "SESSION_ILLEGAL_PLACEMENT",
            Self::SnapshotLocked => "SESSION_SNAPSHOT_LOCKED",
            Self::UntrustedReport { .. } => "SESSION_UNTRUSTED_REPORT",
            Self::DuplicateReport(_) => "SESSION_DUPLICATE_REPORT",
            Self::UnitNotAlive(_) => "SESSION_UNIT_NOT_ALIVE",
        }
    }
}

/// Errors raised by turn transitions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("combat is not running")]
    NotInCombat,

    #[error("it is not {0}'s turn")]
    NotYourTurn(UnitRef),

    #[error("an AI turn is already running")]
    AiTurnInProgress,

    #[error("no AI turn is running")]
    NoAiTurn,
}

impl CombatError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotInCombat | Self::NotYourTurn(_) => ErrorSeverity::Recoverable,
            Self::AiTurnInProgress | Self::NoAiTurn => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInCombat => "TURN_NOT_IN_COMBAT",
            Self::NotYourTurn(_) => "TURN_NOT_YOUR_TURN",
            Self::AiTurnInProgress => "TURN_AI_IN_PROGRESS",
            Self::NoAiTurn => "TURN_NO_AI_TURN",
        }
    }
}

/// Errors raised while validating a movement path.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("combat is not running")]
    NotInCombat,

    #[error("it is not {0}'s turn")]
    NotYourTurn(UnitRef),

    #[error("unit {0} is missing or dead")]
    UnitUnavailable(UnitRef),

    #[error("map collision data is unavailable")]
    MapUnavailable,

    #[error("sequence {seq} is not newer than {last}")]
    StaleSequence { seq: u64, last: u64 },

    #[error("path is empty")]
    EmptyPath,

    #[error("step {index} to {tile} is not adjacent to the previous tile")]
    NotContiguous { index: usize, tile: TilePos },

    #[error("tile {0} is outside the map")]
    OutOfBounds(TilePos),

    #[error("tile {0} is blocked")]
    Blocked(TilePos),

    #[error("tile {0} is occupied")]
    Occupied(TilePos),

    #[error("no movement points left")]
    NoMovementPoints,
}

impl CombatError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotInCombat | Self::NotYourTurn(_) => ErrorSeverity::Recoverable,
            Self::UnitUnavailable(_) => ErrorSeverity::Validation,
            Self::MapUnavailable => ErrorSeverity::Fatal,
            Self::StaleSequence { .. } | Self::EmptyPath => ErrorSeverity::Validation,
            Self::NotContiguous { .. } | Self::OutOfBounds(_) => ErrorSeverity::Validation,
            Self::Blocked(_) | Self::Occupied(_) | Self::NoMovementPoints => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInCombat => "MOVE_NOT_IN_COMBAT",
            Self::NotYourTurn(_) => "MOVE_NOT_YOUR_TURN",
            Self::UnitUnavailable(_) => "MOVE_UNIT_UNAVAILABLE",
            Self::MapUnavailable => "MOVE_MAP_UNAVAILABLE",
            Self::StaleSequence { .. } => "MOVE_STALE_SEQUENCE",
            Self::EmptyPath => "MOVE_EMPTY_PATH",
            Self::NotContiguous { .. } => "MOVE_NOT_CONTIGUOUS",
            Self::OutOfBounds(_) => "MOVE_OUT_OF_BOUNDS",
            Self::Blocked(_) => "MOVE_BLOCKED",
            Self::Occupied(_) => "MOVE_OCCUPIED",
            Self::NoMovementPoints => "MOVE_NO_MOVEMENT_POINTS",
        }
    }
}
