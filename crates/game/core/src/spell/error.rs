//! Cast rejections.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{SpellId, TilePos, UnitRef};

/// Why a cast was refused. A refused cast leaves the session untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CastError {
    #[error("combat is not running")]
    NotInCombat,

    #[error("it is not {0}'s turn")]
    NotYourTurn(UnitRef),

    #[error("caster {0} is missing or dead")]
    CasterUnavailable(UnitRef),

    #[error("unknown spell `{0}`")]
    UnknownSpell(SpellId),

    #[error("{caster} does not know `{spell}`")]
    SpellNotKnown { caster: UnitRef, spell: SpellId },

    #[error("map collision data is unavailable")]
    MapUnavailable,

    #[error("target {0} is outside the map")]
    OutOfBounds(TilePos),

    #[error("`{spell}` is on cooldown for {turns} more turn(s)")]
    OnCooldown { spell: SpellId, turns: u32 },

    #[error("`{spell}` already cast {max} time(s) this turn")]
    TurnCapReached { spell: SpellId, max: u32 },

    #[error("`{spell}` already cast {max} time(s) on {target} this turn")]
    TargetCapReached {
        spell: SpellId,
        target: UnitRef,
        max: u32,
    },

    #[error("needs {required} PA, {available} left")]
    InsufficientPa { required: u32, available: u32 },

    #[error("target at distance {distance}, range is {min}..={max}")]
    OutOfRange { distance: u32, min: u32, max: u32 },

    #[error("target {0} is not in line with the caster")]
    NotAligned(TilePos),

    #[error("no line of sight to {0}")]
    NoLineOfSight(TilePos),

    #[error("{0} is not a valid target tile")]
    InvalidTarget(TilePos),
}

impl CombatError for CastError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotInCombat | Self::NotYourTurn(_) => ErrorSeverity::Recoverable,
            Self::CasterUnavailable(_) | Self::UnknownSpell(_) | Self::SpellNotKnown { .. } => {
                ErrorSeverity::Validation
            }
            Self::MapUnavailable => ErrorSeverity::Fatal,
            Self::OnCooldown { .. }
            | Self::TurnCapReached { .. }
            | Self::TargetCapReached { .. }
            | Self::InsufficientPa { .. } => ErrorSeverity::Recoverable,
            Self::OutOfBounds(_)
            | Self::OutOfRange { .. }
            | Self::NotAligned(_)
            | Self::NoLineOfSight(_)
            | Self::InvalidTarget(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInCombat => "CAST_NOT_IN_COMBAT",
            Self::NotYourTurn(_) => "CAST_NOT_YOUR_TURN",
            Self::CasterUnavailable(_) => "CAST_CASTER_UNAVAILABLE",
            Self::UnknownSpell(_) => "CAST_UNKNOWN_SPELL",
            Self::SpellNotKnown { .. } => "CAST_SPELL_NOT_KNOWN",
            Self::MapUnavailable => "CAST_MAP_UNAVAILABLE",
            Self::OutOfBounds(_) => "CAST_OUT_OF_BOUNDS",
            Self::OnCooldown { .. } => "CAST_ON_COOLDOWN",
            Self::TurnCapReached { .. } => "CAST_TURN_CAP_REACHED",
            Self::TargetCapReached { .. } => "CAST_TARGET_CAP_REACHED",
            Self::InsufficientPa { .. } => "CAST_INSUFFICIENT_PA",
            Self::OutOfRange { .. } => "CAST_OUT_OF_RANGE",
            Self::NotAligned(_) => "CAST_NOT_ALIGNED",
            Self::NoLineOfSight(_) => "CAST_NO_LINE_OF_SIGHT",
            Self::InvalidTarget(_) => "CAST_INVALID_TARGET",
        }
    }
}
