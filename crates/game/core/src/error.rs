//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (`CastError`, `MoveError`, `SessionError`,
//! `TurnError`) live next to the operations they validate. All of them
//! implement [`CombatError`] so the runtime can log rejections uniformly.

/// Severity level of an error, used for categorization and logging.
///
/// - **Recoverable**: the same command may succeed later (target out of range, tile occupied)
/// - **Validation**: malformed or unauthorized input (not your turn, unknown spell)
/// - **Internal**: engine state inconsistency that should be investigated
/// - **Fatal**: the session cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an engine bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity by recoverability, not impact
/// - Keep `error_code` stable: it is what logs and tests match on
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
