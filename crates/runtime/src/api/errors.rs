//! Unified error types surfaced by the runtime API.
//!
//! [`RuntimeError`] covers worker coordination and infrastructure failures.
//! [`CommandError`] is a rejected client command: it is logged and reported
//! to the local caller, never broadcast.

use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{
    CastError, CombatError, CombatId, ErrorSeverity, MoveError, PlayerId, SessionError, TurnError,
};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("combat worker command channel closed")]
    CommandChannelClosed,

    #[error("combat worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("combat worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,
}

/// Why a client command was dropped.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0} does not exist")]
    UnknownCombat(CombatId),

    #[error("no profile for {0}")]
    UnknownProfile(PlayerId),

    #[error("{0} is already in a combat")]
    AlreadyInCombat(PlayerId),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CombatError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCombat(_) | Self::AlreadyInCombat(_) => ErrorSeverity::Recoverable,
            Self::UnknownProfile(_) => ErrorSeverity::Validation,
            Self::Session(e) => e.severity(),
            Self::Turn(e) => e.severity(),
            Self::Move(e) => e.severity(),
            Self::Cast(e) => e.severity(),
            Self::Repository(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCombat(_) => "RUNTIME_UNKNOWN_COMBAT",
            Self::UnknownProfile(_) => "RUNTIME_UNKNOWN_PROFILE",
            Self::AlreadyInCombat(_) => "RUNTIME_ALREADY_IN_COMBAT",
            Self::Session(e) => e.error_code(),
            Self::Turn(e) => e.error_code(),
            Self::Move(e) => e.error_code(),
            Self::Cast(e) => e.error_code(),
            Self::Repository(_) => "RUNTIME_REPOSITORY",
        }
    }
}
