//! Error types raised by repository implementations.

use thiserror::Error;

use combat_core::CombatId;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("{0} already exists")]
    DuplicateSession(CombatId),

    #[error("{0} does not exist")]
    MissingSession(CombatId),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
