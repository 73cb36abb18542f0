//! Repository contracts for mutable runtime data.

use combat_core::{CombatId, CombatSession, PlayerId, PlayerProfile};

use super::Result;

/// Registry of live combat sessions.
///
/// Only the combat worker writes; readers get clones.
pub trait SessionStore: Send + Sync {
    /// Registers a new session. Fails if the id is taken.
    fn create(&self, session: CombatSession) -> Result<()>;

    fn get(&self, id: CombatId) -> Result<Option<CombatSession>>;

    /// Replaces an existing session.
    fn save(&self, session: &CombatSession) -> Result<()>;

    fn delete(&self, id: CombatId) -> Result<Option<CombatSession>>;

    fn ids(&self) -> Result<Vec<CombatId>>;

    /// Combat the player currently takes part in, if any.
    fn combat_of(&self, player: PlayerId) -> Result<Option<CombatId>>;
}

/// Out-of-combat player data.
pub trait ProfileStore: Send + Sync {
    fn get(&self, player: PlayerId) -> Result<Option<PlayerProfile>>;

    fn put(&self, profile: PlayerProfile) -> Result<()>;
}
