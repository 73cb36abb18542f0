//! In-memory repository implementations for tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use combat_core::{CombatId, CombatSession, PlayerId, PlayerProfile};

use super::{ProfileStore, RepositoryError, Result, SessionStore};

/// In-memory implementation of [`SessionStore`].
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<BTreeMap<CombatId, CombatSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, session: CombatSession) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if sessions.contains_key(&session.id) {
            return Err(RepositoryError::DuplicateSession(session.id));
        }
        sessions.insert(session.id, session);
        Ok(())
    }

    fn get(&self, id: CombatId) -> Result<Option<CombatSession>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.get(&id).cloned())
    }

    fn save(&self, session: &CombatSession) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        match sessions.get_mut(&session.id) {
            Some(slot) => {
                *slot = session.clone();
                Ok(())
            }
            None => Err(RepositoryError::MissingSession(session.id)),
        }
    }

    fn delete(&self, id: CombatId) -> Result<Option<CombatSession>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.remove(&id))
    }

    fn ids(&self) -> Result<Vec<CombatId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.keys().copied().collect())
    }

    fn combat_of(&self, player: PlayerId) -> Result<Option<CombatId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions
            .values()
            .find(|s| s.participant(player).is_some_and(|p| !p.left))
            .map(|s| s.id))
    }
}

/// In-memory implementation of [`ProfileStore`].
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<PlayerId, PlayerProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = PlayerProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles.into_iter().map(|p| (p.player_id, p)).collect()),
        }
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, player: PlayerId) -> Result<Option<PlayerProfile>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(profiles.get(&player).cloned())
    }

    fn put(&self, profile: PlayerProfile) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        profiles.insert(profile.player_id, profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{MapId, TilePos};

    fn session(id: u64) -> CombatSession {
        CombatSession::new(CombatId(id), MapId::from("arena"), TilePos::ORIGIN, 1)
    }

    #[test]
    fn session_lifecycle() {
        let store = InMemorySessionStore::new();
        store.create(session(1)).unwrap();
        assert!(matches!(
            store.create(session(1)),
            Err(RepositoryError::DuplicateSession(CombatId(1)))
        ));

        let mut loaded = store.get(CombatId(1)).unwrap().unwrap();
        loaded.round = 4;
        store.save(&loaded).unwrap();
        assert_eq!(store.get(CombatId(1)).unwrap().unwrap().round, 4);

        assert!(store.delete(CombatId(1)).unwrap().is_some());
        assert!(store.get(CombatId(1)).unwrap().is_none());
        assert!(matches!(
            store.save(&loaded),
            Err(RepositoryError::MissingSession(_))
        ));
    }
}
