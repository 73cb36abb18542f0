//! Session creation and the prep phase: joining, placement choice, readiness, leaving.

use std::sync::Arc;

use crate::env::{CollisionMap, CombatEnv};
use crate::event::{CombatEvent, ReadyState};
use crate::state::{
    CombatId, CombatIndex, CombatOutcome, CombatPhase, CombatSession, MapId, MobEntry,
    MonsterGroup, Participant, PlayerEntry, PlayerId, PlayerProfile, StatusEffects, TilePos,
    UnitRef,
};

use super::{CombatEngine, SessionError, TurnStep};

/// Everything needed to open a combat.
#[derive(Clone, Debug)]
pub struct CombatStart {
    pub id: CombatId,
    pub map_id: MapId,
    pub origin: TilePos,
    pub seed: u64,
    pub collision: Option<Arc<CollisionMap>>,
    pub initiator: PlayerProfile,
    pub groups: Vec<MonsterGroup>,
}

/// Expands world groups into monster instances with sequential combat indices.
///
/// Provisional tiles follow the monster placement pattern; final tiles are
/// assigned when combat starts.
pub fn expand_groups(
    groups: &[MonsterGroup],
    origin: TilePos,
    env: &CombatEnv<'_>,
) -> Result<Vec<MobEntry>, SessionError> {
    let placement = &env.config.placement;
    let mut entries = Vec::new();

    for group in groups {
        for (slot, member) in group.members.iter().enumerate() {
            let def = env
                .monster(&member.monster_id)
                .ok_or_else(|| SessionError::UnknownMonster(member.monster_id.clone()))?;
            let index = entries.len();
            let pm = if def.pm > 0 {
                def.pm
            } else {
                env.config.default_monster_pm
            };
            entries.push(MobEntry {
                combat_index: CombatIndex(index as u32),
                entity_id: group.entity_id,
                group_slot: slot as u32,
                monster_id: member.monster_id.clone(),
                level: member.level.max(1),
                hp_max: def.hp_at(member.level.max(1)),
                initiative: def.initiative,
                pm,
                tile: placement.monster_slot(origin, index).unwrap_or(origin),
            });
        }
    }

    if entries.is_empty() {
        return Err(SessionError::NoMonsters);
    }
    Ok(entries)
}

/// Opens a session in prep with the initiator as first participant.
///
/// The initiator's client becomes the trusted reporter of monster damage.
pub fn create_session(
    start: CombatStart,
    env: &CombatEnv<'_>,
    out: &mut Vec<CombatEvent>,
) -> Result<CombatSession, SessionError> {
    let mobs = expand_groups(&start.groups, start.origin, env)?;
    let initiator_id = start.initiator.player_id;
    let tile = env
        .config
        .placement
        .player_slot(start.origin, 0)
        .unwrap_or(start.origin);

    let mut session = CombatSession::new(start.id, start.map_id, start.origin, start.seed)
        .with_collision(start.collision);
    session.mob_entries = mobs;
    session.ai_driver = Some(initiator_id);
    session
        .participants
        .push(Participant::new(start.initiator, tile));

    out.push(CombatEvent::CombatCreated {
        combat_id: session.id,
        map_id: session.map_id.clone(),
        origin: session.origin,
        participants: session.participant_ids(),
    });
    out.push(CombatEvent::JoinReady {
        mobs: session.mob_entries.clone(),
    });
    Ok(session)
}

impl CombatEngine<'_, '_> {
    fn require_phase(&self, expected: CombatPhase) -> Result<(), SessionError> {
        if self.session.phase != expected {
            return Err(SessionError::WrongPhase {
                expected,
                actual: self.session.phase,
            });
        }
        Ok(())
    }

    fn ready_event(&self) -> CombatEvent {
        CombatEvent::CombatUpdated {
            participants: self
                .session
                .participants
                .iter()
                .filter(|p| !p.left)
                .map(|p| ReadyState {
                    player_id: p.player_id(),
                    ready: p.ready,
                })
                .collect(),
        }
    }

    fn all_ready(&self) -> bool {
        let mut active = self
            .session
            .participants
            .iter()
            .filter(|p| !p.left)
            .peekable();
        active.peek().is_some() && active.all(|p| p.ready)
    }

    /// Adds a player during prep.
    pub fn join(
        &mut self,
        profile: PlayerProfile,
        out: &mut Vec<CombatEvent>,
    ) -> Result<(), SessionError> {
        self.require_phase(CombatPhase::Prep)?;
        let player_id = profile.player_id;
        if self.session.participant(player_id).is_some() {
            return Err(SessionError::AlreadyJoined(player_id));
        }

        let slot = self.session.participants.len();
        let tile = self
            .env
            .config
            .placement
            .player_slot(self.session.origin, slot)
            .unwrap_or(self.session.origin);
        let participant = Participant::new(profile, tile);
        if self.session.has_snapshot() {
            self.session.snapshot_mut().upsert_player(PlayerEntry {
                player_id,
                tile,
                hp: participant.profile.hp,
                hp_max: participant.profile.hp_max,
                status_effects: StatusEffects::new(),
            });
        }
        self.session.participants.push(participant);

        out.push(CombatEvent::JoinReady {
            mobs: self.session.mob_entries.clone(),
        });
        out.push(self.ready_event());
        Ok(())
    }

    /// Picks a placement tile among the player slots during prep.
    pub fn choose_placement(
        &mut self,
        player_id: PlayerId,
        tile: TilePos,
        out: &mut Vec<CombatEvent>,
    ) -> Result<(), SessionError> {
        self.require_phase(CombatPhase::Prep)?;
        if !self.session.is_participant(player_id) {
            return Err(SessionError::NotParticipant(player_id));
        }
        let taken_by_other = self
            .session
            .participants
            .iter()
            .any(|p| p.player_id() != player_id && (p.chosen_tile == Some(tile) || p.tile == tile));
        let legal = self
            .env
            .config
            .placement
            .is_player_slot(self.session.origin, tile)
            && self.is_placeable(tile);
        if taken_by_other || !legal {
            return Err(SessionError::IllegalPlacement(tile));
        }

        if let Some(participant) = self.session.participant_mut(player_id) {
            participant.chosen_tile = Some(tile);
        }
        self.place_unit(UnitRef::Player(player_id), tile);
        out.push(CombatEvent::PlacementChosen { player_id, tile });
        Ok(())
    }

    /// Marks a participant ready. Starts combat once every participant is ready.
    pub fn set_ready(
        &mut self,
        player_id: PlayerId,
        out: &mut Vec<CombatEvent>,
    ) -> Result<Option<TurnStep>, SessionError> {
        self.require_phase(CombatPhase::Prep)?;
        let Some(participant) = self
            .session
            .participant_mut(player_id)
            .filter(|p| !p.left)
        else {
            return Err(SessionError::NotParticipant(player_id));
        };
        participant.ready = true;
        out.push(self.ready_event());

        if self.all_ready() {
            return Ok(Some(self.begin_combat(out)));
        }
        Ok(None)
    }

    /// Removes a player in prep; soft-kills it in combat.
    pub fn leave(
        &mut self,
        player_id: PlayerId,
        out: &mut Vec<CombatEvent>,
    ) -> Result<Option<TurnStep>, SessionError> {
        if !self.session.is_participant(player_id) {
            return Err(SessionError::NotParticipant(player_id));
        }

        match self.session.phase {
            CombatPhase::Prep => {
                self.session
                    .participants
                    .retain(|p| p.player_id() != player_id);
                if self.session.has_snapshot() {
                    self.session.snapshot_mut().remove_player(player_id);
                }
                if self.session.ai_driver == Some(player_id) {
                    self.session.ai_driver = self.session.participants.first().map(|p| p.player_id());
                }
                out.push(CombatEvent::PlayerLeft { player_id });
                out.push(self.ready_event());

                if self.session.participants.is_empty() {
                    return Ok(Some(self.finish(CombatOutcome::Aborted, out)));
                }
                if self.all_ready() {
                    return Ok(Some(self.begin_combat(out)));
                }
                Ok(None)
            }
            CombatPhase::Combat => {
                let unit = UnitRef::Player(player_id);
                if let Some(participant) = self.session.participant_mut(player_id) {
                    participant.left = true;
                }
                if self.session.ai_driver == Some(player_id) {
                    self.session.ai_driver = self
                        .session
                        .participants
                        .iter()
                        .find(|p| !p.left)
                        .map(|p| p.player_id());
                }
                let was_alive = self.session.snapshot_mut().is_alive(unit);
                self.session.snapshot_mut().set_hp(unit, 0);
                out.push(CombatEvent::PlayerLeft { player_id });
                if was_alive {
                    out.push(CombatEvent::UnitDied { unit });
                }

                if self.session.active == Some(unit) {
                    return Ok(Some(self.advance(out)));
                }
                Ok(self.check_end(out))
            }
            CombatPhase::Ended => Err(SessionError::WrongPhase {
                expected: CombatPhase::Combat,
                actual: CombatPhase::Ended,
            }),
        }
    }
}
