//! Client command handlers.
//!
//! Each handler loads a copy of the session, runs the engine against it and
//! commits only if the engine accepted the command, so a rejection leaves the
//! stored session as it was.

use tracing::{info, warn};

use combat_core::{
    CombatEngine, CombatEvent, CombatId, CombatPhase, CombatStart, MoveError, PlayerId, TurnStep,
    UnitRef, create_session,
};

use crate::api::{ClientCommand, ClientMessage, CommandError};

use super::CombatWorker;

impl CombatWorker {
    pub(super) fn apply_client(&mut self, message: ClientMessage) -> Result<CombatId, CommandError> {
        let ClientMessage { player_id, command } = message;
        match command {
            ClientCommand::StartCombat {
                map_id,
                origin,
                groups,
                seed,
            } => {
                let profile = self
                    .profiles
                    .get(player_id)?
                    .ok_or(CommandError::UnknownProfile(player_id))?;
                if self.sessions.combat_of(player_id)?.is_some() {
                    return Err(CommandError::AlreadyInCombat(player_id));
                }

                let collision = self.oracles.collision(&map_id);
                if collision.is_none() {
                    warn!(target: "runtime::combat", %map_id, "no collision data for map");
                }
                let combat_id = CombatId(self.next_combat_id);
                let seed = seed
                    .or(self.settings.rng_seed)
                    .unwrap_or_else(rand::random);
                let start = CombatStart {
                    id: combat_id,
                    map_id,
                    origin,
                    seed,
                    collision,
                    initiator: profile,
                    groups,
                };

                let mut out = Vec::new();
                let session = create_session(start, &self.oracles.as_env(), &mut out)?;
                self.sessions.create(session)?;
                self.next_combat_id += 1;
                info!(target: "runtime::combat", %combat_id, player = %player_id, seed, "combat created");
                self.publish(combat_id, Some(player_id), out);
                Ok(combat_id)
            }
            ClientCommand::JoinCombat { combat_id } => {
                let profile = self
                    .profiles
                    .get(player_id)?
                    .ok_or(CommandError::UnknownProfile(player_id))?;
                if self.sessions.combat_of(player_id)?.is_some() {
                    return Err(CommandError::AlreadyInCombat(player_id));
                }
                self.with_session(combat_id, player_id, |engine, out| {
                    engine.join(profile, out)?;
                    Ok(None)
                })
            }
            ClientCommand::Ready { combat_id } => {
                self.with_session(combat_id, player_id, |engine, out| {
                    Ok(engine.set_ready(player_id, out)?)
                })
            }
            ClientCommand::EndTurn { combat_id } => {
                self.with_session(combat_id, player_id, |engine, out| {
                    Ok(Some(engine.end_turn(player_id, out)?))
                })
            }
            ClientCommand::Move {
                combat_id,
                path,
                seq,
            } => self.with_session(combat_id, player_id, |engine, out| {
                if engine.session().phase == CombatPhase::Prep {
                    let tile = path.last().copied().ok_or(MoveError::EmptyPath)?;
                    engine.choose_placement(player_id, tile, out)?;
                } else {
                    engine.move_player(player_id, &path, seq, out)?;
                }
                Ok(None)
            }),
            ClientCommand::CastSpell {
                combat_id,
                spell_id,
                target,
            } => self.with_session(combat_id, player_id, |engine, out| {
                let outcome = engine.cast(UnitRef::Player(player_id), &spell_id, target, out)?;
                Ok(outcome.ended)
            }),
            ClientCommand::ReportDamage {
                combat_id,
                source,
                target,
                amount,
                cast_id,
            } => self.with_session(combat_id, player_id, |engine, out| {
                Ok(engine.apply_reported_damage(player_id, source, target, amount, cast_id, out)?)
            }),
            ClientCommand::ReportState {
                combat_id,
                snapshot,
            } => self.with_session(combat_id, player_id, |engine, out| {
                engine.accept_bootstrap(player_id, &snapshot, out)?;
                Ok(None)
            }),
            ClientCommand::ReportChecksum {
                combat_id,
                checksum,
            } => self.with_session(combat_id, player_id, |engine, out| {
                if !engine.verify_checksum(checksum, out) {
                    info!(target: "runtime::combat", %combat_id, player = %player_id, "checksum mismatch, resyncing");
                }
                Ok(None)
            }),
            ClientCommand::Leave { combat_id } => {
                self.with_session(combat_id, player_id, |engine, out| {
                    Ok(engine.leave(player_id, out)?)
                })
            }
        }
    }

    /// Loads a session, applies `apply` and commits the result.
    ///
    /// A returned step continues the turn loop (AI turns, timeouts, teardown).
    fn with_session<F>(
        &mut self,
        combat_id: CombatId,
        sender: PlayerId,
        apply: F,
    ) -> Result<CombatId, CommandError>
    where
        F: FnOnce(
            &mut CombatEngine<'_, '_>,
            &mut Vec<CombatEvent>,
        ) -> Result<Option<TurnStep>, CommandError>,
    {
        let mut session = self
            .sessions
            .get(combat_id)?
            .ok_or(CommandError::UnknownCombat(combat_id))?;
        let oracles = self.oracles.clone();
        let mut out = Vec::new();
        let step = {
            let mut engine = CombatEngine::new(&mut session, oracles.as_env());
            apply(&mut engine, &mut out)?
        };

        if let Some(step) = step {
            self.drive(&mut session, step, &mut out);
        }
        self.commit(session, Some(sender), out)?;
        Ok(combat_id)
    }
}
