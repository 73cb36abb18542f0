//! Turn/phase state machine.
//!
//! `prep → combat → ended`. Inside combat, [`CombatEngine::advance`] walks the
//! actor order by index with wraparound, bumping the round exactly when it
//! wraps. The order is repaired (never rebuilt from scratch) on each wrap and
//! whenever a summon joins mid-round.

use crate::event::{CombatEvent, DamageCause};
use crate::state::{
    Actor, CombatOutcome, CombatPhase, PlayerId, Side, SpellState, TurnKind, TurnPool, UnitRef,
};

use super::{CombatEngine, TurnError, build_actor_order, repair_actor_order};

/// Where the turn loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStep {
    /// `unit` is now active. `ai` is true when the AI controller must play it.
    Started { unit: UnitRef, ai: bool },
    /// Combat finished with this outcome.
    Ended(CombatOutcome),
    /// Nothing to advance: the session is not in combat.
    Idle,
}

impl CombatEngine<'_, '_> {
    /// Living actors with their ordering keys.
    pub fn collect_actors(&mut self) -> Vec<Actor> {
        let snapshot = self.session.snapshot_mut().clone();
        let mut actors = Vec::new();

        for player in snapshot.players().iter().filter(|p| p.hp > 0) {
            if let Some(participant) = self.session.participant(player.player_id)
                && !participant.left
            {
                actors.push(Actor::player(
                    player.player_id,
                    participant.profile.stats.initiative,
                    participant.profile.level,
                ));
            }
        }
        for monster in snapshot.monsters().iter().filter(|m| m.hp > 0) {
            if let Some(mob) = self.session.mob_entry(monster.combat_index) {
                actors.push(Actor::monster(
                    mob.entity_id,
                    mob.combat_index,
                    mob.initiative,
                    mob.level,
                ));
            }
        }
        for summon in snapshot.summons().iter().filter(|s| s.hp > 0) {
            actors.push(Actor::summon(
                summon.summon_id,
                summon.owner_player_id,
                summon.initiative,
                summon.level,
            ));
        }
        actors
    }

    /// Repairs the order and re-points `actor_index` at the current actor.
    pub(crate) fn repair_order_keep_current(&mut self) {
        let current = self.session.current_actor().map(Actor::unit);
        let actors = self.collect_actors();
        self.session.actor_order = repair_actor_order(&self.session.actor_order, &actors);
        if let Some(unit) = current
            && let Some(index) = self
                .session
                .actor_order
                .iter()
                .position(|a| a.unit() == unit)
        {
            self.session.actor_index = index;
        }
    }

    /// Prep → combat: placement, resource pools, initial order, first turn.
    pub(crate) fn begin_combat(&mut self, out: &mut Vec<CombatEvent>) -> TurnStep {
        for participant in self.session.participants.iter_mut() {
            participant.hp_max_at_start = participant.profile.hp_max;
        }
        self.apply_placement(out);

        self.session.phase = CombatPhase::Combat;
        self.session.round = 1;
        self.session.pools.clear();
        self.session.spell_state.clear();

        let actors = self.collect_actors();
        self.session.actor_order = build_actor_order(&actors);
        self.session.actor_index = 0;
        self.session.active = None;

        if self.session.actor_order.is_empty() {
            return self.check_end(out).unwrap_or(TurnStep::Idle);
        }
        self.activate_from(0, out)
    }

    /// Ends the active player's turn.
    pub fn end_turn(
        &mut self,
        player_id: PlayerId,
        out: &mut Vec<CombatEvent>,
    ) -> Result<TurnStep, TurnError> {
        self.require_player_turn(player_id)?;
        Ok(self.advance(out))
    }

    pub(crate) fn require_player_turn(&self, player_id: PlayerId) -> Result<(), TurnError> {
        if self.session.phase != CombatPhase::Combat {
            return Err(TurnError::NotInCombat);
        }
        let unit = UnitRef::Player(player_id);
        if self.session.active != Some(unit) {
            return Err(TurnError::NotYourTurn(unit));
        }
        Ok(())
    }

    /// Marks the start of an AI turn. Fails if one is already running.
    pub fn begin_ai_turn(&mut self) -> Result<UnitRef, TurnError> {
        if self.session.phase != CombatPhase::Combat {
            return Err(TurnError::NotInCombat);
        }
        if self.session.ai_running {
            return Err(TurnError::AiTurnInProgress);
        }
        match self.session.active {
            Some(unit) if !matches!(unit, UnitRef::Player(_)) => {
                self.session.ai_running = true;
                Ok(unit)
            }
            Some(unit) => Err(TurnError::NotYourTurn(unit)),
            None => Err(TurnError::NotInCombat),
        }
    }

    /// Releases the AI lock and moves on to the next actor.
    pub fn finish_ai_turn(&mut self, out: &mut Vec<CombatEvent>) -> Result<TurnStep, TurnError> {
        if !self.session.ai_running {
            return Err(TurnError::NoAiTurn);
        }
        self.session.ai_running = false;
        Ok(self.advance(out))
    }

    /// Moves to the next living actor, ending the combat if a side is wiped out.
    pub fn advance(&mut self, out: &mut Vec<CombatEvent>) -> TurnStep {
        if self.session.phase != CombatPhase::Combat {
            return TurnStep::Idle;
        }
        if let Some(ended) = self.check_end(out) {
            return ended;
        }
        if let Some(unit) = self.session.active.take() {
            out.push(CombatEvent::TurnEnded { unit });
        }

        let next = self.session.actor_index + 1;
        if next < self.session.actor_order.len() {
            self.activate_from(next, out)
        } else {
            self.wrap_round(out)
        }
    }

    fn wrap_round(&mut self, out: &mut Vec<CombatEvent>) -> TurnStep {
        self.session.round += 1;
        let actors = self.collect_actors();
        self.session.actor_order = repair_actor_order(&self.session.actor_order, &actors);
        self.activate_from(0, out)
    }

    /// Starts the first living actor at or after `from`, wrapping at most once more.
    fn activate_from(&mut self, from: usize, out: &mut Vec<CombatEvent>) -> TurnStep {
        let mut index = from;
        let mut wrapped = false;

        loop {
            if let Some(ended) = self.check_end(out) {
                return ended;
            }
            if index >= self.session.actor_order.len() {
                if wrapped || self.session.actor_order.is_empty() {
                    return self.check_end(out).unwrap_or(TurnStep::Idle);
                }
                wrapped = true;
                self.session.round += 1;
                let actors = self.collect_actors();
                self.session.actor_order =
                    repair_actor_order(&self.session.actor_order, &actors);
                index = 0;
                continue;
            }

            let actor = self.session.actor_order[index];
            let unit = actor.unit();
            if self.session.snapshot_mut().is_alive(unit) && self.start_turn_of(index, out) {
                return TurnStep::Started {
                    unit,
                    ai: actor.is_ai_controlled(),
                };
            }
            index += 1;
        }
    }

    /// Resets the actor's resources and ticks its statuses.
    ///
    /// Returns false when the actor died from its own status effects.
    fn start_turn_of(&mut self, index: usize, out: &mut Vec<CombatEvent>) -> bool {
        let actor = self.session.actor_order[index];
        let unit = actor.unit();
        self.session.actor_index = index;
        self.session.active = Some(unit);
        self.session.turn = TurnKind::from(unit);

        self.session
            .spell_state
            .entry(unit)
            .or_insert_with(SpellState::default)
            .start_turn();

        if let UnitRef::Player(player_id) = unit {
            let pool = self
                .session
                .participant(player_id)
                .map(|p| TurnPool {
                    pa: p.profile.pa,
                    pm: p.profile.pm,
                })
                .unwrap_or_default();
            self.session.pools.insert(player_id, pool);
            self.tick_capture(player_id, out);
        }

        self.tick_statuses(unit, out);
        if !self.session.snapshot_mut().is_alive(unit) {
            self.session.active = None;
            return false;
        }

        out.push(CombatEvent::TurnStarted {
            unit,
            round: self.session.round,
        });
        true
    }

    /// Rolls damage-over-time effects, then decrements durations.
    fn tick_statuses(&mut self, unit: UnitRef, out: &mut Vec<CombatEvent>) {
        let due = self
            .session
            .snapshot_mut()
            .statuses(unit)
            .map(|s| s.due_damage())
            .unwrap_or_default();

        for effect in due {
            let Some(span) = effect.damage else { continue };
            if !self.session.snapshot_mut().is_alive(unit) {
                break;
            }
            let (_, seed) = self.roll_seeds(unit);
            let rolled = self.env.rng.range(seed, span.min, span.max);
            let resistances = self.stats_of(unit).resistances;
            let amount = crate::combat::mitigate(rolled, &resistances, effect.element);
            self.commit_damage(None, unit, amount, false, None, DamageCause::Status, out);
        }

        if !self.session.snapshot_mut().is_alive(unit) {
            return;
        }
        let expired = self
            .session
            .snapshot_mut()
            .statuses_mut(unit)
            .map(|s| s.decrement())
            .unwrap_or_default();
        for status_id in expired {
            out.push(CombatEvent::StatusExpired {
                target: unit,
                status_id,
            });
        }
    }

    /// Counts an armed capture down at its owner's turn start; disarms at zero.
    fn tick_capture(&mut self, player_id: PlayerId, out: &mut Vec<CombatEvent>) {
        let Some(capture) = self.session.captures.get_mut(&player_id) else {
            return;
        };
        capture.turns_left = capture.turns_left.saturating_sub(1);
        if capture.turns_left > 0 {
            return;
        }

        let target = UnitRef::Monster(capture.target);
        self.session.captures.remove(&player_id);
        if let Some(statuses) = self.session.snapshot_mut().statuses_mut(target)
            && statuses.remove(crate::spell::CAPTURE_STATUS_ID).is_some()
        {
            out.push(CombatEvent::StatusExpired {
                target,
                status_id: crate::spell::CAPTURE_STATUS_ID.to_owned(),
            });
        }
        out.push(CombatEvent::CaptureExpired { player_id });
    }

    /// Outcome if one side has no living unit left.
    pub fn outcome(&self) -> Option<CombatOutcome> {
        if self.session.phase != CombatPhase::Combat {
            return None;
        }
        if !self.side_alive(Side::Monsters) {
            Some(CombatOutcome::Victory)
        } else if !self.side_alive(Side::Players) {
            Some(CombatOutcome::Defeat)
        } else {
            None
        }
    }

    /// Finishes the combat if a side is wiped out.
    pub fn check_end(&mut self, out: &mut Vec<CombatEvent>) -> Option<TurnStep> {
        let outcome = self.outcome()?;
        Some(self.finish(outcome, out))
    }

    /// Ends the combat with `aborted`. No-op once ended.
    pub fn abort(&mut self, out: &mut Vec<CombatEvent>) -> TurnStep {
        if self.session.phase == CombatPhase::Ended {
            return TurnStep::Idle;
        }
        self.finish(CombatOutcome::Aborted, out)
    }

    /// Terminal transition. Clears derived state so pending continuations become
    /// no-ops, restores participant hp and emits the single ended event.
    pub(crate) fn finish(&mut self, outcome: CombatOutcome, out: &mut Vec<CombatEvent>) -> TurnStep {
        let session = &mut *self.session;
        session.phase = CombatPhase::Ended;
        session.outcome = Some(outcome);
        session.actor_order.clear();
        session.actor_index = 0;
        session.active = None;
        session.spell_state.clear();
        session.pools.clear();
        session.captures.clear();
        session.charges.clear();
        session.ai_running = false;
        session.epoch += 1;
        if session.has_snapshot() {
            session.snapshot_mut().clear_summons();
        }
        for participant in session.participants.iter_mut() {
            participant.profile.hp_max = participant.hp_max_at_start;
            participant.profile.hp = participant.hp_max_at_start;
        }

        out.push(CombatEvent::CombatEnded { outcome });
        TurnStep::Ended(outcome)
    }
}
