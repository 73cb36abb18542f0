//! AI turn controller.
//!
//! A monster or summon turn runs in two halves: [`start_turn`] plans and
//! commits the walk, then [`finish_turn`] attacks and hands the turn on. The
//! worker schedules the second half after the walk's duration, or runs it
//! straight away when the unit did not move. Missing data never stalls the
//! loop: the turn simply ends.

use tracing::{debug, warn};

use combat_core::{CombatEngine, CombatEvent, SpellId, TurnStep, UnitRef};

use crate::providers::ai::{AiContext, plan_turn};

/// How far [`start_turn`] got.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum AiProgress {
    /// The turn is over; continue the loop from here.
    Done(TurnStep),
    /// The unit is walking `steps` tiles; attack `target` once it arrives.
    Walking { target: UnitRef, steps: usize },
    /// Another AI turn holds the lock. Nothing was changed.
    Stalled,
}

pub(super) fn start_turn(
    engine: &mut CombatEngine<'_, '_>,
    unit: UnitRef,
    out: &mut Vec<CombatEvent>,
) -> AiProgress {
    if let Err(error) = engine.begin_ai_turn() {
        warn!(target: "runtime::ai", %unit, %error, "cannot start AI turn");
        return AiProgress::Stalled;
    }

    let Some(map) = engine.session().collision.clone() else {
        debug!(target: "runtime::ai", %unit, "no collision map, skipping turn");
        return AiProgress::Done(end_turn(engine, out));
    };
    let movement_points = engine.movement_points(unit);
    let plan = engine.session().snapshot().and_then(|snapshot| {
        let mut ctx = AiContext::new(unit, snapshot, &map)?;
        plan_turn(&mut ctx, movement_points)
    });
    let Some(plan) = plan else {
        debug!(target: "runtime::ai", %unit, "nothing to hunt");
        return AiProgress::Done(end_turn(engine, out));
    };

    if !plan.path.is_empty() {
        match engine.commit_ai_move(unit, &plan.path, out) {
            Ok(seq) => {
                debug!(target: "runtime::ai", %unit, seq, steps = plan.path.len(), "AI moving");
                return AiProgress::Walking {
                    target: plan.target,
                    steps: plan.path.len(),
                };
            }
            Err(error) => {
                debug!(target: "runtime::ai", %unit, %error, "planned path refused");
            }
        }
    }
    AiProgress::Done(finish_turn(engine, unit, plan.target, out))
}

/// Attacks `target` if possible, then releases the AI lock.
pub(super) fn finish_turn(
    engine: &mut CombatEngine<'_, '_>,
    unit: UnitRef,
    target: UnitRef,
    out: &mut Vec<CombatEvent>,
) -> TurnStep {
    if let Some(ended) = attack(engine, unit, target, out) {
        return ended;
    }
    end_turn(engine, out)
}

/// Returns the final step when the attack ended the combat.
fn attack(
    engine: &mut CombatEngine<'_, '_>,
    unit: UnitRef,
    target: UnitRef,
    out: &mut Vec<CombatEvent>,
) -> Option<TurnStep> {
    let snapshot = engine.session().snapshot()?;
    let from = snapshot.tile_of(unit)?;
    let to = snapshot.tile_of(target).filter(|_| snapshot.is_alive(target))?;
    let distance = from.manhattan(to);

    let spell_id = first_spell(engine, unit);
    let def = spell_id.as_ref().and_then(|id| engine.env().spell(id));
    match (spell_id, def) {
        (Some(spell_id), Some(def)) => {
            if distance < def.range_min || distance > def.range_max {
                debug!(target: "runtime::ai", %unit, %spell_id, distance, "target out of range");
                return None;
            }
            match engine.cast(unit, &spell_id, to, out) {
                Ok(outcome) => outcome.ended,
                Err(error) => {
                    debug!(target: "runtime::ai", %unit, %spell_id, %error, "AI cast refused");
                    None
                }
            }
        }
        _ if from.is_adjacent(to) => {
            let dealt = engine.fallback_attack(unit, target, out)?;
            debug!(target: "runtime::ai", %unit, %target, dealt, "fallback attack");
            engine.check_end(out)
        }
        _ => None,
    }
}

fn first_spell(engine: &CombatEngine<'_, '_>, unit: UnitRef) -> Option<SpellId> {
    let session = engine.session();
    let monster_id = match unit {
        UnitRef::Monster(index) => session.mob_entry(index)?.monster_id.clone(),
        UnitRef::Summon(id) => session.snapshot()?.summon(id)?.monster_id.clone(),
        UnitRef::Player(_) => return None,
    };
    engine.env().monster(&monster_id)?.spells.first().cloned()
}

fn end_turn(engine: &mut CombatEngine<'_, '_>, out: &mut Vec<CombatEvent>) -> TurnStep {
    match engine.finish_ai_turn(out) {
        Ok(step) => step,
        Err(error) => {
            warn!(target: "runtime::ai", %error, "AI lock already released");
            engine.advance(out)
        }
    }
}
