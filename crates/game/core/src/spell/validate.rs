//! Cast preconditions, checked in a fixed order. Nothing here mutates.

use crate::engine::CombatEngine;
use crate::env::{CastPattern, SpellDef};
use crate::state::{CombatPhase, SpellId, TilePos, UnitRef};

use super::CastError;
use super::sight::has_line_of_sight;

/// A cast that passed every precondition.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CastPlan<'e> {
    pub def: &'e SpellDef,
    pub caster: UnitRef,
    pub caster_tile: TilePos,
    pub target_tile: TilePos,
    /// Living unit on the target tile, if any.
    pub target_unit: Option<UnitRef>,
}

impl<'e> CombatEngine<'_, 'e> {
    /// Runs every cast precondition for the active unit.
    pub(crate) fn plan_cast(
        &self,
        caster: UnitRef,
        spell_id: &SpellId,
        target_tile: TilePos,
    ) -> Result<CastPlan<'e>, CastError> {
        let session = self.session();
        if session.phase != CombatPhase::Combat {
            return Err(CastError::NotInCombat);
        }
        if session.active != Some(caster) {
            return Err(CastError::NotYourTurn(caster));
        }
        let snapshot = session
            .snapshot()
            .filter(|s| s.is_alive(caster))
            .ok_or(CastError::CasterUnavailable(caster))?;
        let caster_tile = snapshot
            .tile_of(caster)
            .ok_or(CastError::CasterUnavailable(caster))?;

        let def = self
            .env()
            .spell(spell_id)
            .ok_or_else(|| CastError::UnknownSpell(spell_id.clone()))?;
        if !self.knows_spell(caster, spell_id) {
            return Err(CastError::SpellNotKnown {
                caster,
                spell: spell_id.clone(),
            });
        }

        let map = session
            .collision
            .as_ref()
            .ok_or(CastError::MapUnavailable)?;
        if !map.contains(target_tile) {
            return Err(CastError::OutOfBounds(target_tile));
        }
        let target_unit = snapshot.unit_at(target_tile);

        if let Some(state) = session.spell_state.get(&caster) {
            let turns = state.cooldown(spell_id);
            if turns > 0 {
                return Err(CastError::OnCooldown {
                    spell: spell_id.clone(),
                    turns,
                });
            }
            if let Some(max) = def.max_casts_per_turn
                && state.casts(spell_id) >= max
            {
                return Err(CastError::TurnCapReached {
                    spell: spell_id.clone(),
                    max,
                });
            }
            if let (Some(max), Some(target)) = (def.max_casts_per_target, target_unit)
                && state.casts_on(spell_id, target) >= max
            {
                return Err(CastError::TargetCapReached {
                    spell: spell_id.clone(),
                    target,
                    max,
                });
            }
        }

        if let UnitRef::Player(player_id) = caster {
            let available = session.pools.get(&player_id).map_or(0, |pool| pool.pa);
            if available < def.pa_cost {
                return Err(CastError::InsufficientPa {
                    required: def.pa_cost,
                    available,
                });
            }
        }

        let distance = caster_tile.manhattan(target_tile);
        if distance < def.range_min || distance > def.range_max {
            return Err(CastError::OutOfRange {
                distance,
                min: def.range_min,
                max: def.range_max,
            });
        }
        if def.pattern == CastPattern::Orthogonal && !caster_tile.is_aligned(target_tile) {
            return Err(CastError::NotAligned(target_tile));
        }
        if def.line_of_sight
            && !has_line_of_sight(caster_tile, target_tile, |tile| {
                map.is_blocked(tile) || snapshot.unit_at(tile).is_some()
            })
        {
            return Err(CastError::NoLineOfSight(target_tile));
        }

        let valid_tile =
            !map.is_blocked(target_tile) || target_unit.is_some() || target_tile == caster_tile;
        if !valid_tile {
            return Err(CastError::InvalidTarget(target_tile));
        }

        Ok(CastPlan {
            def,
            caster,
            caster_tile,
            target_tile,
            target_unit,
        })
    }

    /// Players cast what their profile lists; monsters and summons what their definition lists.
    pub fn knows_spell(&self, caster: UnitRef, spell_id: &SpellId) -> bool {
        let session = self.session();
        let monster_id = match caster {
            UnitRef::Player(id) => {
                return session
                    .participant(id)
                    .is_some_and(|p| p.profile.knows(spell_id));
            }
            UnitRef::Monster(index) => session.mob_entry(index).map(|m| m.monster_id.clone()),
            UnitRef::Summon(id) => session
                .snapshot()
                .and_then(|s| s.summon(id))
                .map(|s| s.monster_id.clone()),
        };
        monster_id
            .and_then(|id| self.env().monster(&id))
            .is_some_and(|def| def.spells.contains(spell_id))
    }
}
