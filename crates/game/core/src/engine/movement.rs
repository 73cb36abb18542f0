//! In-combat movement: path validation, engagement malus and PM accounting.

use crate::combat::{effective_pm, mitigate};
use crate::event::{CombatEvent, DamageCause};
use crate::state::{CombatPhase, Element, PlayerId, TilePos, TurnPool, UnitRef};

use super::{CombatEngine, MoveError};

/// Accepted movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub unit: UnitRef,
    /// Steps actually taken, excluding the starting tile.
    pub path: Vec<TilePos>,
    pub seq: u64,
    /// Movement points left in the mover's pool.
    pub pm_left: u32,
}

impl CombatEngine<'_, '_> {
    /// Moves the active player along `path`.
    ///
    /// The path may start with the player's own tile. It is truncated to the
    /// movement budget left after the engagement malus, then every remaining
    /// step must be a 4-neighbour of the previous one, inside the map, walkable
    /// and unoccupied.
    pub fn move_player(
        &mut self,
        player_id: PlayerId,
        path: &[TilePos],
        seq: u64,
        out: &mut Vec<CombatEvent>,
    ) -> Result<MoveOutcome, MoveError> {
        if self.session.phase != CombatPhase::Combat {
            return Err(MoveError::NotInCombat);
        }
        let unit = UnitRef::Player(player_id);
        if self.session.active != Some(unit) {
            return Err(MoveError::NotYourTurn(unit));
        }
        if let Some(last) = self
            .session
            .participant(player_id)
            .and_then(|p| p.last_move_seq)
            && seq <= last
        {
            return Err(MoveError::StaleSequence { seq, last });
        }

        let start = self.living_tile(unit)?;
        let steps = strip_start(path, start);
        if steps.is_empty() {
            return Err(MoveError::EmptyPath);
        }

        let pm = self.session.pools.get(&player_id).map_or(0, |pool| pool.pm);
        let budget = self.engaged_budget(unit, start, pm);
        if budget == 0 {
            return Err(MoveError::NoMovementPoints);
        }

        let taken: Vec<TilePos> = steps.iter().copied().take(budget as usize).collect();
        self.validate_path(unit, start, &taken)?;

        let pm_left = budget - taken.len() as u32;
        let pool = self.session.pools.entry(player_id).or_insert_with(TurnPool::default);
        pool.pm = pm_left;
        if let Some(participant) = self.session.participant_mut(player_id) {
            participant.last_move_seq = Some(seq);
        }
        self.finish_move(unit, &taken, seq, out);

        Ok(MoveOutcome {
            unit,
            path: taken,
            seq,
            pm_left,
        })
    }

    /// Commits a server-planned path for the active monster or summon.
    ///
    /// Returns the synthesized sequence number carried by the move event.
    pub fn commit_ai_move(
        &mut self,
        unit: UnitRef,
        path: &[TilePos],
        out: &mut Vec<CombatEvent>,
    ) -> Result<u64, MoveError> {
        if self.session.phase != CombatPhase::Combat {
            return Err(MoveError::NotInCombat);
        }
        if self.session.active != Some(unit) || matches!(unit, UnitRef::Player(_)) {
            return Err(MoveError::NotYourTurn(unit));
        }
        let start = self.living_tile(unit)?;
        let steps = strip_start(path, start);
        if steps.is_empty() {
            return Err(MoveError::EmptyPath);
        }
        let budget = self.movement_points(unit) as usize;
        let taken: Vec<TilePos> = steps.iter().copied().take(budget).collect();
        self.validate_path(unit, start, &taken)?;

        let seq = self.session.next_move_seq();
        self.finish_move(unit, &taken, seq, out);
        Ok(seq)
    }

    /// Flat hit used when a monster's spell has no definition.
    ///
    /// The hit is announced as a non-authoritative cast so client reports
    /// quoting its id are recognised as duplicates. Returns the damage dealt,
    /// or `None` when the monster has no fallback damage or either unit is gone.
    pub fn fallback_attack(
        &mut self,
        attacker: UnitRef,
        target: UnitRef,
        out: &mut Vec<CombatEvent>,
    ) -> Option<u32> {
        if self.session.phase != CombatPhase::Combat || self.session.active != Some(attacker) {
            return None;
        }
        let snapshot = self.session.snapshot()?;
        if !snapshot.is_alive(attacker) {
            return None;
        }
        let target_tile = snapshot.tile_of(target).filter(|_| snapshot.is_alive(target))?;
        let monster_id = match attacker {
            UnitRef::Monster(index) => self.session.mob_entry(index)?.monster_id.clone(),
            UnitRef::Summon(id) => snapshot.summon(id)?.monster_id.clone(),
            UnitRef::Player(_) => return None,
        };
        let def = self.env.monster(&monster_id)?;
        let span = def.fallback_damage?;
        let spell_id = def.spells.first().cloned().unwrap_or_default();

        let cast_id = self.session.next_cast_id();
        out.push(CombatEvent::SpellCast {
            cast_id,
            caster: attacker,
            spell_id,
            target: target_tile,
            authoritative: false,
        });
        let (_, seed) = self.roll_seeds(attacker);
        let rolled = self.env.rng.range(seed, span.min, span.max);
        let resistances = self.stats_of(target).resistances;
        let amount = mitigate(rolled, &resistances, Element::Neutral);
        let applied = self.commit_damage(
            Some(attacker),
            target,
            amount,
            false,
            Some(cast_id),
            DamageCause::Fallback,
            out,
        )?;
        Some(applied.dealt)
    }

    fn living_tile(&self, unit: UnitRef) -> Result<TilePos, MoveError> {
        self.session
            .snapshot()
            .filter(|s| s.is_alive(unit))
            .and_then(|s| s.tile_of(unit))
            .ok_or(MoveError::UnitUnavailable(unit))
    }

    /// Movement budget once the engagement malus of the starting tile is applied.
    pub fn engaged_budget(&self, unit: UnitRef, start: TilePos, pm: u32) -> u32 {
        let hostiles = self.adjacent_hostiles(unit, start);
        if hostiles.is_empty() {
            return pm;
        }
        let tacle = hostiles.iter().map(|h| self.stats_of(*h).tacle).sum();
        let fuite = self.stats_of(unit).fuite;
        effective_pm(pm, tacle, fuite)
    }

    fn validate_path(
        &self,
        unit: UnitRef,
        start: TilePos,
        steps: &[TilePos],
    ) -> Result<(), MoveError> {
        let map = self
            .session
            .collision
            .as_ref()
            .ok_or(MoveError::MapUnavailable)?;

        let mut previous = start;
        for (index, tile) in steps.iter().copied().enumerate() {
            if !previous.is_adjacent(tile) {
                return Err(MoveError::NotContiguous { index, tile });
            }
            if !map.contains(tile) {
                return Err(MoveError::OutOfBounds(tile));
            }
            if map.is_blocked(tile) {
                return Err(MoveError::Blocked(tile));
            }
            if !self.is_free(tile, Some(unit)) {
                return Err(MoveError::Occupied(tile));
            }
            previous = tile;
        }
        Ok(())
    }

    fn finish_move(
        &mut self,
        unit: UnitRef,
        steps: &[TilePos],
        seq: u64,
        out: &mut Vec<CombatEvent>,
    ) {
        if let Some(last) = steps.last() {
            self.place_unit(unit, *last);
        }
        out.push(CombatEvent::UnitMoved {
            unit,
            path: steps.to_vec(),
            seq,
        });
    }
}

fn strip_start(path: &[TilePos], start: TilePos) -> &[TilePos] {
    match path.first() {
        Some(first) if *first == start => &path[1..],
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatIndex, CombatSession};
    use crate::testkit::Fixture;

    fn started(fixture: &Fixture, out: &mut Vec<CombatEvent>) -> CombatSession {
        fixture.started(&[("piou", 1)], out)
    }

    #[test]
    fn player_moves_and_pays_pm() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = started(&fixture, &mut out);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        let start = TilePos::new(2, 2);

        let outcome = engine
            .move_player(
                PlayerId(1),
                &[start, start.offset(0, 1), start.offset(0, 2)],
                1,
                &mut out,
            )
            .unwrap();

        assert_eq!(outcome.path.len(), 2);
        assert_eq!(outcome.pm_left, 1);
        assert_eq!(
            engine.session().participant(PlayerId(1)).unwrap().tile,
            start.offset(0, 2)
        );
        assert!(matches!(
            out.last(),
            Some(CombatEvent::UnitMoved { seq: 1, .. })
        ));
    }

    #[test]
    fn stale_sequence_and_broken_paths_are_rejected_without_effects() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = started(&fixture, &mut out);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        let start = TilePos::new(2, 2);
        engine
            .move_player(PlayerId(1), &[start.offset(0, 1)], 5, &mut out)
            .unwrap();
        let before = engine.session().snapshot().cloned();
        out.clear();

        assert_eq!(
            engine.move_player(PlayerId(1), &[start], 5, &mut out),
            Err(MoveError::StaleSequence { seq: 5, last: 5 })
        );
        assert!(matches!(
            engine.move_player(PlayerId(1), &[start.offset(2, 1)], 6, &mut out),
            Err(MoveError::NotContiguous { index: 0, .. })
        ));
        assert!(out.is_empty());
        assert_eq!(engine.session().snapshot().cloned(), before);
    }

    #[test]
    fn path_is_truncated_to_the_budget() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = started(&fixture, &mut out);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        let start = TilePos::new(2, 2);
        let path: Vec<TilePos> = (1..=4).map(|dy| start.offset(0, dy)).collect();

        let outcome = engine.move_player(PlayerId(1), &path, 1, &mut out).unwrap();

        assert_eq!(outcome.path.len(), 3);
        assert_eq!(outcome.pm_left, 0);
        assert_eq!(
            engine.move_player(PlayerId(1), &[start.offset(0, 4)], 2, &mut out),
            Err(MoveError::NoMovementPoints)
        );
    }

    #[test]
    fn engagement_malus_reduces_the_budget() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = started(&fixture, &mut out);
        let monster = UnitRef::Monster(CombatIndex(0));
        session
            .snapshot_mut()
            .set_tile(monster, TilePos::new(3, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        let start = TilePos::new(2, 2);

        // piou tacle 0, player fuite 0: 25 % of 3 PM rounds up to one point.
        assert_eq!(engine.engaged_budget(UnitRef::Player(PlayerId(1)), start, 3), 2);
        let outcome = engine
            .move_player(
                PlayerId(1),
                &[start.offset(0, 1), start.offset(0, 2), start.offset(0, 3)],
                1,
                &mut out,
            )
            .unwrap();
        assert_eq!(outcome.path.len(), 2);
    }

    #[test]
    fn occupied_tiles_block_movement() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = started(&fixture, &mut out);
        session
            .snapshot_mut()
            .set_tile(UnitRef::Monster(CombatIndex(0)), TilePos::new(2, 4));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        assert_eq!(
            engine.move_player(
                PlayerId(1),
                &[TilePos::new(2, 3), TilePos::new(2, 4)],
                1,
                &mut out
            ),
            Err(MoveError::Occupied(TilePos::new(2, 4)))
        );
    }

    #[test]
    fn moving_out_of_turn_is_rejected() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = started(&fixture, &mut out);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        engine.advance(&mut out);

        assert_eq!(
            engine.move_player(PlayerId(1), &[TilePos::new(2, 3)], 1, &mut out),
            Err(MoveError::NotYourTurn(UnitRef::Player(PlayerId(1))))
        );
    }
}
