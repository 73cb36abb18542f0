//! Client synchronization: snapshot bootstrap, reported damage and checksum audits.

use crate::checksum;
use crate::event::{CombatEvent, DamageCause};
use crate::state::{CombatPhase, PlayerId, Snapshot, UnitRef};

use super::{CombatEngine, SessionError, TurnStep};

impl CombatEngine<'_, '_> {
    /// Merges the first client-reported snapshot, then locks.
    ///
    /// Only positions of known units are taken, and only onto placeable tiles
    /// no other unit holds. Hit points stay authoritative.
    pub fn accept_bootstrap(
        &mut self,
        player_id: PlayerId,
        reported: &Snapshot,
        out: &mut Vec<CombatEvent>,
    ) -> Result<(), SessionError> {
        if self.session.phase == CombatPhase::Ended {
            return Err(SessionError::WrongPhase {
                expected: CombatPhase::Combat,
                actual: CombatPhase::Ended,
            });
        }
        if !self.session.is_participant(player_id) {
            return Err(SessionError::NotParticipant(player_id));
        }
        if self.session.snapshot_locked {
            return Err(SessionError::SnapshotLocked);
        }

        let reported_tiles = reported
            .players()
            .iter()
            .map(|p| (UnitRef::Player(p.player_id), p.tile))
            .chain(
                reported
                    .monsters()
                    .iter()
                    .map(|m| (UnitRef::Monster(m.combat_index), m.tile)),
            );
        let mut merged = Vec::new();
        for (unit, tile) in reported_tiles {
            let known = self.session.snapshot_mut().combatant(unit).is_some();
            if known && self.is_placeable(tile) && self.is_free(tile, Some(unit)) {
                self.place_unit(unit, tile);
                merged.push(unit);
            }
        }
        for unit in merged {
            if let UnitRef::Monster(index) = unit
                && let Some(tile) = self.session.snapshot_mut().tile_of(unit)
                && let Some(mob) = self
                    .session
                    .mob_entries
                    .iter_mut()
                    .find(|m| m.combat_index == index)
            {
                mob.tile = tile;
            }
        }

        self.session.snapshot_locked = true;
        out.push(self.state_event(false));
        Ok(())
    }

    /// Applies client-predicted damage from a trusted reporter.
    ///
    /// Monster and summon damage is only accepted from the AI driver for the
    /// active unit; player damage only from the active player itself. Reports
    /// quoting a cast the server already resolved are duplicates.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_reported_damage(
        &mut self,
        reporter: PlayerId,
        source: UnitRef,
        target: UnitRef,
        amount: u32,
        cast_id: Option<u64>,
        out: &mut Vec<CombatEvent>,
    ) -> Result<Option<TurnStep>, SessionError> {
        if self.session.phase != CombatPhase::Combat {
            return Err(SessionError::WrongPhase {
                expected: CombatPhase::Combat,
                actual: self.session.phase,
            });
        }
        if !self.session.is_participant(reporter) {
            return Err(SessionError::NotParticipant(reporter));
        }
        if let Some(id) = cast_id
            && id <= self.session.last_cast_id()
        {
            return Err(SessionError::DuplicateReport(id));
        }

        let trusted = match source {
            UnitRef::Player(id) => id == reporter && self.session.active == Some(source),
            UnitRef::Monster(_) | UnitRef::Summon(_) => {
                self.session.ai_driver == Some(reporter) && self.session.active == Some(source)
            }
        };
        if !trusted {
            return Err(SessionError::UntrustedReport {
                reporter,
                source_unit: source,
            });
        }
        if !self.session.snapshot_mut().is_alive(target) {
            return Err(SessionError::UnitNotAlive(target));
        }

        self.commit_damage(
            Some(source),
            target,
            amount,
            false,
            cast_id,
            DamageCause::Reported,
            out,
        );
        Ok(self.check_end(out))
    }

    /// Compares a client checksum with the server's. On mismatch the full
    /// state is re-sent with `resync` set; nothing is mutated.
    pub fn verify_checksum(&mut self, reported: u32, out: &mut Vec<CombatEvent>) -> bool {
        let expected = checksum::session_checksum(self.session);
        if expected == reported {
            return true;
        }
        out.push(self.state_event(true));
        false
    }
}
