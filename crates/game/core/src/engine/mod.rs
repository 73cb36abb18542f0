//! Turn loop, session lifecycle and the mutation helpers shared by every rule.
//!
//! [`CombatEngine`] is the authoritative reducer for a [`CombatSession`]. Each
//! public method validates fully before mutating and appends the resulting
//! [`CombatEvent`]s to the caller's buffer; a rejected command leaves both the
//! session and the buffer untouched.

mod errors;
mod movement;
mod order;
mod placement;
mod setup;
mod sync;
mod turns;

pub use errors::{MoveError, SessionError, TurnError};
pub use movement::MoveOutcome;
pub use order::{build_actor_order, repair_actor_order};
pub use placement::nearest_free_tile;
pub use setup::{CombatStart, create_session, expand_groups};
pub use turns::TurnStep;

use crate::checksum;
use crate::env::{CombatEnv, compute_seed};
use crate::event::{CombatEvent, DamageCause};
use crate::state::{
    CombatSession, CombatStats, DamageApplied, Side, TilePos, UnitRef,
};

/// Reducer over one combat session.
pub struct CombatEngine<'s, 'e> {
    pub(crate) session: &'s mut CombatSession,
    pub(crate) env: CombatEnv<'e>,
}

impl<'s, 'e> CombatEngine<'s, 'e> {
    pub fn new(session: &'s mut CombatSession, env: CombatEnv<'e>) -> Self {
        Self { session, env }
    }

    pub fn session(&self) -> &CombatSession {
        self.session
    }

    pub fn env(&self) -> &CombatEnv<'e> {
        &self.env
    }

    // ===== unit data =====

    /// Combat characteristics of a unit. Unknown units get neutral stats.
    pub fn stats_of(&self, unit: UnitRef) -> CombatStats {
        match unit {
            UnitRef::Player(id) => self
                .session
                .participant(id)
                .map(|p| p.profile.stats.clone())
                .unwrap_or_default(),
            UnitRef::Monster(index) => self
                .session
                .mob_entry(index)
                .and_then(|mob| self.env.monster(&mob.monster_id))
                .map(|def| def.stats.clone())
                .unwrap_or_default(),
            UnitRef::Summon(id) => self
                .session
                .snapshot()
                .and_then(|s| s.summon(id))
                .and_then(|summon| self.env.monster(&summon.monster_id))
                .map(|def| def.stats.clone())
                .unwrap_or_default(),
        }
    }

    pub fn level_of(&self, unit: UnitRef) -> u32 {
        match unit {
            UnitRef::Player(id) => self.session.participant(id).map_or(0, |p| p.profile.level),
            UnitRef::Monster(index) => self.session.mob_entry(index).map_or(0, |m| m.level),
            UnitRef::Summon(id) => self
                .session
                .snapshot()
                .and_then(|s| s.summon(id))
                .map_or(0, |s| s.level),
        }
    }

    /// Movement points granted to a unit at the start of its turn.
    pub fn movement_points(&self, unit: UnitRef) -> u32 {
        match unit {
            UnitRef::Player(id) => self.session.participant(id).map_or(0, |p| p.profile.pm),
            UnitRef::Monster(index) => self.session.mob_entry(index).map_or(0, |m| m.pm),
            UnitRef::Summon(id) => self
                .session
                .snapshot()
                .and_then(|s| s.summon(id))
                .and_then(|summon| self.env.monster(&summon.monster_id))
                .map(|def| def.pm)
                .filter(|pm| *pm > 0)
                .unwrap_or(self.env.config.default_monster_pm),
        }
    }

    // ===== rolls =====

    /// Two independent seeds for one roll (critical, base), advancing the nonce.
    pub(crate) fn roll_seeds(&mut self, unit: UnitRef) -> (u64, u64) {
        let nonce = self.session.roll_nonce;
        self.session.roll_nonce += 1;
        let actor = unit.numeric_id();
        (
            compute_seed(self.session.seed, nonce, actor, 0),
            compute_seed(self.session.seed, nonce, actor, 1),
        )
    }

    // ===== board queries =====

    /// In bounds, walkable and not held by a living unit other than `except`.
    ///
    /// Without collision data only occupancy is checked.
    pub fn is_free(&self, tile: TilePos, except: Option<UnitRef>) -> bool {
        if let Some(map) = &self.session.collision
            && !map.is_walkable(tile)
        {
            return false;
        }
        match self.session.snapshot().and_then(|s| s.unit_at(tile)) {
            Some(unit) => Some(unit) == except,
            None => true,
        }
    }

    /// Living units hostile to `unit` standing next to `tile`.
    pub fn adjacent_hostiles(&self, unit: UnitRef, tile: TilePos) -> Vec<UnitRef> {
        let Some(snapshot) = self.session.snapshot() else {
            return Vec::new();
        };
        tile.neighbors4()
            .into_iter()
            .filter_map(|n| snapshot.unit_at(n))
            .filter(|other| other.is_hostile_to(unit))
            .collect()
    }

    // ===== snapshot events =====

    /// Full-state event for the current snapshot.
    pub fn state_event(&mut self, resync: bool) -> CombatEvent {
        let snapshot = self.session.snapshot_mut().clone();
        CombatEvent::CombatState {
            snapshot,
            checksum: checksum::session_checksum(self.session),
            resync,
        }
    }

    // ===== mutation helpers =====

    /// Moves a unit in the snapshot and mirrors player positions on the participant.
    pub(crate) fn place_unit(&mut self, unit: UnitRef, tile: TilePos) {
        self.session.snapshot_mut().set_tile(unit, tile);
        if let UnitRef::Player(id) = unit
            && let Some(participant) = self.session.participant_mut(id)
        {
            participant.tile = tile;
        }
    }

    /// Commits damage through the shield gateway, emits it and handles death.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn commit_damage(
        &mut self,
        source: Option<UnitRef>,
        target: UnitRef,
        amount: u32,
        critical: bool,
        cast_id: Option<u64>,
        cause: DamageCause,
        out: &mut Vec<CombatEvent>,
    ) -> Option<DamageApplied> {
        let applied = self.session.snapshot_mut().apply_damage(target, amount)?;
        out.push(CombatEvent::DamageApplied {
            source,
            target,
            amount: applied.dealt,
            absorbed: applied.absorbed,
            hp: applied.hp_after,
            critical,
            cast_id,
            cause,
        });
        if applied.killed {
            self.on_unit_killed(target, out);
        }
        Some(applied)
    }

    /// Death bookkeeping: completes armed captures on the dying monster.
    fn on_unit_killed(&mut self, unit: UnitRef, out: &mut Vec<CombatEvent>) {
        out.push(CombatEvent::UnitDied { unit });

        let UnitRef::Monster(index) = unit else {
            return;
        };
        let captor = self
            .session
            .captures
            .iter()
            .find(|(_, capture)| capture.target == index)
            .map(|(player, _)| *player);
        let Some(player_id) = captor else {
            return;
        };

        self.session.captures.remove(&player_id);
        if let Some(statuses) = self.session.snapshot_mut().statuses_mut(unit) {
            statuses.remove(crate::spell::CAPTURE_STATUS_ID);
        }
        let Some(mob) = self.session.mob_entry(index).cloned() else {
            return;
        };
        if let Some(participant) = self.session.participant_mut(player_id) {
            participant.profile.captured = Some(crate::state::CapturedMonster {
                monster_id: mob.monster_id.clone(),
                level: mob.level,
            });
        }
        out.push(CombatEvent::MonsterCaptured {
            player_id,
            monster_id: mob.monster_id,
        });
    }

    pub(crate) fn side_alive(&self, side: Side) -> bool {
        let Some(snapshot) = self.session.snapshot() else {
            return true;
        };
        match side {
            Side::Players => snapshot.living_players() > 0,
            Side::Monsters => snapshot.living_monsters() > 0,
        }
    }
}
