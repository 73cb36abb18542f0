//! Spell resolution.
//!
//! [`CombatEngine::cast`] validates a cast against every precondition (see
//! [`validate`]) and only then pays its costs, announces it and runs the
//! effect pipeline in declared order. A refused cast mutates nothing and emits
//! nothing.
mod area;
mod charges;
mod effects;
mod error;
mod sight;
mod validate;

pub use area::expand_area;
pub use error::CastError;
pub use sight::{has_line_of_sight, line_between};

use crate::engine::{CombatEngine, TurnStep};
use crate::event::CombatEvent;
use crate::state::{SpellId, SpellState, TilePos, UnitRef};

use effects::EffectContext;
use validate::CastPlan;

/// Status id marking a monster with an armed capture.
pub const CAPTURE_STATUS_ID: &str = "capture_essence";

/// Result of an accepted cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastOutcome {
    pub cast_id: u64,
    /// Set when the cast wiped out a side.
    pub ended: Option<TurnStep>,
}

impl CombatEngine<'_, '_> {
    /// Resolves a cast by the active unit at `target`.
    pub fn cast(
        &mut self,
        caster: UnitRef,
        spell_id: &SpellId,
        target: TilePos,
        out: &mut Vec<CombatEvent>,
    ) -> Result<CastOutcome, CastError> {
        let plan = self.plan_cast(caster, spell_id, target)?;
        self.pay_cast(&plan);

        let cast_id = self.session.next_cast_id();
        out.push(CombatEvent::SpellCast {
            cast_id,
            caster,
            spell_id: spell_id.clone(),
            target,
            authoritative: true,
        });

        let mut ctx = EffectContext::new(plan, cast_id);
        self.apply_effects(&mut ctx, out);
        self.update_charges(caster, plan.def, out);

        Ok(CastOutcome {
            cast_id,
            ended: self.check_end(out),
        })
    }

    fn pay_cast(&mut self, plan: &CastPlan<'_>) {
        let def = plan.def;
        if let UnitRef::Player(player_id) = plan.caster
            && let Some(pool) = self.session.pools.get_mut(&player_id)
        {
            pool.pa = pool.pa.saturating_sub(def.pa_cost);
        }

        let state = self
            .session
            .spell_state
            .entry(plan.caster)
            .or_insert_with(SpellState::default);
        if def.cooldown > 0 {
            state.cooldowns.insert(def.id.clone(), def.cooldown);
        }
        *state.casts_this_turn.entry(def.id.clone()).or_insert(0) += 1;
        if let Some(target) = plan.target_unit {
            *state
                .casts_per_target
                .entry((def.id.clone(), target))
                .or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DamageCause;
    use crate::state::{
        CapturedMonster, CombatIndex, CombatOutcome, CombatSession, Element, ElementalCharges,
        MonsterId, PlayerId, StatusKind, SummonId,
    };
    use crate::testkit::Fixture;

    const PLAYER: UnitRef = UnitRef::Player(PlayerId(1));
    const FIRST: UnitRef = UnitRef::Monster(CombatIndex(0));
    const SECOND: UnitRef = UnitRef::Monster(CombatIndex(1));

    fn monster_hp(session: &CombatSession, index: u32) -> u32 {
        session
            .snapshot()
            .and_then(|s| s.monster(CombatIndex(index)))
            .map_or(0, |m| m.hp)
    }

    fn spell(id: &str) -> SpellId {
        SpellId::from(id)
    }

    #[test]
    fn cast_pays_announces_and_damages() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        out.clear();

        let outcome = engine
            .cast(PLAYER, &spell("strike"), TilePos::new(3, 2), &mut out)
            .unwrap();

        assert_eq!(outcome.cast_id, 1);
        assert_eq!(outcome.ended, None);
        assert!(matches!(
            &out[0],
            CombatEvent::SpellCast { authoritative: true, cast_id: 1, .. }
        ));
        assert!(matches!(
            &out[1],
            CombatEvent::DamageApplied { amount: 10, hp: 10, cause: DamageCause::Spell, .. }
        ));
        assert_eq!(monster_hp(&session, 0), 10);
        assert_eq!(session.pools[&PlayerId(1)].pa, 3);
    }

    #[test]
    fn fourth_cast_over_a_cap_of_three_is_refused() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("tofu", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(4, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        for _ in 0..3 {
            engine
                .cast(PLAYER, &spell("jab"), TilePos::new(4, 2), &mut out)
                .unwrap();
        }
        let before = engine.session().clone();
        out.clear();

        assert_eq!(
            engine.cast(PLAYER, &spell("jab"), TilePos::new(4, 2), &mut out),
            Err(CastError::TurnCapReached {
                spell: spell("jab"),
                max: 3
            })
        );
        assert!(out.is_empty());
        assert_eq!(engine.session().snapshot(), before.snapshot());
        assert_eq!(engine.session().pools, before.pools);
        assert_eq!(engine.session().spell_state, before.spell_state);
    }

    #[test]
    fn preconditions_are_enforced() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1), ("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        session.snapshot_mut().set_tile(SECOND, TilePos::new(4, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        assert!(matches!(
            engine.cast(PLAYER, &spell("strike"), TilePos::new(4, 2), &mut out),
            Err(CastError::OutOfRange { distance: 2, .. })
        ));
        assert!(matches!(
            engine.cast(PLAYER, &spell("bolt"), TilePos::new(4, 2), &mut out),
            Err(CastError::NoLineOfSight(_))
        ));
        assert!(matches!(
            engine.cast(PLAYER, &spell("shove"), TilePos::new(3, 3), &mut out),
            Err(CastError::OutOfRange { .. }) | Err(CastError::NotAligned(_))
        ));
        assert!(matches!(
            engine.cast(PLAYER, &spell("lance"), TilePos::new(4, 3), &mut out),
            Err(CastError::NotAligned(_))
        ));
        assert!(matches!(
            engine.cast(PLAYER, &spell("nope"), TilePos::new(3, 2), &mut out),
            Err(CastError::UnknownSpell(_))
        ));
        assert!(matches!(
            engine.cast(PLAYER, &spell("strike"), TilePos::new(30, 2), &mut out),
            Err(CastError::OutOfBounds(_))
        ));
        assert!(matches!(
            engine.cast(FIRST, &spell("bite"), TilePos::new(2, 2), &mut out),
            Err(CastError::NotYourTurn(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn blocked_push_turns_distance_into_wall_damage() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1), ("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        session.snapshot_mut().set_tile(SECOND, TilePos::new(4, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        out.clear();

        engine
            .cast(PLAYER, &spell("shove"), TilePos::new(3, 2), &mut out)
            .unwrap();

        let snapshot = engine.session().snapshot().unwrap();
        assert_eq!(snapshot.tile_of(FIRST), Some(TilePos::new(3, 2)));
        // 2 tiles × 9 + the caster's push bonus of 1.
        assert_eq!(monster_hp(engine.session(), 0), 20 - 19);
        assert!(out.iter().any(|e| matches!(
            e,
            CombatEvent::DamageApplied { cause: DamageCause::Wall, amount: 19, .. }
        )));
        assert!(!out.iter().any(|e| matches!(e, CombatEvent::UnitDisplaced { .. })));
    }

    #[test]
    fn free_push_moves_the_full_distance() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        out.clear();

        engine
            .cast(PLAYER, &spell("shove"), TilePos::new(3, 2), &mut out)
            .unwrap();

        assert_eq!(
            engine.session().snapshot().unwrap().tile_of(FIRST),
            Some(TilePos::new(5, 2))
        );
        assert_eq!(monster_hp(engine.session(), 0), 20);
        assert!(out.iter().any(|e| matches!(
            e,
            CombatEvent::UnitDisplaced { from, to, .. }
                if *from == TilePos::new(3, 2) && *to == TilePos::new(5, 2)
        )));
    }

    #[test]
    fn partial_push_stops_at_the_map_edge() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(2, 1));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        engine
            .cast(PLAYER, &spell("shove"), TilePos::new(2, 1), &mut out)
            .unwrap();

        assert_eq!(
            engine.session().snapshot().unwrap().tile_of(FIRST),
            Some(TilePos::new(2, 0))
        );
        assert_eq!(monster_hp(engine.session(), 0), 20 - 10);
    }

    #[test]
    fn capture_completes_when_the_target_dies() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1), ("tofu", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        engine
            .cast(PLAYER, &spell("snare"), TilePos::new(3, 2), &mut out)
            .unwrap();
        assert!(out.iter().any(|e| matches!(
            e,
            CombatEvent::CaptureArmed { turns: 2, .. }
        )));
        assert!(
            engine
                .session()
                .snapshot()
                .and_then(|s| s.statuses(FIRST))
                .is_some_and(|s| s.has(CAPTURE_STATUS_ID))
        );

        // Both monsters play, then the player's next turn ticks the countdown to 1.
        engine.end_turn(PlayerId(1), &mut out).unwrap();
        engine.advance(&mut out);
        engine.advance(&mut out);
        assert_eq!(engine.session().active, Some(PLAYER));
        assert_eq!(engine.session().captures[&PlayerId(1)].turns_left, 1);

        engine
            .cast(PLAYER, &spell("strike"), TilePos::new(3, 2), &mut out)
            .unwrap();
        engine
            .cast(PLAYER, &spell("strike"), TilePos::new(3, 2), &mut out)
            .unwrap();

        let session = engine.session();
        assert_eq!(monster_hp(session, 0), 0);
        assert_eq!(
            session.participant(PlayerId(1)).unwrap().profile.captured,
            Some(CapturedMonster {
                monster_id: MonsterId::from("piou"),
                level: 1
            })
        );
        assert!(session.captures.is_empty());
        assert!(
            !session
                .snapshot()
                .and_then(|s| s.statuses(FIRST))
                .is_some_and(|s| s.has(CAPTURE_STATUS_ID))
        );
        assert!(out.iter().any(|e| matches!(e, CombatEvent::MonsterCaptured { .. })));
    }

    #[test]
    fn capture_expires_after_its_countdown() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        engine
            .cast(PLAYER, &spell("snare"), TilePos::new(3, 2), &mut out)
            .unwrap();

        for _ in 0..4 {
            engine.advance(&mut out);
        }

        assert!(engine.session().captures.is_empty());
        assert!(out.iter().any(|e| matches!(e, CombatEvent::CaptureExpired { .. })));
    }

    #[test]
    fn life_steal_heals_by_the_damage_dealt() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("tofu", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        session.snapshot_mut().set_hp(PLAYER, 30);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        engine
            .cast(PLAYER, &spell("leech"), TilePos::new(3, 2), &mut out)
            .unwrap();

        let hp = engine.session().snapshot().unwrap().player(PlayerId(1)).unwrap().hp;
        assert_eq!(hp, 36);
        assert!(out.iter().any(|e| matches!(e, CombatEvent::Healed { amount: 6, .. })));
    }

    #[test]
    fn cross_damage_rolls_per_unit_and_life_steal_sums_the_hits() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1), ("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(4, 2));
        session.snapshot_mut().set_tile(SECOND, TilePos::new(4, 3));
        session.snapshot_mut().set_hp(PLAYER, 40);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        out.clear();

        engine
            .cast(PLAYER, &spell("blast"), TilePos::new(4, 2), &mut out)
            .unwrap();

        assert_eq!(monster_hp(engine.session(), 0), 18);
        assert_eq!(monster_hp(engine.session(), 1), 18);
        let hits = out
            .iter()
            .filter(|e| matches!(e, CombatEvent::DamageApplied { amount: 2, .. }))
            .count();
        assert_eq!(hits, 2);
        assert!(out.iter().any(|e| matches!(e, CombatEvent::Healed { amount: 4, .. })));
        let hp = engine.session().snapshot().unwrap().player(PlayerId(1)).unwrap().hp;
        assert_eq!(hp, 44);
    }

    #[test]
    fn ally_buff_shield_scales_with_caster_max_hp() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        engine
            .cast(PLAYER, &spell("ward"), TilePos::new(2, 2), &mut out)
            .unwrap();

        let snapshot = engine.session().snapshot().unwrap();
        let ward = snapshot.statuses(PLAYER).unwrap().get("ward").unwrap();
        assert_eq!(ward.kind, StatusKind::Shield);
        // 20% of 50 max hp.
        assert_eq!(ward.amount, 10);
        assert!(!snapshot.statuses(FIRST).unwrap().has("ward"));
    }

    #[test]
    fn pull_stops_next_to_the_target() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(7, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        out.clear();

        engine
            .cast(PLAYER, &spell("bond"), TilePos::new(7, 2), &mut out)
            .unwrap();

        assert_eq!(
            engine.session().snapshot().unwrap().tile_of(PLAYER),
            Some(TilePos::new(6, 2))
        );
        assert!(out.contains(&CombatEvent::UnitDisplaced {
            unit: PLAYER,
            from: TilePos::new(2, 2),
            to: TilePos::new(6, 2),
        }));
    }

    #[test]
    fn pull_halts_before_an_occupied_tile_without_wall_damage() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1), ("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(7, 2));
        session.snapshot_mut().set_tile(SECOND, TilePos::new(4, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        out.clear();

        engine
            .cast(PLAYER, &spell("bond"), TilePos::new(7, 2), &mut out)
            .unwrap();

        assert_eq!(
            engine.session().snapshot().unwrap().tile_of(PLAYER),
            Some(TilePos::new(3, 2))
        );
        assert!(!out.iter().any(|e| matches!(e, CombatEvent::DamageApplied { .. })));
        let hp = engine.session().snapshot().unwrap().player(PlayerId(1)).unwrap().hp;
        assert_eq!(hp, 50);
    }

    #[test]
    fn pull_towards_an_off_axis_target_leaves_the_caster_in_place() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(5, 4));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);
        out.clear();

        engine
            .cast(PLAYER, &spell("bond"), TilePos::new(5, 4), &mut out)
            .unwrap();

        assert_eq!(
            engine.session().snapshot().unwrap().tile_of(PLAYER),
            Some(TilePos::new(2, 2))
        );
        assert!(!out.iter().any(|e| matches!(e, CombatEvent::UnitDisplaced { .. })));
    }

    #[test]
    fn recast_status_replaces_the_previous_one() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(4, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        engine
            .cast(PLAYER, &spell("curse"), TilePos::new(4, 2), &mut out)
            .unwrap();
        engine
            .session
            .snapshot_mut()
            .statuses_mut(FIRST)
            .unwrap()
            .decrement();
        let left = engine
            .session()
            .snapshot()
            .and_then(|s| s.statuses(FIRST))
            .and_then(|s| s.get("curse"))
            .map(|c| c.turns_left);
        assert_eq!(left, Some(2));
        out.clear();

        engine
            .cast(PLAYER, &spell("curse"), TilePos::new(4, 2), &mut out)
            .unwrap();

        let statuses = engine.session().snapshot().unwrap().statuses(FIRST).unwrap();
        assert_eq!(statuses.len(), 1);
        let curse = statuses.get("curse").unwrap();
        assert_eq!(curse.turns_left, 3);
        assert_eq!(curse.source, "curse");
        assert!(out.iter().any(|e| matches!(
            e,
            CombatEvent::StatusApplied { target, .. } if *target == FIRST
        )));
    }

    #[test]
    fn elemental_charges_accumulate_and_surge() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started_as(Fixture::mage(1), &[("tofu", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(4, 2));
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        engine
            .cast(PLAYER, &spell("bolt"), TilePos::new(4, 2), &mut out)
            .unwrap();
        engine
            .cast(PLAYER, &spell("bolt"), TilePos::new(4, 2), &mut out)
            .unwrap();
        assert_eq!(
            engine.session().charges[&PlayerId(1)],
            ElementalCharges {
                element: Element::Fire,
                count: 2
            }
        );
        out.clear();

        engine
            .cast(PLAYER, &spell("surge"), TilePos::new(4, 2), &mut out)
            .unwrap();

        // 10 base damage, +10 % per charge.
        assert!(out.iter().any(|e| matches!(
            e,
            CombatEvent::DamageApplied { amount: 12, .. }
        )));
        assert_eq!(engine.session().charges[&PlayerId(1)].count, 0);
    }

    #[test]
    fn captured_monster_can_be_summoned_next_to_its_owner() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut profile = Fixture::profile(1);
        profile.captured = Some(CapturedMonster {
            monster_id: MonsterId::from("piou"),
            level: 2,
        });
        let mut session = fixture.started_as(profile, &[("tofu", 1)], &mut out);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        engine
            .cast(PLAYER, &spell("call"), TilePos::new(2, 3), &mut out)
            .unwrap();

        let session = engine.session();
        let summon = session.snapshot().unwrap().summon(SummonId(1)).unwrap();
        assert_eq!(summon.tile, TilePos::new(2, 3));
        assert_eq!(summon.hp_max, 25);
        let order: Vec<UnitRef> = session.actor_order.iter().map(|a| a.unit()).collect();
        assert_eq!(
            order,
            vec![PLAYER, UnitRef::Summon(SummonId(1)), FIRST]
        );
        assert_eq!(session.actor_index, 0);
        assert!(matches!(
            engine.cast(PLAYER, &spell("call"), TilePos::new(2, 4), &mut out),
            Ok(_)
        ));
        assert_eq!(engine.session().snapshot().unwrap().summons().len(), 1);
    }

    #[test]
    fn killing_the_last_monster_ends_the_combat() {
        let fixture = Fixture::new();
        let mut out = Vec::new();
        let mut session = fixture.started(&[("piou", 1)], &mut out);
        session.snapshot_mut().set_tile(FIRST, TilePos::new(3, 2));
        session.snapshot_mut().set_hp(FIRST, 5);
        let env = fixture.env();
        let mut engine = CombatEngine::new(&mut session, env);

        let outcome = engine
            .cast(PLAYER, &spell("strike"), TilePos::new(3, 2), &mut out)
            .unwrap();

        assert_eq!(outcome.ended, Some(TurnStep::Ended(CombatOutcome::Victory)));
        assert!(matches!(
            out.last(),
            Some(CombatEvent::CombatEnded { outcome: CombatOutcome::Victory })
        ));
    }
}
