//! Effect pipeline. Effects run in declared order against the resolved target.

use std::collections::HashSet;

use crate::combat::{DamageInput, mitigate, roll_damage};
use crate::config::LifeStealBasis;
use crate::env::{AreaPattern, BuffSide, SpellDef, SpellEffect, SpellRule, StatusTemplate};
use crate::event::{CombatEvent, DamageCause};
use crate::state::{
    CaptureState, Combatant, PlayerId, StatusEffect, StatusKind, SummonEntry, TilePos, UnitRef,
};

use super::CAPTURE_STATUS_ID;
use super::area::expand_area;
use super::validate::CastPlan;
use crate::engine::CombatEngine;

/// Damage totals of the most recent damaging effect of a cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct LastDamage {
    /// Rolled amount before resistance and shields.
    pub raw: u32,
    /// Hit points actually removed.
    pub dealt: u32,
}

/// Mutable state threaded through one cast's effects.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EffectContext<'e> {
    pub def: &'e SpellDef,
    pub caster: UnitRef,
    pub caster_tile: TilePos,
    pub target_tile: TilePos,
    pub target_unit: Option<UnitRef>,
    pub cast_id: u64,
    pub last_damage: Option<LastDamage>,
}

impl<'e> EffectContext<'e> {
    pub fn new(plan: CastPlan<'e>, cast_id: u64) -> Self {
        Self {
            def: plan.def,
            caster: plan.caster,
            caster_tile: plan.caster_tile,
            target_tile: plan.target_tile,
            target_unit: plan.target_unit,
            cast_id,
            last_damage: None,
        }
    }
}

impl CombatEngine<'_, '_> {
    pub(crate) fn apply_effects(&mut self, ctx: &mut EffectContext<'_>, out: &mut Vec<CombatEvent>) {
        let def = ctx.def;
        for effect in &def.effects {
            match effect {
                SpellEffect::Damage => {
                    if let Some(target) = ctx.target_unit {
                        ctx.last_damage = self.spell_damage(ctx, target, out);
                    }
                }
                SpellEffect::PatternDamage { area } => {
                    ctx.last_damage = self.pattern_damage(ctx, *area, out);
                }
                SpellEffect::LifeSteal { basis } => self.life_steal(ctx, *basis, out),
                SpellEffect::Push { distance } => self.push(ctx, *distance, out),
                SpellEffect::PullCasterToMelee { distance } => {
                    self.pull_caster(ctx, *distance, out)
                }
                SpellEffect::Status { status, on_caster } => {
                    let recipient = if *on_caster {
                        Some(ctx.caster)
                    } else {
                        ctx.target_unit
                    };
                    if let Some(unit) = recipient {
                        let effect = status.instantiate(&ctx.def.id);
                        self.give_status(unit, effect, out);
                    }
                }
                SpellEffect::AreaBuff {
                    radius,
                    side,
                    statuses,
                    shield_percent_of_max_hp,
                } => self.area_buff(ctx, *radius, *side, statuses, *shield_percent_of_max_hp, out),
                SpellEffect::Capture { turns } => self.arm_capture(ctx, *turns, out),
                SpellEffect::SummonCaptured => self.summon_captured(ctx, out),
            }
        }
    }

    fn is_living(&self, unit: UnitRef) -> bool {
        self.session().snapshot().is_some_and(|s| s.is_alive(unit))
    }

    /// Rolls the spell's damage against one unit and commits it.
    fn spell_damage(
        &mut self,
        ctx: &EffectContext<'_>,
        target: UnitRef,
        out: &mut Vec<CombatEvent>,
    ) -> Option<LastDamage> {
        let damage = ctx.def.damage?;
        if target == ctx.caster || !self.is_living(target) {
            return None;
        }

        let stats = self.stats_of(ctx.caster);
        let puissance = self
            .session()
            .snapshot()
            .and_then(|s| s.statuses(ctx.caster))
            .map_or(0, |s| s.puissance());
        let surge_charges = match ctx.def.rule {
            Some(SpellRule::ChargeSurge) => Some(self.charges_of(ctx.caster)),
            None => None,
        };
        let input = DamageInput {
            damage,
            element: ctx.def.element,
            stats: &stats,
            puissance,
            surge_charges,
        };
        let (crit_seed, base_seed) = self.roll_seeds(ctx.caster);
        let roll = roll_damage(
            &input,
            self.env().config,
            self.env().rng,
            crit_seed,
            base_seed,
        );

        let resistances = self.stats_of(target).resistances;
        let amount = mitigate(roll.amount, &resistances, ctx.def.element);
        let applied = self.commit_damage(
            Some(ctx.caster),
            target,
            amount,
            roll.critical,
            Some(ctx.cast_id),
            DamageCause::Spell,
            out,
        )?;
        Some(LastDamage {
            raw: roll.amount,
            dealt: applied.dealt,
        })
    }

    /// Resolves every unit in the area independently. Totals are summed.
    fn pattern_damage(
        &mut self,
        ctx: &EffectContext<'_>,
        area: AreaPattern,
        out: &mut Vec<CombatEvent>,
    ) -> Option<LastDamage> {
        let tiles = expand_area(area, ctx.caster_tile, ctx.target_tile);
        let targets: Vec<UnitRef> = {
            let snapshot = self.session().snapshot()?;
            tiles.iter().filter_map(|t| snapshot.unit_at(*t)).collect()
        };

        let mut total: Option<LastDamage> = None;
        for target in targets {
            if let Some(hit) = self.spell_damage(ctx, target, out) {
                let sum = total.get_or_insert_with(LastDamage::default);
                sum.raw += hit.raw;
                sum.dealt += hit.dealt;
            }
        }
        total
    }

    fn life_steal(
        &mut self,
        ctx: &EffectContext<'_>,
        basis: Option<LifeStealBasis>,
        out: &mut Vec<CombatEvent>,
    ) {
        let Some(last) = ctx.last_damage else { return };
        let amount = match basis.unwrap_or(self.env().config.life_steal_basis) {
            LifeStealBasis::Raw => last.raw,
            LifeStealBasis::Dealt => last.dealt,
        };
        if amount == 0 {
            return;
        }
        let snapshot = self.session.snapshot_mut();
        let Some(healed) = snapshot.heal(ctx.caster, amount) else {
            return;
        };
        let hp = snapshot.combatant(ctx.caster).map_or(0, |c| c.hp());
        out.push(CombatEvent::Healed {
            target: ctx.caster,
            amount: healed,
            hp,
        });
    }

    /// Slides `unit` up to `distance` tiles along `(dx, dy)`, stopping before
    /// the first tile that is not free. Returns the final tile and steps taken.
    fn slide(&self, unit: UnitRef, from: TilePos, dir: (i32, i32), distance: u32) -> (TilePos, u32) {
        let mut tile = from;
        let mut moved = 0;
        while moved < distance {
            let next = tile.offset(dir.0, dir.1);
            if !self.in_map(next) || !self.is_free(next, Some(unit)) {
                break;
            }
            tile = next;
            moved += 1;
        }
        (tile, moved)
    }

    fn in_map(&self, tile: TilePos) -> bool {
        self.session()
            .collision
            .as_ref()
            .is_none_or(|map| map.contains(tile))
    }

    fn displace(&mut self, unit: UnitRef, from: TilePos, to: TilePos, out: &mut Vec<CombatEvent>) {
        if from == to {
            return;
        }
        self.place_unit(unit, to);
        out.push(CombatEvent::UnitDisplaced { unit, from, to });
    }

    /// Pushes the target away from the caster. Unresolved distance becomes wall damage.
    fn push(&mut self, ctx: &mut EffectContext<'_>, distance: u32, out: &mut Vec<CombatEvent>) {
        let Some(target) = ctx.target_unit.filter(|t| *t != ctx.caster) else {
            return;
        };
        if !self.is_living(target) {
            return;
        }
        let Some(from) = self.session().snapshot().and_then(|s| s.tile_of(target)) else {
            return;
        };
        let dir = ctx.caster_tile.direction_to(from);
        if dir == (0, 0) {
            return;
        }

        let (to, moved) = self.slide(target, from, dir, distance);
        self.displace(target, from, to, out);
        ctx.target_tile = to;

        let remaining = distance - moved;
        if remaining > 0 {
            let bonus = self.stats_of(ctx.caster).push_damage;
            let amount = remaining * self.env().config.wall_damage_per_tile + bonus;
            self.commit_damage(
                Some(ctx.caster),
                target,
                amount,
                false,
                Some(ctx.cast_id),
                DamageCause::Wall,
                out,
            );
        }
    }

    /// Moves the caster in a straight line towards an aligned target, stopping
    /// adjacent to it or at the first blocked tile. Pulls never deal wall damage.
    fn pull_caster(&mut self, ctx: &mut EffectContext<'_>, distance: u32, out: &mut Vec<CombatEvent>) {
        let from = ctx.caster_tile;
        let goal = ctx.target_tile;
        if from == goal || !from.is_aligned(goal) {
            return;
        }
        let steps = distance.min(from.manhattan(goal) - 1);
        let (to, _) = self.slide(ctx.caster, from, from.direction_to(goal), steps);
        self.displace(ctx.caster, from, to, out);
        ctx.caster_tile = to;
    }

    fn give_status(&mut self, unit: UnitRef, effect: StatusEffect, out: &mut Vec<CombatEvent>) {
        if !self.is_living(unit) {
            return;
        }
        if let Some(statuses) = self.session.snapshot_mut().statuses_mut(unit) {
            statuses.upsert(effect.clone());
            out.push(CombatEvent::StatusApplied {
                target: unit,
                status: effect,
            });
        }
    }

    fn area_buff(
        &mut self,
        ctx: &EffectContext<'_>,
        radius: u32,
        side: BuffSide,
        statuses: &[StatusTemplate],
        shield_percent: Option<u32>,
        out: &mut Vec<CombatEvent>,
    ) {
        let Some(snapshot) = self.session().snapshot() else {
            return;
        };
        let caster_hp_max = snapshot.combatant(ctx.caster).map_or(0, |c| c.hp_max());
        let recipients: Vec<UnitRef> = snapshot
            .living()
            .filter(|c| c.tile().manhattan(ctx.caster_tile) <= radius)
            .map(|c| c.unit())
            .filter(|unit| match side {
                BuffSide::Allies => !unit.is_hostile_to(ctx.caster),
                BuffSide::Enemies => unit.is_hostile_to(ctx.caster),
            })
            .collect();

        for unit in recipients {
            for template in statuses {
                let mut effect = template.instantiate(&ctx.def.id);
                if let (StatusKind::Shield, Some(percent)) = (effect.kind, shield_percent) {
                    effect.amount = caster_hp_max * percent / 100;
                }
                self.give_status(unit, effect, out);
            }
        }
    }

    /// Arms a capture on a capturable monster no stronger than the caster.
    fn arm_capture(&mut self, ctx: &EffectContext<'_>, turns: u32, out: &mut Vec<CombatEvent>) {
        let UnitRef::Player(player_id) = ctx.caster else {
            return;
        };
        let Some(UnitRef::Monster(index)) = ctx.target_unit else {
            return;
        };
        let target = UnitRef::Monster(index);
        if turns == 0 || !self.is_living(target) {
            return;
        }
        let Some(mob) = self.session().mob_entry(index) else {
            return;
        };
        let capturable = self
            .env()
            .monster(&mob.monster_id)
            .is_some_and(|def| def.capturable);
        let level = self
            .session()
            .participant(player_id)
            .map_or(0, |p| p.profile.level);
        if !capturable || level < mob.level {
            return;
        }

        let previous = self.session.captures.insert(
            player_id,
            CaptureState {
                target: index,
                turns_left: turns,
            },
        );
        if let Some(previous) = previous.filter(|p| p.target != index)
            && let Some(statuses) = self
                .session
                .snapshot_mut()
                .statuses_mut(UnitRef::Monster(previous.target))
        {
            statuses.remove(CAPTURE_STATUS_ID);
        }
        let marker = StatusEffect::new(CAPTURE_STATUS_ID, StatusKind::Capture, turns)
            .with_source(ctx.def.id.as_str());
        self.give_status(target, marker, out);
        out.push(CombatEvent::CaptureArmed {
            player_id,
            target,
            turns,
        });
    }

    /// Spawns the caster's captured monster near the target tile.
    fn summon_captured(&mut self, ctx: &EffectContext<'_>, out: &mut Vec<CombatEvent>) {
        let UnitRef::Player(player_id) = ctx.caster else {
            return;
        };
        if let Some(entry) = self.spawn_summon(player_id, ctx.target_tile) {
            out.push(CombatEvent::SummonSpawned { summon: entry });
            self.repair_order_keep_current();
        }
    }

    fn spawn_summon(&mut self, owner: PlayerId, preferred: TilePos) -> Option<SummonEntry> {
        let captured = self
            .session()
            .participant(owner)?
            .profile
            .captured
            .clone()?;
        if self
            .session()
            .snapshot()
            .and_then(|s| s.living_summon_of(owner))
            .is_some()
        {
            return None;
        }
        let def = self.env().monster(&captured.monster_id)?;
        let tile = self.free_tile_near(preferred, &HashSet::new(), None)?;

        let summon_id = self.session.allocate_summon_id();
        let hp_max = def.hp_at(captured.level);
        let entry = SummonEntry {
            summon_id,
            owner_player_id: owner,
            monster_id: captured.monster_id,
            level: captured.level,
            initiative: def.initiative,
            tile,
            hp: hp_max,
            hp_max,
            status_effects: Default::default(),
        };
        self.session.snapshot_mut().upsert_summon(entry.clone());
        Some(entry)
    }
}
