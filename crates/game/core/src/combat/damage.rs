//! Damage calculation.
//!
//! # Formula
//!
//! ```text
//! critical = d100 <= clamp(crit_chance + crit_bonus, 0, 100)
//! base     = roll(min..=max)  or  roll(crit_min..=crit_max) when critical
//! scaled   = base * (100 + stat_bonus% * (elemental_stat + puissance)) / 100
//! flat     = scaled + elemental_damage[element] + damage_bonus (+ crit_damage_bonus)
//! surge    = flat * (100 + charge_bonus% * min(charges, max_charges)) / 100
//! final    = max(surge, 0)
//! ```
//!
//! Resistance and shields are applied downstream by [`mitigate`] and the
//! snapshot's shield gateway.

use crate::config::CombatConfig;
use crate::env::{RngOracle, SpellDamage};
use crate::state::{CombatStats, Element, ElementValues};

/// Attacker-side inputs of one damage roll.
#[derive(Clone, Copy, Debug)]
pub struct DamageInput<'a> {
    pub damage: SpellDamage,
    pub element: Element,
    pub stats: &'a CombatStats,
    /// Sum of the attacker's active puissance buffs.
    pub puissance: i32,
    /// Charges consumed by a surge rule, if the spell has one.
    pub surge_charges: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRoll {
    pub amount: u32,
    pub critical: bool,
}

/// `d100` is in `1..=100`, so a threshold of 0 never crits.
pub fn is_critical(crit_chance: u32, crit_bonus: i32, d100: u32) -> bool {
    let threshold = (crit_chance as i64 + crit_bonus as i64).clamp(0, 100);
    (d100 as i64) <= threshold
}

/// Applies multipliers and flat bonuses to a rolled base value.
pub fn scale_damage(base: u32, critical: bool, input: &DamageInput<'_>, config: &CombatConfig) -> u32 {
    let stat = input.stats.elemental_stat(input.element) as i64 + input.puissance as i64;
    let multiplier = (100 + config.stat_bonus_percent as i64 * stat).max(0);

    let mut amount = base as i64 * multiplier / 100;
    amount += input.stats.elemental_damage.get(input.element) as i64;
    amount += input.stats.damage_bonus as i64;
    if critical {
        amount += input.stats.crit_damage_bonus as i64;
    }

    if let Some(charges) = input.surge_charges {
        let charges = charges.min(config.max_elemental_charges) as i64;
        amount = amount * (100 + config.charge_bonus_percent as i64 * charges) / 100;
    }

    amount.clamp(0, u32::MAX as i64) as u32
}

/// Rolls critical and base damage, then scales it.
///
/// `crit_seed` and `base_seed` must be independent seeds.
pub fn roll_damage(
    input: &DamageInput<'_>,
    config: &CombatConfig,
    rng: &dyn RngOracle,
    crit_seed: u64,
    base_seed: u64,
) -> DamageRoll {
    let spell = input.damage;
    let critical = is_critical(spell.crit_chance, input.stats.crit_bonus, rng.roll_d100(crit_seed));
    let base = if critical {
        rng.range(base_seed, spell.crit_min, spell.crit_max)
    } else {
        rng.range(base_seed, spell.min, spell.max)
    };

    DamageRoll {
        amount: scale_damage(base, critical, input, config),
        critical,
    }
}

/// Subtracts the defender's flat resistance for the element. Never negative.
pub fn mitigate(amount: u32, resistances: &ElementValues, element: Element) -> u32 {
    let resistance = resistances.get(element);
    if resistance >= 0 {
        amount.saturating_sub(resistance as u32)
    } else {
        amount.saturating_add(resistance.unsigned_abs())
    }
}
