//! Elemental charges: a class mechanic run after a cast's effect pipeline.
//!
//! Casting an elemental spell converts the caster's stock to that element and
//! adds one charge, up to the configured cap. A surge spell consumes the whole
//! stock; the bonus itself is applied by the damage roll.

use crate::engine::CombatEngine;
use crate::env::{SpellDef, SpellRule};
use crate::event::CombatEvent;
use crate::state::{Element, ElementalCharges, PlayerId, UnitRef};

impl CombatEngine<'_, '_> {
    /// Charges held by a unit. Only players of a charge class hold any.
    pub fn charges_of(&self, unit: UnitRef) -> u32 {
        unit.as_player()
            .and_then(|id| self.session.charges.get(&id))
            .map_or(0, |charges| charges.count)
    }

    fn accumulates_charges(&self, player_id: PlayerId) -> bool {
        self.session
            .participant(player_id)
            .and_then(|p| self.env.class(&p.profile.class_id))
            .is_some_and(|class| class.elemental_charges)
    }

    pub(crate) fn update_charges(&mut self, caster: UnitRef, def: &SpellDef, out: &mut Vec<CombatEvent>) {
        let Some(player_id) = caster.as_player() else {
            return;
        };
        if !self.accumulates_charges(player_id) {
            return;
        }

        let current = self.session.charges.get(&player_id).copied();
        let next = match (def.rule, current) {
            (Some(SpellRule::ChargeSurge), Some(charges)) if charges.count > 0 => {
                ElementalCharges {
                    element: charges.element,
                    count: 0,
                }
            }
            (Some(SpellRule::ChargeSurge), _) => return,
            (None, _) if def.element == Element::Neutral => return,
            (None, current) => ElementalCharges {
                element: def.element,
                count: current
                    .map_or(0, |c| c.count)
                    .saturating_add(1)
                    .min(self.env.config.max_elemental_charges),
            },
        };

        if current == Some(next) {
            return;
        }
        self.session.charges.insert(player_id, next);
        out.push(CombatEvent::ChargesChanged {
            player_id,
            charges: next,
        });
    }
}
