use std::cmp::Ordering;

use crate::state::{CombatIndex, EntityId, PlayerId, Side, SummonId, UnitRef};

/// Kind-specific identity of a turn-taking unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum ActorKind {
    Player {
        player_id: PlayerId,
    },
    Monster {
        entity_id: EntityId,
        combat_index: CombatIndex,
    },
    Summon {
        summon_id: SummonId,
        owner: PlayerId,
    },
}

/// Entry of the actor order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: ActorKind,
    pub initiative: i32,
    pub level: u32,
}

impl Actor {
    pub fn player(player_id: PlayerId, initiative: i32, level: u32) -> Self {
        Self {
            kind: ActorKind::Player { player_id },
            initiative,
            level,
        }
    }

    pub fn monster(
        entity_id: EntityId,
        combat_index: CombatIndex,
        initiative: i32,
        level: u32,
    ) -> Self {
        Self {
            kind: ActorKind::Monster {
                entity_id,
                combat_index,
            },
            initiative,
            level,
        }
    }

    pub fn summon(summon_id: SummonId, owner: PlayerId, initiative: i32, level: u32) -> Self {
        Self {
            kind: ActorKind::Summon { summon_id, owner },
            initiative,
            level,
        }
    }

    pub fn unit(&self) -> UnitRef {
        match self.kind {
            ActorKind::Player { player_id } => UnitRef::Player(player_id),
            ActorKind::Monster { combat_index, .. } => UnitRef::Monster(combat_index),
            ActorKind::Summon { summon_id, .. } => UnitRef::Summon(summon_id),
        }
    }

    pub fn side(&self) -> Side {
        self.unit().side()
    }

    /// Owning player of a summon.
    pub fn owner(&self) -> Option<PlayerId> {
        match self.kind {
            ActorKind::Summon { owner, .. } => Some(owner),
            _ => None,
        }
    }

    pub fn is_ai_controlled(&self) -> bool {
        !matches!(self.kind, ActorKind::Player { .. })
    }

    fn kind_rank(&self) -> u8 {
        match self.kind {
            ActorKind::Player { .. } => 0,
            ActorKind::Monster { .. } => 1,
            ActorKind::Summon { .. } => 2,
        }
    }

    /// Total turn priority: initiative descending, level descending, then id
    /// ascending. `Ordering::Less` means `self` plays first.
    pub fn priority_cmp(&self, other: &Actor) -> Ordering {
        other
            .initiative
            .cmp(&self.initiative)
            .then_with(|| other.level.cmp(&self.level))
            .then_with(|| self.unit().numeric_id().cmp(&other.unit().numeric_id()))
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_prefers_initiative_then_level_then_id() {
        let fast = Actor::player(PlayerId(9), 20, 1);
        let slow_high = Actor::player(PlayerId(1), 10, 50);
        let slow_low = Actor::player(PlayerId(2), 10, 10);
        let slow_low_later = Actor::player(PlayerId(3), 10, 10);

        let mut actors = vec![slow_low_later, slow_low, fast, slow_high];
        actors.sort_by(Actor::priority_cmp);

        assert_eq!(actors, vec![fast, slow_high, slow_low, slow_low_later]);
    }
}
