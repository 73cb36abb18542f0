use serde::{Deserialize, Serialize};

use combat_core::{CombatEvent, CombatId, PlayerId};

/// Who an envelope is meant for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Every current participant of the combat.
    Participants,
    /// A single player, e.g. the one who just joined.
    Player(PlayerId),
}

/// A combat event with its per-combat sequence number.
///
/// `seq` starts at 1 and increases by one for every envelope of the combat,
/// whatever its audience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub combat_id: CombatId,
    pub seq: u64,
    pub audience: Audience,
    #[serde(flatten)]
    pub event: CombatEvent,
}

impl Envelope {
    /// Whether `player` should receive this envelope, given the combat's
    /// participants at send time.
    pub fn is_for(&self, player: PlayerId, participants: &[PlayerId]) -> bool {
        match self.audience {
            Audience::Participants => participants.contains(&player),
            Audience::Player(target) => target == player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{CombatOutcome, UnitRef};

    #[test]
    fn envelopes_flatten_the_event_tag() {
        let envelope = Envelope {
            combat_id: CombatId(3),
            seq: 12,
            audience: Audience::Participants,
            event: CombatEvent::CombatEnded {
                outcome: CombatOutcome::Victory,
            },
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "combat_ended");
        assert_eq!(json["seq"], 12);
        assert_eq!(json["outcome"], "victory");

        let unicast = Envelope {
            audience: Audience::Player(PlayerId(2)),
            event: CombatEvent::TurnEnded {
                unit: UnitRef::Player(PlayerId(2)),
            },
            ..envelope
        };
        assert!(unicast.is_for(PlayerId(2), &[]));
        assert!(!unicast.is_for(PlayerId(1), &[PlayerId(1), PlayerId(2)]));
    }
}
