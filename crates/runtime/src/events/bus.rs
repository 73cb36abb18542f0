//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use combat_core::CombatEvent;

use super::Envelope;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Creation, roster, readiness, placement and the final outcome
    Session,
    /// Turn started / ended
    Turn,
    /// Movement, casts, damage, statuses, captures and summons
    Action,
    /// Full snapshot broadcasts, including resyncs
    Sync,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Session, Topic::Turn, Topic::Action, Topic::Sync];

    pub fn of(event: &CombatEvent) -> Self {
        match event {
            CombatEvent::CombatCreated { .. }
            | CombatEvent::JoinReady { .. }
            | CombatEvent::CombatUpdated { .. }
            | CombatEvent::PlacementChosen { .. }
            | CombatEvent::PlayerLeft { .. }
            | CombatEvent::CombatEnded { .. } => Topic::Session,
            CombatEvent::TurnStarted { .. } | CombatEvent::TurnEnded { .. } => Topic::Turn,
            CombatEvent::CombatState { .. } => Topic::Sync,
            CombatEvent::UnitMoved { .. }
            | CombatEvent::SpellCast { .. }
            | CombatEvent::DamageApplied { .. }
            | CombatEvent::Healed { .. }
            | CombatEvent::UnitDisplaced { .. }
            | CombatEvent::StatusApplied { .. }
            | CombatEvent::StatusExpired { .. }
            | CombatEvent::CaptureArmed { .. }
            | CombatEvent::CaptureExpired { .. }
            | CombatEvent::MonsterCaptured { .. }
            | CombatEvent::SummonSpawned { .. }
            | CombatEvent::ChargesChanged { .. }
            | CombatEvent::UnitDied { .. } => Topic::Action,
        }
    }
}

/// Topic-based event bus
///
/// Consumers either subscribe to specific topics or to the firehose, which
/// is the only channel that keeps the relative order of envelopes across
/// topics.
#[derive(Clone)]
pub struct EventBus {
    topics: Arc<HashMap<Topic, broadcast::Sender<Envelope>>>,
    all: broadcast::Sender<Envelope>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let topics = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();
        Self {
            topics: Arc::new(topics),
            all: broadcast::channel(capacity).0,
        }
    }

    /// Publish an envelope to its topic and to the firehose.
    pub fn publish(&self, envelope: Envelope) {
        let topic = Topic::of(&envelope.event);
        if let Some(tx) = self.topics.get(&topic)
            && tx.receiver_count() > 0
            && tx.send(envelope.clone()).is_err()
        {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
        if self.all.send(envelope).is_err() {
            tracing::trace!("No firehose subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Envelope> {
        match self.topics.get(&topic) {
            Some(tx) => tx.subscribe(),
            None => self.all.subscribe(),
        }
    }

    /// Subscribe to every envelope in publication order.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Envelope> {
        self.all.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
