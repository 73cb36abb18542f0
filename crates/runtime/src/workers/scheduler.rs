//! Cancellable delayed continuations.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use combat_core::{CombatId, CombatSession, UnitRef};

/// Identifies the turn a continuation was scheduled for.
///
/// A continuation whose ticket no longer matches its session is stale and is
/// dropped without effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TurnTicket {
    pub combat_id: CombatId,
    pub epoch: u64,
    pub round: u32,
    pub actor_index: usize,
    pub unit: UnitRef,
}

impl TurnTicket {
    pub fn of(session: &CombatSession, unit: UnitRef) -> Self {
        Self {
            combat_id: session.id,
            epoch: session.epoch,
            round: session.round,
            actor_index: session.actor_index,
            unit,
        }
    }

    pub fn matches(&self, session: &CombatSession) -> bool {
        session.id == self.combat_id
            && session.epoch == self.epoch
            && session.round == self.round
            && session.actor_index == self.actor_index
            && session.active == Some(self.unit)
    }
}

/// Work re-entering the combat worker after a delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Continuation {
    /// The AI unit finished walking; decide whether to attack.
    AiPostMove { ticket: TurnTicket, target: UnitRef },
    /// The active player ran out of time.
    TurnTimeout { ticket: TurnTicket },
}

impl Continuation {
    pub fn ticket(&self) -> TurnTicket {
        match self {
            Self::AiPostMove { ticket, .. } | Self::TurnTimeout { ticket } => *ticket,
        }
    }
}

/// Spawns sleep-then-send tasks onto the runtime.
#[derive(Clone)]
pub(crate) struct Scheduler {
    resume_tx: mpsc::UnboundedSender<Continuation>,
}

impl Scheduler {
    pub fn new(resume_tx: mpsc::UnboundedSender<Continuation>) -> Self {
        Self { resume_tx }
    }

    /// Delivers `continuation` after `delay`. Aborting the handle cancels it.
    pub fn schedule(&self, delay: Duration, continuation: Continuation) -> AbortHandle {
        let resume_tx = self.resume_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = resume_tx.send(continuation);
        })
        .abort_handle()
    }
}
