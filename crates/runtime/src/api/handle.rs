//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! submitting client commands or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{CombatId, CombatSession};

use super::commands::{ClientMessage, CommandOutcome};
use super::errors::{Result, RuntimeError};
use crate::events::{Envelope, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Submit a client command and wait until the worker has processed it.
    ///
    /// A rejected command is not an error: it comes back as
    /// [`CommandOutcome::Rejected`] and nothing is broadcast.
    pub async fn submit(&self, message: ClientMessage) -> Result<CommandOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Client {
                message,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Copy of a live session, `None` once it has ended.
    pub async fn session(&self, combat_id: CombatId) -> Result<Option<CombatSession>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QuerySession {
                combat_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Ends a combat with the `aborted` outcome. Returns false if it does not exist.
    pub async fn abort(&self, combat_id: CombatId) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Abort {
                combat_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Resolves once no AI turn is waiting on a walk to finish.
    ///
    /// Armed player turn timeouts do not count, so this never waits on a human.
    pub async fn settled(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::AwaitSettled { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to envelopes from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Session` - Creation, roster, readiness and outcome
    /// - `Topic::Turn` - Turn started / ended
    /// - `Topic::Action` - Movement, casts, damage and their consequences
    /// - `Topic::Sync` - Full snapshots, including resyncs
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Envelope> {
        self.event_bus.subscribe(topic)
    }

    /// Every envelope, in publication order.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Envelope> {
        self.event_bus.subscribe_all()
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
