//! Combat worker that owns every authoritative [`CombatSession`].
//!
//! Receives commands from [`crate::RuntimeHandle`] and continuations from the
//! [`Scheduler`], runs them through [`combat_core::CombatEngine`] one at a
//! time, persists the result and publishes sequenced [`Envelope`]s.

mod ai;
mod commands;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use combat_core::{
    CombatEngine, CombatError, CombatEvent, CombatId, CombatPhase, CombatSession, PlayerId,
    TurnStep, UnitRef,
};

use crate::api::{ClientMessage, CommandOutcome};
use crate::events::{Audience, Envelope, EventBus};
use crate::oracle::OracleManager;
use crate::repository::{ProfileStore, RepositoryError, SessionStore};

use super::{Continuation, Scheduler, TurnTicket};

/// Commands that can be sent to the combat worker
pub enum Command {
    /// A client command attributed to its sender.
    Client {
        message: ClientMessage,
        reply: oneshot::Sender<CommandOutcome>,
    },
    /// Read-only copy of a live session.
    QuerySession {
        combat_id: CombatId,
        reply: oneshot::Sender<Option<CombatSession>>,
    },
    /// Ends a combat with the `aborted` outcome. Replies false if it does not exist.
    Abort {
        combat_id: CombatId,
        reply: oneshot::Sender<bool>,
    },
    /// Replies once no AI walk is waiting to resume. Player timeouts are ignored.
    AwaitSettled { reply: oneshot::Sender<()> },
}

/// Per-combat bookkeeping that never leaves the worker.
#[derive(Default)]
struct CombatTracker {
    seq: u64,
    timer: Option<PendingTimer>,
}

struct PendingTimer {
    handle: AbortHandle,
    /// Set for AI walks, clear for player turn timeouts.
    ai_walk: bool,
}

/// Worker-side settings taken from the runtime configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkerSettings {
    pub player_turn_timeout: Option<Duration>,
    pub rng_seed: Option<u64>,
}

/// Background task that processes combat commands.
pub struct CombatWorker {
    oracles: OracleManager,
    sessions: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileStore>,
    events: EventBus,
    settings: WorkerSettings,
    command_rx: mpsc::Receiver<Command>,
    resume_rx: mpsc::UnboundedReceiver<Continuation>,
    scheduler: Scheduler,
    trackers: HashMap<CombatId, CombatTracker>,
    settle_waiters: Vec<oneshot::Sender<()>>,
    next_combat_id: u64,
}

impl CombatWorker {
    pub fn new(
        oracles: OracleManager,
        sessions: Arc<dyn SessionStore>,
        profiles: Arc<dyn ProfileStore>,
        events: EventBus,
        settings: WorkerSettings,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        let (resume_tx, resume_rx) = mpsc::unbounded_channel();
        Self {
            oracles,
            sessions,
            profiles,
            events,
            settings,
            command_rx,
            resume_rx,
            scheduler: Scheduler::new(resume_tx),
            trackers: HashMap::new(),
            settle_waiters: Vec::new(),
            next_combat_id: 1,
        }
    }

    /// Main worker loop. Returns once every command sender is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(continuation) = self.resume_rx.recv() => {
                    self.resume(continuation);
                }
            }
            self.release_settled();
        }

        for tracker in self.trackers.values_mut() {
            if let Some(timer) = tracker.timer.take() {
                timer.handle.abort();
            }
        }
        debug!(target: "runtime::combat", "combat worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Client { message, reply } => {
                let outcome = self.handle_client(message);
                let _ = reply.send(outcome);
            }
            Command::QuerySession { combat_id, reply } => {
                let session = self.sessions.get(combat_id).unwrap_or_else(|error| {
                    warn!(target: "runtime::combat", %combat_id, %error, "session lookup failed");
                    None
                });
                let _ = reply.send(session);
            }
            Command::Abort { combat_id, reply } => {
                let aborted = self.abort(combat_id).unwrap_or_else(|error| {
                    warn!(target: "runtime::combat", %combat_id, %error, "abort failed");
                    false
                });
                let _ = reply.send(aborted);
            }
            Command::AwaitSettled { reply } => self.settle_waiters.push(reply),
        }
    }

    fn ai_walking(&self) -> bool {
        self.trackers
            .values()
            .any(|tracker| tracker.timer.as_ref().is_some_and(|timer| timer.ai_walk))
    }

    fn release_settled(&mut self) {
        if self.settle_waiters.is_empty() || self.ai_walking() {
            return;
        }
        for waiter in self.settle_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    fn handle_client(&mut self, message: ClientMessage) -> CommandOutcome {
        let player_id = message.player_id;
        let name = message.command.name();
        match self.apply_client(message) {
            Ok(combat_id) => CommandOutcome::Applied { combat_id },
            Err(error) => {
                debug!(
                    target: "runtime::combat",
                    player = %player_id,
                    command = name,
                    code = error.error_code(),
                    severity = error.severity().as_str(),
                    %error,
                    "command rejected"
                );
                CommandOutcome::Rejected {
                    code: error.error_code(),
                    reason: error.to_string(),
                }
            }
        }
    }

    fn abort(&mut self, combat_id: CombatId) -> Result<bool, RepositoryError> {
        let Some(mut session) = self.sessions.get(combat_id)? else {
            return Ok(false);
        };
        let oracles = self.oracles.clone();
        let mut out = Vec::new();
        let step = CombatEngine::new(&mut session, oracles.as_env()).abort(&mut out);
        info!(target: "runtime::combat", %combat_id, "combat aborted");
        self.drive(&mut session, step, &mut out);
        self.commit(session, None, out)?;
        Ok(true)
    }

    /// Runs a scheduled continuation if its turn is still current.
    fn resume(&mut self, continuation: Continuation) {
        let ticket = continuation.ticket();
        let combat_id = ticket.combat_id;
        let session = match self.sessions.get(combat_id) {
            Ok(session) => session,
            Err(error) => {
                warn!(target: "runtime::combat", %combat_id, %error, "session lookup failed");
                self.cancel_timer(combat_id);
                return;
            }
        };
        let Some(mut session) = session.filter(|s| ticket.matches(s)) else {
            debug!(target: "runtime::combat", %combat_id, ?continuation, "stale continuation dropped");
            return;
        };
        if let Some(tracker) = self.trackers.get_mut(&combat_id) {
            tracker.timer = None;
        }

        let oracles = self.oracles.clone();
        let mut out = Vec::new();
        let step = {
            let mut engine = CombatEngine::new(&mut session, oracles.as_env());
            match continuation {
                Continuation::AiPostMove { ticket, target } => {
                    ai::finish_turn(&mut engine, ticket.unit, target, &mut out)
                }
                Continuation::TurnTimeout { ticket } => {
                    let Some(player_id) = ticket.unit.as_player() else {
                        return;
                    };
                    match engine.end_turn(player_id, &mut out) {
                        Ok(step) => {
                            info!(target: "runtime::combat", %combat_id, player = %player_id, "turn timed out");
                            step
                        }
                        Err(error) => {
                            debug!(target: "runtime::combat", %combat_id, %error, "timeout ignored");
                            return;
                        }
                    }
                }
            }
        };

        self.drive(&mut session, step, &mut out);
        if let Err(error) = self.commit(session, None, out) {
            warn!(target: "runtime::combat", %combat_id, %error, "failed to persist continuation");
        }
    }

    /// Plays AI turns until a player has to act, a delay is scheduled or the
    /// combat ends.
    fn drive(&mut self, session: &mut CombatSession, mut step: TurnStep, out: &mut Vec<CombatEvent>) {
        let oracles = self.oracles.clone();
        loop {
            match step {
                TurnStep::Started { unit, ai: false } => {
                    self.arm_turn_timeout(session, unit);
                    return;
                }
                TurnStep::Started { unit, ai: true } => {
                    self.cancel_timer(session.id);
                    let mut engine = CombatEngine::new(session, oracles.as_env());
                    match ai::start_turn(&mut engine, unit, out) {
                        ai::AiProgress::Done(next) => step = next,
                        ai::AiProgress::Walking { target, steps } => {
                            let ticket = TurnTicket::of(session, unit);
                            let delay = Duration::from_millis(
                                oracles.config().step_duration_ms.saturating_mul(steps as u64),
                            );
                            self.set_timer(ticket, delay, Continuation::AiPostMove { ticket, target });
                            return;
                        }
                        ai::AiProgress::Stalled => return,
                    }
                }
                TurnStep::Ended(_) | TurnStep::Idle => {
                    self.cancel_timer(session.id);
                    return;
                }
            }
        }
    }

    fn arm_turn_timeout(&mut self, session: &CombatSession, unit: UnitRef) {
        self.cancel_timer(session.id);
        if let Some(timeout) = self.settings.player_turn_timeout {
            let ticket = TurnTicket::of(session, unit);
            self.set_timer(ticket, timeout, Continuation::TurnTimeout { ticket });
        }
    }

    fn set_timer(&mut self, ticket: TurnTicket, delay: Duration, continuation: Continuation) {
        let ai_walk = matches!(continuation, Continuation::AiPostMove { .. });
        let handle = self.scheduler.schedule(delay, continuation);
        let tracker = self.trackers.entry(ticket.combat_id).or_default();
        if let Some(previous) = tracker.timer.replace(PendingTimer { handle, ai_walk }) {
            previous.handle.abort();
        }
    }

    fn cancel_timer(&mut self, combat_id: CombatId) {
        if let Some(timer) = self
            .trackers
            .get_mut(&combat_id)
            .and_then(|tracker| tracker.timer.take())
        {
            timer.handle.abort();
        }
    }

    /// Persists the session and publishes its events. An ended session is
    /// torn down instead: profiles are written back and the session is removed.
    fn commit(
        &mut self,
        session: CombatSession,
        sender: Option<PlayerId>,
        out: Vec<CombatEvent>,
    ) -> Result<(), RepositoryError> {
        if session.phase != CombatPhase::Ended {
            self.sessions.save(&session)?;
            self.publish(session.id, sender, out);
            return Ok(());
        }

        self.publish(session.id, sender, out);
        self.cancel_timer(session.id);
        self.trackers.remove(&session.id);
        for participant in &session.participants {
            self.profiles.put(participant.profile.clone())?;
        }
        self.sessions.delete(session.id)?;
        info!(
            target: "runtime::combat",
            combat_id = %session.id,
            outcome = ?session.outcome,
            rounds = session.round,
            "combat closed"
        );
        Ok(())
    }

    fn publish(&mut self, combat_id: CombatId, sender: Option<PlayerId>, out: Vec<CombatEvent>) {
        let tracker = self.trackers.entry(combat_id).or_default();
        for event in out {
            tracker.seq += 1;
            let audience = match (&event, sender) {
                (CombatEvent::JoinReady { .. }, Some(player)) => Audience::Player(player),
                _ => Audience::Participants,
            };
            self.events.publish(Envelope {
                combat_id,
                seq: tracker.seq,
                audience,
                event,
            });
        }
    }
}
