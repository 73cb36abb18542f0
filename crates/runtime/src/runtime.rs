//! High-level runtime orchestrator.
//!
//! The runtime owns the combat worker, wires up command/event channels, and
//! exposes a builder-based API for servers to feed client commands in.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use combat_core::CombatConfig;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::oracle::OracleManager;
use crate::repository::{InMemoryProfileStore, InMemorySessionStore, ProfileStore, SessionStore};
use crate::workers::{Command, CombatWorker, WorkerSettings};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Rule configuration. Replaces whatever the oracles were built with.
    pub combat: CombatConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Force-end a player's turn after this long. Disabled when `None`.
    pub player_turn_timeout_ms: Option<u64>,
    /// Seed for combats whose start command carries none. Random when `None`.
    pub rng_seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 256,
            command_buffer_size: 32,
            player_turn_timeout_ms: None,
            rng_seed: None,
        }
    }
}

/// Main runtime that orchestrates combat sessions
///
/// Design: Runtime owns the worker and coordinates execution.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every handle clone is dropped; pending
    /// continuations are cancelled.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleManager>,
    sessions: Option<Arc<dyn SessionStore>>,
    profiles: Option<Arc<dyn ProfileStore>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            sessions: None,
            profiles: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Session registry. Defaults to an in-memory store.
    pub fn session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Player profiles. Defaults to an empty in-memory store.
    pub fn profile_store(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Build the runtime and spawn its worker
    pub fn build(self) -> Result<Runtime> {
        let oracles = self
            .oracles
            .ok_or(RuntimeError::MissingOracles)?
            .with_config(self.config.combat.clone());
        let sessions: Arc<dyn SessionStore> = match self.sessions {
            Some(sessions) => sessions,
            None => Arc::new(InMemorySessionStore::new()),
        };
        let profiles: Arc<dyn ProfileStore> = match self.profiles {
            Some(profiles) => profiles,
            None => Arc::new(InMemoryProfileStore::new()),
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let settings = WorkerSettings {
            player_turn_timeout: self.config.player_turn_timeout_ms.map(Duration::from_millis),
            rng_seed: self.config.rng_seed,
        };
        let worker = CombatWorker::new(oracles, sessions, profiles, event_bus, settings, command_rx);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
