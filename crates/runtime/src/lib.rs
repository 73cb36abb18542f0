//! Authoritative server runtime for tile-based combat.
//!
//! This crate wires together the content oracles, repositories, the AI
//! controller and the combat worker into a cohesive runtime API. Servers embed
//! [`Runtime`] to feed client commands in and subscribe to outbound events
//! through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`providers`] holds the AI decision logic for monsters and summons
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
//! - `workers` keeps the combat worker and its scheduler internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod providers;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{
    ClientCommand, ClientMessage, CommandError, CommandOutcome, Result, RuntimeError,
    RuntimeHandle,
};
pub use events::{Audience, Envelope, EventBus, Topic};
pub use oracle::{NoMaps, OracleManager};
pub use repository::{
    InMemoryProfileStore, InMemorySessionStore, ProfileStore, RepositoryError, SessionStore,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
