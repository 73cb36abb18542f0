//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or infrastructure.

pub mod commands;
pub mod errors;
pub mod handle;

pub use commands::{ClientCommand, ClientMessage, CommandOutcome};
pub use errors::{CommandError, Result, RuntimeError};
pub use handle::RuntimeHandle;
