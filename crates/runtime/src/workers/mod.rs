//! Worker tasks that back the runtime orchestration.
//!
//! The combat worker owns every session mutation. Delayed work (AI movement,
//! turn timeouts) is handed to the scheduler, which feeds it back to the same
//! worker so mutations never interleave.

mod combat;
mod scheduler;

pub use combat::{Command, CombatWorker, WorkerSettings};
pub(crate) use scheduler::{Continuation, Scheduler, TurnTicket};
