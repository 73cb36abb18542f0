//! Server-side AI for monsters and summons.
//!
//! The controller is deliberately simple and fully deterministic:
//!
//! 1. **Target**: the nearest living opponent by Manhattan distance. Monsters
//!    hunt players only; summons hunt monsters only.
//! 2. **Approach tile**: the free 4-neighbour of the target closest to the
//!    actor. The actor's own tile counts, so an adjacent unit stays put.
//! 3. **Path**: greedy steps towards the approach tile, at most one per
//!    movement point, each step reducing the remaining distance.
//!
//! Spell selection happens after the move in the combat worker, which owns
//! the engine.

pub mod context;
pub mod planner;

pub use context::AiContext;
pub use planner::{AiPlan, approach_tile, greedy_path, nearest_target, plan_turn};
