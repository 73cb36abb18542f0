//! Decision providers for units the server plays itself.

pub mod ai;

pub use ai::{AiContext, AiPlan, plan_turn};
