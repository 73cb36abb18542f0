//! Pure combat formulas.
//!
//! Everything here is side-effect free: the engine gathers inputs from the
//! session, calls these functions and commits the results through the
//! snapshot.
//!
//! - `roll_damage` / `scale_damage`: elemental damage pipeline
//! - `mitigate`: flat elemental resistance
//! - `effective_pm`: engagement malus on movement points

pub mod damage;
pub mod malus;

pub use damage::{DamageInput, DamageRoll, is_critical, mitigate, roll_damage, scale_damage};
pub use malus::{effective_pm, penalty_percent, penalty_points};
