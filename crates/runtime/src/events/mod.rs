//! Topic-based event bus for outbound combat events.
//!
//! The worker wraps every [`combat_core::CombatEvent`] into a sequenced
//! [`Envelope`] and publishes it both to its topic channel and to the
//! firehose channel that preserves global order.

mod bus;
mod envelope;

pub use bus::{EventBus, Topic};
pub use envelope::{Audience, Envelope};
