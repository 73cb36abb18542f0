//! Repository layer for dynamic runtime data.
//!
//! - Live combat sessions, keyed by combat id
//! - Player profiles, read at join time and written back when a combat ends
//!
//! Static content (spells, monsters, maps) is served by oracles, not repositories.

mod error;
mod in_memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use in_memory::{InMemoryProfileStore, InMemorySessionStore};
pub use traits::{ProfileStore, SessionStore};
