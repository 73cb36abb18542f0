//! Static combat content and the loaders that read it from disk.
//!
//! - Spell, monster and class catalogs (RON)
//! - Player profiles used to seed the profile store (RON)
//! - Combat rule configuration (TOML)
//! - Level data reduced to collision maps (Tiled-style JSON), memoized per map
//!
//! Content is consumed through the `combat-core` catalog and map oracle traits
//! and never appears in session state.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod collision;
#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::ContentCatalog;

#[cfg(feature = "loaders")]
pub use collision::CollisionCache;
#[cfg(feature = "loaders")]
pub use loaders::{
    ClassLoader, ConfigLoader, ContentFactory, LevelLoader, LoadResult, MonsterLoader,
    ProfileLoader, SpellLoader,
};
