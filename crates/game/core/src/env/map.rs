use std::collections::HashSet;
use std::sync::Arc;

use crate::state::{MapId, TilePos};

/// Bounds and blocked tiles of one map, extracted from level data.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionMap {
    pub width: u32,
    pub height: u32,
    pub blocked: HashSet<TilePos>,
}

impl CollisionMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blocked: HashSet::new(),
        }
    }

    pub fn with_blocked(mut self, tiles: impl IntoIterator<Item = TilePos>) -> Self {
        self.blocked.extend(tiles);
        self
    }

    pub fn contains(&self, tile: TilePos) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as u32) < self.width && (tile.y as u32) < self.height
    }

    pub fn is_blocked(&self, tile: TilePos) -> bool {
        self.blocked.contains(&tile)
    }

    /// In bounds and not blocked by terrain.
    pub fn is_walkable(&self, tile: TilePos) -> bool {
        self.contains(tile) && !self.is_blocked(tile)
    }
}

/// Collision lookup by map id. Implementations are expected to memoize.
pub trait MapOracle: Send + Sync {
    fn collision(&self, map: &MapId) -> Option<Arc<CollisionMap>>;
}
