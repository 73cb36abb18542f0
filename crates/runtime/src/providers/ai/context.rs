//! Read-only board view for one AI decision.

use std::collections::HashSet;

use combat_core::{CollisionMap, Snapshot, TilePos, UnitRef};

/// Everything the planner looks at while deciding one turn.
///
/// `blocked` holds the tile of every living unit except the actor itself;
/// terrain comes from the map. The planner adds tiles to it as it steps so a path never
/// crosses itself.
pub struct AiContext<'a> {
    pub unit: UnitRef,
    pub origin: TilePos,
    pub snapshot: &'a Snapshot,
    pub map: &'a CollisionMap,
    blocked: HashSet<TilePos>,
}

impl<'a> AiContext<'a> {
    /// Returns `None` when the unit is dead or missing from the snapshot.
    pub fn new(unit: UnitRef, snapshot: &'a Snapshot, map: &'a CollisionMap) -> Option<Self> {
        if !snapshot.is_alive(unit) {
            return None;
        }
        let origin = snapshot.tile_of(unit)?;
        let blocked = snapshot.occupied_tiles(Some(unit));
        Some(Self {
            unit,
            origin,
            snapshot,
            map,
            blocked,
        })
    }

    /// In bounds, walkable and not held by another unit.
    pub fn is_open(&self, tile: TilePos) -> bool {
        self.map.is_walkable(tile) && !self.blocked.contains(&tile)
    }

    pub(crate) fn block(&mut self, tile: TilePos) {
        self.blocked.insert(tile);
    }

    /// Whether `other` is a unit this actor hunts.
    pub fn is_prey(&self, other: UnitRef) -> bool {
        match self.unit {
            UnitRef::Monster(_) => matches!(other, UnitRef::Player(_)),
            UnitRef::Summon(_) => matches!(other, UnitRef::Monster(_)),
            UnitRef::Player(_) => false,
        }
    }
}
