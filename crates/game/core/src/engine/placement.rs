//! Pattern-based unit placement when combat starts.

use std::collections::HashSet;

use crate::event::CombatEvent;
use crate::state::{CombatIndex, PlayerId, TilePos, UnitRef};

use super::CombatEngine;

/// Search radius used when no map bounds are known.
const UNBOUNDED_SEARCH_RADIUS: u32 = 32;

/// Tiles at exactly Manhattan distance `radius` from `center`, in a fixed order.
fn ring(center: TilePos, radius: u32) -> Vec<TilePos> {
    if radius == 0 {
        return vec![center];
    }
    let r = radius as i32;
    let mut tiles = Vec::with_capacity(4 * radius as usize);
    for dx in -r..=r {
        let dy = r - dx.abs();
        tiles.push(center.offset(dx, dy));
        if dy != 0 {
            tiles.push(center.offset(dx, -dy));
        }
    }
    tiles
}

/// Closest tile to `start` accepted by `is_free`, searching ring by ring.
pub fn nearest_free_tile(
    start: TilePos,
    max_radius: u32,
    is_free: impl Fn(TilePos) -> bool,
) -> Option<TilePos> {
    (0..=max_radius).find_map(|radius| ring(start, radius).into_iter().find(|t| is_free(*t)))
}

impl CombatEngine<'_, '_> {
    fn search_radius(&self) -> u32 {
        self.session
            .collision
            .as_ref()
            .map_or(UNBOUNDED_SEARCH_RADIUS, |map| map.width + map.height)
    }

    /// Terrain check only: in bounds and unblocked, or anything without a map.
    pub(crate) fn is_placeable(&self, tile: TilePos) -> bool {
        self.session
            .collision
            .as_ref()
            .is_none_or(|map| map.is_walkable(tile))
    }

    /// Nearest free tile to `preferred`, ignoring tiles in `taken`.
    pub(crate) fn free_tile_near(
        &self,
        preferred: TilePos,
        taken: &HashSet<TilePos>,
        except: Option<UnitRef>,
    ) -> Option<TilePos> {
        nearest_free_tile(preferred, self.search_radius(), |tile| {
            !taken.contains(&tile) && self.is_free(tile, except)
        })
    }

    /// Assigns starting tiles to every player and monster.
    ///
    /// Players keep a legal chosen tile, otherwise take their pattern slot.
    /// Monsters take the slot of their combat index around the monster anchor.
    /// Taken or illegal slots fall back to the nearest free tile.
    pub(crate) fn apply_placement(&mut self, out: &mut Vec<CombatEvent>) {
        let placement = self.env.config.placement.clone();
        let origin = self.session.origin;
        let mut taken: HashSet<TilePos> = HashSet::new();
        let mut moves: Vec<(UnitRef, TilePos)> = Vec::new();

        let players: Vec<(PlayerId, Option<TilePos>)> = self
            .session
            .participants
            .iter()
            .filter(|p| !p.left)
            .map(|p| (p.player_id(), p.chosen_tile))
            .collect();
        for (slot, (player_id, chosen)) in players.into_iter().enumerate() {
            let preferred = chosen
                .filter(|tile| self.is_placeable(*tile))
                .or_else(|| placement.player_slot(origin, slot))
                .unwrap_or(origin);
            let unit = UnitRef::Player(player_id);
            if let Some(tile) = self.pick_tile(preferred, &taken) {
                taken.insert(tile);
                moves.push((unit, tile));
            }
        }

        let mobs: Vec<CombatIndex> = self
            .session
            .mob_entries
            .iter()
            .map(|m| m.combat_index)
            .collect();
        for (slot, index) in mobs.into_iter().enumerate() {
            let preferred = placement
                .monster_slot(origin, slot)
                .unwrap_or_else(|| origin.offset(placement.monster_anchor.0, placement.monster_anchor.1));
            let unit = UnitRef::Monster(index);
            if let Some(tile) = self.pick_tile(preferred, &taken) {
                taken.insert(tile);
                moves.push((unit, tile));
            }
        }

        for (unit, tile) in moves {
            self.place_unit(unit, tile);
            if let UnitRef::Monster(index) = unit
                && let Some(mob) = self
                    .session
                    .mob_entries
                    .iter_mut()
                    .find(|m| m.combat_index == index)
            {
                mob.tile = tile;
            }
        }
        out.push(self.state_event(false));
    }

    fn pick_tile(&self, preferred: TilePos, taken: &HashSet<TilePos>) -> Option<TilePos> {
        if !taken.contains(&preferred) && self.is_placeable(preferred) {
            return Some(preferred);
        }
        nearest_free_tile(preferred, self.search_radius(), |tile| {
            !taken.contains(&tile) && self.is_placeable(tile)
        })
    }
}
