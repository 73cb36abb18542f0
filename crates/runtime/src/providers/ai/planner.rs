//! Target selection and greedy pathing.

use combat_core::{TilePos, UnitRef};

use super::AiContext;

/// Movement decision for one AI turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiPlan {
    pub target: UnitRef,
    pub target_tile: TilePos,
    /// Steps to walk, excluding the starting tile. Empty when already in place
    /// or boxed in.
    pub path: Vec<TilePos>,
}

/// Nearest living prey by Manhattan distance. Ties go to the first unit in
/// snapshot order.
pub fn nearest_target(ctx: &AiContext<'_>) -> Option<(UnitRef, TilePos)> {
    ctx.snapshot
        .living()
        .filter(|c| ctx.is_prey(c.unit()))
        .map(|c| (c.unit(), c.tile()))
        .min_by_key(|(_, tile)| ctx.origin.manhattan(*tile))
}

/// Free tile next to `target` closest to the actor.
///
/// The actor's own tile qualifies, in which case no move is needed.
pub fn approach_tile(ctx: &AiContext<'_>, target: TilePos) -> Option<TilePos> {
    target
        .neighbors4()
        .into_iter()
        .filter(|tile| *tile == ctx.origin || ctx.is_open(*tile))
        .min_by_key(|tile| ctx.origin.manhattan(*tile))
}

/// Walks towards `goal` one tile at a time, at most `budget` steps.
///
/// Each step moves along the axis with the larger remaining delta, falling
/// back to the other axis when that tile is taken. Stops early when neither
/// step is open.
pub fn greedy_path(ctx: &mut AiContext<'_>, goal: TilePos, budget: u32) -> Vec<TilePos> {
    let mut path = Vec::new();
    let mut current = ctx.origin;

    while current != goal && (path.len() as u32) < budget {
        let dx = goal.x - current.x;
        let dy = goal.y - current.y;
        let horizontal = (dx != 0).then(|| current.offset(dx.signum(), 0));
        let vertical = (dy != 0).then(|| current.offset(0, dy.signum()));
        let candidates = if dx.abs() >= dy.abs() {
            [horizontal, vertical]
        } else {
            [vertical, horizontal]
        };

        let Some(next) = candidates
            .into_iter()
            .flatten()
            .find(|tile| ctx.is_open(*tile))
        else {
            break;
        };
        ctx.block(next);
        path.push(next);
        current = next;
    }
    path
}

/// Full movement decision. `None` when there is nothing to hunt.
pub fn plan_turn(ctx: &mut AiContext<'_>, movement_points: u32) -> Option<AiPlan> {
    let (target, target_tile) = nearest_target(ctx)?;
    let path = match approach_tile(ctx, target_tile) {
        Some(goal) => greedy_path(ctx, goal, movement_points),
        None => Vec::new(),
    };
    Some(AiPlan {
        target,
        target_tile,
        path,
    })
}
