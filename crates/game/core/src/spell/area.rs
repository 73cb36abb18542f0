//! Tile sets hit by pattern damage.

use crate::env::AreaPattern;
use crate::state::TilePos;

/// Tiles covered by `pattern` when `caster` targets `target`. The target is
/// always first; no tile appears twice.
pub fn expand_area(pattern: AreaPattern, caster: TilePos, target: TilePos) -> Vec<TilePos> {
    let mut tiles = vec![target];
    let mut push = |tile: TilePos| {
        if !tiles.contains(&tile) {
            tiles.push(tile);
        }
    };

    match pattern {
        AreaPattern::Cross { radius } => {
            for r in 1..=radius as i32 {
                push(target.offset(r, 0));
                push(target.offset(-r, 0));
                push(target.offset(0, r));
                push(target.offset(0, -r));
            }
        }
        AreaPattern::FrontCross => {
            let (dx, dy) = facing(caster, target);
            push(target.offset(dx, dy));
            push(target.offset(dy, dx));
            push(target.offset(-dy, -dx));
        }
        AreaPattern::Square { radius } => {
            let r = radius as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    push(target.offset(dx, dy));
                }
            }
        }
        AreaPattern::Line { length } => {
            let (dx, dy) = facing(caster, target);
            for i in 1..length as i32 {
                push(target.offset(dx * i, dy * i));
            }
        }
    }
    tiles
}

/// Axis-aligned direction from caster to target. Targeting one's own tile faces right.
fn facing(caster: TilePos, target: TilePos) -> (i32, i32) {
    match caster.direction_to(target) {
        (0, 0) => (1, 0),
        (dx, 0) => (dx, 0),
        (0, dy) => (0, dy),
        (dx, _) => (dx, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_covers_both_axes() {
        let target = TilePos::new(5, 5);
        let tiles = expand_area(AreaPattern::Cross { radius: 2 }, TilePos::ORIGIN, target);

        assert_eq!(tiles.len(), 9);
        assert_eq!(tiles[0], target);
        assert!(tiles.iter().all(|t| t.is_aligned(target) && t.manhattan(target) <= 2));
    }

    #[test]
    fn front_cross_follows_the_caster_facing() {
        let caster = TilePos::new(0, 0);
        let target = TilePos::new(3, 0);
        let tiles = expand_area(AreaPattern::FrontCross, caster, target);

        assert_eq!(
            tiles,
            vec![
                target,
                TilePos::new(4, 0),
                TilePos::new(3, 1),
                TilePos::new(3, -1),
            ]
        );
    }

    #[test]
    fn square_and_line() {
        let caster = TilePos::new(0, 0);
        let target = TilePos::new(0, 2);

        assert_eq!(expand_area(AreaPattern::Square { radius: 1 }, caster, target).len(), 9);
        assert_eq!(
            expand_area(AreaPattern::Line { length: 3 }, caster, target),
            vec![target, TilePos::new(0, 3), TilePos::new(0, 4)]
        );
    }
}
