//! Grid line of sight.

use crate::state::TilePos;

/// Tiles strictly between `from` and `to` on a Bresenham line.
pub fn line_between(from: TilePos, to: TilePos) -> Vec<TilePos> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    let mut tiles = Vec::new();

    while (x, y) != (to.x, to.y) {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        if (x, y) != (to.x, to.y) {
            tiles.push(TilePos::new(x, y));
        }
    }
    tiles
}

/// True when no tile strictly between the endpoints is an obstacle.
pub fn has_line_of_sight(
    from: TilePos,
    to: TilePos,
    is_obstacle: impl Fn(TilePos) -> bool,
) -> bool {
    line_between(from, to).into_iter().all(|tile| !is_obstacle(tile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_excluded() {
        let from = TilePos::new(0, 0);
        assert!(line_between(from, from).is_empty());
        assert!(line_between(from, TilePos::new(1, 0)).is_empty());
        assert_eq!(
            line_between(from, TilePos::new(3, 0)),
            vec![TilePos::new(1, 0), TilePos::new(2, 0)]
        );
    }

    #[test]
    fn obstacle_on_the_line_blocks_sight() {
        let from = TilePos::new(0, 0);
        let to = TilePos::new(4, 2);
        let wall = line_between(from, to)[1];

        assert!(has_line_of_sight(from, to, |_| false));
        assert!(!has_line_of_sight(from, to, |t| t == wall));
        assert!(has_line_of_sight(from, to, |t| t == to || t == from));
    }
}
