//! Special-item policy - which bomb a match spawns and what bombs clear
//!
//! Decision tree for a swapped endpoint whose own match set has 4+ items:
//!
//! 1. 5+ items in a straight shape: color bomb
//! 2. corner shape (L, T or plus): adjacent bomb
//! 3. otherwise: row bomb for a horizontal swap, column bomb for a vertical one

use crate::grid::Grid;
use crate::matcher::MatchSet;
use crate::types::{BombKind, Coord, MatchValue, SwapAxis};

/// Smallest match that spawns any bomb.
pub const BOMB_MIN_MATCH: usize = 4;

/// Smallest straight match that spawns a color bomb.
pub const COLOR_BOMB_MIN_MATCH: usize = 5;

/// True when the set has members sharing the reference member's row and
/// members sharing its column. The reference is the set's first cell.
pub fn is_corner_match(cells: &[Coord]) -> bool {
    let Some((reference, rest)) = cells.split_first() else {
        return false;
    };
    let horizontal = rest
        .iter()
        .any(|c| c.x != reference.x && c.y == reference.y);
    let vertical = rest
        .iter()
        .any(|c| c.x == reference.x && c.y != reference.y);
    horizontal && vertical
}

/// Bomb to spawn for a match of `len` cells.
pub fn bomb_for_match(len: usize, corner: bool, axis: SwapAxis) -> Option<BombKind> {
    if len < BOMB_MIN_MATCH {
        return None;
    }
    if len >= COLOR_BOMB_MIN_MATCH && !corner {
        return Some(BombKind::Color);
    }
    if corner {
        return Some(BombKind::Adjacent);
    }
    match axis {
        SwapAxis::Horizontal => Some(BombKind::Row),
        SwapAxis::Vertical => Some(BombKind::Column),
    }
}

/// Bomb to spawn for a swapped endpoint's match set.
pub fn bomb_for_set(set: &MatchSet, axis: SwapAxis) -> Option<BombKind> {
    bomb_for_match(set.len(), is_corner_match(set.cells()), axis)
}

/// Occupied cells a bomb at `at` clears.
pub fn blast_area(grid: &Grid, at: Coord, kind: BombKind) -> Vec<Coord> {
    match kind {
        BombKind::Row => grid.row_items(at.y),
        BombKind::Column => grid.column_items(at.x),
        BombKind::Adjacent => grid.adjacent_items(at, 1),
        BombKind::Color => Vec::new(),
    }
}

/// Cells cleared by the bombs in `set`.
///
/// Collectibles that are not bomb-clearable are left out even when they sit
/// inside a blast.
pub fn bombed_items(grid: &Grid, set: &MatchSet) -> MatchSet {
    let mut out = MatchSet::new();
    for at in set {
        let Some(kind) = grid.item(*at).and_then(|item| item.bomb_kind()) else {
            continue;
        };
        for c in blast_area(grid, *at, kind) {
            out.insert(c);
        }
    }
    out.retain(|c| {
        grid.item(*c)
            .and_then(|item| item.collectible())
            .map_or(true, |flags| flags.cleared_by_bomb)
    });
    out
}

/// Effect of swapping two items when color bombs are involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSwap {
    /// No color bomb in the swap.
    None,
    /// One color bomb: it takes `value` and every item of that value matches.
    Assign { bomb: Coord, value: MatchValue },
    /// Two color bombs: every item on the board matches.
    FullClear,
}

/// Color-bomb rule for a swap between `a` and `b` (post-swap positions).
pub fn color_swap_rule(grid: &Grid, a: Coord, b: Coord) -> ColorSwap {
    let (Some(first), Some(second)) = (grid.item(a), grid.item(b)) else {
        return ColorSwap::None;
    };
    match (first.is_color_bomb(), second.is_color_bomb()) {
        (true, true) => ColorSwap::FullClear,
        (true, false) => ColorSwap::Assign {
            bomb: a,
            value: second.value,
        },
        (false, true) => ColorSwap::Assign {
            bomb: b,
            value: first.value,
        },
        (false, false) => ColorSwap::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemId};
    use crate::types::{CollectibleFlags, ItemKind};

    fn cells(list: &[(i32, i32)]) -> Vec<Coord> {
        list.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_straight_line_is_not_corner() {
        assert!(!is_corner_match(&cells(&[(0, 0), (1, 0), (2, 0), (3, 0)])));
        assert!(!is_corner_match(&cells(&[(2, 0), (2, 1), (2, 2)])));
        assert!(!is_corner_match(&[]));
    }

    #[test]
    fn test_plus_and_l_are_corners() {
        assert!(is_corner_match(&cells(&[(1, 1), (2, 1), (0, 1), (1, 2), (1, 0)])));
        assert!(is_corner_match(&cells(&[(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)])));
    }

    #[test]
    fn test_decision_tree() {
        use SwapAxis::*;
        assert_eq!(bomb_for_match(3, false, Horizontal), None);
        assert_eq!(bomb_for_match(4, false, Horizontal), Some(BombKind::Row));
        assert_eq!(bomb_for_match(4, false, Vertical), Some(BombKind::Column));
        assert_eq!(bomb_for_match(4, true, Vertical), Some(BombKind::Adjacent));
        assert_eq!(bomb_for_match(5, true, Horizontal), Some(BombKind::Adjacent));
        assert_eq!(bomb_for_match(5, false, Vertical), Some(BombKind::Color));
        assert_eq!(bomb_for_match(7, false, Horizontal), Some(BombKind::Color));
    }

    #[test]
    fn test_row_bomb_blast() {
        let mut grid = Grid::from_rows(&["RGB", "YCM"]);
        grid.item_mut(Coord::new(1, 0)).unwrap().kind = ItemKind::RowBomb;
        let set: MatchSet = [Coord::new(1, 0)].into_iter().collect();
        let bombed = bombed_items(&grid, &set);
        assert_eq!(bombed.sorted(), cells(&[(0, 0), (1, 0), (2, 0)]));
    }

    #[test]
    fn test_blast_spares_unbombable_collectibles() {
        let mut grid = Grid::from_rows(&["R@G", "YCM"]);
        grid.item_mut(Coord::new(1, 0)).unwrap().kind = ItemKind::AdjacentBomb;
        let set: MatchSet = [Coord::new(1, 0)].into_iter().collect();
        let bombed = bombed_items(&grid, &set);
        assert!(!bombed.contains(Coord::new(1, 1)));
        assert_eq!(bombed.len(), 5);

        grid.item_mut(Coord::new(1, 1)).unwrap().kind = ItemKind::Collectible(CollectibleFlags {
            cleared_by_bottom: true,
            cleared_by_bomb: true,
        });
        assert!(bombed_items(&grid, &set).contains(Coord::new(1, 1)));
    }

    #[test]
    fn test_color_swap_rule() {
        let mut grid = Grid::new(2, 1);
        grid.place(
            Item::new(ItemId(1), MatchValue::None, ItemKind::ColorBomb, 20),
            Coord::new(0, 0),
        );
        grid.place(
            Item::new(ItemId(2), MatchValue::Red, ItemKind::Normal, 20),
            Coord::new(1, 0),
        );
        assert_eq!(
            color_swap_rule(&grid, Coord::new(0, 0), Coord::new(1, 0)),
            ColorSwap::Assign {
                bomb: Coord::new(0, 0),
                value: MatchValue::Red
            }
        );

        grid.item_mut(Coord::new(1, 0)).unwrap().kind = ItemKind::ColorBomb;
        assert_eq!(
            color_swap_rule(&grid, Coord::new(0, 0), Coord::new(1, 0)),
            ColorSwap::FullClear
        );
    }
}
