use serde::Serialize;

use crate::board::{Board, Phase};
use crate::grid::Tile;
use crate::item::Item;
use crate::types::Coord;

/// Serializable copy of a board's visible state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major, bottom row first.
    pub tiles: Vec<Tile>,
    /// Column by column, bottom first.
    pub items: Vec<Item>,
    /// Text dump, top row first (see [`crate::Grid::to_rows`]).
    pub rows: Vec<String>,
    pub phase: Phase,
    pub multiplier: u32,
    pub collectible_count: u32,
    pub busy: bool,
}

impl BoardSnapshot {
    pub fn capture(board: &Board) -> Self {
        let grid = board.grid();
        let tiles = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| Coord::new(x, y)))
            .filter_map(|at| grid.tile(at))
            .collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            tiles,
            items: grid.items().copied().collect(),
            rows: grid.to_rows(),
            phase: board.phase(),
            multiplier: board.multiplier(),
            collectible_count: board.collectible_count(),
            busy: board.is_busy(),
        }
    }

    pub fn tile_at(&self, at: Coord) -> Option<Tile> {
        if at.x < 0 || at.x >= self.width || at.y < 0 || at.y >= self.height {
            return None;
        }
        self.tiles.get((at.y * self.width + at.x) as usize).copied()
    }

    pub fn item_at(&self, at: Coord) -> Option<&Item> {
        self.items.iter().find(|item| item.coord == at)
    }

    /// Idle and accepting swaps.
    pub fn playable(&self) -> bool {
        !self.busy
    }
}
