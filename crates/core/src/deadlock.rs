//! Deadlock analyzer - "is there any single swap that makes a match?"
//!
//! For every cell and both axes a window of `window` consecutive cells is
//! examined. When all but one item in the window share a value, the odd one
//! out is the candidate: if one of its edge neighbors (outside the group)
//! carries the group's value, sliding that neighbor in completes a run.
//!
//! This is a local heuristic. It finds the common "slide one piece into a
//! near-match" pattern in O(width * height) and does not prove that a board
//! with no hint is unsolvable.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{Coord, MatchValue, SwapAxis};

/// Largest window the analyzer works with.
const MAX_WINDOW: usize = 8;

/// A move the analyzer found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveHint {
    /// Value of the near-match group.
    pub value: MatchValue,
    /// Cell of the odd item that must be replaced.
    pub target: Coord,
    /// Neighbor that can slide into `target` (`None` when the window is
    /// already a complete match).
    pub source: Option<Coord>,
    /// Axis of the window.
    pub axis: SwapAxis,
}

impl MoveHint {
    /// The swap that realizes this hint, if it needs one.
    pub fn swap(&self) -> Option<(Coord, Coord)> {
        self.source.map(|source| (source, self.target))
    }
}

/// Occupied cells of the window starting at `at` along `axis`.
fn window_cells(grid: &Grid, at: Coord, window: usize, axis: SwapAxis) -> ArrayVec<Coord, MAX_WINDOW> {
    let mut cells = ArrayVec::new();
    for i in 0..window.min(MAX_WINDOW) as i32 {
        let c = match axis {
            SwapAxis::Horizontal => Coord::new(at.x + i, at.y),
            SwapAxis::Vertical => Coord::new(at.x, at.y + i),
        };
        if grid.is_occupied(c) {
            cells.push(c);
        }
    }
    cells
}

/// Largest group of one matchable value holding at least `min` cells.
fn minimum_matches(grid: &Grid, cells: &[Coord], min: usize) -> ArrayVec<Coord, MAX_WINDOW> {
    let mut best = ArrayVec::new();
    for c in cells {
        let Some(value) = grid.item(*c).map(|item| item.value) else {
            continue;
        };
        if !value.is_matchable() {
            continue;
        }
        let group: ArrayVec<Coord, MAX_WINDOW> = cells
            .iter()
            .copied()
            .filter(|other| grid.item(*other).is_some_and(|item| item.value == value))
            .collect();
        if group.len() >= min && group.len() > best.len() {
            best = group;
        }
    }
    best
}

/// Look for a move in the window starting at `at`.
pub fn move_at(grid: &Grid, at: Coord, window: usize, axis: SwapAxis) -> Option<MoveHint> {
    if window < 2 {
        return None;
    }
    let cells = window_cells(grid, at, window, axis);
    if cells.len() != window {
        return None;
    }
    let group = minimum_matches(grid, &cells, window - 1);
    let value = grid.item(*group.first()?)?.value;

    if group.len() >= window {
        return Some(MoveHint {
            value,
            target: at,
            source: None,
            axis,
        });
    }

    let odd = cells.iter().copied().find(|c| !group.contains(c))?;
    let source = grid
        .neighbors(odd)
        .into_iter()
        .filter(|n| !group.contains(n))
        .find(|n| grid.item(*n).is_some_and(|item| item.value == value))?;

    Some(MoveHint {
        value,
        target: odd,
        source: Some(source),
        axis,
    })
}

/// First move found, scanning columns left to right, rows bottom to top,
/// horizontal windows before vertical ones.
pub fn find_move(grid: &Grid, window: usize) -> Option<MoveHint> {
    grid.coords().find_map(|at| {
        move_at(grid, at, window, SwapAxis::Horizontal)
            .or_else(|| move_at(grid, at, window, SwapAxis::Vertical))
    })
}

/// True when no window on either axis yields a move.
pub fn is_deadlocked(grid: &Grid, window: usize) -> bool {
    match find_move(grid, window) {
        Some(hint) => {
            tracing::debug!(
                value = hint.value.as_str(),
                target = %hint.target,
                axis = hint.axis.as_str(),
                "available move"
            );
            false
        }
        None => {
            tracing::info!("board deadlocked");
            true
        }
    }
}
