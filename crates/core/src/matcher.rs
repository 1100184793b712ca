//! Match finder - directional run scans over the grid
//!
//! A run starts at an occupied cell and walks in one direction while the
//! next item carries the same match value. Horizontal matches join the
//! leftward and rightward rays through the start cell, vertical matches the
//! upward and downward rays. `MatchValue::None` never extends a run.
//!
//! All functions here are read-only over [`Grid`].

use crate::grid::Grid;
use crate::types::{Coord, Direction};

/// Minimum length each half-ray needs before the halves are joined.
const RAY_MIN: usize = 2;

/// Ordered, de-duplicated set of cells.
///
/// Insertion order is kept: the first cell is the reference member used by
/// the corner-shape test in [`crate::policy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    cells: Vec<Coord>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell; returns false if already present.
    pub fn insert(&mut self, at: Coord) -> bool {
        if self.cells.contains(&at) {
            return false;
        }
        self.cells.push(at);
        true
    }

    /// Union `other` into `self`, keeping `self`'s order first.
    pub fn union(&mut self, other: &MatchSet) {
        for c in &other.cells {
            self.insert(*c);
        }
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.cells.contains(&at)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn first(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coord> + '_ {
        self.cells.iter()
    }

    pub fn retain(&mut self, f: impl FnMut(&Coord) -> bool) {
        self.cells.retain(f);
    }

    /// Cells sorted by (x, y), for order-insensitive comparisons.
    pub fn sorted(&self) -> Vec<Coord> {
        let mut cells = self.cells.clone();
        cells.sort_unstable();
        cells
    }
}

impl FromIterator<Coord> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut set = MatchSet::new();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Coord;
    type IntoIter = std::slice::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Walk from `start` along `dir` collecting same-value items.
///
/// Walks at most `max(width, height) - 1` steps and stops at the first empty
/// cell, boundary or mismatch. Returns the run (start included) when it has at
/// least `min_len` cells, otherwise an empty set.
pub fn find_run(grid: &Grid, start: Coord, dir: Direction, min_len: usize) -> MatchSet {
    let mut run = MatchSet::new();
    let Some(first) = grid.item(start) else {
        return run;
    };
    run.insert(start);

    let max_steps = grid.width().max(grid.height());
    for step in 1..max_steps {
        let next = start.offset(dir, step);
        let Some(item) = grid.item(next) else {
            break;
        };
        if item.value == first.value && item.value.is_matchable() {
            run.insert(next);
        } else {
            break;
        }
    }

    if run.len() >= min_len {
        run
    } else {
        MatchSet::new()
    }
}

fn join_rays(grid: &Grid, at: Coord, dirs: [Direction; 2], min_len: usize) -> MatchSet {
    let mut combined = find_run(grid, at, dirs[0], RAY_MIN);
    combined.union(&find_run(grid, at, dirs[1], RAY_MIN));
    if combined.len() >= min_len {
        combined
    } else {
        MatchSet::new()
    }
}

/// Horizontal run through `at` (rightward ray first, then leftward).
pub fn horizontal_matches(grid: &Grid, at: Coord, min_len: usize) -> MatchSet {
    join_rays(grid, at, [Direction::Right, Direction::Left], min_len)
}

/// Vertical run through `at` (upward ray first, then downward).
pub fn vertical_matches(grid: &Grid, at: Coord, min_len: usize) -> MatchSet {
    join_rays(grid, at, [Direction::Up, Direction::Down], min_len)
}

/// Every item matched through `at` on either axis.
pub fn matches_at(grid: &Grid, at: Coord, min_len: usize) -> MatchSet {
    let mut set = horizontal_matches(grid, at, min_len);
    set.union(&vertical_matches(grid, at, min_len));
    set
}

/// Union of [`matches_at`] over several cells.
pub fn matches_at_many<'a>(
    grid: &Grid,
    cells: impl IntoIterator<Item = &'a Coord>,
    min_len: usize,
) -> MatchSet {
    let mut set = MatchSet::new();
    for c in cells {
        set.union(&matches_at(grid, *c, min_len));
    }
    set
}

/// Whole-board scan.
pub fn find_all_matches(grid: &Grid, min_len: usize) -> MatchSet {
    let mut set = MatchSet::new();
    for at in grid.coords() {
        set.union(&matches_at(grid, at, min_len));
    }
    set
}

/// True if the item at `at` already completes a leftward or downward run.
///
/// Fill runs column by column from the bottom, so only the already filled
/// side (left, below) can complete a run.
pub fn has_match_on_fill(grid: &Grid, at: Coord, min_len: usize) -> bool {
    !find_run(grid, at, Direction::Left, min_len).is_empty()
        || !find_run(grid, at, Direction::Down, min_len).is_empty()
}
