//! Shuffle engine - permute the normal items of a deadlocked board
//!
//! Bombs and collectibles stay where they are. Normal items are lifted off
//! the grid, permuted, and dropped back into the free cells column by column,
//! rotating the queue whenever an item would land in a ready-made match.

use std::collections::{HashMap, VecDeque};

use crate::grid::Grid;
use crate::item::{Item, ItemId};
use crate::matcher::has_match_on_fill;
use crate::rng::SimpleRng;
use crate::types::Coord;

/// An item that changed cells during a shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub id: ItemId,
    pub from: Coord,
    pub to: Coord,
}

/// Take every normal (non-bomb, non-collectible) item off the grid.
pub fn remove_normal_items(grid: &mut Grid) -> Vec<Item> {
    let cells: Vec<Coord> = grid
        .items()
        .filter(|item| item.is_normal())
        .map(|item| item.coord)
        .collect();
    cells.into_iter().filter_map(|c| grid.clear(c)).collect()
}

/// Fill the free cells from `items`, avoiding immediate matches.
///
/// Each cell tries queue entries until one does not complete a run, giving
/// up after `max_iterations` rotations and keeping the last candidate.
/// Returns the items that did not fit (empty unless the grid had fewer free
/// cells than items).
pub fn fill_from_list(
    grid: &mut Grid,
    items: Vec<Item>,
    min_match: usize,
    max_iterations: u32,
) -> Vec<Item> {
    let mut queue: VecDeque<Item> = items.into();
    let cells: Vec<Coord> = grid.coords().collect();

    for at in cells {
        if !grid.is_fillable(at) {
            continue;
        }
        let Some(item) = queue.pop_front() else {
            break;
        };
        grid.place(item, at);

        let mut iterations = 0;
        while has_match_on_fill(grid, at, min_match) {
            let Some(rejected) = grid.clear(at) else {
                break;
            };
            queue.push_back(rejected);
            let Some(next) = queue.pop_front() else {
                break;
            };
            grid.place(next, at);
            iterations += 1;
            if iterations >= max_iterations {
                tracing::trace!(%at, "shuffle fill gave up avoiding a match");
                break;
            }
        }
    }

    queue.into()
}

/// Shuffle the board's normal items in place.
///
/// Returns every item whose cell changed.
pub fn shuffle_board(
    grid: &mut Grid,
    rng: &mut SimpleRng,
    min_match: usize,
    max_iterations: u32,
) -> Vec<Relocation> {
    let mut items = remove_normal_items(grid);
    let origins: HashMap<ItemId, Coord> = items.iter().map(|item| (item.id, item.coord)).collect();

    rng.shuffle(&mut items);
    let leftover = fill_from_list(grid, items, min_match, max_iterations);
    if !leftover.is_empty() {
        tracing::warn!(count = leftover.len(), "shuffle could not place every item");
    }

    let mut moved: Vec<Relocation> = grid
        .items()
        .filter_map(|item| {
            let from = *origins.get(&item.id)?;
            (from != item.coord).then_some(Relocation {
                id: item.id,
                from,
                to: item.coord,
            })
        })
        .collect();
    moved.sort_by_key(|r| r.id);
    moved
}
