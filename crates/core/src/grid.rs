//! Grid module - terrain and item storage
//!
//! The grid is `width x height` cells stored as two flat, row-major arrays
//! (`y * width + x`): one for tile terrain, one for the item occupying the
//! cell. Row 0 is the bottom row.
//!
//! Every read/write goes through [`Grid::index`], so out-of-range coordinates
//! are simply "not there" rather than a panic. Invalid placements are logged
//! and ignored.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::item::{Item, ItemId};
use crate::types::{CollectibleFlags, Coord, ItemKind, MatchValue, TileKind, DEFAULT_ITEM_SCORE};

/// Terrain of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Remaining damage levels of a breakable tile (0 for other kinds).
    pub damage: u8,
}

impl Tile {
    pub const NORMAL: Tile = Tile {
        kind: TileKind::Normal,
        damage: 0,
    };

    pub const OBSTACLE: Tile = Tile {
        kind: TileKind::Obstacle,
        damage: 0,
    };

    pub fn breakable(damage: u8) -> Self {
        if damage == 0 {
            return Self::NORMAL;
        }
        Self {
            kind: TileKind::Breakable,
            damage,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        self.kind == TileKind::Obstacle
    }
}

/// Tile terrain plus occupying items.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    items: Vec<Option<Item>>,
}

impl Grid {
    /// Create an empty grid of normal tiles.
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            tiles: vec![Tile::NORMAL; size],
            items: vec![None; size],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, at: Coord) -> Option<usize> {
        if !self.within_bounds(at) {
            return None;
        }
        Some((at.y * self.width + at.x) as usize)
    }

    /// Pure bounds predicate.
    #[inline]
    pub fn within_bounds(&self, at: Coord) -> bool {
        at.x >= 0 && at.x < self.width && at.y >= 0 && at.y < self.height
    }

    /// Every coordinate, column by column (x outer, y inner, bottom first).
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Coord::new(x, y)))
    }

    pub fn tile(&self, at: Coord) -> Option<Tile> {
        self.index(at).map(|i| self.tiles[i])
    }

    /// Set terrain (setup only). Turning a cell into an obstacle drops its item.
    pub fn set_tile(&mut self, at: Coord, tile: Tile) -> bool {
        let Some(i) = self.index(at) else {
            tracing::warn!(%at, "set_tile outside the grid");
            return false;
        };
        self.tiles[i] = tile;
        if tile.is_obstacle() {
            self.items[i] = None;
        }
        true
    }

    pub fn is_obstacle(&self, at: Coord) -> bool {
        self.tile(at).is_some_and(|t| t.is_obstacle())
    }

    pub fn item(&self, at: Coord) -> Option<&Item> {
        self.index(at).and_then(|i| self.items[i].as_ref())
    }

    pub fn item_mut(&mut self, at: Coord) -> Option<&mut Item> {
        let i = self.index(at)?;
        self.items[i].as_mut()
    }

    pub fn is_occupied(&self, at: Coord) -> bool {
        self.item(at).is_some()
    }

    /// In bounds, not an obstacle, and empty.
    pub fn is_fillable(&self, at: Coord) -> bool {
        match self.index(at) {
            Some(i) => !self.tiles[i].is_obstacle() && self.items[i].is_none(),
            None => false,
        }
    }

    /// Write `item` into the slot at `at`.
    ///
    /// The item's stored coordinate is set first, regardless of the outcome.
    /// Out-of-bounds, obstacle or occupied targets are logged and the item is
    /// dropped without touching the grid.
    pub fn place(&mut self, mut item: Item, at: Coord) -> bool {
        item.coord = at;
        let Some(i) = self.index(at) else {
            tracing::warn!(item = %item.id, %at, "place outside the grid ignored");
            return false;
        };
        if self.tiles[i].is_obstacle() {
            tracing::warn!(item = %item.id, %at, "place on obstacle ignored");
            return false;
        }
        if let Some(existing) = &self.items[i] {
            tracing::warn!(item = %item.id, occupant = %existing.id, %at, "place on occupied cell ignored");
            return false;
        }
        self.items[i] = Some(item);
        true
    }

    /// Remove and return the occupant. Idempotent on empty cells.
    pub fn clear(&mut self, at: Coord) -> Option<Item> {
        let i = self.index(at)?;
        self.items[i].take()
    }

    /// Remove every item.
    pub fn clear_all(&mut self) -> Vec<Item> {
        self.items.iter_mut().filter_map(Option::take).collect()
    }

    /// Move the item at `from` into the empty cell `to`.
    pub fn move_item(&mut self, from: Coord, to: Coord) -> bool {
        if !self.is_fillable(to) {
            return false;
        }
        match self.clear(from) {
            Some(item) => self.place(item, to),
            None => false,
        }
    }

    /// Exchange the occupants of two cells; both must hold items.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        if a == b || !self.is_occupied(a) || !self.is_occupied(b) {
            return false;
        }
        let (Some(first), Some(second)) = (self.clear(a), self.clear(b)) else {
            return false;
        };
        self.place(first, b) && self.place(second, a)
    }

    /// Damage a breakable tile by one level. Returns the remaining damage, or
    /// `None` if the cell is not breakable. Reverts to normal at zero.
    pub fn break_tile(&mut self, at: Coord) -> Option<u8> {
        let i = self.index(at)?;
        let tile = &mut self.tiles[i];
        if tile.kind != TileKind::Breakable {
            return None;
        }
        tile.damage = tile.damage.saturating_sub(1);
        if tile.damage == 0 {
            tile.kind = TileKind::Normal;
        }
        Some(tile.damage)
    }

    /// All items, column by column.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.coords().filter_map(move |c| self.item(c))
    }

    pub fn item_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_some()).count()
    }

    /// In-bounds edge neighbors.
    pub fn neighbors(&self, at: Coord) -> ArrayVec<Coord, 4> {
        at.neighbors4()
            .into_iter()
            .filter(|c| self.within_bounds(*c))
            .collect()
    }

    /// Occupied cells of a row, left to right.
    pub fn row_items(&self, y: i32) -> Vec<Coord> {
        (0..self.width)
            .map(|x| Coord::new(x, y))
            .filter(|c| self.is_occupied(*c))
            .collect()
    }

    /// Occupied cells of a column, bottom to top.
    pub fn column_items(&self, x: i32) -> Vec<Coord> {
        (0..self.height)
            .map(|y| Coord::new(x, y))
            .filter(|c| self.is_occupied(*c))
            .collect()
    }

    /// Occupied cells within `offset` of `at` (a square, `at` included).
    pub fn adjacent_items(&self, at: Coord, offset: i32) -> Vec<Coord> {
        let mut out = Vec::new();
        for x in at.x - offset..=at.x + offset {
            for y in at.y - offset..=at.y + offset {
                let c = Coord::new(x, y);
                if self.is_occupied(c) {
                    out.push(c);
                }
            }
        }
        out
    }

    /// Distinct columns touched by `cells`, in first-seen order.
    pub fn columns_of<'a>(cells: impl IntoIterator<Item = &'a Coord>) -> Vec<i32> {
        let mut columns: Vec<i32> = Vec::new();
        for c in cells {
            if !columns.contains(&c.x) {
                columns.push(c.x);
            }
        }
        columns
    }

    /// Cells whose item carries `value`.
    pub fn find_all_value(&self, value: MatchValue) -> Vec<Coord> {
        self.items()
            .filter(|item| item.value == value)
            .map(|item| item.coord)
            .collect()
    }

    /// Collectibles in a row; with `bottom_only`, only egress-eligible ones.
    pub fn collectibles_in_row(&self, y: i32, bottom_only: bool) -> Vec<Coord> {
        (0..self.width)
            .map(|x| Coord::new(x, y))
            .filter(|c| match self.item(*c).and_then(|item| item.collectible()) {
                Some(flags) => !bottom_only || flags.cleared_by_bottom,
                None => false,
            })
            .collect()
    }

    pub fn all_collectibles(&self) -> Vec<Coord> {
        (0..self.height)
            .flat_map(|y| self.collectibles_in_row(y, false))
            .collect()
    }

    /// Every occupied slot holds an item whose coordinate equals the slot,
    /// no obstacle holds an item, and no id appears twice.
    pub fn is_consistent(&self) -> bool {
        let mut seen: Vec<ItemId> = Vec::with_capacity(self.items.len());
        for at in self.coords() {
            let Some(i) = self.index(at) else {
                continue;
            };
            let Some(item) = &self.items[i] else {
                continue;
            };
            if item.coord != at {
                tracing::error!(item = %item.id, stored = %item.coord, slot = %at, "item coordinate out of sync");
                return false;
            }
            if self.tiles[i].is_obstacle() {
                tracing::error!(item = %item.id, %at, "item on obstacle");
                return false;
            }
            if seen.contains(&item.id) {
                tracing::error!(item = %item.id, "item in two slots");
                return false;
            }
            seen.push(item.id);
        }
        true
    }

    /// Build a grid from text rows, **top row first**.
    ///
    /// Glyphs: a color letter (`Y B C M G I R T`) is a normal item, `.` an
    /// empty cell, `#` an obstacle, `@` a collectible (egress only), `*` a
    /// color bomb. Item ids are assigned from 1 in reading order.
    ///
    /// ```
    /// use match3_core::Grid;
    /// use match3_core::types::{Coord, MatchValue};
    ///
    /// let grid = Grid::from_rows(&["RB.", "#GG"]);
    /// assert_eq!(grid.width(), 3);
    /// assert_eq!(grid.item(Coord::new(0, 1)).map(|i| i.value), Some(MatchValue::Red));
    /// assert!(grid.is_obstacle(Coord::new(0, 0)));
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::new(width, height);
        let mut next_id = 1u32;

        for (row_index, row) in rows.iter().enumerate() {
            let y = height - 1 - row_index as i32;
            for (x, glyph) in row.chars().enumerate() {
                let at = Coord::new(x as i32, y);
                let (value, kind) = match glyph {
                    '#' => {
                        grid.set_tile(at, Tile::OBSTACLE);
                        continue;
                    }
                    '.' | ' ' => continue,
                    '@' => (
                        MatchValue::None,
                        ItemKind::Collectible(CollectibleFlags::default()),
                    ),
                    '*' => (MatchValue::None, ItemKind::ColorBomb),
                    other => match MatchValue::COLORS.iter().find(|v| v.glyph() == other) {
                        Some(value) => (*value, ItemKind::Normal),
                        None => {
                            tracing::warn!(%glyph, %at, "unknown glyph skipped");
                            continue;
                        }
                    },
                };
                let item = Item::new(ItemId(next_id), value, kind, DEFAULT_ITEM_SCORE);
                next_id += 1;
                grid.place(item, at);
            }
        }
        grid
    }

    /// Text dump, top row first (inverse of [`Grid::from_rows`] for the glyphs
    /// it knows; bombs other than color bombs print their value in lowercase).
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .rev()
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let at = Coord::new(x, y);
                        if self.is_obstacle(at) {
                            return '#';
                        }
                        match self.item(at) {
                            None => '.',
                            Some(item) => match item.kind {
                                ItemKind::Normal => item.value.glyph(),
                                ItemKind::ColorBomb => '*',
                                ItemKind::Collectible(_) => '@',
                                ItemKind::RowBomb | ItemKind::ColumnBomb | ItemKind::AdjacentBomb => {
                                    item.value.glyph().to_ascii_lowercase()
                                }
                            },
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Largest item id on the grid (0 when empty).
    pub fn max_item_id(&self) -> u32 {
        self.items().map(|item| item.id.0).max().unwrap_or(0)
    }
}
