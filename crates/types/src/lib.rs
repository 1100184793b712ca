//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data (`serde` derives), making them usable in any
//! context (board simulation, async host bridge, layout files, snapshots).
//!
//! # Coordinates
//!
//! Cells are addressed by [`Coord`] `(x, y)`:
//!
//! - **x**: column, `0..width`, left to right
//! - **y**: row, `0..height`, **bottom to top** (row 0 is where collectibles
//!   leave the board, row `height - 1` is where new items enter)
//!
//! # Default Tuning
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` x `DEFAULT_HEIGHT` | 8 x 8 | Board size |
//! | `DEFAULT_MIN_MATCH` | 3 | Shortest run that clears |
//! | `DEFAULT_MAX_COLLECTIBLES` | 3 | Collectibles alive at once |
//! | `DEFAULT_COLLECTIBLE_CHANCE` | 0.1 | Top-row collectible spawn chance |
//! | `DEFAULT_DEADLOCK_WINDOW` | 3 | Deadlock analyzer window |
//! | `FILL_MAX_ITERATIONS` | 100 | Re-roll cap for "no match on fill" |
//! | `MATCH_BONUS` | 20 | Flat bonus for clears of 4+ items |
//! | `DEFAULT_ITEM_SCORE` | 20 | Points per cleared item |
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SWAP_MS` | 100 | Swap / swap-back animation |
//! | `FILL_MOVE_MS` | 500 | Drop-in animation for new items |
//! | `COLLAPSE_MS` | 100 | Column collapse animation |
//! | `PRE_CLEAR_MS` | 200 | Pause before a clearing pass |
//! | `POST_CLEAR_MS` | 250 | Pause between clear and collapse |
//! | `SETTLE_MS` | 200 | Pause after a collapse or refill settles |
//! | `DEADLOCK_MS` | 4000 | Pause before reshuffling a deadlocked board |
//! | `SHUFFLE_MS` | 1000 | Pause after a reshuffle |
//!
//! # Examples
//!
//! ```
//! use match3_types::{Coord, MatchValue, SwapAxis};
//!
//! let a = Coord::new(2, 3);
//! let b = Coord::new(3, 3);
//! assert!(a.is_adjacent(b));
//! assert_eq!(SwapAxis::between(a, b), Some(SwapAxis::Horizontal));
//!
//! assert_eq!("red".parse::<MatchValue>(), Ok(MatchValue::Red));
//! assert!(!MatchValue::None.is_matchable());
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default board width in cells
pub const DEFAULT_WIDTH: i32 = 8;

/// Default board height in cells
pub const DEFAULT_HEIGHT: i32 = 8;

/// Shortest run that counts as a match
pub const DEFAULT_MIN_MATCH: usize = 3;

/// Maximum number of collectibles alive on the board
pub const DEFAULT_MAX_COLLECTIBLES: u32 = 3;

/// Probability that a top-row refill spawns a collectible
pub const DEFAULT_COLLECTIBLE_CHANCE: f32 = 0.1;

/// Window length used by the deadlock analyzer
pub const DEFAULT_DEADLOCK_WINDOW: usize = 3;

/// Re-roll cap when a fresh item would immediately match
pub const FILL_MAX_ITERATIONS: u32 = 100;

/// Reshuffles allowed within a single swap resolution
pub const MAX_RESHUFFLES: u32 = 3;

/// Flat bonus added per item when the clear set has 4+ items
pub const MATCH_BONUS: u32 = 20;

/// Size of clear set that earns [`MATCH_BONUS`]
pub const MATCH_BONUS_THRESHOLD: usize = 4;

/// Points per cleared item (before the chain multiplier)
pub const DEFAULT_ITEM_SCORE: u32 = 20;

/// Rows above the board new items start from when they drop in
pub const FILL_Y_OFFSET: i32 = 10;

/// Swap / swap-back animation time
pub const SWAP_MS: u32 = 100;

/// Drop-in animation time for refilled items
pub const FILL_MOVE_MS: u32 = 500;

/// Column collapse animation time
pub const COLLAPSE_MS: u32 = 100;

/// Pause before each clearing pass
pub const PRE_CLEAR_MS: u32 = 200;

/// Pause between clearing and collapsing
pub const POST_CLEAR_MS: u32 = 250;

/// Pause after a collapse or refill settles, before rematching
pub const SETTLE_MS: u32 = 200;

/// Pause before a deadlocked board is reshuffled
pub const DEADLOCK_MS: u32 = 4000;

/// Pause after a reshuffle before the extra refill pass
pub const SHUFFLE_MS: u32 = 1000;

/// Default score goals (one star each)
pub const DEFAULT_SCORE_GOALS: [u32; 3] = [1000, 2000, 3000];

/// Default number of moves in a level
pub const DEFAULT_MOVES: u32 = 30;

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate `steps` cells away along `dir`.
    pub fn offset(self, dir: Direction, steps: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx * steps, self.y + dy * steps)
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(self, other: Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// True when the cells share an edge (`|dx| + |dy| == 1`).
    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// The four edge neighbors in [`Direction::ALL`] order; may be out of
    /// bounds.
    pub fn neighbors4(self) -> [Coord; 4] {
        Direction::ALL.map(|dir| self.offset(dir, 1))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Unit scan direction. `Up` is towards the top row (+y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Left, right, up, down.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }
}

/// Axis of a swap (or of a deadlock window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapAxis {
    Horizontal,
    Vertical,
}

impl SwapAxis {
    /// Axis of the swap between two adjacent cells; `None` if not adjacent.
    pub fn between(a: Coord, b: Coord) -> Option<Self> {
        if !a.is_adjacent(b) {
            return None;
        }
        if a.y == b.y {
            Some(SwapAxis::Horizontal)
        } else {
            Some(SwapAxis::Vertical)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapAxis::Horizontal => "horizontal",
            SwapAxis::Vertical => "vertical",
        }
    }
}

/// Color/category tag that decides whether two items form a run.
///
/// `None` is the wild/none sentinel: it never joins or extends a run. Color
/// bombs carry it until a swap assigns them a real value, collectibles carry
/// it for their whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchValue {
    Yellow,
    Blue,
    Cyan,
    Magenta,
    Green,
    Indigo,
    Red,
    Teal,
    None,
}

impl MatchValue {
    /// Every real (matchable) value.
    pub const COLORS: [MatchValue; 8] = [
        MatchValue::Yellow,
        MatchValue::Blue,
        MatchValue::Cyan,
        MatchValue::Magenta,
        MatchValue::Green,
        MatchValue::Indigo,
        MatchValue::Red,
        MatchValue::Teal,
    ];

    pub fn is_matchable(&self) -> bool {
        *self != MatchValue::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchValue::Yellow => "yellow",
            MatchValue::Blue => "blue",
            MatchValue::Cyan => "cyan",
            MatchValue::Magenta => "magenta",
            MatchValue::Green => "green",
            MatchValue::Indigo => "indigo",
            MatchValue::Red => "red",
            MatchValue::Teal => "teal",
            MatchValue::None => "none",
        }
    }

    /// Single-letter glyph used by text dumps of the board.
    pub fn glyph(&self) -> char {
        match self {
            MatchValue::Yellow => 'Y',
            MatchValue::Blue => 'B',
            MatchValue::Cyan => 'C',
            MatchValue::Magenta => 'M',
            MatchValue::Green => 'G',
            MatchValue::Indigo => 'I',
            MatchValue::Red => 'R',
            MatchValue::Teal => 'T',
            MatchValue::None => '*',
        }
    }
}

/// Name that is not a [`MatchValue`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown match value {0:?}")]
pub struct UnknownMatchValue(pub String);

/// Case-insensitive; `wild` is accepted for [`MatchValue::None`].
///
/// ```
/// use match3_types::MatchValue;
///
/// assert_eq!("Teal".parse::<MatchValue>(), Ok(MatchValue::Teal));
/// assert_eq!("none".parse::<MatchValue>(), Ok(MatchValue::None));
/// assert!("purple".parse::<MatchValue>().is_err());
/// ```
impl FromStr for MatchValue {
    type Err = UnknownMatchValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yellow" => Ok(MatchValue::Yellow),
            "blue" => Ok(MatchValue::Blue),
            "cyan" => Ok(MatchValue::Cyan),
            "magenta" => Ok(MatchValue::Magenta),
            "green" => Ok(MatchValue::Green),
            "indigo" => Ok(MatchValue::Indigo),
            "red" => Ok(MatchValue::Red),
            "teal" => Ok(MatchValue::Teal),
            "none" | "wild" => Ok(MatchValue::None),
            _ => Err(UnknownMatchValue(s.to_string())),
        }
    }
}

/// Terrain of a cell.
///
/// - **Normal**: holds items
/// - **Obstacle**: permanently empty, skipped by fill and collapse
/// - **Breakable**: holds items, loses one damage level per clear on top of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    #[default]
    Normal,
    Obstacle,
    Breakable,
}

/// Blast pattern of a bomb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BombKind {
    /// Clears its whole row
    Row,
    /// Clears its whole column
    Column,
    /// Clears the 3x3 neighborhood
    Adjacent,
    /// Wildcard; acts through the swap rule, no blast area
    Color,
}

impl BombKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BombKind::Row => "row",
            BombKind::Column => "column",
            BombKind::Adjacent => "adjacent",
            BombKind::Color => "color",
        }
    }
}

/// Removal rules of a collectible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleFlags {
    /// Removed when it reaches the bottom row (egress).
    pub cleared_by_bottom: bool,
    /// May be removed by a bomb blast or a full-board clear.
    pub cleared_by_bomb: bool,
}

impl Default for CollectibleFlags {
    fn default() -> Self {
        Self {
            cleared_by_bottom: true,
            cleared_by_bomb: false,
        }
    }
}

/// Kind discriminator of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Normal,
    RowBomb,
    ColumnBomb,
    AdjacentBomb,
    ColorBomb,
    Collectible(CollectibleFlags),
}

impl ItemKind {
    pub fn bomb(kind: BombKind) -> Self {
        match kind {
            BombKind::Row => ItemKind::RowBomb,
            BombKind::Column => ItemKind::ColumnBomb,
            BombKind::Adjacent => ItemKind::AdjacentBomb,
            BombKind::Color => ItemKind::ColorBomb,
        }
    }

    /// Blast pattern if this kind is a bomb.
    pub fn bomb_kind(&self) -> Option<BombKind> {
        match self {
            ItemKind::RowBomb => Some(BombKind::Row),
            ItemKind::ColumnBomb => Some(BombKind::Column),
            ItemKind::AdjacentBomb => Some(BombKind::Adjacent),
            ItemKind::ColorBomb => Some(BombKind::Color),
            ItemKind::Normal | ItemKind::Collectible(_) => None,
        }
    }

    pub fn collectible(&self) -> Option<CollectibleFlags> {
        match self {
            ItemKind::Collectible(flags) => Some(*flags),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning() {
        assert_eq!(DEFAULT_MIN_MATCH, 3);
        assert_eq!(DEFAULT_DEADLOCK_WINDOW, 3);
        assert_eq!(FILL_MAX_ITERATIONS, 100);
        assert_eq!(MATCH_BONUS, 20);
        assert_eq!(SWAP_MS, 100);
        assert_eq!(FILL_MOVE_MS, 500);
    }

    #[test]
    fn test_adjacency_is_manhattan_one() {
        let c = Coord::new(3, 3);
        assert!(c.is_adjacent(Coord::new(4, 3)));
        assert!(c.is_adjacent(Coord::new(3, 2)));
        assert!(!c.is_adjacent(Coord::new(4, 4)));
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Coord::new(5, 3)));
    }

    #[test]
    fn test_swap_axis() {
        let c = Coord::new(1, 1);
        assert_eq!(SwapAxis::between(c, Coord::new(0, 1)), Some(SwapAxis::Horizontal));
        assert_eq!(SwapAxis::between(c, Coord::new(1, 2)), Some(SwapAxis::Vertical));
        assert_eq!(SwapAxis::between(c, Coord::new(2, 2)), None);
    }

    #[test]
    fn test_match_value_parse_errors() {
        assert_eq!("WILD".parse::<MatchValue>(), Ok(MatchValue::None));
        assert_eq!(
            "purple".parse::<MatchValue>(),
            Err(UnknownMatchValue("purple".to_string()))
        );
    }

    #[test]
    fn test_neighbors_follow_direction_order() {
        let c = Coord::new(2, 2);
        let expected = Direction::ALL.map(|dir| {
            let (dx, dy) = dir.delta();
            Coord::new(2 + dx, 2 + dy)
        });
        assert_eq!(c.neighbors4(), expected);
        assert_eq!(c.neighbors4()[0], Coord::new(1, 2));
    }

    #[test]
    fn test_direction_up_is_positive_y() {
        assert_eq!(Coord::new(0, 0).offset(Direction::Up, 2), Coord::new(0, 2));
        assert_eq!(Coord::new(0, 0).offset(Direction::Left, 1), Coord::new(-1, 0));
    }

    #[test]
    fn test_item_kind_bomb_mapping() {
        for kind in [BombKind::Row, BombKind::Column, BombKind::Adjacent, BombKind::Color] {
            assert_eq!(ItemKind::bomb(kind).bomb_kind(), Some(kind));
        }
        assert_eq!(ItemKind::Normal.bomb_kind(), None);
        assert!(ItemKind::Collectible(CollectibleFlags::default())
            .collectible()
            .is_some());
    }

    #[test]
    fn test_match_value_roundtrip_names() {
        for value in MatchValue::COLORS {
            assert_eq!(value.as_str().parse::<MatchValue>(), Ok(value));
            assert!(value.is_matchable());
        }
    }
}
