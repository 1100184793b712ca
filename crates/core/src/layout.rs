//! Declarative board layouts
//!
//! A layout lists the tiles and items a level starts with. Cells without a
//! tile placement get a normal tile; cells without an item are filled at
//! random when the board is set up.
//!
//! ```json
//! {
//!   "config": { "width": 6, "height": 6 },
//!   "goal": { "score_goals": [500, 1000, 1500], "moves": 20 },
//!   "tiles": [
//!     { "prefab": { "kind": "obstacle" }, "x": 2, "y": 3 },
//!     { "prefab": { "kind": "breakable", "damage": 2 }, "x": 0, "y": 0 }
//!   ],
//!   "items": [
//!     { "prefab": { "value": "red", "kind": "row_bomb" }, "x": 1, "y": 1 },
//!     { "prefab": { "kind": { "collectible": {} } }, "x": 4, "y": 5 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::error::LayoutError;
use crate::goal::GoalConfig;
use crate::grid::Tile;
use crate::types::{Coord, ItemKind, MatchValue, TileKind};

/// A prefab at a cell. `z` is carried for hosts that layer sprites; the
/// board ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement<P> {
    pub prefab: P,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: i32,
}

impl<P> Placement<P> {
    pub fn new(prefab: P, x: i32, y: i32) -> Self {
        Self { prefab, x, y, z: 0 }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePrefab {
    pub kind: TileKind,
    #[serde(default)]
    pub damage: u8,
}

impl TilePrefab {
    pub fn tile(&self) -> Tile {
        match self.kind {
            TileKind::Normal => Tile::NORMAL,
            TileKind::Obstacle => Tile::OBSTACLE,
            TileKind::Breakable => Tile::breakable(self.damage.max(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPrefab {
    #[serde(default = "wild")]
    pub value: MatchValue,
    #[serde(default)]
    pub kind: ItemKind,
    /// Overrides the configured item score.
    #[serde(default)]
    pub score: Option<u32>,
}

fn wild() -> MatchValue {
    MatchValue::None
}

impl ItemPrefab {
    pub fn normal(value: MatchValue) -> Self {
        Self {
            value,
            kind: ItemKind::Normal,
            score: None,
        }
    }

    pub fn with_kind(value: MatchValue, kind: ItemKind) -> Self {
        Self {
            value,
            kind,
            score: None,
        }
    }
}

/// Starting state of a level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub config: BoardConfig,
    pub goal: GoalConfig,
    pub tiles: Vec<Placement<TilePrefab>>,
    pub items: Vec<Placement<ItemPrefab>>,
}

impl Layout {
    /// Parse a layout and validate its config.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layout: Layout = serde_json::from_str(json)?;
        layout.config.validate()?;
        Ok(layout)
    }

    /// An empty layout over `config`.
    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn tile(mut self, prefab: TilePrefab, x: i32, y: i32) -> Self {
        self.tiles.push(Placement::new(prefab, x, y));
        self
    }

    pub fn item(mut self, prefab: ItemPrefab, x: i32, y: i32) -> Self {
        self.items.push(Placement::new(prefab, x, y));
        self
    }
}
