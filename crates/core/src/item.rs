//! Items - the pieces that sit on the grid

use serde::Serialize;

use crate::types::{BombKind, CollectibleFlags, Coord, ItemKind, MatchValue};

/// Board-unique item identifier (monotonic, never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A playable piece.
///
/// The grid owns items by value, so an item lives in at most one slot.
/// `coord` must always equal the slot the item occupies; [`crate::Grid::place`]
/// maintains this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub coord: Coord,
    pub value: MatchValue,
    pub kind: ItemKind,
    pub score_value: u32,
}

impl Item {
    pub fn new(id: ItemId, value: MatchValue, kind: ItemKind, score_value: u32) -> Self {
        Self {
            id,
            coord: Coord::default(),
            value,
            kind,
            score_value,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.kind == ItemKind::Normal
    }

    pub fn bomb_kind(&self) -> Option<BombKind> {
        self.kind.bomb_kind()
    }

    pub fn is_bomb(&self) -> bool {
        self.bomb_kind().is_some()
    }

    pub fn is_color_bomb(&self) -> bool {
        self.kind == ItemKind::ColorBomb
    }

    pub fn collectible(&self) -> Option<CollectibleFlags> {
        self.kind.collectible()
    }

    pub fn is_collectible(&self) -> bool {
        self.collectible().is_some()
    }

    /// Take on another item's match value (bombs blending into their context).
    pub fn change_color(&mut self, other: &Item) {
        self.value = other.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        let normal = Item::new(ItemId(1), MatchValue::Red, ItemKind::Normal, 20);
        assert!(normal.is_normal());
        assert!(!normal.is_bomb());
        assert!(!normal.is_collectible());

        let color = Item::new(ItemId(2), MatchValue::None, ItemKind::ColorBomb, 20);
        assert!(color.is_bomb());
        assert!(color.is_color_bomb());
        assert_eq!(color.bomb_kind(), Some(BombKind::Color));

        let coll = Item::new(
            ItemId(3),
            MatchValue::None,
            ItemKind::Collectible(CollectibleFlags::default()),
            100,
        );
        assert!(coll.is_collectible());
        assert!(!coll.is_normal());
    }

    #[test]
    fn test_change_color() {
        let mut bomb = Item::new(ItemId(1), MatchValue::None, ItemKind::RowBomb, 20);
        let other = Item::new(ItemId(2), MatchValue::Teal, ItemKind::Normal, 20);
        bomb.change_color(&other);
        assert_eq!(bomb.value, MatchValue::Teal);
    }
}
