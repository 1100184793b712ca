//! What the board tells the outside world
//!
//! The board never calls into the host. It returns [`Step`]s from
//! [`crate::Board::advance`] and queues [`BoardEvent`]s that the caller drains
//! with [`crate::Board::drain_events`] before executing the step.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::item::{Item, ItemId};
use crate::types::{BombKind, Coord};

/// Ask the host to animate an item from `from` to `to`.
///
/// The grid is already updated when the request is issued; `from` may lie
/// outside the grid for items dropping in from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub item: ItemId,
    pub from: Coord,
    pub to: Coord,
    pub duration: Duration,
}

/// Next thing the caller must do before advancing again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Start every movement and wait until all of them finish.
    Moves(Vec<MoveRequest>),
    /// Pause for pacing.
    Wait(Duration),
    /// Resolution finished; the board accepts input.
    Idle,
}

impl Step {
    pub fn is_idle(&self) -> bool {
        matches!(self, Step::Idle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A new item entered the grid (setup, refill or bomb activation).
    ItemSpawned { item: Item },
    /// A swap produced no match and was undone.
    SwapReverted { a: Coord, b: Coord },
    /// A swap was confirmed. Emitted once per swap.
    MoveSpent,
    /// An item was removed. `score` is already multiplied and includes the
    /// bonus; `bombed` is true when a blast removed it.
    ItemCleared { item: Item, score: u32, bombed: bool },
    TileBroken { at: Coord, damage: u8 },
    /// A spawned bomb was written into the grid.
    BombActivated { at: Coord, kind: BombKind },
    /// A chain step raised the score multiplier.
    ChainBonus { multiplier: u32 },
    /// No move left; a reshuffle follows.
    Deadlocked,
    Shuffled { moved: usize },
    /// The board went back to idle.
    Settled,
}

/// Why a swap request was refused. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapRejected {
    #[error("board is resolving a previous move")]
    Busy,
    #[error("cells are not orthogonal neighbors")]
    NotAdjacent,
    #[error("both cells must hold an item")]
    EmptyCell,
    #[error("cell is outside the board")]
    OutOfBounds,
    #[error("no moves left")]
    GameOver,
}

/// Totals of one resolution (swap or shuffle) from start to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Resolution {
    pub cleared: u32,
    pub score: u32,
    /// Highest multiplier reached.
    pub chain: u32,
    pub bombs: u32,
    pub reshuffles: u32,
}

/// Result of an accepted swap once the board is idle again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapOutcome {
    Resolved(Resolution),
    Reverted,
}

impl SwapOutcome {
    pub fn is_reverted(&self) -> bool {
        matches!(self, SwapOutcome::Reverted)
    }
}
