//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds the rules of a match-3 board: where items sit, what
//! counts as a match, which bombs a swap spawns, how a cascade resolves and
//! what happens when no move is left. It does no I/O and never sleeps:
//!
//! - **Deterministic**: same seed, same swaps, same board
//! - **Host-agnostic**: movement and pauses come out as [`Step`]s, side
//!   effects as [`BoardEvent`]s; the caller decides how to animate them
//! - **Synchronous**: [`Board::run_to_idle`] resolves a swap instantly for
//!   tests and simulations
//!
//! # Module Structure
//!
//! - [`grid`]: tile terrain and item storage, row 0 at the bottom
//! - [`matcher`]: directional run scans and whole-board match discovery
//! - [`policy`]: bomb spawn decision tree, blast areas, color-bomb swaps
//! - [`deadlock`]: "is any single swap left?" heuristic and move hints
//! - [`shuffle`]: permute normal items without creating matches
//! - [`board`]: the cascade state machine
//! - [`scoring`] / [`goal`]: points, moves left and score stars
//! - [`config`] / [`layout`]: board parameters and declarative level setup
//!
//! # Example
//!
//! ```
//! use match3_core::{Board, BoardConfig, Pacing, Step};
//!
//! let config = BoardConfig { pacing: Pacing::instant(), ..BoardConfig::default() };
//! let mut board = Board::new(config, 12345).unwrap();
//! board.run_to_idle();
//!
//! if let Some((a, b)) = board.hint().and_then(|hint| hint.swap()) {
//!     board.request_swap(a, b).unwrap();
//!     assert!(matches!(board.advance(), Step::Moves(_)));
//!     board.run_to_idle();
//! }
//! assert!(!board.is_busy());
//! ```

pub mod board;
pub mod config;
pub mod deadlock;
pub mod error;
pub mod event;
pub mod goal;
pub mod grid;
pub mod item;
pub mod layout;
pub mod matcher;
pub mod policy;
pub mod rng;
pub mod scoring;
pub mod shuffle;
pub mod snapshot;

pub use match3_types as types;

pub use board::{Board, Phase, RematchScope, MAX_STEPS};
pub use config::{BoardConfig, Pacing, Timings};
pub use deadlock::{find_move, is_deadlocked, MoveHint};
pub use error::{ConfigError, LayoutError};
pub use event::{BoardEvent, MoveRequest, Resolution, Step, SwapOutcome, SwapRejected};
pub use goal::{GoalConfig, LevelGoal};
pub use grid::{Grid, Tile};
pub use item::{Item, ItemId};
pub use layout::{ItemPrefab, Layout, Placement, TilePrefab};
pub use matcher::{find_all_matches, matches_at, MatchSet};
pub use rng::SimpleRng;
pub use scoring::{calculate_clear_score, ClearScore};
pub use shuffle::shuffle_board;
pub use snapshot::BoardSnapshot;
