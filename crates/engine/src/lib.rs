//! Async board engine
//!
//! Runs a [`core::Board`] on tokio. The board decides what moves and when
//! to pause; this crate carries those steps out against a presentation
//! layer and keeps the level goal in sync.
//!
//! - [`host`]: the [`BoardHost`] trait, movement handles and stock hosts
//! - [`driver`]: [`BoardDriver`], one cascade at a time, awaited in place
//! - [`service`]: [`BoardService`], the driver on its own task behind a
//!   command channel
//!
//! ```no_run
//! use match3_engine::{BoardDriver, BoardService, TimedHost};
//! use match3_engine::core::{Board, BoardConfig, LevelGoal};
//! use match3_engine::types::Coord;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let board = Board::new(BoardConfig::default(), 42)?;
//! let driver = BoardDriver::new(board, TimedHost::default(), LevelGoal::default());
//! let (handle, _task) = BoardService::spawn(driver);
//! let outcome = handle.swap(Coord::new(0, 0), Coord::new(1, 0)).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod host;
pub mod service;

pub use match3_core as core;
pub use match3_types as types;

pub use driver::{BoardDriver, BusyFlag};
pub use host::{
    clamp_scale, BoardHost, InstantHost, MoveCompleter, MoveHandle, RecordingHost, TimedHost,
    MAX_SCALE,
};
pub use service::{BoardCommand, BoardHandle, BoardService, EngineError};
