//! Match-3 (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so hosts depend on one
//! package: `match3::{core, engine, input, types}`.

pub use match3_core as core;
pub use match3_engine as engine;
pub use match3_input as input;
pub use match3_types as types;
