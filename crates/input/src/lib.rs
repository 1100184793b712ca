//! Pointer input (engine-facing).
//!
//! Independent of any UI framework: the host reports which cell a pointer
//! went down on, which cells it entered, and when it was released. The
//! gesture turns that into at most one adjacency-checked swap.

pub mod gesture;

pub use match3_types as types;

pub use gesture::{DragGesture, SwapIntent};
