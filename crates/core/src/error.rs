//! Error types for board setup.
//!
//! Only setup can fail. Once a board is running, invalid placements are
//! logged and ignored, and swaps report their outcome as values.

use thiserror::Error;

/// Invalid [`crate::BoardConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: i32, height: i32 },

    #[error("item palette is empty")]
    EmptyPalette,

    #[error("item palette needs at least 2 values, got {0}")]
    PaletteTooSmall(usize),

    #[error("palette contains the non-matching sentinel value")]
    SentinelInPalette,

    #[error("minimum match length must be at least 2, got {0}")]
    MinMatchTooShort(usize),

    #[error("deadlock window must be between 2 and 8, got {0}")]
    InvalidDeadlockWindow(usize),

    #[error("collectible chance must be within [0, 1], got {0}")]
    InvalidChance(f32),
}

/// Failure to read a declarative board layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("layout config is invalid: {0}")]
    Config(#[from] ConfigError),
}
