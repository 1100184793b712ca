//! Board configuration
//!
//! A [`BoardConfig`] can come from three places:
//!
//! - `BoardConfig::default()`: an 8x8 board with six colors
//! - `BoardConfig::from_env()`: defaults overridden by `MATCH3_*` variables
//! - the `config` block of a JSON layout (see [`crate::layout`]), where every
//!   field is optional
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MATCH3_WIDTH` / `MATCH3_HEIGHT` | board size |
//! | `MATCH3_MIN_MATCH` | `min_match` |
//! | `MATCH3_COLORS` | `palette` (comma separated, e.g. `red,blue,green`) |
//! | `MATCH3_MAX_COLLECTIBLES` | `max_collectibles` |
//! | `MATCH3_COLLECTIBLE_CHANCE` | `collectible_chance` |
//! | `MATCH3_DEADLOCK_WINDOW` | `deadlock_window` |
//! | `MATCH3_FILL_MAX_ITERATIONS` | `fill_max_iterations` |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::*;

/// Animation durations handed to the host with each movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub swap_ms: u32,
    pub fill_move_ms: u32,
    pub collapse_ms: u32,
    /// Rows above its cell a refilled item starts falling from.
    pub fill_y_offset: i32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            swap_ms: SWAP_MS,
            fill_move_ms: FILL_MOVE_MS,
            collapse_ms: COLLAPSE_MS,
            fill_y_offset: FILL_Y_OFFSET,
        }
    }
}

impl Timings {
    pub fn swap(&self) -> Duration {
        Duration::from_millis(self.swap_ms as u64)
    }

    pub fn fill_move(&self) -> Duration {
        Duration::from_millis(self.fill_move_ms as u64)
    }

    pub fn collapse(&self) -> Duration {
        Duration::from_millis(self.collapse_ms as u64)
    }
}

/// Pauses between cascade phases. Pacing only; phase order never depends
/// on them, so all of them may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub pre_clear_ms: u32,
    pub post_clear_ms: u32,
    pub settle_ms: u32,
    pub deadlock_ms: u32,
    pub shuffle_ms: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            pre_clear_ms: PRE_CLEAR_MS,
            post_clear_ms: POST_CLEAR_MS,
            settle_ms: SETTLE_MS,
            deadlock_ms: DEADLOCK_MS,
            shuffle_ms: SHUFFLE_MS,
        }
    }
}

impl Pacing {
    /// No pauses at all (headless runs, tests).
    pub fn instant() -> Self {
        Self {
            pre_clear_ms: 0,
            post_clear_ms: 0,
            settle_ms: 0,
            deadlock_ms: 0,
            shuffle_ms: 0,
        }
    }
}

/// Everything that shapes a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
    pub min_match: usize,
    /// Values refilled items are drawn from.
    pub palette: Vec<MatchValue>,
    pub max_collectibles: u32,
    pub collectible_chance: f32,
    /// Removal rules of collectibles spawned by refill.
    pub collectible_flags: CollectibleFlags,
    pub item_score: u32,
    pub match_bonus: u32,
    pub deadlock_window: usize,
    pub fill_max_iterations: u32,
    pub max_reshuffles: u32,
    pub timings: Timings,
    pub pacing: Pacing,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_match: DEFAULT_MIN_MATCH,
            palette: MatchValue::COLORS[..6].to_vec(),
            max_collectibles: DEFAULT_MAX_COLLECTIBLES,
            collectible_chance: DEFAULT_COLLECTIBLE_CHANCE,
            collectible_flags: CollectibleFlags::default(),
            item_score: DEFAULT_ITEM_SCORE,
            match_bonus: MATCH_BONUS,
            deadlock_window: DEFAULT_DEADLOCK_WINDOW,
            fill_max_iterations: FILL_MAX_ITERATIONS,
            max_reshuffles: MAX_RESHUFFLES,
            timings: Timings::default(),
            pacing: Pacing::default(),
        }
    }
}

impl BoardConfig {
    /// Defaults overridden by `MATCH3_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    /// Unparseable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
            default: T,
        ) -> T {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        let palette = lookup("MATCH3_COLORS")
            .map(|s| {
                s.split(',')
                    .filter_map(|name| name.trim().parse().ok())
                    .collect::<Vec<MatchValue>>()
            })
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.palette.clone());

        Self {
            width: parsed(&lookup, "MATCH3_WIDTH", defaults.width),
            height: parsed(&lookup, "MATCH3_HEIGHT", defaults.height),
            min_match: parsed(&lookup, "MATCH3_MIN_MATCH", defaults.min_match),
            palette,
            max_collectibles: parsed(&lookup, "MATCH3_MAX_COLLECTIBLES", defaults.max_collectibles),
            collectible_chance: parsed(
                &lookup,
                "MATCH3_COLLECTIBLE_CHANCE",
                defaults.collectible_chance,
            ),
            deadlock_window: parsed(&lookup, "MATCH3_DEADLOCK_WINDOW", defaults.deadlock_window),
            fill_max_iterations: parsed(
                &lookup,
                "MATCH3_FILL_MAX_ITERATIONS",
                defaults.fill_max_iterations,
            ),
            ..defaults
        }
    }

    /// Reject configurations a board cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.palette.iter().any(|v| !v.is_matchable()) {
            return Err(ConfigError::SentinelInPalette);
        }
        // One value leaves refill no choice, so every cascade matches again.
        if self.palette.len() < 2 {
            return Err(ConfigError::PaletteTooSmall(self.palette.len()));
        }
        if self.min_match < 2 {
            return Err(ConfigError::MinMatchTooShort(self.min_match));
        }
        if !(2..=8).contains(&self.deadlock_window) {
            return Err(ConfigError::InvalidDeadlockWindow(self.deadlock_window));
        }
        if !(0.0..=1.0).contains(&self.collectible_chance) {
            return Err(ConfigError::InvalidChance(self.collectible_chance));
        }
        Ok(())
    }

    /// Builder-style size override.
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builder-style override that removes every pause.
    pub fn headless(mut self) -> Self {
        self.pacing = Pacing::instant();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(BoardConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let config = BoardConfig::default().with_size(0, 5);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDimension { width: 0, height: 5 })
        );
    }

    #[test]
    fn test_empty_palette_rejected() {
        let config = BoardConfig {
            palette: Vec::new(),
            ..BoardConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn test_single_color_palette_rejected() {
        let config = BoardConfig {
            palette: vec![MatchValue::Red],
            collectible_chance: 0.0,
            ..BoardConfig::default().headless()
        };
        assert_eq!(config.validate(), Err(ConfigError::PaletteTooSmall(1)));
    }

    #[test]
    fn test_sentinel_palette_rejected() {
        let config = BoardConfig {
            palette: vec![MatchValue::Red, MatchValue::None],
            ..BoardConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SentinelInPalette));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = BoardConfig::from_lookup(|key| match key {
            "MATCH3_WIDTH" => Some("5".to_string()),
            "MATCH3_HEIGHT" => Some(" 6 ".to_string()),
            "MATCH3_COLORS" => Some("red, blue,bogus".to_string()),
            "MATCH3_MIN_MATCH" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(config.width, 5);
        assert_eq!(config.height, 6);
        assert_eq!(config.palette, vec![MatchValue::Red, MatchValue::Blue]);
        assert_eq!(config.min_match, DEFAULT_MIN_MATCH);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BoardConfig = serde_json::from_str(r#"{"width": 4, "pacing": {"settle_ms": 0}}"#).unwrap();
        assert_eq!(config.width, 4);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.pacing.settle_ms, 0);
        assert_eq!(config.pacing.deadlock_ms, DEADLOCK_MS);
    }
}
