//! Scoring module - points for cleared items
//!
//! Each cleared item is worth `score_value * multiplier`, plus a flat bonus
//! when the clear removes at least [`MATCH_BONUS_THRESHOLD`] items at once.
//! The multiplier starts at 1 for a swap and grows by one per chain step.

use crate::types::MATCH_BONUS_THRESHOLD;

/// Points for one clearing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearScore {
    /// Points awarded to every item of the pass (excluding per-item value).
    pub bonus: u32,
    /// Sum over all items of the pass.
    pub total: u32,
    pub items: u32,
}

/// Bonus added to each item when `cleared` items go at once.
pub fn clear_bonus(cleared: usize, match_bonus: u32) -> u32 {
    if cleared >= MATCH_BONUS_THRESHOLD {
        match_bonus
    } else {
        0
    }
}

/// Points for a single item.
pub fn item_score(score_value: u32, multiplier: u32, bonus: u32) -> u32 {
    score_value.saturating_mul(multiplier).saturating_add(bonus)
}

/// Points for a whole pass over items with the given score values.
pub fn calculate_clear_score(
    score_values: impl IntoIterator<Item = u32>,
    multiplier: u32,
    match_bonus: u32,
) -> ClearScore {
    let values: Vec<u32> = score_values.into_iter().collect();
    let bonus = clear_bonus(values.len(), match_bonus);
    let total = values
        .iter()
        .fold(0u32, |acc, v| acc.saturating_add(item_score(*v, multiplier, bonus)));
    ClearScore {
        bonus,
        total,
        items: values.len() as u32,
    }
}
