//! Level goal - score, moves left and score stars
//!
//! The goal does not watch the board. It is fed [`BoardEvent`]s by whoever
//! drains them (the engine driver, or a test).

use serde::{Deserialize, Serialize};

use crate::event::BoardEvent;
use crate::types::{DEFAULT_MOVES, DEFAULT_SCORE_GOALS};

/// Score goals and starting move budget of a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Ascending thresholds. Reaching the first one wins the level.
    pub score_goals: Vec<u32>,
    pub moves: u32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            score_goals: DEFAULT_SCORE_GOALS.to_vec(),
            moves: DEFAULT_MOVES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelGoal {
    score_goals: Vec<u32>,
    moves_left: u32,
    score: u32,
    stars: usize,
}

impl LevelGoal {
    pub fn new(config: &GoalConfig) -> Self {
        let mut score_goals = config.score_goals.clone();
        score_goals.sort_unstable();
        Self {
            score_goals,
            moves_left: config.moves,
            score: 0,
            stars: 0,
        }
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of score goals reached so far.
    pub fn stars(&self) -> usize {
        self.stars
    }

    pub fn score_goals(&self) -> &[u32] {
        &self.score_goals
    }

    pub fn is_game_over(&self) -> bool {
        self.moves_left == 0
    }

    pub fn is_winner(&self) -> bool {
        self.score_goals
            .first()
            .is_some_and(|goal| self.score >= *goal)
    }

    /// Score as a fraction of the last goal, clamped to 1.
    pub fn progress(&self) -> f32 {
        match self.score_goals.last() {
            Some(&max) if max > 0 => (self.score as f32 / max as f32).min(1.0),
            _ => 1.0,
        }
    }

    pub fn spend_move(&mut self) {
        self.moves_left = self.moves_left.saturating_sub(1);
    }

    pub fn add_moves(&mut self, moves: u32) {
        self.moves_left = self.moves_left.saturating_add(moves);
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.update_stars();
    }

    fn update_stars(&mut self) {
        let reached = self
            .score_goals
            .iter()
            .take_while(|goal| self.score >= **goal)
            .count();
        self.stars = self.stars.max(reached);
    }

    /// Account for one board event. Returns true when it changed the goal.
    pub fn apply(&mut self, event: &BoardEvent) -> bool {
        match event {
            BoardEvent::MoveSpent => {
                self.spend_move();
                true
            }
            BoardEvent::ItemCleared { score, .. } if *score > 0 => {
                self.add_score(*score);
                true
            }
            _ => false,
        }
    }
}

impl Default for LevelGoal {
    fn default() -> Self {
        Self::new(&GoalConfig::default())
    }
}
