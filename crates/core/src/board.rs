//! Board - the cascade state machine
//!
//! A [`Board`] owns the grid and is its only mutator. A swap walks through
//! the phases below; every call to [`Board::advance`] runs phases until one
//! of them needs the outside world (a movement join or a pacing pause) and
//! returns that as a [`Step`].
//!
//! ```text
//! Idle -> Resolving -> Matching -+-> Idle                      (no match, reverted)
//!                                +-> BombResolution -> Clearing
//! Clearing -> Collapsing -> Rematching(moved) -+-> Clearing    (chain)
//!                                              +-> Refilling
//! Refilling -> Rematching(board) -+-> Clearing                 (chain)
//!                                 +-> DeadlockCheck -+-> Idle
//!                                                    +-> Reshuffling -> Refilling
//! ```
//!
//! Every chain step raises the score multiplier by one. Reshuffles per
//! resolution are capped by `max_reshuffles`.

use std::collections::VecDeque;
use std::time::Duration;

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::config::BoardConfig;
use crate::deadlock::{find_move, is_deadlocked, MoveHint};
use crate::error::ConfigError;
use crate::event::{BoardEvent, MoveRequest, Resolution, Step, SwapOutcome, SwapRejected};
use crate::grid::Grid;
use crate::item::{Item, ItemId};
use crate::layout::{ItemPrefab, Layout};
use crate::matcher::{find_all_matches, has_match_on_fill, matches_at, matches_at_many, MatchSet};
use crate::policy::{bomb_for_set, bombed_items, color_swap_rule, ColorSwap};
use crate::rng::SimpleRng;
use crate::scoring::{calculate_clear_score, item_score};
use crate::shuffle::shuffle_board;
use crate::snapshot::BoardSnapshot;
use crate::types::*;

/// Upper bound on steps a resolution takes before it is cut short.
pub const MAX_STEPS: usize = 10_000;

/// What a rematch looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RematchScope {
    /// Items moved by the last collapse.
    Moved,
    /// Every cell.
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    /// Swap movements in flight.
    Resolving,
    Matching,
    BombResolution,
    Clearing,
    Collapsing,
    Refilling,
    Rematching(RematchScope),
    DeadlockCheck,
    Reshuffling,
}

#[derive(Debug, Clone)]
struct PendingSwap {
    clicked: Coord,
    target: Coord,
    clicked_matches: MatchSet,
    target_matches: MatchSet,
}

/// A bomb waiting for the clearing pass to free its cell.
#[derive(Debug, Clone, Copy)]
struct PendingBomb {
    at: Coord,
    item: Item,
}

#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    grid: Grid,
    rng: SimpleRng,
    next_id: u32,
    phase: Phase,
    steps: VecDeque<Step>,
    events: Vec<BoardEvent>,
    swap: Option<PendingSwap>,
    bombs: ArrayVec<PendingBomb, 2>,
    matches: MatchSet,
    columns: Vec<i32>,
    moved: Vec<Coord>,
    multiplier: u32,
    collectible_count: u32,
    reshuffles: u32,
    resolution: Resolution,
    outcome: Option<SwapOutcome>,
}

impl Board {
    /// Empty board of `config`'s size, randomly filled.
    ///
    /// The drop-in movements of the initial fill are the first step.
    pub fn new(config: BoardConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.width, config.height);
        let mut board = Self::assemble(config, grid, seed);
        let drops = board.fill_board();
        board.push_moves(drops);
        Ok(board)
    }

    /// Build a board from a layout: tiles, then items, then a random fill of
    /// the remaining cells.
    pub fn setup(layout: &Layout, seed: u32) -> Result<Self, ConfigError> {
        layout.config.validate()?;
        let grid = Grid::new(layout.config.width, layout.config.height);
        let mut board = Self::assemble(layout.config.clone(), grid, seed);

        for placement in &layout.tiles {
            board.grid.set_tile(placement.coord(), placement.prefab.tile());
        }

        let mut drops = Vec::new();
        for placement in &layout.items {
            if let Some(drop) = board.spawn_prefab(&placement.prefab, placement.coord()) {
                drops.push(drop);
            }
        }
        board.collectible_count = board.grid.all_collectibles().len() as u32;
        drops.extend(board.fill_board());
        board.push_moves(drops);

        tracing::debug!(
            width = board.grid.width(),
            height = board.grid.height(),
            items = board.grid.item_count(),
            "board set up"
        );
        Ok(board)
    }

    /// Wrap a ready-made grid. Nothing is filled; the board starts idle.
    /// `config`'s dimensions are replaced by the grid's.
    pub fn with_grid(config: BoardConfig, grid: Grid, seed: u32) -> Result<Self, ConfigError> {
        let config = BoardConfig {
            width: grid.width(),
            height: grid.height(),
            ..config
        };
        config.validate()?;
        let next_id = grid.max_item_id();
        let mut board = Self::assemble(config, grid, seed);
        board.next_id = next_id;
        board.collectible_count = board.grid.all_collectibles().len() as u32;
        Ok(board)
    }

    fn assemble(config: BoardConfig, grid: Grid, seed: u32) -> Self {
        Self {
            config,
            grid,
            rng: SimpleRng::new(seed),
            next_id: 0,
            phase: Phase::Idle,
            steps: VecDeque::new(),
            events: Vec::new(),
            swap: None,
            bombs: ArrayVec::new(),
            matches: MatchSet::new(),
            columns: Vec::new(),
            moved: Vec::new(),
            multiplier: 0,
            collectible_count: 0,
            reshuffles: 0,
            resolution: Resolution::default(),
            outcome: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn collectible_count(&self) -> u32 {
        self.collectible_count
    }

    /// True from swap acceptance until the machine is idle with no step left.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle || !self.steps.is_empty()
    }

    /// Events queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Outcome of the last finished resolution (consumed on read).
    pub fn take_outcome(&mut self) -> Option<SwapOutcome> {
        self.outcome.take()
    }

    /// A swap the deadlock analyzer thinks makes a match.
    pub fn hint(&self) -> Option<MoveHint> {
        find_move(&self.grid, self.config.deadlock_window)
    }

    pub fn is_deadlocked(&self) -> bool {
        is_deadlocked(&self.grid, self.config.deadlock_window)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self)
    }

    /// Swap the items at `a` and `b` and start resolving.
    ///
    /// The grid is updated at once; the first step carries the two swap
    /// movements.
    pub fn request_swap(&mut self, a: Coord, b: Coord) -> Result<(), SwapRejected> {
        if self.is_busy() {
            return Err(SwapRejected::Busy);
        }
        if !self.grid.within_bounds(a) || !self.grid.within_bounds(b) {
            return Err(SwapRejected::OutOfBounds);
        }
        if !a.is_adjacent(b) {
            return Err(SwapRejected::NotAdjacent);
        }
        if !self.grid.swap(a, b) {
            return Err(SwapRejected::EmptyCell);
        }

        tracing::debug!(clicked = %a, target = %b, "swap accepted");
        self.begin_resolution();
        let moves = self.swap_moves(a, b);
        self.push_moves(moves);
        self.swap = Some(PendingSwap {
            clicked: a,
            target: b,
            clicked_matches: MatchSet::new(),
            target_matches: MatchSet::new(),
        });
        self.set_phase(Phase::Resolving);
        Ok(())
    }

    /// Shuffle the board on demand. Only accepted while idle.
    pub fn request_shuffle(&mut self) -> Result<(), SwapRejected> {
        if self.is_busy() {
            return Err(SwapRejected::Busy);
        }
        self.begin_resolution();
        self.swap = None;
        self.set_phase(Phase::Reshuffling);
        Ok(())
    }

    /// Run phases until one needs the caller.
    pub fn advance(&mut self) -> Step {
        loop {
            if let Some(step) = self.steps.pop_front() {
                return step;
            }
            match self.phase {
                Phase::Idle => return Step::Idle,
                Phase::Resolving => self.set_phase(Phase::Matching),
                Phase::Matching => self.evaluate_swap(),
                Phase::BombResolution => self.drop_bombs(),
                Phase::Clearing => self.clear_matches(),
                Phase::Collapsing => self.collapse(),
                Phase::Refilling => self.refill(),
                Phase::Rematching(scope) => self.rematch(scope),
                Phase::DeadlockCheck => self.check_deadlock(),
                Phase::Reshuffling => self.reshuffle(),
            }
        }
    }

    /// Advance until idle, treating every movement and pause as instant.
    /// Returns the steps taken, without the final [`Step::Idle`].
    ///
    /// After [`MAX_STEPS`] steps the resolution is cut short with
    /// [`Self::force_idle`].
    pub fn run_to_idle(&mut self) -> Vec<Step> {
        let mut steps = Vec::new();
        for _ in 0..MAX_STEPS {
            match self.advance() {
                Step::Idle => return steps,
                step => steps.push(step),
            }
        }
        tracing::warn!(steps = steps.len(), "resolution did not settle");
        self.force_idle();
        steps
    }

    /// End the current resolution where it stands. Queued steps are
    /// dropped and the resolution settles with what it has scored so far.
    /// The grid may be left with holes or open matches.
    pub fn force_idle(&mut self) {
        if !self.is_busy() {
            return;
        }
        tracing::debug!(phase = ?self.phase, dropped = self.steps.len(), "resolution cut short");
        self.steps.clear();
        self.swap = None;
        self.bombs.clear();
        self.matches = MatchSet::new();
        self.columns.clear();
        self.moved.clear();
        self.finish();
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
    }

    fn begin_resolution(&mut self) {
        self.resolution = Resolution::default();
        self.outcome = None;
        self.multiplier = 0;
        self.reshuffles = 0;
        self.bombs.clear();
        self.matches = MatchSet::new();
    }

    fn push_moves(&mut self, moves: Vec<MoveRequest>) {
        if !moves.is_empty() {
            self.steps.push_back(Step::Moves(moves));
        }
    }

    fn push_wait(&mut self, ms: u32) {
        if ms > 0 {
            self.steps.push_back(Step::Wait(Duration::from_millis(ms as u64)));
        }
    }

    fn next_item_id(&mut self) -> ItemId {
        self.next_id += 1;
        ItemId(self.next_id)
    }

    fn random_value(&mut self) -> MatchValue {
        self.rng
            .pick(&self.config.palette)
            .unwrap_or(MatchValue::None)
    }

    /// Movements of the two items that just traded cells.
    fn swap_moves(&self, a: Coord, b: Coord) -> Vec<MoveRequest> {
        let duration = self.config.timings.swap();
        [(a, b), (b, a)]
            .into_iter()
            .filter_map(|(from, to)| {
                self.grid.item(to).map(|item| MoveRequest {
                    item: item.id,
                    from,
                    to,
                    duration,
                })
            })
            .collect()
    }

    /// Announce a new item and build its drop-in movement.
    fn drop_in(&mut self, item: Item) -> MoveRequest {
        self.events.push(BoardEvent::ItemSpawned { item });
        let at = item.coord;
        MoveRequest {
            item: item.id,
            from: Coord::new(at.x, at.y + self.config.timings.fill_y_offset),
            to: at,
            duration: self.config.timings.fill_move(),
        }
    }

    fn spawn_prefab(&mut self, prefab: &ItemPrefab, at: Coord) -> Option<MoveRequest> {
        let id = self.next_item_id();
        let score = prefab.score.unwrap_or(self.config.item_score);
        if !self.grid.place(Item::new(id, prefab.value, prefab.kind, score), at) {
            return None;
        }
        let item = *self.grid.item(at)?;
        Some(self.drop_in(item))
    }

    fn can_add_collectible(&mut self) -> bool {
        self.rng.chance(self.config.collectible_chance)
            && self.collectible_count < self.config.max_collectibles
    }

    /// Fill every empty non-obstacle cell, column by column from the bottom.
    fn fill_board(&mut self) -> Vec<MoveRequest> {
        let top = self.grid.height() - 1;
        let cells: Vec<Coord> = self.grid.coords().collect();
        let mut drops = Vec::new();

        for at in cells {
            if !self.grid.is_fillable(at) {
                continue;
            }
            if at.y == top && self.can_add_collectible() {
                let id = self.next_item_id();
                let kind = ItemKind::Collectible(self.config.collectible_flags);
                let item = Item::new(id, MatchValue::None, kind, self.config.item_score);
                if self.grid.place(item, at) {
                    self.collectible_count += 1;
                }
            } else {
                self.fill_random_at(at);
            }
            if let Some(item) = self.grid.item(at).copied() {
                drops.push(self.drop_in(item));
            }
        }
        drops
    }

    /// Place a random item, re-rolling its value while it completes a run.
    fn fill_random_at(&mut self, at: Coord) {
        let id = self.next_item_id();
        let value = self.random_value();
        let item = Item::new(id, value, ItemKind::Normal, self.config.item_score);
        if !self.grid.place(item, at) {
            return;
        }

        let mut iterations = 0;
        while has_match_on_fill(&self.grid, at, self.config.min_match) {
            if iterations >= self.config.fill_max_iterations {
                tracing::trace!(%at, "fill gave up avoiding a match");
                break;
            }
            let value = self.random_value();
            if let Some(item) = self.grid.item_mut(at) {
                item.value = value;
            }
            iterations += 1;
        }
    }

    /// Apply the color-bomb rule to a swap. Returns the cells it matches.
    fn color_matches(&mut self, a: Coord, b: Coord) -> MatchSet {
        match color_swap_rule(&self.grid, a, b) {
            ColorSwap::None => MatchSet::new(),
            ColorSwap::Assign { bomb, value } => {
                let partner = if bomb == a { b } else { a };
                let Some(source) = self.grid.item(partner).copied() else {
                    return MatchSet::new();
                };
                if !value.is_matchable() {
                    return MatchSet::new();
                }
                if let Some(item) = self.grid.item_mut(bomb) {
                    item.change_color(&source);
                }
                self.grid.find_all_value(value).into_iter().collect()
            }
            ColorSwap::FullClear => self.grid.items().map(|item| item.coord).collect(),
        }
    }

    fn evaluate_swap(&mut self) {
        let Some(mut swap) = self.swap.take() else {
            self.finish();
            return;
        };
        let min = self.config.min_match;
        swap.clicked_matches = matches_at(&self.grid, swap.clicked, min);
        swap.target_matches = matches_at(&self.grid, swap.target, min);
        let color = self.color_matches(swap.clicked, swap.target);

        if swap.clicked_matches.is_empty() && swap.target_matches.is_empty() && color.is_empty() {
            self.grid.swap(swap.clicked, swap.target);
            let moves = self.swap_moves(swap.clicked, swap.target);
            self.push_moves(moves);
            self.events.push(BoardEvent::SwapReverted {
                a: swap.clicked,
                b: swap.target,
            });
            self.outcome = Some(SwapOutcome::Reverted);
            tracing::debug!(clicked = %swap.clicked, target = %swap.target, "swap reverted");
            self.set_phase(Phase::Idle);
            return;
        }

        self.events.push(BoardEvent::MoveSpent);
        let mut matches = swap.clicked_matches.clone();
        matches.union(&swap.target_matches);
        matches.union(&color);
        self.matches = matches;
        self.swap = Some(swap);
        self.set_phase(Phase::BombResolution);
    }

    /// Decide the bombs each swapped endpoint spawns. They are written into
    /// the grid after the first clearing pass.
    fn drop_bombs(&mut self) {
        if let Some(swap) = self.swap.take() {
            let axis = SwapAxis::between(swap.clicked, swap.target).unwrap_or(SwapAxis::Horizontal);
            let plans = [
                (swap.clicked, bomb_for_set(&swap.clicked_matches, axis)),
                (swap.target, bomb_for_set(&swap.target_matches, axis)),
            ];
            for (at, kind) in plans {
                let Some(kind) = kind else {
                    continue;
                };
                let value = match self.grid.item(at) {
                    Some(item) if kind != BombKind::Color && !item.is_color_bomb() => item.value,
                    _ => MatchValue::None,
                };
                let id = self.next_item_id();
                let item = Item::new(id, value, ItemKind::bomb(kind), self.config.item_score);
                tracing::debug!(%at, kind = kind.as_str(), "bomb spawned");
                if self.bombs.try_push(PendingBomb { at, item }).is_err() {
                    tracing::warn!(%at, "pending bomb dropped");
                }
            }
        }

        self.multiplier = 1;
        self.resolution.chain = 1;
        self.enter_clearing();
    }

    fn enter_clearing(&mut self) {
        self.push_wait(self.config.pacing.pre_clear_ms);
        self.set_phase(Phase::Clearing);
    }

    /// One clearing pass over the current match set.
    fn clear_matches(&mut self) {
        let mut set = std::mem::take(&mut self.matches);
        let first_blast = bombed_items(&self.grid, &set);
        set.union(&first_blast);
        let bombed = bombed_items(&self.grid, &set);
        set.union(&bombed);
        for at in self.grid.collectibles_in_row(0, true) {
            set.insert(at);
        }

        let grid = &self.grid;
        set.retain(|at| match grid.item(*at) {
            None => false,
            Some(item) => match item.collectible() {
                None => true,
                Some(flags) => (at.y == 0 && flags.cleared_by_bottom) || flags.cleared_by_bomb,
            },
        });

        self.columns = Grid::columns_of(&set);
        let removed: Vec<Item> = set.iter().filter_map(|at| self.grid.clear(*at)).collect();
        let pass = calculate_clear_score(
            removed.iter().map(|item| item.score_value),
            self.multiplier,
            self.config.match_bonus,
        );
        tracing::debug!(
            cleared = pass.items,
            multiplier = self.multiplier,
            bonus = pass.bonus,
            points = pass.total,
            "clearing"
        );
        self.resolution.cleared += pass.items;
        self.resolution.score = self.resolution.score.saturating_add(pass.total);

        for item in removed {
            if item.is_collectible() {
                self.collectible_count = self.collectible_count.saturating_sub(1);
            }
            self.events.push(BoardEvent::ItemCleared {
                item,
                score: item_score(item.score_value, self.multiplier, pass.bonus),
                bombed: bombed.contains(item.coord),
            });
        }

        for at in &set {
            if let Some(damage) = self.grid.break_tile(*at) {
                self.events.push(BoardEvent::TileBroken { at: *at, damage });
            }
        }

        let bombs = std::mem::take(&mut self.bombs);
        for bomb in bombs {
            let Some(kind) = bomb.item.bomb_kind() else {
                continue;
            };
            if self.grid.place(bomb.item, bomb.at) {
                self.resolution.bombs += 1;
                self.events.push(BoardEvent::BombActivated { at: bomb.at, kind });
            }
        }

        self.push_wait(self.config.pacing.post_clear_ms);
        self.set_phase(Phase::Collapsing);
    }

    /// Pull items down into the empty cells of every touched column.
    fn collapse(&mut self) {
        let columns = std::mem::take(&mut self.columns);
        let duration = self.config.timings.collapse();
        let height = self.grid.height();
        let mut moves = Vec::new();
        let mut moved = Vec::new();

        for x in columns {
            for y in 0..height - 1 {
                let at = Coord::new(x, y);
                if !self.grid.is_fillable(at) {
                    continue;
                }
                let Some(from) = (y + 1..height)
                    .map(|j| Coord::new(x, j))
                    .find(|c| self.grid.is_occupied(*c))
                else {
                    break;
                };
                if !self.grid.move_item(from, at) {
                    continue;
                }
                if let Some(item) = self.grid.item(at) {
                    moves.push(MoveRequest {
                        item: item.id,
                        from,
                        to: at,
                        duration,
                    });
                    moved.push(at);
                }
            }
        }

        self.moved = moved;
        self.push_moves(moves);
        self.push_wait(self.config.pacing.settle_ms);
        self.set_phase(Phase::Rematching(RematchScope::Moved));
    }

    fn refill(&mut self) {
        let drops = self.fill_board();
        self.push_moves(drops);
        self.push_wait(self.config.pacing.settle_ms);
        self.set_phase(Phase::Rematching(RematchScope::Board));
    }

    fn rematch(&mut self, scope: RematchScope) {
        let min = self.config.min_match;
        let mut matches = match scope {
            RematchScope::Moved => {
                let moved = std::mem::take(&mut self.moved);
                matches_at_many(&self.grid, &moved, min)
            }
            RematchScope::Board => find_all_matches(&self.grid, min),
        };
        for at in self.grid.collectibles_in_row(0, true) {
            matches.insert(at);
        }

        if matches.is_empty() {
            self.set_phase(match scope {
                RematchScope::Moved => Phase::Refilling,
                RematchScope::Board => Phase::DeadlockCheck,
            });
            return;
        }

        self.multiplier += 1;
        self.resolution.chain = self.resolution.chain.max(self.multiplier);
        self.events.push(BoardEvent::ChainBonus {
            multiplier: self.multiplier,
        });
        self.matches = matches;
        self.enter_clearing();
    }

    fn check_deadlock(&mut self) {
        if is_deadlocked(&self.grid, self.config.deadlock_window) {
            if self.reshuffles < self.config.max_reshuffles {
                self.events.push(BoardEvent::Deadlocked);
                self.push_wait(self.config.pacing.deadlock_ms);
                self.set_phase(Phase::Reshuffling);
                return;
            }
            tracing::warn!(reshuffles = self.reshuffles, "still deadlocked, giving up reshuffling");
        }
        self.finish();
    }

    fn reshuffle(&mut self) {
        let relocations = shuffle_board(
            &mut self.grid,
            &mut self.rng,
            self.config.min_match,
            self.config.fill_max_iterations,
        );
        self.reshuffles += 1;
        self.resolution.reshuffles += 1;
        tracing::info!(moved = relocations.len(), attempt = self.reshuffles, "board shuffled");
        self.events.push(BoardEvent::Shuffled {
            moved: relocations.len(),
        });

        let duration = self.config.timings.swap();
        let moves = relocations
            .into_iter()
            .map(|r| MoveRequest {
                item: r.id,
                from: r.from,
                to: r.to,
                duration,
            })
            .collect();
        self.push_moves(moves);
        self.push_wait(self.config.pacing.shuffle_ms);
        self.set_phase(Phase::Refilling);
    }

    fn finish(&mut self) {
        self.events.push(BoardEvent::Settled);
        self.outcome = Some(SwapOutcome::Resolved(self.resolution));
        tracing::debug!(
            cleared = self.resolution.cleared,
            score = self.resolution.score,
            chain = self.resolution.chain,
            "settled"
        );
        self.set_phase(Phase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pacing;
    use crate::types::CollectibleFlags;

    fn quiet_config() -> BoardConfig {
        BoardConfig {
            collectible_chance: 0.0,
            pacing: Pacing::instant(),
            ..BoardConfig::default()
        }
    }

    fn board(rows: &[&str]) -> Board {
        Board::with_grid(quiet_config(), Grid::from_rows(rows), 7).unwrap()
    }

    fn cleared(events: &[BoardEvent]) -> Vec<(Item, u32, bool)> {
        events
            .iter()
            .filter_map(|e| match e {
                BoardEvent::ItemCleared { item, score, bombed } => Some((*item, *score, *bombed)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_board_is_full_and_match_free() {
        let mut board = Board::new(quiet_config(), 42).unwrap();
        assert!(board.is_busy());
        let steps = board.run_to_idle();
        assert_eq!(steps.len(), 1);
        assert!(!board.is_busy());
        assert_eq!(board.grid().item_count(), 64);
        assert!(find_all_matches(board.grid(), 3).is_empty());
        assert!(board.grid().is_consistent());

        let spawned = board
            .drain_events()
            .iter()
            .filter(|e| matches!(e, BoardEvent::ItemSpawned { .. }))
            .count();
        assert_eq!(spawned, 64);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = BoardConfig::default().with_size(0, 0);
        assert!(matches!(
            Board::new(config, 1),
            Err(ConfigError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn test_swap_rejections() {
        let mut dense = board(&["RGB", "GBR"]);
        assert_eq!(
            dense.request_swap(Coord::new(0, 0), Coord::new(2, 0)),
            Err(SwapRejected::NotAdjacent)
        );
        assert_eq!(
            dense.request_swap(Coord::new(2, 0), Coord::new(3, 0)),
            Err(SwapRejected::OutOfBounds)
        );

        let mut sparse = board(&["R.B", "GBR"]);
        assert_eq!(
            sparse.request_swap(Coord::new(0, 1), Coord::new(1, 1)),
            Err(SwapRejected::EmptyCell)
        );
        assert!(!sparse.is_busy());
    }

    #[test]
    fn test_busy_board_rejects_swaps() {
        let mut board = board(&["RGB", "GBR"]);
        board.request_swap(Coord::new(0, 0), Coord::new(1, 0)).unwrap();
        assert!(board.is_busy());
        assert_eq!(
            board.request_swap(Coord::new(1, 1), Coord::new(2, 1)),
            Err(SwapRejected::Busy)
        );
        assert_eq!(board.request_shuffle(), Err(SwapRejected::Busy));
    }

    #[test]
    fn test_no_match_swap_is_reverted() {
        let rows = ["RGB", "GBR"];
        let mut board = board(&rows);
        board.request_swap(Coord::new(0, 0), Coord::new(1, 0)).unwrap();
        let steps = board.run_to_idle();

        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| matches!(s, Step::Moves(m) if m.len() == 2)));
        assert_eq!(board.grid().to_rows(), rows);
        assert_eq!(board.take_outcome(), Some(SwapOutcome::Reverted));
        assert_eq!(
            board.drain_events(),
            vec![BoardEvent::SwapReverted {
                a: Coord::new(0, 0),
                b: Coord::new(1, 0)
            }]
        );
    }

    #[test]
    fn test_straight_four_from_horizontal_swap_spawns_row_bomb() {
        let mut board = board(&[
            "BRG", //
            "RGB", //
            "GRY", //
            "YRB",
        ]);
        board.request_swap(Coord::new(0, 2), Coord::new(1, 2)).unwrap();
        board.run_to_idle();
        let events = board.drain_events();

        assert_eq!(events.iter().filter(|e| **e == BoardEvent::MoveSpent).count(), 1);
        assert!(events.contains(&BoardEvent::BombActivated {
            at: Coord::new(1, 2),
            kind: BombKind::Row
        }));

        let first_pass: Vec<_> = cleared(&events).into_iter().take(4).collect();
        assert!(first_pass.iter().all(|(item, score, _)| item.coord.x == 1 && *score == 40));
        assert!(board.grid().is_consistent());
    }

    #[test]
    fn test_corner_match_spawns_adjacent_bomb() {
        let mut board = board(&[
            "BRG", //
            "GRB", //
            "RGR", //
            "YRB",
        ]);
        board.request_swap(Coord::new(1, 0), Coord::new(1, 1)).unwrap();
        board.run_to_idle();
        let events = board.drain_events();
        assert!(events.contains(&BoardEvent::BombActivated {
            at: Coord::new(1, 1),
            kind: BombKind::Adjacent
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, BoardEvent::BombActivated { kind: BombKind::Color, .. })));
    }

    #[test]
    fn test_blast_spares_collectible_until_egress() {
        let mut grid = Grid::from_rows(&[
            "GRBY", //
            "R@BG", //
            "RYGB",
        ]);
        grid.item_mut(Coord::new(0, 1)).unwrap().kind = ItemKind::RowBomb;
        let mut board = Board::with_grid(quiet_config(), grid, 3).unwrap();
        let collectible = board.grid().item(Coord::new(1, 1)).unwrap().id;

        board.request_swap(Coord::new(1, 2), Coord::new(0, 2)).unwrap();
        board.run_to_idle();
        let cleared = cleared(&board.drain_events());

        let first_pass: Vec<Coord> = cleared.iter().take(5).map(|(item, _, _)| item.coord).collect();
        assert!(first_pass.contains(&Coord::new(2, 1)));
        assert!(first_pass.contains(&Coord::new(3, 1)));
        assert!(!first_pass.contains(&Coord::new(1, 1)));

        for (item, _, _) in cleared.iter().filter(|(item, _, _)| item.id == collectible) {
            assert_eq!(item.coord.y, 0);
        }
    }

    #[test]
    fn test_collectible_leaves_at_bottom() {
        let mut board = board(&["G@R", "RRG"]);
        assert_eq!(board.collectible_count(), 1);
        board.request_swap(Coord::new(2, 0), Coord::new(2, 1)).unwrap();
        board.run_to_idle();
        let events = board.drain_events();

        assert!(events.contains(&BoardEvent::ChainBonus { multiplier: 2 }));
        assert!(cleared(&events)
            .iter()
            .any(|(item, _, _)| item.is_collectible() && item.coord == Coord::new(1, 0)));
        assert_eq!(board.collectible_count(), 0);
    }

    #[test]
    fn test_force_idle_settles_mid_resolution() {
        let mut board = board(&["GBR", "RRG"]);
        board.request_swap(Coord::new(2, 0), Coord::new(2, 1)).unwrap();
        assert!(matches!(board.advance(), Step::Moves(m) if m.len() == 2));
        // Clears the run and returns the collapse movements.
        assert!(matches!(board.advance(), Step::Moves(_)));

        board.force_idle();
        assert!(!board.is_busy());
        assert_eq!(board.advance(), Step::Idle);
        // The top row is left empty; nothing was refilled.
        assert_eq!(board.grid().item_count(), 3);

        let events = board.drain_events();
        assert_eq!(cleared(&events).len(), 3);
        assert_eq!(events.last(), Some(&BoardEvent::Settled));
        assert!(matches!(
            board.take_outcome(),
            Some(SwapOutcome::Resolved(r)) if r.cleared == 3 && r.score == 60
        ));
        assert!(board.request_swap(Coord::new(0, 0), Coord::new(1, 0)).is_ok());
    }

    #[test]
    fn test_force_idle_on_idle_board_does_nothing() {
        let mut board = board(&["RGB", "GBR"]);
        board.force_idle();
        assert!(board.drain_events().is_empty());
        assert_eq!(board.take_outcome(), None);
    }

    #[test]
    fn test_reshuffles_are_bounded() {
        let mut board = board(&["RG", "BY"]);
        board.request_shuffle().unwrap();
        board.run_to_idle();
        let events = board.drain_events();

        let shuffles = events
            .iter()
            .filter(|e| matches!(e, BoardEvent::Shuffled { .. }))
            .count();
        let deadlocks = events.iter().filter(|e| **e == BoardEvent::Deadlocked).count();
        assert_eq!(shuffles, 3);
        assert_eq!(deadlocks, 2);
        assert_eq!(events.last(), Some(&BoardEvent::Settled));
        assert!(!board.is_busy());
    }

    #[test]
    fn test_obstacles_stay_empty_through_refill() {
        let mut grid = Grid::from_rows(&["...", ".#.", "..."]);
        grid.set_tile(Coord::new(0, 0), crate::grid::Tile::breakable(1));
        let mut board = Board::with_grid(quiet_config(), grid, 9).unwrap();
        board.request_shuffle().unwrap();
        board.run_to_idle();
        assert!(board.grid().item(Coord::new(1, 1)).is_none());
        assert_eq!(board.grid().item_count(), 8);
    }

    #[test]
    fn test_refill_spawns_collectibles_in_top_row_only() {
        let config = BoardConfig {
            collectible_chance: 1.0,
            max_collectibles: 2,
            collectible_flags: CollectibleFlags::default(),
            pacing: Pacing::instant(),
            ..BoardConfig::default()
        };
        let mut board = Board::new(config, 11).unwrap();
        board.run_to_idle();
        let collectibles = board.grid().all_collectibles();
        assert_eq!(collectibles.len(), 2);
        assert_eq!(board.collectible_count(), 2);
        assert!(collectibles.iter().all(|c| c.y == 7));
    }
}
