//! Async driver that plays a [`Board`]'s steps against a [`BoardHost`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Board, LevelGoal, Resolution, Step, SwapOutcome, SwapRejected, MAX_STEPS};
use crate::host::{self, clamp_scale, BoardHost, MoveHandle};
use crate::types::Coord;

/// Shared view of whether a board is resolving.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_board_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, busy: bool) {
        self.0.store(busy, Ordering::Release);
    }
}

pub struct BoardDriver<H> {
    board: Board,
    host: H,
    goal: LevelGoal,
    pacing_scale: f32,
    step_limit: usize,
    busy: BusyFlag,
}

impl<H: BoardHost> BoardDriver<H> {
    pub fn new(board: Board, host: H, goal: LevelGoal) -> Self {
        let busy = BusyFlag::default();
        busy.set(board.is_busy());
        Self {
            board,
            host,
            goal,
            pacing_scale: 1.0,
            step_limit: MAX_STEPS,
            busy,
        }
    }

    /// Multiply every pacing pause by `scale`. Zero removes them.
    /// The scale is clamped to `0..=MAX_SCALE`.
    pub fn with_pacing_scale(mut self, scale: f32) -> Self {
        self.pacing_scale = clamp_scale(scale);
        self
    }

    /// Cut a resolution short after `limit` steps (default [`MAX_STEPS`]).
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn goal(&self) -> &LevelGoal {
        &self.goal
    }

    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn into_parts(self) -> (Board, H, LevelGoal) {
        (self.board, self.host, self.goal)
    }

    /// Play out whatever the board has queued, such as the drop-in of a
    /// freshly built board.
    pub async fn settle(&mut self) {
        if self.board.is_busy() {
            self.busy.set(true);
            self.run().await;
            self.board.take_outcome();
        }
        self.busy.set(false);
    }

    /// Accept a swap without resolving it. Follow with [`Self::resolve`].
    pub fn begin_swap(&mut self, a: Coord, b: Coord) -> Result<(), SwapRejected> {
        if self.goal.is_game_over() {
            return Err(SwapRejected::GameOver);
        }
        self.board.request_swap(a, b)?;
        self.busy.set(true);
        Ok(())
    }

    /// Accept a manual reshuffle without resolving it.
    pub fn begin_shuffle(&mut self) -> Result<(), SwapRejected> {
        self.board.request_shuffle()?;
        self.busy.set(true);
        Ok(())
    }

    /// Drive the board back to idle.
    pub async fn resolve(&mut self) -> SwapOutcome {
        self.run().await;
        self.busy.set(false);
        self.board
            .take_outcome()
            .unwrap_or(SwapOutcome::Resolved(Resolution::default()))
    }

    pub async fn swap(&mut self, a: Coord, b: Coord) -> Result<SwapOutcome, SwapRejected> {
        self.begin_swap(a, b)?;
        Ok(self.resolve().await)
    }

    pub async fn shuffle(&mut self) -> Result<SwapOutcome, SwapRejected> {
        self.begin_shuffle()?;
        Ok(self.resolve().await)
    }

    async fn run(&mut self) {
        for _ in 0..self.step_limit {
            let step = self.board.advance();
            self.forward_events();
            match step {
                Step::Idle => {
                    tracing::debug!(
                        score = self.goal.score(),
                        moves_left = self.goal.moves_left(),
                        "board settled"
                    );
                    return;
                }
                Step::Moves(moves) => {
                    let handles: Vec<MoveHandle> = moves
                        .into_iter()
                        .map(|request| self.host.move_item(request))
                        .collect();
                    for handle in handles {
                        handle.await;
                    }
                }
                Step::Wait(pause) => {
                    let pause = self.scaled(pause);
                    if !pause.is_zero() {
                        tokio::time::sleep(pause).await;
                    }
                }
            }
        }
        tracing::warn!(limit = self.step_limit, "resolution did not settle, cutting it short");
        self.board.force_idle();
        self.forward_events();
    }

    fn forward_events(&mut self) {
        for event in self.board.drain_events() {
            self.goal.apply(&event);
            host::dispatch(&mut self.host, &event);
        }
    }

    fn scaled(&self, pause: Duration) -> Duration {
        pause.mul_f32(self.pacing_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardConfig, GoalConfig, Grid};
    use crate::host::{InstantHost, RecordingHost, TimedHost};

    fn driver<H: BoardHost>(rows: &[&str], host: H, moves: u32) -> BoardDriver<H> {
        let board = Board::with_grid(BoardConfig::default(), Grid::from_rows(rows), 7).unwrap();
        let goal = LevelGoal::new(&GoalConfig {
            moves,
            ..GoalConfig::default()
        });
        BoardDriver::new(board, host, goal)
    }

    #[tokio::test]
    async fn test_swap_resolves_and_scores() {
        let mut driver = driver(&["GBR", "RRG"], RecordingHost::new(), 10).with_pacing_scale(0.0);
        let outcome = driver
            .swap(Coord::new(2, 0), Coord::new(2, 1))
            .await
            .unwrap();

        let SwapOutcome::Resolved(resolution) = outcome else {
            panic!("expected a resolved swap, got {outcome:?}");
        };
        assert!(resolution.cleared >= 3);
        assert_eq!(driver.goal().moves_left(), 9);
        assert_eq!(driver.goal().score(), driver.host().total_score());
        assert_eq!(driver.host().settled, 1);
        assert!(!driver.busy_flag().is_board_busy());
        assert!(!driver.board().is_busy());
    }

    #[tokio::test]
    async fn test_reverted_swap_keeps_moves() {
        let mut driver = driver(&["RGB", "GBR"], RecordingHost::new(), 5).with_pacing_scale(0.0);
        let outcome = driver
            .swap(Coord::new(0, 0), Coord::new(1, 0))
            .await
            .unwrap();
        assert!(outcome.is_reverted());
        assert_eq!(driver.goal().moves_left(), 5);
        assert_eq!(driver.host().reverted, 1);
        // Swap there and back.
        assert_eq!(driver.host().moves.len(), 4);
    }

    #[tokio::test]
    async fn test_no_moves_left_rejects_swap() {
        let mut driver = driver(&["GBR", "RRG"], InstantHost, 1).with_pacing_scale(0.0);
        driver
            .swap(Coord::new(2, 0), Coord::new(2, 1))
            .await
            .unwrap();
        assert!(driver.goal().is_game_over());
        assert_eq!(
            driver.swap(Coord::new(0, 0), Coord::new(1, 0)).await,
            Err(SwapRejected::GameOver)
        );
    }

    #[tokio::test]
    async fn test_board_rejection_passes_through() {
        let mut driver = driver(&["GBR", "RRG"], InstantHost, 5);
        assert_eq!(
            driver.swap(Coord::new(0, 0), Coord::new(2, 0)).await,
            Err(SwapRejected::NotAdjacent)
        );
        assert!(!driver.busy_flag().is_board_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_resolution_takes_time() {
        let mut driver = driver(&["GBR", "RRG"], TimedHost::new(1.0), 5);
        let start = tokio::time::Instant::now();
        driver
            .swap(Coord::new(2, 0), Coord::new(2, 1))
            .await
            .unwrap();
        let config = BoardConfig::default();
        let pre_clear = Duration::from_millis(u64::from(config.pacing.pre_clear_ms));
        assert!(start.elapsed() >= config.timings.swap() + pre_clear);
    }

    #[tokio::test]
    async fn test_step_limit_cuts_resolution_short() {
        let mut driver = driver(&["GBR", "RRG"], RecordingHost::new(), 5)
            .with_pacing_scale(0.0)
            .with_step_limit(1);
        let outcome = driver
            .swap(Coord::new(2, 0), Coord::new(2, 1))
            .await
            .unwrap();

        assert!(!outcome.is_reverted());
        // Only the swap movements ran; the match was never evaluated.
        assert_eq!(driver.host().moves.len(), 2);
        assert_eq!(driver.host().settled, 1);
        assert_eq!(driver.goal().moves_left(), 5);
        assert!(!driver.board().is_busy());
        assert!(!driver.busy_flag().is_board_busy());

        // The board takes swaps again.
        let mut driver = driver.with_step_limit(MAX_STEPS);
        assert!(driver.swap(Coord::new(0, 0), Coord::new(1, 0)).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_pacing_scale_is_clamped() {
        let mut driver = driver(&["GBR", "RRG"], InstantHost, 5).with_pacing_scale(f32::INFINITY);
        driver
            .swap(Coord::new(2, 0), Coord::new(2, 1))
            .await
            .unwrap();
        assert!(!driver.board().is_busy());

        let driver = driver.with_pacing_scale(f32::NAN);
        assert_eq!(driver.scaled(Duration::from_secs(1)), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_settle_plays_initial_fill() {
        let board = Board::new(BoardConfig::default().headless(), 3).unwrap();
        let mut driver = BoardDriver::new(board, RecordingHost::new(), LevelGoal::default());
        assert!(driver.busy_flag().is_board_busy());
        driver.settle().await;
        assert!(!driver.busy_flag().is_board_busy());
        assert_eq!(driver.host().spawned, 64);
        assert_eq!(driver.host().moves.len(), 64);
    }

    #[tokio::test]
    async fn test_shuffle_keeps_item_count() {
        let board = Board::new(BoardConfig::default().headless(), 11).unwrap();
        let mut driver = BoardDriver::new(board, RecordingHost::new(), LevelGoal::default());
        driver.settle().await;
        let before = driver.board().grid().item_count();
        let outcome = driver.shuffle().await.unwrap();
        assert!(!outcome.is_reverted());
        assert_eq!(driver.board().grid().item_count(), before);
        assert!(driver.host().shuffles >= 1);
    }
}
