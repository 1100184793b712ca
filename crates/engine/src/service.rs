//! Command loop that owns a [`BoardDriver`] on its own task.
//!
//! Callers talk to it through a cloneable [`BoardHandle`]. Swaps and
//! shuffles that arrive while a resolution is running are refused with
//! [`SwapRejected::Busy`]; snapshot and goal queries wait until the board is
//! idle so they never observe a half-resolved grid.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::core::{BoardSnapshot, LevelGoal, MoveHint, SwapOutcome, SwapRejected};
use crate::driver::{BoardDriver, BusyFlag};
use crate::host::BoardHost;
use crate::types::Coord;

const COMMAND_BUFFER: usize = 32;

type SwapReply = oneshot::Sender<Result<SwapOutcome, SwapRejected>>;

#[derive(Debug)]
pub enum BoardCommand {
    Swap { a: Coord, b: Coord, reply: SwapReply },
    Shuffle { reply: SwapReply },
    Snapshot { reply: oneshot::Sender<BoardSnapshot> },
    Goal { reply: oneshot::Sender<LevelGoal> },
    Hint { reply: oneshot::Sender<Option<MoveHint>> },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("board service has stopped")]
    Closed,
    #[error("swap rejected: {0}")]
    Rejected(#[from] SwapRejected),
}

#[derive(Debug, Clone)]
pub struct BoardHandle {
    tx: mpsc::Sender<BoardCommand>,
    busy: BusyFlag,
}

impl BoardHandle {
    pub fn is_board_busy(&self) -> bool {
        self.busy.is_board_busy()
    }

    pub async fn swap(&self, a: Coord, b: Coord) -> Result<SwapOutcome, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(BoardCommand::Swap { a, b, reply }).await?;
        Ok(rx.await.map_err(|_| EngineError::Closed)??)
    }

    pub async fn shuffle(&self) -> Result<SwapOutcome, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(BoardCommand::Shuffle { reply }).await?;
        Ok(rx.await.map_err(|_| EngineError::Closed)??)
    }

    pub async fn snapshot(&self) -> Result<BoardSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(BoardCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn goal(&self) -> Result<LevelGoal, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(BoardCommand::Goal { reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// A swap that should make a match, if the board has one.
    pub async fn hint(&self) -> Result<Option<MoveHint>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(BoardCommand::Hint { reply }).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    async fn send(&self, command: BoardCommand) -> Result<(), EngineError> {
        self.tx.send(command).await.map_err(|_| EngineError::Closed)
    }
}

pub struct BoardService;

impl BoardService {
    /// Move `driver` onto a task. The task settles the board, serves
    /// commands until every handle is dropped, then returns the driver.
    pub fn spawn<H>(driver: BoardDriver<H>) -> (BoardHandle, JoinHandle<BoardDriver<H>>)
    where
        H: BoardHost + 'static,
    {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = BoardHandle {
            tx,
            busy: driver.busy_flag(),
        };
        let task = tokio::spawn(serve(driver, rx));
        (handle, task)
    }
}

async fn serve<H: BoardHost>(
    mut driver: BoardDriver<H>,
    mut rx: mpsc::Receiver<BoardCommand>,
) -> BoardDriver<H> {
    driver.settle().await;
    tracing::debug!("board service ready");

    let mut deferred = Vec::new();
    while let Some(command) = rx.recv().await {
        match command {
            BoardCommand::Swap { a, b, reply } => match driver.begin_swap(a, b) {
                Ok(()) => {
                    let outcome = resolve_while_serving(&mut driver, &mut rx, &mut deferred).await;
                    let _ = reply.send(Ok(outcome));
                }
                Err(rejected) => {
                    tracing::debug!(%a, %b, %rejected, "swap rejected");
                    let _ = reply.send(Err(rejected));
                }
            },
            BoardCommand::Shuffle { reply } => match driver.begin_shuffle() {
                Ok(()) => {
                    let outcome = resolve_while_serving(&mut driver, &mut rx, &mut deferred).await;
                    let _ = reply.send(Ok(outcome));
                }
                Err(rejected) => {
                    let _ = reply.send(Err(rejected));
                }
            },
            query => answer(&driver, query),
        }
        for query in deferred.drain(..) {
            answer(&driver, query);
        }
    }

    tracing::debug!("board service stopped");
    driver
}

async fn resolve_while_serving<H: BoardHost>(
    driver: &mut BoardDriver<H>,
    rx: &mut mpsc::Receiver<BoardCommand>,
    deferred: &mut Vec<BoardCommand>,
) -> SwapOutcome {
    let resolution = driver.resolve();
    tokio::pin!(resolution);
    loop {
        tokio::select! {
            outcome = &mut resolution => return outcome,
            Some(command) = rx.recv() => match command {
                BoardCommand::Swap { reply, .. } | BoardCommand::Shuffle { reply } => {
                    let _ = reply.send(Err(SwapRejected::Busy));
                }
                query => deferred.push(query),
            },
        }
    }
}

fn answer<H: BoardHost>(driver: &BoardDriver<H>, query: BoardCommand) {
    match query {
        BoardCommand::Snapshot { reply } => {
            let _ = reply.send(driver.board().snapshot());
        }
        BoardCommand::Goal { reply } => {
            let _ = reply.send(driver.goal().clone());
        }
        BoardCommand::Hint { reply } => {
            let _ = reply.send(driver.board().hint());
        }
        BoardCommand::Swap { reply, .. } | BoardCommand::Shuffle { reply } => {
            let _ = reply.send(Err(SwapRejected::Busy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, BoardConfig, GoalConfig, Grid};
    use crate::host::{InstantHost, TimedHost};

    fn spawn<H: BoardHost + 'static>(host: H) -> (BoardHandle, JoinHandle<BoardDriver<H>>) {
        let board = Board::with_grid(BoardConfig::default(), Grid::from_rows(&["GBR", "RRG"]), 5).unwrap();
        let goal = LevelGoal::new(&GoalConfig::default());
        BoardService::spawn(BoardDriver::new(board, host, goal))
    }

    #[tokio::test]
    async fn test_swap_through_handle() {
        let (handle, task) = spawn(InstantHost);
        let outcome = handle.swap(Coord::new(2, 0), Coord::new(2, 1)).await.unwrap();
        assert!(!outcome.is_reverted());

        let goal = handle.goal().await.unwrap();
        assert_eq!(goal.moves_left(), GoalConfig::default().moves - 1);
        assert!(goal.score() > 0);

        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.busy);
        assert_eq!(snapshot.items.len(), 6);
        let _ = handle.hint().await.unwrap();

        drop(handle);
        let driver = task.await.unwrap();
        assert_eq!(driver.goal().score(), goal.score());
    }

    #[tokio::test]
    async fn test_rejection_through_handle() {
        let (handle, _task) = spawn(InstantHost);
        assert_eq!(
            handle.swap(Coord::new(0, 0), Coord::new(5, 5)).await,
            Err(EngineError::Rejected(SwapRejected::OutOfBounds))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_while_resolving_is_busy() {
        let (handle, _task) = spawn(TimedHost::new(1.0));

        let first = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.swap(Coord::new(2, 0), Coord::new(2, 1)).await })
        };
        while !handle.is_board_busy() {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            handle.swap(Coord::new(0, 1), Coord::new(1, 1)).await,
            Err(EngineError::Rejected(SwapRejected::Busy))
        );
        assert_eq!(
            handle.shuffle().await,
            Err(EngineError::Rejected(SwapRejected::Busy))
        );

        // Deferred until the first swap is done.
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.busy);

        let outcome = first.await.unwrap().unwrap();
        assert!(!outcome.is_reverted());
    }

    #[tokio::test]
    async fn test_closed_service() {
        let (handle, task) = spawn(InstantHost);
        task.abort();
        let _ = task.await;
        assert_eq!(handle.goal().await, Err(EngineError::Closed));
    }
}
