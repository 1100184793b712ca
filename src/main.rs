//! Headless match-3 runner (default binary).
//!
//! Builds a board from a layout file (first argument) or from `MATCH3_*`
//! environment variables, then plays hinted swaps until the moves run out,
//! the first score goal is reached, or no move is found. The final board
//! is printed to stdout as JSON.
//!
//! `MATCH3_SEED` seeds the board, `MATCH3_SPEED` scales every movement and
//! pause (0 runs instantly) and `RUST_LOG` filters the log output.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use match3::core::{Board, BoardConfig, GoalConfig, Layout, LevelGoal, SwapOutcome};
use match3::engine::{clamp_scale, BoardDriver, BoardService, TimedHost};

const DEFAULT_SEED: u32 = 12345;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn load_board(seed: u32) -> Result<(Board, LevelGoal)> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read layout {path}"))?;
            let layout = Layout::from_json(&json).with_context(|| format!("invalid layout {path}"))?;
            let board = Board::setup(&layout, seed)?;
            Ok((board, LevelGoal::new(&layout.goal)))
        }
        None => {
            let board = Board::new(BoardConfig::from_env(), seed)?;
            Ok((board, LevelGoal::new(&GoalConfig::default())))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let seed = env_or("MATCH3_SEED", DEFAULT_SEED);
    let speed = clamp_scale(env_or("MATCH3_SPEED", 0.0));
    let (board, goal) = load_board(seed)?;
    tracing::info!(
        seed,
        width = board.grid().width(),
        height = board.grid().height(),
        moves = goal.moves_left(),
        "board ready"
    );

    let driver = BoardDriver::new(board, TimedHost::new(speed), goal).with_pacing_scale(speed);
    let (handle, task) = BoardService::spawn(driver);

    loop {
        let goal = handle.goal().await?;
        if goal.is_game_over() || goal.is_winner() {
            break;
        }
        for row in handle.snapshot().await?.rows {
            tracing::debug!("{row}");
        }

        let Some((a, b)) = handle.hint().await?.and_then(|hint| hint.swap()) else {
            tracing::warn!("no move found");
            break;
        };

        match handle.swap(a, b).await? {
            SwapOutcome::Resolved(resolution) => tracing::info!(
                %a,
                %b,
                cleared = resolution.cleared,
                chain = resolution.chain,
                bombs = resolution.bombs,
                points = resolution.score,
                "swap resolved"
            ),
            SwapOutcome::Reverted => {
                tracing::warn!(%a, %b, "hinted swap reverted");
                break;
            }
        }
        if speed > 0.0 {
            tokio::time::sleep(Duration::from_millis(200).mul_f32(speed)).await;
        }
    }

    drop(handle);
    let driver = task.await.context("board service panicked")?;
    let goal = driver.goal();
    tracing::info!(
        score = goal.score(),
        stars = goal.stars(),
        moves_left = goal.moves_left(),
        won = goal.is_winner(),
        "game over"
    );
    println!("{}", serde_json::to_string_pretty(&driver.board().snapshot())?);
    Ok(())
}
