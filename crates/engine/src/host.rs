//! Host side of the board: animations and effect hooks.
//!
//! The presentation layer implements [`BoardHost`]. Only [`BoardHost::move_item`]
//! is required; it hands back a [`MoveHandle`] that resolves once the item
//! has arrived. A dropped completer counts as arrived, so a host that loses
//! track of an animation can never stall the board.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::core::{BoardEvent, Item, MoveRequest};
use crate::types::{BombKind, Coord};

/// Completion of one movement.
#[derive(Debug)]
pub struct MoveHandle {
    rx: Option<oneshot::Receiver<()>>,
}

/// Sending half of a [`MoveHandle`].
#[derive(Debug)]
pub struct MoveCompleter {
    tx: oneshot::Sender<()>,
}

impl MoveCompleter {
    pub fn complete(self) {
        let _ = self.tx.send(());
    }
}

impl MoveHandle {
    /// A pending handle and the completer that resolves it.
    pub fn channel() -> (MoveCompleter, MoveHandle) {
        let (tx, rx) = oneshot::channel();
        (MoveCompleter { tx }, MoveHandle { rx: Some(rx) })
    }

    /// An already finished movement.
    pub fn done() -> Self {
        Self { rx: None }
    }
}

impl Future for MoveHandle {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.rx.as_mut() {
            None => Poll::Ready(()),
            Some(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(_) => {
                    self.rx = None;
                    Poll::Ready(())
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

/// Presentation layer reached by the driver.
pub trait BoardHost: Send {
    /// Start animating an item. The grid already holds it at `request.to`.
    fn move_item(&mut self, request: MoveRequest) -> MoveHandle;

    fn on_item_spawned(&mut self, _item: &Item) {}

    fn on_item_cleared(&mut self, _item: &Item, _score: u32, _bombed: bool) {}

    fn on_tile_broken(&mut self, _at: Coord, _damage: u8) {}

    fn on_bomb_activated(&mut self, _at: Coord, _kind: BombKind) {}

    fn on_chain_bonus(&mut self, _multiplier: u32) {}

    fn on_swap_reverted(&mut self, _a: Coord, _b: Coord) {}

    fn on_deadlock(&mut self) {}

    fn on_shuffled(&mut self, _moved: usize) {}

    fn on_settled(&mut self) {}
}

/// Route one board event to the matching hook.
pub fn dispatch<H: BoardHost + ?Sized>(host: &mut H, event: &BoardEvent) {
    match event {
        BoardEvent::ItemSpawned { item } => host.on_item_spawned(item),
        BoardEvent::ItemCleared { item, score, bombed } => host.on_item_cleared(item, *score, *bombed),
        BoardEvent::TileBroken { at, damage } => host.on_tile_broken(*at, *damage),
        BoardEvent::BombActivated { at, kind } => host.on_bomb_activated(*at, *kind),
        BoardEvent::ChainBonus { multiplier } => host.on_chain_bonus(*multiplier),
        BoardEvent::SwapReverted { a, b } => host.on_swap_reverted(*a, *b),
        BoardEvent::Deadlocked => host.on_deadlock(),
        BoardEvent::Shuffled { moved } => host.on_shuffled(*moved),
        BoardEvent::Settled => host.on_settled(),
        BoardEvent::MoveSpent => {}
    }
}

/// Largest factor movements and pauses are stretched by.
pub const MAX_SCALE: f32 = 100.0;

/// Clamp a time scale to `0..=MAX_SCALE`. NaN counts as zero.
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        0.0
    } else {
        scale.clamp(0.0, MAX_SCALE)
    }
}

/// Every movement finishes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantHost;

impl BoardHost for InstantHost {
    fn move_item(&mut self, _request: MoveRequest) -> MoveHandle {
        MoveHandle::done()
    }
}

/// Movements take their requested duration (times `scale`, see
/// [`clamp_scale`]) on the tokio clock. Must be used inside a runtime.
#[derive(Debug, Clone, Copy)]
pub struct TimedHost {
    scale: f32,
}

impl TimedHost {
    pub fn new(scale: f32) -> Self {
        Self {
            scale: clamp_scale(scale),
        }
    }

    pub fn scaled(&self, duration: Duration) -> Duration {
        duration.mul_f32(self.scale)
    }
}

impl Default for TimedHost {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl BoardHost for TimedHost {
    fn move_item(&mut self, request: MoveRequest) -> MoveHandle {
        let duration = self.scaled(request.duration);
        if duration.is_zero() {
            return MoveHandle::done();
        }
        let (completer, handle) = MoveHandle::channel();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            completer.complete();
        });
        handle
    }
}

/// Finishes movements at once and keeps a log of everything it was told.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub moves: Vec<MoveRequest>,
    pub spawned: usize,
    pub cleared: Vec<(Item, u32, bool)>,
    pub tiles_broken: Vec<(Coord, u8)>,
    pub bombs: Vec<(Coord, BombKind)>,
    pub chain_bonuses: Vec<u32>,
    pub reverted: usize,
    pub deadlocks: usize,
    pub shuffles: usize,
    pub settled: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_score(&self) -> u32 {
        self.cleared.iter().map(|(_, score, _)| *score).sum()
    }
}

impl BoardHost for RecordingHost {
    fn move_item(&mut self, request: MoveRequest) -> MoveHandle {
        self.moves.push(request);
        MoveHandle::done()
    }

    fn on_item_spawned(&mut self, _item: &Item) {
        self.spawned += 1;
    }

    fn on_item_cleared(&mut self, item: &Item, score: u32, bombed: bool) {
        self.cleared.push((*item, score, bombed));
    }

    fn on_tile_broken(&mut self, at: Coord, damage: u8) {
        self.tiles_broken.push((at, damage));
    }

    fn on_bomb_activated(&mut self, at: Coord, kind: BombKind) {
        self.bombs.push((at, kind));
    }

    fn on_chain_bonus(&mut self, multiplier: u32) {
        self.chain_bonuses.push(multiplier);
    }

    fn on_swap_reverted(&mut self, _a: Coord, _b: Coord) {
        self.reverted += 1;
    }

    fn on_deadlock(&mut self) {
        self.deadlocks += 1;
    }

    fn on_shuffled(&mut self, _moved: usize) {
        self.shuffles += 1;
    }

    fn on_settled(&mut self) {
        self.settled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ItemId;
    use tokio_test::{assert_pending, assert_ready, task};

    fn request(ms: u64) -> MoveRequest {
        MoveRequest {
            item: ItemId(1),
            from: Coord::new(0, 5),
            to: Coord::new(0, 0),
            duration: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_done_handle_is_ready() {
        let mut handle = task::spawn(MoveHandle::done());
        assert_ready!(handle.poll());
    }

    #[test]
    fn test_handle_waits_for_completer() {
        let (completer, handle) = MoveHandle::channel();
        let mut handle = task::spawn(handle);
        assert_pending!(handle.poll());
        completer.complete();
        assert!(handle.is_woken());
        assert_ready!(handle.poll());
    }

    #[test]
    fn test_dropped_completer_counts_as_done() {
        let (completer, handle) = MoveHandle::channel();
        let mut handle = task::spawn(handle);
        assert_pending!(handle.poll());
        drop(completer);
        assert_ready!(handle.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_host_takes_the_requested_time() {
        let mut host = TimedHost::new(2.0);
        let start = tokio::time::Instant::now();
        host.move_item(request(100)).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_zero_scale_is_instant() {
        let mut host = TimedHost::new(0.0);
        let mut handle = task::spawn(host.move_item(request(500)));
        assert_ready!(handle.poll());
    }

    #[test]
    fn test_scale_is_clamped() {
        assert_eq!(clamp_scale(-2.0), 0.0);
        assert_eq!(clamp_scale(f32::NAN), 0.0);
        assert_eq!(clamp_scale(f32::INFINITY), MAX_SCALE);
        assert_eq!(clamp_scale(1e30), MAX_SCALE);
        assert_eq!(clamp_scale(0.5), 0.5);

        let host = TimedHost::new(f32::MAX);
        assert_eq!(host.scaled(Duration::from_secs(1)), Duration::from_secs(100));
    }

    #[test]
    fn test_dispatch_reaches_hooks() {
        let mut host = RecordingHost::new();
        dispatch(&mut host, &BoardEvent::ChainBonus { multiplier: 3 });
        dispatch(&mut host, &BoardEvent::Deadlocked);
        dispatch(&mut host, &BoardEvent::Settled);
        assert_eq!(host.chain_bonuses, vec![3]);
        assert_eq!(host.deadlocks, 1);
        assert_eq!(host.settled, 1);
    }
}
