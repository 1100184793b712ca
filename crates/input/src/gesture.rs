//! Drag gesture: press on a cell, drag onto a neighbor, release.

use crate::types::{Coord, SwapAxis};

/// A swap the player asked for. `clicked` is where the drag started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapIntent {
    pub clicked: Coord,
    pub target: Coord,
}

impl SwapIntent {
    pub fn axis(&self) -> SwapAxis {
        SwapAxis::between(self.clicked, self.target).unwrap_or(SwapAxis::Horizontal)
    }
}

/// Tracks one press-drag-release sequence.
///
/// Only a cell orthogonally next to the pressed cell can become the target;
/// entering any other cell leaves the current target alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragGesture {
    clicked: Option<Coord>,
    target: Option<Coord>,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer pressed on `at`. Ignored while a press is already held.
    pub fn begin(&mut self, at: Coord) {
        if self.clicked.is_none() {
            self.clicked = Some(at);
        }
    }

    /// Pointer dragged onto `at`.
    pub fn enter(&mut self, at: Coord) {
        if let Some(clicked) = self.clicked {
            if clicked.is_adjacent(at) {
                self.target = Some(at);
            }
        }
    }

    /// Pointer released. Returns the swap, if the drag reached a neighbor,
    /// and resets the gesture either way.
    pub fn release(&mut self) -> Option<SwapIntent> {
        let intent = match (self.clicked.take(), self.target.take()) {
            (Some(clicked), Some(target)) => Some(SwapIntent { clicked, target }),
            _ => None,
        };
        if let Some(intent) = intent {
            tracing::trace!(clicked = %intent.clicked, target = %intent.target, "drag released");
        }
        intent
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn clicked(&self) -> Option<Coord> {
        self.clicked
    }

    pub fn target(&self) -> Option<Coord> {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.clicked.is_some()
    }
}
