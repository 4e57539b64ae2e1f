//! Reorder gesture tracking

use crate::{
    error::OrderingError,
    models::{MediaId, ReorderRequest},
    ordering::OrderingEngine,
};

/// How a finished drag gesture settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The list was never mutated; nothing to send, nothing to reload
    Unchanged,
    /// The list was shuffled but ended in its original order; no commit, reload only
    Settled,
    /// The final order differs from the baseline and must be committed
    Commit(ReorderRequest),
    /// The gesture was abandoned before it finished
    Cancelled,
}

/// An in-progress drag over an [`OrderingEngine`]
///
/// The session mutates the engine on every `over` call for live feedback but
/// persists nothing; [`DragSession::finish`] turns the final order into at
/// most one commit.
#[derive(Debug, Clone)]
pub struct DragSession {
    origin: usize,
    baseline: Vec<MediaId>,
    moved: bool,
}

impl DragSession {
    /// Start dragging the item at `index`
    pub fn start(engine: &OrderingEngine, index: usize) -> Result<Self, OrderingError> {
        if index >= engine.len() {
            return Err(OrderingError::IndexOutOfBounds {
                index,
                len: engine.len(),
            });
        }

        Ok(Self {
            origin: index,
            baseline: engine.ids(),
            moved: false,
        })
    }

    /// Current index of the dragged item
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Order of the gallery when the gesture started
    pub fn baseline(&self) -> &[MediaId] {
        &self.baseline
    }

    /// Whether any intermediate mutation happened during the gesture
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Pointer is over `target`: shuffle the dragged item there
    ///
    /// Returns whether the engine was mutated.
    pub fn over(
        &mut self,
        engine: &mut OrderingEngine,
        target: usize,
    ) -> Result<bool, OrderingError> {
        if target == self.origin {
            return Ok(false);
        }

        let changed = engine.move_item(self.origin, target)?;
        self.origin = target;
        self.moved |= changed;
        Ok(changed)
    }

    /// End the gesture and decide what, if anything, to persist
    pub fn finish(self, engine: &OrderingEngine) -> DragOutcome {
        if !self.moved {
            return DragOutcome::Unchanged;
        }

        match engine.reorder_request(&self.baseline) {
            Some(request) => DragOutcome::Commit(request),
            None => DragOutcome::Settled,
        }
    }
}
