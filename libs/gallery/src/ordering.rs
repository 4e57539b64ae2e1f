//! In-memory ordering of a gallery
//!
//! The engine holds the working copy of the persisted items. It never talks to
//! the store; the controller replaces its contents wholesale after every reload
//! and turns its final order into a reorder commit.

use std::cmp::Reverse;

use crate::{
    error::OrderingError,
    models::{MediaId, MediaItem, ReorderRequest},
};

/// Ordered working copy of a gallery's items
#[derive(Debug, Clone, Default)]
pub struct OrderingEngine {
    items: Vec<MediaItem>,
}

impl OrderingEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine holding the given items in `seq` order
    pub fn from_items(items: Vec<MediaItem>) -> Self {
        let mut engine = Self::new();
        engine.replace(items);
        engine
    }

    /// Replace the working copy with a fresh list from the store
    pub fn replace(&mut self, mut items: Vec<MediaItem>) {
        items.sort_by_key(|item| item.seq);
        self.items = items;
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids in working order
    pub fn ids(&self) -> Vec<MediaId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Current index of an item
    pub fn position(&self, id: MediaId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn contains(&self, id: MediaId) -> bool {
        self.position(id).is_some()
    }

    /// Remove the item at `from` and reinsert it at `to`
    ///
    /// Returns whether the order changed. Both indices must be in bounds.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<bool, OrderingError> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from == to {
            return Ok(false);
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(true)
    }

    /// Diff the working order against `baseline`
    ///
    /// Returns the commit to send, or `None` when the order is unchanged.
    pub fn reorder_request(&self, baseline: &[MediaId]) -> Option<ReorderRequest> {
        let ids = self.ids();
        if ids == baseline {
            None
        } else {
            Some(ReorderRequest::new(ids))
        }
    }

    /// Items in canonical display order
    pub fn display_items(&self) -> Vec<MediaItem> {
        display_order(&self.items)
    }

    /// The item flagged as main, if any
    pub fn main_item(&self) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.is_main)
    }

    fn check_index(&self, index: usize) -> Result<(), OrderingError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(OrderingError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
        }
    }
}

/// Canonical display order: ascending `seq`, then main item first
///
/// Both passes are stable, so items that tie keep their relative order and
/// sorting an already sorted list is a no-op.
pub fn display_order(items: &[MediaItem]) -> Vec<MediaItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| item.seq);
    sorted.sort_by_key(|item| Reverse(item.is_main));
    sorted
}
