//! Linear undo history of whole-scene snapshots
//!
//! The newest snapshot is the current state. Committing a new snapshot
//! after an undo discards everything that could have been redone.

use std::collections::VecDeque;

use crate::constants::MAX_HISTORY;
use crate::scene::Snapshot;

#[derive(Debug, Clone)]
pub struct HistoryStack {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Drop all entries and start over from `baseline`
    pub fn reset(&mut self, baseline: Snapshot) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push_back(baseline);
    }

    /// Record a committed mutation, evicting the oldest entry beyond capacity
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Step back. Returns the snapshot to apply, or None at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.undo.len() < 2 {
            return None;
        }
        let current = self.undo.pop_back()?;
        self.redo.push(current);
        self.undo.back()
    }

    /// Step forward again after an undo
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(next);
        self.undo.back()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}
