//! Bounded undo history.

use std::collections::VecDeque;

use parametric_model::StateSnapshot;

/// Ring buffer of flush snapshots. The newest snapshot is the top.
#[derive(Debug)]
pub(crate) struct History {
    entries: VecDeque<StateSnapshot>,
    capacity: usize,
}

impl History {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Push a snapshot, evicting the oldest when full.
    pub(crate) fn push(&mut self, snapshot: StateSnapshot) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Drop the top and return the new top. Needs at least two entries;
    /// otherwise the history is left untouched.
    pub(crate) fn rewind(&mut self) -> Option<StateSnapshot> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop_back();
        self.entries.back().cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
