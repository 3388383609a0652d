//! Bounded FIFO of leaves awaiting batch evaluation.
//!
//! Write-once-drain-all: entries are appended until the batch dispatches,
//! which clears the whole queue. Capacity is `NUM_CELLS`, the upper bound
//! on leaves any one `Search` call can enqueue before a position is full
//! (and thus terminal, never enqueued again).

use mcts_core::NUM_CELLS;

use crate::node::NodeId;

pub struct PendingQueue {
    entries: Vec<NodeId>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(NUM_CELLS),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a leaf to the rear of the queue.
    pub fn push(&mut self, leaf: NodeId) {
        assert!(
            self.entries.len() < NUM_CELLS,
            "pending queue exceeded capacity {NUM_CELLS}"
        );
        self.entries.push(leaf);
    }

    /// Drain all entries, front to rear, clearing the queue.
    pub fn drain_all(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.entries)
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new()
    }
}
