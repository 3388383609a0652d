//! Batch dispatcher: drains the pending queue in groups of at most
//! `batch_size`, hands boards to the evaluator, then backs up every
//! drained leaf in insertion order.

use mcts_core::NUM_CELLS;

use crate::evaluator::Evaluator;
use crate::queue::PendingQueue;
use crate::tree::Tree;

/// `DispatchBatchInference`: evaluate every currently-pending leaf, then
/// backpropagate all of them.
///
/// Two-phase by construction: all evaluator calls finish (filling every
/// leaf's `(p, v)`) before any backup runs, since backup needs `v`.
pub fn dispatch_batch_inference<E: Evaluator>(
    tree: &mut Tree,
    queue: &mut PendingQueue,
    evaluator: &mut E,
    batch_size: usize,
) {
    let entries = queue.drain_all();
    if entries.is_empty() {
        return;
    }

    for window in entries.chunks(batch_size) {
        let boards: Vec<_> = window.iter().map(|&id| tree.get(id).board.clone()).collect();
        let mut out_p = vec![[0.0; NUM_CELLS]; window.len()];
        let mut out_v = vec![0.0; window.len()];

        evaluator.evaluate(&boards, &mut out_p, &mut out_v);

        for (i, &leaf) in window.iter().enumerate() {
            let node = tree.get_mut(leaf);
            *node.p = out_p[i];
            node.v = out_v[i];
        }
    }

    for &leaf in &entries {
        tree.backup_from_leaf(leaf);
    }
}
