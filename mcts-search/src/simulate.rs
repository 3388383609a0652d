//! One PUCT descent from the root to a leaf.
//!
//! Termination guarantee: `select` strictly increases depth, and the
//! terminal/enqueue branches always end the descent. The "synchronize"
//! branch (we land on a node enqueued by an earlier simulation in this same
//! `Search` call, not yet backed up) cannot recurse forever: draining the
//! queue evaluates every pending leaf, so the next iteration never re-enters
//! that branch for the same node.

use crate::dispatch::dispatch_batch_inference;
use crate::evaluator::Evaluator;
use crate::node::NodeId;
use crate::queue::PendingQueue;
use crate::tree::Tree;

pub fn run_simulation<E: Evaluator>(
    tree: &mut Tree,
    queue: &mut PendingQueue,
    evaluator: &mut E,
    root: NodeId,
    cpuct: f64,
    vloss: f64,
    batch_size: usize,
) {
    let mut current = root;
    tree.get_mut(current).inc_vloss();
    // Whether the current node was *just* created by the Expand call that
    // stepped into it this iteration (as opposed to reached again while
    // still awaiting evaluation from a prior simulation).
    let mut just_expanded = false;

    loop {
        let node = tree.get(current);

        if node.terminal {
            tree.backup_from_leaf(current);
            return;
        }

        if !node.evaluated {
            if just_expanded {
                if queue.len() == batch_size {
                    dispatch_batch_inference(tree, queue, evaluator, batch_size);
                }
                queue.push(current);
                return;
            } else {
                // Another simulation queued this node but it hasn't been
                // backed up yet; draining makes it evaluated so the next
                // loop iteration falls through to selection.
                dispatch_batch_inference(tree, queue, evaluator, batch_size);
                continue;
            }
        }

        let (x, y) = tree.select(current, cpuct, vloss);
        let (expanded, child) = tree.expand(current, x, y);
        current = child;
        tree.get_mut(current).inc_vloss();
        just_expanded = expanded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::UniformEvaluator;
    use crate::node::Node;
    use mcts_core::Board;

    #[test]
    fn terminal_root_backs_up_without_enqueueing() {
        let mut board = Board::empty();
        for y in 0..mcts_core::IN_A_ROW {
            board.set(0, 0, y);
        }
        let mut tree = Tree::new(Node::new(board, None));
        let mut queue = PendingQueue::new();
        let mut evaluator = UniformEvaluator;

        run_simulation(&mut tree, &mut queue, &mut evaluator, NodeId::ROOT, 3.0, 1.0, 4);

        assert!(queue.is_empty());
        assert_eq!(tree.get(NodeId::ROOT).n, 1);
        assert_eq!(tree.get(NodeId::ROOT).vloss_cnt, 0);
    }

    #[test]
    fn freshly_expanded_leaf_is_enqueued_not_dispatched_immediately() {
        let mut tree = Tree::new(Node::new(Board::empty(), None));
        tree.get_mut(NodeId::ROOT).evaluated = true; // pretend root was already evaluated
        let mut queue = PendingQueue::new();
        let mut evaluator = UniformEvaluator;

        run_simulation(&mut tree, &mut queue, &mut evaluator, NodeId::ROOT, 3.0, 1.0, 4);

        assert_eq!(queue.len(), 1);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(NodeId::ROOT).vloss_cnt, 1);
    }

    #[test]
    fn second_simulation_through_same_unevaluated_leaf_drains_queue() {
        let mut tree = Tree::new(Node::new(Board::empty(), None));
        tree.get_mut(NodeId::ROOT).evaluated = true;
        // force both simulations to pick the same child by giving it all
        // the prior mass
        tree.get_mut(NodeId::ROOT).p[0] = 1.0;
        let mut queue = PendingQueue::new();
        let mut evaluator = UniformEvaluator;

        run_simulation(&mut tree, &mut queue, &mut evaluator, NodeId::ROOT, 3.0, 1.0, 4);
        assert_eq!(queue.len(), 1);

        run_simulation(&mut tree, &mut queue, &mut evaluator, NodeId::ROOT, 3.0, 1.0, 4);
        // the second descent re-enters the same unevaluated leaf, which
        // forces a drain (queue empties, leaf becomes evaluated) and then
        // continues selecting from it.
        assert!(tree.get(NodeId(1)).evaluated);
    }
}
