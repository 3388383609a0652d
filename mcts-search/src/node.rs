//! One vertex of the search tree.
//!
//! The arena indexes children by move slot (`[Option<NodeId>; NUM_CELLS]`)
//! rather than a growable `Vec`, since every legal child slot is known up
//! front from the board size.

use mcts_core::{Board, Winner, NUM_CELLS};

/// Index into the search tree's node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A single vertex of the MCTS tree.
///
/// State machine: a node starts `unevaluated` unless it is terminal, in
/// which case it is `evaluated` from construction and never queued.
pub struct Node {
    pub board: Board,
    pub parent: Option<NodeId>,
    pub children: Box<[Option<NodeId>; NUM_CELLS]>,

    pub terminal: bool,
    pub evaluated: bool,

    /// Prior policy over moves, supplied by the evaluator. Meaningless
    /// until `evaluated`.
    pub p: Box<[f64; NUM_CELLS]>,
    /// Dirichlet exploration noise, root only.
    pub p_noise: Option<Box<[f64; NUM_CELLS]>>,
    /// Value in [-1, +1] from the side-to-move's perspective.
    pub v: f64,

    pub sigma_v: f64,
    pub n: u32,
    pub vloss_cnt: u32,
}

impl Node {
    /// Construct a node for `board`. Terminality and its value are derived
    /// immediately; priors remain zeroed until an evaluator fills them in
    /// (never, for terminal nodes).
    pub fn new(board: Board, parent: Option<NodeId>) -> Self {
        let winner = board.winner();
        let terminal = winner.is_terminal();
        Self {
            board,
            parent,
            children: Box::new([None; NUM_CELLS]),
            terminal,
            evaluated: terminal,
            p: Box::new([0.0; NUM_CELLS]),
            p_noise: None,
            v: if terminal { winner.value() } else { 0.0 },
            sigma_v: 0.0,
            n: 0,
            vloss_cnt: 0,
        }
    }

    /// Mean backed-up value from this node's perspective.
    pub fn q(&self) -> f64 {
        self.sigma_v / (self.n.max(1) as f64)
    }

    /// Record one backup pass through this node.
    ///
    /// Idempotent on `evaluated`: it only matters the first time it runs on
    /// a freshly-dispatched leaf, where it marks the node as no longer
    /// awaiting evaluation.
    pub fn backup(&mut self, delta_v: f64) {
        self.n += 1;
        self.sigma_v += delta_v;
        self.evaluated = true;
    }

    pub fn inc_vloss(&mut self) {
        self.vloss_cnt += 1;
    }

    pub fn dec_vloss(&mut self) {
        self.vloss_cnt -= 1;
    }

    /// Install Dirichlet noise at this node (root only).
    pub fn set_p_noise(&mut self, noise: Box<[f64; NUM_CELLS]>) {
        self.p_noise = Some(noise);
    }
}
