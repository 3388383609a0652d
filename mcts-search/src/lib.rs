//! mcts-search - batched, virtual-loss MCTS over an external evaluator.
//!
//! ## Architecture
//! - Level 1: `Engine` (root lifecycle, `Search` driver, `GetPi` policy
//!   surface, `StepForward` tree reuse)
//! - Level 2: `simulate::run_simulation` (one PUCT descent),
//!   `dispatch::dispatch_batch_inference` (batch + backup)
//! - Level 3: `Tree::select` (PUCT + virtual loss), `Tree::expand`,
//!   `Tree::backup_from_leaf`
//! - Level 4: `Node` accessors, `PendingQueue`

mod dispatch;
mod engine;
mod evaluator;
mod node;
mod queue;
mod simulate;
mod tree;

pub use engine::Engine;
pub use evaluator::{Evaluator, UniformEvaluator};
pub use node::NodeId;
pub use queue::PendingQueue;
pub use tree::Tree;

pub use mcts_core::{Board, Winner, CHESSBOARD_SIZE, IN_A_ROW, NUM_CELLS};
