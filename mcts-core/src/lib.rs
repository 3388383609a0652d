//! mcts-core - board geometry for a k-in-a-row grid game
//!
//! This crate provides the minimal board contract the MCTS search engine
//! in `mcts-search` consumes: a two-plane bitboard with terminal detection
//! and the side-to-move orientation flip applied on every move.
//!
//! ## Board size
//!
//! `CHESSBOARD_SIZE` (N) and `IN_A_ROW` (K) are fixed at build time via
//! Cargo features. The default (no feature enabled) is the tractable
//! `N=5, K=4` configuration, small enough to exhaustively reason about in
//! tests; `board15x15` and `board19x19` select full-size Gomoku/Renju
//! boards.

pub mod board;

pub use board::{Board, Winner};

#[cfg(all(feature = "board15x15", feature = "board19x19"))]
compile_error!("enable at most one of the `board15x15` / `board19x19` features");

#[cfg(feature = "board19x19")]
pub const CHESSBOARD_SIZE: usize = 19;
#[cfg(feature = "board19x19")]
pub const IN_A_ROW: usize = 5;

#[cfg(all(feature = "board15x15", not(feature = "board19x19")))]
pub const CHESSBOARD_SIZE: usize = 15;
#[cfg(all(feature = "board15x15", not(feature = "board19x19")))]
pub const IN_A_ROW: usize = 5;

#[cfg(not(any(feature = "board15x15", feature = "board19x19")))]
pub const CHESSBOARD_SIZE: usize = 5;
#[cfg(not(any(feature = "board15x15", feature = "board19x19")))]
pub const IN_A_ROW: usize = 4;

/// Number of cells on the board (N*N).
pub const NUM_CELLS: usize = CHESSBOARD_SIZE * CHESSBOARD_SIZE;

/// Engine-wide build-time configuration, exposed to callers that need to
/// size their own buffers against the board dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub chessboard_size: usize,
    pub in_a_row: usize,
}

/// Read the build-time board configuration.
pub const fn config() -> Config {
    Config {
        chessboard_size: CHESSBOARD_SIZE,
        in_a_row: IN_A_ROW,
    }
}

/// Convert a `(x, y)` move into a flat index, row-major.
pub const fn index(x: usize, y: usize) -> usize {
    x * CHESSBOARD_SIZE + y
}
