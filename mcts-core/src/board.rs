//! Two-plane bitboard for side-to-move + opponent.

use serde::{Deserialize, Serialize};

use crate::{index, CHESSBOARD_SIZE, IN_A_ROW, NUM_CELLS};

/// Directions scanned for a K-in-a-row: horizontal, vertical, and both
/// diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Result of `Board::winner()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    /// The side to move at this board has `IN_A_ROW` stones in a line.
    SideToMove,
    /// The opponent has `IN_A_ROW` stones in a line.
    Opponent,
    /// The board is full with no winner.
    Draw,
    /// Neither side has won and the board is not full.
    Ongoing,
}

impl Winner {
    /// Value from the side-to-move's perspective: +1 win, -1 loss, 0 draw.
    pub fn value(self) -> f64 {
        match self {
            Winner::SideToMove => 1.0,
            Winner::Opponent => -1.0,
            Winner::Draw => 0.0,
            Winner::Ongoing => 0.0,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Winner::Ongoing)
    }
}

/// Two-plane bitboard: `planes[0]` is the side to move, `planes[1]` is the
/// opponent. Both are `NUM_CELLS` bytes, row-major (`index = x*N + y`).
///
/// Board-flip invariant: a child board built from move `(x, y)` has its
/// planes swapped relative to the parent (plane 1 becomes plane 0) before
/// the new stone is placed, so plane 0 is always "whoever moves next".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    planes: [u8; 2 * NUM_CELLS],
}

impl Board {
    /// An empty board with the given side to move.
    pub fn empty() -> Self {
        Self {
            planes: [0u8; 2 * NUM_CELLS],
        }
    }

    /// Build a board from the wire format: `2*N*N` bytes, plane 0 then
    /// plane 1, both row-major.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            2 * NUM_CELLS,
            "board byte buffer must be exactly 2*N*N bytes"
        );
        let mut planes = [0u8; 2 * NUM_CELLS];
        planes.copy_from_slice(bytes);
        Self { planes }
    }

    /// Serialize to the wire format: `2*N*N` bytes, plane 0 then plane 1.
    pub fn to_bytes(&self) -> [u8; 2 * NUM_CELLS] {
        self.planes
    }

    #[inline]
    fn plane_index(plane: usize, x: usize, y: usize) -> usize {
        plane * NUM_CELLS + index(x, y)
    }

    /// Read a single cell of one plane.
    #[inline]
    pub fn at(&self, plane: usize, x: usize, y: usize) -> u8 {
        self.planes[Self::plane_index(plane, x, y)]
    }

    /// Set a single cell of one plane to occupied.
    #[inline]
    pub fn set(&mut self, plane: usize, x: usize, y: usize) {
        self.planes[Self::plane_index(plane, x, y)] = 1;
    }

    /// True if either plane has a stone at `(x, y)`.
    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.at(0, x, y) + self.at(1, x, y) > 0
    }

    /// Build the child board that results from the side to move playing
    /// at `(x, y)`. Does not check legality; the caller (`Node::expand`)
    /// only calls this for empty cells.
    pub fn apply_move(&self, x: usize, y: usize) -> Board {
        let mut child = Board::empty();
        // Board-flip: child's plane 0 is our plane 1 (the opponent becomes
        // the side to move), child's plane 1 is our plane 0 plus the new
        // stone.
        child.planes[..NUM_CELLS].copy_from_slice(&self.planes[NUM_CELLS..]);
        child.planes[NUM_CELLS..].copy_from_slice(&self.planes[..NUM_CELLS]);
        child.set(1, x, y);
        child
    }

    /// Scan both colors for a win, then check for a draw.
    ///
    /// Both colors are scanned because a terminal node may be reached via
    /// either side's winning move, depending on orientation.
    pub fn winner(&self) -> Winner {
        let mut occupied = 0usize;
        for who in 0..2 {
            for x in 0..CHESSBOARD_SIZE {
                for y in 0..CHESSBOARD_SIZE {
                    if self.at(who, x, y) > 0 {
                        occupied += 1;
                    }
                    if self.has_line_from(who, x, y) {
                        return if who == 0 {
                            Winner::SideToMove
                        } else {
                            Winner::Opponent
                        };
                    }
                }
            }
        }

        if occupied >= NUM_CELLS {
            Winner::Draw
        } else {
            Winner::Ongoing
        }
    }

    /// Does color `who` have `IN_A_ROW` consecutive stones starting at
    /// `(x, y)` in any of the four scanned directions?
    fn has_line_from(&self, who: usize, x: usize, y: usize) -> bool {
        'dir: for (dx, dy) in DIRECTIONS {
            for i in 0..IN_A_ROW {
                let nx = x as isize + dx * i as isize;
                let ny = y as isize + dy * i as isize;
                if nx < 0 || ny < 0 || nx >= CHESSBOARD_SIZE as isize || ny >= CHESSBOARD_SIZE as isize {
                    continue 'dir;
                }
                if self.at(who, nx as usize, ny as usize) == 0 {
                    continue 'dir;
                }
            }
            return true;
        }
        false
    }
}
