use serde::{Deserialize, Serialize};

pub mod maze;
pub mod placement;
pub mod player;
pub mod session;

/// Points awarded for collecting an item.
pub const ITEM_REWARD: i64 = 10;

/// Points deducted for triggering a trap.
pub const TRAP_PENALTY: i64 = 5;

/// Represents a 2D grid coordinate as (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Offsets this position by a signed (row, col) delta.
    ///
    /// Returns `None` if either coordinate would leave `usize` range;
    /// bounds against a concrete maze are checked separately.
    pub fn offset(self, dr: isize, dc: isize) -> Option<Position> {
        Some(Position {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}
