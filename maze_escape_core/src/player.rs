use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{ITEM_REWARD, Position, TRAP_PENALTY, maze::Maze};

/// The player's mutable state: where they stand and what they scored.
///
/// The score starts at zero and has no floor; enough traps push it
/// negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    position: Position,
    score: i64,
}

impl Player {
    pub fn new(position: Position) -> Self {
        Player { position, score: 0 }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Moves the player by a one-cell delta if the target is an
    /// in-bounds `Path` cell.
    ///
    /// A blocked move is not an error; the position simply stays put.
    pub fn step(&mut self, dr: isize, dc: isize, maze: &Maze) {
        let Some(target) = self.position.offset(dr, dc) else {
            return;
        };
        if maze.is_path(target) {
            self.position = target;
        }
    }

    /// Collects the item under the player, if any, for [`ITEM_REWARD`]
    /// points. The item is consumed from the set.
    pub fn collect_item(&mut self, items: &mut HashSet<Position>) {
        if items.remove(&self.position) {
            self.score += ITEM_REWARD;
        }
    }

    /// Triggers the trap under the player, if any, costing
    /// [`TRAP_PENALTY`] points. The trap is consumed from the set.
    pub fn trigger_trap(&mut self, traps: &mut HashSet<Position>) {
        if traps.remove(&self.position) {
            self.score -= TRAP_PENALTY;
        }
    }
}
