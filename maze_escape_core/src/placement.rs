use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

use crate::{Position, maze::Maze};

/// What kind of object a placement request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Item,
    Trap,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Item => write!(f, "item"),
            ObjectKind::Trap => write!(f, "trap"),
        }
    }
}

/// Represents errors that can occur while scattering objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("Requested {requested} {kind} placements but only {available} free path cells exist")]
    NotEnoughPathCells {
        kind: ObjectKind,
        requested: usize,
        available: usize,
    },
}

/// The item and trap locations scattered for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub items: HashSet<Position>,
    pub traps: HashSet<Position>,
}

/// Scatters items and traps onto the maze's free path cells.
///
/// Every placed object sits on a `Path` cell other than the start, and
/// neither set contains duplicates. The two sets draw from
/// independently shuffled copies of the free-cell pool, so an item and
/// a trap may share a cell.
///
/// # Errors
///
/// Returns [`PlacementError::NotEnoughPathCells`] if either requested
/// count exceeds the number of free path cells; nothing is placed in
/// that case.
pub fn place<R: Rng + ?Sized>(
    maze: &Maze,
    item_count: usize,
    trap_count: usize,
    rng: &mut R,
) -> Result<Placement, PlacementError> {
    let free: Vec<Position> = maze
        .path_positions()
        .filter(|&pos| pos != maze.start())
        .collect();

    let items = scatter(&free, item_count, ObjectKind::Item, rng)?;
    let traps = scatter(&free, trap_count, ObjectKind::Trap, rng)?;
    Ok(Placement { items, traps })
}

/// Samples `count` distinct positions without replacement, so the
/// operation always terminates regardless of how full the maze is.
fn scatter<R: Rng + ?Sized>(
    free: &[Position],
    count: usize,
    kind: ObjectKind,
    rng: &mut R,
) -> Result<HashSet<Position>, PlacementError> {
    if count > free.len() {
        return Err(PlacementError::NotEnoughPathCells {
            kind,
            requested: count,
            available: free.len(),
        });
    }
    let mut pool = free.to_vec();
    pool.shuffle(rng);
    pool.truncate(count);
    Ok(pool.into_iter().collect())
}
