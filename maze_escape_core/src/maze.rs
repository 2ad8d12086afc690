use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::Position;

/// Represents errors that can occur during maze generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("Maze dimensions ({rows} x {cols}) are too small; both sides must be at least 3")]
    TooSmall { rows: usize, cols: usize },
}

/// The state of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Wall,
    Path,
}

/// A carved maze.
///
/// Stores cells in a flat vector using row-major order. Once generated
/// the grid is immutable: border cells stay `Wall`, and the interior
/// `Path` cells form a spanning tree rooted at [`Maze::start`], so any
/// two path cells are connected by exactly one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

/// Carving moves in steps of 2, leaving a single-cell wall between
/// every pair of visited cells.
const CARVE_DIRECTIONS: [(isize, isize); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

/// Carves a maze of roughly the given dimensions with randomized
/// depth-first search.
///
/// Even dimensions are clamped down by one so that the carving lattice
/// reaches the bottom-right interior cell; the result of
/// [`Maze::rows`] / [`Maze::cols`] is authoritative. The same random
/// source state always yields the same maze.
///
/// # Errors
///
/// Returns [`MazeError::TooSmall`] if either requested dimension is
/// below 3, the smallest grid with a carvable interior.
pub fn generate<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Maze, MazeError> {
    if rows < 3 || cols < 3 {
        return Err(MazeError::TooSmall { rows, cols });
    }
    let rows = if rows % 2 == 0 { rows - 1 } else { rows };
    let cols = if cols % 2 == 0 { cols - 1 } else { cols };

    let mut maze = Maze {
        rows,
        cols,
        cells: vec![Cell::Wall; rows * cols],
    };
    let start = maze.start();
    maze.carve(start);

    let mut stack = vec![start];
    let mut directions = CARVE_DIRECTIONS;

    while let Some(&current) = stack.last() {
        directions.shuffle(rng);
        let next = directions.iter().find_map(|&(dr, dc)| {
            let target = current.offset(dr, dc)?;
            let between = current.offset(dr / 2, dc / 2)?;
            // Interior only: never touch row/col 0 or the last row/col.
            let interior = (1..rows - 1).contains(&target.row) && (1..cols - 1).contains(&target.col);
            (interior && maze[target] == Cell::Wall).then_some((target, between))
        });
        match next {
            Some((target, between)) => {
                maze.carve(target);
                maze.carve(between);
                stack.push(target);
            }
            None => {
                // Dead end, backtrack.
                let _ = stack.pop();
            }
        }
    }

    Ok(maze)
}

impl Maze {
    /// Returns the number of rows in the grid.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns in the grid.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The fixed player starting cell.
    #[inline]
    pub fn start(&self) -> Position {
        Position::new(1, 1)
    }

    /// The fixed exit cell at the bottom-right of the interior.
    #[inline]
    pub fn exit(&self) -> Position {
        Position::new(self.rows - 2, self.cols - 2)
    }

    /// Checks whether the position lies within the grid.
    #[inline]
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Gets the cell at the given position, or `None` if out of bounds.
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.index_of(pos).map(|index| self.cells[index])
    }

    /// Checks whether the position is an in-bounds `Path` cell.
    pub fn is_path(&self, pos: Position) -> bool {
        self.cell(pos) == Some(Cell::Path)
    }

    /// Returns every `Path` position in row-major order.
    pub fn path_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, &cell)| {
            (cell == Cell::Path).then(|| Position::new(index / self.cols, index % self.cols))
        })
    }

    /// Returns the number of `Path` cells.
    pub fn path_cell_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == Cell::Path).count()
    }

    /// Converts a position to a flat vector index, `None` if out of bounds.
    #[inline]
    fn index_of(&self, pos: Position) -> Option<usize> {
        self.is_in_bounds(pos).then(|| pos.row * self.cols + pos.col)
    }

    fn carve(&mut self, pos: Position) {
        let index = pos.row * self.cols + pos.col;
        self.cells[index] = Cell::Path;
    }

    /// Builds a maze from rows of `#` (wall) and `.` (path), for tests
    /// that need a hand-authored layout.
    #[cfg(test)]
    pub(crate) fn parse(layout: &[&str]) -> Maze {
        let rows = layout.len();
        let cols = layout[0].len();
        let cells = layout
            .iter()
            .flat_map(|row| {
                assert_eq!(row.len(), cols, "ragged maze layout");
                row.chars().map(|ch| match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Path,
                    other => panic!("unknown maze layout char {other:?}"),
                })
            })
            .collect();
        Maze { rows, cols, cells }
    }
}

/// Allows indexing the maze by `Position` for immutable access.
impl Index<Position> for Maze {
    type Output = Cell;

    #[inline]
    fn index(&self, pos: Position) -> &Self::Output {
        match self.index_of(pos) {
            Some(index) => &self.cells[index],
            None => panic!(
                "Position ({}, {}) out of bounds for maze size ({}, {})",
                pos.row, pos.col, self.rows, self.cols
            ),
        }
    }
}
