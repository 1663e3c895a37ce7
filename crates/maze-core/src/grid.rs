//! The maze grid: bounds, walls, and endpoints ([`MazeGrid`]).

use std::collections::HashSet;

use crate::cell::Cell;

/// A validation failure reported by [`MazeGrid`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Grid dimensions must both be positive.
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: i32, cols: i32 },
    /// The cell lies outside the grid bounds.
    #[error("cell {0} is out of bounds")]
    InvalidCell(Cell),
    /// The two cells do not share a grid edge.
    #[error("cells {0} and {1} are not adjacent")]
    NotAdjacent(Cell, Cell),
}

/// A blocking edge between two grid-adjacent cells.
///
/// The pair is unordered: `Wall::new(a, b)` and `Wall::new(b, a)` compare
/// equal. Internally the endpoints are canonicalized so that the row-major
/// smaller cell comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(Cell, Cell)", into = "(Cell, Cell)"))]
pub struct Wall {
    a: Cell,
    b: Cell,
}

impl TryFrom<(Cell, Cell)> for Wall {
    type Error = GridError;

    fn try_from((a, b): (Cell, Cell)) -> Result<Self, GridError> {
        Wall::new(a, b)
    }
}

impl From<Wall> for (Cell, Cell) {
    fn from(wall: Wall) -> Self {
        wall.cells()
    }
}

impl Wall {
    /// Create a wall between two adjacent cells.
    ///
    /// Fails with [`GridError::NotAdjacent`] if the cells do not differ by
    /// exactly one step on one axis. Bounds are not checked here; that is
    /// the grid's job.
    pub fn new(a: Cell, b: Cell) -> Result<Self, GridError> {
        if !a.is_adjacent(b) {
            return Err(GridError::NotAdjacent(a, b));
        }
        if a <= b {
            Ok(Self { a, b })
        } else {
            Ok(Self { a: b, b: a })
        }
    }

    /// The two endpoints, in canonical (row-major) order.
    pub fn cells(self) -> (Cell, Cell) {
        (self.a, self.b)
    }

    /// Whether this wall is vertical (blocks horizontal movement).
    pub fn is_vertical(self) -> bool {
        self.a.row == self.b.row
    }
}

/// The authoritative maze structure: bounds, wall set, start and goal.
///
/// A grid's dimensions are fixed at construction. Walls and endpoints are
/// mutated between search runs; a running search engine only ever borrows
/// the grid immutably, so mutation during a run is ruled out by the borrow
/// checker rather than by a runtime flag.
#[derive(Debug, Clone)]
pub struct MazeGrid {
    rows: i32,
    cols: i32,
    walls: HashSet<Wall>,
    start: Cell,
    goal: Cell,
}

impl MazeGrid {
    /// Create a grid of `rows` x `cols` cells with no walls.
    ///
    /// The start defaults to the top-left cell and the goal to the
    /// bottom-right cell.
    pub fn new(rows: i32, cols: i32) -> Result<Self, GridError> {
        if rows <= 0 || cols <= 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            walls: HashSet::new(),
            start: Cell::ZERO,
            goal: Cell::new(rows - 1, cols - 1),
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// The current start cell.
    pub fn start(&self) -> Cell {
        self.start
    }

    /// The current goal cell.
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Whether the cell lies within the grid bounds.
    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.rows).contains(&cell.row) && (0..self.cols).contains(&cell.col)
    }

    fn check(&self, cell: Cell) -> Result<(), GridError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(GridError::InvalidCell(cell))
        }
    }

    /// Toggle the wall between two adjacent in-bounds cells.
    ///
    /// Inserting an already-present pair removes it; that is the authoring
    /// interface used by interactive editors. Returns whether the wall is
    /// present after the toggle.
    pub fn toggle_wall(&mut self, a: Cell, b: Cell) -> Result<bool, GridError> {
        self.check(a)?;
        self.check(b)?;
        let wall = Wall::new(a, b)?;
        if self.walls.remove(&wall) {
            Ok(false)
        } else {
            self.walls.insert(wall);
            Ok(true)
        }
    }

    /// Whether a wall blocks movement between two adjacent cells.
    ///
    /// Fails on out-of-bounds or non-adjacent input.
    pub fn is_blocked(&self, a: Cell, b: Cell) -> Result<bool, GridError> {
        self.check(a)?;
        self.check(b)?;
        Ok(self.walls.contains(&Wall::new(a, b)?))
    }

    /// Set the start cell. On out-of-bounds input the previous value is
    /// retained and the error is returned to the caller; the grid never
    /// clamps silently.
    pub fn set_start(&mut self, cell: Cell) -> Result<(), GridError> {
        self.check(cell)?;
        self.start = cell;
        Ok(())
    }

    /// Set the goal cell. Same rejection semantics as [`set_start`].
    ///
    /// [`set_start`]: MazeGrid::set_start
    pub fn set_goal(&mut self, cell: Cell) -> Result<(), GridError> {
        self.check(cell)?;
        self.goal = cell;
        Ok(())
    }

    /// Append the traversable neighbours of `cell` to `buf`: in-bounds,
    /// grid-adjacent cells with no wall in between, in the fixed order
    /// up, right, down, left.
    ///
    /// The order is part of the contract: it decides the insertion order of
    /// equal-cost frontier entries during a search, and therefore the shape
    /// of reproducible visualization traces.
    pub fn neighbors(&self, cell: Cell, buf: &mut Vec<Cell>) {
        if !self.contains(cell) {
            return;
        }
        for n in cell.neighbors_4() {
            if !self.contains(n) {
                continue;
            }
            // Both cells checked above, adjacency by construction.
            let wall = Wall { a: cell.min(n), b: cell.max(n) };
            if !self.walls.contains(&wall) {
                buf.push(n);
            }
        }
    }

    /// Iterate over the current wall set (arbitrary order).
    pub fn walls(&self) -> impl Iterator<Item = Wall> + '_ {
        self.walls.iter().copied()
    }

    /// Number of walls currently set.
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// Remove every wall, keeping dimensions and endpoints.
    pub fn clear_walls(&mut self) {
        self.walls.clear();
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> i32 {
        self.rows * self.cols
    }

    /// Map a 1-based row-major cell number to a cell, for external UIs that
    /// label cells `1..=rows*cols`. Returns `None` when out of range.
    pub fn cell_at(&self, num: i32) -> Option<Cell> {
        if !(1..=self.cell_count()).contains(&num) {
            return None;
        }
        let idx = num - 1;
        Some(Cell::new(idx / self.cols, idx % self.cols))
    }

    /// Map a cell back to its 1-based row-major number.
    pub fn number_of(&self, cell: Cell) -> Option<i32> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.row * self.cols + cell.col + 1)
    }
}
