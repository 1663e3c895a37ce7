use maze_core::{Cell, MazeGrid};

use crate::distance::manhattan;

/// Minimal search interface — provides neighbor enumeration.
pub trait Pather {
    /// Append the traversable neighbors of `cell` into `buf`. The caller
    /// clears `buf` before calling. The order must be deterministic: it
    /// fixes the insertion order of equal-cost frontier entries.
    fn neighbors(&self, cell: Cell, buf: &mut Vec<Cell>);
}

/// Pather with an admissible heuristic, as required by A*.
pub trait AstarPather: Pather {
    /// Heuristic estimate of the remaining distance from `from` to `to`.
    ///
    /// Must never overestimate the true cost (admissible), must be >= 0
    /// everywhere and 0 when `from == to`. Violations are a caller error;
    /// the solver does not check for them.
    fn estimate(&self, from: Cell, to: Cell) -> i32;
}

impl Pather for MazeGrid {
    fn neighbors(&self, cell: Cell, buf: &mut Vec<Cell>) {
        MazeGrid::neighbors(self, cell, buf);
    }
}

impl AstarPather for MazeGrid {
    fn estimate(&self, from: Cell, to: Cell) -> i32 {
        manhattan(from, to)
    }
}
