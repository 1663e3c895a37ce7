use maze_core::Cell;

/// Manhattan (L1) distance between two cells.
///
/// On a 4-directional grid with unit step cost this is admissible and
/// consistent, and is the heuristic used by [`MazeGrid`]'s
/// [`AstarPather`](crate::AstarPather) implementation.
///
/// [`MazeGrid`]: maze_core::MazeGrid
#[inline]
pub fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.row - b.row).abs() + (a.col - b.col).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance() {
        assert_eq!(manhattan(Cell::new(0, 0), Cell::new(3, 4)), 7);
        assert_eq!(manhattan(Cell::new(3, 4), Cell::new(0, 0)), 7);
        assert_eq!(manhattan(Cell::new(2, 2), Cell::new(2, 2)), 0);
    }
}
