//! The step-wise A* solver and the one-search-at-a-time session gate.

use std::collections::BinaryHeap;

use maze_core::{Cell, MazeGrid};

use crate::event::{PathResult, SearchEvent, SearchOutcome, SearchReport};
use crate::traits::AstarPather;

/// A failure reported when creating or starting a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// An endpoint lies outside the grid bounds.
    #[error("cell {0} is out of bounds of the search grid")]
    InvalidCell(Cell),
    /// A search is already in flight; only one run is permitted at a time.
    #[error("a search is already in progress")]
    SearchInProgress,
}

/// Sentinel cost for cells not yet discovered.
const UNREACHABLE: i32 = i32::MAX;

/// Per-cell entry in the solver's node table. Predecessor links are flat
/// indices into the same table, so the backreference tree has no ownership
/// cycles.
#[derive(Clone)]
struct Node {
    g: i32,
    f: i32,
    parent: usize,
    finalized: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: UNREACHABLE,
            f: 0,
            parent: usize::MAX,
            finalized: false,
        }
    }
}

/// Frontier entry, ordered for use in `BinaryHeap`.
///
/// Tie-breaking is deterministic and documented: lowest `f` first, then
/// lowest `h`, then earliest insertion (`seq`, FIFO). Stale entries whose
/// cell was already finalized are filtered lazily at pop time.
#[derive(Clone, Copy, Eq, PartialEq)]
struct OpenEntry {
    f: i32,
    h: i32,
    /// Monotonically increasing insertion counter; unique per entry.
    seq: u64,
    idx: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (a max-heap) pops the smallest key first.
        other
            .f
            .cmp(&self.f)
            .then(other.h.cmp(&self.h))
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Whether a [`Solver`] is still computing or has produced its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverState {
    Computing,
    Done(SearchOutcome),
}

/// The step-wise best-first search engine.
///
/// A solver is created fresh for each run and owns everything the run
/// needs: its node table, frontier, event trace, and a snapshot of the grid
/// taken at creation. Editing the live grid between steps therefore has no
/// effect on a run in flight. Each [`step`] advances by exactly one
/// frontier pop.
///
/// [`step`]: Solver::step
pub struct Solver {
    grid: MazeGrid,
    start: Cell,
    goal: Cell,
    nodes: Vec<Node>,
    open: BinaryHeap<OpenEntry>,
    seq: u64,
    state: SolverState,
    trace: Vec<SearchEvent>,
    nbuf: Vec<Cell>,
}

impl Solver {
    /// Create a solver for one run from `start` to `goal` over a snapshot
    /// of `grid` (dimensions, walls and endpoints as of this call).
    ///
    /// Fails with [`SearchError::InvalidCell`] if either endpoint is out of
    /// bounds. The start node is seeded with the grid's own heuristic
    /// estimate (Manhattan distance).
    pub fn new(grid: &MazeGrid, start: Cell, goal: Cell) -> Result<Self, SearchError> {
        if !grid.contains(start) {
            return Err(SearchError::InvalidCell(start));
        }
        if !grid.contains(goal) {
            return Err(SearchError::InvalidCell(goal));
        }

        let len = (grid.rows() * grid.cols()) as usize;
        let h = grid.estimate(start, goal);
        let mut solver = Self {
            grid: grid.clone(),
            start,
            goal,
            nodes: vec![Node::default(); len],
            open: BinaryHeap::new(),
            seq: 0,
            state: SolverState::Computing,
            trace: Vec::new(),
            nbuf: Vec::with_capacity(4),
        };

        let si = solver.idx(start);
        solver.nodes[si].g = 0;
        solver.nodes[si].f = h;
        solver.open.push(OpenEntry {
            f: h,
            h,
            seq: 0,
            idx: si,
        });
        Ok(solver)
    }

    /// The start cell of this run.
    pub fn start(&self) -> Cell {
        self.start
    }

    /// The goal cell of this run.
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Current state.
    pub fn state(&self) -> &SolverState {
        &self.state
    }

    /// Events produced so far, in emission order.
    pub fn trace(&self) -> &[SearchEvent] {
        &self.trace
    }

    #[inline]
    fn idx(&self, c: Cell) -> usize {
        (c.row * self.grid.cols() + c.col) as usize
    }

    #[inline]
    fn cell(&self, idx: usize) -> Cell {
        Cell::new(
            idx as i32 / self.grid.cols(),
            idx as i32 % self.grid.cols(),
        )
    }

    /// Advance the search by exactly one frontier pop.
    ///
    /// Popping a stale duplicate (a cell already finalized under a better
    /// cost) consumes the step without emitting an event. Stepping a
    /// finished solver is a no-op. Events produced by the step are appended
    /// to [`trace`](Solver::trace).
    pub fn step(&mut self) -> &SolverState {
        if let SolverState::Done(_) = self.state {
            return &self.state;
        }

        let Some(entry) = self.open.pop() else {
            self.trace.push(SearchEvent::NoPathFound);
            self.state = SolverState::Done(SearchOutcome::NoPathFound);
            return &self.state;
        };

        let ci = entry.idx;
        if self.nodes[ci].finalized {
            // Stale duplicate, superseded by a strictly better g.
            return &self.state;
        }
        self.nodes[ci].finalized = true;

        let g = self.nodes[ci].g;
        let f = self.nodes[ci].f;
        let cell = self.cell(ci);
        self.trace.push(SearchEvent::Finalized {
            cell,
            g,
            h: f - g,
            f,
        });

        if cell == self.goal {
            let path = self.reconstruct(ci);
            self.trace.push(SearchEvent::PathFound { path: path.clone() });
            self.state = SolverState::Done(SearchOutcome::PathFound(PathResult {
                path,
                start: self.start,
                goal: self.goal,
                cost: g,
            }));
            return &self.state;
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);
        nbuf.clear();
        self.grid.neighbors(cell, &mut nbuf);

        for &nc in nbuf.iter() {
            if !self.grid.contains(nc) {
                continue;
            }
            let ni = self.idx(nc);
            if self.nodes[ni].finalized {
                continue;
            }
            let tentative = g + 1;
            if tentative >= self.nodes[ni].g {
                continue;
            }
            let h = self.grid.estimate(nc, self.goal);
            let node = &mut self.nodes[ni];
            node.g = tentative;
            node.f = tentative + h;
            node.parent = ci;
            self.seq += 1;
            self.open.push(OpenEntry {
                f: tentative + h,
                h,
                seq: self.seq,
                idx: ni,
            });
            self.trace.push(SearchEvent::Discovered {
                cell: nc,
                g: tentative,
                h,
                f: tentative + h,
            });
        }

        self.nbuf = nbuf;
        &self.state
    }

    /// Drive the solver to completion, consuming it.
    pub fn run(mut self) -> SearchReport {
        loop {
            if let SolverState::Done(outcome) = self.step() {
                let outcome = outcome.clone();
                return SearchReport {
                    outcome,
                    trace: self.trace,
                };
            }
        }
    }

    /// Follow predecessor links from `goal_idx` back to the start and
    /// reverse into start-to-goal order.
    fn reconstruct(&self, goal_idx: usize) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != usize::MAX {
            path.push(self.cell(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        path
    }
}

/// Batch search over `grid` between its configured endpoints.
///
/// Computes the full event trace synchronously; the caller replays it with
/// whatever pacing it likes. This is the recommended entry point for
/// presentation layers.
pub fn search(grid: &MazeGrid) -> Result<SearchReport, SearchError> {
    Ok(Solver::new(grid, grid.start(), grid.goal())?.run())
}

/// Gate that owns at most one live [`Solver`].
///
/// For callers that drive a search incrementally (timer-driven animation in
/// step mode) and must reject a request to start a new run while one is in
/// flight.
#[derive(Default)]
pub struct SearchSession {
    solver: Option<Solver>,
}

impl SearchSession {
    /// Create a session with no run in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run between the grid's configured endpoints.
    ///
    /// Fails with [`SearchError::SearchInProgress`] while a previous run is
    /// still computing. A finished run is replaced.
    pub fn begin(&mut self, grid: &MazeGrid) -> Result<(), SearchError> {
        if self.is_running() {
            return Err(SearchError::SearchInProgress);
        }
        self.solver = Some(Solver::new(grid, grid.start(), grid.goal())?);
        Ok(())
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        matches!(
            self.solver.as_ref().map(Solver::state),
            Some(SolverState::Computing)
        )
    }

    /// Step the live solver, if any.
    pub fn step(&mut self) -> Option<&SolverState> {
        self.solver.as_mut().map(|s| s.step())
    }

    /// The current solver (live or finished), if any.
    pub fn solver(&self) -> Option<&Solver> {
        self.solver.as_ref()
    }

    /// Abort the run in flight, discarding its state. The grid is untouched.
    pub fn cancel(&mut self) {
        self.solver = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::manhattan;

    fn grid_4x5() -> MazeGrid {
        MazeGrid::new(4, 5).unwrap()
    }

    /// Every consecutive pair in `path` must be adjacent and wall-free.
    fn assert_path_valid(grid: &MazeGrid, path: &[Cell]) {
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "{} !~ {}", pair[0], pair[1]);
            assert_eq!(grid.is_blocked(pair[0], pair[1]), Ok(false));
        }
    }

    #[test]
    fn no_walls_path_length_equals_manhattan() {
        let grid = grid_4x5();
        let report = search(&grid).unwrap();
        let path = report.path().expect("path");
        assert_eq!(path.len(), 8); // 7 steps
        assert_eq!(path[0], Cell::new(0, 0));
        assert_eq!(path[7], Cell::new(3, 4));
        assert_path_valid(&grid, path);
        match &report.outcome {
            SearchOutcome::PathFound(res) => {
                assert_eq!(res.cost, manhattan(res.start, res.goal));
            }
            SearchOutcome::NoPathFound => panic!("expected a path"),
        }
    }

    #[test]
    fn partial_barrier_is_routed_around() {
        let mut grid = grid_4x5();
        grid.toggle_wall(Cell::new(0, 1), Cell::new(1, 1)).unwrap();
        grid.toggle_wall(Cell::new(1, 1), Cell::new(1, 2)).unwrap();
        grid.set_goal(Cell::new(1, 2)).unwrap();

        let report = search(&grid).unwrap();
        let path = report.path().expect("path");
        assert_path_valid(&grid, path);
        // The top row remains open, so the minimum over the blocked graph
        // still equals the Manhattan distance here.
        assert_eq!(path.len() - 1, 3);
    }

    #[test]
    fn full_barrier_forces_detour() {
        let mut grid = grid_4x5();
        // Cut (1, 2) off from above and from the left.
        grid.toggle_wall(Cell::new(0, 1), Cell::new(1, 1)).unwrap();
        grid.toggle_wall(Cell::new(1, 1), Cell::new(1, 2)).unwrap();
        grid.toggle_wall(Cell::new(0, 2), Cell::new(1, 2)).unwrap();
        grid.set_goal(Cell::new(1, 2)).unwrap();

        let report = search(&grid).unwrap();
        let path = report.path().expect("path");
        assert_path_valid(&grid, path);
        let cost = path.len() as i32 - 1;
        assert_eq!(cost, 5);
        assert!(cost > manhattan(grid.start(), grid.goal()));
    }

    #[test]
    fn start_equals_goal() {
        let mut grid = grid_4x5();
        grid.set_goal(Cell::new(0, 0)).unwrap();
        let report = search(&grid).unwrap();
        match &report.outcome {
            SearchOutcome::PathFound(res) => {
                assert_eq!(res.path, vec![Cell::new(0, 0)]);
                assert_eq!(res.cost, 0);
            }
            SearchOutcome::NoPathFound => panic!("expected a path"),
        }
        assert_eq!(report.finalized_count(), 1);
    }

    #[test]
    fn enclosed_start_yields_no_path() {
        let mut grid = grid_4x5();
        grid.toggle_wall(Cell::new(0, 0), Cell::new(0, 1)).unwrap();
        grid.toggle_wall(Cell::new(0, 0), Cell::new(1, 0)).unwrap();

        let report = search(&grid).unwrap();
        assert_eq!(report.outcome, SearchOutcome::NoPathFound);
        assert_eq!(report.trace.last(), Some(&SearchEvent::NoPathFound));
        // Only the start itself is reachable.
        assert_eq!(report.finalized_count(), 1);
    }

    #[test]
    fn enclosed_goal_finalizes_all_reachable_cells() {
        let mut grid = grid_4x5();
        grid.toggle_wall(Cell::new(3, 3), Cell::new(3, 4)).unwrap();
        grid.toggle_wall(Cell::new(2, 4), Cell::new(3, 4)).unwrap();

        let report = search(&grid).unwrap();
        assert_eq!(report.outcome, SearchOutcome::NoPathFound);
        // Everything except the walled-off goal gets finalized before the
        // frontier exhausts.
        assert_eq!(report.finalized_count(), 19);
    }

    #[test]
    fn search_is_idempotent() {
        let mut grid = grid_4x5();
        grid.toggle_wall(Cell::new(1, 1), Cell::new(1, 2)).unwrap();
        grid.toggle_wall(Cell::new(2, 2), Cell::new(3, 2)).unwrap();

        let first = search(&grid).unwrap();
        let second = search(&grid).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tie_break_is_lowest_h_then_fifo() {
        let mut grid = MazeGrid::new(2, 2).unwrap();
        grid.set_goal(Cell::new(1, 1)).unwrap();
        let report = search(&grid).unwrap();

        let finalized: Vec<Cell> = report
            .trace
            .iter()
            .filter_map(|e| match e {
                SearchEvent::Finalized { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect();
        // (0, 1) and (1, 0) tie on f and h; (0, 1) was inserted first
        // (up-right-down-left order), and the goal's lower h wins before
        // (1, 0) is revisited.
        assert_eq!(
            finalized,
            vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 1)]
        );
        assert_eq!(
            report.path().unwrap(),
            &[Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 1)]
        );
    }

    #[test]
    fn trace_upholds_f_equals_g_plus_h() {
        let mut grid = grid_4x5();
        grid.toggle_wall(Cell::new(1, 2), Cell::new(2, 2)).unwrap();
        let report = search(&grid).unwrap();
        for ev in &report.trace {
            match *ev {
                SearchEvent::Discovered { g, h, f, .. }
                | SearchEvent::Finalized { g, h, f, .. } => {
                    assert_eq!(f, g + h);
                    assert!(h >= 0);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn no_cell_is_finalized_twice() {
        let mut grid = grid_4x5();
        grid.toggle_wall(Cell::new(0, 2), Cell::new(1, 2)).unwrap();
        grid.toggle_wall(Cell::new(1, 1), Cell::new(1, 2)).unwrap();
        grid.toggle_wall(Cell::new(2, 2), Cell::new(2, 3)).unwrap();

        let report = search(&grid).unwrap();
        let mut seen = std::collections::HashSet::new();
        for ev in &report.trace {
            if let SearchEvent::Finalized { cell, .. } = ev {
                assert!(seen.insert(*cell), "cell {cell} finalized twice");
            }
        }
    }

    #[test]
    fn solver_rejects_out_of_bounds_endpoints() {
        let grid = grid_4x5();
        let bad = Cell::new(9, 9);
        assert!(matches!(
            Solver::new(&grid, bad, grid.goal()),
            Err(SearchError::InvalidCell(c)) if c == bad
        ));
        assert!(matches!(
            Solver::new(&grid, grid.start(), bad),
            Err(SearchError::InvalidCell(c)) if c == bad
        ));
    }

    #[test]
    fn in_flight_run_ignores_wall_edits() {
        let mut grid = MazeGrid::new(1, 3).unwrap();
        let mut solver = Solver::new(&grid, grid.start(), grid.goal()).unwrap();
        solver.step();

        // Toggled after the run began: must not affect this run's snapshot,
        // only the next one.
        grid.toggle_wall(Cell::new(0, 1), Cell::new(0, 2)).unwrap();

        while matches!(solver.state(), SolverState::Computing) {
            solver.step();
        }
        match solver.state() {
            SolverState::Done(SearchOutcome::PathFound(res)) => assert_eq!(res.cost, 2),
            other => panic!("expected a path, got {other:?}"),
        }

        let next = search(&grid).unwrap();
        assert_eq!(next.outcome, SearchOutcome::NoPathFound);
    }

    #[test]
    fn session_rejects_overlapping_runs() {
        let grid = grid_4x5();
        let mut session = SearchSession::new();
        session.begin(&grid).unwrap();
        assert!(session.is_running());
        assert_eq!(session.begin(&grid), Err(SearchError::SearchInProgress));

        // Drive the live run to completion; a new run is then accepted.
        while session.is_running() {
            session.step();
        }
        session.begin(&grid).unwrap();
    }

    #[test]
    fn session_cancel_discards_the_run() {
        let grid = grid_4x5();
        let mut session = SearchSession::new();
        session.begin(&grid).unwrap();
        session.step();
        session.cancel();
        assert!(!session.is_running());
        assert!(session.solver().is_none());
        session.begin(&grid).unwrap();
    }

    #[test]
    fn step_mode_matches_batch_mode() {
        let mut grid = grid_4x5();
        grid.toggle_wall(Cell::new(2, 1), Cell::new(2, 2)).unwrap();

        let batch = search(&grid).unwrap();

        let mut solver = Solver::new(&grid, grid.start(), grid.goal()).unwrap();
        while matches!(solver.state(), SolverState::Computing) {
            solver.step();
        }
        assert_eq!(solver.trace(), batch.trace.as_slice());
        match solver.state() {
            SolverState::Done(outcome) => assert_eq!(*outcome, batch.outcome),
            SolverState::Computing => unreachable!(),
        }
    }
}
