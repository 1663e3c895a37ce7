//! **maze-paths** — best-first shortest-path search over maze grids.
//!
//! The entry points, from highest to lowest level:
//!
//! - [`search`] — one-shot batch search over a [`MazeGrid`]'s endpoints,
//!   returning a [`SearchReport`]: the outcome plus the full ordered event
//!   trace a presentation layer replays to animate the run.
//! - [`SearchSession`] — gate that owns at most one live solver, for callers
//!   that drive the search incrementally and must reject overlapping runs.
//! - [`Solver`] — the step-wise engine itself: one frontier pop per
//!   [`Solver::step`] call.
//!
//! The algorithm is A* with a uniform step cost of 1 and an admissible
//! heuristic supplied through the [`AstarPather`] trait; [`MazeGrid`]
//! implements it using Manhattan distance.
//!
//! [`MazeGrid`]: maze_core::MazeGrid

mod distance;
mod event;
mod solver;
mod traits;

pub use distance::manhattan;
pub use event::{PathResult, SearchEvent, SearchOutcome, SearchReport};
pub use solver::{SearchError, SearchSession, Solver, SolverState, search};
pub use traits::{AstarPather, Pather};
