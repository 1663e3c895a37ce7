//! Search events and outcomes consumed by presentation layers.

use maze_core::Cell;

/// A single visitation event emitted while the search runs.
///
/// `g` is the accumulated cost from the start, `h` the heuristic estimate to
/// the goal, and `f = g + h` the priority key; the equality holds for every
/// event. A trace contains exactly one terminal event ([`PathFound`] or
/// [`NoPathFound`]), always last.
///
/// [`PathFound`]: SearchEvent::PathFound
/// [`NoPathFound`]: SearchEvent::NoPathFound
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchEvent {
    /// A cell entered the frontier, or its best known cost improved.
    Discovered { cell: Cell, g: i32, h: i32, f: i32 },
    /// A cell's optimal cost was confirmed (popped from the frontier).
    Finalized { cell: Cell, g: i32, h: i32, f: i32 },
    /// The goal was reached; `path` runs from start to goal inclusive.
    PathFound { path: Vec<Cell> },
    /// The frontier was exhausted without reaching the goal.
    NoPathFound,
}

/// A successful search result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Cells from start to goal inclusive; consecutive cells are adjacent
    /// and wall-free.
    pub path: Vec<Cell>,
    pub start: Cell,
    pub goal: Cell,
    /// Number of steps, `path.len() - 1`.
    pub cost: i32,
}

/// Terminal outcome of a search run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchOutcome {
    PathFound(PathResult),
    NoPathFound,
}

/// What a batch search returns: the outcome plus the full event trace.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub trace: Vec<SearchEvent>,
}

impl SearchReport {
    /// The found path, if any.
    pub fn path(&self) -> Option<&[Cell]> {
        match &self.outcome {
            SearchOutcome::PathFound(res) => Some(&res.path),
            SearchOutcome::NoPathFound => None,
        }
    }

    /// Number of `Finalized` events in the trace.
    pub fn finalized_count(&self) -> usize {
        self.trace
            .iter()
            .filter(|e| matches!(e, SearchEvent::Finalized { .. }))
            .count()
    }
}
