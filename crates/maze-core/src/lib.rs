//! **maze-core** — the editable grid maze model.
//!
//! This crate provides the authoritative structure for a small rectangular
//! maze: grid bounds, blocking edges ([`Wall`]) between adjacent cells, and
//! the start/goal endpoints. It answers connectivity queries and performs
//! all input validation; it knows nothing about searching or rendering.

pub mod cell;
pub mod grid;

pub use cell::Cell;
pub use grid::{GridError, MazeGrid, Wall};
