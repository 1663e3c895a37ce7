//! **mazeterm** — interactive terminal maze editor and search visualizer.
//!
//! A crossterm front-end over [`maze_core`] and [`maze_paths`]: edit walls
//! and endpoints with the keyboard, run a search, and watch the frontier
//! animate as the recorded event trace is replayed tick by tick. All pacing
//! lives here; the search itself completes synchronously before the first
//! frame of the animation.

pub mod app;

pub use app::{App, run};
