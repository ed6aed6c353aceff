//! Maze Trail - the core of a pointer-driven maze game.
//!
//! A perfect maze is generated for every level, a player token eases towards whatever
//! point an external input source reports, walls stop it, and reaching the goal scores
//! the level by distance traveled per second.
//!
//! # Architecture
//! - `maze/`: maze generation, geometry, collision and path finding
//! - `game/`: level simulation, scoring, input, events and clocks
//! - `app/`: the run loop state machine and the session context
//! - `math/`: 2D vector utilities
//!
//! Rendering and input capture are left to the embedding application: the core consumes
//! a surface extent and one input sample per tick, and reports level results.

pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod math;
pub mod maze;

pub use app::{AppContext, RunLoop, RunState};
pub use config::GameConfig;
pub use error::{MazeError, Result};
