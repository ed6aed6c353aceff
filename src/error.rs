//! Error types for the maze core.
//!
//! The taxonomy is deliberately narrow: configuration problems that make a level
//! impossible to build, and failures reported by the external input source. Collision
//! queries outside the grid are not errors; they simply report "blocked".

use thiserror::Error;

/// Errors produced by level setup, configuration loading, and the run loop.
#[derive(Error, Debug)]
pub enum MazeError {
    /// The rendering surface used to size the maze has a non-positive extent.
    #[error("rendering surface must have a positive extent, got {width}x{height}")]
    InvalidSurface { width: f32, height: f32 },

    /// A grid was requested with zero rows or columns.
    #[error("maze grid must be at least 1x1, got {rows}x{cols}")]
    InvalidGridDimensions { rows: usize, cols: usize },

    /// A configuration value is out of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input source failed while producing a sample.
    #[error("input source failed: {0}")]
    InputUnavailable(String),

    #[error("failed to read configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, MazeError>;
