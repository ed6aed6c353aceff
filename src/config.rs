//! Tunable game constants.
//!
//! [`GameConfig`] gathers every number that shapes a level: how the maze grows with the
//! level number, how large cells may get, and the sizes and easing of the player and
//! goal tokens. The defaults reproduce the classic hand-tracking maze game; a partial
//! JSON file can override any subset of them.

use crate::error::{MazeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for level sizing, token geometry, and tick timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Maze side length (in cells) on level 1.
    pub base_maze_size: usize,
    /// The maze grows by one cell every this many levels.
    pub levels_per_growth: u32,
    /// Upper bound on the maze side length.
    pub max_maze_size: usize,
    /// Smallest allowed cell edge, in surface units.
    pub min_cell_size: f32,
    /// Collision radius of the player token.
    pub player_radius: f32,
    /// Fraction of the remaining gap to the target closed on every tick.
    pub player_smoothing: f32,
    /// Arrival radius of the goal token.
    pub goal_radius: f32,
    /// Ticks per second delivered by the fixed-rate driver.
    pub tick_rate: u32,
    /// Seed for maze generation; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_maze_size: 8,
            levels_per_growth: 2,
            max_maze_size: 15, // wide corridors on small screens
            min_cell_size: 45.0,
            player_radius: 8.0,
            player_smoothing: 0.15,
            goal_radius: 15.0,
            tick_rate: 60,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Loads a configuration from a JSON file. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`MazeError::ConfigIo`] or [`MazeError::ConfigParse`] when the file cannot
    /// be read or parsed, and [`MazeError::InvalidConfig`] when a value is out of range.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses a partial JSON document; missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is in range and that the player fits inside a cell.
    pub fn validate(&self) -> Result<()> {
        if self.base_maze_size == 0 {
            return Err(MazeError::InvalidConfig(
                "base_maze_size must be at least 1".to_string(),
            ));
        }
        if self.levels_per_growth == 0 {
            return Err(MazeError::InvalidConfig(
                "levels_per_growth must be at least 1".to_string(),
            ));
        }
        if self.max_maze_size < self.base_maze_size {
            return Err(MazeError::InvalidConfig(format!(
                "max_maze_size ({}) is smaller than base_maze_size ({})",
                self.max_maze_size, self.base_maze_size
            )));
        }
        if !(self.min_cell_size > 0.0) {
            return Err(MazeError::InvalidConfig(
                "min_cell_size must be positive".to_string(),
            ));
        }
        if !(self.player_radius > 0.0) || !(self.goal_radius > 0.0) {
            return Err(MazeError::InvalidConfig(
                "player and goal radii must be positive".to_string(),
            ));
        }
        if self.player_radius * 2.0 >= self.min_cell_size {
            return Err(MazeError::InvalidConfig(format!(
                "player diameter {} does not fit in a {} unit cell",
                self.player_radius * 2.0,
                self.min_cell_size
            )));
        }
        if !(self.player_smoothing > 0.0 && self.player_smoothing < 1.0) {
            return Err(MazeError::InvalidConfig(format!(
                "player_smoothing must lie in (0, 1), got {}",
                self.player_smoothing
            )));
        }
        if self.tick_rate == 0 {
            return Err(MazeError::InvalidConfig(
                "tick_rate must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Side length of the square maze used for `level`.
    ///
    /// Starts at `base_maze_size`, grows by one every `levels_per_growth` levels and is
    /// capped at `max_maze_size`. Level numbers start at 1; level 0 is treated as 1.
    pub fn maze_size_for_level(&self, level: u32) -> usize {
        let growth = (level.saturating_sub(1) / self.levels_per_growth) as usize;
        (self.base_maze_size + growth).min(self.max_maze_size)
    }

    /// Cell edge length for a maze of `maze_size` cells drawn on a `width`x`height` surface.
    pub fn cell_size_for(&self, width: f32, height: f32, maze_size: usize) -> f32 {
        let max_extent = width.min(height);
        (max_extent / maze_size as f32)
            .floor()
            .max(self.min_cell_size)
    }

    /// Duration of one tick, in seconds.
    pub fn tick_interval(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}
