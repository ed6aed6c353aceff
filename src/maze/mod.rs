//! Maze generation, geometry, and collision.
//!
//! A [`Maze`] wraps a carved [`Grid`] with a cell size, mapping grid cells onto the
//! rendering surface. It derives the start and end positions, the overall surface
//! dimensions, and answers the per-tick question "would a circle of this radius at this
//! point cross a wall?".
//!
//! # Coordinate System
//!
//! Surface coordinates have their origin at the top-left corner of cell (0, 0); `x` grows
//! with the column index and `y` with the row index. Cell `(row, col)` spans
//! `[col * cell_size, (col + 1) * cell_size)` horizontally and
//! `[row * cell_size, (row + 1) * cell_size)` vertically.

pub mod generator;
pub mod solver;

pub use self::generator::{Cell, CellCoord, Grid, MazeGenerator, Side, Walls};

use crate::error::{MazeError, Result};
use crate::math::Vec2;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// A named cell together with the surface coordinates of its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MazePosition {
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
}

impl MazePosition {
    /// Center point in surface units.
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }
}

/// A perfect maze laid out on the rendering surface.
#[derive(Debug, Clone)]
pub struct Maze {
    grid: Grid,
    cell_size: f32,
}

impl Maze {
    /// Wraps an already generated grid.
    ///
    /// # Errors
    /// Returns [`MazeError::InvalidConfig`] if `cell_size` is not a positive number.
    pub fn new(grid: Grid, cell_size: f32) -> Result<Self> {
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(MazeError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        Ok(Self { grid, cell_size })
    }

    /// Generates a fresh `rows`x`cols` perfect maze with the given cell size.
    pub fn generate<R: Rng>(rows: usize, cols: usize, cell_size: f32, rng: R) -> Result<Self> {
        let grid = generator::generate(rows, cols, rng)?;
        Self::new(grid, cell_size)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Edge length of one cell in surface units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Overall surface size of the maze, `(width, height)`.
    pub fn dimensions(&self) -> (f32, f32) {
        (
            self.cols() as f32 * self.cell_size,
            self.rows() as f32 * self.cell_size,
        )
    }

    /// Surface coordinates of the center of `coord`.
    pub fn cell_center(&self, coord: CellCoord) -> Vec2 {
        let half = self.cell_size / 2.0;
        Vec2::new(
            coord.col as f32 * self.cell_size + half,
            coord.row as f32 * self.cell_size + half,
        )
    }

    fn position_of(&self, coord: CellCoord) -> MazePosition {
        let center = self.cell_center(coord);
        MazePosition {
            row: coord.row,
            col: coord.col,
            x: center.x,
            y: center.y,
        }
    }

    /// The top-left cell, where the player spawns.
    pub fn start_position(&self) -> MazePosition {
        self.position_of(CellCoord::new(0, 0))
    }

    /// The bottom-right cell, where the goal sits.
    pub fn end_position(&self) -> MazePosition {
        self.position_of(CellCoord::new(self.rows() - 1, self.cols() - 1))
    }

    /// Maps a surface point to the cell containing it, or `None` outside the grid.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<CellCoord> {
        // Also rejects NaN.
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let col = (x / self.cell_size).floor() as usize;
        let row = (y / self.cell_size).floor() as usize;
        (row < self.rows() && col < self.cols()).then(|| CellCoord::new(row, col))
    }

    /// Whether the wall on `side` of the cell at `row`, `col` is present. Out-of-bounds
    /// cells count as walled.
    pub fn has_wall(&self, row: usize, col: usize, side: Side) -> bool {
        self.grid.has_wall(CellCoord::new(row, col), side)
    }

    /// Reports whether a circle of `radius` centered at `(x, y)` crosses a wall.
    ///
    /// Only the walls of the cell containing the center are consulted, each as a
    /// half-plane on its own axis. Points outside the grid are always blocked.
    pub fn blocks_movement(&self, x: f32, y: f32, radius: f32) -> bool {
        let Some(coord) = self.cell_at(x, y) else {
            return true;
        };
        let Some(cell) = self.grid.cell(coord) else {
            return true;
        };

        let left = coord.col as f32 * self.cell_size;
        let top = coord.row as f32 * self.cell_size;
        let right = left + self.cell_size;
        let bottom = top + self.cell_size;

        (cell.walls.top && y - radius < top)
            || (cell.walls.bottom && y + radius > bottom)
            || (cell.walls.left && x - radius < left)
            || (cell.walls.right && x + radius > right)
    }

    /// The unique cell path from the start cell to the end cell.
    pub fn solve(&self) -> Vec<CellCoord> {
        solver::solve_path(
            &self.grid,
            self.start_position().coord(),
            self.end_position().coord(),
        )
        .unwrap_or_default()
    }
}

/// ASCII rendering with `S` and `E` marking the start and end cells.
impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.end_position();
        let text = self.grid.to_string();
        for (line_idx, line) in text.lines().enumerate() {
            let row_line = line_idx % 2 == 1;
            let line: String = line
                .chars()
                .enumerate()
                .map(|(col_idx, c)| {
                    if row_line && col_idx % 2 == 1 {
                        let cell = CellCoord::new(line_idx / 2, col_idx / 2);
                        if cell == CellCoord::new(0, 0) {
                            return 'S';
                        }
                        if cell == end.coord() {
                            return 'E';
                        }
                    }
                    c
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
