//! Maze generation using randomized depth-first backtracking.
//!
//! This module provides the [`Grid`] of [`Cell`]s a maze is made of and the
//! [`MazeGenerator`] that carves it. Generation can run to completion in one call or be
//! advanced one step at a time so a loading screen can animate the carving.
//!
//! The generator only ever removes the wall shared by two adjacent cells, on both sides at
//! once, and every cell is entered exactly once from an already visited cell. The open
//! passages therefore form a spanning tree of the grid: a perfect maze with exactly one
//! simple path between any two cells.
//!
//! # Examples
//!
//! ```rust
//! use maze_trail::maze::generator::MazeGenerator;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // Create a 10x10 maze generator
//! let mut generator = MazeGenerator::new(10, 10, StdRng::seed_from_u64(7)).unwrap();
//!
//! // Generate the maze step by step
//! while !generator.is_complete() {
//!     generator.step();
//! }
//!
//! let grid = generator.into_grid();
//! assert_eq!(grid.open_passage_count(), 99);
//! ```
use crate::error::{MazeError, Result};
use rand::prelude::*;
use std::fmt;

/// Row/column address of a cell in the grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    /// Row index of the cell
    pub row: usize,
    /// Column index of the cell
    pub col: usize,
}

impl CellCoord {
    /// Creates a new CellCoord with the given coordinates
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One of the four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Towards row 0.
    Top,
    /// Towards the last column.
    Right,
    /// Towards the last row.
    Bottom,
    /// Towards column 0.
    Left,
}

impl Side {
    /// All sides, in the order neighbors are inspected during generation.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The side of the neighboring cell that faces this one.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }
}

/// Wall flags of a single cell. `true` means the wall is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Default for Walls {
    /// Every wall present.
    fn default() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }
}

impl Walls {
    /// Whether the wall on `side` is present.
    pub fn get(&self, side: Side) -> bool {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    fn remove(&mut self, side: Side) {
        match side {
            Side::Top => self.top = false,
            Side::Right => self.right = false,
            Side::Bottom => self.bottom = false,
            Side::Left => self.left = false,
        }
    }

    /// Number of walls still standing.
    pub fn count(&self) -> usize {
        Side::ALL.iter().filter(|side| self.get(**side)).count()
    }
}

/// A single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub walls: Walls,
    /// Only meaningful while generation is running; cleared once it completes.
    pub visited: bool,
}

impl Cell {
    fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            walls: Walls::default(),
            visited: false,
        }
    }

    /// Grid coordinates of this cell.
    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }
}

/// A fixed-size, row-major array of cells.
///
/// Walls can only be removed through [`MazeGenerator`]; once a grid leaves the generator
/// it is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid with every wall present.
    ///
    /// # Errors
    /// Returns [`MazeError::InvalidGridDimensions`] if `rows` or `cols` is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MazeError::InvalidGridDimensions { rows, cols });
        }
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::new(row, col));
            }
        }
        Ok(Self { rows, cols, cells })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `coord`, or `None` when out of bounds.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        if coord.row < self.rows && coord.col < self.cols {
            Some(&self.cells[coord.row * self.cols + coord.col])
        } else {
            None
        }
    }

    fn cell_mut(&mut self, coord: CellCoord) -> &mut Cell {
        &mut self.cells[coord.row * self.cols + coord.col]
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Whether the wall on `side` of the cell at `coord` is present.
    /// Anything outside the grid counts as a wall.
    pub fn has_wall(&self, coord: CellCoord, side: Side) -> bool {
        self.cell(coord).is_none_or(|cell| cell.walls.get(side))
    }

    /// The cell adjacent to `coord` across `side`, clipped to the grid boundary.
    pub fn neighbor(&self, coord: CellCoord, side: Side) -> Option<CellCoord> {
        let CellCoord { row, col } = coord;
        let next = match side {
            Side::Top if row > 0 => CellCoord::new(row - 1, col),
            Side::Right if col + 1 < self.cols => CellCoord::new(row, col + 1),
            Side::Bottom if row + 1 < self.rows => CellCoord::new(row + 1, col),
            Side::Left if col > 0 => CellCoord::new(row, col - 1),
            _ => return None,
        };
        Some(next)
    }

    /// Neighbors reachable from `coord` through an open wall.
    pub fn open_neighbors(&self, coord: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Side::ALL.into_iter().filter_map(move |side| {
            if self.has_wall(coord, side) {
                None
            } else {
                self.neighbor(coord, side)
            }
        })
    }

    /// Number of open passages between adjacent cells. Each passage is counted once.
    pub fn open_passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| {
                let right = cell.col + 1 < self.cols && !cell.walls.right;
                let bottom = cell.row + 1 < self.rows && !cell.walls.bottom;
                right as usize + bottom as usize
            })
            .sum()
    }

    /// Removes the wall shared by two orthogonally adjacent cells, on both sides.
    fn remove_wall_between(&mut self, from: CellCoord, to: CellCoord) {
        let side = if to.row + 1 == from.row {
            Side::Top
        } else if to.row == from.row + 1 {
            Side::Bottom
        } else if to.col + 1 == from.col {
            Side::Left
        } else {
            Side::Right
        };
        self.cell_mut(from).walls.remove(side);
        self.cell_mut(to).walls.remove(side.opposite());
    }

    fn clear_visited(&mut self) {
        for cell in &mut self.cells {
            cell.visited = false;
        }
    }

    /// A grid with every interior wall removed. Not a perfect maze; used to probe
    /// collision behavior in open cells.
    #[cfg(test)]
    pub(crate) fn fully_open(rows: usize, cols: usize) -> Self {
        let mut grid = Self::new(rows, cols).expect("non-empty grid");
        for row in 0..rows {
            for col in 0..cols {
                let here = CellCoord::new(row, col);
                if col + 1 < cols {
                    grid.remove_wall_between(here, CellCoord::new(row, col + 1));
                }
                if row + 1 < rows {
                    grid.remove_wall_between(here, CellCoord::new(row + 1, col));
                }
            }
        }
        grid
    }
}

/// ASCII rendering: `#` for walls and corners, spaces for cells and open passages.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let wall = self.has_wall(CellCoord::new(row, col), Side::Top);
                write!(f, "#{}", if wall { '#' } else { ' ' })?;
            }
            writeln!(f, "#")?;
            for col in 0..self.cols {
                let wall = self.has_wall(CellCoord::new(row, col), Side::Left);
                write!(f, "{} ", if wall { '#' } else { ' ' })?;
            }
            let wall = self.has_wall(CellCoord::new(row, self.cols - 1), Side::Right);
            writeln!(f, "{}", if wall { '#' } else { ' ' })?;
        }
        for col in 0..self.cols {
            let wall = self.has_wall(CellCoord::new(self.rows - 1, col), Side::Bottom);
            write!(f, "#{}", if wall { '#' } else { ' ' })?;
        }
        writeln!(f, "#")
    }
}

/// Maze generator using randomized depth-first backtracking.
///
/// The random source is injected so that a seeded generator always carves the same maze.
pub struct MazeGenerator<R: Rng> {
    grid: Grid,
    stack: Vec<CellCoord>,
    rng: R,
    visited_cells: usize,
    /// Indicates if generation is complete
    generation_complete: bool,
}

impl<R: Rng> MazeGenerator<R> {
    /// Creates a generator for a `rows`x`cols` grid with every wall present, seeded at
    /// cell (0, 0).
    ///
    /// # Errors
    /// Returns [`MazeError::InvalidGridDimensions`] if either dimension is zero.
    pub fn new(rows: usize, cols: usize, rng: R) -> Result<Self> {
        let mut grid = Grid::new(rows, cols)?;
        let origin = CellCoord::new(0, 0);
        grid.cell_mut(origin).visited = true;

        Ok(Self {
            grid,
            stack: vec![origin],
            rng,
            visited_cells: 1,
            generation_complete: false,
        })
    }

    /// Performs one step of maze generation.
    ///
    /// Inspects the top of the stack: if it has unvisited neighbors, one is chosen
    /// uniformly at random, the shared wall is removed and the neighbor is pushed.
    /// Otherwise the stack is popped. Returns `true` if a wall was removed in this step.
    pub fn step(&mut self) -> bool {
        let Some(&current) = self.stack.last() else {
            return false;
        };

        let unvisited: Vec<CellCoord> = Side::ALL
            .into_iter()
            .filter_map(|side| self.grid.neighbor(current, side))
            .filter(|coord| self.grid.cell(*coord).is_some_and(|cell| !cell.visited))
            .collect();

        match unvisited.choose(&mut self.rng) {
            Some(&next) => {
                self.grid.remove_wall_between(current, next);
                self.grid.cell_mut(next).visited = true;
                self.visited_cells += 1;
                self.stack.push(next);
                true
            }
            None => {
                self.stack.pop();
                if self.stack.is_empty() {
                    self.grid.clear_visited();
                    self.generation_complete = true;
                }
                false
            }
        }
    }

    /// Checks if maze generation is complete
    pub fn is_complete(&self) -> bool {
        self.generation_complete
    }

    /// Returns the generation progress as a ratio (0.0 to 1.0) of cells visited.
    pub fn progress_ratio(&self) -> f32 {
        self.visited_cells as f32 / self.grid.len() as f32
    }

    /// The grid as carved so far.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Runs generation to completion and hands over the finished grid.
    pub fn into_grid(mut self) -> Grid {
        while !self.generation_complete {
            self.step();
        }
        self.grid
    }
}

/// Generates a complete perfect maze grid of `rows`x`cols` cells.
pub fn generate<R: Rng>(rows: usize, cols: usize, rng: R) -> Result<Grid> {
    Ok(MazeGenerator::new(rows, cols, rng)?.into_grid())
}
