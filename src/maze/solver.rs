//! Path finding through a carved grid.
//!
//! A perfect maze has exactly one simple path between two cells, so a breadth-first search
//! over open walls finds it directly. The autopilot input follows this path.

use super::generator::{CellCoord, Grid};
use std::collections::VecDeque;

/// Finds the cell path from `from` to `to` (both inclusive) through open walls.
///
/// Returns `None` if either cell is outside the grid or no path exists.
pub fn solve_path(grid: &Grid, from: CellCoord, to: CellCoord) -> Option<Vec<CellCoord>> {
    grid.cell(from)?;
    grid.cell(to)?;

    let index = |coord: CellCoord| coord.row * grid.cols() + coord.col;
    let mut parent: Vec<Option<CellCoord>> = vec![None; grid.len()];
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::from([from]);
    seen[index(from)] = true;

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![current];
            let mut cursor = current;
            while let Some(prev) = parent[index(cursor)] {
                path.push(prev);
                cursor = prev;
            }
            path.reverse();
            return Some(path);
        }

        for next in grid.open_neighbors(current) {
            if !seen[index(next)] {
                seen[index(next)] = true;
                parent[index(next)] = Some(current);
                queue.push_back(next);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generator::{Side, generate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Tests that consecutive path cells are joined by open walls.
    #[test]
    fn test_path_follows_open_walls() {
        let grid = generate(10, 10, StdRng::seed_from_u64(11)).unwrap();
        let path = solve_path(&grid, CellCoord::new(0, 0), CellCoord::new(9, 9)).unwrap();

        assert_eq!(path.first(), Some(&CellCoord::new(0, 0)));
        assert_eq!(path.last(), Some(&CellCoord::new(9, 9)));
        for pair in path.windows(2) {
            let open = grid.open_neighbors(pair[0]).any(|n| n == pair[1]);
            assert!(open, "{:?} -> {:?} crosses a wall", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_trivial_and_out_of_bounds() {
        let grid = generate(3, 3, StdRng::seed_from_u64(2)).unwrap();
        let here = CellCoord::new(1, 1);
        assert_eq!(solve_path(&grid, here, here), Some(vec![here]));
        assert_eq!(solve_path(&grid, here, CellCoord::new(3, 0)), None);
    }

    /// Tests that a closed grid has no path between distinct cells.
    #[test]
    fn test_no_path_without_passages() {
        let grid = Grid::new(2, 2).unwrap();
        assert!(grid.has_wall(CellCoord::new(0, 0), Side::Right));
        assert_eq!(
            solve_path(&grid, CellCoord::new(0, 0), CellCoord::new(1, 1)),
            None
        );
    }
}
