//! Toroidal cell grid.
//!
//! Cells are stored row-major in a flat vector. Every coordinate passed to
//! the `wrapped` accessors is taken modulo the grid dimensions, so the left
//! edge neighbors the right edge and the top edge neighbors the bottom edge.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single cell value. State 0 is the quiescent (background) state.
pub type CellState = u8;

/// Fixed-size 2-D grid of cell states
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Create a grid with every cell in the quiescent state
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Build a grid from rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<CellState>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return Err(Error::ShapeMismatch {
                    expected: (width, height),
                    found: (row.len(), height),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Copy the grid out as rows
    pub fn to_rows(&self) -> Vec<Vec<CellState>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.cells.chunks(self.width).map(<[CellState]>::to_vec).collect()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Read a cell; `None` when out of bounds
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<CellState> {
        if self.in_bounds(x, y) {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Write a cell; returns false when out of bounds
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, state: CellState) -> bool {
        if self.in_bounds(x, y) {
            self.cells[y * self.width + x] = state;
            true
        } else {
            false
        }
    }

    /// Read a cell at signed coordinates with toroidal wrapping.
    ///
    /// Must not be called on an empty grid.
    #[inline]
    pub fn get_wrapped(&self, x: isize, y: isize) -> CellState {
        let wx = x.rem_euclid(self.width as isize) as usize;
        let wy = y.rem_euclid(self.height as isize) as usize;
        self.cells[wy * self.width + wx]
    }

    /// Set a cell at signed coordinates with toroidal wrapping
    #[inline]
    pub fn set_wrapped(&mut self, x: isize, y: isize, state: CellState) {
        if self.is_empty() {
            return;
        }
        let wx = x.rem_euclid(self.width as isize) as usize;
        let wy = y.rem_euclid(self.height as isize) as usize;
        self.cells[wy * self.width + wx] = state;
    }

    /// Raw row-major cell slice
    #[inline]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [CellState] {
        &mut self.cells
    }

    /// Set every cell to `state`
    pub fn fill(&mut self, state: CellState) {
        self.cells.fill(state);
    }

    /// Reset every cell to the quiescent state
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Number of non-quiescent cells
    pub fn count_active(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Iterate over `(x, y, state)`
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (i % width, i / width, c))
    }

    /// Copy one row out
    pub fn row(&self, y: usize) -> Option<&[CellState]> {
        if y < self.height {
            Some(&self.cells[y * self.width..(y + 1) * self.width])
        } else {
            None
        }
    }

    /// Check every cell lies in `[0, num_states)`
    pub fn validate_states(&self, num_states: u8) -> Result<()> {
        match self.iter_cells().find(|&(_, _, c)| c >= num_states) {
            Some((x, y, state)) => Err(Error::InvalidState {
                x,
                y,
                state,
                num_states,
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.to_rows() {
            let line: String = row
                .iter()
                .map(|&c| match c {
                    0 => '.',
                    1..=9 => char::from(b'0' + c),
                    _ => '#',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_roundtrip() {
        let rows = vec![vec![0, 1, 2], vec![3, 0, 1]];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.shape(), (3, 2));
        assert_eq!(grid.get(2, 1), Some(1));
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![0, 1, 2], vec![3, 0]];
        assert!(matches!(
            Grid::from_rows(&rows),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_wrapped_access() {
        let mut grid = Grid::new(4, 3);
        grid.set(3, 2, 7);
        assert_eq!(grid.get_wrapped(-1, -1), 7);
        assert_eq!(grid.get_wrapped(7, 5), 7);

        grid.set_wrapped(4, 3, 5);
        assert_eq!(grid.get(0, 0), Some(5));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(grid.get(2, 0), None);
        assert!(!grid.set(0, 2, 1));
        assert_eq!(grid.count_active(), 0);
    }

    #[test]
    fn test_validate_states() {
        let mut grid = Grid::new(3, 3);
        grid.set(1, 2, 4);
        assert!(grid.validate_states(5).is_ok());
        match grid.validate_states(4) {
            Err(Error::InvalidState { x, y, state, .. }) => {
                assert_eq!((x, y, state), (1, 2, 4));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
