//! Toroidal neighborhood queries.

use crate::error::{Error, Result};
use crate::grid::{CellState, Grid};
use serde::{Deserialize, Serialize};

/// Neighborhood scheme declared by an automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborhoodKind {
    /// 4 orthogonal neighbors
    VonNeumann,
    /// 8 surrounding neighbors
    Moore,
    /// 6 neighbors on an offset hex layout. Declared only; not resolvable.
    Hexagonal,
    /// Variant-specific scheme. Declared only; not resolvable.
    Custom,
}

impl std::fmt::Display for NeighborhoodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::VonNeumann => "von_neumann",
            Self::Moore => "moore",
            Self::Hexagonal => "hexagonal",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Offsets of the 8 Moore neighbors, center excluded
pub const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Directional von Neumann observation. North is `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VonNeumannView {
    pub center: CellState,
    pub north: CellState,
    pub south: CellState,
    pub east: CellState,
    pub west: CellState,
}

impl VonNeumannView {
    /// Pattern key in (C, N, E, S, W) order
    pub fn as_key(&self) -> [CellState; 5] {
        [self.center, self.north, self.east, self.south, self.west]
    }
}

/// 3x3 Moore block indexed `[row][column]`, center at `[1][1]`
pub type MooreBlock = [[CellState; 3]; 3];

/// Result of a neighborhood query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Neighborhood {
    VonNeumann(VonNeumannView),
    Moore(MooreBlock),
}

/// Read the von Neumann neighborhood around `(x, y)`
pub fn von_neumann(grid: &Grid, x: usize, y: usize) -> VonNeumannView {
    let (x, y) = (x as isize, y as isize);
    VonNeumannView {
        center: grid.get_wrapped(x, y),
        north: grid.get_wrapped(x, y - 1),
        south: grid.get_wrapped(x, y + 1),
        east: grid.get_wrapped(x + 1, y),
        west: grid.get_wrapped(x - 1, y),
    }
}

/// Read the 3x3 Moore block around `(x, y)`
pub fn moore_block(grid: &Grid, x: usize, y: usize) -> MooreBlock {
    let (x, y) = (x as isize, y as isize);
    let mut block = [[0; 3]; 3];
    for (row, dy) in (-1..=1).enumerate() {
        for (col, dx) in (-1..=1).enumerate() {
            block[row][col] = grid.get_wrapped(x + dx, y + dy);
        }
    }
    block
}

/// Resolve a neighborhood of the given kind
pub fn resolve(grid: &Grid, x: usize, y: usize, kind: NeighborhoodKind) -> Result<Neighborhood> {
    if grid.is_empty() {
        return Err(Error::invalid_parameter("grid", "empty grid has no neighborhoods"));
    }
    match kind {
        NeighborhoodKind::VonNeumann => Ok(Neighborhood::VonNeumann(von_neumann(grid, x, y))),
        NeighborhoodKind::Moore => Ok(Neighborhood::Moore(moore_block(grid, x, y))),
        other => Err(Error::UnsupportedNeighborhood(other)),
    }
}

/// Count Moore neighbors of `(x, y)` matching `pred`
#[inline]
pub fn count_moore<F>(grid: &Grid, x: usize, y: usize, pred: F) -> u8
where
    F: Fn(CellState) -> bool,
{
    let (x, y) = (x as isize, y as isize);
    MOORE_OFFSETS
        .iter()
        .filter(|&&(dx, dy)| pred(grid.get_wrapped(x + dx, y + dy)))
        .count() as u8
}
