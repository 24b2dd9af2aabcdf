//! Pattern parameters and helpers for seeding grids.

use crate::grid::{CellState, Grid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Optional knobs understood by pattern initializers.
///
/// Each initializer reads only the fields it needs and falls back to its own
/// default for anything left unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternParams {
    /// Anchor column
    pub x: Option<usize>,
    /// Anchor row
    pub y: Option<usize>,
    /// Fill probability for random patterns (0.0 - 1.0)
    pub density: Option<f64>,
    /// Seed for random patterns; unseeded patterns draw from the thread RNG
    pub seed: Option<u64>,
    /// Width of a random region
    pub size_x: Option<usize>,
    /// Height of a random region
    pub size_y: Option<usize>,
    pub radius: Option<usize>,
    pub spacing: Option<usize>,
    /// Arm length of crosses
    pub size: Option<usize>,
    /// Spiral turns
    pub turns: Option<usize>,
    /// Line length
    pub length: Option<usize>,
}

impl PatternParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: usize, y: usize) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Anchor, or the given defaults
    pub fn anchor_or(&self, x: usize, y: usize) -> (usize, usize) {
        (self.x.unwrap_or(x), self.y.unwrap_or(y))
    }

    /// Density clamped to `[0, 1]`
    pub fn density_or(&self, default: f64) -> f64 {
        self.density.unwrap_or(default).clamp(0.0, 1.0)
    }

    /// RNG for this pattern: seeded when `seed` is set
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(rand::thread_rng())
                .unwrap_or_else(|_| ChaCha8Rng::seed_from_u64(rand::random())),
        }
    }
}

/// Catalogue entry describing a named pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInfo {
    pub name: String,
    pub description: String,
    /// (width, height)
    pub recommended_size: (usize, usize),
    /// Default parameter values, for display
    pub parameters: Vec<(String, String)>,
}

impl PatternInfo {
    pub fn new(name: &str, description: &str, recommended_size: (usize, usize)) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            recommended_size,
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.parameters.push((name.to_string(), value.to_string()));
        self
    }
}

/// Largest anchor coordinate kept as is. Anything beyond lies off every grid
/// and is clamped so pattern offsets can be added without overflow.
const ANCHOR_LIMIT: usize = (isize::MAX / 4) as usize;

/// Anchor coordinate as a signed position
#[inline]
pub fn signed(v: usize) -> isize {
    v.min(ANCHOR_LIMIT) as isize
}

/// Copy `shape` into the grid with its top-left corner at `(x, y)`.
///
/// Zeros in the shape are written too. Cells falling outside the grid are
/// dropped rather than wrapped.
pub fn stamp<const W: usize>(grid: &mut Grid, x: isize, y: isize, shape: &[[CellState; W]]) {
    for (dy, row) in shape.iter().enumerate() {
        for (dx, &state) in row.iter().enumerate() {
            set_clipped(grid, x.saturating_add(dx as isize), y.saturating_add(dy as isize), state);
        }
    }
}

/// Set a cell when `(x, y)` lies inside the grid
#[inline]
pub fn set_clipped(grid: &mut Grid, x: isize, y: isize, state: CellState) {
    if x >= 0 && y >= 0 {
        grid.set(x as usize, y as usize, state);
    }
}

/// Fill a rectangle with `state` at probability `density`. Cells past the
/// grid edge are dropped.
pub fn random_fill<R: Rng>(
    grid: &mut Grid,
    rng: &mut R,
    (x, y): (usize, usize),
    (size_x, size_y): (usize, usize),
    density: f64,
    state: CellState,
) {
    let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
    for dy in 0..size_y {
        for dx in 0..size_x {
            if rng.gen_bool(density) {
                grid.set(x.saturating_add(dx), y.saturating_add(dy), state);
            }
        }
    }
}

/// Plus-shaped cross with arms of length `size`
pub fn cross(grid: &mut Grid, cx: usize, cy: usize, size: usize, state: CellState) {
    let size = size.min(grid.width().max(grid.height()));
    let (cx, cy, size) = (signed(cx), signed(cy), size as isize);
    for i in -size..=size {
        set_clipped(grid, cx.saturating_add(i), cy, state);
        set_clipped(grid, cx, cy.saturating_add(i), state);
    }
}

/// Points on a circle, sampled at `samples` evenly spaced angles including both ends
pub fn circle(grid: &mut Grid, cx: usize, cy: usize, radius: usize, samples: usize, state: CellState) {
    let last = samples.saturating_sub(1).max(1) as f64;
    for i in 0..samples {
        let angle = i as f64 / last * std::f64::consts::TAU;
        let px = cx as f64 + radius as f64 * angle.cos();
        let py = cy as f64 + radius as f64 * angle.sin();
        set_clipped(grid, px.trunc() as isize, py.trunc() as isize, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_clips_at_edges() {
        let mut grid = Grid::new(4, 4);
        stamp(&mut grid, 2, 2, &[[1, 1, 1], [1, 0, 1]]);
        assert_eq!(grid.get(2, 2), Some(1));
        assert_eq!(grid.get(3, 3), Some(0));
        assert_eq!(grid.count_active(), 3);

        stamp(&mut grid, -1, -1, &[[1, 1], [1, 1]]);
        assert_eq!(grid.get(0, 0), Some(1));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let params = PatternParams::new().with_seed(42);
        let mut a = Grid::new(20, 20);
        let mut b = Grid::new(20, 20);
        random_fill(&mut a, &mut params.rng(), (0, 0), (20, 20), 0.5, 1);
        random_fill(&mut b, &mut params.rng(), (0, 0), (20, 20), 0.5, 1);
        assert_eq!(a, b);
        assert!(a.count_active() > 0);
    }

    #[test]
    fn test_density_clamped() {
        let params = PatternParams::new().with_density(3.0);
        assert_eq!(params.density_or(0.1), 1.0);
        assert_eq!(PatternParams::new().density_or(0.25), 0.25);
    }

    #[test]
    fn test_far_anchor_is_dropped() {
        let mut grid = Grid::new(6, 6);
        let params = PatternParams::new().with_seed(3);
        random_fill(&mut grid, &mut params.rng(), (usize::MAX, usize::MAX - 1), (4, 4), 1.0, 1);
        stamp(&mut grid, isize::MAX, isize::MAX, &[[1, 1], [1, 1]]);
        cross(&mut grid, usize::MAX, 2, 2, 1);
        assert_eq!(grid.count_active(), 0);

        random_fill(&mut grid, &mut params.rng(), (4, 4), (4, 4), 1.0, 1);
        assert_eq!(grid.count_active(), 4);
    }

    #[test]
    fn test_cross() {
        let mut grid = Grid::new(9, 9);
        cross(&mut grid, 4, 4, 2, 1);
        assert_eq!(grid.count_active(), 9);
        assert_eq!(grid.get(4, 2), Some(1));
        assert_eq!(grid.get(6, 4), Some(1));
    }
}
