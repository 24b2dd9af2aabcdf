//! Rule families.
//!
//! Every rule here is a pure function of a neighborhood observation and fixed
//! rule parameters. Rules driven by a count over the Moore neighborhood share
//! the [`MooreRule`] trait and are applied by [`apply_moore_rule`], which
//! reads from the current grid and writes into a fresh buffer.

pub mod cyclic;
pub mod elementary;
pub mod file;
pub mod state_machine;
pub mod table;
pub mod totalistic;

pub use cyclic::CyclicRule;
pub use elementary::ElementaryRule;
pub use file::{RuleEntry, RuleFile, RuleKind};
pub use state_machine::{BriansBrainRule, WireWorldRule};
pub use table::RuleTable;
pub use totalistic::{BirthSurvival, TotalisticTable};

use crate::grid::{CellState, Grid};
use crate::neighborhood::MOORE_OFFSETS;

/// What a cell counts among its 8 Moore neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborCount {
    /// Neighbors in exactly this state
    State(CellState),
    /// Neighbors in any non-quiescent state
    Active,
}

impl NeighborCount {
    #[inline]
    fn matches(self, cell: CellState) -> bool {
        match self {
            Self::State(s) => cell == s,
            Self::Active => cell != 0,
        }
    }
}

/// A transition driven by a Moore neighbor count
pub trait MooreRule {
    /// Which neighbors to count for a cell currently in `current`.
    /// `None` means the cell's next state does not depend on its neighbors.
    fn counts(&self, current: CellState) -> Option<NeighborCount>;

    /// Next state from the current state and the neighbor count
    fn next_state(&self, current: CellState, count: u8) -> CellState;
}

/// Apply a Moore-count rule to every cell at once
pub fn apply_moore_rule<R: MooreRule + ?Sized>(grid: &Grid, rule: &R) -> Grid {
    let mut next = grid.clone();
    let (width, height) = grid.shape();

    for y in 0..height {
        for x in 0..width {
            let current = grid.get_wrapped(x as isize, y as isize);
            let count = match rule.counts(current) {
                Some(what) => count_matching(grid, x, y, what),
                None => 0,
            };
            next.set(x, y, rule.next_state(current, count));
        }
    }

    next
}

#[inline]
fn count_matching(grid: &Grid, x: usize, y: usize, what: NeighborCount) -> u8 {
    let (x, y) = (x as isize, y as isize);
    let mut n = 0;
    for &(dx, dy) in &MOORE_OFFSETS {
        if what.matches(grid.get_wrapped(x + dx, y + dy)) {
            n += 1;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every cell becomes its active-neighbor count
    struct CountRule;

    impl MooreRule for CountRule {
        fn counts(&self, _current: CellState) -> Option<NeighborCount> {
            Some(NeighborCount::Active)
        }

        fn next_state(&self, _current: CellState, count: u8) -> CellState {
            count
        }
    }

    #[test]
    fn test_apply_reads_previous_generation() {
        let mut grid = Grid::new(5, 5);
        grid.set(2, 2, 1);
        let next = apply_moore_rule(&grid, &CountRule);

        assert_eq!(next.get(2, 2), Some(0));
        assert_eq!(next.get(1, 1), Some(1));
        assert_eq!(next.get(3, 3), Some(1));
        assert_eq!(next.get(0, 0), Some(0));
    }

    #[test]
    fn test_apply_wraps_edges() {
        let mut grid = Grid::new(4, 4);
        grid.set(0, 0, 1);
        let next = apply_moore_rule(&grid, &CountRule);

        assert_eq!(next.get(3, 3), Some(1));
        assert_eq!(next.get(3, 0), Some(1));
        assert_eq!(next.get(0, 3), Some(1));
        assert_eq!(next.get(2, 2), Some(0));
    }
}
