//! Threshold-cyclic rule.

use crate::error::{Error, Result};
use crate::grid::CellState;
use crate::rules::{MooreRule, NeighborCount};
use serde::{Deserialize, Serialize};

/// A cell in state `s` advances to `(s + 1) mod num_states` when at least
/// `threshold` of its Moore neighbors already hold that next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclicRule {
    num_states: u8,
    threshold: u8,
}

impl CyclicRule {
    pub fn new(num_states: u8, threshold: u8) -> Result<Self> {
        if num_states < 2 {
            return Err(Error::invalid_parameter("num_states", "must be at least 2"));
        }
        if !(1..=8).contains(&threshold) {
            return Err(Error::invalid_parameter("threshold", "must be between 1 and 8"));
        }
        Ok(Self {
            num_states,
            threshold,
        })
    }

    pub fn num_states(&self) -> u8 {
        self.num_states
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    #[inline]
    pub fn successor(&self, state: CellState) -> CellState {
        ((state as u16 + 1) % self.num_states as u16) as CellState
    }
}

impl MooreRule for CyclicRule {
    fn counts(&self, current: CellState) -> Option<NeighborCount> {
        Some(NeighborCount::State(self.successor(current)))
    }

    #[inline]
    fn next_state(&self, current: CellState, count: u8) -> CellState {
        if count >= self.threshold {
            self.successor(current)
        } else {
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::rules::apply_moore_rule;

    #[test]
    fn test_validation() {
        assert!(CyclicRule::new(1, 3).is_err());
        assert!(CyclicRule::new(4, 0).is_err());
        assert!(CyclicRule::new(4, 9).is_err());
        assert!(CyclicRule::new(4, 8).is_ok());
    }

    #[test]
    fn test_successor_wraps() {
        let rule = CyclicRule::new(3, 1).unwrap();
        assert_eq!(rule.successor(0), 1);
        assert_eq!(rule.successor(2), 0);
    }

    #[test]
    fn test_threshold() {
        let rule = CyclicRule::new(3, 2).unwrap();
        let mut grid = Grid::new(5, 5);
        grid.set(1, 2, 1);
        let next = apply_moore_rule(&grid, &rule);
        // one neighbor in state 1 is not enough
        assert_eq!(next.get(2, 2), Some(0));

        grid.set(3, 2, 1);
        let next = apply_moore_rule(&grid, &rule);
        assert_eq!(next.get(2, 2), Some(1));
        // state 1 cells have no state-2 neighbors
        assert_eq!(next.get(1, 2), Some(1));
    }

    #[test]
    fn test_top_state_consumed_by_zero() {
        let rule = CyclicRule::new(3, 1).unwrap();
        let mut grid = Grid::new(3, 3);
        grid.fill(2);
        grid.set(1, 1, 0);
        let next = apply_moore_rule(&grid, &rule);
        // every 2 sees the 0 and advances; the 0 sees only 2s (needs 1s)
        assert_eq!(next.get(0, 0), Some(0));
        assert_eq!(next.get(1, 1), Some(0));
    }
}
