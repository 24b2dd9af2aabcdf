//! Hand-written per-state transitions.

use crate::grid::CellState;
use crate::rules::{MooreRule, NeighborCount};

/// WireWorld: 0 empty, 1 conductor, 2 electron head, 3 electron tail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireWorldRule;

impl WireWorldRule {
    pub const EMPTY: CellState = 0;
    pub const WIRE: CellState = 1;
    pub const HEAD: CellState = 2;
    pub const TAIL: CellState = 3;
}

impl MooreRule for WireWorldRule {
    fn counts(&self, current: CellState) -> Option<NeighborCount> {
        (current == Self::WIRE).then_some(NeighborCount::State(Self::HEAD))
    }

    fn next_state(&self, current: CellState, heads: u8) -> CellState {
        match current {
            Self::HEAD => Self::TAIL,
            Self::TAIL => Self::WIRE,
            Self::WIRE if heads == 1 || heads == 2 => Self::HEAD,
            other => other,
        }
    }
}

/// Brian's Brain: 0 off, 1 on, 2 dying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BriansBrainRule;

impl BriansBrainRule {
    pub const OFF: CellState = 0;
    pub const ON: CellState = 1;
    pub const DYING: CellState = 2;
}

impl MooreRule for BriansBrainRule {
    fn counts(&self, current: CellState) -> Option<NeighborCount> {
        (current == Self::OFF).then_some(NeighborCount::State(Self::ON))
    }

    fn next_state(&self, current: CellState, on: u8) -> CellState {
        match current {
            Self::OFF if on == 2 => Self::ON,
            Self::OFF => Self::OFF,
            Self::ON => Self::DYING,
            _ => Self::OFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wireworld_transitions() {
        let rule = WireWorldRule;
        assert_eq!(rule.next_state(0, 2), 0);
        assert_eq!(rule.next_state(2, 0), 3);
        assert_eq!(rule.next_state(3, 5), 1);
        assert_eq!(rule.next_state(1, 0), 1);
        assert_eq!(rule.next_state(1, 1), 2);
        assert_eq!(rule.next_state(1, 2), 2);
        assert_eq!(rule.next_state(1, 3), 1);
    }

    #[test]
    fn test_brians_brain_transitions() {
        let rule = BriansBrainRule;
        assert_eq!(rule.next_state(0, 1), 0);
        assert_eq!(rule.next_state(0, 2), 1);
        assert_eq!(rule.next_state(0, 3), 0);
        assert_eq!(rule.next_state(1, 0), 2);
        assert_eq!(rule.next_state(2, 8), 0);
    }

    #[test]
    fn test_only_relevant_states_count() {
        assert_eq!(WireWorldRule.counts(0), None);
        assert_eq!(WireWorldRule.counts(1), Some(NeighborCount::State(2)));
        assert_eq!(BriansBrainRule.counts(1), None);
    }
}
