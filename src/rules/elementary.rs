//! One-dimensional rule numbers (Wolfram codes).

use crate::grid::CellState;
use serde::{Deserialize, Serialize};

/// An elementary 1-D rule.
///
/// For a (left, center, right) window the new cell is bit
/// `4*left + 2*center + right` of the rule number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementaryRule {
    number: u8,
}

impl ElementaryRule {
    pub const fn new(number: u8) -> Self {
        Self { number }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Next state for a window. Any non-zero input counts as 1.
    #[inline]
    pub fn apply(&self, left: CellState, center: CellState, right: CellState) -> CellState {
        let index = (u8::from(left != 0) << 2) | (u8::from(center != 0) << 1) | u8::from(right != 0);
        (self.number >> index) & 1
    }

    /// Compute the next row from `row`, wrapping at both ends
    pub fn next_row(&self, row: &[CellState]) -> Vec<CellState> {
        let n = row.len();
        (0..n)
            .map(|i| {
                let left = row[(i + n - 1) % n];
                let right = row[(i + 1) % n];
                self.apply(left, row[i], right)
            })
            .collect()
    }

    /// The 8-entry lookup table, indexed by `4*l + 2*c + r`
    pub fn table(&self) -> [CellState; 8] {
        let mut table = [0; 8];
        for (i, out) in table.iter_mut().enumerate() {
            *out = (self.number >> i) & 1;
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_30_table() {
        // 30 = 0b00011110
        assert_eq!(ElementaryRule::new(30).table(), [0, 1, 1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_rule_90_is_xor() {
        let rule = ElementaryRule::new(90);
        for l in 0..2 {
            for c in 0..2 {
                for r in 0..2 {
                    assert_eq!(rule.apply(l, c, r), l ^ r);
                }
            }
        }
    }

    #[test]
    fn test_next_row_wraps() {
        let rule = ElementaryRule::new(90);
        let row = vec![1, 0, 0, 0, 0];
        assert_eq!(rule.next_row(&row), vec![0, 1, 0, 0, 1]);
    }
}
