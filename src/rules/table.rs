//! Exact-match pattern tables.

use crate::error::{Error, Result};
use crate::grid::CellState;
use crate::rules::file::RuleEntry;
use std::collections::HashMap;

/// Pattern table mapping a fixed-arity tuple of states to a result state.
///
/// A lookup miss means "leave the cell unchanged"; a missing entry is never
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable<const N: usize> {
    rules: HashMap<[CellState; N], CellState>,
}

/// How much of the pattern space a table covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub entries: usize,
    pub possible: u64,
}

impl Coverage {
    pub fn percent(&self) -> f64 {
        if self.possible == 0 {
            0.0
        } else {
            self.entries as f64 / self.possible as f64 * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.entries as u64 >= self.possible
    }
}

impl<const N: usize> RuleTable<N> {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Insert or replace a rule
    pub fn add(&mut self, pattern: [CellState; N], result: CellState) {
        self.rules.insert(pattern, result);
    }

    pub fn remove(&mut self, pattern: &[CellState; N]) -> Option<CellState> {
        self.rules.remove(pattern)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    #[inline]
    pub fn get(&self, pattern: &[CellState; N]) -> Option<CellState> {
        self.rules.get(pattern).copied()
    }

    /// Result for `pattern`, or `current` on a miss
    #[inline]
    pub fn apply(&self, pattern: &[CellState; N], current: CellState) -> CellState {
        self.get(pattern).unwrap_or(current)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[CellState; N], &CellState)> {
        self.rules.iter()
    }

    /// Coverage against every pattern over `num_states` states
    pub fn coverage(&self, num_states: u8) -> Coverage {
        let possible = (num_states as u64).checked_pow(N as u32).unwrap_or(u64::MAX);
        Coverage {
            entries: self.rules.len(),
            possible,
        }
    }

    /// Export as rule-file entries, sorted by pattern
    pub fn to_entries(&self) -> Vec<RuleEntry> {
        let mut entries: Vec<RuleEntry> = self
            .rules
            .iter()
            .map(|(pattern, &result)| RuleEntry {
                pattern: pattern.to_vec(),
                result,
            })
            .collect();
        entries.sort_by(|a, b| a.pattern.cmp(&b.pattern));
        entries
    }

    /// Build a table from rule-file entries. Every pattern must have arity `N`.
    pub fn from_entries(entries: &[RuleEntry]) -> Result<Self> {
        let mut table = Self::new();
        for entry in entries {
            let pattern: [CellState; N] = entry.pattern.as_slice().try_into().map_err(|_| {
                Error::RuleParse(format!(
                    "pattern {:?} has {} states, expected {}",
                    entry.pattern,
                    entry.pattern.len(),
                    N
                ))
            })?;
            table.add(pattern, entry.result);
        }
        Ok(table)
    }

    /// Parse a single rule written as `"C,N,E,S,W->R"`
    pub fn parse_rule(text: &str) -> Result<([CellState; N], CellState)> {
        let bad = || Error::RuleParse(format!("invalid table rule: {:?}", text));

        let (pattern_text, result_text) = text.split_once("->").ok_or_else(bad)?;
        let values = pattern_text
            .split(',')
            .map(|v| v.trim().parse::<CellState>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| bad())?;
        let pattern: [CellState; N] = values.as_slice().try_into().map_err(|_| bad())?;
        let result = result_text.trim().parse::<CellState>().map_err(|_| bad())?;

        Ok((pattern, result))
    }
}

impl<const N: usize> FromIterator<([CellState; N], CellState)> for RuleTable<N> {
    fn from_iter<I: IntoIterator<Item = ([CellState; N], CellState)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
