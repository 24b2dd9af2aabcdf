//! Birth/survival (B/S) notation and totalistic transition tables.

use crate::error::{Error, Result};
use crate::grid::CellState;
use crate::rules::{MooreRule, NeighborCount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Largest Moore neighbor count
pub const MAX_NEIGHBORS: u8 = 8;

/// Life-like rule in B/S notation, e.g. `B3/S23`.
///
/// Index `n` of `birth` is true when a dead cell with `n` live neighbors is
/// born; `survive` works the same for live cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BirthSurvival {
    birth: [bool; 9],
    survive: [bool; 9],
}

impl BirthSurvival {
    /// Conway's Game of Life (B3/S23)
    pub const CONWAY: Self = Self::from_masks(0b0000_1000, 0b0000_1100);

    const fn from_masks(birth: u16, survive: u16) -> Self {
        let mut b = [false; 9];
        let mut s = [false; 9];
        let mut i = 0;
        while i < 9 {
            b[i] = birth & (1 << i) != 0;
            s[i] = survive & (1 << i) != 0;
            i += 1;
        }
        Self { birth: b, survive: s }
    }

    /// Build from explicit neighbor counts
    pub fn new(birth: &[u8], survive: &[u8]) -> Result<Self> {
        let mut rule = Self {
            birth: [false; 9],
            survive: [false; 9],
        };
        for &n in birth {
            rule.birth[checked_count(n)?] = true;
        }
        for &n in survive {
            rule.survive[checked_count(n)?] = true;
        }
        Ok(rule)
    }

    /// Parse `B<digits>/S<digits>`. Either digit list may be empty.
    pub fn parse(text: &str) -> Result<Self> {
        let bad = |why: &str| Error::RuleParse(format!("{:?}: {}", text, why));

        let (b_part, s_part) = text
            .trim()
            .split_once('/')
            .ok_or_else(|| bad("expected B<digits>/S<digits>"))?;
        let b_digits = strip_prefix_ci(b_part.trim(), 'b').ok_or_else(|| bad("missing B"))?;
        let s_digits = strip_prefix_ci(s_part.trim(), 's').ok_or_else(|| bad("missing S"))?;

        let birth = parse_digits(b_digits).ok_or_else(|| bad("birth counts must be digits 0-8"))?;
        let survive =
            parse_digits(s_digits).ok_or_else(|| bad("survival counts must be digits 0-8"))?;

        Self::new(&birth, &survive)
    }

    #[inline]
    pub fn born(&self, count: u8) -> bool {
        self.birth.get(count as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn survives(&self, count: u8) -> bool {
        self.survive.get(count as usize).copied().unwrap_or(false)
    }

    pub fn birth_counts(&self) -> Vec<u8> {
        counts_of(&self.birth)
    }

    pub fn survival_counts(&self) -> Vec<u8> {
        counts_of(&self.survive)
    }

    /// Expand into a full table over `num_states x [0, 8]`
    pub fn to_table(&self, num_states: u8) -> TotalisticTable {
        let mut table = TotalisticTable::new();
        for state in 0..num_states {
            for count in 0..=MAX_NEIGHBORS {
                let alive = if state == 0 {
                    self.born(count)
                } else {
                    self.survives(count)
                };
                table.insert(state, count, u8::from(alive));
            }
        }
        table
    }
}

impl Default for BirthSurvival {
    fn default() -> Self {
        Self::CONWAY
    }
}

impl FromStr for BirthSurvival {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BirthSurvival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for n in self.birth_counts() {
            write!(f, "{}", n)?;
        }
        write!(f, "/S")?;
        for n in self.survival_counts() {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

impl MooreRule for BirthSurvival {
    fn counts(&self, _current: CellState) -> Option<NeighborCount> {
        Some(NeighborCount::Active)
    }

    #[inline]
    fn next_state(&self, current: CellState, count: u8) -> CellState {
        let alive = if current == 0 {
            self.born(count)
        } else {
            self.survives(count)
        };
        u8::from(alive)
    }
}

fn checked_count(n: u8) -> Result<usize> {
    if n > MAX_NEIGHBORS {
        Err(Error::RuleParse(format!(
            "neighbor count {} out of range 0-{}",
            n, MAX_NEIGHBORS
        )))
    } else {
        Ok(n as usize)
    }
}

fn strip_prefix_ci(s: &str, prefix: char) -> Option<&str> {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.eq_ignore_ascii_case(&prefix) => Some(chars.as_str()),
        _ => None,
    }
}

fn parse_digits(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| c.to_digit(10).filter(|&d| d <= MAX_NEIGHBORS as u32).map(|d| d as u8))
        .collect()
}

fn counts_of(flags: &[bool; 9]) -> Vec<u8> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, &on)| on)
        .map(|(n, _)| n as u8)
        .collect()
}

/// Transition table keyed by `(current_state, active_neighbor_count)`.
///
/// A missing key leaves the cell unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TotalisticTable {
    rules: BTreeMap<(CellState, u8), CellState>,
}

impl TotalisticTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: CellState, count: u8, result: CellState) {
        self.rules.insert((state, count), result);
    }

    #[inline]
    pub fn get(&self, state: CellState, count: u8) -> Option<CellState> {
        self.rules.get(&(state, count)).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(CellState, u8), &CellState)> {
        self.rules.iter()
    }

    /// Largest state referenced as a key or result
    pub fn max_state(&self) -> CellState {
        self.rules
            .iter()
            .map(|(&(s, _), &r)| s.max(r))
            .max()
            .unwrap_or(0)
    }
}

impl FromIterator<((CellState, u8), CellState)> for TotalisticTable {
    fn from_iter<I: IntoIterator<Item = ((CellState, u8), CellState)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl MooreRule for TotalisticTable {
    fn counts(&self, _current: CellState) -> Option<NeighborCount> {
        Some(NeighborCount::Active)
    }

    #[inline]
    fn next_state(&self, current: CellState, count: u8) -> CellState {
        self.get(current, count).unwrap_or(current)
    }
}
