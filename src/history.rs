//! Grid snapshot history with an explicit retention policy.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Immutable copy of a grid at a generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub generation: u64,
    pub grid: Grid,
}

/// How many snapshots to keep
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Keep the newest `n` snapshots, dropping the oldest first
    KeepLast(usize),
    Unbounded,
}

impl Default for Retention {
    fn default() -> Self {
        Self::KeepLast(100)
    }
}

/// Snapshot buffer, oldest first
#[derive(Clone, Debug, Default)]
pub struct SnapshotHistory {
    snapshots: VecDeque<HistorySnapshot>,
    retention: Retention,
}

impl SnapshotHistory {
    pub fn new(retention: Retention) -> Self {
        Self {
            snapshots: VecDeque::new(),
            retention,
        }
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Change the policy; excess snapshots are dropped immediately
    pub fn set_retention(&mut self, retention: Retention) {
        self.retention = retention;
        self.enforce();
    }

    /// Store a snapshot. With `KeepLast(0)` nothing is retained.
    pub fn push(&mut self, snapshot: HistorySnapshot) {
        self.snapshots.push_back(snapshot);
        self.enforce();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&HistorySnapshot> {
        self.snapshots.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot captured at `generation`, if still retained
    pub fn at_generation(&self, generation: u64) -> Option<&HistorySnapshot> {
        self.snapshots.iter().find(|s| s.generation == generation)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    fn enforce(&mut self) {
        if let Retention::KeepLast(n) = self.retention {
            while self.snapshots.len() > n {
                self.snapshots.pop_front();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(generation: u64) -> HistorySnapshot {
        HistorySnapshot {
            generation,
            grid: Grid::new(2, 2),
        }
    }

    #[test]
    fn test_keep_last_drops_oldest() {
        let mut history = SnapshotHistory::new(Retention::KeepLast(3));
        for g in 0..5 {
            history.push(snap(g));
        }

        assert_eq!(history.len(), 3);
        let gens: Vec<u64> = history.iter().map(|s| s.generation).collect();
        assert_eq!(gens, vec![2, 3, 4]);
        assert!(history.at_generation(1).is_none());
    }

    #[test]
    fn test_unbounded() {
        let mut history = SnapshotHistory::new(Retention::Unbounded);
        for g in 0..250 {
            history.push(snap(g));
        }
        assert_eq!(history.len(), 250);

        history.set_retention(Retention::KeepLast(10));
        assert_eq!(history.len(), 10);
        assert_eq!(history.latest().map(|s| s.generation), Some(249));
    }

    #[test]
    fn test_default_retention() {
        assert_eq!(Retention::default(), Retention::KeepLast(100));
    }
}
