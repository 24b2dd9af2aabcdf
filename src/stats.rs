//! Per-generation grid statistics.

use crate::grid::{CellState, Grid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Added inside the log to keep `p = 0` terms finite
const ENTROPY_EPSILON: f64 = 1e-10;

/// Statistics snapshot for one generation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    /// Generation the record was computed at
    pub generation: u64,
    /// width * height
    pub total_cells: usize,
    /// Cells in a non-quiescent state
    pub active_cells: usize,
    /// Active cells as a percentage of all cells
    pub density: f64,
    /// Shannon entropy of the state distribution, in bits
    pub entropy: f64,
    /// Count per observed state
    pub state_counts: BTreeMap<CellState, usize>,
    /// Number of distinct observed states
    pub unique_states: usize,
}

impl StatisticsRecord {
    /// Compute statistics for `grid` at `generation`
    pub fn compute(grid: &Grid, generation: u64) -> Self {
        let mut histogram = [0usize; 256];
        for &cell in grid.cells() {
            histogram[cell as usize] += 1;
        }

        let total_cells = grid.len();
        let state_counts: BTreeMap<CellState, usize> = histogram
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(state, &n)| (state as CellState, n))
            .collect();

        let active_cells = total_cells - histogram[0];
        let density = if total_cells == 0 {
            0.0
        } else {
            active_cells as f64 / total_cells as f64 * 100.0
        };

        let entropy = if total_cells == 0 {
            0.0
        } else {
            let total = total_cells as f64;
            let h: f64 = state_counts
                .values()
                .map(|&n| {
                    let p = n as f64 / total;
                    -p * (p + ENTROPY_EPSILON).log2()
                })
                .sum();
            // a single-state grid gives a tiny negative value from epsilon
            h.max(0.0)
        };

        Self {
            generation,
            total_cells,
            active_cells,
            density,
            entropy,
            unique_states: state_counts.len(),
            state_counts,
        }
    }

    /// Count of cells in `state`
    pub fn count(&self, state: CellState) -> usize {
        self.state_counts.get(&state).copied().unwrap_or(0)
    }

    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:6} | Active:{:7} | Density:{:6.2}% | Entropy:{:.3} | States:{}",
            self.generation, self.active_cells, self.density, self.entropy, self.unique_states
        )
    }
}

/// Statistics keyed by generation. Recomputing a generation replaces its record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    records: BTreeMap<u64, StatisticsRecord>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record under its generation
    pub fn record(&mut self, record: StatisticsRecord) {
        self.records.insert(record.generation, record);
    }

    pub fn get(&self, generation: u64) -> Option<&StatisticsRecord> {
        self.records.get(&generation)
    }

    /// Most recent record by generation
    pub fn latest(&self) -> Option<&StatisticsRecord> {
        self.records.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records in generation order
    pub fn iter(&self) -> impl Iterator<Item = &StatisticsRecord> {
        self.records.values()
    }

    /// Density over time
    pub fn density_series(&self) -> Vec<(u64, f64)> {
        self.records
            .values()
            .map(|r| (r.generation, r.density))
            .collect()
    }

    /// Entropy over time
    pub fn entropy_series(&self) -> Vec<(u64, f64)> {
        self.records
            .values()
            .map(|r| (r.generation, r.entropy))
            .collect()
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load history from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_grid_has_zero_entropy() {
        let grid = Grid::new(10, 10);
        let stats = StatisticsRecord::compute(&grid, 0);

        assert_eq!(stats.total_cells, 100);
        assert_eq!(stats.active_cells, 0);
        assert_eq!(stats.density, 0.0);
        assert_eq!(stats.entropy, 0.0);
        assert_eq!(stats.unique_states, 1);
    }

    #[test]
    fn test_half_filled_grid() {
        let mut grid = Grid::new(4, 4);
        for x in 0..4 {
            for y in 0..2 {
                grid.set(x, y, 1);
            }
        }
        let stats = StatisticsRecord::compute(&grid, 3);

        assert_eq!(stats.generation, 3);
        assert_eq!(stats.active_cells, 8);
        assert!((stats.density - 50.0).abs() < 1e-9);
        assert!((stats.entropy - 1.0).abs() < 1e-6);
        assert_eq!(stats.count(0) + stats.count(1), stats.total_cells);
    }

    #[test]
    fn test_history_replaces_same_generation() {
        let mut history = StatsHistory::new();
        let mut grid = Grid::new(2, 2);

        history.record(StatisticsRecord::compute(&grid, 5));
        grid.set(0, 0, 1);
        history.record(StatisticsRecord::compute(&grid, 5));

        assert_eq!(history.len(), 1);
        assert_eq!(history.get(5).map(|r| r.active_cells), Some(1));
    }

    #[test]
    fn test_history_series() {
        let mut history = StatsHistory::new();
        let grid = Grid::new(2, 2);
        for gen in [2, 0, 1] {
            history.record(StatisticsRecord::compute(&grid, gen));
        }

        let series = history.density_series();
        assert_eq!(series.iter().map(|s| s.0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(history.latest().map(|r| r.generation), Some(2));
    }

    #[test]
    fn test_history_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let mut history = StatsHistory::new();
        history.record(StatisticsRecord::compute(&Grid::new(3, 3), 0));
        history.save(&path).unwrap();

        let loaded = StatsHistory::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(0), history.get(0));
    }
}
