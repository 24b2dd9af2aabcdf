//! The automaton capability trait and the state every automaton shares.

use crate::error::{Error, Result};
use crate::grid::{CellState, Grid};
use crate::history::{HistorySnapshot, Retention, SnapshotHistory};
use crate::neighborhood::{self, Neighborhood, NeighborhoodKind};
use crate::patterns::PatternParams;
use crate::rules::RuleFile;
use crate::stats::{StatisticsRecord, StatsHistory};
use serde::{Deserialize, Serialize};

/// Descriptive metadata attached to an automaton
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonMetadata {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    /// Valid cell states are `0..num_states`
    pub num_states: u8,
    pub neighborhood: NeighborhoodKind,
    /// Transition depends only on current state and neighbor count
    pub is_totalistic: bool,
    pub supports_mutation: bool,
}

impl AutomatonMetadata {
    pub fn new(name: &str, description: &str, author: &str, num_states: u8, neighborhood: NeighborhoodKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            author: author.to_string(),
            version: "1.0".to_string(),
            num_states,
            neighborhood,
            is_totalistic: false,
            supports_mutation: false,
        }
    }

    pub fn totalistic(mut self) -> Self {
        self.is_totalistic = true;
        self
    }
}

/// How `step()` advances the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMode {
    /// Every cell is recomputed from the previous generation
    WholeGrid,
    /// One new row is written per step; the automaton is exhausted once the
    /// last row is filled
    RowAdvance,
}

/// Everything returned by [`Automaton::state_info`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateInfo {
    pub generation: u64,
    pub width: usize,
    pub height: usize,
    pub metadata: AutomatonMetadata,
    pub statistics: StatisticsRecord,
}

/// Grid, generation counter, metadata, statistics and snapshot history
#[derive(Debug, Clone)]
pub struct AutomatonCore {
    grid: Grid,
    generation: u64,
    metadata: AutomatonMetadata,
    statistics: StatsHistory,
    history: SnapshotHistory,
}

impl AutomatonCore {
    pub fn new(width: usize, height: usize, metadata: AutomatonMetadata) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_parameter(
                "dimensions",
                format!("grid must be at least 1x1, got {}x{}", width, height),
            ));
        }
        if metadata.num_states == 0 {
            return Err(Error::invalid_parameter("num_states", "must be at least 1"));
        }
        Ok(Self {
            grid: Grid::new(width, height),
            generation: 0,
            metadata,
            statistics: StatsHistory::new(),
            history: SnapshotHistory::new(Retention::default()),
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Replace the grid with the next generation and bump the counter
    pub fn advance(&mut self, next: Grid) {
        debug_assert_eq!(next.shape(), self.grid.shape());
        self.grid = next;
        self.generation += 1;
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn bump_generation(&mut self) {
        self.generation += 1;
    }

    pub fn metadata(&self) -> &AutomatonMetadata {
        &self.metadata
    }

    pub fn statistics(&self) -> &StatsHistory {
        &self.statistics
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn set_retention(&mut self, retention: Retention) {
        self.history.set_retention(retention);
    }

    /// Clear the grid, generation, statistics and history
    pub fn reset(&mut self) {
        self.grid.clear();
        self.generation = 0;
        self.statistics.clear();
        self.history.clear();
    }

    /// Quiescent state when out of bounds
    pub fn get_cell(&self, x: usize, y: usize) -> CellState {
        self.grid.get(x, y).unwrap_or(0)
    }

    /// Out-of-bounds coordinates and out-of-range states are ignored
    pub fn set_cell(&mut self, x: usize, y: usize, state: CellState) {
        if state < self.metadata.num_states {
            self.grid.set(x, y, state);
        }
    }

    /// Replace the grid. The generation counter is left alone.
    pub fn import_grid(&mut self, grid: &Grid) -> Result<()> {
        if grid.shape() != self.grid.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.grid.shape(),
                found: grid.shape(),
            });
        }
        grid.validate_states(self.metadata.num_states)?;
        self.grid = grid.clone();
        Ok(())
    }

    pub fn export_grid(&self) -> Grid {
        self.grid.clone()
    }

    /// Compute and store statistics for the current generation
    pub fn compute_statistics(&mut self) -> StatisticsRecord {
        let record = StatisticsRecord::compute(&self.grid, self.generation);
        self.statistics.record(record.clone());
        record
    }

    /// Neighborhood of `(x, y)`; `None` uses the automaton's declared kind
    pub fn get_neighborhood(&self, x: usize, y: usize, kind: Option<NeighborhoodKind>) -> Result<Neighborhood> {
        neighborhood::resolve(&self.grid, x, y, kind.unwrap_or(self.metadata.neighborhood))
    }

    /// Copy the grid into history and return the copy
    pub fn save_snapshot(&mut self) -> HistorySnapshot {
        let snapshot = HistorySnapshot {
            generation: self.generation,
            grid: self.grid.clone(),
        };
        self.history.push(snapshot.clone());
        snapshot
    }
}

/// Capability set implemented by every automaton variant.
///
/// Implementors provide the core accessors, `step` and `initialize_pattern`;
/// everything else delegates to [`AutomatonCore`] and may be overridden when a
/// variant keeps extra state in sync with the grid.
pub trait Automaton: Send {
    fn core(&self) -> &AutomatonCore;

    fn core_mut(&mut self) -> &mut AutomatonCore;

    /// Advance one generation
    fn step(&mut self) -> Result<()>;

    /// Reset, then seed the grid with a named pattern. Unknown names fall
    /// back to the variant's default pattern.
    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()>;

    /// Rule in a short human-readable form, e.g. `B3/S23`
    fn rule_label(&self) -> String;

    fn step_mode(&self) -> StepMode {
        StepMode::WholeGrid
    }

    /// True once further steps cannot change anything
    fn is_exhausted(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        self.core_mut().reset();
    }

    fn import_grid(&mut self, grid: &Grid) -> Result<()> {
        self.core_mut().import_grid(grid)
    }

    /// Load a grid together with its generation, e.g. from a checkpoint
    fn restore(&mut self, grid: &Grid, generation: u64) -> Result<()> {
        self.import_grid(grid)?;
        self.core_mut().set_generation(generation);
        Ok(())
    }

    /// Export the active rule set, for variants with data-driven rules
    fn export_rules(&self) -> Option<RuleFile> {
        None
    }

    /// Replace the active rule set
    fn load_rules(&mut self, _rules: &RuleFile) -> Result<()> {
        Err(Error::UnsupportedRuleType {
            variant: self.metadata().name.clone(),
            rule_type: "rule file".to_string(),
        })
    }

    fn metadata(&self) -> &AutomatonMetadata {
        self.core().metadata()
    }

    fn generation(&self) -> u64 {
        self.core().generation()
    }

    fn width(&self) -> usize {
        self.core().grid().width()
    }

    fn height(&self) -> usize {
        self.core().grid().height()
    }

    fn grid(&self) -> &Grid {
        self.core().grid()
    }

    fn get_cell(&self, x: usize, y: usize) -> CellState {
        self.core().get_cell(x, y)
    }

    fn set_cell(&mut self, x: usize, y: usize, state: CellState) {
        self.core_mut().set_cell(x, y, state);
    }

    fn export_grid(&self) -> Grid {
        self.core().export_grid()
    }

    fn compute_statistics(&mut self) -> StatisticsRecord {
        self.core_mut().compute_statistics()
    }

    fn get_neighborhood(&self, x: usize, y: usize, kind: Option<NeighborhoodKind>) -> Result<Neighborhood> {
        self.core().get_neighborhood(x, y, kind)
    }

    fn save_snapshot(&mut self) -> HistorySnapshot {
        self.core_mut().save_snapshot()
    }

    fn statistics(&self) -> &StatsHistory {
        self.core().statistics()
    }

    fn history(&self) -> &SnapshotHistory {
        self.core().history()
    }

    fn state_info(&mut self) -> StateInfo {
        let statistics = self.compute_statistics();
        let core = self.core();
        StateInfo {
            generation: core.generation(),
            width: core.grid().width(),
            height: core.grid().height(),
            metadata: core.metadata().clone(),
            statistics,
        }
    }

    /// Run `n` steps, stopping at the first error
    fn run(&mut self, n: u64) -> Result<()> {
        for _ in 0..n {
            if self.is_exhausted() {
                break;
            }
            self.step()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> AutomatonCore {
        let metadata = AutomatonMetadata::new("test", "", "", 3, NeighborhoodKind::Moore);
        AutomatonCore::new(4, 3, metadata).unwrap()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let metadata = AutomatonMetadata::new("test", "", "", 2, NeighborhoodKind::Moore);
        assert!(AutomatonCore::new(0, 3, metadata).is_err());
    }

    #[test]
    fn test_set_cell_ignores_invalid() {
        let mut core = core();
        core.set_cell(1, 1, 2);
        core.set_cell(1, 1, 3);
        core.set_cell(9, 9, 1);
        assert_eq!(core.get_cell(1, 1), 2);
        assert_eq!(core.get_cell(9, 9), 0);
        assert_eq!(core.grid().count_active(), 1);
    }

    #[test]
    fn test_import_keeps_generation() {
        let mut core = core();
        core.set_generation(7);

        let mut grid = Grid::new(4, 3);
        grid.set(0, 0, 2);
        core.import_grid(&grid).unwrap();

        assert_eq!(core.generation(), 7);
        assert_eq!(core.export_grid(), grid);
    }

    #[test]
    fn test_import_rejects_shape_and_state() {
        let mut core = core();
        assert!(matches!(
            core.import_grid(&Grid::new(3, 4)),
            Err(Error::ShapeMismatch { expected: (4, 3), found: (3, 4) })
        ));

        let mut grid = Grid::new(4, 3);
        grid.set(2, 1, 3);
        assert!(matches!(core.import_grid(&grid), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_export_is_independent() {
        let mut core = core();
        let exported = core.export_grid();
        core.set_cell(0, 0, 1);
        assert_eq!(exported.get(0, 0), Some(0));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut core = core();
        core.set_cell(0, 0, 1);
        core.advance(core.export_grid());
        core.compute_statistics();
        core.save_snapshot();

        core.reset();
        assert_eq!(core.generation(), 0);
        assert_eq!(core.grid().count_active(), 0);
        assert!(core.statistics().is_empty());
        assert!(core.history().is_empty());
    }

    #[test]
    fn test_default_neighborhood() {
        let core = core();
        assert!(matches!(core.get_neighborhood(0, 0, None), Ok(Neighborhood::Moore(_))));
        assert!(matches!(
            core.get_neighborhood(0, 0, Some(NeighborhoodKind::VonNeumann)),
            Ok(Neighborhood::VonNeumann(_))
        ));
    }
}
