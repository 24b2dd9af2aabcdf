//! Elementary 1-D automata drawn as a space-time diagram, one row per step.

use crate::automaton::{Automaton, AutomatonCore, AutomatonMetadata, StepMode};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::neighborhood::NeighborhoodKind;
use crate::patterns::{self, PatternInfo, PatternParams};
use crate::rules::{ElementaryRule, RuleFile, RuleTable};

pub const PATTERNS: [&str; 4] = ["single_cell", "random", "alternating", "three_cells"];

pub fn pattern_catalogue() -> Vec<PatternInfo> {
    vec![
        PatternInfo::new("single_cell", "Single cell (classic)", (200, 200)),
        PatternInfo::new("random", "Random initial row", (200, 200)).param("density", 0.5),
        PatternInfo::new("alternating", "Alternating cells", (200, 200)),
        PatternInfo::new("three_cells", "Three cells in center", (200, 200)),
    ]
}

/// Row-advance automaton. Row 0 holds the initial configuration and row
/// `current_row` the most recently computed one.
pub struct ElementaryAutomaton {
    core: AutomatonCore,
    rule: ElementaryRule,
    current_row: usize,
    default_pattern: &'static str,
}

impl ElementaryAutomaton {
    pub fn new(width: usize, height: usize, rule_number: u8) -> Result<Self> {
        let metadata = AutomatonMetadata::new(
            &format!("Elementary CA - Rule {}", rule_number),
            &format!("1D cellular automaton (Rule {})", rule_number),
            "Stephen Wolfram",
            2,
            NeighborhoodKind::Custom,
        );
        Ok(Self {
            core: AutomatonCore::new(width, height, metadata)?,
            rule: ElementaryRule::new(rule_number),
            current_row: 0,
            default_pattern: "single_cell",
        })
    }

    /// Pattern used when `initialize_pattern` gets an unknown name
    pub fn with_default_pattern(mut self, name: &'static str) -> Self {
        if PATTERNS.contains(&name) {
            self.default_pattern = name;
        }
        self
    }

    pub fn rule(&self) -> ElementaryRule {
        self.rule
    }

    pub fn current_row(&self) -> usize {
        self.current_row
    }

    /// In row-advance mode the generation equals the number of rows written
    fn sync_row(&mut self) {
        let last = self.core.grid().height().saturating_sub(1) as u64;
        self.current_row = self.core.generation().min(last) as usize;
    }
}

impl Automaton for ElementaryAutomaton {
    fn core(&self) -> &AutomatonCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AutomatonCore {
        &mut self.core
    }

    fn step_mode(&self) -> StepMode {
        StepMode::RowAdvance
    }

    fn is_exhausted(&self) -> bool {
        self.current_row + 1 >= self.core.grid().height()
    }

    fn step(&mut self) -> Result<()> {
        if self.is_exhausted() {
            return Ok(());
        }

        let next = match self.core.grid().row(self.current_row) {
            Some(row) => self.rule.next_row(row),
            None => return Ok(()),
        };
        self.current_row += 1;
        let y = self.current_row;
        let grid = self.core.grid_mut();
        for (x, state) in next.into_iter().enumerate() {
            grid.set(x, y, state);
        }
        self.core.bump_generation();
        Ok(())
    }

    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()> {
        self.reset();
        let name = if PATTERNS.contains(&name) {
            name
        } else {
            self.default_pattern
        };

        let width = self.core.grid().width();
        let cx = params.x.unwrap_or(width / 2);
        let grid = self.core.grid_mut();
        match name {
            "random" => {
                let mut rng = params.rng();
                patterns::random_fill(grid, &mut rng, (0, 0), (width, 1), params.density_or(0.5), 1);
            }
            "alternating" => {
                for x in (0..width).step_by(2) {
                    grid.set(x, 0, 1);
                }
            }
            "three_cells" => {
                let cx = patterns::signed(cx);
                for x in cx - 1..=cx + 1 {
                    patterns::set_clipped(grid, x, 0, 1);
                }
            }
            _ => {
                grid.set(cx, 0, 1);
            }
        }
        Ok(())
    }

    fn rule_label(&self) -> String {
        format!("Rule {}", self.rule.number())
    }

    fn reset(&mut self) {
        self.core.reset();
        self.current_row = 0;
    }

    fn import_grid(&mut self, grid: &Grid) -> Result<()> {
        self.core.import_grid(grid)?;
        self.sync_row();
        Ok(())
    }

    fn restore(&mut self, grid: &Grid, generation: u64) -> Result<()> {
        self.core.import_grid(grid)?;
        self.core.set_generation(generation);
        self.sync_row();
        Ok(())
    }

    fn export_rules(&self) -> Option<RuleFile> {
        let table: RuleTable<3> = (0..8u8)
            .map(|i| ([i >> 2, (i >> 1) & 1, i & 1], self.rule.table()[i as usize]))
            .collect();
        Some(
            RuleFile::from_table(&table)
                .with_metadata("name", self.core.metadata().name.clone())
                .with_metadata("rule_number", self.rule.number()),
        )
    }

    /// Accepts a complete 8-entry `(left, center, right)` table
    fn load_rules(&mut self, rules: &RuleFile) -> Result<()> {
        let table = rules.to_table::<3>()?;
        let mut number = 0u8;
        for i in 0..8u8 {
            let pattern = [i >> 2, (i >> 1) & 1, i & 1];
            match table.get(&pattern) {
                Some(0) => {}
                Some(1) => number |= 1 << i,
                Some(other) => {
                    return Err(Error::RuleParse(format!(
                        "elementary rules produce 0 or 1, found {}",
                        other
                    )))
                }
                None => {
                    return Err(Error::RuleParse(format!(
                        "elementary rule table is missing pattern {:?}",
                        pattern
                    )))
                }
            }
        }
        self.rule = ElementaryRule::new(number);
        log::info!("elementary automaton switched to rule {}", number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_row_per_step() {
        let mut ca = ElementaryAutomaton::new(11, 4, 90).unwrap();
        ca.initialize_pattern("single_cell", &PatternParams::new()).unwrap();

        ca.step().unwrap();
        assert_eq!(ca.generation(), 1);
        assert_eq!(ca.current_row(), 1);
        assert_eq!(ca.grid().row(1).unwrap()[4], 1);
        assert_eq!(ca.grid().row(1).unwrap()[6], 1);
        assert_eq!(ca.grid().row(2).unwrap().iter().sum::<u8>(), 0);
    }

    #[test]
    fn test_exhausted_steps_are_noops() {
        let mut ca = ElementaryAutomaton::new(8, 3, 30).unwrap();
        ca.initialize_pattern("single_cell", &PatternParams::new()).unwrap();
        ca.step().unwrap();
        ca.step().unwrap();
        assert!(ca.is_exhausted());

        let filled = ca.export_grid();
        ca.step().unwrap();
        assert_eq!(ca.export_grid(), filled);
        assert_eq!(ca.generation(), 2);
    }

    #[test]
    fn test_reset_rewinds_row() {
        let mut ca = ElementaryAutomaton::new(8, 5, 30).unwrap();
        ca.initialize_pattern("three_cells", &PatternParams::new()).unwrap();
        ca.run(3).unwrap();
        ca.reset();
        assert_eq!(ca.current_row(), 0);
        assert_eq!(ca.grid().count_active(), 0);
    }

    #[test]
    fn test_restore_syncs_row() {
        let mut ca = ElementaryAutomaton::new(8, 5, 30).unwrap();
        ca.initialize_pattern("single_cell", &PatternParams::new()).unwrap();
        ca.run(2).unwrap();
        let grid = ca.export_grid();

        let mut other = ElementaryAutomaton::new(8, 5, 30).unwrap();
        other.restore(&grid, 2).unwrap();
        assert_eq!(other.current_row(), 2);
        other.step().unwrap();
        ca.step().unwrap();
        assert_eq!(other.export_grid(), ca.export_grid());
    }

    #[test]
    fn test_rule_file_roundtrip() {
        let ca = ElementaryAutomaton::new(8, 5, 110).unwrap();
        let file = ca.export_rules().unwrap();

        let mut other = ElementaryAutomaton::new(8, 5, 30).unwrap();
        other.load_rules(&file).unwrap();
        assert_eq!(other.rule().number(), 110);
    }

    #[test]
    fn test_alternating() {
        let mut ca = ElementaryAutomaton::new(6, 2, 30).unwrap();
        ca.initialize_pattern("alternating", &PatternParams::new()).unwrap();
        assert_eq!(ca.grid().row(0).unwrap(), &[1, 0, 1, 0, 1, 0]);
    }
}
