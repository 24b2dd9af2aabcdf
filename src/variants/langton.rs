//! Langton's self-replicating loop, driven by a von Neumann rule table.

use crate::automaton::{Automaton, AutomatonCore, AutomatonMetadata};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::neighborhood::{self, NeighborhoodKind};
use crate::patterns::{self, PatternInfo, PatternParams};
use crate::rules::{RuleFile, RuleKind, RuleTable};

pub const NUM_STATES: u8 = 8;
pub const DEFAULT_PATTERN: &str = "basic_loop";

/// Working subset of Langton's transition table, keyed `(C, N, E, S, W)`.
///
/// Patterns missing from the table leave the cell unchanged, so the loop
/// only partially replicates with this set. Load a complete table through
/// a rule file for the full behavior.
const BUILTIN_RULES: [([u8; 5], u8); 63] = [
    // sheath formation
    ([0, 1, 1, 1, 0], 1),
    ([0, 1, 1, 0, 1], 1),
    ([0, 1, 0, 1, 1], 1),
    ([0, 0, 1, 1, 1], 1),
    ([0, 2, 1, 0, 0], 1),
    ([0, 0, 2, 1, 0], 1),
    ([0, 0, 0, 2, 1], 1),
    ([0, 1, 0, 0, 2], 1),
    // sheath
    ([1, 1, 1, 0, 0], 1),
    ([1, 1, 0, 1, 0], 1),
    ([1, 1, 0, 0, 1], 1),
    ([1, 0, 1, 1, 0], 1),
    ([1, 0, 1, 0, 1], 1),
    ([1, 0, 0, 1, 1], 1),
    // core signal
    ([2, 2, 0, 0, 0], 2),
    ([2, 0, 2, 0, 0], 2),
    ([2, 0, 0, 2, 0], 2),
    ([2, 0, 0, 0, 2], 2),
    ([2, 1, 1, 0, 0], 2),
    ([2, 1, 0, 1, 0], 2),
    ([2, 1, 0, 0, 1], 2),
    ([2, 0, 1, 1, 0], 2),
    ([2, 0, 1, 0, 1], 2),
    ([2, 0, 0, 1, 1], 2),
    ([2, 1, 2, 0, 0], 2),
    ([2, 2, 1, 0, 0], 2),
    // construction arm
    ([3, 1, 0, 0, 0], 1),
    ([3, 0, 1, 0, 0], 1),
    ([3, 0, 0, 1, 0], 1),
    ([3, 0, 0, 0, 1], 1),
    ([0, 3, 1, 0, 0], 3),
    ([0, 0, 3, 1, 0], 3),
    ([0, 0, 0, 3, 1], 3),
    ([0, 1, 0, 0, 3], 3),
    // arm extension
    ([4, 0, 0, 0, 0], 0),
    ([4, 1, 0, 0, 0], 4),
    ([4, 0, 1, 0, 0], 4),
    ([4, 0, 0, 1, 0], 4),
    ([4, 0, 0, 0, 1], 4),
    ([0, 4, 0, 0, 0], 4),
    ([0, 0, 4, 0, 0], 4),
    ([0, 0, 0, 4, 0], 4),
    ([0, 0, 0, 0, 4], 4),
    // turn signals
    ([5, 0, 0, 0, 0], 0),
    ([5, 1, 0, 0, 0], 5),
    ([5, 0, 1, 0, 0], 5),
    ([0, 5, 0, 0, 0], 5),
    ([0, 0, 5, 0, 0], 5),
    // construction states 6 and 7
    ([6, 0, 0, 0, 0], 0),
    ([6, 1, 0, 0, 0], 6),
    ([0, 6, 0, 0, 0], 6),
    ([0, 0, 6, 0, 0], 6),
    ([7, 0, 0, 0, 0], 0),
    ([7, 1, 0, 0, 0], 7),
    ([0, 7, 0, 0, 0], 7),
    // loop closure
    ([1, 2, 0, 0, 0], 1),
    ([1, 0, 2, 0, 0], 1),
    ([1, 0, 0, 2, 0], 1),
    ([1, 0, 0, 0, 2], 1),
    ([2, 3, 0, 0, 0], 2),
    ([2, 0, 3, 0, 0], 2),
    ([3, 2, 0, 0, 0], 3),
    ([3, 0, 2, 0, 0], 3),
];

const BASIC_LOOP: [[u8; 9]; 9] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 2, 2, 2, 2, 2, 0, 1],
    [1, 0, 2, 0, 0, 0, 2, 0, 1],
    [1, 0, 2, 0, 0, 0, 2, 0, 1],
    [1, 0, 2, 2, 2, 2, 2, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 3, 1, 1, 1, 1],
    [0, 0, 0, 0, 4, 0, 0, 0, 0],
];

pub fn builtin_rules() -> RuleTable<5> {
    BUILTIN_RULES.iter().copied().collect()
}

pub fn pattern_catalogue() -> Vec<PatternInfo> {
    vec![
        PatternInfo::new("basic_loop", "Basic 9x9 loop", (9, 9)),
        PatternInfo::new("extended_loop", "Loop with construction arm", (9, 14)),
    ]
}

pub fn colormap() -> Vec<String> {
    [
        "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

pub fn metadata() -> AutomatonMetadata {
    AutomatonMetadata::new(
        "Langton's Loop",
        "Self-replicating loop driven by a rule table",
        "Chris Langton",
        NUM_STATES,
        NeighborhoodKind::VonNeumann,
    )
}

pub struct LangtonLoop {
    core: AutomatonCore,
    rules: RuleTable<5>,
}

impl LangtonLoop {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_rules(width, height, builtin_rules())
    }

    pub fn with_rules(width: usize, height: usize, rules: RuleTable<5>) -> Result<Self> {
        let mut automaton = Self {
            core: AutomatonCore::new(width, height, metadata())?,
            rules: RuleTable::new(),
        };
        automaton.set_rules(rules)?;
        Ok(automaton)
    }

    pub fn rules(&self) -> &RuleTable<5> {
        &self.rules
    }

    fn set_rules(&mut self, rules: RuleTable<5>) -> Result<()> {
        for (pattern, &result) in rules.iter() {
            if let Some(&bad) = pattern.iter().chain(std::iter::once(&result)).find(|&&s| s >= NUM_STATES) {
                return Err(Error::RuleParse(format!(
                    "rule {:?} -> {} uses state {} outside 0..{}",
                    pattern, result, bad, NUM_STATES
                )));
            }
        }
        let coverage = rules.coverage(NUM_STATES);
        log::info!(
            "Langton's loop: {} rules loaded ({:.3}% of {} patterns)",
            coverage.entries,
            coverage.percent(),
            coverage.possible
        );
        self.rules = rules;
        Ok(())
    }
}

impl Automaton for LangtonLoop {
    fn core(&self) -> &AutomatonCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AutomatonCore {
        &mut self.core
    }

    fn step(&mut self) -> Result<()> {
        let grid = self.core.grid();
        let (w, h) = grid.shape();
        let mut next = Grid::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let view = neighborhood::von_neumann(grid, x, y);
                next.set(x, y, self.rules.apply(&view.as_key(), view.center));
            }
        }
        self.core.advance(next);
        Ok(())
    }

    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()> {
        self.core.reset();
        let (w, h) = self.core.grid().shape();
        let (x, y) = params.anchor_or(w / 4, h / 4);
        let (x, y) = (patterns::signed(x), patterns::signed(y));
        let grid = self.core.grid_mut();

        patterns::stamp(grid, x, y, &BASIC_LOOP);
        if name == "extended_loop" {
            for i in 0..5 {
                patterns::set_clipped(grid, x + 4, y + 8 + i, 4);
            }
        }
        Ok(())
    }

    fn rule_label(&self) -> String {
        format!("Langton table ({} rules)", self.rules.len())
    }

    fn export_rules(&self) -> Option<RuleFile> {
        Some(
            RuleFile::from_table(&self.rules)
                .with_metadata("name", "Langton's Loop")
                .with_metadata("neighborhood", "von_neumann")
                .with_metadata("key_order", "C,N,E,S,W"),
        )
    }

    fn load_rules(&mut self, rules: &RuleFile) -> Result<()> {
        if rules.kind()? != RuleKind::Table {
            return Err(Error::UnsupportedRuleType {
                variant: self.metadata().name.clone(),
                rule_type: "totalistic".to_string(),
            });
        }
        self.set_rules(rules.to_table::<5>()?)
    }
}
