//! Von Neumann's 29-state universal constructor.
//!
//! Both flavors look up `(C, N, E, S, W)` in a rule table. Unlike Langton's
//! loop, a lookup miss is not a no-op: each flavor decays some states toward
//! ground on a miss.

use crate::automaton::{Automaton, AutomatonCore, AutomatonMetadata};
use crate::error::{Error, Result};
use crate::grid::{CellState, Grid};
use crate::neighborhood::{self, NeighborhoodKind};
use crate::patterns::{self, PatternInfo, PatternParams};
use crate::rules::{RuleFile, RuleKind, RuleTable};

pub const NUM_STATES: u8 = 29;

const GROUND: u8 = 0;

// simplified flavor
const TRANSMISSION: u8 = 1;
const SIGNAL: u8 = 4;
const CONSTRUCTION: u8 = 5;
const CONFLUENT: u8 = 6;

// full flavor
const OT_NORTH: u8 = 1;
const OT_EAST: u8 = 2;
const OT_SOUTH: u8 = 3;
const OT_WEST: u8 = 4;
const SENS_NORTH: u8 = 5;
const SENS_EAST: u8 = 6;
const SENS_SOUTH: u8 = 7;
const SENS_WEST: u8 = 8;
const CONF_00: u8 = 9;
const CONF_01: u8 = 10;
const CONF_10: u8 = 11;
const CONF_11: u8 = 12;
const OC: u8 = 13;
const OD: u8 = 14;
const ST_FIRST: u8 = 15;
const SS_FIRST: u8 = 20;
const RED_01: u8 = 25;
const RED_10: u8 = 26;
const BLUE_01: u8 = 27;
const BLUE_10: u8 = 28;

const REPRODUCER: [[u8; 3]; 3] = [
    [0, CONSTRUCTION, 0],
    [TRANSMISSION, CONFLUENT, TRANSMISSION],
    [0, CONSTRUCTION, 0],
];

/// Keys with `neighbor` in exactly one of the four directions, N E S W
fn one_neighbor(center: CellState, neighbor: CellState) -> [[CellState; 5]; 4] {
    [
        [center, neighbor, 0, 0, 0],
        [center, 0, neighbor, 0, 0],
        [center, 0, 0, neighbor, 0],
        [center, 0, 0, 0, neighbor],
    ]
}

fn simplified_rules() -> RuleTable<5> {
    let mut rules = RuleTable::new();
    rules.add([GROUND; 5], GROUND);

    // a transmission cell carries the summed signal, capped at 4
    for n in 0..=4u8 {
        for e in 0..=4u8 {
            for s in 0..=4u8 {
                for w in 0..=4u8 {
                    let sum = n + e + s + w;
                    if sum > 0 {
                        rules.add([TRANSMISSION, n, e, s, w], sum.min(SIGNAL));
                    }
                }
            }
        }
    }

    for key in one_neighbor(GROUND, CONSTRUCTION) {
        rules.add(key, TRANSMISSION);
    }

    for n in 1..=4u8 {
        for e in 1..=4u8 {
            rules.add([CONFLUENT, n, e, 0, 0], SIGNAL);
        }
    }
    rules
}

fn full_rules() -> RuleTable<5> {
    let mut rules = RuleTable::new();
    rules.add([GROUND; 5], GROUND);

    // arrows grow and hold along their direction; later groups win on overlap
    for a in 0..NUM_STATES {
        for b in 0..NUM_STATES {
            rules.add([GROUND, OT_NORTH, a, 0, b], OT_NORTH);
            rules.add([OT_NORTH, OT_NORTH, a, 0, b], OT_NORTH);
        }
    }
    for a in 0..NUM_STATES {
        for b in 0..NUM_STATES {
            rules.add([GROUND, a, 0, b, OT_EAST], OT_EAST);
            rules.add([OT_EAST, a, 0, b, OT_EAST], OT_EAST);
        }
    }
    for a in 0..NUM_STATES {
        for b in 0..NUM_STATES {
            rules.add([GROUND, 0, a, OT_SOUTH, b], OT_SOUTH);
            rules.add([OT_SOUTH, 0, a, OT_SOUTH, b], OT_SOUTH);
        }
    }
    for a in 0..NUM_STATES {
        for b in 0..NUM_STATES {
            rules.add([GROUND, a, OT_WEST, b, 0], OT_WEST);
            rules.add([OT_WEST, a, OT_WEST, b, 0], OT_WEST);
        }
    }
    rules.add([OT_NORTH, 0, 0, OT_NORTH, 0], OT_NORTH);
    rules.add([OT_EAST, 0, 0, 0, OT_EAST], OT_EAST);
    rules.add([OT_SOUTH, OT_SOUTH, 0, 0, 0], OT_SOUTH);
    rules.add([OT_WEST, 0, OT_WEST, 0, 0], OT_WEST);

    // confluent cells merge a vertical and a horizontal arrow
    for ns in [OT_NORTH, OT_SOUTH] {
        for ew in [OT_EAST, OT_WEST] {
            rules.add([CONF_00, ns, ew, 0, 0], OT_NORTH);
            rules.add([CONF_00, 0, ew, ns, 0], OT_NORTH);
            rules.add([CONF_00, ns, 0, 0, ew], OT_NORTH);
            rules.add([CONF_00, 0, 0, ns, ew], OT_NORTH);
        }
    }
    rules.add([CONF_01, OT_NORTH, OT_EAST, 0, 0], OT_EAST);
    rules.add([CONF_10, 0, OT_EAST, OT_SOUTH, 0], OT_SOUTH);
    rules.add([CONF_11, 0, 0, OT_SOUTH, OT_WEST], OT_WEST);

    // construction lays an arrow pointing away from the constructor
    for (key, arrow) in one_neighbor(GROUND, OC)
        .into_iter()
        .zip([OT_NORTH, OT_EAST, OT_SOUTH, OT_WEST])
    {
        rules.add(key, arrow);
    }
    for signal in OT_NORTH..=OT_WEST {
        for key in one_neighbor(OC, signal) {
            rules.add(key, OC);
        }
    }

    for state in 1..NUM_STATES {
        for key in one_neighbor(state, OD) {
            rules.add(key, GROUND);
        }
    }

    for excite in OT_NORTH..=OT_WEST {
        for key in one_neighbor(SENS_NORTH, excite) {
            rules.add(key, OT_NORTH);
        }
    }
    for excite in OT_NORTH..=OT_WEST {
        rules.add([SENS_EAST, excite, 0, 0, 0], OT_EAST);
        rules.add([SENS_SOUTH, excite, 0, 0, 0], OT_SOUTH);
        rules.add([SENS_WEST, excite, 0, 0, 0], OT_WEST);
    }

    for st in ST_FIRST..SS_FIRST {
        for n in 0..NUM_STATES {
            rules.add([st, n, 0, 0, 0], st);
        }
    }
    for ss in SS_FIRST..RED_01 {
        for excite in OT_NORTH..=OT_WEST {
            rules.add([ss, excite, 0, 0, 0], ST_FIRST + (ss - SS_FIRST));
        }
    }

    rules.add([RED_01, OT_NORTH, 0, 0, 0], RED_10);
    rules.add([RED_10, OT_EAST, 0, 0, 0], BLUE_01);
    rules.add([BLUE_01, OT_SOUTH, 0, 0, 0], BLUE_10);
    rules.add([BLUE_10, OT_WEST, 0, 0, 0], RED_01);
    rules
}

/// Which constructor rule set this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorFlavor {
    /// Transmission, construction and confluent subsets only
    Simplified,
    /// Directional transmission plus destruction, sensitized, special and
    /// extended states
    Full,
}

impl ConstructorFlavor {
    pub fn builtin_rules(self) -> RuleTable<5> {
        match self {
            Self::Simplified => simplified_rules(),
            Self::Full => full_rules(),
        }
    }

    /// Next state of a cell whose neighborhood has no table entry
    pub fn on_miss(self, center: CellState) -> CellState {
        match self {
            Self::Simplified if center > CONSTRUCTION => center - 1,
            Self::Full if (OT_NORTH..=OD).contains(&center) => center - 1,
            _ => center,
        }
    }

    pub fn metadata(self) -> AutomatonMetadata {
        let (name, description) = match self {
            Self::Simplified => (
                "Von Neumann Universal Constructor",
                "The original self-replicating automaton (29 states)",
            ),
            Self::Full => (
                "Von Neumann Universal Constructor (Complete)",
                "Full 29-state self-replicating automaton",
            ),
        };
        AutomatonMetadata::new(name, description, "John von Neumann", NUM_STATES, NeighborhoodKind::VonNeumann)
    }

    pub fn default_pattern(self) -> &'static str {
        match self {
            Self::Simplified => "simple_reproducer",
            Self::Full => "transmission_demo",
        }
    }

    pub fn patterns(self) -> Vec<PatternInfo> {
        match self {
            Self::Simplified => vec![
                PatternInfo::new("simple_reproducer", "Simple self-replicating pattern", (150, 150)),
                PatternInfo::new("signal_line", "Signal transmission demonstration", (150, 150)),
                PatternInfo::new("constructor_arm", "Construction arm pattern", (150, 150)),
            ],
            Self::Full => vec![
                PatternInfo::new("transmission_demo", "Signal transmission demonstration", (150, 150)),
                PatternInfo::new("signal_wire", "Transmission wires with sensitized cells", (150, 150)),
                PatternInfo::new("constructor_arm", "Construction arm with OC states", (150, 150)),
                PatternInfo::new("replicator_seed", "Seed for self-replication (complex)", (200, 200)),
            ],
        }
    }

    pub fn colormap(self) -> Vec<String> {
        let colors: [&str; 29] = match self {
            Self::Simplified => [
                "#000000", "#00FF00", "#00DD00", "#00BB00", "#00FF00", "#FF0000", "#FF00FF", "#FFFF00",
                "#00FFFF", "#FF8800", "#8800FF", "#FF0088", "#00FF88", "#888800", "#FF8888", "#88FF88",
                "#8888FF", "#FFFF88", "#FF88FF", "#88FFFF", "#FF8800", "#8800FF", "#FF0088", "#00FF88",
                "#888800", "#FF8888", "#88FF88", "#8888FF", "#FFFF88",
            ],
            Self::Full => [
                "#000000", "#00FF00", "#00DD00", "#00BB00", "#009900", "#FFFF00", "#DDDD00", "#BBBB00",
                "#999900", "#FF00FF", "#DD00DD", "#BB00BB", "#990099", "#FF0000", "#DD0000", "#00FFFF",
                "#00DDDD", "#00BBBB", "#009999", "#007777", "#FFA500", "#DD8800", "#BB6600", "#994400",
                "#772200", "#8888FF", "#6666DD", "#FF88FF", "#DD66DD",
            ],
        };
        colors.iter().map(|c| c.to_string()).collect()
    }
}

/// Set `origin + offset`, dropping cells outside the grid
fn put(grid: &mut Grid, (x, y): (isize, isize), (dx, dy): (isize, isize), state: CellState) {
    patterns::set_clipped(grid, x.saturating_add(dx), y.saturating_add(dy), state);
}

pub struct VonNeumannConstructor {
    core: AutomatonCore,
    flavor: ConstructorFlavor,
    rules: RuleTable<5>,
}

impl VonNeumannConstructor {
    pub fn new(width: usize, height: usize, flavor: ConstructorFlavor) -> Result<Self> {
        Self::with_rules(width, height, flavor, flavor.builtin_rules())
    }

    pub fn with_rules(width: usize, height: usize, flavor: ConstructorFlavor, rules: RuleTable<5>) -> Result<Self> {
        let mut automaton = Self {
            core: AutomatonCore::new(width, height, flavor.metadata())?,
            flavor,
            rules: RuleTable::new(),
        };
        automaton.set_rules(rules)?;
        Ok(automaton)
    }

    pub fn flavor(&self) -> ConstructorFlavor {
        self.flavor
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
            "{}: {} rules loaded ({:.4}% of {} patterns)",
            self.core.metadata().name,
            coverage.entries,
            coverage.percent(),
            coverage.possible
        );
        self.rules = rules;
        Ok(())
    }

    fn place_simplified(grid: &mut Grid, name: &str, params: &PatternParams, (w, h): (usize, usize)) {
        match name {
            "signal_line" => {
                let (x, y) = params.anchor_or(w / 4, h / 2);
                let origin = (patterns::signed(x), patterns::signed(y));
                for i in 0..30 {
                    put(grid, origin, (i, 0), TRANSMISSION);
                }
                put(grid, origin, (0, 0), SIGNAL);
                for i in 0..20 {
                    put(grid, origin, (15, i), TRANSMISSION);
                }
            }
            "constructor_arm" => {
                let (x, y) = params.anchor_or(w / 4, h / 2);
                let origin = (patterns::signed(x), patterns::signed(y));
                for i in 0..10 {
                    put(grid, origin, (i, 0), CONSTRUCTION);
                    put(grid, origin, (i, 1), TRANSMISSION);
                    put(grid, origin, (i, -1), TRANSMISSION);
                }
            }
            _ => {
                let (x, y) = params.anchor_or(w / 2, h / 2);
                patterns::stamp(grid, patterns::signed(x) - 1, patterns::signed(y) - 1, &REPRODUCER);
            }
        }
    }

    fn place_full(grid: &mut Grid, name: &str, params: &PatternParams, (w, h): (usize, usize)) {
        match name {
            "signal_wire" => {
                let (x, y) = params.anchor_or(w / 4, h / 2);
                let origin = (patterns::signed(x), patterns::signed(y));
                for i in 0..40 {
                    put(grid, origin, (i, 0), OT_EAST);
                }
                for i in (5..35).step_by(5) {
                    put(grid, origin, (i, -2), SENS_NORTH);
                    put(grid, origin, (i, 2), SENS_SOUTH);
                }
            }
            "constructor_arm" => {
                let (x, y) = params.anchor_or(w / 4, h / 2);
                let origin = (patterns::signed(x), patterns::signed(y));
                for i in 0..15 {
                    put(grid, origin, (i, 0), OC);
                    put(grid, origin, (i, 1), OT_EAST);
                    put(grid, origin, (i, -1), OT_EAST);
                }
                put(grid, origin, (0, 0), CONF_00);
                put(grid, origin, (14, 0), CONF_00);
            }
            "replicator_seed" => {
                let (x, y) = params.anchor_or(w / 3, h / 3);
                let origin = (patterns::signed(x), patterns::signed(y));
                for dy in -2isize..=2 {
                    for dx in -2isize..=2 {
                        if dx.abs() + dy.abs() <= 2 {
                            put(grid, origin, (dx, dy), CONF_00);
                        }
                    }
                }
                for i in 0..5 {
                    put(grid, origin, (0, -3 - i), OC);
                    put(grid, origin, (3 + i, 0), OC);
                }
                for i in 0..10 {
                    put(grid, origin, (i, 0), OT_EAST);
                    put(grid, origin, (0, i), OT_SOUTH);
                }
            }
            _ => {
                let (x, y) = params.anchor_or(w / 4, h / 2);
                let origin = (patterns::signed(x), patterns::signed(y));
                for i in 0..30 {
                    put(grid, origin, (i, 0), OT_EAST);
                }
                for i in 0..20 {
                    put(grid, origin, (15, i), OT_NORTH);
                }
                put(grid, origin, (15, 15), CONF_00);
            }
        }
    }
}

impl Automaton for VonNeumannConstructor {
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
                let state = match self.rules.get(&view.as_key()) {
                    Some(state) => state,
                    None => self.flavor.on_miss(view.center),
                };
                next.set(x, y, state);
            }
        }
        self.core.advance(next);
        Ok(())
    }

    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()> {
        self.core.reset();
        let shape = self.core.grid().shape();
        let flavor = self.flavor;
        let grid = self.core.grid_mut();
        match flavor {
            ConstructorFlavor::Simplified => Self::place_simplified(grid, name, params, shape),
            ConstructorFlavor::Full => Self::place_full(grid, name, params, shape),
        }
        Ok(())
    }

    fn rule_label(&self) -> String {
        format!("von Neumann table ({} rules)", self.rules.len())
    }

    fn export_rules(&self) -> Option<RuleFile> {
        Some(
            RuleFile::from_table(&self.rules)
                .with_metadata("name", self.core.metadata().name.as_str())
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
