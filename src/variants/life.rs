//! Two-state life-like automata driven by a B/S rule.

use crate::automaton::{Automaton, AutomatonCore, AutomatonMetadata};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::neighborhood::NeighborhoodKind;
use crate::patterns::{self, PatternInfo, PatternParams};
use crate::rules::{apply_moore_rule, BirthSurvival, RuleFile, RuleKind, TotalisticTable};
use rand::Rng;

const GLIDER: [[u8; 3]; 3] = [[0, 1, 0], [0, 0, 1], [1, 1, 1]];

const GOSPER_GUN: [[u8; 36]; 9] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1, 1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
];

const PULSAR: [[u8; 13]; 13] = [
    [0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
    [0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
    [1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
];

const PENTADECATHLON: [[u8; 10]; 3] = [
    [0, 0, 1, 0, 0, 0, 0, 1, 0, 0],
    [1, 1, 0, 1, 1, 1, 1, 0, 1, 1],
    [0, 0, 1, 0, 0, 0, 0, 1, 0, 0],
];

const LWSS: [[u8; 5]; 4] = [[0, 1, 0, 0, 1], [1, 0, 0, 0, 0], [1, 0, 0, 0, 1], [1, 1, 1, 1, 0]];

const R_PENTOMINO: [[u8; 3]; 3] = [[0, 1, 1], [1, 1, 0], [0, 1, 0]];

const DIEHARD: [[u8; 8]; 3] = [
    [0, 0, 0, 0, 0, 0, 1, 0],
    [1, 1, 0, 0, 0, 0, 0, 0],
    [0, 1, 0, 0, 0, 1, 1, 1],
];

const ACORN: [[u8; 7]; 3] = [[0, 1, 0, 0, 0, 0, 0], [0, 0, 0, 1, 0, 0, 0], [1, 1, 0, 0, 1, 1, 1]];

const REPLICATOR: [[u8; 5]; 5] = [
    [0, 0, 1, 1, 1],
    [0, 1, 0, 0, 1],
    [1, 0, 0, 0, 0],
    [1, 0, 0, 1, 0],
    [1, 1, 1, 0, 0],
];

/// Which life-like automaton this is. Decides the default rule, the
/// pattern catalogue and the colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeFlavor {
    Conway,
    HighLife,
    DayAndNight,
    Seeds,
    /// Any B/S rule supplied by the caller
    Custom,
}

impl LifeFlavor {
    pub fn default_rule(self) -> BirthSurvival {
        let text = match self {
            Self::Conway | Self::Custom => "B3/S23",
            Self::HighLife => "B36/S23",
            Self::DayAndNight => "B3678/S34678",
            Self::Seeds => "B2/S",
        };
        BirthSurvival::parse(text).unwrap_or(BirthSurvival::CONWAY)
    }

    pub fn metadata(self, rule: &BirthSurvival) -> AutomatonMetadata {
        let (name, description, author) = match self {
            Self::Conway => (
                "Conway's Game of Life".to_string(),
                "The classic cellular automaton (B3/S23)".to_string(),
                "John Conway",
            ),
            Self::HighLife => (
                "HighLife".to_string(),
                "Life variant with replicators (B36/S23)".to_string(),
                "Nathan Thompson",
            ),
            Self::DayAndNight => (
                "Day and Night".to_string(),
                "Symmetric Life variant (B3678/S34678)".to_string(),
                "Nathan Thompson",
            ),
            Self::Seeds => (
                "Seeds".to_string(),
                "Explosive CA with fractal patterns (B2/S)".to_string(),
                "Brian Silverman",
            ),
            Self::Custom => (
                format!("Life-like ({})", rule),
                format!("Two-state totalistic automaton ({})", rule),
                "",
            ),
        };
        AutomatonMetadata::new(&name, &description, author, 2, NeighborhoodKind::Moore).totalistic()
    }

    pub fn default_pattern(self) -> &'static str {
        match self {
            Self::Conway => "glider_gun",
            Self::HighLife => "replicator",
            Self::DayAndNight | Self::Custom => "random",
            Self::Seeds => "serviette",
        }
    }

    pub fn patterns(self) -> Vec<PatternInfo> {
        match self {
            Self::Conway => vec![
                PatternInfo::new("glider_gun", "Gosper's Glider Gun - creates gliders", (150, 150)),
                PatternInfo::new("glider", "Simple glider spaceship", (100, 100)),
                PatternInfo::new("pulsar", "Period-3 oscillator", (100, 100)),
                PatternInfo::new("pentadecathlon", "Period-15 oscillator", (100, 100)),
                PatternInfo::new("lightweight_spaceship", "LWSS - faster than glider", (100, 100)),
                PatternInfo::new("r_pentomino", "Chaotic methuselah pattern", (150, 150)),
                PatternInfo::new("diehard", "Dies after 130 generations", (100, 100)),
                PatternInfo::new("acorn", "Small pattern with long evolution", (150, 150)),
                PatternInfo::new("random", "Random soup", (100, 100)).param("density", 0.3),
            ],
            Self::HighLife => vec![
                PatternInfo::new("replicator", "Famous replicator pattern", (150, 150)),
                PatternInfo::new("random", "Random soup", (150, 150)).param("density", 0.3),
                PatternInfo::new("glider", "Simple glider", (100, 100)),
            ],
            Self::DayAndNight => vec![
                PatternInfo::new("random", "Random soup", (150, 150)).param("density", 0.5),
                PatternInfo::new("symmetry", "Symmetric pattern", (150, 150)),
                PatternInfo::new("checkerboard", "Checkerboard", (150, 150)),
            ],
            Self::Seeds => vec![
                PatternInfo::new("serviette", "Famous 2x2 pattern", (150, 150)),
                PatternInfo::new("two_cells", "Two adjacent cells", (150, 150)),
                PatternInfo::new("line", "Horizontal line explosion", (150, 150)).param("length", 10),
                PatternInfo::new("cross", "Cross pattern explosion", (150, 150)).param("size", 5),
                PatternInfo::new("random", "Random seed pattern", (150, 150)).param("density", 0.05),
                PatternInfo::new("single_cell", "Single cell (dies immediately)", (150, 150)),
            ],
            Self::Custom => vec![
                PatternInfo::new("random", "Random soup", (100, 100)).param("density", 0.3),
                PatternInfo::new("glider", "Glider-shaped seed", (100, 100)),
                PatternInfo::new("r_pentomino", "R-pentomino seed", (100, 100)),
            ],
        }
    }

    pub fn colormap(self) -> Vec<String> {
        let alive = match self {
            Self::Conway => "#00FF00",
            Self::HighLife => "#00FFFF",
            Self::Seeds => "#FFAA00",
            Self::DayAndNight | Self::Custom => "#FFFFFF",
        };
        vec!["#000000".to_string(), alive.to_string()]
    }
}

/// Life-like automaton
pub struct LifeLike {
    core: AutomatonCore,
    flavor: LifeFlavor,
    rule: BirthSurvival,
    /// Set when a totalistic rule file has been loaded; takes precedence over `rule`
    table: Option<TotalisticTable>,
}

impl LifeLike {
    pub fn new(width: usize, height: usize, flavor: LifeFlavor) -> Result<Self> {
        Self::with_rule(width, height, flavor, flavor.default_rule())
    }

    pub fn with_rule(width: usize, height: usize, flavor: LifeFlavor, rule: BirthSurvival) -> Result<Self> {
        Ok(Self {
            core: AutomatonCore::new(width, height, flavor.metadata(&rule))?,
            flavor,
            rule,
            table: None,
        })
    }

    pub fn flavor(&self) -> LifeFlavor {
        self.flavor
    }

    pub fn rule(&self) -> &BirthSurvival {
        &self.rule
    }

    fn has_pattern(&self, name: &str) -> bool {
        self.flavor.patterns().iter().any(|p| p.name == name)
    }

    fn random_soup(&mut self, params: &PatternParams) {
        let (w, h) = self.core.grid().shape();
        let mut rng = params.rng();
        let (density, region) = match self.flavor {
            LifeFlavor::Conway | LifeFlavor::Custom => (0.3, true),
            LifeFlavor::Seeds => (0.05, true),
            // whole grid unless an anchor is given
            LifeFlavor::HighLife => (0.3, params.x.is_some() && params.y.is_some()),
            LifeFlavor::DayAndNight => (0.5, false),
        };
        let density = params.density_or(density);

        let (origin, size) = if region {
            (
                params.anchor_or(w / 4, h / 4),
                (params.size_x.unwrap_or(w / 2), params.size_y.unwrap_or(h / 2)),
            )
        } else {
            ((0, 0), (w, h))
        };
        patterns::random_fill(self.core.grid_mut(), &mut rng, origin, size, density, 1);
    }

    fn symmetry(&mut self, params: &PatternParams) {
        let (w, h) = self.core.grid().shape();
        let (qw, qh) = (w / 2, h / 2);
        let mut rng = params.rng();
        let quarter: Vec<Vec<u8>> = (0..qh)
            .map(|_| (0..qw).map(|_| rng.gen_range(0..2)).collect())
            .collect();

        let (sx, sy) = ((w - 2 * qw) / 2, (h - 2 * qh) / 2);
        let grid = self.core.grid_mut();
        for (qy, row) in quarter.iter().enumerate() {
            for (qx, &state) in row.iter().enumerate() {
                let (mx, my) = (2 * qw - 1 - qx, 2 * qh - 1 - qy);
                grid.set(sx + qx, sy + qy, state);
                grid.set(sx + mx, sy + qy, state);
                grid.set(sx + qx, sy + my, state);
                grid.set(sx + mx, sy + my, state);
            }
        }
    }
}

impl Automaton for LifeLike {
    fn core(&self) -> &AutomatonCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AutomatonCore {
        &mut self.core
    }

    fn step(&mut self) -> Result<()> {
        let next = match &self.table {
            Some(table) => apply_moore_rule(self.core.grid(), table),
            None => apply_moore_rule(self.core.grid(), &self.rule),
        };
        self.core.advance(next);
        Ok(())
    }

    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()> {
        self.core.reset();
        let name = if self.has_pattern(name) {
            name
        } else {
            self.flavor.default_pattern()
        };

        let (w, h) = self.core.grid().shape();
        let (cw, ch) = ((w / 2) as isize, (h / 2) as isize);
        let (qw, qh) = ((w / 4) as isize, (h / 4) as isize);
        let anchor = |dx: isize, dy: isize| -> (isize, isize) {
            (
                params.x.map_or(dx, patterns::signed),
                params.y.map_or(dy, patterns::signed),
            )
        };

        let grid = self.core.grid_mut();
        match name {
            "glider_gun" => {
                let (x, y) = anchor(10, 10);
                patterns::stamp(grid, x, y, &GOSPER_GUN);
            }
            "glider" => {
                let (x, y) = anchor(qw, qh);
                patterns::stamp(grid, x, y, &GLIDER);
            }
            "pulsar" => {
                let (x, y) = anchor(cw - 6, ch - 6);
                patterns::stamp(grid, x, y, &PULSAR);
            }
            "pentadecathlon" => {
                let (x, y) = anchor(cw - 5, ch - 1);
                patterns::stamp(grid, x, y, &PENTADECATHLON);
            }
            "lightweight_spaceship" => {
                let (x, y) = anchor(qw, qh);
                patterns::stamp(grid, x, y, &LWSS);
            }
            "r_pentomino" => {
                let (x, y) = anchor(cw, ch);
                patterns::stamp(grid, x, y, &R_PENTOMINO);
            }
            "diehard" => {
                let (x, y) = anchor(cw, ch);
                patterns::stamp(grid, x, y, &DIEHARD);
            }
            "acorn" => {
                let (x, y) = anchor(cw, ch);
                patterns::stamp(grid, x, y, &ACORN);
            }
            "replicator" => {
                let (x, y) = anchor(cw, ch);
                patterns::stamp(grid, x, y, &REPLICATOR);
            }
            "checkerboard" => {
                for y in 0..h {
                    for x in 0..w {
                        grid.set(x, y, ((x + y) % 2) as u8);
                    }
                }
            }
            "serviette" => {
                let (x, y) = anchor(cw - 1, ch - 1);
                patterns::stamp(grid, x, y, &[[1, 1], [1, 1]]);
            }
            "single_cell" => {
                let (x, y) = anchor(cw, ch);
                patterns::set_clipped(grid, x, y, 1);
            }
            "two_cells" => {
                let (x, y) = anchor(cw, ch);
                patterns::stamp(grid, x, y, &[[1, 1]]);
            }
            "line" => {
                let length = params.length.unwrap_or(10);
                let (x, y) = anchor(cw - (length / 2) as isize, ch);
                for i in 0..length as isize {
                    patterns::set_clipped(grid, x + i, y, 1);
                }
            }
            "cross" => {
                let (x, y) = anchor(cw, ch);
                if x >= 0 && y >= 0 {
                    patterns::cross(grid, x as usize, y as usize, params.size.unwrap_or(5), 1);
                }
            }
            "symmetry" => self.symmetry(params),
            _ => self.random_soup(params),
        }

        log::debug!("{}: initialized pattern '{}'", self.core.metadata().name, name);
        Ok(())
    }

    fn rule_label(&self) -> String {
        match &self.table {
            Some(table) => format!("totalistic table ({} entries)", table.len()),
            None => self.rule.to_string(),
        }
    }

    fn export_rules(&self) -> Option<RuleFile> {
        let table = self.table.clone().unwrap_or_else(|| self.rule.to_table(2));
        Some(
            RuleFile::from_totalistic(&table)
                .with_metadata("name", self.core.metadata().name.clone())
                .with_metadata("rule", self.rule_label()),
        )
    }

    fn load_rules(&mut self, rules: &RuleFile) -> Result<()> {
        if rules.kind()? != RuleKind::Totalistic {
            return Err(Error::UnsupportedRuleType {
                variant: self.core.metadata().name.clone(),
                rule_type: "table".to_string(),
            });
        }
        let table = rules.to_totalistic()?;
        if table.max_state() >= 2 {
            return Err(Error::RuleParse(format!(
                "rule references state {} but the automaton has 2 states",
                table.max_state()
            )));
        }
        log::info!(
            "{}: loaded totalistic rule table with {} entries",
            self.core.metadata().name,
            table.len()
        );
        self.table = Some(table);
        Ok(())
    }
}

/// Build a grid from text rows where `#`/`1` is alive; used in tests
#[cfg(test)]
pub(crate) fn grid_from_art(rows: &[&str]) -> Grid {
    let rows: Vec<Vec<u8>> = rows
        .iter()
        .map(|r| r.chars().map(|c| u8::from(c == '#' || c == '1')).collect())
        .collect();
    Grid::from_rows(&rows).unwrap()
}
