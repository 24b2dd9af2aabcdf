//! Griffeath's cyclic cellular automaton.

use crate::automaton::{Automaton, AutomatonCore, AutomatonMetadata};
use crate::error::Result;
use crate::grid::Grid;
use crate::neighborhood::NeighborhoodKind;
use crate::patterns::{PatternInfo, PatternParams};
use crate::rules::{apply_moore_rule, CyclicRule};
use rand::Rng;

pub const DEFAULT_STATES: u8 = 14;
pub const DEFAULT_THRESHOLD: u8 = 3;
pub const DEFAULT_PATTERN: &str = "random";

pub fn pattern_catalogue() -> Vec<PatternInfo> {
    vec![
        PatternInfo::new("random", "Random initialization (forms spirals)", (150, 150))
            .param("num_states", 14)
            .param("threshold", 3),
        PatternInfo::new("spiral_seeds", "Seeds for spiral formation", (150, 150))
            .param("num_states", 14)
            .param("threshold", 3),
        PatternInfo::new("domains", "Distinct color domains", (150, 150))
            .param("num_states", 16)
            .param("threshold", 2),
        PatternInfo::new("gradient", "Gradient pattern", (150, 150))
            .param("num_states", 12)
            .param("threshold", 4),
    ]
}

/// Twenty fully saturated hues around the color wheel
pub fn colormap() -> Vec<String> {
    (0..20)
        .map(|i| {
            let (r, g, b) = hsv_to_rgb(i as f64 / 20.0);
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        })
        .collect()
}

fn hsv_to_rgb(hue: f64) -> (u8, u8, u8) {
    let h = hue * 6.0;
    let sector = h.floor() as u32 % 6;
    let f = h - h.floor();
    let (up, down) = (f, 1.0 - f);
    let (r, g, b) = match sector {
        0 => (1.0, up, 0.0),
        1 => (down, 1.0, 0.0),
        2 => (0.0, 1.0, up),
        3 => (0.0, down, 1.0),
        4 => (up, 0.0, 1.0),
        _ => (1.0, 0.0, down),
    };
    let scale = |c: f64| (c * 255.0) as u8;
    (scale(r), scale(g), scale(b))
}

pub fn metadata(num_states: u8, threshold: u8) -> AutomatonMetadata {
    AutomatonMetadata::new(
        &format!("Cyclic CA ({} states)", num_states),
        &format!("Self-organizing spirals (threshold={})", threshold),
        "David Griffeath",
        num_states,
        NeighborhoodKind::Moore,
    )
}

pub struct CyclicAutomaton {
    core: AutomatonCore,
    rule: CyclicRule,
}

impl CyclicAutomaton {
    pub fn new(width: usize, height: usize, num_states: u8, threshold: u8) -> Result<Self> {
        let rule = CyclicRule::new(num_states, threshold)?;
        Ok(Self {
            core: AutomatonCore::new(width, height, metadata(num_states, threshold))?,
            rule,
        })
    }

    pub fn rule(&self) -> CyclicRule {
        self.rule
    }

    fn fill_random<R: Rng>(grid: &mut Grid, rng: &mut R, num_states: u8) {
        for cell in grid.cells_mut() {
            *cell = rng.gen_range(0..num_states);
        }
    }
}

impl Automaton for CyclicAutomaton {
    fn core(&self) -> &AutomatonCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AutomatonCore {
        &mut self.core
    }

    fn step(&mut self) -> Result<()> {
        let next = apply_moore_rule(self.core.grid(), &self.rule);
        self.core.advance(next);
        Ok(())
    }

    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()> {
        self.core.reset();
        let n = self.rule.num_states();
        let (w, h) = self.core.grid().shape();
        let mut rng = params.rng();
        let grid = self.core.grid_mut();

        match name {
            "spiral_seeds" => {
                Self::fill_random(grid, &mut rng, n);
                let pick = |rng: &mut rand_chacha::ChaCha8Rng, extent: usize| {
                    if extent > 20 {
                        rng.gen_range(10..extent - 10)
                    } else {
                        rng.gen_range(0..extent)
                    }
                };
                for _ in 0..5 {
                    let sx = pick(&mut rng, w) as isize;
                    let sy = pick(&mut rng, h) as isize;
                    let state = rng.gen_range(0..n);
                    for dy in -3..=3 {
                        for dx in -3..=3 {
                            crate::patterns::set_clipped(grid, sx + dx, sy + dy, state);
                        }
                    }
                }
            }
            "domains" => {
                let region = w / 4;
                if region > 0 {
                    for i in 0..4 {
                        for j in 0..4 {
                            let state = ((i + j) * n as usize / 4 % n as usize) as u8;
                            for y in i * region..((i + 1) * region).min(h) {
                                for x in j * region..((j + 1) * region).min(w) {
                                    grid.set(x, y, state);
                                }
                            }
                        }
                    }
                }
            }
            "gradient" => {
                for y in 0..h {
                    let state = (y * n as usize / h % n as usize) as u8;
                    for x in 0..w {
                        grid.set(x, y, state);
                    }
                }
            }
            _ => Self::fill_random(grid, &mut rng, n),
        }
        Ok(())
    }

    fn rule_label(&self) -> String {
        format!("C{}/T{}", self.rule.num_states(), self.rule.threshold())
    }
}
