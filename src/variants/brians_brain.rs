//! Brian's Brain: three-state waves.

use crate::automaton::{Automaton, AutomatonCore, AutomatonMetadata};
use crate::error::Result;
use crate::neighborhood::NeighborhoodKind;
use crate::patterns::{self, PatternInfo, PatternParams};
use crate::rules::{apply_moore_rule, BriansBrainRule};

const ON: u8 = BriansBrainRule::ON;

const GLIDER: [[u8; 3]; 3] = [[0, 1, 0], [0, 0, 1], [1, 1, 1]];

pub const DEFAULT_PATTERN: &str = "random";

pub fn pattern_catalogue() -> Vec<PatternInfo> {
    vec![
        PatternInfo::new("random", "Random soup - creates beautiful waves", (150, 150)).param("density", 0.1),
        PatternInfo::new("circle", "Expanding circle wave", (150, 150)).param("radius", 20),
        PatternInfo::new("lines", "Parallel wave sources", (150, 150)).param("spacing", 10),
        PatternInfo::new("cross", "Cross pattern", (150, 150)).param("size", 30),
        PatternInfo::new("glider", "Moving pattern", (100, 100)),
        PatternInfo::new("gun", "Wave generator", (150, 150)),
        PatternInfo::new("spiral", "Spiral wave source", (150, 150)).param("turns", 3),
    ]
}

pub fn colormap() -> Vec<String> {
    ["#000000", "#00FF00", "#0000FF"].iter().map(|c| c.to_string()).collect()
}

pub fn metadata() -> AutomatonMetadata {
    AutomatonMetadata::new(
        "Brian's Brain",
        "Three-state CA with propagating waves",
        "Brian Silverman",
        3,
        NeighborhoodKind::Moore,
    )
    .totalistic()
}

pub struct BriansBrain {
    core: AutomatonCore,
}

impl BriansBrain {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            core: AutomatonCore::new(width, height, metadata())?,
        })
    }
}

impl Automaton for BriansBrain {
    fn core(&self) -> &AutomatonCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AutomatonCore {
        &mut self.core
    }

    fn step(&mut self) -> Result<()> {
        let next = apply_moore_rule(self.core.grid(), &BriansBrainRule);
        self.core.advance(next);
        Ok(())
    }

    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()> {
        self.core.reset();
        let (w, h) = self.core.grid().shape();
        let grid = self.core.grid_mut();

        match name {
            "circle" => {
                let (cx, cy) = params.anchor_or(w / 2, h / 2);
                patterns::circle(grid, cx, cy, params.radius.unwrap_or(20), 60, ON);
            }
            "lines" => {
                let (x, _) = params.anchor_or(0, 0);
                let spacing = params.spacing.unwrap_or(10).max(1);
                for i in (0..w).step_by(spacing) {
                    for y in 0..h {
                        grid.set(x.saturating_add(i), y, ON);
                    }
                }
            }
            "cross" => {
                let (cx, cy) = params.anchor_or(w / 2, h / 2);
                patterns::cross(grid, cx, cy, params.size.unwrap_or(30), ON);
            }
            "glider" => {
                let (x, y) = params.anchor_or(w / 4, h / 4);
                patterns::stamp(grid, patterns::signed(x), patterns::signed(y), &GLIDER);
            }
            "gun" => {
                let (x, y) = params.anchor_or(w / 4, h / 4);
                for i in 0..5 {
                    for j in 0..5 {
                        if (i + j) % 2 == 0 {
                            grid.set(x.saturating_add(j), y.saturating_add(i), ON);
                        }
                    }
                }
            }
            "spiral" => {
                let (cx, cy) = params.anchor_or(w / 2, h / 2);
                let turns = params.turns.unwrap_or(3) as f64;
                let max_radius = (w.min(h) / 4) as f64;
                let points = 200;
                for i in 0..points {
                    let t = i as f64 / points as f64;
                    let angle = t * turns * std::f64::consts::TAU;
                    let radius = t * max_radius;
                    let px = (cx as f64 + radius * angle.cos()).trunc() as isize;
                    let py = (cy as f64 + radius * angle.sin()).trunc() as isize;
                    patterns::set_clipped(grid, px, py, ON);
                }
            }
            _ => {
                let (x, y) = params.anchor_or(0, 0);
                let size = (params.size_x.unwrap_or(w), params.size_y.unwrap_or(h));
                let mut rng = params.rng();
                patterns::random_fill(grid, &mut rng, (x, y), size, params.density_or(0.1), ON);
            }
        }
        Ok(())
    }

    fn rule_label(&self) -> String {
        "B2/S/C3".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_on_cells_decay() {
        let mut bb = BriansBrain::new(6, 6).unwrap();
        bb.set_cell(1, 1, 1);
        bb.set_cell(4, 4, 2);
        bb.step().unwrap();
        assert_eq!(bb.get_cell(1, 1), 2);
        assert_eq!(bb.get_cell(4, 4), 0);
        bb.step().unwrap();
        assert_eq!(bb.get_cell(1, 1), 0);
    }

    #[test]
    fn test_birth_needs_exactly_two() {
        // two adjacent on cells light up the cells beside them
        let grid = Grid::from_rows(&[
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 1, 1, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
        ])
        .unwrap();
        let mut bb = BriansBrain::new(6, 6).unwrap();
        bb.import_grid(&grid).unwrap();
        bb.step().unwrap();

        assert_eq!(bb.get_cell(2, 1), 1);
        assert_eq!(bb.get_cell(3, 3), 1);
        assert_eq!(bb.get_cell(1, 2), 0);
        assert_eq!(bb.get_cell(2, 2), 2);
    }

    #[test]
    fn test_patterns_seed_cells() {
        for pattern in ["random", "circle", "lines", "cross", "glider", "gun", "spiral", "unknown"] {
            let mut bb = BriansBrain::new(100, 100).unwrap();
            let params = PatternParams::new().with_seed(7);
            bb.initialize_pattern(pattern, &params).unwrap();
            assert!(bb.grid().count_active() > 0, "{}", pattern);
        }
    }

    #[test]
    fn test_gun_is_checkered() {
        let mut bb = BriansBrain::new(20, 20).unwrap();
        bb.initialize_pattern("gun", &PatternParams::new()).unwrap();
        assert_eq!(bb.grid().count_active(), 13);
        assert_eq!(bb.get_cell(5, 5), 1);
        assert_eq!(bb.get_cell(6, 5), 0);
    }

    #[test]
    fn test_far_anchor_places_nothing() {
        for pattern in ["random", "circle", "lines", "cross", "glider", "gun", "spiral"] {
            let mut bb = BriansBrain::new(10, 10).unwrap();
            let params = PatternParams::new().at(usize::MAX, usize::MAX).with_seed(7);
            bb.initialize_pattern(pattern, &params).unwrap();
            assert_eq!(bb.grid().count_active(), 0, "{}", pattern);
        }
    }
}
