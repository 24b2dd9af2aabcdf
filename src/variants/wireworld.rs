//! WireWorld circuits.

use crate::automaton::{Automaton, AutomatonCore, AutomatonMetadata};
use crate::error::Result;
use crate::neighborhood::NeighborhoodKind;
use crate::patterns::{self, PatternInfo, PatternParams};
use crate::rules::{apply_moore_rule, WireWorldRule};

const WIRE: u8 = WireWorldRule::WIRE;
const HEAD: u8 = WireWorldRule::HEAD;
const TAIL: u8 = WireWorldRule::TAIL;

const DIODE: [[u8; 11]; 7] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0],
    [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0],
    [0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0],
    [0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

pub const DEFAULT_PATTERN: &str = "simple_circuit";

pub fn pattern_catalogue() -> Vec<PatternInfo> {
    vec![
        PatternInfo::new("simple_circuit", "Simple circuit with electrons", (150, 150)),
        PatternInfo::new("or_gate", "OR logic gate", (100, 100)),
        PatternInfo::new("diode", "One-way conductor", (100, 100)),
        PatternInfo::new("clock", "Clock signal generator", (100, 100)),
    ]
}

pub fn colormap() -> Vec<String> {
    ["#000000", "#FFFF00", "#0000FF", "#FF0000"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

pub fn metadata() -> AutomatonMetadata {
    AutomatonMetadata::new(
        "Wire World",
        "Cellular automaton for simulating circuits",
        "Brian Silverman",
        4,
        NeighborhoodKind::Moore,
    )
}

pub struct WireWorld {
    core: AutomatonCore,
}

impl WireWorld {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            core: AutomatonCore::new(width, height, metadata())?,
        })
    }
}

impl Automaton for WireWorld {
    fn core(&self) -> &AutomatonCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AutomatonCore {
        &mut self.core
    }

    fn step(&mut self) -> Result<()> {
        let next = apply_moore_rule(self.core.grid(), &WireWorldRule);
        self.core.advance(next);
        Ok(())
    }

    fn initialize_pattern(&mut self, name: &str, params: &PatternParams) -> Result<()> {
        self.core.reset();
        let (w, h) = self.core.grid().shape();
        let (cx, cy) = params.anchor_or(w / 2, h / 2);
        let (cx, cy) = (patterns::signed(cx), patterns::signed(cy));
        let grid = self.core.grid_mut();
        let mut put = |x: isize, y: isize, s: u8| patterns::set_clipped(grid, x, y, s);

        match name {
            "or_gate" => {
                for i in 0..10 {
                    put(cx + i, cy - 5, WIRE);
                    put(cx + i, cy + 5, WIRE);
                }
                for i in 0..15 {
                    put(cx + 10 + i, cy, WIRE);
                }
                for i in 0..5 {
                    put(cx + 10, cy - 5 + i, WIRE);
                    put(cx + 10, cy + 5 - i, WIRE);
                }
                put(cx, cy - 5, HEAD);
                put(cx + 1, cy - 5, TAIL);
            }
            "diode" => {
                for (dy, row) in DIODE.iter().enumerate() {
                    for (dx, &s) in row.iter().enumerate() {
                        put(cx + dx as isize - 5, cy + dy as isize - 3, s);
                    }
                }
                put(cx - 5, cy, HEAD);
                put(cx - 4, cy, TAIL);
            }
            "clock" => {
                let half = 5;
                for i in 0..10 {
                    put(cx - half + i, cy - half, WIRE);
                    put(cx - half + i, cy + half, WIRE);
                    put(cx - half, cy - half + i, WIRE);
                    put(cx + half, cy - half + i, WIRE);
                }
                put(cx, cy - half, HEAD);
                put(cx + 1, cy - half, TAIL);
            }
            _ => {
                let radius = 20.0;
                for i in 0..120 {
                    let angle = i as f64 / 119.0 * std::f64::consts::TAU;
                    let x = (cx as f64 + radius * angle.cos()).trunc() as isize;
                    let y = (cy as f64 + radius * angle.sin()).trunc() as isize;
                    put(x, y, WIRE);
                }
                for i in 0..25 {
                    put(cx + i, cy, WIRE);
                    put(cx, cy + i, WIRE);
                    put(cx - i, cy, WIRE);
                }
                put(cx, cy - 20, HEAD);
                put(cx, cy - 19, TAIL);
                put(cx + 5, cy, HEAD);
                put(cx + 6, cy, TAIL);
            }
        }
        Ok(())
    }

    fn rule_label(&self) -> String {
        "WireWorld".to_string()
    }
}
