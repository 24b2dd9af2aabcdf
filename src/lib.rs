//! # calab
//!
//! Cellular automata laboratory: grid automata, pluggable rule families and a
//! threaded simulation engine.
//!
//! ## Features
//!
//! - **Grid model**: toroidal grids of small integer cell states
//! - **Rule families**: pattern tables, birth/survival, cyclic thresholds,
//!   elementary 1-D rules and hard-coded state machines
//! - **Registry**: every built-in variant constructible by name
//! - **Engine**: background stepping with pause/resume and callbacks
//! - **Batch runs**: sequential parameter sweeps with JSON/CSV export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use calab::{create_automaton, AutomatonOptions};
//!
//! let options = AutomatonOptions::new().with_pattern("glider");
//! let mut life = create_automaton("game_of_life", 64, 64, &options).unwrap();
//!
//! life.run(100).unwrap();
//! println!("{}", life.compute_statistics().summary());
//! ```
//!
//! ## Background simulation
//!
//! ```rust,no_run
//! use calab::{create_automaton, AutomatonOptions, SimulationEngine};
//!
//! let wireworld = create_automaton("wireworld", 60, 40, &AutomatonOptions::new()).unwrap();
//! let mut engine = SimulationEngine::with_automaton(wireworld);
//! engine.on_step(|event| println!("generation {}", event.generation));
//! engine.set_max_generations(Some(50));
//! engine.start().unwrap();
//! ```
//!
//! ## Checkpoints
//!
//! ```rust,no_run
//! use calab::checkpoint::Checkpoint;
//! use calab::{create_automaton, AutomatonOptions};
//!
//! let options = AutomatonOptions::new();
//! let mut brain = create_automaton("brians_brain", 80, 80, &options).unwrap();
//! brain.run(25).unwrap();
//!
//! let checkpoint = Checkpoint::capture("brians_brain", &options, brain.as_mut()).unwrap();
//! checkpoint.save("brain.bin").unwrap();
//!
//! let restored = Checkpoint::load("brain.bin").unwrap().restore().unwrap();
//! assert_eq!(restored.generation(), 25);
//! ```

pub mod automaton;
pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod neighborhood;
pub mod patterns;
pub mod registry;
pub mod rules;
pub mod simulation;
pub mod stats;
pub mod variants;

// Re-export main types
pub use automaton::{Automaton, AutomatonCore, AutomatonMetadata, StepMode};
pub use batch::{BatchParams, BatchResult, BatchRunner};
pub use config::Config;
pub use error::{Error, Result};
pub use grid::{CellState, Grid};
pub use neighborhood::{Neighborhood, NeighborhoodKind};
pub use patterns::PatternParams;
pub use registry::{create_automaton, registry, AutomatonOptions, Category, Registry, VariantFactory};
pub use simulation::{ExitReason, SimState, SimulationEngine, SimulationStatus, StepEvent};
pub use stats::StatisticsRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Step a registry variant `steps` times on its default pattern and time it
pub fn benchmark(variant: &str, width: usize, height: usize, steps: u64) -> Result<BenchmarkResult> {
    use std::time::Instant;

    let options = AutomatonOptions::new().with_params(PatternParams::new().with_seed(42));
    let mut automaton = create_automaton(variant, width, height, &options)?;
    let initial_active = automaton.grid().count_active();

    let start = Instant::now();
    automaton.run(steps)?;
    let elapsed = start.elapsed().as_secs_f64();

    let generation = automaton.generation();
    let cell_updates = (width * height) as f64 * generation as f64;
    let (steps_per_second, cells_per_second) = if elapsed > 0.0 {
        (generation as f64 / elapsed, cell_updates / elapsed)
    } else {
        (0.0, 0.0)
    };

    Ok(BenchmarkResult {
        variant: variant.to_string(),
        width,
        height,
        steps: generation,
        initial_active,
        final_active: automaton.grid().count_active(),
        elapsed_secs: elapsed,
        steps_per_second,
        cells_per_second,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub variant: String,
    pub width: usize,
    pub height: usize,
    /// Steps actually taken; row-advance variants may stop early
    pub steps: u64,
    pub initial_active: usize,
    pub final_active: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
    pub cells_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Variant: {} ({}x{})", self.variant, self.width, self.height)?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Active cells: {} -> {}", self.initial_active, self.final_active)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        writeln!(f, "Throughput: {:.2} Mcells/s", self.cells_per_second / 1e6)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let mut life = create_automaton("game_of_life", 60, 60, &AutomatonOptions::new()).unwrap();
        life.run(100).unwrap();
        assert_eq!(life.generation(), 100);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark("brians_brain", 40, 40, 20).unwrap();

        assert_eq!(result.steps, 20);
        assert!(result.to_string().contains("brians_brain"));
    }

    #[test]
    fn test_benchmark_unknown_variant() {
        assert!(matches!(benchmark("nope", 10, 10, 1), Err(Error::UnknownVariant(_))));
    }
}
