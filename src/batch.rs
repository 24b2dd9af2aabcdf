//! Sequential batch runs for parameter sweeps.
//!
//! A [`BatchRunner`] builds one automaton per parameter set, steps it a fixed
//! number of times and keeps the final state of each run.

use crate::automaton::Automaton;
use crate::error::Result;
use crate::grid::CellState;
use crate::registry::{registry, AutomatonOptions};
use crate::stats::StatisticsRecord;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// One registry-built run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchParams {
    pub variant: String,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub options: AutomatonOptions,
}

impl BatchParams {
    pub fn new(variant: &str, width: usize, height: usize) -> Self {
        Self {
            variant: variant.to_string(),
            width,
            height,
            options: AutomatonOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AutomatonOptions) -> Self {
        self.options = options;
        self
    }
}

/// Final state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult<P> {
    pub parameters: P,
    pub final_generation: u64,
    pub final_statistics: StatisticsRecord,
    /// Final grid as rows
    pub final_grid: Vec<Vec<CellState>>,
}

/// Progress callback: `(completed, total, result)`
pub type ProgressCallback<P> = Box<dyn FnMut(usize, usize, &BatchResult<P>) + Send>;

/// Runs automata one after another and collects their results
pub struct BatchRunner<P = BatchParams> {
    results: Vec<BatchResult<P>>,
    progress: Option<ProgressCallback<P>>,
}

impl<P: Clone> BatchRunner<P> {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            progress: None,
        }
    }

    /// Called after every completed run
    pub fn on_progress(&mut self, callback: impl FnMut(usize, usize, &BatchResult<P>) + Send + 'static) {
        self.progress = Some(Box::new(callback));
    }

    /// Build an automaton per parameter set with `factory` and step each one
    /// `num_steps` times. Previous results are discarded.
    ///
    /// Row-advance automata stop early once exhausted. The first factory or
    /// step error aborts the batch; results collected so far are kept.
    pub fn run<F>(&mut self, mut factory: F, parameter_sets: &[P], num_steps: u64) -> Result<&[BatchResult<P>]>
    where
        F: FnMut(&P) -> Result<Box<dyn Automaton>>,
    {
        self.results.clear();
        let total = parameter_sets.len();
        let started = Instant::now();
        info!("Batch: {} runs x {} steps", total, num_steps);

        for (index, params) in parameter_sets.iter().enumerate() {
            let mut automaton = factory(params)?;
            automaton.run(num_steps)?;

            let result = BatchResult {
                parameters: params.clone(),
                final_generation: automaton.generation(),
                final_statistics: automaton.compute_statistics(),
                final_grid: automaton.export_grid().to_rows(),
            };
            debug!(
                "Batch run {}/{} ({}): {}",
                index + 1,
                total,
                automaton.metadata().name,
                result.final_statistics.summary()
            );

            if let Some(progress) = self.progress.as_mut() {
                progress(index + 1, total, &result);
            }
            self.results.push(result);
        }

        info!("Batch finished in {:.2}s", started.elapsed().as_secs_f64());
        Ok(&self.results)
    }

    pub fn results(&self) -> &[BatchResult<P>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<BatchResult<P>> {
        self.results
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

impl<P: Clone + Serialize> BatchRunner<P> {
    /// Write all results as pretty JSON
    pub fn export_json<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.results)?;
        Ok(())
    }

    /// Write one CSV row of final statistics per run. The parameters column
    /// holds the run's parameters as JSON.
    pub fn export_csv<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "run,final_generation,total_cells,active_cells,density,entropy,unique_states,parameters"
        )?;
        for (index, result) in self.results.iter().enumerate() {
            let stats = &result.final_statistics;
            let parameters = serde_json::to_string(&result.parameters)?;
            writeln!(
                writer,
                "{},{},{},{},{:.4},{:.6},{},\"{}\"",
                index + 1,
                result.final_generation,
                stats.total_cells,
                stats.active_cells,
                stats.density,
                stats.entropy,
                stats.unique_states,
                parameters.replace('"', "\"\"")
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl BatchRunner<BatchParams> {
    /// Build every run through the shared variant registry
    pub fn run_registry(&mut self, parameter_sets: &[BatchParams], num_steps: u64) -> Result<&[BatchResult<BatchParams>]> {
        self.run(
            |p| registry().create_automaton(&p.variant, p.width, p.height, &p.options),
            parameter_sets,
            num_steps,
        )
    }
}

impl<P: Clone> Default for BatchRunner<P> {
    fn default() -> Self {
        Self::new()
    }
}
