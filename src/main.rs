//! calab - CLI Entry Point
//!
//! Runs, sweeps and inspects cellular automata.

use calab::checkpoint::{Checkpoint, CheckpointManager};
use calab::config::Config;
use calab::{
    benchmark, create_automaton, registry, AutomatonOptions, BatchParams, BatchRunner, Category,
    ExitReason, PatternParams, SimulationEngine, StepEvent,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "calab")]
#[command(version)]
#[command(about = "Cellular automata laboratory")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an automaton on the background simulation engine
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "calab.yaml")]
        config: PathBuf,

        /// Variant name, overrides the config
        #[arg(short, long)]
        variant: Option<String>,

        /// Initial pattern, overrides the config
        #[arg(short, long)]
        pattern: Option<String>,

        /// Grid width
        #[arg(long)]
        width: Option<usize>,

        /// Grid height
        #[arg(long)]
        height: Option<usize>,

        /// Number of steps to simulate
        #[arg(short, long, default_value = "500")]
        steps: u64,

        /// Milliseconds between steps
        #[arg(long)]
        speed: Option<u64>,

        /// Seed for random patterns
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for checkpoints and statistics
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Continue from a checkpoint
    Resume {
        /// Checkpoint file to resume from
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Number of additional steps
        #[arg(short, long, default_value = "500")]
        steps: u64,

        /// Configuration file (YAML)
        #[arg(long, default_value = "calab.yaml")]
        config: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// List registered variants
    List {
        /// Only variants whose category label contains this text
        #[arg(short, long)]
        category: Option<String>,

        /// Show pattern catalogues
        #[arg(short, long)]
        patterns: bool,
    },

    /// Run the batch section of a configuration file
    Batch {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "calab.yaml")]
        config: PathBuf,

        /// Steps per run, overrides the config
        #[arg(short, long)]
        steps: Option<u64>,

        /// Output directory for results.json and results.csv
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "calab.yaml")]
        output: PathBuf,
    },

    /// Export a variant's rule set as a JSON rule file
    Rules {
        /// Variant name
        variant: String,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Analyze a checkpoint file
    Analyze {
        /// Checkpoint file
        checkpoint: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Variant name
        #[arg(short, long, default_value = "game_of_life")]
        variant: String,

        /// Grid side length
        #[arg(long, default_value = "256")]
        size: usize,

        /// Number of steps
        #[arg(short, long, default_value = "200")]
        steps: u64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // The config, when there is one, decides the default log level
    let config = match &cli.command {
        Commands::Run { config, .. } | Commands::Resume { config, .. } | Commands::Batch { config, .. } => {
            load_config(config)?
        }
        _ => Config::default(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.log_level.as_str()))
        .init();

    match cli.command {
        Commands::Run {
            variant,
            pattern,
            width,
            height,
            steps,
            speed,
            seed,
            output,
            quiet,
            ..
        } => {
            let mut config = config;
            if let Some(variant) = variant {
                config.automaton.variant = variant;
            }
            if let Some(pattern) = pattern {
                config.automaton.options.pattern = Some(pattern);
            }
            if let Some(width) = width {
                config.automaton.width = width;
            }
            if let Some(height) = height {
                config.automaton.height = height;
            }
            if let Some(speed) = speed {
                config.simulation.speed_ms = speed;
            }
            if let Some(seed) = seed {
                config.automaton.options.params.seed = Some(seed);
            }
            config.validate()?;
            run_simulation(&config, steps, &output, quiet)
        }

        Commands::Resume {
            checkpoint,
            steps,
            output,
            ..
        } => resume_simulation(&config, &checkpoint, steps, &output),

        Commands::List { category, patterns } => list_variants(category.as_deref(), patterns),

        Commands::Batch { steps, output, .. } => run_batch(&config, steps, &output),

        Commands::Init { output } => generate_config(&output),

        Commands::Rules { variant, output } => export_rules(&variant, &output),

        Commands::Analyze { checkpoint } => analyze_checkpoint(&checkpoint),

        Commands::Benchmark { variant, size, steps } => run_benchmark(&variant, size, steps),
    }
}

fn load_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Ok(Config::from_file(path)?)
    } else {
        Ok(Config::default())
    }
}

enum Progress {
    Step(StepEvent),
    Done(ExitReason),
}

fn run_simulation(config: &Config, steps: u64, output: &Path, quiet: bool) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(output)?;

    let setup = &config.automaton;
    let mut automaton = create_automaton(&setup.variant, setup.width, setup.height, &setup.options)?;
    automaton.core_mut().set_retention(config.history.retention());

    println!("Starting simulation");
    println!("  Variant: {} ({})", setup.variant, automaton.rule_label());
    println!("  Grid size: {}x{}", setup.width, setup.height);
    println!("  Active cells: {}", automaton.grid().count_active());
    println!("  Steps: {} at {} ms/step", steps, config.simulation.speed_ms);
    println!();

    let mut engine = SimulationEngine::from_config(&config.simulation);
    engine.set_max_generations(Some(steps));
    engine.set_automaton(automaton);

    let (tx, rx) = mpsc::channel();
    let step_tx = tx.clone();
    engine.on_step(move |event| {
        let _ = step_tx.send(Progress::Step(*event));
    });
    engine.on_complete(move |reason| {
        let _ = tx.send(Progress::Done(reason.clone()));
    });

    let mut checkpoints = CheckpointManager::new(output, config.logging.checkpoint_interval, 10)?;
    let stats_interval = config.logging.stats_interval.max(1);
    let snapshot_interval = config.history.snapshot_interval;

    let start = Instant::now();
    engine.start()?;

    let reason = loop {
        let event = match rx.recv() {
            Ok(Progress::Step(event)) => event,
            Ok(Progress::Done(reason)) => break reason,
            Err(_) => break ExitReason::Unbound,
        };

        if event.generation % stats_interval == 0 {
            if let Some(stats) = engine.modify(|a| a.compute_statistics()) {
                if !quiet {
                    println!("{}", stats.summary());
                }
            }
        }

        if snapshot_interval > 0 && event.generation % snapshot_interval == 0 {
            engine.modify(|a| a.save_snapshot());
        }

        if checkpoints.should_save(event.generation) {
            // hold the worker so the checkpoint lands close to the requested generation
            engine.pause();
            let captured = engine.modify(|a| Checkpoint::capture(&setup.variant, &setup.options, a));
            engine.resume();
            if let Some(checkpoint) = captured {
                match checkpoint.and_then(|c| checkpoints.save(&c)) {
                    Ok(path) if !quiet => println!("  Checkpoint saved: {}", path.display()),
                    Ok(_) => {}
                    Err(e) => eprintln!("  Checkpoint error: {}", e),
                }
            }
        }
    };

    let status = engine.get_status();
    engine.stop()?;
    let mut automaton = engine.take_automaton().ok_or("automaton was unbound during the run")?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Exit: {:?}", reason);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generation: {}", automaton.generation());
    println!("Speed: {:.1} steps/s (rolling)", status.fps);
    println!("{}", automaton.compute_statistics().summary());

    let final_checkpoint = Checkpoint::capture(&setup.variant, &setup.options, automaton.as_mut())?;
    let final_path = output.join("checkpoint_final.bin");
    final_checkpoint.save(&final_path)?;
    println!("Final checkpoint: {:?}", final_path);

    let stats_path = output.join("stats_history.json");
    automaton.statistics().save(&stats_path)?;
    println!("Stats history: {:?}", stats_path);

    if let ExitReason::Failed(message) = reason {
        return Err(message.into());
    }
    Ok(())
}

fn resume_simulation(config: &Config, checkpoint_path: &Path, steps: u64, output: &Path) -> Result<(), Box<dyn Error>> {
    println!("Loading checkpoint: {:?}", checkpoint_path);

    let checkpoint = Checkpoint::load(checkpoint_path)?;
    let mut automaton = checkpoint.restore()?;
    automaton.core_mut().set_retention(config.history.retention());

    println!("Resumed {} at generation {}", checkpoint.variant, automaton.generation());
    println!("Running {} additional steps", steps);
    println!();

    let mut checkpoints = CheckpointManager::new(output, config.logging.checkpoint_interval, 10)?;
    let stats_interval = config.logging.stats_interval.max(1);

    let start = Instant::now();
    let target = automaton.generation() + steps;

    while automaton.generation() < target && !automaton.is_exhausted() {
        automaton.step()?;
        let generation = automaton.generation();

        if generation % stats_interval == 0 {
            println!("{}", automaton.compute_statistics().summary());
        }

        if checkpoints.should_save(generation) {
            let snapshot = Checkpoint::capture(&checkpoint.variant, &checkpoint.options, automaton.as_mut())?;
            let path = checkpoints.save(&snapshot)?;
            println!("  Checkpoint: {}", path.display());
        }
    }

    println!();
    println!("Resumed run complete in {:.2}s", start.elapsed().as_secs_f64());
    println!("{}", automaton.compute_statistics().summary());

    let final_path = output.join("checkpoint_final.bin");
    Checkpoint::capture(&checkpoint.variant, &checkpoint.options, automaton.as_mut())?.save(&final_path)?;
    println!("Final checkpoint: {:?}", final_path);

    Ok(())
}

fn list_variants(category: Option<&str>, show_patterns: bool) -> Result<(), Box<dyn Error>> {
    let filter = category.map(str::to_lowercase);
    let mut shown = 0;

    for (category, names) in registry().categories() {
        let label = category.to_string();
        if filter.as_ref().is_some_and(|f| !label.to_lowercase().contains(f.as_str())) {
            continue;
        }
        shown += 1;

        println!("{}:", label);
        for name in names {
            let factory = registry().get(name)?;
            let metadata = factory.metadata();
            println!("  {:<16} {} - {}", name, metadata.name, metadata.description);

            if show_patterns {
                for pattern in factory.default_patterns() {
                    let marker = if pattern.name == factory.default_pattern() { "*" } else { " " };
                    let (w, h) = pattern.recommended_size;
                    println!("    {} {:<22} {} [{}x{}]", marker, pattern.name, pattern.description, w, h);
                }
            }
        }
        println!();
    }

    if shown == 0 {
        let labels: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
        println!("No matching category. Known categories: {}", labels.join(", "));
    }

    Ok(())
}

fn run_batch(config: &Config, steps: Option<u64>, output: &Path) -> Result<(), Box<dyn Error>> {
    let num_steps = steps.unwrap_or(config.batch.num_steps);
    let parameter_sets = if config.batch.parameter_sets.is_empty() {
        // every variant on the configured grid
        let options = AutomatonOptions::new().with_params(PatternParams::new().with_seed(42));
        registry()
            .names()
            .into_iter()
            .map(|name| {
                BatchParams::new(name, config.automaton.width, config.automaton.height).with_options(options.clone())
            })
            .collect()
    } else {
        config.batch.parameter_sets.clone()
    };

    std::fs::create_dir_all(output)?;
    println!("Running {} simulations x {} steps", parameter_sets.len(), num_steps);

    let mut runner: BatchRunner = BatchRunner::new();
    runner.on_progress(|done, total, result| {
        println!(
            "  [{}/{}] {:<16} {}",
            done,
            total,
            result.parameters.variant,
            result.final_statistics.summary()
        );
    });
    runner.run_registry(&parameter_sets, num_steps)?;

    let json_path = output.join("results.json");
    let csv_path = output.join("results.csv");
    runner.export_json(&json_path)?;
    runner.export_csv(&csv_path)?;
    println!("Results: {:?}, {:?}", json_path, csv_path);

    Ok(())
}

fn generate_config(output: &Path) -> Result<(), Box<dyn Error>> {
    let mut config = Config::default();
    config.batch.parameter_sets = vec![
        BatchParams::new("game_of_life", 100, 100),
        BatchParams::new("highlife", 100, 100),
        BatchParams::new("cyclic_ca", 100, 100).with_options(AutomatonOptions::new().with_cyclic(8, 2)),
        BatchParams::new("elementary", 101, 100).with_options(AutomatonOptions::new().with_rule_number(54)),
    ];
    config.save(output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn export_rules(variant: &str, output: &Path) -> Result<(), Box<dyn Error>> {
    let automaton = create_automaton(variant, 16, 16, &AutomatonOptions::new())?;
    let rules = automaton.export_rules().ok_or_else(|| calab::Error::UnsupportedRuleType {
        variant: variant.to_string(),
        rule_type: "rule export".to_string(),
    })?;

    rules.save(output)?;
    println!(
        "Exported {} {:?} rules ({}) to {:?}",
        rules.rule_count(),
        rules.kind()?,
        automaton.rule_label(),
        output
    );
    Ok(())
}

fn analyze_checkpoint(checkpoint_path: &Path) -> Result<(), Box<dyn Error>> {
    let checkpoint = Checkpoint::load(checkpoint_path)?;
    let stats = &checkpoint.statistics;

    println!("=== Checkpoint Analysis ===");
    println!("File: {:?} ({} bytes)", checkpoint_path, checkpoint.size_bytes());
    println!("Version: {}", checkpoint.version);
    println!("Variant: {}", checkpoint.variant);
    println!("Grid: {}x{}", checkpoint.grid.width(), checkpoint.grid.height());
    println!("Generation: {}", checkpoint.generation);
    println!("Embedded rules: {}", if checkpoint.rules.is_some() { "yes" } else { "no" });
    println!();
    println!("Active cells: {} / {}", stats.active_cells, stats.total_cells);
    println!("Density: {:.2}%", stats.density);
    println!("Entropy: {:.3} bits", stats.entropy);
    println!("State distribution:");
    for (state, count) in &stats.state_counts {
        println!("  {:>3}: {}", state, count);
    }

    Ok(())
}

fn run_benchmark(variant: &str, size: usize, steps: u64) -> Result<(), Box<dyn Error>> {
    println!("Running benchmark...");
    println!("  Variant: {}", variant);
    println!("  Grid: {}x{}", size, size);
    println!("  Steps: {}", steps);
    println!();

    let result = benchmark(variant, size, size, steps)?;
    println!("{}", result);

    Ok(())
}
