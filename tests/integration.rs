//! Integration tests for calab

use calab::checkpoint::Checkpoint;
use calab::config::Config;
use calab::neighborhood::{self, Neighborhood};
use calab::rules::{BirthSurvival, RuleFile};
use calab::variants::{LifeFlavor, LifeLike};
use calab::{
    create_automaton, registry, Automaton, AutomatonOptions, BatchParams, BatchRunner, Error, ExitReason, Grid,
    NeighborhoodKind, PatternParams, SimState, SimulationEngine, VariantFactory,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

fn grid(rows: &[&[u8]]) -> Grid {
    let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
    Grid::from_rows(&rows).unwrap()
}

fn wait_for(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

fn fast_engine(automaton: Box<dyn Automaton>) -> SimulationEngine {
    let engine = SimulationEngine::with_automaton(automaton);
    engine.set_speed(1);
    engine
}

#[test]
fn test_toroidal_corners() {
    let mut g = Grid::new(4, 3);
    g.set(3, 2, 7);
    g.set(1, 0, 2);
    g.set(0, 1, 3);
    g.set(0, 2, 5);
    g.set(3, 0, 4);

    match neighborhood::resolve(&g, 0, 0, NeighborhoodKind::Moore).unwrap() {
        Neighborhood::Moore(block) => {
            // top-left diagonal wraps to the bottom-right corner
            assert_eq!(block[0][0], 7);
            assert_eq!(block[1][2], 2);
            assert_eq!(block[2][1], 3);
        }
        other => panic!("unexpected neighborhood {:?}", other),
    }

    match neighborhood::resolve(&g, 3, 2, NeighborhoodKind::VonNeumann).unwrap() {
        Neighborhood::VonNeumann(view) => {
            assert_eq!(view.center, 7);
            assert_eq!(view.east, 5);
            assert_eq!(view.south, 4);
            assert_eq!(view.north, 0);
        }
        other => panic!("unexpected neighborhood {:?}", other),
    }

    assert!(matches!(
        neighborhood::resolve(&g, 0, 0, NeighborhoodKind::Hexagonal),
        Err(Error::UnsupportedNeighborhood(NeighborhoodKind::Hexagonal))
    ));
}

#[test]
fn test_import_export_keeps_generation() {
    let mut life = create_automaton("game_of_life", 8, 6, &AutomatonOptions::new().with_pattern("glider")).unwrap();
    life.run(5).unwrap();

    let exported = life.export_grid();
    let mut other = create_automaton("game_of_life", 8, 6, &AutomatonOptions::new()).unwrap();
    other.import_grid(&exported).unwrap();
    assert_eq!(other.export_grid(), exported);
    assert_eq!(other.generation(), 0);
    assert_eq!(life.generation(), 5);

    let wrong = Grid::new(6, 8);
    assert!(matches!(
        life.import_grid(&wrong),
        Err(Error::ShapeMismatch {
            expected: (8, 6),
            found: (6, 8)
        })
    ));
}

#[test]
fn test_statistics_sums() {
    let mut brain = create_automaton("brians_brain", 30, 20, &AutomatonOptions::new()).unwrap();
    brain.run(3).unwrap();
    let stats = brain.compute_statistics();

    let total: usize = stats.state_counts.values().sum();
    assert_eq!(total, 600);
    assert_eq!(stats.total_cells, 600);
    assert_eq!(stats.active_cells, 600 - stats.count(0));
    assert!((stats.density - stats.active_cells as f64 / 6.0).abs() < 1e-9);
    assert!(stats.entropy >= 0.0 && stats.entropy <= 3.0_f64.log2() + 1e-9);
    assert_eq!(stats.unique_states, stats.state_counts.len());
}

#[test]
fn test_blinker_period_two() {
    let mut life = create_automaton("game_of_life", 5, 5, &AutomatonOptions::new()).unwrap();
    let horizontal = grid(&[
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 1, 1, 1, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
    ]);
    life.import_grid(&horizontal).unwrap();

    life.step().unwrap();
    assert_ne!(life.export_grid(), horizontal);
    assert_eq!(life.get_cell(2, 1), 1);
    assert_eq!(life.get_cell(2, 3), 1);

    life.step().unwrap();
    assert_eq!(life.export_grid(), horizontal);
}

#[test]
fn test_rule_90_sierpinski() {
    let (width, height) = (129, 64);
    let mut automaton = create_automaton("rule_90", width, height, &AutomatonOptions::new()).unwrap();
    automaton.run(1000).unwrap();
    assert!(automaton.is_exhausted());
    assert_eq!(automaton.generation(), height as u64 - 1);

    let center = width / 2;
    for y in 0..height {
        for x in 0..width {
            let k = x as i64 - center as i64;
            let n = y as i64;
            let expected = if k.abs() <= n && (n + k) % 2 == 0 {
                // Lucas: C(n, m) is odd iff m is a bit-subset of n
                let m = (n + k) / 2;
                u8::from(m & n == m)
            } else {
                0
            };
            assert_eq!(automaton.get_cell(x, y), expected, "cell ({}, {})", x, y);
        }
    }
}

#[test]
fn test_wireworld_signal_moves_along_wire() {
    let mut wire = create_automaton("wireworld", 8, 3, &AutomatonOptions::new()).unwrap();
    // tail then head at the left end of a straight wire
    wire.import_grid(&grid(&[
        &[0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 3, 2, 1, 1, 1, 1, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0],
    ]))
    .unwrap();

    for expected_head in 3..7 {
        wire.step().unwrap();
        assert_eq!(wire.get_cell(expected_head, 1), 2, "head at {}", expected_head);
        assert_eq!(wire.get_cell(expected_head - 1, 1), 3);
    }
    // the old tail has turned back into wire
    assert_eq!(wire.get_cell(1, 1), 1);
}

#[test]
fn test_birth_survival_table_equivalence() {
    let params = PatternParams::new().with_seed(77).with_density(0.4);
    let mut plain = LifeLike::new(24, 24, LifeFlavor::Conway).unwrap();
    plain.initialize_pattern("random", &params).unwrap();

    let mut tabled = LifeLike::new(24, 24, LifeFlavor::Conway).unwrap();
    tabled.initialize_pattern("random", &params).unwrap();
    let table = "B3/S23".parse::<BirthSurvival>().unwrap().to_table(2);
    tabled.load_rules(&RuleFile::from_totalistic(&table)).unwrap();

    for _ in 0..20 {
        plain.step().unwrap();
        tabled.step().unwrap();
        assert_eq!(plain.export_grid(), tabled.export_grid());
    }
}

#[test]
fn test_rule_file_roundtrip_both_kinds() {
    let dir = tempfile::tempdir().unwrap();

    let langton = create_automaton("langton_loop", 20, 20, &AutomatonOptions::new()).unwrap();
    let table_path = dir.path().join("langton.json");
    langton.export_rules().unwrap().save(&table_path).unwrap();

    let reloaded = create_automaton(
        "langton_loop",
        20,
        20,
        &AutomatonOptions::new().with_rule_file(&table_path),
    )
    .unwrap();
    assert_eq!(
        reloaded.export_rules().unwrap().rule_count(),
        langton.export_rules().unwrap().rule_count()
    );

    let table = BirthSurvival::parse("B36/S23").unwrap().to_table(2);
    let life_path = dir.path().join("highlife.json");
    RuleFile::from_totalistic(&table).save(&life_path).unwrap();
    let loaded = RuleFile::load(&life_path).unwrap();
    assert_eq!(loaded.to_totalistic().unwrap(), table);

    // a totalistic file cannot drive a pattern-table variant
    let err = create_automaton("langton_loop", 20, 20, &AutomatonOptions::new().with_rule_file(&life_path));
    assert!(matches!(err, Err(Error::UnsupportedRuleType { .. })));
}

#[test]
fn test_registry_fallback_on_unknown_pattern() {
    let options = AutomatonOptions::new()
        .with_pattern("no_such_pattern")
        .with_params(PatternParams::new().with_seed(5));
    let fallback = create_automaton("cyclic_ca", 40, 40, &options).unwrap();

    let default = create_automaton(
        "cyclic_ca",
        40,
        40,
        &AutomatonOptions::new().with_params(PatternParams::new().with_seed(5)),
    )
    .unwrap();
    assert_eq!(fallback.export_grid(), default.export_grid());

    assert!(matches!(
        create_automaton("langtons_ant", 10, 10, &AutomatonOptions::new()),
        Err(Error::UnknownVariant(_))
    ));
    assert_eq!(registry().len(), 15);
}

#[test]
fn test_every_variant_builds_and_steps() {
    let options = AutomatonOptions::new().with_params(PatternParams::new().with_seed(1));
    for factory in registry().iter() {
        let mut automaton = factory.create_automaton(48, 48, &options).unwrap();
        automaton.run(3).unwrap();

        let num_states = factory.metadata().num_states;
        assert!(automaton.grid().validate_states(num_states).is_ok(), "{}", factory.name());
        assert!(factory.colormap().len() >= num_states as usize, "{}", factory.name());
    }
}

#[test]
fn test_checkpoint_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("life.bin");
    let options = AutomatonOptions::new().with_rule("B36/S23").with_pattern("random");

    let mut life = create_automaton("life_like", 32, 32, &options).unwrap();
    life.run(10).unwrap();
    Checkpoint::capture("life_like", &options, life.as_mut())
        .unwrap()
        .save(&path)
        .unwrap();

    let mut restored = Checkpoint::load(&path).unwrap().restore().unwrap();
    assert_eq!(restored.generation(), 10);
    assert_eq!(restored.rule_label(), life.rule_label());

    life.run(10).unwrap();
    restored.run(10).unwrap();
    assert_eq!(restored.export_grid(), life.export_grid());
    assert_eq!(restored.generation(), 20);
}

#[test]
fn test_config_drives_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calab.yaml");
    std::fs::write(
        &path,
        "
automaton:
  variant: elementary
  width: 31
  height: 16
  options:
    rule_number: 150
simulation:
  speed_ms: 5
  max_generations: 8
  join_timeout_ms: 1000
",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    let setup = &config.automaton;
    let automaton = create_automaton(&setup.variant, setup.width, setup.height, &setup.options).unwrap();
    assert_eq!(automaton.rule_label(), "Rule 150");

    let mut engine = SimulationEngine::from_config(&config.simulation);
    engine.set_automaton(automaton);
    let (tx, rx) = mpsc::channel();
    engine.on_complete(move |reason| {
        let _ = tx.send(reason.clone());
    });
    engine.start().unwrap();

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), ExitReason::MaxGenerations);
    engine.stop().unwrap();
    assert_eq!(engine.inspect(|a| a.generation()), Some(8));
}

#[test]
fn test_batch_export() {
    let dir = tempfile::tempdir().unwrap();
    let params = vec![
        BatchParams::new("seeds", 20, 20),
        BatchParams::new("wireworld", 30, 20),
        BatchParams::new("elementary", 21, 10).with_options(AutomatonOptions::new().with_rule_number(30)),
    ];

    let mut runner: BatchRunner = BatchRunner::new();
    runner.run_registry(&params, 5).unwrap();
    runner.export_json(dir.path().join("batch.json")).unwrap();
    runner.export_csv(dir.path().join("batch.csv")).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("batch.json")).unwrap()).unwrap();
    let runs = json.as_array().unwrap();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[2]["parameters"]["options"]["rule_number"], 30);
    assert_eq!(runs[2]["final_generation"], 5);
    assert_eq!(runs[1]["final_grid"].as_array().unwrap().len(), 20);

    let csv = std::fs::read_to_string(dir.path().join("batch.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn test_engine_start_twice_single_worker() {
    let life = create_automaton("game_of_life", 20, 20, &AutomatonOptions::new().with_pattern("glider")).unwrap();
    let mut engine = fast_engine(life);
    engine.set_max_generations(Some(30));

    let steps = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&steps);
    engine.on_step(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    engine.start().unwrap();
    engine.start().unwrap();
    assert!(wait_for(|| !engine.is_running()));
    engine.stop().unwrap();

    assert_eq!(steps.load(Ordering::SeqCst), 30);
    assert_eq!(engine.inspect(|a| a.generation()), Some(30));
}

#[test]
fn test_engine_pause_resume_continuity() {
    let brain = create_automaton("brians_brain", 40, 40, &AutomatonOptions::new()).unwrap();
    let mut engine = fast_engine(brain);
    let generations = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&generations);
    engine.on_step(move |event| sink.lock().push(event.generation));

    engine.start().unwrap();
    assert!(wait_for(|| generations.lock().len() >= 5));
    engine.pause();
    assert!(wait_for(|| engine.state() == SimState::Paused));

    // no steps while paused, once the in-flight step has landed
    thread::sleep(Duration::from_millis(20));
    let frozen = generations.lock().len();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(generations.lock().len(), frozen);

    engine.resume();
    assert!(wait_for(|| generations.lock().len() >= frozen + 5));
    engine.stop().unwrap();

    let seen = generations.lock();
    for pair in seen.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn test_step_once_serializes_with_worker() {
    let cyclic = create_automaton(
        "cyclic_ca",
        30,
        30,
        &AutomatonOptions::new().with_params(PatternParams::new().with_seed(8)),
    )
    .unwrap();
    let mut engine = fast_engine(cyclic);
    engine.set_max_generations(Some(200));
    engine.start().unwrap();

    let mut manual = 0;
    while engine.is_running() && manual < 20 {
        engine.step_once().unwrap();
        manual += 1;
    }
    assert!(wait_for(|| !engine.is_running()));
    engine.stop().unwrap();

    // every step, manual or worker, advanced the generation exactly once
    let status = engine.get_status();
    assert_eq!(status.generation, status.total_steps);
    assert_eq!(status.state, SimState::Stopped);
}

#[test]
fn test_engine_stops_on_exhausted_row_advance() {
    let rule = create_automaton("rule_30", 15, 6, &AutomatonOptions::new()).unwrap();
    let mut engine = fast_engine(rule);
    let (tx, rx) = mpsc::channel();
    engine.on_complete(move |reason| {
        let _ = tx.send(reason.clone());
    });

    engine.start().unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), ExitReason::Exhausted);
    engine.stop().unwrap();
    assert_eq!(engine.get_status().generation, 5);
}
