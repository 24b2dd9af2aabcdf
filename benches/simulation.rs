//! Performance benchmarks for calab

use calab::neighborhood::{self, NeighborhoodKind};
use calab::rules::{BirthSurvival, ElementaryRule};
use calab::{create_automaton, AutomatonOptions, Grid, PatternParams};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn seeded() -> AutomatonOptions {
    AutomatonOptions::new().with_params(PatternParams::new().with_seed(42))
}

fn benchmark_life_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("life_step");

    for size in [64usize, 128, 256].iter() {
        let mut life = create_automaton("game_of_life", *size, *size, &seeded().with_pattern("random")).unwrap();

        group.bench_with_input(BenchmarkId::new("grid", size), size, |b, _| {
            b.iter(|| {
                life.step().unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("variant_step");

    for variant in ["brians_brain", "wireworld", "cyclic_ca", "langton_loop"] {
        let mut automaton = create_automaton(variant, 128, 128, &seeded()).unwrap();

        group.bench_function(variant, |b| {
            b.iter(|| {
                automaton.step().unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_rules(c: &mut Criterion) {
    let rule = BirthSurvival::parse("B36/S23").unwrap();
    c.bench_function("birth_survival_lookup", |b| {
        b.iter(|| {
            for count in 0..=8u8 {
                black_box(rule.born(black_box(count)) || rule.survives(black_box(count)));
            }
        });
    });

    let elementary = ElementaryRule::new(110);
    let row: Vec<u8> = (0..1024).map(|i| ((i * 7) % 3 == 0) as u8).collect();
    c.bench_function("elementary_next_row_1024", |b| {
        b.iter(|| elementary.next_row(black_box(&row)));
    });
}

fn benchmark_neighborhood(c: &mut Criterion) {
    let mut grid = Grid::new(128, 128);
    for i in 0..128 {
        grid.set(i, (i * 3) % 128, 1);
    }

    c.bench_function("moore_resolve_full_grid", |b| {
        b.iter(|| {
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    black_box(neighborhood::resolve(&grid, x, y, NeighborhoodKind::Moore).unwrap());
                }
            }
        });
    });
}

fn benchmark_statistics(c: &mut Criterion) {
    let mut automaton = create_automaton("cyclic_ca", 256, 256, &seeded()).unwrap();

    c.bench_function("statistics_256", |b| {
        b.iter(|| black_box(automaton.compute_statistics()));
    });
}

criterion_group!(
    benches,
    benchmark_life_step,
    benchmark_variants,
    benchmark_rules,
    benchmark_neighborhood,
    benchmark_statistics,
);

criterion_main!(benches);
