//! Selection and breeding benchmarks
//!
//! Selection runs once per generation on the control task, so these mostly
//! guard against accidental quadratic behavior as swarms grow.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ember_common::{AgentId, Genome, TelemetrySnapshot};
use ember_darwinian::{FitnessCalculator, GenerationSummary, SelectionPressure, Selector};
use ember_swarm::PopulationView;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn population_view(size: usize) -> PopulationView {
    let mut rng = StdRng::seed_from_u64(5);
    PopulationView::from_entries((0..size).map(|i| {
        // Every tenth bot is unreachable.
        let snapshot = (i % 10 != 0).then(|| {
            TelemetrySnapshot::new(
                rng.gen_bool(0.7),
                rng.gen_range(0.0..1800.0),
                rng.gen_range(0.0..100.0),
                Genome::new(rng.gen_range(0.01..1.0), rng.gen_range(0.5..2.0)),
            )
        });
        (AgentId(i), snapshot)
    }))
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for size in [9, 100, 1_000, 10_000].iter() {
        let view = population_view(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("agents", size), &view, |b, view| {
            b.iter(|| FitnessCalculator::rank(black_box(view)))
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    let selector = Selector::new(SelectionPressure::new(0.33).unwrap());

    for size in [9, 100, 1_000, 10_000].iter() {
        let view = population_view(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("agents", size), &view, |b, view| {
            let mut rng = StdRng::seed_from_u64(17);
            b.iter(|| selector.select(black_box(view), *size, &mut rng).unwrap())
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let view = population_view(1_000);
    c.bench_function("summary/1000", |b| {
        b.iter(|| GenerationSummary::from_view(black_box(3), black_box(&view)))
    });
}

criterion_group!(benches, bench_rank, bench_select, bench_summary);
criterion_main!(benches);
