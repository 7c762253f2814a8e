//! Criterion benchmarks for trending score computation.
//!
//! Scores simulated interaction logs of increasing size around a fixed query
//! point to track how ranking cost grows with traffic.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package newsdesk-trending
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use geo::Coord;
use newsdesk_core::test_support::{reference_time, sample_articles};
use newsdesk_trending::{
    InteractionSeeder, InteractionSimulator, SimulationConfig, TrendingConfig, TrendingScorer,
};

/// Seed for deterministic interaction logs.
const BENCHMARK_SEED: u64 = 42;

/// Interaction log sizes to benchmark.
const EVENT_COUNTS: &[usize] = &[1_000, 10_000, 100_000];

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("trending_score");
    let scorer = TrendingScorer::new(&TrendingConfig::default());
    let centre = Coord { x: -122.42, y: 37.77 };
    let articles = sample_articles();

    for &events in EVENT_COUNTS {
        let config = SimulationConfig {
            events,
            ..SimulationConfig::default()
        };
        let Ok(mut simulator) = InteractionSimulator::seeded(BENCHMARK_SEED, config) else {
            panic!("benchmark simulation config must be valid");
        };
        let log = simulator.seed(&articles, reference_time());

        group.throughput(Throughput::Elements(u64::try_from(events).unwrap_or(u64::MAX)));
        group.bench_with_input(BenchmarkId::from_parameter(events), &log, |b, log| {
            b.iter(|| scorer.score(log, centre, reference_time()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scoring);
criterion_main!(benches);
