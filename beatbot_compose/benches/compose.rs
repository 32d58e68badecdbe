// Benchmarks for the rhythm generators and full part composition.
//
// Run with `cargo bench -p beatbot_compose`. Every iteration uses a fixed
// seed; composition benches build a fresh uniqueness cache per iteration so
// the retry loop does the same work each time.

use beatbot_compose::config::EngineConfig;
use beatbot_compose::genetic::GeneticRhythm;
use beatbot_compose::rhythm::{AlgorithmKind, RhythmAlgorithm, euclidean};
use beatbot_compose::uniqueness::UniquenessCache;
use beatbot_compose::{Composer, Request, Role};
use beatbot_prng::PatternRng;
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

fn bench_generators(c: &mut Criterion) {
    c.bench_function("euclidean_7_of_32", |b| {
        b.iter(|| euclidean(black_box(7), black_box(32), 3))
    });

    let config = EngineConfig::default();
    c.bench_function("genetic_run_16", |b| {
        b.iter(|| {
            let mut rng = PatternRng::new(17);
            let mut evolver = GeneticRhythm::new(config.genetic.clone(), config.fitness.clone());
            evolver.initialize_population(16, &mut rng).ok();
            evolver.run(config.genetic.max_generations, &mut rng)
        })
    });

    let mut group = c.benchmark_group("algorithm");
    for kind in AlgorithmKind::ALL {
        group.bench_function(kind.name(), |b| {
            let mut rng = PatternRng::new(99);
            b.iter(|| {
                let alg = RhythmAlgorithm::random(kind, 16, &config, &mut rng);
                alg.generate(16, &mut rng)
            })
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    for (name, role) in [("compose_kick", Role::Kick), ("compose_melody", Role::Melody)] {
        let request = Request::new(role, "techno")
            .with_mood("dark")
            .with_bars(8, 16)
            .with_seed(2024);
        c.bench_function(name, |b| {
            b.iter_batched(
                || UniquenessCache::new(1024),
                |cache| {
                    let composer = Composer::with_cache(EngineConfig::default(), &cache);
                    composer.compose(&request).map(|r| r.notes.len())
                },
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, bench_generators, bench_compose);
criterion_main!(benches);
