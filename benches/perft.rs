use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sachy::{AttackTables, Game, MAGIC_SEED};

fn perft_benchmark(c: &mut Criterion) {
    let tables = AttackTables::new();

    // Starting position perft benchmarks
    let mut group = c.benchmark_group("perft_starting_position");
    group
        .significance_level(0.1)
        .sample_size(1_000)
        .measurement_time(std::time::Duration::from_secs(20));

    // We want a high sample count, otherwise it's too noisy
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut game = Game::new(None).unwrap();
                black_box(game.perft_count(depth, &tables))
            });
        });
    }
    group.finish();

    // Table construction runs the full magic number search
    let mut group = c.benchmark_group("magic_table_construction");
    group.sample_size(10);

    group.bench_function("with_seed", |b| {
        b.iter(|| black_box(AttackTables::with_seed(MAGIC_SEED)));
    });
    group.finish();
}

criterion_group!(benches, perft_benchmark);
criterion_main!(benches);
