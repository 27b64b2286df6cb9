/// Benchmarks for partition planning
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kmerdex_bio::SubstringRecord;
use kmerdex_partition::{Planner, PlannerOptions};
use std::hint::black_box;

fn corpus(n: usize) -> Vec<SubstringRecord> {
    kmerdex_test::skewed_corpus(n, 7, 100_000, 42)
        .into_iter()
        .map(|(s, c)| SubstringRecord::new(s, c))
        .collect()
}

fn bench_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("planning");
    group.sample_size(10);

    for size in [1_000, 4_000, 16_384] {
        let records = corpus(size);
        let planner = Planner::new(PlannerOptions {
            partitions: 64,
            repetitions: 1,
            seed: Some(1),
        })
        .unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| planner.plan(black_box(records)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_planning);
criterion_main!(benches);
