//! Benchmarks for oracle and counting circuit construction
//!
//! Run with: cargo bench -p qsum-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qsum_core::{
    Encoding, GroverIterator, ProblemInstance, QuantumCounter, default_counting_qubits, oracle_for,
};

fn instances() -> Vec<ProblemInstance> {
    [
        (vec![1, 2, 3, 4], 5),
        (vec![5, 7, 8, 9, 1], 16),
        (vec![3, 34, 4, 12, 5, 2], 9),
        (vec![11, 6, 5, 1, 7, 13, 12, 2], 20),
    ]
    .into_iter()
    .map(|(numbers, target)| ProblemInstance::new(numbers, target).unwrap())
    .collect()
}

fn bench_oracle(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracle");

    for instance in instances() {
        for encoding in [Encoding::Optimized, Encoding::Unoptimized] {
            let builder = oracle_for(encoding, None);
            group.bench_with_input(
                BenchmarkId::new(encoding.as_str(), instance.len()),
                &instance,
                |b, inst| {
                    b.iter(|| builder.build(black_box(inst)).unwrap());
                },
            );
        }
    }

    group.finish();
}

fn bench_counting(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting");
    group.sample_size(10);

    for instance in instances().into_iter().take(2) {
        let builder = oracle_for(Encoding::Optimized, None);
        let grover = GroverIterator::new(builder.as_ref(), &instance).unwrap();
        let counter = QuantumCounter::new(default_counting_qubits(instance.index_width()));

        group.bench_with_input(
            BenchmarkId::new("circuit", instance.len()),
            &grover,
            |b, grover| {
                b.iter(|| counter.circuit(black_box(grover)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oracle, bench_counting);
criterion_main!(benches);
