//! Basic benchmarks for the containers and the allocator of the `pod_containers` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use criterion::{Criterion, criterion_group, criterion_main};
use pod_containers::{BlockVec, PodAllocator, PodArray};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type TestItem = u64;
const TEST_VALUE: TestItem = 1024;

const FILL_COUNT: usize = 10_000;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("pod_basic");

    group.bench_function("block_vec_add_first", |b| {
        b.iter_custom(|iters| {
            let mut sequences = iter::repeat_with(BlockVec::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let start = Instant::now();

            for sequence in &mut sequences {
                sequence.add(black_box(TEST_VALUE)).unwrap();
            }

            start.elapsed()
        });
    });

    group.bench_function("block_vec_fill_10k", |b| {
        b.iter(|| {
            let mut sequence = BlockVec::<TestItem>::new();

            for _ in 0..FILL_COUNT {
                sequence.add(black_box(TEST_VALUE)).unwrap();
            }

            black_box(sequence)
        });
    });

    group.bench_function("block_vec_read_10k", |b| {
        let mut sequence = BlockVec::<TestItem>::new();
        sequence
            .add_iter(iter::repeat_n(TEST_VALUE, FILL_COUNT))
            .unwrap();

        b.iter(|| {
            let mut sum: TestItem = 0;

            for index in 0..sequence.len() {
                sum = sum.wrapping_add(sequence[black_box(index)]);
            }

            black_box(sum)
        });
    });

    group.bench_function("pod_array_fill_10k", |b| {
        b.iter(|| {
            let mut array = PodArray::<TestItem>::with_capacity(FILL_COUNT, 0).unwrap();

            for _ in 0..FILL_COUNT {
                array.add(black_box(TEST_VALUE)).unwrap();
            }

            black_box(array)
        });
    });

    group.bench_function("block_vec_to_bytes_10k", |b| {
        let mut sequence = BlockVec::<TestItem>::new();
        sequence
            .add_iter(iter::repeat_n(TEST_VALUE, FILL_COUNT))
            .unwrap();

        b.iter(|| black_box(sequence.to_bytes()));
    });

    group.bench_function("allocator_small_spans", |b| {
        b.iter_custom(|iters| {
            let allocator = PodAllocator::new(PodAllocator::DEFAULT_BLOCK_SIZE);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(allocator.allocate(black_box(24), 8).unwrap());
            }

            start.elapsed()
        });
    });

    group.finish();
}
