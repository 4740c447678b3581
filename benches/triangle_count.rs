//! Benchmarks for the masked kernel and end-to-end triangle counting

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use llt::{
    abt_mask_no_accum, count_triangles, KernelConfig, MatrixBuilder, ShardedSparseMatrix,
    StagingMode,
};

/// Banded graph: every vertex linked to its `width` predecessors
fn banded_edges(n: usize, width: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i.saturating_sub(width)..i).map(move |j| (i, j)))
        .collect()
}

fn build(n: usize, shards: usize, edges: &[(usize, usize)]) -> ShardedSparseMatrix<i64> {
    MatrixBuilder::create(n, shards)
        .and_then(|b| b.build_sharded(edges))
        .expect("benchmark graph is valid")
}

/// Kernel time as the shard and worker counts grow
fn bench_kernel_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_scaling");
    let n = 20_000;
    let edges = banded_edges(n, 16);

    for &(shards, workers) in &[(1, 1), (2, 2), (4, 4), (8, 4), (16, 8)] {
        let l = build(n, shards, &edges);
        let config = KernelConfig::new(shards, workers).with_threads(shards.min(num_cpus::get()));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("P{}_W{}", shards, workers)),
            &l,
            |bencher, l| bencher.iter(|| black_box(abt_mask_no_accum(l, l, l, &config).unwrap())),
        );
    }

    group.finish();
}

/// Direct merge-join versus staging B rows through the scratch buffer
fn bench_staging(c: &mut Criterion) {
    let mut group = c.benchmark_group("staging");
    let n = 20_000;
    let l = build(n, 4, &banded_edges(n, 32));

    for staging in [StagingMode::Direct, StagingMode::Scratch] {
        let config = KernelConfig::new(4, 4).with_staging(staging);
        group.bench_function(format!("{:?}", staging), |bencher| {
            bencher.iter(|| black_box(abt_mask_no_accum(&l, &l, &l, &config).unwrap()))
        });
    }

    group.finish();
}

/// Build, multiply and reduce together
fn bench_count_triangles(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_triangles");
    let config = KernelConfig::default();

    for &n in &[1_000, 10_000, 50_000] {
        let edges = banded_edges(n, 8);
        group.bench_with_input(BenchmarkId::from_parameter(n), &edges, |bencher, edges| {
            bencher.iter(|| black_box(count_triangles(n, edges, &config).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kernel_scaling, bench_staging, bench_count_triangles);
criterion_main!(benches);
