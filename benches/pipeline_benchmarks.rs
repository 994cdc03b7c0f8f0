use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use graphly::algo::{louvain, LouvainConfig};
use graphly::{FeatureMatrix, Pipeline, PipelineConfig, SimilarityGraph, SimilarityMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn dataset(rows: usize, features: usize) -> FeatureMatrix {
    let mut rng = StdRng::seed_from_u64(1);
    let data = (0..rows)
        .map(|r| {
            (0..features)
                .map(|j| ((r % 5) * (j + 1)) as f64 + rng.gen_range(0.0..2.0))
                .collect()
        })
        .collect();
    FeatureMatrix::from_rows_positional(data).unwrap()
}

/// Benchmark thresholded cosine similarity construction
fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity_matrix");

    for size in [100, 500, 1000].iter() {
        let matrix = dataset(*size, 8);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| SimilarityMatrix::build(&matrix, 0.9).unwrap());
        });
    }
    group.finish();
}

/// Benchmark Louvain on the giant component
fn bench_louvain(c: &mut Criterion) {
    let mut group = c.benchmark_group("louvain");

    for size in [100, 500, 1000].iter() {
        let matrix = dataset(*size, 8);
        let sim = SimilarityMatrix::build(&matrix, 0.95).unwrap();
        let graph = SimilarityGraph::build(&sim).unwrap();
        let config = LouvainConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| louvain(graph.giant_component(), &config).unwrap());
        });
    }
    group.finish();
}

/// Benchmark a full raw-mode run, centralities included
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for size in [100, 300].iter() {
        let matrix = dataset(*size, 8);
        let pipeline = Pipeline::new(PipelineConfig::default().with_threshold(0.95)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| pipeline.run(&matrix).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_similarity, bench_louvain, bench_pipeline);
criterion_main!(benches);
