//! Benchmark scoring overhead of candidate ranking

use criterion::{Criterion, criterion_group, criterion_main};
use oxiz_ml::models::{Objective, RegressionTree, ScoringModel, SigmoidModel, TreeEnsemble};
use oxiz_ml::ranking::{LocalShuffle, TermFeatures, ranked_permutation};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

fn candidate_features(count: usize) -> Vec<[f64; 4]> {
    (0..count)
        .map(|i| TermFeatures::new(i, i / 16, i % 3 == 0, 1 + i % 5).to_vector())
        .collect()
}

fn benchmark_sigmoid_prediction(c: &mut Criterion) {
    let model = SigmoidModel::from_coefficients(vec![0.1, -0.02, -0.3, 1.5, -0.4]).unwrap();
    let features = TermFeatures::new(12, 2, true, 3).to_vector();

    c.bench_function("sigmoid_predict", |b| {
        b.iter(|| model.predict(black_box(&features)));
    });
}

fn benchmark_ensemble_prediction(c: &mut Criterion) {
    let trees = (0..100)
        .map(|i| RegressionTree::constant(i as f64 * 0.01))
        .collect();
    let model = TreeEnsemble::new(trees, 4, Objective::RAW).unwrap();
    let features = TermFeatures::new(12, 2, true, 3).to_vector();

    c.bench_function("ensemble_predict_100_trees", |b| {
        b.iter(|| model.predict(black_box(&features)));
    });
}

fn benchmark_ranking(c: &mut Criterion) {
    let model = SigmoidModel::from_coefficients(vec![0.1, -0.02, -0.3, 1.5, -0.4]).unwrap();
    let candidates = candidate_features(1000);

    c.bench_function("rank_1000_candidates", |b| {
        b.iter(|| {
            let scores: Vec<f64> = candidates.iter().map(|f| model.predict(f)).collect();
            ranked_permutation(black_box(&scores))
        });
    });
}

fn benchmark_local_shuffle(c: &mut Criterion) {
    let shuffle = LocalShuffle::new(0.3, 0.5).unwrap();

    c.bench_function("local_shuffle_1000", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(11);
            shuffle.permutation(black_box(1000), &mut rng)
        });
    });
}

criterion_group!(
    benches,
    benchmark_sigmoid_prediction,
    benchmark_ensemble_prediction,
    benchmark_ranking,
    benchmark_local_shuffle
);
criterion_main!(benches);
