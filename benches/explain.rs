use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use placement_insight::explainability::{
    global_importance, ExplainerConfig, ExplainerContext, LinearExplainer, LinearModel, ModelKind,
};
use placement_insight::preprocessing::{FeatureEncoder, StudentRecord, N_FEATURES};
use placement_insight::synthetic::generate_background;
use rand::prelude::*;

fn random_model(seed: u64) -> LinearModel {
    let mut rng = StdRng::seed_from_u64(seed);
    let weights: Array1<f64> = (0..N_FEATURES).map(|_| rng.gen_range(-1.0..1.0)).collect();
    LinearModel::classifier(weights, rng.gen_range(-5.0..5.0))
}

fn bench_background(c: &mut Criterion) {
    let mut group = c.benchmark_group("background");
    for n in [100usize, 1000, 10000] {
        group.bench_with_input(BenchmarkId::new("generate", n), &n, |b, &n| {
            b.iter(|| generate_background(black_box(n), 42).unwrap())
        });
    }
    group.finish();
}

fn bench_explain(c: &mut Criterion) {
    let ctx = ExplainerContext::new(
        FeatureEncoder::default(),
        random_model(1),
        random_model(2),
        ExplainerConfig::default(),
    )
    .unwrap();
    let record = StudentRecord::example();

    c.bench_function("explain_one", |b| {
        b.iter(|| ctx.explain_one(ModelKind::Placement, black_box(&record)).unwrap())
    });

    let mut group = c.benchmark_group("explain_batch");
    for n in [100usize, 1000] {
        let background = generate_background(n, 7).unwrap();
        let explainer = LinearExplainer::new(random_model(3), &background).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &background, |b, bg| {
            b.iter(|| explainer.explain_batch(black_box(bg.data())).unwrap())
        });
    }
    group.finish();
}

fn bench_importance(c: &mut Criterion) {
    let background = generate_background(1000, 42).unwrap();
    let model = random_model(4);
    c.bench_function("global_importance_1000", |b| {
        b.iter(|| global_importance(black_box(&model), &background).unwrap())
    });
}

criterion_group!(benches, bench_background, bench_explain, bench_importance);
criterion_main!(benches);
