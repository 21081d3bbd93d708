//! Benchmarks for ensemble training and per-query prediction.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docrec::data::Dataset;
use docrec::prelude::*;
use std::path::PathBuf;

fn bundled_config() -> DocrecConfig {
    DocrecConfig::default().with_data_dir(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

fn load_dataset(config: &DocrecConfig) -> Dataset {
    Dataset::load(
        &config.symptom_path(),
        &config.specialist_path(),
        &config.description_path(),
    )
    .expect("bundled dataset")
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble_train");
    group.sample_size(10);

    for n_estimators in [10, 100].iter() {
        let mut config = bundled_config();
        config.ensemble = config.ensemble.with_n_estimators(*n_estimators);
        let dataset = load_dataset(&config);

        group.bench_with_input(
            BenchmarkId::from_parameter(n_estimators),
            n_estimators,
            |b, _| {
                b.iter(|| InferenceContext::build(black_box(dataset.clone()), &config).expect("trains"));
            },
        );
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");

    for voting in [Voting::Hard, Voting::Soft] {
        let config = bundled_config().with_voting(voting);
        let context = InferenceContext::load(&config).expect("trains");
        let query = PredictionQuery::new(["chills", "high_fever", "headache", "vomiting"], 20)
            .expect("query");

        group.bench_with_input(BenchmarkId::from_parameter(voting), &voting, |b, _| {
            b.iter(|| context.diagnose(black_box(&query)).expect("known symptoms"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_train, bench_predict);
criterion_main!(benches);
