use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reviewguard::{corpus, pipeline, Normalizer, TrainOptions, TrainedPipeline};

fn setup_benchmark_pipeline() -> TrainedPipeline {
    let base = corpus::synth::base_templates();
    let records = corpus::synth::enhance(&base, 5, 42);
    let prepared = corpus::prepare(&records, &corpus::CorpusOptions::default());
    let options = TrainOptions {
        c_grid: vec![1.0],
        ..TrainOptions::default()
    };
    pipeline::train(&prepared, &options).unwrap().0
}

fn bench_normalization(c: &mut Criterion) {
    let normalizer = Normalizer::new();
    let mut group = c.benchmark_group("Normalization");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_text", |b| {
        b.iter(|| normalizer.normalize(black_box("Great product, fast shipping!")))
    });

    group.bench_function("medium_text", |b| {
        b.iter(|| {
            normalizer.normalize(black_box(
                "I bought this last month after reading the reviews at \
                 https://example.com/reviews and it has worked reliably since. \
                 The batteries were included, the manual is clear, and support \
                 answered my question within a day. Would buy again.",
            ))
        })
    });

    let long_text = "Honestly this product exceeded my expectations in several ways. \
         The packaging was intact, the build quality feels solid, and after three \
         weeks of daily use there are no scratches or loose parts. "
        .repeat(10);
    group.bench_function("long_text", |b| {
        b.iter(|| normalizer.normalize(black_box(&long_text)))
    });

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let trained = setup_benchmark_pipeline();
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("single", |b| {
        b.iter(|| {
            trained
                .predict(black_box(
                    "Works fine after two weeks of daily use. Would buy again.",
                ))
                .unwrap()
        })
    });

    let batch: Vec<String> = corpus::synth::base_templates()
        .iter()
        .map(|r| r.review.clone())
        .collect();
    group.bench_function("batch_20", |b| {
        b.iter(|| trained.predict_batch(black_box(&batch)).unwrap())
    });

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let base = corpus::synth::base_templates();
    let records = corpus::synth::enhance(&base, 3, 42);
    let prepared = corpus::prepare(&records, &corpus::CorpusOptions::default());
    let options = TrainOptions {
        c_grid: vec![1.0],
        ..TrainOptions::default()
    };

    let mut group = c.benchmark_group("Training");
    group.sample_size(10);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("small_corpus", |b| {
        b.iter(|| pipeline::train(black_box(&prepared), &options).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_normalization, bench_prediction, bench_training);
criterion_main!(benches);
