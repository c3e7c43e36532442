use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glucast_core::{ForestModel, Node, Regressor, Tree, SCALE};

fn sample_model() -> ForestModel {
    // Minimal forest for benchmarking: one tree per hour bucket with a
    // single split on last glucose. Values are scaled by `SCALE` (1e6).
    let trees = (0..100)
        .map(|_| {
            Tree::new(vec![
                Node::internal(3, 120 * SCALE, 1, 2),
                Node::leaf(110 * SCALE),
                Node::leaf(140 * SCALE),
            ])
        })
        .collect();

    ForestModel::new(4, trees, vec![0, 0, 0, SCALE])
}

fn bench_forest_prediction(c: &mut Criterion) {
    let model = sample_model();
    let features = vec![
        black_box(8 * SCALE),
        black_box(2 * SCALE),
        black_box(SCALE),
        black_box(118 * SCALE),
    ];

    c.bench_function("forest_predict", |b| {
        b.iter(|| {
            let prediction = model.predict(black_box(&features));
            black_box(prediction);
        });
    });
}

criterion_group!(core_benches, bench_forest_prediction);
criterion_main!(core_benches);
