use criterion::{black_box, criterion_group, criterion_main, Criterion};

use visage_align::{fit_pose, SolverParams};

fn random_cloud(num_points: usize) -> Vec<[f64; 3]> {
    (0..num_points)
        .map(|_| {
            [
                rand::random::<f64>() - 0.5,
                rand::random::<f64>() - 0.5,
                rand::random::<f64>() - 0.5,
            ]
        })
        .collect()
}

fn bench_fit_pose(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_pose");

    // 68 landmarks, the reference face model size
    let source = random_cloud(68);
    let target = source
        .iter()
        .map(|p| [p[1] + 0.1, -p[0] + 0.2, p[2] + 0.3])
        .collect::<Vec<_>>();

    let params = SolverParams::default();

    group.bench_function("cold_start", |b| {
        b.iter(|| {
            fit_pose(
                black_box(&source),
                black_box(&target),
                None,
                black_box(&params),
            )
        })
    });

    let seed = fit_pose(&source, &target, None, &params).unwrap();
    group.bench_function("warm_start", |b| {
        b.iter(|| {
            fit_pose(
                black_box(&source),
                black_box(&target),
                Some(black_box(&seed)),
                black_box(&params),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_fit_pose);
criterion_main!(benches);
