use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array1;

use syzygy_view::constants::TAU;
use syzygy_view::{compose_frame, fold, FrameConfig, LimbDarkening, Trajectory, TransitSystem};

/// Circular orbit sampled `n` times, dimming while in front of the star
fn make_orbit(n: usize) -> Trajectory {
    let phases: Vec<f64> = (0..n).map(|i| TAU * i as f64 / n as f64).collect();
    let x: Vec<f64> = phases.iter().map(|p| 8.0 * p.sin()).collect();
    let z: Vec<f64> = phases.iter().map(|p| -8.0 * p.cos()).collect();
    let flux = x
        .iter()
        .zip(z.iter())
        .map(|(x, z)| if x.abs() < 1.0 && *z < 0.0 { 0.99 } else { 1.0 })
        .collect();
    Trajectory::from_vecs(
        phases.iter().map(|p| 5.0 * p / TAU).collect(),
        x,
        vec![-0.2; n],
        z,
        phases,
        flux,
    )
    .unwrap()
}

fn bench_intensities(c: &mut Criterion) {
    let ld = LimbDarkening::Kipping { q1: 0.4, q2: 0.3 };
    let radii: Array1<f64> = (0..10_000).map(|k| k as f64 / 9_999.0).collect();

    c.bench_function("limbdark/intensities_10k", |b| {
        b.iter(|| ld.intensities(black_box(&radii)).unwrap())
    });
}

fn bench_fold(c: &mut Criterion) {
    let orbit = make_orbit(100_000);

    c.bench_function("lightcurve/fold_100k", |b| {
        b.iter(|| fold(black_box(&orbit.time), black_box(&orbit.flux), 5.0).unwrap())
    });
}

fn bench_frame(c: &mut Criterion) {
    let orbit = make_orbit(5_000);
    let system = TransitSystem::new(LimbDarkening::default(), 0.1, 5.0).unwrap();
    let config = FrameConfig::default().with_trail(true).with_lightcurve(true);

    c.bench_function("frames/compose_frame_5k", |b| {
        b.iter(|| compose_frame(&orbit, &system, black_box(1.0), &config).unwrap())
    });
}

criterion_group!(benches, bench_intensities, bench_fold, bench_frame);
criterion_main!(benches);
