use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opencv::{
    core::{Mat, Rect, Scalar, CV_8UC3},
    imgproc,
};
use scan_treads::analysis::symmetry_score_mirror;
use scan_treads::detection::CenterlineLocator;
use scan_treads::{pipeline, PipelineConfig};

/// 400x200 tread-like region with four grooves.
fn sample_region() -> Mat {
    let mut img =
        Mat::new_rows_cols_with_default(200, 400, CV_8UC3, Scalar::all(255.0)).unwrap();
    for cx in [80, 160, 240, 320] {
        imgproc::rectangle(
            &mut img,
            Rect::new(cx - 5, 0, 11, 200),
            Scalar::all(20.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
    }
    img
}

fn benchmark_centerline(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let locator = CenterlineLocator::new(&config.centerline, &config.land_sea);
    let region = sample_region();

    c.bench_function("centerline_locate_400x200", |b| {
        b.iter(|| locator.locate(black_box(&region)).unwrap())
    });
}

fn benchmark_symmetry(c: &mut Criterion) {
    let region = sample_region();

    c.bench_function("symmetry_score_shift20_400x200", |b| {
        b.iter(|| symmetry_score_mirror(black_box(&region), 200, 20).unwrap())
    });
}

fn benchmark_full_inspection(c: &mut Criterion) {
    let mut config = PipelineConfig::default();
    config.crop.enabled = false;
    let region = sample_region();

    c.bench_function("inspect_mat_full_frame_400x200", |b| {
        b.iter(|| pipeline::inspect_mat(black_box(&region), &config).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_centerline,
    benchmark_symmetry,
    benchmark_full_inspection
);
criterion_main!(benches);
