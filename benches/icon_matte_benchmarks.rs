//! Performance benchmarks for icon-matte
//!
//! This benchmark suite measures matting, the refinement toolkit and every
//! quality method on icon-sized inputs to track regressions.

use criterion::*;
use icon_matte::{
    matte, process_image, AlphaFilter, BlurSharpen, ContourSmooth, EdgeRefineExt,
    GaussianAlphaBlur, MatteSource, Morphology, PixelBuffer, ProcessingOptions, QualityMethod,
    Subpixel, Supersample, Vectorize,
};
use image::{Rgb, Rgba};
use itertools::iproduct;
use std::hint::black_box;

/// Helper function to create a round icon on a light backdrop
fn create_icon(size: u32) -> PixelBuffer {
    let mut image = PixelBuffer::from_pixel(size, size, Rgba([245, 245, 245, 255]));
    let center = size as f32 / 2.0;
    let radius = size as f32 * 0.4;

    iproduct!(0..size, 0..size).for_each(|(y, x)| {
        let distance = (x as f32 + 0.5 - center).hypot(y as f32 + 0.5 - center);
        if distance <= radius {
            let shade = ((x * 255) / size) as u8;
            image.put_pixel(x, y, Rgba([shade, 60, 200, 255]));
        }
    });

    image
}

/// Helper function to create the matching bare backdrop
fn create_backdrop(size: u32) -> PixelBuffer {
    PixelBuffer::from_pixel(size, size, Rgba([245, 245, 245, 255]))
}

/// Benchmark both matting modes across icon sizes
fn bench_matting(c: &mut Criterion) {
    let sizes = vec![64, 256, 1024];

    let mut group = c.benchmark_group("matting");
    group.sample_size(10);

    for size in sizes {
        group.throughput(Throughput::Elements(u64::from(size * size)));
        let image = create_icon(size);
        let backdrop = create_backdrop(size);

        group.bench_with_input(
            BenchmarkId::new("reference", format!("{size}x{size}")),
            &(image.clone(), backdrop),
            |b, (img, reference)| {
                b.iter(|| black_box(matte(img, MatteSource::Reference(reference), 30).unwrap()))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("color_key", format!("{size}x{size}")),
            &image,
            |b, img| {
                b.iter(|| {
                    black_box(matte(img, MatteSource::Color(Rgb([245, 245, 245])), 30).unwrap())
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the refinement toolkit chained the way the pipeline runs it
fn bench_refinement(c: &mut Criterion) {
    let mut group = c.benchmark_group("refinement");
    group.sample_size(10);

    for size in [64, 256, 1024] {
        group.throughput(Throughput::Elements(u64::from(size * size)));
        let cut = matte(&create_icon(size), MatteSource::Auto, 30).unwrap();

        group.bench_with_input(
            BenchmarkId::new("toolkit_chain", format!("{size}x{size}")),
            &cut,
            |b, img| {
                b.iter(|| {
                    black_box(
                        img.clone()
                            .smooth_edges()
                            .remove_light_edges()
                            .erode_edges(1)
                            .unwrap()
                            .cleanup_edges(),
                    )
                })
            },
        );
    }

    group.finish();
}

/// Benchmark every quality method on a matted 256x256 icon
fn bench_quality_methods(c: &mut Criterion) {
    let cut = matte(&create_icon(256), MatteSource::Auto, 30).unwrap();
    let methods: Vec<QualityMethod> = vec![
        Supersample::new(4).unwrap().into(),
        GaussianAlphaBlur::new(2, 1).unwrap().into(),
        Morphology::new(1, 1).unwrap().into(),
        Subpixel::new(10, 0.5, 150).unwrap().into(),
        BlurSharpen::new(2, 150, 10).unwrap().into(),
        ContourSmooth::new(2, 0.5).unwrap().into(),
        Vectorize::new(27, 2).unwrap().into(),
    ];

    let mut group = c.benchmark_group("quality_methods");
    group.sample_size(10);
    group.throughput(Throughput::Elements(256 * 256));

    for method in methods {
        group.bench_with_input(BenchmarkId::new(method.name(), "256x256"), &cut, |b, img| {
            b.iter(|| black_box(method.apply(img)))
        });
    }

    group.finish();
}

/// Benchmark the full pipeline with default options
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for size in [64, 256] {
        let image = create_icon(size);
        let backdrop = create_backdrop(size);
        let options = ProcessingOptions::new()
            .with_remove_light_edges(true)
            .with_edge_cleanup(true);

        group.bench_with_input(
            BenchmarkId::new("process_image", format!("{size}x{size}")),
            &(image, backdrop),
            |b, (img, reference)| {
                b.iter(|| black_box(process_image(img, Some(reference), &options).unwrap()))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_matting,
    bench_refinement,
    bench_quality_methods,
    bench_pipeline,
);
criterion_main!(benches);
