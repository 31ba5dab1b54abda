use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::RgbImage;

use photo_booth::camera::Frame;
use photo_booth::filters::FilterRegistry;

fn camera_frame() -> Frame {
    Frame::new(RgbImage::from_fn(640, 480, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn bench_filters(c: &mut Criterion) {
    let registry = FilterRegistry::new();
    let frame = camera_frame();

    let mut group = c.benchmark_group("filters_640x480");
    for name in ["grayscale", "sepia", "blur"] {
        group.bench_function(name, |b| b.iter(|| registry.apply(black_box(&frame), name)));
    }
    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
