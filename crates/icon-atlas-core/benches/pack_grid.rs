use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use icon_atlas_core::prelude::*;
use image::{Rgba, RgbaImage};

fn generate_icons(count: usize, edge: u32) -> Vec<IconImage> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let px = Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), 255]);
            IconImage::readable(
                format!("icon_{}", i),
                format!("icon_{}.png", i),
                RgbaImage::from_pixel(edge, edge, px),
            )
        })
        .collect()
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_grid");

    for count in [16usize, 100, 500] {
        let icons = generate_icons(count, 32);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("pack", count), &icons, |b, icons| {
            b.iter(|| black_box(pack(icons, 32)));
        });
    }

    group.finish();
}

fn bench_slice_rects(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_rects");

    for edge in [256u32, 1024, 2048] {
        group.bench_with_input(BenchmarkId::new("cells_32", edge), &edge, |b, &edge| {
            b.iter(|| black_box(grid_rects(edge, edge, (0, 0), 32, (0, 0))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack, bench_slice_rects);
criterion_main!(benches);
