use bakecore::bleed;
use criterion::{Criterion, criterion_group, criterion_main};

const STRIDE: usize = 4;
const ALPHA: usize = 3;

/// A 256x256 RGBA buffer with a sparse scattering of opaque "islands" surrounded by fully
/// transparent padding, representative of an atlas tile with seam padding to fill.
fn sparse_atlas(size: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; size * size * STRIDE];
    for y in (0..size).step_by(8) {
        for x in (0..size).step_by(8) {
            let offset = (y * size + x) * STRIDE;
            pixels[offset..offset + 4].copy_from_slice(&[200, 120, 40, 255]);
        }
    }
    pixels
}

fn criterion_benchmark(c: &mut Criterion) {
    let size = 256;
    let pixels = sparse_atlas(size);

    c.bench_function("bleed_sparse_atlas_256", |b| {
        b.iter_batched(
            || pixels.clone(),
            |mut pixels| {
                bleed(&mut pixels, size, size, ALPHA, STRIDE, size * STRIDE);
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
