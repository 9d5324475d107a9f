//! Benchmarks for dominant-color extraction.
//!
//! Run with: cargo bench -p chroma-core

use std::io::Cursor;

use chroma_core::pipeline::{Decode, ImageDecoder};
use chroma_core::{ColorCounter, PixelGrid};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{ImageFormat, Rgb, RgbImage};

/// Pseudo-random grid drawn from a palette of `colors` entries.
fn noisy_grid(width: u32, height: u32, colors: u32) -> PixelGrid {
    let mut state = 0x2545_F491u32;
    let pixels = (0..width * height)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) % colors * 0x0001_0F0B
        })
        .collect();
    PixelGrid::new(width, height, pixels).unwrap()
}

fn benchmark_dominant_colors(c: &mut Criterion) {
    let mut group = c.benchmark_group("dominant_colors");
    let mut counter = ColorCounter::new();

    for colors in [1, 64, 4096] {
        let grid = noisy_grid(1920, 1080, colors);
        group.bench_with_input(BenchmarkId::new("1080p", colors), &grid, |b, grid| {
            b.iter(|| counter.dominant_colors(black_box(grid)))
        });
    }
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let img = RgbImage::from_fn(640, 480, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).unwrap();
    let bytes = png.into_inner();
    let decoder = ImageDecoder::new();

    c.bench_function("decode_png_640x480", |b| {
        b.iter(|| decoder.decode(black_box(&bytes)))
    });
}

criterion_group!(benches, benchmark_dominant_colors, benchmark_decode);
criterion_main!(benches);
