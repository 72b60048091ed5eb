//! Benchmark for noise sampling throughput.
//!
//! Run with: cargo bench --package voxelsmith_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use voxelsmith_procedural::noise::{GradientNoise, WorldSeed};

fn benchmark_sample(c: &mut Criterion) {
    let noise = GradientNoise::new(WorldSeed::new(42));

    c.bench_function("gradient_sample", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x += 0.37;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_octaves(c: &mut Criterion) {
    let noise = GradientNoise::new(WorldSeed::new(42));

    let mut group = c.benchmark_group("octave_noise");
    // 256x256 samples per iteration
    group.throughput(Throughput::Elements(256 * 256));

    group.bench_function("fbm_6_octaves", |b| {
        b.iter(|| {
            for y in 0..256 {
                for x in 0..256 {
                    black_box(noise.fbm(x as f32 * 0.03, y as f32 * 0.03, 6, 0.5));
                }
            }
        });
    });

    group.bench_function("ridged_4_octaves", |b| {
        b.iter(|| {
            for y in 0..256 {
                for x in 0..256 {
                    black_box(noise.ridged(x as f32 * 0.03, y as f32 * 0.03, 4));
                }
            }
        });
    });

    group.bench_function("warped_4_octaves", |b| {
        b.iter(|| {
            for y in 0..256 {
                for x in 0..256 {
                    black_box(noise.warped(x as f32 * 0.03, y as f32 * 0.03, 1.5, 4));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_cellular(c: &mut Criterion) {
    let noise = GradientNoise::new(WorldSeed::new(42));

    c.bench_function("cellular_f1", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x += 1.3;
            black_box(noise.cellular(black_box(x), black_box(x * 0.5), 16.0))
        });
    });
}

criterion_group!(benches, benchmark_sample, benchmark_octaves, benchmark_cellular);
criterion_main!(benches);
