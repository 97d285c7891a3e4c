//! Criterion benchmarks for Pixeldrop critical paths
//!
//! Benchmarks the per-frame and conversion work:
//! - Simulation: activate, spawn and integrate a full build
//! - Sequencer: steady-state ticks
//! - Renderer: drawing frames onto an image surface
//! - Terminal: half-block ANSI encoding
//! - Quantize: image to matrix conversion
//! - Color: hex parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, Rgba, RgbaImage};
use pixeldrop::color::Color;
use pixeldrop::models::BitmapMatrix;
use pixeldrop::particle::{DropParams, DropSimulation};
use pixeldrop::quantize::{quantize_image, QuantizeOptions};
use pixeldrop::renderer::{draw_frame, render_matrix, RenderParams};
use pixeldrop::rng::Rng;
use pixeldrop::samples::{ghost, heart};
use pixeldrop::sequencer::{Sequencer, SequencerConfig};
use pixeldrop::terminal::render_image_ansi;

// =============================================================================
// Test Data Generators
// =============================================================================

/// A fully filled `size`x`size` matrix with a color gradient
fn make_matrix(size: u32) -> BitmapMatrix {
    let grid = (0..size)
        .map(|y| {
            (0..size)
                .map(|x| Some(Color::rgb((x * 255 / size) as u8, (y * 255 / size) as u8, 128)))
                .collect()
        })
        .collect();
    BitmapMatrix::new(format!("bench_{}", size), grid).expect("square grid")
}

/// A simulation part way through its build, with particles in flight
fn make_midflight(matrix: &BitmapMatrix) -> DropSimulation {
    let params = DropParams { spawn_rate: 8, ..DropParams::default() };
    let mut rng = Rng::new(1);
    let mut sim = DropSimulation::activate(matrix, &mut rng);
    for _ in 0..40 {
        sim.advance(16.0, &params, &mut rng);
    }
    sim
}

fn make_photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if (x + y) % 7 == 0 { 0 } else { 255 };
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, alpha])
    }))
}

// =============================================================================
// Simulation Benchmarks
// =============================================================================

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    let params = DropParams::default();

    for size in [16u32, 32, 64].iter() {
        let matrix = make_matrix(*size);
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(BenchmarkId::new("build_to_settled", size), &matrix, |b, m| {
            b.iter(|| {
                let mut rng = Rng::new(7);
                let mut sim = DropSimulation::activate(m, &mut rng);
                let fast = DropParams { spawn_rate: 32, ..params.clone() };
                while !sim.is_settled() {
                    sim.advance(16.0, &fast, &mut rng);
                }
                black_box(sim.landed().filled_count())
            })
        });
    }

    let matrix = make_matrix(64);
    let midflight = make_midflight(&matrix);
    group.bench_function("integrate_midflight_64", |b| {
        b.iter_batched(
            || midflight.clone(),
            |mut sim| sim.integrate(black_box(16.0), &params),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// =============================================================================
// Sequencer Benchmarks
// =============================================================================

fn bench_sequencer(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer");

    group.bench_function("tick_1000_frames", |b| {
        b.iter(|| {
            let mut seq =
                Sequencer::new(vec![heart(), ghost()], SequencerConfig::default(), Rng::new(3));
            for frame in 0..1000 {
                seq.tick(frame as f64 * 16.0);
            }
            black_box(seq.progress())
        })
    });

    group.finish();
}

// =============================================================================
// Renderer Benchmarks
// =============================================================================

fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderer");
    let render = RenderParams::default();
    let matrix = make_matrix(32);
    let sim = make_midflight(&matrix);

    for (w, h) in [(128u32, 128u32), (640, 480), (1920, 1080)].iter() {
        let mut surface = RgbaImage::new(*w, *h);
        group.throughput(Throughput::Elements((*w * *h) as u64));
        group.bench_function(BenchmarkId::new("draw_frame", format!("{}x{}", w, h)), |b| {
            b.iter(|| draw_frame(&mut surface, black_box(&sim), &render))
        });
    }

    group.bench_function("render_matrix_ghost_256", |b| {
        let ghost = ghost();
        b.iter(|| render_matrix(black_box(&ghost), 256, 256, &render))
    });

    group.finish();
}

// =============================================================================
// Terminal Benchmarks
// =============================================================================

fn bench_terminal(c: &mut Criterion) {
    let mut group = c.benchmark_group("terminal");
    let frame = render_matrix(&heart(), 80, 48, &RenderParams::default());

    group.throughput(Throughput::Elements(80 * 48));
    group.bench_function("render_image_ansi_80x48", |b| {
        b.iter(|| render_image_ansi(black_box(&frame)))
    });

    group.finish();
}

// =============================================================================
// Quantize Benchmarks
// =============================================================================

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");
    let photo = make_photo(640, 480);

    for width in [16u32, 32, 128].iter() {
        let options = QuantizeOptions { width: *width, ..QuantizeOptions::default() };
        group.bench_with_input(BenchmarkId::new("photo_640x480", width), &options, |b, o| {
            b.iter(|| quantize_image(black_box(&photo), o, "photo"))
        });
    }

    let icon = make_photo(12, 12);
    let options = QuantizeOptions { width: 64, ..QuantizeOptions::default() };
    group.bench_function("upscale_12_to_64", |b| {
        b.iter(|| quantize_image(black_box(&icon), &options, "icon"))
    });

    group.finish();
}

// =============================================================================
// Color Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    group.bench_function("parse_hex_3", |b| b.iter(|| black_box("#F00").parse::<Color>()));
    group.bench_function("parse_hex_6", |b| b.iter(|| black_box("#ef4444").parse::<Color>()));
    group.bench_function("parse_hex_8", |b| b.iter(|| black_box("#3b82f680").parse::<Color>()));

    group.finish();
}

criterion_group!(
    benches,
    bench_simulation,
    bench_sequencer,
    bench_renderer,
    bench_terminal,
    bench_quantize,
    bench_color
);
criterion_main!(benches);
