//! Performance benchmarks for the vibration analysis cycle
//!
//! A cycle must comfortably fit inside the default 100 ms cycle interval:
//! - Band filter: two zero-phase passes per axis
//! - Wavelet decomposition: per-axis DWT cascade
//! - Full cycle: filter, statistics and decomposition over three axes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::f64::consts::PI;
use vib_core::{Sample, SampleSnapshot};
use vib_processing::{AnalysisConfig, AnalysisPipeline, BandFilter, FilterSpec, WaveletDecomposer};

fn test_signal(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / 1000.0;
            (2.0 * PI * 5.0 * t).sin() + 0.2 * (2.0 * PI * 120.0 * t).sin()
        })
        .collect()
}

fn test_snapshot(n: usize) -> SampleSnapshot {
    let samples = (0..n)
        .filter_map(|i| {
            let t = i as f64 / 1000.0;
            Sample::new(t, (2.0 * PI * 5.0 * t).sin(), (2.0 * PI * 12.0 * t).sin(), 9.81).ok()
        })
        .collect();
    SampleSnapshot::new(samples)
}

/// Benchmark the Butterworth band filter
fn bench_band_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("band_filter");
    let filter = BandFilter::new(FilterSpec::default()).unwrap();

    for &size in &[100usize, 512, 2048] {
        let signal = test_signal(size);
        group.bench_with_input(BenchmarkId::new("filtfilt", size), &signal, |b, signal| {
            b.iter(|| black_box(filter.filter(black_box(signal)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark multi-level decomposition per wavelet
fn bench_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("decomposition");
    let signal = test_signal(512);

    for wavelet in ["haar", "db4", "sym8"] {
        let decomposer = WaveletDecomposer::new(wavelet, 4).unwrap();
        group.bench_with_input(BenchmarkId::new(wavelet, 512), &signal, |b, signal| {
            b.iter(|| black_box(decomposer.decompose(black_box(signal)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark a complete analysis cycle
fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_cycle");

    for &capacity in &[100usize, 512] {
        let config = AnalysisConfig {
            buffer_capacity: capacity,
            ..AnalysisConfig::default()
        };
        let pipeline = AnalysisPipeline::new(config).unwrap();
        let snapshot = test_snapshot(capacity);

        group.bench_with_input(BenchmarkId::new("run_cycle", capacity), &snapshot, |b, snapshot| {
            b.iter(|| black_box(pipeline.run_cycle(1, black_box(snapshot)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_band_filter, bench_decomposition, bench_cycle);
criterion_main!(benches);
