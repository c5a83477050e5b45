//! Router benchmark suite
//!
//! Benchmarks for synchronous dispatch through the router.
//!
//! Run with: `cargo bench -p logcast-pipeline`

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use logcast_pipeline::{Provider, ProviderError, Router};
use logcast_protocol::{LevelFilter, LogMessage};

/// Counts deliveries and does nothing else
#[derive(Default)]
struct Counting {
    seen: AtomicU64,
}

impl Provider for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn log(&self, message: &LogMessage) -> Result<(), ProviderError> {
        black_box(message);
        self.seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Benchmark fan-out to a growing number of providers
fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");
    let message = LogMessage::info("bench", "request completed in 12ms");

    for providers in [1, 4, 16] {
        let router = Router::new();
        for _ in 0..providers {
            router.add_provider(Arc::new(Counting::default()), LevelFilter::Trace);
        }

        group.throughput(Throughput::Elements(providers as u64));
        group.bench_with_input(BenchmarkId::from_parameter(providers), &router, |b, router| {
            b.iter(|| router.log(black_box(&message)))
        });
    }

    group.finish();
}

/// Benchmark messages rejected by thresholds
fn bench_filtered(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered");
    let message = LogMessage::debug("bench", "noisy detail");

    let global = Router::with_global_threshold(LevelFilter::Info);
    global.add_provider(Arc::new(Counting::default()), LevelFilter::Trace);
    group.bench_function("global", |b| b.iter(|| global.log(black_box(&message))));

    let per_provider = Router::new();
    per_provider.add_provider(Arc::new(Counting::default()), LevelFilter::Error);
    group.bench_function("per_provider", |b| {
        b.iter(|| per_provider.log(black_box(&message)))
    });

    group.finish();
}

criterion_group!(benches, bench_fan_out, bench_filtered);
criterion_main!(benches);
