//! Benchmarks for the hot paths: slot reads and binding lookups.
//!
//! - Slot reads happen on every request of a bound component
//! - Registry lookups happen once per change message

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dcc_sync::core::{BindingRegistry, Configurable, DynamicAttributes, StoreKey};
use dcc_sync::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn target(name: &str) -> Arc<DynamicAttributes> {
    let target = DynamicAttributes::builder(name)
        .attribute("retryLimit", "3")
        .attribute("timeoutMs", "500")
        .attribute("endpoint", "http://localhost")
        .build();
    target.set_slot("retryLimit", "3").unwrap();
    Arc::new(target)
}

/// Benchmark single-threaded slot read latency
fn benchmark_slot_read(c: &mut Criterion) {
    let target = target("bench");

    let mut group = c.benchmark_group("slot_read");
    group.bench_function("get", |b| {
        b.iter(|| {
            let value = target.get(black_box("retryLimit"));
            black_box(value);
        });
    });
    group.finish();
}

/// Benchmark slot reads while another thread keeps writing
fn benchmark_slot_read_under_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_read_under_writes");

    for num_threads in [1, 4, 8] {
        group.throughput(Throughput::Elements(num_threads as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_readers", num_threads)),
            &num_threads,
            |b, &num_threads| {
                let target = target("bench");
                let barrier = Arc::new(Barrier::new(num_threads + 1));

                b.iter_custom(|iters| {
                    let running = Arc::new(std::sync::atomic::AtomicBool::new(true));
                    let writer = {
                        let target = Arc::clone(&target);
                        let running = Arc::clone(&running);
                        thread::spawn(move || {
                            let mut i = 0u64;
                            while running.load(std::sync::atomic::Ordering::Relaxed) {
                                target.set_slot("retryLimit", &i.to_string()).unwrap();
                                i += 1;
                            }
                        })
                    };

                    let readers: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let target = Arc::clone(&target);
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                barrier.wait();
                                let start = std::time::Instant::now();
                                for _ in 0..iters {
                                    black_box(target.get("retryLimit"));
                                }
                                start.elapsed()
                            })
                        })
                        .collect();

                    barrier.wait();
                    let total: Duration = readers.into_iter().map(|h| h.join().unwrap()).sum();

                    running.store(false, std::sync::atomic::Ordering::Relaxed);
                    writer.join().unwrap();

                    total / num_threads as u32
                });
            },
        );
    }

    group.finish();
}

/// Benchmark target lookup by key with a growing number of bound targets
fn benchmark_targets_for(c: &mut Criterion) {
    let mut group = c.benchmark_group("targets_for");

    for bound in [1usize, 16, 256] {
        let registry = BindingRegistry::new();
        let key = StoreKey::new("orders", "retryLimit");
        let targets: Vec<Arc<dyn Configurable>> = (0..bound)
            .map(|i| target(&format!("t{i}")) as Arc<dyn Configurable>)
            .collect();
        for t in &targets {
            registry.register(&key, t);
        }
        // Unrelated keys so the lookup does not hit a lone shard.
        for i in 0..1000 {
            registry.register(&StoreKey::new("orders", format!("other{i}")), &targets[0]);
        }

        group.bench_with_input(BenchmarkId::from_parameter(bound), &key, |b, key| {
            b.iter(|| black_box(registry.targets_for(key)));
        });
    }

    group.finish();
}

/// Benchmark a full change application through the service
fn benchmark_on_change(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let service = AttributeSyncService::builder()
        .with_namespace("orders")
        .with_store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();
    let bound: Vec<_> = (0..8).map(|i| target(&format!("t{i}"))).collect();
    runtime.block_on(async {
        for t in &bound {
            service.bootstrap(t.clone()).await.unwrap();
        }
    });

    let mut group = c.benchmark_group("on_change");
    group.bench_function("eight_targets", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let outcome = service.on_change(ChangeMessage::new("retryLimit", "5")).await;
                black_box(outcome);
            })
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_slot_read,
    benchmark_slot_read_under_writes,
    benchmark_targets_for,
    benchmark_on_change,
);
criterion_main!(benches);
