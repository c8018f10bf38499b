use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use snowmint::{FixedClock, Generator, GeneratorConfig, MonotonicClock, SystemClock, TimeSource};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

// Number of IDs minted per benchmark iteration. One below the per-millisecond
// limit so a fixed clock never rate limits.
const TOTAL_IDS: usize = 4095;

fn config() -> GeneratorConfig {
    GeneratorConfig::default().with_instance_id(1)
}

/// Benchmarks the hot path where every mint succeeds.
fn bench_mint<T: TimeSource>(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> Generator<T>) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_fn();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.mint().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a real clock, spinning whenever a millisecond fills up.
fn bench_mint_retry<T: TimeSource>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> Generator<T>,
) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_fn();
                for _ in 0..TOTAL_IDS {
                    loop {
                        match generator.mint() {
                            Ok(id) => {
                                black_box(id);
                                break;
                            }
                            Err(_) => core::hint::spin_loop(),
                        }
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads.
fn bench_mint_contended<T: TimeSource + Sync>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> Generator<T>,
) {
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements((ids_per_thread * thread_count) as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = generator_fn();
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let barrier = Arc::clone(&barrier);
                            let generator = &generator;
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    loop {
                                        match generator.mint() {
                                            Ok(id) => {
                                                black_box(id);
                                                break;
                                            }
                                            Err(_) => std::thread::yield_now(),
                                        }
                                    }
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn benchmarks(c: &mut Criterion) {
    bench_mint(c, "mint/fixed_clock", || {
        Generator::with_time_source(config(), FixedClock::from_millis(1))
    });
    bench_mint_retry(c, "mint/system_clock", || {
        Generator::with_time_source(config(), SystemClock)
    });

    let clock = MonotonicClock::new().unwrap();
    bench_mint_retry(c, "mint/monotonic_clock", || {
        Generator::with_time_source(config(), clock.clone())
    });
    bench_mint_contended(c, "mint/contended/monotonic_clock", || {
        Generator::with_time_source(config(), clock.clone())
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
