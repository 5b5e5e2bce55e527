use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use driftflake::{
    DriftingGenerator, IdGenerator, LayoutConfig, LayoutOptions, StrictGenerator, WallClock,
};
use std::hint::black_box;
use std::sync::Arc;
use std::thread::scope;
use std::time::Instant;

// Total number of IDs to generate per benchmark iteration
const TOTAL_IDS: usize = 4096 * 256;

fn layout(seq_bits: u8) -> LayoutConfig {
    LayoutConfig::try_new(LayoutOptions {
        seq_bits,
        ..LayoutOptions::default()
    })
    .expect("valid layout")
}

fn bench_sequential<G>(c: &mut Criterion, group_name: &str, make_generator: impl Fn(u8) -> G)
where
    G: IdGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    for seq_bits in [6, 12] {
        group.bench_function(format!("elems/{TOTAL_IDS}/seq_bits/{seq_bits}"), |b| {
            b.iter_custom(|iters| {
                let generator = make_generator(seq_bits);
                let start = Instant::now();
                for _ in 0..iters {
                    for _ in 0..TOTAL_IDS {
                        black_box(generator.try_next_id().ok());
                    }
                }
                start.elapsed()
            });
        });
    }

    group.finish();
}

fn bench_threaded<G>(c: &mut Criterion, group_name: &str, make_generator: impl Fn() -> G)
where
    G: IdGenerator + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let max_threads = num_cpus::get().max(1);
    let thread_counts = [1, 2, 4, 8, 16]
        .into_iter()
        .filter(move |&threads| threads <= max_threads);

    for threads in thread_counts {
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{threads}"), |b| {
            b.iter_custom(|iters| {
                let generator = Arc::new(make_generator());
                let per_thread = TOTAL_IDS / threads;
                let start = Instant::now();
                for _ in 0..iters {
                    scope(|s| {
                        for _ in 0..threads {
                            let generator = Arc::clone(&generator);
                            s.spawn(move || {
                                for _ in 0..per_thread {
                                    black_box(generator.try_next_id().ok());
                                }
                            });
                        }
                    });
                }
                start.elapsed()
            });
        });
    }

    group.finish();
}

fn benchmark_drifting_sequential(c: &mut Criterion) {
    bench_sequential(c, "drifting/sequential", |seq_bits| {
        let config = layout(seq_bits);
        DriftingGenerator::new(config, WallClock::from_config(&config))
    });
}

fn benchmark_strict_sequential(c: &mut Criterion) {
    bench_sequential(c, "strict/sequential", |seq_bits| {
        let config = layout(seq_bits);
        StrictGenerator::new(config, WallClock::from_config(&config))
    });
}

fn benchmark_drifting_threaded(c: &mut Criterion) {
    bench_threaded(c, "drifting/threaded", || {
        let config = layout(12);
        DriftingGenerator::new(config, WallClock::from_config(&config))
    });
}

fn benchmark_strict_threaded(c: &mut Criterion) {
    bench_threaded(c, "strict/threaded", || {
        let config = layout(12);
        StrictGenerator::new(config, WallClock::from_config(&config))
    });
}

criterion_group!(
    benches,
    benchmark_drifting_sequential,
    benchmark_strict_sequential,
    benchmark_drifting_threaded,
    benchmark_strict_threaded,
);
criterion_main!(benches);
