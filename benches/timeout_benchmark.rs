/*!
 * Timeout Guard Benchmarks
 *
 * Measures the fixed cost a guard adds around a trivial computation.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use timeout_guard::{BackendKind, CapabilitySet, GuardConfig, TimeoutGuard};

fn backends() -> Vec<BackendKind> {
    let mut kinds = vec![BackendKind::Thread];
    if cfg!(unix) {
        kinds.push(BackendKind::Alarm);
    }
    kinds
}

/// Benchmark: unguarded baseline through the optional path
fn bench_no_deadline(c: &mut Criterion) {
    let guard = TimeoutGuard::new(GuardConfig::portable());

    c.bench_function("guard/no_deadline", |b| {
        b.iter(|| black_box(guard.run_optional(None, || black_box(42))))
    });
}

/// Benchmark: full arm, spawn, wait, disarm cycle per backend
fn bench_guarded_call(c: &mut Criterion) {
    let capability = CapabilitySet::standard()
        .timer_capability()
        .expect("standard set grants the timer capability");
    let mut group = c.benchmark_group("guard/guarded_call");

    for kind in backends() {
        let guard = TimeoutGuard::new(GuardConfig::new().with_backend(kind));
        group.bench_with_input(BenchmarkId::from_parameter(guard.backend().name()), &kind, |b, _| {
            b.iter(|| black_box(guard.run(&capability, "bench", 5.0, || black_box(42))))
        });
    }

    group.finish();
}

/// Benchmark: rejection of an overlapping call
fn bench_rejection(c: &mut Criterion) {
    let capability = CapabilitySet::standard()
        .timer_capability()
        .expect("standard set grants the timer capability");
    let guard = TimeoutGuard::new(GuardConfig::portable());

    c.bench_function("guard/invalid_duration", |b| {
        b.iter(|| black_box(guard.run(&capability, "bench", black_box(-1.0), || 0)))
    });
}

criterion_group!(benches, bench_no_deadline, bench_guarded_call, bench_rejection);
criterion_main!(benches);
