use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_lifecycle::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ===== Disposal =====

fn bench_check_not_disposed(c: &mut Criterion) {
    let lifecycle = DisposalLifecycle::with_name("Bench");

    c.bench_function("check_not_disposed_live", |b| {
        b.iter(|| black_box(lifecycle.check_not_disposed()).is_ok())
    });

    lifecycle.dispose();
    c.bench_function("check_not_disposed_disposed", |b| {
        b.iter(|| black_box(lifecycle.check_not_disposed()).is_err())
    });
}

fn bench_dispose(c: &mut Criterion) {
    c.bench_function("dispose_once", |b| {
        b.iter_batched(
            DisposalLifecycle::new,
            |lifecycle| black_box(lifecycle.dispose_with(|| Ok(()))),
            criterion::BatchSize::SmallInput,
        )
    });
}

// ===== Broadcast =====

fn slot_with(count: usize, sum: &Arc<AtomicU64>) -> EventSlot<(), u64> {
    let slot = EventSlot::new();
    for _ in 0..count {
        let sum = sum.clone();
        slot.subscribe(move |_, value| {
            sum.fetch_add(*value, Ordering::Relaxed);
            Ok(())
        });
    }
    slot
}

fn bench_broadcast_usage(c: &mut Criterion) {
    let broadcaster = SafeBroadcaster::new(Arc::new(FailureHub::new()));
    let sum = Arc::new(AtomicU64::new(0));
    let mut group = c.benchmark_group("broadcast");

    for count in [1usize, 8, 64] {
        let slot = slot_with(count, &sum);

        group.bench_with_input(BenchmarkId::new("reuse", count), &slot, |b, slot| {
            b.iter(|| {
                broadcaster
                    .broadcast(Some(slot), "Tick", &(), || 1, ArgsUsage::Reuse)
                    .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("unique_instance", count), &slot, |b, slot| {
            b.iter(|| {
                broadcaster
                    .broadcast(Some(slot), "Tick", &(), || 1, ArgsUsage::UniqueInstance)
                    .unwrap()
            })
        });
    }

    group.finish();
    black_box(sum.load(Ordering::Relaxed));
}

fn bench_broadcast_failures(c: &mut Criterion) {
    let hub = Arc::new(FailureHub::new());
    hub.subscribe(|report| report.mark_handled());
    let broadcaster = SafeBroadcaster::new(hub);

    let slot: EventSlot<(), ()> = EventSlot::new();
    for _ in 0..8 {
        slot.subscribe(|_, _| Err("failed".into()));
    }

    c.bench_function("broadcast_8_failing_reported", |b| {
        b.iter(|| broadcaster.broadcast_empty(Some(&slot), "Tick", &()).unwrap())
    });
}

fn bench_empty_slot(c: &mut Criterion) {
    let broadcaster = SafeBroadcaster::new(Arc::new(FailureHub::new()));
    let slot: EventSlot<(), u64> = EventSlot::new();

    c.bench_function("broadcast_no_subscribers", |b| {
        b.iter(|| {
            broadcaster
                .broadcast(Some(&slot), "Tick", &(), || 1, ArgsUsage::Reuse)
                .unwrap()
        })
    });
}

fn bench_subscribe_unsubscribe(c: &mut Criterion) {
    let slot: EventSlot<(), u64> = EventSlot::new();
    let sum = Arc::new(AtomicU64::new(0));
    let _ = slot_with(16, &sum);

    c.bench_function("subscribe_unsubscribe", |b| {
        b.iter(|| {
            let id = slot.subscribe(|_, _| Ok(()));
            black_box(slot.unsubscribe(id))
        })
    });
}

criterion_group!(
    disposal_benches,
    bench_check_not_disposed,
    bench_dispose
);

criterion_group!(
    broadcast_benches,
    bench_broadcast_usage,
    bench_broadcast_failures,
    bench_empty_slot,
    bench_subscribe_unsubscribe
);

criterion_main!(disposal_benches, broadcast_benches);
