#![no_main]

use ferrous_lifecycle::{ArgsUsage, EventSlot, FailureHub, SafeBroadcaster};
use libfuzzer_sys::fuzz_target;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let hub = Arc::new(FailureHub::new());
    let reported = Arc::new(AtomicUsize::new(0));
    let r = reported.clone();
    hub.subscribe(move |_| {
        r.fetch_add(1, Ordering::SeqCst);
    });

    // First byte selects the usage, the rest describe one subscriber each.
    // Subscribers only return errors: libfuzzer's panic hook aborts even on
    // panics the broadcaster catches.
    let usage = ArgsUsage::try_from(data[0] % 4);
    let behaviors = &data[1..data.len().min(33)];

    let slot: EventSlot<(), u8> = EventSlot::new();
    let invoked = Arc::new(AtomicUsize::new(0));
    let mut failures = 0;
    for &behavior in behaviors {
        if behavior % 2 != 0 {
            failures += 1;
        }
        let i = invoked.clone();
        slot.subscribe(move |_, _| {
            i.fetch_add(1, Ordering::SeqCst);
            if behavior % 2 == 0 {
                Ok(())
            } else {
                Err("fuzzed failure".into())
            }
        });
    }

    let broadcaster = SafeBroadcaster::new(hub);
    let mut factory_calls = 0usize;
    match usage {
        Ok(usage) => {
            let result = broadcaster.broadcast(
                Some(&slot),
                "Fuzzed",
                &(),
                || {
                    factory_calls += 1;
                    0u8
                },
                usage,
            );
            match usage {
                ArgsUsage::Unknown => {
                    assert!(result.is_err());
                    assert_eq!(invoked.load(Ordering::SeqCst), 0);
                }
                ArgsUsage::Reuse => {
                    assert_eq!(result, Ok(true));
                    assert_eq!(factory_calls, 1);
                }
                ArgsUsage::UniqueInstance => {
                    assert_eq!(result, Ok(true));
                    assert_eq!(factory_calls, behaviors.len());
                }
            }
            if usage != ArgsUsage::Unknown {
                assert_eq!(invoked.load(Ordering::SeqCst), behaviors.len());
                assert_eq!(reported.load(Ordering::SeqCst), failures);
            }
        }
        Err(_) => assert_eq!(data[0] % 4, 3),
    }
});
