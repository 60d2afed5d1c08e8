#![no_main]

use ferrous_lifecycle::DisposalLifecycle;
use libfuzzer_sys::fuzz_target;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let lifecycle = Arc::new(DisposalLifecycle::with_name("Fuzzed"));
    let teardowns = Arc::new(AtomicUsize::new(0));

    // Each byte is one disposer; its low bit picks the teardown outcome.
    // Teardowns never panic: libfuzzer's panic hook aborts even on caught panics.
    let handles: Vec<_> = data
        .iter()
        .take(16)
        .map(|&op| {
            let lifecycle = Arc::clone(&lifecycle);
            let teardowns = Arc::clone(&teardowns);
            thread::spawn(move || {
                if op & 0x80 != 0 {
                    let _ = lifecycle.check_not_disposed();
                }
                lifecycle.dispose_with(|| {
                    teardowns.fetch_add(1, Ordering::SeqCst);
                    if op % 2 == 0 {
                        Ok(())
                    } else {
                        Err("fuzzed teardown failure".into())
                    }
                })
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(false))
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    assert!(lifecycle.is_disposed());
    assert!(lifecycle.check_not_disposed().is_err());
});
