use ferrous_lifecycle::{
    describe, ArgsUsage, CallbackInfo, EventSlot, FailureHub, LifecycleError, SafeBroadcaster,
};
use serial_test::serial;
use std::cell::Cell;
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct Sender;

#[derive(Debug)]
struct Progress {
    step: usize,
}

fn isolated() -> (Arc<FailureHub>, SafeBroadcaster) {
    let hub = Arc::new(FailureHub::new());
    (hub.clone(), SafeBroadcaster::new(hub))
}

fn record_reports(hub: &FailureHub) -> Arc<Mutex<Vec<(String, Option<String>)>>> {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();
    hub.subscribe(move |report| {
        let failure = report.failure();
        sink.lock().unwrap().push((
            failure.to_string(),
            failure.calling_callback().map(str::to_string),
        ));
    });
    reports
}

#[test]
fn test_zero_subscribers_returns_false_without_factory_call() {
    let (_, broadcaster) = isolated();
    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    let mut factory_calls = 0;

    for usage in [ArgsUsage::Reuse, ArgsUsage::UniqueInstance, ArgsUsage::Unknown] {
        let raised = broadcaster
            .broadcast(
                Some(&slot),
                "Progress",
                &Sender,
                || {
                    factory_calls += 1;
                    Progress { step: 0 }
                },
                usage,
            )
            .unwrap();
        assert!(!raised);
    }

    assert_eq!(factory_calls, 0);
}

#[test]
fn test_reuse_shares_one_instance() {
    let (_, broadcaster) = isolated();
    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..3 {
        let sink = seen.clone();
        slot.subscribe(move |_, args| {
            sink.lock().unwrap().push(args as *const Progress as usize);
            Ok(())
        });
    }

    let mut factory_calls = 0;
    let raised = broadcaster
        .broadcast(
            Some(&slot),
            "Progress",
            &Sender,
            || {
                factory_calls += 1;
                Progress { step: 1 }
            },
            ArgsUsage::Reuse,
        )
        .unwrap();

    assert!(raised);
    assert_eq!(factory_calls, 1);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|addr| *addr == seen[0]));
}

#[test]
fn test_unique_instance_calls_factory_before_each_subscriber() {
    let (_, broadcaster) = isolated();
    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    for n in 0..3 {
        let sink = log.clone();
        slot.subscribe(move |_, args| {
            sink.lock().unwrap().push(format!("sub{} got {}", n, args.step));
            Ok(())
        });
    }

    let factory_log = log.clone();
    let mut step = 0;
    let raised = broadcaster
        .broadcast(
            Some(&slot),
            "Progress",
            &Sender,
            move || {
                step += 1;
                factory_log.lock().unwrap().push(format!("factory {}", step));
                Progress { step }
            },
            ArgsUsage::UniqueInstance,
        )
        .unwrap();

    assert!(raised);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "factory 1",
            "sub0 got 1",
            "factory 2",
            "sub1 got 2",
            "factory 3",
            "sub2 got 3",
        ]
    );
}

#[test]
fn test_failing_subscriber_is_isolated_and_reported_once() {
    let (hub, broadcaster) = isolated();
    let reports = record_reports(&hub);
    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    let second_called = Arc::new(AtomicUsize::new(0));

    slot.subscribe_with_info(CallbackInfo::new("app::Meter", "on_progress(&Sender, &Progress)"), |_, _| {
        Err("meter offline".into())
    });
    let c = second_called.clone();
    slot.subscribe(move |_, _| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let raised = broadcaster
        .broadcast(Some(&slot), "Progress", &Sender, || Progress { step: 4 }, ArgsUsage::Reuse)
        .unwrap();

    assert!(raised);
    assert_eq!(second_called.load(Ordering::SeqCst), 1);
    assert_eq!(
        *reports.lock().unwrap(),
        vec![(
            "meter offline".to_string(),
            Some("[app::Meter].on_progress(&Sender, &Progress)".to_string())
        )]
    );
}

#[test]
fn test_panicking_factory_is_isolated_per_subscriber() {
    let (hub, broadcaster) = isolated();
    let reports = record_reports(&hub);
    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..3 {
        let sink = received.clone();
        slot.subscribe(move |_, args| {
            sink.lock().unwrap().push(args.step);
            Ok(())
        });
    }

    let mut step = 0;
    let raised = broadcaster
        .broadcast(
            Some(&slot),
            "Progress",
            &Sender,
            || {
                step += 1;
                if step == 2 {
                    panic!("argument construction failed");
                }
                Progress { step }
            },
            ArgsUsage::UniqueInstance,
        )
        .unwrap();

    assert!(raised);
    assert_eq!(*received.lock().unwrap(), vec![1, 3]);

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].0.contains("argument construction failed"));
}

#[test]
fn test_unknown_usage_is_out_of_range() {
    let (hub, broadcaster) = isolated();
    let reports = record_reports(&hub);
    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    let invoked = Arc::new(AtomicUsize::new(0));
    let c = invoked.clone();
    slot.subscribe(move |_, _| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let mut factory_calls = 0;
    let result = broadcaster.broadcast(
        Some(&slot),
        "Progress",
        &Sender,
        || {
            factory_calls += 1;
            Progress { step: 0 }
        },
        ArgsUsage::Unknown,
    );

    assert_eq!(
        result,
        Err(LifecycleError::OutOfRange {
            name: "usage",
            value: 0
        })
    );
    assert_eq!(factory_calls, 0);
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    assert!(reports.lock().unwrap().is_empty());
}

#[test]
fn test_empty_event_name_is_invalid() {
    let (_, broadcaster) = isolated();
    let result = broadcaster.broadcast_empty::<Sender>(None, "", &Sender);

    assert!(matches!(
        result,
        Err(LifecycleError::InvalidArgument {
            name: "event_name",
            ..
        })
    ));
}

#[test]
fn test_callback_descriptions() {
    fn on_progress(_: &Sender, _: &Progress) -> ferrous_lifecycle::CallbackResult {
        Ok(())
    }

    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    slot.subscribe(on_progress);

    let descriptions = slot.descriptions();
    assert_eq!(descriptions.len(), 1);
    assert!(descriptions[0].starts_with("[broadcast::test_callback_descriptions].on_progress(&"));
    assert!(descriptions[0].ends_with("Progress)"));

    assert_eq!(describe(None), "[null]");
    assert_eq!(
        describe(Some(&CallbackInfo::unscoped("anonymous"))),
        "[no type].anonymous"
    );
}

#[test]
#[serial]
fn test_raise_reports_to_global_hub() {
    let hub = FailureHub::global();
    hub.clear();
    let reports = record_reports(&hub);

    let slot: EventSlot<Sender, ()> = EventSlot::new();
    slot.subscribe_with_info(CallbackInfo::unscoped("closing()"), |_, _| {
        Err("already closing".into())
    });

    assert!(slot.raise_empty("Closing", &Sender).unwrap());
    hub.clear();

    assert_eq!(
        *reports.lock().unwrap(),
        vec![(
            "already closing".to_string(),
            Some("[no type].closing()".to_string())
        )]
    );
}

#[test]
#[serial]
fn test_raise_without_global_subscribers_swallows_failures() {
    let hub = FailureHub::global();
    hub.clear();

    let slot: EventSlot<Sender, Progress> = EventSlot::new();
    slot.subscribe(|_, _| Err("nobody is listening".into()));
    slot.subscribe(|_, _| panic!("nor here"));

    let raised = slot
        .raise("Progress", &Sender, || Progress { step: 9 }, ArgsUsage::Reuse)
        .unwrap();

    assert!(raised);
    assert!(!hub.has_subscribers());
}

thread_local! {
    static HOOK_CALLS: Cell<usize> = Cell::new(0);
}

// Harnesses that abort from the panic hook (libfuzzer does) cannot feed
// panicking subscribers to the broadcaster even though it isolates them.
#[test]
#[serial]
fn test_caught_panic_still_runs_panic_hook() {
    let previous = Arc::new(panic::take_hook());
    let forward = previous.clone();
    panic::set_hook(Box::new(move |info| {
        HOOK_CALLS.with(|calls| calls.set(calls.get() + 1));
        (*forward)(info);
    }));

    let (hub, broadcaster) = isolated();
    let reports = record_reports(&hub);
    let slot: EventSlot<Sender, ()> = EventSlot::new();
    slot.subscribe(|_, _| panic!("isolated"));
    let raised = broadcaster.broadcast_empty(Some(&slot), "Tick", &Sender);

    drop(panic::take_hook());
    panic::set_hook(Box::new(move |info| (*previous)(info)));

    assert_eq!(raised, Ok(true));
    assert_eq!(HOOK_CALLS.with(Cell::get), 1);
    assert_eq!(reports.lock().unwrap().len(), 1);
}
