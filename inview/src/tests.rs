use crate::*;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() >> 33) as usize % span
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() >> 63) == 1
    }
}

const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

fn setup() -> (ManualBackend, TargetId, RecordingSink, VisibilityTracker<ManualBackend>) {
    let backend = ManualBackend::new(VIEWPORT);
    let target = backend.add_target("card", Rect::new(0.0, 2000.0, 200.0, 300.0));
    let sink = RecordingSink::new();
    let tracker = VisibilityTracker::with_sink(backend.clone(), sink.clone());
    (backend, target, sink, tracker)
}

fn event(is_intersecting: bool, ratio: f64) -> ObservationEvent {
    ObservationEvent::new("card", is_intersecting, ratio)
}

#[test]
fn fresh_tracker_is_detached_and_not_intersecting() {
    let (backend, _, sink, tracker) = setup();
    assert!(!tracker.is_intersecting());
    assert!(!tracker.is_attached());
    assert_eq!(tracker.state(), TrackerState::default());
    assert_eq!(backend.observe_calls(), 0);
    assert!(sink.is_empty());
}

#[test]
fn absent_target_makes_no_backend_call() {
    let (backend, _, sink, mut tracker) = setup();
    let handle = tracker.attach(None, TrackerConfig::default()).unwrap();

    assert!(!handle.is_intersecting());
    assert!(!tracker.is_attached());
    assert_eq!(backend.observe_calls(), 0);
    assert_eq!(backend.flush(), 0);
    assert!(sink.is_empty());
}

#[test]
fn applies_injected_event_and_records_one_entry() {
    let (backend, target, sink, mut tracker) = setup();
    let config = TrackerConfig::new(0.0, "200px");
    let handle = tracker.attach(Some(target), config).unwrap();

    // Drop the initial (off-screen) observation so only the injected event is recorded.
    backend.flush();
    sink.clear();

    let rect = Rect::new(0.0, 500.0, 200.0, 300.0);
    backend.inject(target, event(true, 0.4).with_rect(rect));
    assert_eq!(backend.flush(), 1);

    assert!(handle.is_intersecting());
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].target_label, "card");
    assert!(entries[0].is_intersecting);
    assert_eq!(entries[0].intersection_ratio, 0.4);
    assert_eq!(entries[0].bounding_rect, rect);
}

#[test]
fn events_are_delivered_asynchronously() {
    let backend = ManualBackend::new(VIEWPORT);
    let target = backend.add_target("hero", Rect::new(0.0, 0.0, 100.0, 100.0));
    let mut tracker = VisibilityTracker::with_sink(backend.clone(), NoopSink);

    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    assert!(!handle.is_intersecting());
    assert_eq!(backend.pending(), 1);

    backend.flush();
    assert!(handle.is_intersecting());
}

#[test]
fn last_delivered_event_wins() {
    let (backend, target, _, mut tracker) = setup();
    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();

    let sequences: [&[bool]; 4] = [
        &[true, false, true],
        &[true, true, false],
        &[false, false, false, true],
        &[true, false, true, false, false],
    ];
    for seq in sequences {
        for &v in seq {
            backend.inject(target, event(v, if v { 1.0 } else { 0.0 }));
        }
        backend.flush();
        assert_eq!(handle.is_intersecting(), *seq.last().unwrap(), "seq={seq:?}");
    }
}

#[test]
fn randomized_delivery_and_detach_keep_last_applied_event() {
    let mut rng = Lcg::new(0x5eed_1234);

    for case in 0..300 {
        let (backend, target, _, mut tracker) = setup();
        let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
        backend.flush();

        let len = rng.gen_range_usize(1, 9);
        let detach_at = if rng.gen_bool() {
            Some(rng.gen_range_usize(0, len))
        } else {
            None
        };

        // `in_flight` is the last value queued while attached and not yet flushed.
        let mut expected = false;
        let mut in_flight = None;
        let mut attached = true;
        for i in 0..len {
            if detach_at == Some(i) {
                tracker.detach();
                attached = false;
                in_flight = None;
            }
            let v = rng.gen_bool();
            backend.inject(target, event(v, if v { 1.0 } else { 0.0 }));
            if attached {
                in_flight = Some(v);
            }
            if rng.gen_bool() {
                backend.flush();
                if let Some(v) = in_flight.take() {
                    expected = v;
                }
            }
        }
        backend.flush();
        if let Some(v) = in_flight.take() {
            expected = v;
        }

        assert_eq!(
            handle.is_intersecting(),
            expected,
            "case={case} len={len} detach_at={detach_at:?}"
        );
        assert_eq!(backend.active_watches(), usize::from(attached), "case={case}");
    }
}

#[test]
fn detach_discards_in_flight_events() {
    let (backend, target, sink, mut tracker) = setup();
    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    backend.flush();
    sink.clear();

    backend.inject(target, event(true, 1.0));
    backend.flush();
    assert!(handle.is_intersecting());

    backend.inject(target, event(false, 0.0));
    tracker.detach();
    // The queued event keeps its callback and is still delivered.
    assert_eq!(backend.flush(), 1);

    assert!(handle.is_intersecting());
    assert_eq!(sink.len(), 1);
    assert_eq!(backend.active_watches(), 0);
}

#[test]
fn late_event_after_detach_keeps_state() {
    let (backend, target, _, mut tracker) = setup();
    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    backend.inject(target, event(true, 1.0));
    backend.flush();

    tracker.detach();
    assert_eq!(backend.inject(target, event(false, 0.0)), 0);
    backend.flush();
    assert!(handle.is_intersecting());
    assert!(!tracker.state().attached);
}

#[test]
fn detach_is_idempotent() {
    let (backend, target, _, mut tracker) = setup();
    tracker.detach();
    assert_eq!(backend.unobserve_calls(), 0);

    tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    tracker.detach();
    tracker.detach();
    assert_eq!(backend.unobserve_calls(), 1);
    assert_eq!(backend.active_watches(), 0);
}

#[test]
fn retarget_tears_down_exactly_one_watch_first() {
    let (backend, first, _, mut tracker) = setup();
    let second = backend.add_target("other", Rect::new(0.0, 100.0, 50.0, 50.0));

    let handle = tracker.attach(Some(first), TrackerConfig::default()).unwrap();
    backend.inject(first, event(false, 0.0));
    tracker.attach(Some(second), TrackerConfig::default()).unwrap();

    assert_eq!(backend.observe_calls(), 2);
    assert_eq!(backend.unobserve_calls(), 1);
    assert_eq!(backend.active_watches(), 1);
    assert_eq!(backend.watches_on(first), 0);
    assert_eq!(backend.watches_on(second), 1);
    assert_eq!(backend.peak_active_watches(), 1);
    assert_eq!(tracker.target(), Some(&second));

    // The stale `false` from the first watch is discarded; the new watch reports `true`.
    backend.flush();
    assert!(handle.is_intersecting());
}

#[test]
fn config_change_resubscribes() {
    let (backend, target, _, mut tracker) = setup();
    tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    tracker
        .attach(Some(target), TrackerConfig::default().with_threshold(0.5))
        .unwrap();

    assert_eq!(backend.observe_calls(), 2);
    assert_eq!(backend.unobserve_calls(), 1);
    assert_eq!(backend.peak_active_watches(), 1);
    assert_eq!(tracker.config().map(|c| c.threshold), Some(0.5));
}

#[test]
fn same_target_and_config_keeps_the_watch() {
    let (backend, target, _, mut tracker) = setup();
    tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    tracker.attach(Some(target), TrackerConfig::default()).unwrap();

    assert_eq!(backend.observe_calls(), 1);
    assert_eq!(backend.unobserve_calls(), 0);
    assert!(tracker.is_attached());
}

#[test]
fn attaching_no_target_releases_the_previous_watch() {
    let (backend, target, _, mut tracker) = setup();
    tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    backend.inject(target, event(true, 1.0));
    backend.flush();

    let handle = tracker.attach(None, TrackerConfig::default()).unwrap();
    assert!(!tracker.is_attached());
    assert_eq!(backend.active_watches(), 0);
    // State only changes through events.
    assert!(handle.is_intersecting());
}

#[test]
fn drop_releases_the_watch() {
    let (backend, target, _, mut tracker) = setup();
    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    backend.inject(target, event(true, 1.0));
    backend.flush();
    backend.inject(target, event(false, 0.0));

    drop(tracker);
    assert_eq!(backend.active_watches(), 0);
    assert_eq!(backend.unobserve_calls(), 1);

    backend.flush();
    assert!(handle.is_intersecting());
}

#[test]
fn unavailable_backend_fails_attach_with_safe_default() {
    let backend = ManualBackend::unavailable();
    let target = backend.add_target("card", Rect::new(0.0, 0.0, 10.0, 10.0));
    let mut tracker = VisibilityTracker::with_sink(backend.clone(), NoopSink);

    let err = tracker
        .attach(Some(target), TrackerConfig::default())
        .unwrap_err();
    assert_eq!(err, TrackerError::BackendUnavailable);
    assert!(!err.is_invalid_config());
    assert!(!tracker.is_intersecting());
    assert!(!tracker.is_attached());
    assert_eq!(backend.active_watches(), 0);

    let mut tracker = VisibilityTracker::new(UnavailableBackend);
    assert_eq!(
        tracker.attach(Some(()), TrackerConfig::default()).unwrap_err(),
        TrackerError::BackendUnavailable
    );
    assert!(!tracker.handle().is_intersecting());
}

#[test]
fn invalid_config_is_rejected_before_teardown() {
    let (backend, target, _, mut tracker) = setup();
    tracker.attach(Some(target), TrackerConfig::default()).unwrap();

    for threshold in [-0.1, 1.5, f64::NAN] {
        let err = tracker
            .attach(Some(target), TrackerConfig::default().with_threshold(threshold))
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidThreshold(_)));
        assert!(err.is_invalid_config());
    }

    let err = tracker
        .attach(Some(target), TrackerConfig::default().with_root_margin("10em"))
        .unwrap_err();
    assert!(matches!(err, TrackerError::InvalidRootMargin { .. }));

    assert!(tracker.is_attached());
    assert_eq!(backend.observe_calls(), 1);
    assert_eq!(backend.unobserve_calls(), 0);
}

#[test]
fn threshold_bounds_are_inclusive() {
    assert!(TrackerConfig::default().with_threshold(0.0).validate().is_ok());
    assert!(TrackerConfig::default().with_threshold(1.0).validate().is_ok());
}

#[test]
fn sink_failure_never_reaches_state() {
    let backend = ManualBackend::new(VIEWPORT);
    let target = backend.add_target("card", Rect::new(0.0, 0.0, 10.0, 10.0));
    let calls = Rc::new(Cell::new(0usize));
    let sink = {
        let calls = Rc::clone(&calls);
        move |_: &DiagnosticEntry| -> Result<(), SinkError> {
            calls.set(calls.get() + 1);
            Err(SinkError("disk full".to_string()))
        }
    };
    let mut tracker = VisibilityTracker::with_sink(backend.clone(), sink);

    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    backend.flush();
    assert!(handle.is_intersecting());
    assert_eq!(calls.get(), 1);
}

#[test]
fn scrolling_reports_only_state_changes() {
    let (backend, target, sink, mut tracker) = setup();
    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    backend.flush();
    assert!(!handle.is_intersecting());

    // Target top is at 2000; the expanded root bottom is at y + 800.
    backend.scroll_by(0.0, 1000.0);
    assert_eq!(backend.flush(), 0);

    backend.scroll_by(0.0, 300.0);
    assert_eq!(backend.flush(), 1);
    assert!(handle.is_intersecting());

    backend.scroll_by(0.0, 100.0);
    assert_eq!(backend.flush(), 0);

    backend.scroll_by(0.0, -1300.0);
    assert_eq!(backend.flush(), 1);
    assert!(!handle.is_intersecting());

    let seen: Vec<bool> = sink.entries().iter().map(|e| e.is_intersecting).collect();
    assert_eq!(seen, [false, true, false]);
}

#[test]
fn moving_a_target_recomputes_its_watches() {
    let (backend, target, _, mut tracker) = setup();
    let handle = tracker.attach(Some(target), TrackerConfig::default()).unwrap();
    backend.flush();

    assert!(backend.set_target_rect(target, Rect::new(0.0, 0.0, 200.0, 300.0)));
    backend.flush();
    assert!(handle.is_intersecting());

    assert!(!backend.set_target_rect(TargetId(99), Rect::default()));
}

#[test]
fn threshold_requires_visible_share() {
    let backend = ManualBackend::new(VIEWPORT);
    // Half of the target is inside the viewport.
    let target = backend.add_target("half", Rect::new(0.0, 500.0, 100.0, 200.0));
    let mut tracker = VisibilityTracker::with_sink(backend.clone(), NoopSink);

    let config = TrackerConfig::new(0.75, "0px");
    let handle = tracker.attach(Some(target), config).unwrap();
    backend.flush();
    assert!(!handle.is_intersecting());

    tracker.attach(Some(target), TrackerConfig::new(0.5, "0px")).unwrap();
    backend.flush();
    assert!(handle.is_intersecting());
}

#[test]
fn platform_overlap_respects_threshold() {
    // A browser reports any overlap as intersecting, whatever the threshold.
    assert!(!meets_threshold(true, 0.1, 0.5));
    assert!(meets_threshold(true, 0.5, 0.5));
    assert!(meets_threshold(true, 0.0, 0.0));
    assert!(!meets_threshold(false, 1.0, 0.0));
    assert!(!meets_threshold(false, 0.0, 0.0));
}

#[cfg(feature = "tracing")]
#[test]
fn default_sink_logs_each_applied_event() {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buf = Buffer::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    let backend = ManualBackend::new(VIEWPORT);
    let target = backend.add_target("card", Rect::new(0.0, 0.0, 100.0, 100.0));
    tracing::subscriber::with_default(subscriber, || {
        let mut tracker = VisibilityTracker::new(backend.clone());
        tracker.attach(Some(target), TrackerConfig::default()).unwrap();
        backend.flush();
        assert!(tracker.is_intersecting());
    });

    let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert_eq!(out.matches("intersection observed").count(), 1, "{out}");
    assert!(out.contains("inview::diagnostics"), "{out}");
    assert!(out.contains("target_label=card"), "{out}");
    assert!(out.contains("is_intersecting=true"), "{out}");
}

#[test]
fn root_margin_parses_css_shorthand() {
    use MarginLength::{Percent, Px};

    let m: RootMargin = "200px".parse().unwrap();
    assert_eq!(m, RootMargin::px(200.0));
    assert_eq!(m.to_string(), "200px 200px 200px 200px");

    let m: RootMargin = "10px 20%".parse().unwrap();
    assert_eq!(
        (m.top, m.right, m.bottom, m.left),
        (Px(10.0), Percent(20.0), Px(10.0), Percent(20.0))
    );

    let m: RootMargin = "1px 2px 3px".parse().unwrap();
    assert_eq!((m.top, m.right, m.bottom, m.left), (Px(1.0), Px(2.0), Px(3.0), Px(2.0)));

    let m: RootMargin = "  -1px 0 3PX 4% ".parse().unwrap();
    assert_eq!(
        (m.top, m.right, m.bottom, m.left),
        (Px(-1.0), Px(0.0), Px(3.0), Percent(4.0))
    );
}

#[test]
fn root_margin_rejects_malformed_input() {
    let inputs = [
        "",
        "   ",
        "10",
        "10em",
        "px",
        "abcpx",
        "1px 2px 3px 4px 5px",
        "infpx",
        "%",
    ];
    for input in inputs {
        let err = input.parse::<RootMargin>().unwrap_err();
        assert!(
            matches!(&err, TrackerError::InvalidRootMargin { input: i, .. } if i == input),
            "input={input:?} err={err:?}"
        );
    }
}

#[test]
fn intersection_geometry() {
    let root = Rect::new(0.0, 0.0, 100.0, 100.0);
    let none = ObserveOptions::default();
    let check = |target: Rect, options: &ObserveOptions| {
        compute_intersection(&root, &target, options)
    };

    // Fully inside.
    assert_eq!(check(Rect::new(10.0, 10.0, 10.0, 10.0), &none), (true, 1.0));
    // Quarter inside.
    assert_eq!(check(Rect::new(90.0, 90.0, 20.0, 20.0), &none), (true, 0.25));
    // Edge-adjacent counts as intersecting with a zero ratio.
    assert_eq!(check(Rect::new(0.0, 100.0, 10.0, 10.0), &none), (true, 0.0));
    // Disjoint.
    assert_eq!(check(Rect::new(0.0, 150.0, 10.0, 10.0), &none), (false, 0.0));
    // Zero-area target inside the root.
    assert_eq!(check(Rect::new(5.0, 5.0, 0.0, 0.0), &none), (true, 1.0));

    let margin = ObserveOptions {
        threshold: 0.0,
        root_margin: "50%".parse().unwrap(),
    };
    assert_eq!(check(Rect::new(0.0, 140.0, 10.0, 10.0), &margin), (true, 1.0));

    let shrink = ObserveOptions {
        threshold: 0.0,
        root_margin: RootMargin::px(-60.0),
    };
    assert_eq!(root.expand_by(&shrink.root_margin), Rect::new(60.0, 60.0, 0.0, 0.0));
    assert_eq!(check(Rect::new(0.0, 0.0, 10.0, 10.0), &shrink), (false, 0.0));
}

#[test]
fn injecting_without_watches_queues_nothing() {
    let backend = ManualBackend::new(VIEWPORT);
    let target = backend.add_target("card", Rect::default());
    assert_eq!(backend.inject(target, event(true, 1.0)), 0);
    assert_eq!(backend.pending(), 0);
    assert!(backend.remove_target(target));
    assert!(!backend.remove_target(target));
}
