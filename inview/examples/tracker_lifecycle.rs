// Example: re-targeting, stale events, and a missing backend.
use inview::{
    ManualBackend, ObservationEvent, Rect, TrackerConfig, TrackerError, UnavailableBackend,
    VisibilityTracker,
};

fn main() {
    let backend = ManualBackend::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    let a = backend.add_target("banner", Rect::new(0.0, 0.0, 800.0, 100.0));
    let b = backend.add_target("footer", Rect::new(0.0, 5000.0, 800.0, 100.0));

    let mut tracker = VisibilityTracker::new(backend.clone());
    let handle = tracker.attach(Some(a), TrackerConfig::default()).unwrap();
    backend.flush();
    println!("banner visible={}", handle.is_intersecting());

    // An event queued for the old watch is discarded once the tracker moves on.
    backend.inject(a, ObservationEvent::new("banner", false, 0.0));
    tracker
        .attach(Some(b), TrackerConfig::new(0.5, "0px"))
        .unwrap();
    backend.flush();
    println!(
        "footer visible={} active_watches={}",
        handle.is_intersecting(),
        backend.active_watches()
    );

    let mut headless = VisibilityTracker::new(UnavailableBackend);
    match headless.attach(Some(()), TrackerConfig::default()) {
        Err(TrackerError::BackendUnavailable) => {
            println!("no backend; visible={}", headless.is_intersecting());
        }
        other => println!("unexpected: {other:?}"),
    }

    let err = tracker
        .attach(Some(a), TrackerConfig::default().with_root_margin("2rem"))
        .unwrap_err();
    println!("invalid config: {err}");
}
