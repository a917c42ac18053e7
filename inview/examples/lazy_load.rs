// Example: lazy-loading cards as a simulated viewport scrolls.
use inview::{ManualBackend, Rect, RecordingSink, TrackerConfig, VisibilityTracker};

fn main() {
    let backend = ManualBackend::new(Rect::new(0.0, 0.0, 1280.0, 720.0));
    let sink = RecordingSink::new();

    let mut trackers = Vec::new();
    for row in 0..10 {
        let y = row as f64 * 400.0;
        let card = backend.add_target(format!("card-{row}"), Rect::new(0.0, y, 1280.0, 360.0));
        let mut t = VisibilityTracker::with_sink(backend.clone(), sink.clone());
        t.attach(Some(card), TrackerConfig::default())
            .expect("default config is valid");
        trackers.push(t);
    }

    for step in 0..5 {
        backend.flush();
        let visible: Vec<usize> = trackers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_intersecting())
            .map(|(i, _)| i)
            .collect();
        println!(
            "scroll_y={} visible={visible:?}",
            backend.viewport().y
        );
        if step < 4 {
            backend.scroll_by(0.0, 600.0);
        }
    }

    println!("diagnostic entries: {}", sink.len());
    drop(trackers);
    println!("active watches after drop: {}", backend.active_watches());
}
