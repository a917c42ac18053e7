// Example: a catalog page with lazily revealed cards, popularity sorting and form validation.
use inview::{ManualBackend, Rect, TrackerConfig};
use inview_adapter::{
    AnimeSummary, Controller, Feedback, SortOrder, sort_by_popularity, validate_feedback,
};

fn main() {
    let catalog = [
        AnimeSummary::new(5114, "Fullmetal Alchemist: Brotherhood", Some(2_100_000)),
        AnimeSummary::new(52991, "Sousou no Frieren", Some(650_000)),
        AnimeSummary::new(9253, "Steins;Gate", Some(1_400_000)),
        AnimeSummary::new(1, "Cowboy Bebop", None),
    ];
    let order = "desc".parse::<SortOrder>().ok();
    let sorted = sort_by_popularity(&catalog, order);

    let backend = ManualBackend::new(Rect::new(0.0, 0.0, 1024.0, 768.0));
    let mut cards: Vec<(String, Controller<ManualBackend>)> = sorted
        .iter()
        .enumerate()
        .map(|(row, anime)| {
            let rect = Rect::new(0.0, row as f64 * 500.0, 1024.0, 450.0);
            let target = backend.add_target(anime.title.clone(), rect);
            let mut c = Controller::new(backend.clone())
                .with_config(TrackerConfig::default().with_threshold(0.1));
            c.on_mount(target).expect("valid config");
            (anime.title.clone(), c)
        })
        .collect();

    backend.flush();
    for (title, c) in &cards {
        println!("{title:<36} visible={}", c.is_visible());
    }

    backend.scroll_by(0.0, 900.0);
    backend.flush();
    println!("after scrolling 900px:");
    for (title, c) in &cards {
        println!("{title:<36} visible={}", c.is_visible());
    }

    for (_, c) in &mut cards {
        c.on_unmount();
    }
    println!("active watches: {}", backend.active_watches());

    let feedback = Feedback {
        name: "Rin".into(),
        email: "rin@example".into(),
        message: "Please add a seasonal chart.".into(),
        rating: Some(5),
    };
    match validate_feedback(feedback) {
        Ok(f) => println!("feedback accepted from {}", f.email),
        Err(err) => println!("feedback rejected: {err}"),
    }
}
