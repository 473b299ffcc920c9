//! `dashlens replay`: feed a recorded event log through a dashboard.

use dashlens_core::{PageEvent, PageSpec};

pub fn run(events_path: &str, page_path: Option<&str>, config_path: Option<&str>, seed: u64) {
    let config = super::load_config(config_path);
    let page = page_path.map(super::load_page).unwrap_or_else(PageSpec::default);
    let events = load_events(events_path);
    let mut dashboard = super::build_dashboard(&page, config, seed);

    for (i, event) in events.into_iter().enumerate() {
        let label = event_label(&event);
        let reactions = dashboard.handle(event);
        if reactions.is_empty() {
            println!("#{i:<4} {label}");
            continue;
        }
        for reaction in reactions {
            match serde_json::to_string(&reaction) {
                Ok(json) => println!("#{i:<4} {label:<10} -> {json}"),
                Err(e) => log::warn!("unserializable reaction: {e}"),
            }
        }
    }

    println!();
    match serde_json::to_string_pretty(dashboard.engagement_state()) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize engagement state: {e}"),
    }
}

fn load_events(path: &str) -> Vec<PageEvent> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {path}: {e}");
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&raw) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Failed to parse events {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn event_label(event: &PageEvent) -> &'static str {
    match event {
        PageEvent::Scroll { .. } => "scroll",
        PageEvent::Click { .. } => "click",
        PageEvent::Key { .. } => "key",
        PageEvent::Visibility { .. } => "visibility",
        PageEvent::Advance { .. } => "advance",
    }
}
