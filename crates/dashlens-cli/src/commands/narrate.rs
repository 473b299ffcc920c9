//! `dashlens narrate`: impact narrative for one metric card.

use dashlens_core::{MetricCard, MetricValue, Narrative, generate};

pub fn run(label: &str, value: &str, json: bool) {
    let card = MetricCard {
        label: label.to_string(),
        value: MetricValue::Text(value.to_string()),
    };
    let narrative = generate(&card);
    if json {
        match serde_json::to_string_pretty(&narrative) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Failed to serialize narrative: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", format_text(&card, &narrative));
    }
}

fn format_text(card: &MetricCard, narrative: &Narrative) -> String {
    let mut out = format!("{}: {}\n\n{}\n\n", card.label, card.value, narrative.story);
    let width = narrative
        .metrics
        .iter()
        .map(|m| m.value.chars().count())
        .max()
        .unwrap_or(0);
    for m in &narrative.metrics {
        out.push_str(&format!("  {:>width$}  {}\n", m.value, m.label));
    }
    out
}
