//! Narrative generator.
//!
//! Turns a metric card (label + value) into a short "impact" story and three
//! derived metrics. Classification is a fixed substring match on the label;
//! derived numbers are fixed except where they come from the value itself.
//!
//! [`generate`] is pure. [`RevealTracker`] renders the result into a card on a
//! surface and defers its reveal until the card is sufficiently visible.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::RevealConfig;
use crate::helpers::{format_number, leading_number};
use crate::surface::{Node, Surface};

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Raw card value as authored: a number or free text such as `"96%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Leading numeric part, if any.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => leading_number(s),
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub label: String,
    pub value: MetricValue,
}

impl MetricCard {
    pub fn new(label: &str, value: impl Into<MetricValue>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeTheme {
    Performance,
    Time,
    Generic,
}

/// Label substring match, checked in this order.
pub fn classify(label: &str) -> NarrativeTheme {
    if label.contains("Accuracy") || label.contains("Performance") {
        NarrativeTheme::Performance
    } else if label.contains("Time") || label.contains("Speed") {
        NarrativeTheme::Time
    } else {
        NarrativeTheme::Generic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetric {
    pub value: String,
    pub label: String,
}

impl DerivedMetric {
    fn new(value: impl Into<String>, label: &str) -> Self {
        Self {
            value: value.into(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub theme: NarrativeTheme,
    pub story: String,
    pub metrics: Vec<DerivedMetric>,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Fixed productivity gain quoted by performance stories.
const PRODUCTIVITY_GAIN: &str = "27%";

pub fn generate(card: &MetricCard) -> Narrative {
    match classify(&card.label) {
        NarrativeTheme::Performance => match card.value.numeric() {
            Some(accuracy) => performance(accuracy),
            // A performance label without a number reads as an adoption story.
            None => generic(card),
        },
        NarrativeTheme::Time => time(card),
        NarrativeTheme::Generic => generic(card),
    }
}

fn performance(accuracy: f64) -> Narrative {
    let share = if accuracy > 90.0 {
        "nearly all"
    } else if accuracy > 75.0 {
        "most"
    } else if accuracy > 50.0 {
        "more than half"
    } else {
        "a growing share"
    };
    let pct = format_number(accuracy);
    let story = format!(
        "At {pct}% accuracy, the model gets {share} of its answers right the first time. \
         That means your team spends less time double-checking results and more time acting on them."
    );
    Narrative {
        theme: NarrativeTheme::Performance,
        story,
        metrics: vec![
            DerivedMetric::new(format!("{pct}%"), "Accuracy"),
            DerivedMetric::new(format!("{}%", format_number(100.0 - accuracy)), "Time Saved"),
            DerivedMetric::new(PRODUCTIVITY_GAIN, "Productivity Gain"),
        ],
    }
}

fn time(card: &MetricCard) -> Narrative {
    let raw = card.value.to_string();
    let story = format!(
        "Answers arrive in {raw}. Work that used to take an afternoon of searching \
         now fits between meetings, freeing hours every week for decisions that matter."
    );
    Narrative {
        theme: NarrativeTheme::Time,
        story,
        metrics: vec![
            DerivedMetric::new(raw, "Processing Time"),
            DerivedMetric::new("94%", "Time Saved"),
            DerivedMetric::new("3.5x", "Productivity"),
        ],
    }
}

fn generic(card: &MetricCard) -> Narrative {
    let raw = card.value.to_string();
    let story = format!(
        "{} stands at {raw}. Teams that adopt these insights report higher satisfaction \
         and measurably smoother day-to-day work.",
        card.label
    );
    Narrative {
        theme: NarrativeTheme::Generic,
        story,
        metrics: vec![
            DerivedMetric::new(raw, &card.label),
            DerivedMetric::new("27%", "Satisfaction"),
            DerivedMetric::new("41%", "Efficiency"),
        ],
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Attribute that marks a card as already personalized.
pub const PERSONALIZED_ATTR: &str = "data-personalized";
/// Class a card carries until it is revealed.
pub const PENDING_CLASS: &str = "reveal-pending";

/// Markup for a narrative, without the enclosing card.
pub fn narrative_nodes(narrative: &Narrative) -> Vec<Node> {
    let metrics = narrative.metrics.iter().map(|m| {
        Node::new("div")
            .class("impact-metric")
            .child(Node::new("span").class("impact-value").text(m.value.clone()))
            .child(Node::new("span").class("impact-label").text(m.label.clone()))
    });
    vec![
        Node::new("p").class("impact-story").text(narrative.story.clone()),
        Node::new("div").class("impact-metrics").children(metrics),
    ]
}

/// Renders narratives into cards and tracks which cards await reveal.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    config: RevealConfig,
    observed: BTreeSet<String>,
}

impl RevealTracker {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            observed: BTreeSet::new(),
        }
    }

    /// Render `card` into element `card_id` once.
    ///
    /// Returns the narrative when rendered, `None` when the card was already
    /// personalized or does not exist.
    pub fn personalize<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        card_id: &str,
        card: &MetricCard,
    ) -> Option<Narrative> {
        if !surface.contains(card_id) {
            log::debug!("metric card #{card_id} not on page; skipping");
            return None;
        }
        if surface.attribute(card_id, PERSONALIZED_ATTR).is_some() {
            return None;
        }
        // Mark first so a re-entrant call during rendering is a no-op.
        surface.set_attribute(card_id, PERSONALIZED_ATTR, "true").ok()?;

        let narrative = generate(card);
        let mut nodes = vec![
            Node::new("div")
                .class("impact-headline")
                .child(Node::new("span").class("metric-value").text(card.value.to_string()))
                .child(Node::new("span").class("metric-label").text(card.label.clone())),
        ];
        nodes.extend(narrative_nodes(&narrative));

        let rendered = surface.replace_children(card_id, nodes).is_ok()
            && surface.add_class(card_id, PENDING_CLASS).is_ok();
        if !rendered {
            return None;
        }
        self.observed.insert(card_id.to_string());
        Some(narrative)
    }

    /// Visibility callback. Reveals the card the first time at least the
    /// threshold fraction of it is visible, then stops watching it.
    pub fn on_visibility<S: Surface + ?Sized>(&mut self, surface: &mut S, card_id: &str, ratio: f64) -> bool {
        if ratio < self.config.visibility_threshold || !self.observed.contains(card_id) {
            return false;
        }
        self.observed.remove(card_id);
        let _ = surface.remove_class(card_id, PENDING_CLASS);
        surface.add_class(card_id, &self.config.reveal_class).is_ok()
    }

    pub fn is_observing(&self, card_id: &str) -> bool {
        self.observed.contains(card_id)
    }

    pub fn observed(&self) -> impl Iterator<Item = &str> {
        self.observed.iter().map(String::as_str)
    }

    pub fn threshold(&self) -> f64 {
        self.config.visibility_threshold
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;

    #[test]
    fn classification_by_label_substring() {
        assert_eq!(classify("Model Accuracy"), NarrativeTheme::Performance);
        assert_eq!(classify("Query Performance"), NarrativeTheme::Performance);
        assert_eq!(classify("Response Time"), NarrativeTheme::Time);
        assert_eq!(classify("Search Speed"), NarrativeTheme::Time);
        assert_eq!(classify("Active Users"), NarrativeTheme::Generic);
        // Case-sensitive, like the label convention.
        assert_eq!(classify("accuracy"), NarrativeTheme::Generic);
    }

    #[test]
    fn high_accuracy_reads_nearly_all() {
        let n = generate(&MetricCard::new("Accuracy", "96%"));
        assert_eq!(n.theme, NarrativeTheme::Performance);
        assert!(n.story.contains("nearly all"));
        assert_eq!(n.metrics[0], DerivedMetric::new("96%", "Accuracy"));
        assert_eq!(n.metrics[1], DerivedMetric::new("4%", "Time Saved"));
        assert_eq!(n.metrics[2], DerivedMetric::new("27%", "Productivity Gain"));
    }

    #[test]
    fn accuracy_tiers() {
        assert!(generate(&MetricCard::new("Accuracy", 80.0)).story.contains("most"));
        assert!(generate(&MetricCard::new("Accuracy", "60")).story.contains("more than half"));
        assert!(generate(&MetricCard::new("Accuracy", 20.0)).story.contains("a growing share"));
        // Exactly 90 is not above 90.
        assert!(!generate(&MetricCard::new("Accuracy", 90.0)).story.contains("nearly all"));
    }

    #[test]
    fn time_story_quotes_raw_value() {
        let n = generate(&MetricCard::new("Avg Response Time", "1.2s"));
        assert_eq!(n.theme, NarrativeTheme::Time);
        assert!(n.story.contains("1.2s"));
        assert_eq!(n.metrics[0], DerivedMetric::new("1.2s", "Processing Time"));
        assert_eq!(n.metrics[1].value, "94%");
        assert_eq!(n.metrics[2].value, "3.5x");
    }

    #[test]
    fn numeric_time_value_is_quoted_unrounded() {
        let n = generate(&MetricCard::new("Query Time", 1.234));
        assert_eq!(n.theme, NarrativeTheme::Time);
        assert!(n.story.contains("in 1.234."));
        assert_eq!(n.metrics[0].value, "1.234");
    }

    #[test]
    fn generic_story_echoes_pair() {
        let n = generate(&MetricCard::new("Documents Indexed", 12500.0));
        assert_eq!(n.theme, NarrativeTheme::Generic);
        assert_eq!(n.metrics[0], DerivedMetric::new("12500", "Documents Indexed"));
        assert_eq!(n.metrics[1], DerivedMetric::new("27%", "Satisfaction"));
        assert_eq!(n.metrics[2], DerivedMetric::new("41%", "Efficiency"));
    }

    #[test]
    fn non_numeric_accuracy_falls_back_to_generic() {
        let n = generate(&MetricCard::new("Accuracy", "pending"));
        assert_eq!(n.theme, NarrativeTheme::Generic);
    }

    #[test]
    fn personalize_is_idempotent() {
        let mut s = MemorySurface::with_markup(vec![Node::new("div").id("card")]);
        let mut p = RevealTracker::new(RevealConfig::default());
        let card = MetricCard::new("Accuracy", "96%");
        assert!(p.personalize(&mut s, "card", &card).is_some());
        let first = s.document_html();
        assert!(p.personalize(&mut s, "card", &card).is_none());
        assert_eq!(s.document_html(), first);
        assert!(s.has_class("card", PENDING_CLASS));
    }

    #[test]
    fn reveal_fires_once_at_threshold() {
        let mut s = MemorySurface::with_markup(vec![Node::new("div").id("card")]);
        let mut p = RevealTracker::new(RevealConfig::default());
        p.personalize(&mut s, "card", &MetricCard::new("Users", 10.0));

        assert!(!p.on_visibility(&mut s, "card", 0.29));
        assert!(p.on_visibility(&mut s, "card", 0.3));
        assert!(s.has_class("card", "revealed"));
        assert!(!s.has_class("card", PENDING_CLASS));
        assert!(!p.is_observing("card"));

        // Scrolling away and back does nothing further.
        s.remove_class("card", "revealed").unwrap();
        assert!(!p.on_visibility(&mut s, "card", 1.0));
        assert!(!s.has_class("card", "revealed"));
    }

    #[test]
    fn missing_card_is_skipped() {
        let mut s = MemorySurface::new();
        let mut p = RevealTracker::new(RevealConfig::default());
        assert!(p.personalize(&mut s, "ghost", &MetricCard::new("Users", 1.0)).is_none());
    }
}
