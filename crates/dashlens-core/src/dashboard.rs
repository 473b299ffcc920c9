//! Engine facade.
//!
//! A [`Dashboard`] owns one rendering surface and every piece of per-session
//! state: engagement flags, pending card reveals, wired panels and the focus
//! controller. Hosts call the `create_*` builders to render widgets and feed
//! page events through [`Dashboard::handle`].

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::chart::{self, ChartData, ChartHandle, ChartKind, ChartOptions, GaugeData, GaugeOptions};
use crate::config::EngineConfig;
use crate::engagement::{self, EngagementState, EngagementTracker, Moment};
use crate::error::Result;
use crate::focus::FocusController;
use crate::heatmap::{self, HeatMatrix, HeatmapGrid, HeatmapOptions};
use crate::narrative::{MetricCard, MetricValue, Narrative, RevealTracker};
use crate::panel::ContextPanel;
use crate::progress::{self, ProgressHandle, ProgressOptions};
use crate::surface::{Surface, Viewport};
use crate::tooltip;

/// Attributes that tag host markup as a metric card.
pub const METRIC_LABEL_ATTR: &str = "data-metric-label";
pub const METRIC_VALUE_ATTR: &str = "data-metric-value";

const DEFAULT_SEED: u64 = 0x5EED_DA5B;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Input from the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    Scroll { viewport: Viewport },
    Click { element: String },
    Key { element: String, key: String },
    /// Fraction of `element` now inside the viewport.
    Visibility { element: String, ratio: f64 },
    /// Virtual time passing (memory surface only).
    Advance { ms: u64 },
}

/// Observable outcome of handling an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reaction", rename_all = "snake_case")]
pub enum Reaction {
    MomentFired { moment: Moment, anchor: String },
    PanelToggled { container: String, open: bool },
    CardRevealed { card: String },
    FocusChanged { competing_hidden: bool },
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard<S: Surface> {
    surface: S,
    config: EngineConfig,
    tracker: EngagementTracker,
    reveal: RevealTracker,
    panels: Vec<ContextPanel>,
    focus: FocusController,
    rng: SmallRng,
}

impl<S: Surface> Dashboard<S> {
    pub fn new(surface: S, config: EngineConfig) -> Self {
        Self::with_seed(surface, config, DEFAULT_SEED)
    }

    /// `seed` drives the decorative randomness of overlays.
    pub fn with_seed(surface: S, config: EngineConfig, seed: u64) -> Self {
        Self {
            tracker: EngagementTracker::new(config.engagement.clone()),
            reveal: RevealTracker::new(config.reveal.clone()),
            focus: FocusController::new(config.focus.clone()),
            panels: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            surface,
            config,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engagement_state(&self) -> &EngagementState {
        self.tracker.state()
    }

    pub fn panels(&self) -> &[ContextPanel] {
        &self.panels
    }

    // -----------------------------------------------------------------------
    // Charts
    // -----------------------------------------------------------------------

    pub fn create_chart(
        &mut self,
        kind: ChartKind,
        target_id: &str,
        data: ChartData,
        options: ChartOptions,
    ) -> Result<ChartHandle> {
        chart::build_chart(&mut self.surface, kind, target_id, data, options, &self.config.palette)
    }

    pub fn create_line_chart(&mut self, target_id: &str, data: ChartData, options: ChartOptions) -> Result<ChartHandle> {
        self.create_chart(ChartKind::Line, target_id, data, options)
    }

    pub fn create_bar_chart(&mut self, target_id: &str, data: ChartData, options: ChartOptions) -> Result<ChartHandle> {
        self.create_chart(ChartKind::Bar, target_id, data, options)
    }

    pub fn create_doughnut_chart(
        &mut self,
        target_id: &str,
        data: ChartData,
        options: ChartOptions,
    ) -> Result<ChartHandle> {
        self.create_chart(ChartKind::Doughnut, target_id, data, options)
    }

    pub fn create_radar_chart(&mut self, target_id: &str, data: ChartData, options: ChartOptions) -> Result<ChartHandle> {
        self.create_chart(ChartKind::Radar, target_id, data, options)
    }

    pub fn create_scatter_chart(
        &mut self,
        target_id: &str,
        data: ChartData,
        options: ChartOptions,
    ) -> Result<ChartHandle> {
        self.create_chart(ChartKind::Scatter, target_id, data, options)
    }

    pub fn create_gauge_chart(
        &mut self,
        target_id: &str,
        value: f64,
        max_value: f64,
        options: GaugeOptions,
    ) -> Result<ChartHandle> {
        let data = GaugeData { value, max_value };
        chart::build_gauge(&mut self.surface, target_id, data, options, &self.config.palette)
    }

    // -----------------------------------------------------------------------
    // Heatmap and progress
    // -----------------------------------------------------------------------

    pub fn create_heatmap(
        &mut self,
        container_id: &str,
        values: Vec<Vec<f64>>,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        options: &HeatmapOptions,
    ) -> Result<HeatmapGrid> {
        let matrix = HeatMatrix::new(values, row_labels, col_labels)?;
        heatmap::render_heatmap(
            &mut self.surface,
            container_id,
            &matrix,
            options,
            &self.config.palette.color_scale,
        )
    }

    pub fn create_progress_bar(
        &mut self,
        container_id: &str,
        value: f64,
        max_value: f64,
        options: &ProgressOptions,
    ) -> Result<ProgressHandle> {
        progress::create_progress_bar(
            &mut self.surface,
            container_id,
            value,
            max_value,
            options,
            &self.config.palette.gauge_bands,
            &self.config.animation,
        )
    }

    /// Show the celebratory overlay at `element`, outside the built-in triggers.
    pub fn create_success_moment(&mut self, element: &str, message: &str) -> bool {
        engagement::create_success_moment(
            &mut self.surface,
            element,
            message,
            &self.config.engagement,
            &mut self.rng,
        )
    }

    // -----------------------------------------------------------------------
    // Host markup enhancement
    // -----------------------------------------------------------------------

    pub fn personalize_card(&mut self, card_id: &str, card: &MetricCard) -> Option<Narrative> {
        self.reveal.personalize(&mut self.surface, card_id, card)
    }

    /// Personalize every element tagged with the metric card attributes.
    pub fn personalize_cards(&mut self) -> Vec<String> {
        let mut done = Vec::new();
        for id in self.surface.query_attribute(METRIC_LABEL_ATTR) {
            let Some(label) = self.surface.attribute(&id, METRIC_LABEL_ATTR) else {
                continue;
            };
            let value = self.surface.attribute(&id, METRIC_VALUE_ATTR).unwrap_or_default();
            let card = MetricCard {
                label,
                value: MetricValue::Text(value),
            };
            if self.personalize_card(&id, &card).is_some() {
                done.push(id);
            }
        }
        done
    }

    /// Cards rendered but not yet revealed.
    pub fn pending_reveals(&self) -> Vec<String> {
        self.reveal.observed().map(str::to_string).collect()
    }

    /// Wire the contextual panel of every primary visualization container.
    /// Containers wired earlier are skipped.
    pub fn wire_panels(&mut self) -> usize {
        let body = self.surface.body_id().to_string();
        let containers = self.surface.query_class(&body, &self.config.focus.primary_class);
        let before = self.panels.len();
        for container in containers {
            if self.panels.iter().any(|p| p.container() == container) {
                continue;
            }
            if let Some(panel) = ContextPanel::wire(&mut self.surface, &container) {
                self.panels.push(panel);
            }
        }
        self.panels.len() - before
    }

    pub fn enhance_tooltips(&mut self) -> Vec<String> {
        tooltip::enhance_tooltips(&mut self.surface)
    }

    /// Run every markup enhancement once.
    pub fn install(&mut self) {
        let panels = self.wire_panels();
        let tips = self.enhance_tooltips().len();
        let cards = self.personalize_cards().len();
        log::debug!("installed: {panels} panels, {tips} tooltips, {cards} metric cards");
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn handle(&mut self, event: PageEvent) -> Vec<Reaction> {
        let mut reactions = Vec::new();
        match event {
            PageEvent::Scroll { viewport } => self.on_scroll(viewport, &mut reactions),
            PageEvent::Click { element } => {
                for panel in &mut self.panels {
                    if let Some(open) = panel.on_click(&mut self.surface, &element) {
                        reactions.push(Reaction::PanelToggled {
                            container: panel.container().to_string(),
                            open,
                        });
                    }
                }
                if let Some(moment) = self.tracker.on_interaction(&mut self.surface, &element, &mut self.rng) {
                    reactions.push(Reaction::MomentFired {
                        moment,
                        anchor: element,
                    });
                }
            }
            PageEvent::Key { element, key } => {
                for panel in &mut self.panels {
                    if let Some(open) = panel.on_key(&mut self.surface, &element, &key) {
                        reactions.push(Reaction::PanelToggled {
                            container: panel.container().to_string(),
                            open,
                        });
                    }
                }
            }
            PageEvent::Visibility { element, ratio } => {
                if self.reveal.on_visibility(&mut self.surface, &element, ratio) {
                    reactions.push(Reaction::CardRevealed { card: element });
                }
            }
            PageEvent::Advance { ms } => self.surface.advance_clock(ms),
        }
        reactions
    }

    fn on_scroll(&mut self, viewport: Viewport, reactions: &mut Vec<Reaction>) {
        let anchor = self.surface.body_id().to_string();
        if let Some(moment) = self.tracker.on_scroll(&mut self.surface, viewport, &anchor, &mut self.rng) {
            reactions.push(Reaction::MomentFired { moment, anchor });
        }

        let (competing_hidden, changed) = self.focus.update(&mut self.surface, viewport.viewport_height);
        if changed {
            reactions.push(Reaction::FocusChanged { competing_hidden });
        }

        // Cards with known layout reveal on scroll as well.
        for card in self.pending_reveals() {
            let Some(rect) = self.surface.bounding_box(&card) else {
                continue;
            };
            let ratio = rect.visible_ratio(viewport.viewport_height);
            if self.reveal.on_visibility(&mut self.surface, &card, ratio) {
                reactions.push(Reaction::CardRevealed { card });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Dataset;
    use crate::memory::MemorySurface;
    use crate::surface::{Node, Rect};

    fn dashboard() -> Dashboard<MemorySurface> {
        let surface = MemorySurface::with_markup(vec![
            Node::new("div")
                .id("viz")
                .class("visualization-container")
                .child(Node::new("canvas").id("sales"))
                .child(Node::new("button").id("details").class("panel-trigger interactive"))
                .child(Node::new("p").class("viz-description").text("Sales by quarter")),
            Node::new("div")
                .id("card")
                .attr(METRIC_LABEL_ATTR, "Accuracy")
                .attr(METRIC_VALUE_ATTR, "96%"),
            Node::new("span").id("meta").class("meta-info"),
        ]);
        Dashboard::new(surface, EngineConfig::default())
    }

    #[test]
    fn chart_builders_use_their_kind() {
        let mut d = dashboard();
        let data = ChartData {
            labels: vec!["a".into()],
            datasets: vec![Dataset::new("x", [1.0])],
        };
        let h = d.create_bar_chart("sales", data.clone(), ChartOptions::default()).unwrap();
        assert_eq!(h.spec.kind, ChartKind::Bar);
        let h = d.create_radar_chart("sales", data, ChartOptions::default()).unwrap();
        assert_eq!(h.spec.kind, ChartKind::Radar);
        assert_eq!(d.surface().chart_count(), 1);
    }

    #[test]
    fn missing_targets_fail_fast() {
        let mut d = dashboard();
        assert!(d.create_line_chart("nope", ChartData::default(), ChartOptions::default()).is_err());
        assert!(d.create_gauge_chart("nope", 1.0, 2.0, GaugeOptions::default()).is_err());
        assert!(d.create_progress_bar("nope", 1.0, 2.0, &ProgressOptions::default()).is_err());
    }

    #[test]
    fn install_wires_panels_and_cards() {
        let mut d = dashboard();
        d.install();
        assert_eq!(d.panels().len(), 1);
        assert_eq!(d.pending_reveals(), vec!["card".to_string()]);
        // Idempotent.
        d.install();
        assert_eq!(d.panels().len(), 1);
    }

    #[test]
    fn clicks_reach_panels_and_tracker() {
        let mut d = dashboard();
        d.install();
        let r = d.handle(PageEvent::Click {
            element: "details".into(),
        });
        assert_eq!(
            r,
            vec![Reaction::PanelToggled {
                container: "viz".into(),
                open: true
            }]
        );
        assert_eq!(d.engagement_state().interaction_count, 1);
    }

    #[test]
    fn scroll_reveals_cards_with_layout() {
        let mut d = dashboard();
        d.install();
        d.surface_mut().set_bounding_box("card", Rect::new(0.0, 900.0, 300.0, 100.0));
        let vp = Viewport::new(0.0, 3000.0, 800.0);
        let r = d.handle(PageEvent::Scroll { viewport: vp });
        assert!(!r.contains(&Reaction::CardRevealed { card: "card".into() }));

        d.surface_mut().scroll_by(200.0);
        let r = d.handle(PageEvent::Scroll {
            viewport: Viewport::new(200.0, 3000.0, 800.0),
        });
        assert!(r.contains(&Reaction::CardRevealed { card: "card".into() }));
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let e: PageEvent = serde_json::from_str(r#"{"type":"key","element":"t","key":"Enter"}"#).unwrap();
        assert_eq!(
            e,
            PageEvent::Key {
                element: "t".into(),
                key: "Enter".into()
            }
        );
        let e: PageEvent = serde_json::from_str(
            r#"{"type":"scroll","viewport":{"scroll_top":10,"scroll_height":900,"viewport_height":600}}"#,
        )
        .unwrap();
        assert!(matches!(e, PageEvent::Scroll { .. }));
    }
}
