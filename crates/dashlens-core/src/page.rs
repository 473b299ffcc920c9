//! Declarative page descriptions.
//!
//! A [`PageSpec`] lists widgets in render order. Targets that do not exist
//! yet are created under the body, so a page description alone is enough to
//! produce a complete document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chart::{ChartData, ChartHandle, ChartKind, ChartOptions, GaugeOptions};
use crate::dashboard::{Dashboard, METRIC_LABEL_ATTR, METRIC_VALUE_ATTR};
use crate::error::Result;
use crate::heatmap::{HeatmapGrid, HeatmapOptions};
use crate::narrative::{MetricCard, MetricValue, Narrative};
use crate::progress::{ProgressHandle, ProgressOptions};
use crate::surface::{Node, Rect, Surface};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    pub title: Option<String>,
    /// Host markup inserted before any widget.
    pub markup: Vec<Node>,
    pub widgets: Vec<WidgetSpec>,
    /// Bounding boxes for surfaces without a layout engine, keyed by id.
    pub layout: BTreeMap<String, Rect>,
}

impl PageSpec {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "lowercase")]
pub enum WidgetSpec {
    Chart {
        target: String,
        #[serde(rename = "type")]
        kind: ChartKind,
        #[serde(default)]
        data: ChartData,
        #[serde(default)]
        options: ChartOptions,
    },
    Gauge {
        target: String,
        value: f64,
        max_value: f64,
        #[serde(default)]
        options: GaugeOptions,
    },
    Heatmap {
        target: String,
        values: Vec<Vec<f64>>,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        #[serde(default)]
        options: HeatmapOptions,
    },
    Progress {
        target: String,
        value: f64,
        max_value: f64,
        #[serde(default)]
        options: ProgressOptions,
    },
    Metric {
        target: String,
        label: String,
        value: MetricValue,
    },
}

impl WidgetSpec {
    pub fn target(&self) -> &str {
        match self {
            Self::Chart { target, .. }
            | Self::Gauge { target, .. }
            | Self::Heatmap { target, .. }
            | Self::Progress { target, .. }
            | Self::Metric { target, .. } => target,
        }
    }

    /// Element created when the target is missing.
    fn placeholder(&self) -> Node {
        let target = self.target();
        match self {
            Self::Chart { .. } | Self::Gauge { .. } => Node::new("div")
                .id(format!("{target}-container"))
                .class("visualization-container")
                .child(Node::new("canvas").id(target)),
            Self::Heatmap { .. } => Node::new("div").id(target).class("visualization-container heatmap"),
            Self::Progress { .. } => Node::new("div").id(target).class("progress-container"),
            Self::Metric { label, value, .. } => Node::new("div")
                .id(target)
                .class("metric-card")
                .attr(METRIC_LABEL_ATTR, label.clone())
                .attr(METRIC_VALUE_ATTR, value.to_string()),
        }
    }
}

/// Everything a page render produced, in widget order per kind.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub charts: Vec<ChartHandle>,
    pub heatmaps: Vec<HeatmapGrid>,
    pub progress: Vec<ProgressHandle>,
    pub narratives: Vec<Narrative>,
}

impl<S: Surface> Dashboard<S> {
    /// Render every widget of `page`, creating missing targets first.
    /// Stops at the first widget that fails.
    pub fn render_page(&mut self, page: &PageSpec) -> Result<RenderedPage> {
        let body = self.surface().body_id().to_string();
        if let Some(title) = &page.title {
            self.surface_mut()
                .append_child(&body, Node::new("h1").class("dashboard-title").text(title.clone()))?;
        }
        for node in &page.markup {
            self.surface_mut().append_child(&body, node.clone())?;
        }

        let mut out = RenderedPage::default();
        for widget in &page.widgets {
            if !self.surface().contains(widget.target()) {
                self.surface_mut().append_child(&body, widget.placeholder())?;
            }
            match widget {
                WidgetSpec::Chart {
                    target,
                    kind,
                    data,
                    options,
                } => out
                    .charts
                    .push(self.create_chart(*kind, target, data.clone(), options.clone())?),
                WidgetSpec::Gauge {
                    target,
                    value,
                    max_value,
                    options,
                } => out
                    .charts
                    .push(self.create_gauge_chart(target, *value, *max_value, options.clone())?),
                WidgetSpec::Heatmap {
                    target,
                    values,
                    row_labels,
                    col_labels,
                    options,
                } => out.heatmaps.push(self.create_heatmap(
                    target,
                    values.clone(),
                    row_labels.clone(),
                    col_labels.clone(),
                    options,
                )?),
                WidgetSpec::Progress {
                    target,
                    value,
                    max_value,
                    options,
                } => out
                    .progress
                    .push(self.create_progress_bar(target, *value, *max_value, options)?),
                WidgetSpec::Metric { target, label, value } => {
                    let card = MetricCard {
                        label: label.clone(),
                        value: value.clone(),
                    };
                    if let Some(n) = self.personalize_card(target, &card) {
                        out.narratives.push(n);
                    }
                }
            }
        }
        log::info!(
            "rendered page: {} charts, {} heatmaps, {} bars, {} narratives",
            out.charts.len(),
            out.heatmaps.len(),
            out.progress.len(),
            out.narratives.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::memory::MemorySurface;

    const PAGE: &str = r##"{
        "title": "Model health",
        "widgets": [
            {"widget": "chart", "target": "trend", "type": "line",
             "data": {"labels": ["Mon", "Tue"], "datasets": [{"label": "Queries", "data": [120, 180]}]}},
            {"widget": "gauge", "target": "uptime", "value": 72, "max_value": 100},
            {"widget": "heatmap", "target": "load", "values": [[1, 2], [3, 4]],
             "row_labels": ["EU", "US"], "col_labels": ["AM", "PM"]},
            {"widget": "progress", "target": "quota", "value": 42, "max_value": 200},
            {"widget": "metric", "target": "acc", "label": "Accuracy", "value": "96%"}
        ]
    }"##;

    #[test]
    fn renders_every_widget_into_fresh_targets() {
        let page = PageSpec::from_json_str(PAGE).unwrap();
        let mut d = Dashboard::new(MemorySurface::new(), EngineConfig::default());
        let out = d.render_page(&page).unwrap();
        assert_eq!(out.charts.len(), 2);
        assert_eq!(out.heatmaps.len(), 1);
        assert_eq!(out.progress[0].state.percentage, 21.0);
        assert!(out.narratives[0].story.contains("nearly all"));

        let s = d.surface();
        assert!(s.contains("trend-container"));
        assert!(s.has_class("load", "visualization-container"));
        assert!(s.document_html().contains("Model health"));
    }

    #[test]
    fn existing_targets_are_reused() {
        let surface = MemorySurface::with_markup(vec![Node::new("div").id("quota").class("custom")]);
        let page = PageSpec {
            widgets: vec![WidgetSpec::Progress {
                target: "quota".into(),
                value: 1.0,
                max_value: 2.0,
                options: ProgressOptions::default(),
            }],
            ..PageSpec::default()
        };
        let mut d = Dashboard::new(surface, EngineConfig::default());
        d.render_page(&page).unwrap();
        assert!(d.surface().has_class("quota", "custom"));
        assert_eq!(d.surface().node("body").unwrap().children.len(), 1);
    }

    #[test]
    fn bad_widget_stops_the_render() {
        let page = PageSpec {
            widgets: vec![WidgetSpec::Heatmap {
                target: "hm".into(),
                values: vec![vec![1.0]],
                row_labels: vec![],
                col_labels: vec!["c".into()],
                options: HeatmapOptions::default(),
            }],
            ..PageSpec::default()
        };
        let mut d = Dashboard::new(MemorySurface::new(), EngineConfig::default());
        assert!(d.render_page(&page).is_err());
    }
}
