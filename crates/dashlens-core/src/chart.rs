//! Chart factory.
//!
//! Builds a [`ChartSpec`] (type, data, merged options) and binds it to a
//! rendering surface. Option merging is shallow: every top-level field the
//! caller sets replaces the per-type default wholesale. Overriding `scales`
//! therefore drops every default axis setting, not just the one overridden.
//!
//! Charts are not reactive. Mutating the data a spec was built from has no
//! effect; rebuild the chart to show new data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PaletteConfig;
use crate::error::{Result, VizError};
use crate::helpers::format_number;
use crate::progress::{GaugeBand, ProgressState, band_color};
use crate::surface::{ChartInstanceId, Surface};

// ---------------------------------------------------------------------------
// Kinds and data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
    Radar,
    Scatter,
    Gauge,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        Self::Line,
        Self::Bar,
        Self::Doughnut,
        Self::Radar,
        Self::Scatter,
        Self::Gauge,
    ];

    /// Chart type understood by the renderer. A gauge is a half doughnut.
    pub fn renderer_type(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Doughnut | Self::Gauge => "doughnut",
            Self::Radar => "radar",
            Self::Scatter => "scatter",
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            other => write!(f, "{}", other.renderer_type()),
        }
    }
}

/// A plotted value: plain number, or an `{x, y}` point for scatter charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Number(f64),
    Point { x: f64, y: f64 },
}

/// One color for the whole dataset, or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<DataValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
}

impl Dataset {
    pub fn new(label: &str, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            label: label.to_string(),
            data: values.into_iter().map(DataValue::Number).collect(),
            ..Self::default()
        }
    }

    pub fn points(label: &str, points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            label: label.to_string(),
            data: points
                .into_iter()
                .map(|(x, y)| DataValue::Point { x, y })
                .collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnimationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LegendOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TooltipOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersect: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TitleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PluginOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GridOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TickOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AxisOptions {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<TickOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct InteractionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersect: Option<bool>,
}

/// Recognized chart options. `None` means "not set"; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintain_aspect_ratio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<BTreeMap<String, AxisOptions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutout: Option<String>,
    /// Arc sweep in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circumference: Option<f64>,
    /// Arc start angle in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl ChartOptions {
    /// Shallow merge: each field set on `self` wins, otherwise the default's.
    pub fn over(self, defaults: ChartOptions) -> ChartOptions {
        ChartOptions {
            responsive: self.responsive.or(defaults.responsive),
            maintain_aspect_ratio: self.maintain_aspect_ratio.or(defaults.maintain_aspect_ratio),
            animation: self.animation.or(defaults.animation),
            interaction: self.interaction.or(defaults.interaction),
            plugins: self.plugins.or(defaults.plugins),
            scales: self.scales.or(defaults.scales),
            cutout: self.cutout.or(defaults.cutout),
            circumference: self.circumference.or(defaults.circumference),
            rotation: self.rotation.or(defaults.rotation),
        }
    }

    /// Per-type defaults.
    pub fn defaults_for(kind: ChartKind) -> ChartOptions {
        let base = ChartOptions {
            responsive: Some(true),
            maintain_aspect_ratio: Some(false),
            animation: Some(AnimationOptions {
                duration: Some(1000),
                easing: Some("easeOutQuart".into()),
            }),
            plugins: Some(PluginOptions {
                legend: Some(LegendOptions {
                    display: Some(true),
                    position: Some("top".into()),
                }),
                tooltip: Some(TooltipOptions {
                    enabled: Some(true),
                    mode: Some("index".into()),
                    intersect: Some(false),
                }),
                title: None,
            }),
            ..ChartOptions::default()
        };

        match kind {
            ChartKind::Line => ChartOptions {
                interaction: Some(InteractionOptions {
                    mode: Some("index".into()),
                    intersect: Some(false),
                }),
                scales: Some(scales([
                    ("x", hidden_grid_axis()),
                    ("y", zero_based_axis()),
                ])),
                ..base
            },
            ChartKind::Bar => ChartOptions {
                scales: Some(scales([
                    ("x", hidden_grid_axis()),
                    ("y", zero_based_axis()),
                ])),
                ..base
            },
            ChartKind::Doughnut => ChartOptions {
                cutout: Some("70%".into()),
                plugins: Some(PluginOptions {
                    legend: Some(LegendOptions {
                        display: Some(true),
                        position: Some("bottom".into()),
                    }),
                    tooltip: Some(TooltipOptions {
                        enabled: Some(true),
                        ..TooltipOptions::default()
                    }),
                    title: None,
                }),
                ..base
            },
            ChartKind::Radar => ChartOptions {
                scales: Some(scales([(
                    "r",
                    AxisOptions {
                        begin_at_zero: Some(true),
                        grid: Some(GridOptions {
                            display: Some(true),
                            color: Some("rgba(0, 0, 0, 0.1)".into()),
                        }),
                        ..AxisOptions::default()
                    },
                )])),
                ..base
            },
            ChartKind::Scatter => ChartOptions {
                plugins: Some(PluginOptions {
                    legend: Some(LegendOptions {
                        display: Some(true),
                        position: Some("top".into()),
                    }),
                    tooltip: Some(TooltipOptions {
                        enabled: Some(true),
                        mode: Some("nearest".into()),
                        intersect: Some(true),
                    }),
                    title: None,
                }),
                scales: Some(scales([
                    (
                        "x",
                        AxisOptions {
                            kind: Some("linear".into()),
                            position: Some("bottom".into()),
                            ..AxisOptions::default()
                        },
                    ),
                    ("y", AxisOptions::default()),
                ])),
                ..base
            },
            ChartKind::Gauge => ChartOptions {
                cutout: Some("75%".into()),
                circumference: Some(180.0),
                rotation: Some(270.0),
                plugins: Some(PluginOptions {
                    legend: Some(LegendOptions {
                        display: Some(false),
                        position: None,
                    }),
                    tooltip: Some(TooltipOptions {
                        enabled: Some(false),
                        ..TooltipOptions::default()
                    }),
                    title: None,
                }),
                ..base
            },
        }
    }
}

fn scales<const N: usize>(axes: [(&str, AxisOptions); N]) -> BTreeMap<String, AxisOptions> {
    axes.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn zero_based_axis() -> AxisOptions {
    AxisOptions {
        begin_at_zero: Some(true),
        grid: Some(GridOptions {
            display: Some(true),
            color: Some("rgba(0, 0, 0, 0.05)".into()),
        }),
        ..AxisOptions::default()
    }
}

fn hidden_grid_axis() -> AxisOptions {
    AxisOptions {
        grid: Some(GridOptions {
            display: Some(false),
            color: None,
        }),
        ..AxisOptions::default()
    }
}

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// Text drawn centered on the chart after it renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    /// CSS font shorthand.
    pub font: String,
    pub color: String,
    /// Vertical offset from the ring center, in pixels (positive is down).
    pub offset_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<TextOverlay>,
}

impl ChartSpec {
    /// Merge `overrides` over the defaults for `kind` and fill in any dataset
    /// colors the caller left out.
    pub fn build(kind: ChartKind, mut data: ChartData, overrides: ChartOptions, series: &[String]) -> Self {
        apply_series_colors(kind, &mut data, series);
        Self {
            kind,
            data,
            options: overrides.over(ChartOptions::defaults_for(kind)),
            overlays: Vec::new(),
        }
    }

    /// Configuration object in the shape the browser renderer expects.
    pub fn renderer_config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind.renderer_type(),
            "data": self.data,
            "options": self.options,
        })
    }
}

fn apply_series_colors(kind: ChartKind, data: &mut ChartData, series: &[String]) {
    if series.is_empty() {
        return;
    }
    let pick = |i: usize| series[i % series.len()].clone();
    for (i, ds) in data.datasets.iter_mut().enumerate() {
        match kind {
            ChartKind::Doughnut => {
                if ds.background_color.is_none() {
                    ds.background_color = Some(ColorValue::Many((0..ds.data.len()).map(pick).collect()));
                }
            }
            ChartKind::Gauge => {}
            _ => {
                if ds.border_color.is_none() {
                    ds.border_color = Some(ColorValue::Single(pick(i)));
                }
                if ds.background_color.is_none() {
                    ds.background_color = Some(ColorValue::Single(pick(i)));
                }
            }
        }
    }
}

/// Renderer-backed chart bound to its target.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub instance: ChartInstanceId,
    pub target: String,
    pub spec: ChartSpec,
}

/// Resolve the target, merge options and mount.
pub fn build_chart<S: Surface + ?Sized>(
    surface: &mut S,
    kind: ChartKind,
    target_id: &str,
    data: ChartData,
    options: ChartOptions,
    palette: &PaletteConfig,
) -> Result<ChartHandle> {
    if !surface.contains(target_id) {
        return Err(VizError::ElementNotFound(target_id.to_string()));
    }
    let spec = ChartSpec::build(kind, data, options, &palette.series);
    mount(surface, target_id, spec)
}

fn mount<S: Surface + ?Sized>(surface: &mut S, target_id: &str, spec: ChartSpec) -> Result<ChartHandle> {
    let instance = surface.mount_chart(target_id, &spec)?;
    log::debug!("mounted {} chart on #{target_id} ({instance:?})", spec.kind);
    Ok(ChartHandle {
        instance,
        target: target_id.to_string(),
        spec,
    })
}

// ---------------------------------------------------------------------------
// Gauge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeData {
    pub value: f64,
    pub max_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeOptions {
    /// Bands override the palette's gauge bands when set.
    pub bands: Option<Vec<GaugeBand>>,
    /// Text shown under the needle value instead of the raw number.
    pub value_text: Option<String>,
    pub value_color: Option<String>,
    pub chart: ChartOptions,
}

/// Half-ring doughnut: `[percentage, 100 - percentage]`, colored by band.
pub fn gauge_spec(data: GaugeData, options: GaugeOptions, palette: &PaletteConfig) -> Result<ChartSpec> {
    let state = ProgressState::new(data.value, data.max_value)?;
    let bands = options.bands.as_deref().unwrap_or(&palette.gauge_bands);
    let fill = band_color(bands, state.percentage).to_string();

    let chart_data = ChartData {
        labels: vec!["Value".into(), "Remaining".into()],
        datasets: vec![Dataset {
            label: String::new(),
            data: vec![
                DataValue::Number(state.percentage),
                DataValue::Number(100.0 - state.percentage),
            ],
            background_color: Some(ColorValue::Many(vec![fill, palette.gauge_track.clone()])),
            border_width: Some(0.0),
            ..Dataset::default()
        }],
    };

    let mut spec = ChartSpec::build(ChartKind::Gauge, chart_data, options.chart, &[]);
    let text_color = options.value_color.unwrap_or_else(|| "#111827".to_string());
    spec.overlays = vec![
        TextOverlay {
            text: options.value_text.unwrap_or_else(|| format_number(data.value)),
            font: "bold 24px sans-serif".into(),
            color: text_color.clone(),
            offset_y: -10.0,
        },
        TextOverlay {
            text: state.label(),
            font: "14px sans-serif".into(),
            color: text_color,
            offset_y: 15.0,
        },
    ];
    Ok(spec)
}

pub fn build_gauge<S: Surface + ?Sized>(
    surface: &mut S,
    target_id: &str,
    data: GaugeData,
    options: GaugeOptions,
    palette: &PaletteConfig,
) -> Result<ChartHandle> {
    if !surface.contains(target_id) {
        return Err(VizError::ElementNotFound(target_id.to_string()));
    }
    let spec = gauge_spec(data, options, palette)?;
    mount(surface, target_id, spec)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;
    use crate::surface::Node;

    fn canvas(id: &str) -> MemorySurface {
        MemorySurface::with_markup(vec![Node::new("canvas").id(id)])
    }

    fn sales() -> ChartData {
        ChartData {
            labels: vec!["Q1".into(), "Q2".into(), "Q3".into()],
            datasets: vec![Dataset::new("Revenue", [12.0, 19.0, 7.0])],
        }
    }

    #[test]
    fn caller_scales_replace_default_scales_entirely() {
        let overrides = ChartOptions {
            scales: Some(scales([(
                "y",
                AxisOptions {
                    max: Some(50.0),
                    ..AxisOptions::default()
                },
            )])),
            ..ChartOptions::default()
        };
        let spec = ChartSpec::build(ChartKind::Line, sales(), overrides, &[]);
        let scales = spec.options.scales.unwrap();
        assert_eq!(scales.len(), 1, "default x axis must not survive");
        assert_eq!(scales["y"].max, Some(50.0));
        assert_eq!(scales["y"].begin_at_zero, None, "no deep merge");
        // Untouched top-level defaults survive.
        assert_eq!(spec.options.responsive, Some(true));
        assert!(spec.options.plugins.is_some());
    }

    #[test]
    fn every_kind_has_defaults() {
        for kind in ChartKind::ALL {
            let d = ChartOptions::defaults_for(kind);
            assert_eq!(d.responsive, Some(true), "{kind}");
        }
        let g = ChartOptions::defaults_for(ChartKind::Gauge);
        assert_eq!(g.circumference, Some(180.0));
        assert_eq!(g.rotation, Some(270.0));
    }

    #[test]
    fn missing_target_is_element_not_found() {
        let mut s = MemorySurface::new();
        let err = build_chart(
            &mut s,
            ChartKind::Bar,
            "missing",
            sales(),
            ChartOptions::default(),
            &PaletteConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VizError::ElementNotFound(_)));
        assert_eq!(s.chart_count(), 0);
    }

    #[test]
    fn series_colors_fill_only_missing_fields() {
        let mut data = sales();
        data.datasets.push(Dataset {
            border_color: Some(ColorValue::Single("#123456".into())),
            ..Dataset::new("Cost", [1.0, 2.0, 3.0])
        });
        let palette = PaletteConfig::default();
        let spec = ChartSpec::build(ChartKind::Bar, data, ChartOptions::default(), &palette.series);
        assert_eq!(
            spec.data.datasets[0].border_color,
            Some(ColorValue::Single(palette.series[0].clone()))
        );
        assert_eq!(
            spec.data.datasets[1].border_color,
            Some(ColorValue::Single("#123456".into()))
        );
    }

    #[test]
    fn doughnut_gets_one_color_per_slice() {
        let spec = ChartSpec::build(
            ChartKind::Doughnut,
            sales(),
            ChartOptions::default(),
            &PaletteConfig::default().series,
        );
        match &spec.data.datasets[0].background_color {
            Some(ColorValue::Many(colors)) => assert_eq!(colors.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mounted_chart_is_rebuilt_not_diffed() {
        let mut s = canvas("rev");
        let palette = PaletteConfig::default();
        let first = build_chart(&mut s, ChartKind::Line, "rev", sales(), ChartOptions::default(), &palette)
            .unwrap();
        let mut updated = sales();
        updated.datasets[0].data.push(DataValue::Number(30.0));
        let second = build_chart(&mut s, ChartKind::Line, "rev", updated, ChartOptions::default(), &palette)
            .unwrap();
        assert_ne!(first.instance, second.instance);
        assert_eq!(s.chart_count(), 1);
        assert_eq!(s.chart(second.instance).unwrap().spec.data.datasets[0].data.len(), 4);
    }

    #[test]
    fn gauge_is_half_ring_with_band_color() {
        let palette = PaletteConfig::default();
        let spec = gauge_spec(
            GaugeData {
                value: 87.0,
                max_value: 100.0,
            },
            GaugeOptions::default(),
            &palette,
        )
        .unwrap();
        assert_eq!(spec.kind.renderer_type(), "doughnut");
        assert_eq!(spec.options.circumference, Some(180.0));
        assert_eq!(spec.options.rotation, Some(270.0));
        let ds = &spec.data.datasets[0];
        assert_eq!(ds.data, vec![DataValue::Number(87.0), DataValue::Number(13.0)]);
        assert_eq!(
            ds.background_color,
            Some(ColorValue::Many(vec!["#10b981".into(), "#e5e7eb".into()]))
        );
        assert_eq!(spec.overlays[0].text, "87");
        assert_eq!(spec.overlays[1].text, "87%");
        assert!(spec.overlays[1].offset_y > spec.overlays[0].offset_y);
    }

    #[test]
    fn gauge_overlay_rounds_percentage_but_keeps_raw_value() {
        let spec = gauge_spec(
            GaugeData {
                value: 1.5,
                max_value: 4.0,
            },
            GaugeOptions::default(),
            &PaletteConfig::default(),
        )
        .unwrap();
        assert_eq!(spec.overlays[0].text, "1.5");
        assert_eq!(spec.overlays[1].text, "38%");
    }

    #[test]
    fn renderer_config_uses_doughnut_for_gauge() {
        let spec = gauge_spec(
            GaugeData {
                value: 1.0,
                max_value: 2.0,
            },
            GaugeOptions::default(),
            &PaletteConfig::default(),
        )
        .unwrap();
        let cfg = spec.renderer_config();
        assert_eq!(cfg["type"], "doughnut");
        assert_eq!(cfg["options"]["circumference"], 180.0);
        assert_eq!(cfg["data"]["datasets"][0]["backgroundColor"][1], "#e5e7eb");
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let o: ChartOptions = serde_json::from_str(
            r#"{"maintainAspectRatio":true,"scales":{"y":{"beginAtZero":false,"ticks":{"stepSize":5}}}}"#,
        )
        .unwrap();
        assert_eq!(o.maintain_aspect_ratio, Some(true));
        let y = &o.scales.unwrap()["y"];
        assert_eq!(y.begin_at_zero, Some(false));
        assert_eq!(y.ticks.as_ref().unwrap().step_size, Some(5.0));
    }

    #[test]
    fn unknown_option_keys_are_rejected() {
        assert!(serde_json::from_str::<ChartOptions>(r#"{"responsiv":true}"#).is_err());
        assert!(serde_json::from_str::<ChartOptions>(r#"{"plugins":{"legend":{"show":false}}}"#).is_err());
        assert!(serde_json::from_str::<ChartOptions>(r#"{"scales":{"y":{"beginAtZero":true}}}"#).is_ok());
    }

    #[test]
    fn scatter_data_accepts_points() {
        let d: ChartData = serde_json::from_str(
            r#"{"datasets":[{"label":"p","data":[{"x":1,"y":2},{"x":3.5,"y":-1}]}]}"#,
        )
        .unwrap();
        assert_eq!(d.datasets[0].data[1], DataValue::Point { x: 3.5, y: -1.0 });
    }
}
