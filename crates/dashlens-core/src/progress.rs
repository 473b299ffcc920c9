//! Progress bars and gauge banding.
//!
//! A bar is rendered as a track with a fill whose width is the clamped
//! percentage. When animated, the fill starts at 0% with a width transition
//! declared, and the real width is applied after a short delay so the surface
//! commits the unanimated state first. The transition itself is left to the
//! surface: nothing here waits.

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::error::{Result, VizError};
use crate::helpers::format_number;
use crate::surface::{Action, Node, Surface};

// ---------------------------------------------------------------------------
// ProgressState
// ---------------------------------------------------------------------------

/// Value against a maximum, with the derived percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressState {
    pub value: f64,
    pub max_value: f64,
    pub percentage: f64,
}

impl ProgressState {
    pub fn new(value: f64, max_value: f64) -> Result<Self> {
        if !(max_value > 0.0) {
            return Err(VizError::InvalidRange(max_value));
        }
        let raw = value / max_value * 100.0;
        let percentage = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 100.0) };
        Ok(Self {
            value,
            max_value,
            percentage,
        })
    }

    /// Percentage rounded for display (`"21%"`).
    pub fn label(&self) -> String {
        format!("{}%", self.percentage.round())
    }
}

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

/// Percentage range mapped to a single display color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeBand {
    pub min: f64,
    pub max: f64,
    pub color: String,
}

impl GaugeBand {
    pub fn new(min: f64, max: f64, color: &str) -> Self {
        Self {
            min,
            max,
            color: color.to_string(),
        }
    }

    pub fn contains(&self, percentage: f64) -> bool {
        self.min <= percentage && percentage <= self.max
    }
}

/// Red below half, amber up to 80, green above.
pub fn default_bands() -> Vec<GaugeBand> {
    vec![
        GaugeBand::new(0.0, 50.0, "#ef4444"),
        GaugeBand::new(50.0, 80.0, "#f59e0b"),
        GaugeBand::new(80.0, 100.0, "#10b981"),
    ]
}

/// Used only when a band list is empty.
pub const FALLBACK_BAND_COLOR: &str = "#6366f1";

/// First band (in order) whose inclusive range holds `percentage`; the last
/// band when none does.
pub fn band_color(bands: &[GaugeBand], percentage: f64) -> &str {
    bands
        .iter()
        .find(|b| b.contains(percentage))
        .or_else(|| bands.last())
        .map_or(FALLBACK_BAND_COLOR, |b| b.color.as_str())
}

// ---------------------------------------------------------------------------
// Progress bar
// ---------------------------------------------------------------------------

/// Caller options for [`create_progress_bar`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressOptions {
    pub animate: bool,
    pub show_percentage: bool,
    /// Show the label row above the bar.
    pub show_value: bool,
    pub label: Option<String>,
    pub prefix: String,
    pub suffix: String,
    /// Fixed fill color; banded when absent.
    pub color: Option<String>,
    pub bands: Option<Vec<GaugeBand>>,
    pub height_px: u32,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            animate: true,
            show_percentage: true,
            show_value: false,
            label: None,
            prefix: String::new(),
            suffix: String::new(),
            color: None,
            bands: None,
            height_px: 24,
        }
    }
}

/// Result of rendering a bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressHandle {
    pub container: String,
    pub fill_id: String,
    pub state: ProgressState,
    pub color: String,
}

/// Fill id derived from the container id.
pub fn fill_id(container_id: &str) -> String {
    format!("{container_id}-fill")
}

/// Render a bar into `container_id`, replacing its content.
pub fn create_progress_bar<S: Surface + ?Sized>(
    surface: &mut S,
    container_id: &str,
    value: f64,
    max_value: f64,
    options: &ProgressOptions,
    default_bands: &[GaugeBand],
    animation: &AnimationConfig,
) -> Result<ProgressHandle> {
    if !surface.contains(container_id) {
        return Err(VizError::ElementNotFound(container_id.to_string()));
    }
    let state = ProgressState::new(value, max_value)?;
    let bands = options.bands.as_deref().unwrap_or(default_bands);
    let color = options
        .color
        .clone()
        .unwrap_or_else(|| band_color(bands, state.percentage).to_string());
    let fill = fill_id(container_id);
    let target_width = format!("{}%", state.percentage);

    let mut nodes = Vec::new();
    if options.show_value || options.label.is_some() {
        nodes.push(label_row(&state, options));
    }

    let mut fill_node = Node::new("div")
        .id(fill.clone())
        .class("progress-fill")
        .attr("role", "progressbar")
        .attr("aria-valuemin", "0")
        .attr("aria-valuemax", format_number(max_value))
        .attr("aria-valuenow", format_number(value))
        .style("background-color", color.clone())
        .style("height", "100%")
        .style("display", "flex")
        .style("align-items", "center")
        .style("justify-content", "center");
    fill_node = if options.animate {
        fill_node.style("width", "0%").style(
            "transition",
            format!("width {}ms ease-out", animation.fill_duration_ms),
        )
    } else {
        fill_node.style("width", target_width.clone())
    };
    if options.show_percentage {
        fill_node = fill_node.child(
            Node::new("span")
                .class("progress-percentage")
                .text(state.label()),
        );
    }

    nodes.push(
        Node::new("div")
            .class("progress-track")
            .style("height", format!("{}px", options.height_px))
            .style("overflow", "hidden")
            .child(fill_node),
    );

    surface.replace_children(container_id, nodes)?;

    if options.animate {
        surface.schedule(
            animation.fill_delay_ms,
            Action::SetStyle {
                target: fill.clone(),
                property: "width".into(),
                value: target_width,
            },
        );
    }
    log::debug!(
        "progress #{container_id}: {:.1}% (animate={})",
        state.percentage,
        options.animate
    );

    Ok(ProgressHandle {
        container: container_id.to_string(),
        fill_id: fill,
        state,
        color,
    })
}

fn label_row(state: &ProgressState, options: &ProgressOptions) -> Node {
    let mut row = Node::new("div").class("progress-label-row");
    if let Some(label) = &options.label {
        row = row.child(Node::new("span").class("progress-label").text(label.clone()));
    }
    if options.show_value {
        let p = &options.prefix;
        let s = &options.suffix;
        row = row.child(Node::new("span").class("progress-value").text(format!(
            "{p}{}{s} / {p}{}{s}",
            format_number(state.value),
            format_number(state.max_value)
        )));
    }
    row
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;

    fn surface_with(id: &str) -> MemorySurface {
        let mut s = MemorySurface::new();
        s.append_child("body", Node::new("div").id(id)).unwrap();
        s
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(ProgressState::new(42.0, 200.0).unwrap().percentage, 21.0);
        assert_eq!(ProgressState::new(500.0, 200.0).unwrap().percentage, 100.0);
        assert_eq!(ProgressState::new(-5.0, 200.0).unwrap().percentage, 0.0);
    }

    #[test]
    fn non_positive_max_is_rejected() {
        assert!(matches!(ProgressState::new(1.0, 0.0), Err(VizError::InvalidRange(_))));
        assert!(ProgressState::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn band_lookup_is_first_match_then_last() {
        let bands = default_bands();
        assert_eq!(band_color(&bands, 10.0), "#ef4444");
        // 50 sits in both the first and second band; first wins.
        assert_eq!(band_color(&bands, 50.0), "#ef4444");
        assert_eq!(band_color(&bands, 79.5), "#f59e0b");
        assert_eq!(band_color(&bands, 100.0), "#10b981");
        // Gap in coverage falls through to the last band.
        let gappy = vec![GaugeBand::new(0.0, 10.0, "a"), GaugeBand::new(20.0, 30.0, "b")];
        assert_eq!(band_color(&gappy, 15.0), "b");
        assert_eq!(band_color(&[], 15.0), FALLBACK_BAND_COLOR);
    }

    #[test]
    fn unanimated_bar_sets_final_width_immediately() {
        let mut s = surface_with("c1");
        let opts = ProgressOptions {
            animate: false,
            ..ProgressOptions::default()
        };
        let h = create_progress_bar(&mut s, "c1", 42.0, 200.0, &opts, &default_bands(), &AnimationConfig::default())
            .unwrap();
        assert_eq!(s.style_of(&h.fill_id, "width").as_deref(), Some("21%"));
        assert_eq!(s.style_of(&h.fill_id, "transition"), None);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn label_row_uses_prefix_and_suffix() {
        let mut s = surface_with("c2");
        let opts = ProgressOptions {
            show_value: true,
            label: Some("Budget".into()),
            prefix: "$".into(),
            suffix: "k".into(),
            ..ProgressOptions::default()
        };
        create_progress_bar(&mut s, "c2", 30.0, 120.0, &opts, &default_bands(), &AnimationConfig::default())
            .unwrap();
        let text = s.text_content("c2").unwrap();
        assert!(text.contains("Budget"));
        assert!(text.contains("$30k / $120k"));
        assert!(text.contains("25%"));
    }

    #[test]
    fn missing_container_fails_fast() {
        let mut s = MemorySurface::new();
        let err = create_progress_bar(
            &mut s,
            "nope",
            1.0,
            2.0,
            &ProgressOptions::default(),
            &default_bands(),
            &AnimationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VizError::ElementNotFound(id) if id == "nope"));
    }
}
