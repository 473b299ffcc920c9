//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! valid configuration. Hosts override only what they need.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::ColorScale;
use crate::error::{Result, VizError};
use crate::progress::{GaugeBand, default_bands};

/// Timings for animated fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Delay before the final width is applied, so the 0% state is committed.
    pub fill_delay_ms: u32,
    /// Duration of the declared width transition.
    pub fill_duration_ms: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fill_delay_ms: 50,
            fill_duration_ms: 1000,
        }
    }
}

/// Thresholds and presentation of the celebratory moments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Scroll depth (percent) that must be exceeded to fire the scroll moment.
    pub scroll_threshold_percent: f64,
    /// Exact interaction count that fires the exploration moment.
    pub interaction_target: u32,
    pub overlay_duration_ms: u32,
    pub particle_count: usize,
    /// Vertical offset of the overlay above its anchor.
    pub overlay_offset_px: f64,
    /// Class that marks an element as a qualifying interaction target.
    pub interactive_class: String,
    pub scroll_message: String,
    pub exploration_message: String,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_percent: 80.0,
            interaction_target: 5,
            overlay_duration_ms: 4000,
            particle_count: 30,
            overlay_offset_px: 50.0,
            interactive_class: "interactive".to_string(),
            scroll_message: "You've explored almost everything here!".to_string(),
            exploration_message: "You're getting the hang of this!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Fraction of a card's height that must be visible before it reveals.
    pub visibility_threshold: f64,
    pub reveal_class: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.3,
            reveal_class: "revealed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Default heatmap gradient, low to high.
    pub color_scale: Vec<String>,
    pub gauge_bands: Vec<GaugeBand>,
    /// Unfilled remainder of a gauge ring.
    pub gauge_track: String,
    /// Dataset colors assigned in order when a dataset has none.
    pub series: Vec<String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            color_scale: vec![
                "#f7fbff".to_string(),
                "#6baed6".to_string(),
                "#08306b".to_string(),
            ],
            gauge_bands: default_bands(),
            gauge_track: "#e5e7eb".to_string(),
            series: [
                "#4f46e5", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Classes used to find primary visualizations and the elements that compete
/// with them for attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub primary_class: String,
    pub competing_classes: Vec<String>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            primary_class: "visualization-container".to_string(),
            competing_classes: ["secondary", "tertiary", "debug-info", "meta-info"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub animation: AnimationConfig,
    pub engagement: EngagementConfig,
    pub reveal: RevealConfig,
    pub palette: PaletteConfig,
    pub focus: FocusConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        log::debug!("loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ColorScale::new(&self.palette.color_scale)?;
        if self.palette.gauge_bands.is_empty() {
            return Err(VizError::Config("palette.gauge_bands is empty".into()));
        }
        if self.palette.series.is_empty() {
            return Err(VizError::Config("palette.series is empty".into()));
        }
        let threshold = self.reveal.visibility_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(VizError::Config(format!(
                "reveal.visibility_threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(())
    }
}
