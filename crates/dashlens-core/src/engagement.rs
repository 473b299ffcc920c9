//! Engagement tracking and celebratory overlays.
//!
//! Two independent event streams drive one [`EngagementState`]:
//!
//! - scroll: the deepest scroll percentage seen so far only ever grows; the
//!   first time it exceeds the threshold the scroll moment fires.
//! - interaction: clicks on interactive elements are counted; the moment fires
//!   when the count equals the target exactly.
//!
//! Each moment fires at most once per tracker. Flags are set before the
//! overlay is rendered.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::EngagementConfig;
use crate::surface::{Action, Node, Rect, Surface, Viewport};

/// Id of the shared overlay element.
pub const OVERLAY_ID: &str = "success-moment";
/// Class that makes the overlay visible.
pub const VISIBLE_CLASS: &str = "visible";

const PARTICLE_COLORS: [&str; 6] = ["#f59e0b", "#10b981", "#3b82f6", "#ef4444", "#8b5cf6", "#ec4899"];

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Per-session engagement state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementState {
    pub max_scroll_depth_percent: f64,
    pub interaction_count: u32,
    pub scroll_moment_fired: bool,
    pub exploration_moment_fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moment {
    Scroll,
    Exploration,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EngagementTracker {
    config: EngagementConfig,
    state: EngagementState,
}

impl EngagementTracker {
    pub fn new(config: EngagementConfig) -> Self {
        Self::with_state(config, EngagementState::default())
    }

    /// Resume from a previously recorded state.
    pub fn with_state(config: EngagementConfig, state: EngagementState) -> Self {
        Self { config, state }
    }

    pub fn state(&self) -> &EngagementState {
        &self.state
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    /// Scroll event. `anchor` positions the overlay if the moment fires.
    pub fn on_scroll<S, R>(&mut self, surface: &mut S, viewport: Viewport, anchor: &str, rng: &mut R) -> Option<Moment>
    where
        S: Surface + ?Sized,
        R: Rng,
    {
        let current = viewport.scroll_percentage();
        if current > self.state.max_scroll_depth_percent {
            self.state.max_scroll_depth_percent = current;
        }
        if self.state.max_scroll_depth_percent <= self.config.scroll_threshold_percent
            || self.state.scroll_moment_fired
        {
            return None;
        }
        self.state.scroll_moment_fired = true;
        log::info!(
            "scroll moment at {:.1}% depth",
            self.state.max_scroll_depth_percent
        );
        let message = self.config.scroll_message.clone();
        create_success_moment(surface, anchor, &message, &self.config, rng);
        Some(Moment::Scroll)
    }

    /// Click on `element`. Only elements carrying the interactive class count.
    pub fn on_interaction<S, R>(&mut self, surface: &mut S, element: &str, rng: &mut R) -> Option<Moment>
    where
        S: Surface + ?Sized,
        R: Rng,
    {
        if !surface.has_class(element, &self.config.interactive_class) {
            return None;
        }
        self.state.interaction_count = self.state.interaction_count.saturating_add(1);
        if self.state.interaction_count != self.config.interaction_target || self.state.exploration_moment_fired {
            return None;
        }
        self.state.exploration_moment_fired = true;
        log::info!("exploration moment after {} interactions", self.state.interaction_count);
        let message = self.config.exploration_message.clone();
        create_success_moment(surface, element, &message, &self.config, rng);
        Some(Moment::Exploration)
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Show the celebratory overlay above `anchor` and hide it again after the
/// configured duration.
///
/// The overlay element is created under the body on first use and reused
/// afterwards. Returns false, without touching the page, when the anchor is
/// not on the page.
pub fn create_success_moment<S, R>(
    surface: &mut S,
    anchor: &str,
    message: &str,
    config: &EngagementConfig,
    rng: &mut R,
) -> bool
where
    S: Surface + ?Sized,
    R: Rng,
{
    if !surface.contains(anchor) {
        log::debug!("success moment anchor #{anchor} not on page; skipping");
        return false;
    }
    let rect = surface.bounding_box(anchor).unwrap_or_default();
    let content = overlay_content(message, config.particle_count, rng);

    if !surface.contains(OVERLAY_ID) {
        let body = surface.body_id().to_string();
        let overlay = Node::new("div")
            .id(OVERLAY_ID)
            .class("success-moment")
            .attr("role", "status")
            .attr("aria-live", "polite");
        if let Err(e) = surface.append_child(&body, overlay) {
            log::warn!("cannot attach success overlay: {e}");
            return false;
        }
    }
    let shown = surface.replace_children(OVERLAY_ID, content).is_ok()
        && place(surface, rect, config.overlay_offset_px)
        && surface.add_class(OVERLAY_ID, VISIBLE_CLASS).is_ok();
    if !shown {
        return false;
    }
    surface.schedule(
        config.overlay_duration_ms,
        Action::RemoveClass {
            target: OVERLAY_ID.to_string(),
            class: VISIBLE_CLASS.to_string(),
        },
    );
    true
}

fn place<S: Surface + ?Sized>(surface: &mut S, anchor: Rect, offset: f64) -> bool {
    let top = format!("{}px", anchor.top - offset);
    let left = format!("{}px", anchor.left);
    surface.set_style(OVERLAY_ID, "top", &top).is_ok() && surface.set_style(OVERLAY_ID, "left", &left).is_ok()
}

fn overlay_content<R: Rng>(message: &str, particles: usize, rng: &mut R) -> Vec<Node> {
    let mut nodes = vec![Node::new("div").class("success-message").text(message)];
    nodes.extend((0..particles).map(|_| particle(rng)));
    nodes
}

fn particle<R: Rng>(rng: &mut R) -> Node {
    let color = PARTICLE_COLORS[rng.random_range(0..PARTICLE_COLORS.len())];
    let size = rng.random_range(4..=10);
    Node::new("span")
        .class("particle")
        .attr("aria-hidden", "true")
        .style("background-color", color)
        .style("left", format!("{:.1}%", rng.random_range(0.0..100.0)))
        .style("animation-delay", format!("{:.2}s", rng.random_range(0.0..0.5)))
        .style("width", format!("{size}px"))
        .style("height", format!("{size}px"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
