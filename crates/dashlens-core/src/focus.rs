//! Competing-element visibility.
//!
//! While any primary visualization has its vertical midpoint inside the
//! viewport, secondary UI (meta info, debug panels and so on) is faded out
//! and made non-interactive. Evaluated from the current layout only.

use crate::config::FocusConfig;
use crate::surface::Surface;

#[derive(Debug, Clone)]
pub struct FocusController {
    config: FocusConfig,
    hidden: Option<bool>,
}

impl FocusController {
    pub fn new(config: FocusConfig) -> Self {
        Self { config, hidden: None }
    }

    /// True if some primary visualization is centered in view.
    pub fn primary_in_view<S: Surface + ?Sized>(&self, surface: &S, viewport_height: f64) -> bool {
        let body = surface.body_id();
        surface
            .query_class(body, &self.config.primary_class)
            .iter()
            .filter_map(|id| surface.bounding_box(id))
            .map(|rect| rect.vertical_midpoint())
            .any(|mid| (0.0..=viewport_height).contains(&mid))
    }

    /// Re-evaluate and apply. Returns whether competing elements are hidden
    /// and whether that changed since the previous evaluation.
    pub fn update<S: Surface + ?Sized>(&mut self, surface: &mut S, viewport_height: f64) -> (bool, bool) {
        let hide = self.primary_in_view(surface, viewport_height);
        let (opacity, pointer) = if hide { ("0", "none") } else { ("1", "auto") };
        let body = surface.body_id().to_string();
        for class in &self.config.competing_classes {
            for id in surface.query_class(&body, class) {
                let _ = surface.set_style(&id, "opacity", opacity);
                let _ = surface.set_style(&id, "pointer-events", pointer);
            }
        }
        let changed = self.hidden != Some(hide);
        self.hidden = Some(hide);
        (hide, changed)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;
    use crate::surface::{Node, Rect};

    fn page() -> MemorySurface {
        let mut s = MemorySurface::with_markup(vec![
            Node::new("div").id("chart").class("visualization-container"),
            Node::new("div").id("meta").class("meta-info"),
            Node::new("pre").id("debug").class("debug-info"),
            Node::new("p").id("prose"),
        ]);
        s.set_bounding_box("chart", Rect::new(0.0, 1000.0, 600.0, 400.0));
        s
    }

    #[test]
    fn hides_while_primary_is_centered() {
        let mut s = page();
        let mut f = FocusController::new(FocusConfig::default());
        assert_eq!(f.update(&mut s, 800.0), (false, true));
        assert_eq!(s.style_of("meta", "opacity").as_deref(), Some("1"));

        s.scroll_by(700.0); // midpoint now at 500
        assert_eq!(f.update(&mut s, 800.0), (true, true));
        assert_eq!(s.style_of("meta", "opacity").as_deref(), Some("0"));
        assert_eq!(s.style_of("debug", "pointer-events").as_deref(), Some("none"));
        assert_eq!(s.style_of("prose", "opacity"), None);

        assert_eq!(f.update(&mut s, 800.0), (true, false));
    }

    #[test]
    fn depends_only_on_current_layout() {
        let mut s = page();
        let mut f = FocusController::new(FocusConfig::default());
        s.scroll_by(700.0);
        f.update(&mut s, 800.0);
        s.scroll_by(1000.0); // midpoint at -500
        assert_eq!(f.update(&mut s, 800.0).0, false);
        assert_eq!(s.style_of("meta", "opacity").as_deref(), Some("1"));
        assert_eq!(s.style_of("meta", "pointer-events").as_deref(), Some("auto"));
    }

    #[test]
    fn no_primary_means_nothing_hidden() {
        let mut s = MemorySurface::with_markup(vec![Node::new("div").id("meta").class("meta-info")]);
        let mut f = FocusController::new(FocusConfig::default());
        assert!(!f.update(&mut s, 800.0).0);
        assert!(!f.is_hidden());
    }
}
