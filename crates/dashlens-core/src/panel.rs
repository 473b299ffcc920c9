//! Contextual detail panel for a visualization container.
//!
//! A container opts in by holding an element of class `panel-trigger`. The
//! panel is filled once, at wiring time, with the container's description
//! text and a copy of its parameter controls. Later changes to the source
//! widget are not re-synced.

use crate::surface::{Node, Surface};

pub const TRIGGER_CLASS: &str = "panel-trigger";
pub const PANEL_CLASS: &str = "context-panel";
pub const CLOSE_CLASS: &str = "panel-close";
pub const DESCRIPTION_CLASS: &str = "viz-description";
pub const CONTROLS_CLASS: &str = "viz-controls";
/// Class toggled on the container while the panel is open.
pub const OPEN_CLASS: &str = "panel-open";

const WIRED_ATTR: &str = "data-panel-wired";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    pub is_open: bool,
}

/// Keys that activate a focused trigger.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextPanel {
    container: String,
    trigger: String,
    panel: String,
    close: String,
    state: PanelState,
}

impl ContextPanel {
    /// Wire the panel of `container`. `None` when the container has no
    /// trigger, which leaves the feature inert.
    pub fn wire<S: Surface + ?Sized>(surface: &mut S, container: &str) -> Option<Self> {
        let Some(trigger) = surface.query_class(container, TRIGGER_CLASS).into_iter().next() else {
            log::debug!("#{container} has no panel trigger");
            return None;
        };
        let close = format!("{container}-panel-close");
        let panel = match surface.query_class(container, PANEL_CLASS).into_iter().next() {
            Some(id) => id,
            None => {
                let id = format!("{container}-panel");
                let node = Node::new("aside").id(id.clone()).class(PANEL_CLASS);
                surface.append_child(container, node).ok()?;
                id
            }
        };

        if surface.attribute(container, WIRED_ATTR).is_none() {
            let content = panel_content(surface, container, &close);
            surface.replace_children(&panel, content).ok()?;
            surface.set_attribute(container, WIRED_ATTR, "true").ok()?;
        }
        let _ = surface.set_attribute(&trigger, "aria-controls", &panel);
        let _ = surface.set_attribute(&trigger, "aria-expanded", "false");
        let _ = surface.set_attribute(&panel, "aria-hidden", "true");
        let _ = surface.remove_class(container, OPEN_CLASS);

        Some(Self {
            container: container.to_string(),
            trigger,
            panel,
            close,
            state: PanelState::default(),
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn panel(&self) -> &str {
        &self.panel
    }

    pub fn close_control(&self) -> &str {
        &self.close
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Flip the open state; returns the new state.
    pub fn toggle<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let open = !self.state.is_open;
        self.set_open(surface, open);
        open
    }

    pub fn close<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.set_open(surface, false);
    }

    /// Click on `element`. Returns the new open state if the click was ours.
    pub fn on_click<S: Surface + ?Sized>(&mut self, surface: &mut S, element: &str) -> Option<bool> {
        if element == self.trigger {
            Some(self.toggle(surface))
        } else if element == self.close {
            self.close(surface);
            Some(false)
        } else {
            None
        }
    }

    /// Key press while `element` has focus.
    pub fn on_key<S: Surface + ?Sized>(&mut self, surface: &mut S, element: &str, key: &str) -> Option<bool> {
        if element == self.trigger && is_activation_key(key) {
            Some(self.toggle(surface))
        } else {
            None
        }
    }

    fn set_open<S: Surface + ?Sized>(&mut self, surface: &mut S, open: bool) {
        self.state.is_open = open;
        let result = if open {
            surface.add_class(&self.container, OPEN_CLASS)
        } else {
            surface.remove_class(&self.container, OPEN_CLASS)
        };
        if let Err(e) = result {
            log::debug!("panel container #{} is gone: {e}", self.container);
            return;
        }
        let _ = surface.set_attribute(&self.trigger, "aria-expanded", if open { "true" } else { "false" });
        let _ = surface.set_attribute(&self.panel, "aria-hidden", if open { "false" } else { "true" });
    }
}

fn panel_content<S: Surface + ?Sized>(surface: &S, container: &str, close_id: &str) -> Vec<Node> {
    let mut nodes = vec![
        Node::new("button")
            .id(close_id)
            .class(CLOSE_CLASS)
            .attr("type", "button")
            .attr("aria-label", "Close panel")
            .text("\u{00d7}"),
    ];
    if let Some(id) = surface.query_class(container, DESCRIPTION_CLASS).first() {
        let text = surface.text_content(id).unwrap_or_default();
        nodes.push(Node::new("p").class("panel-description").text(text.trim()));
    }
    if let Some(id) = surface.query_class(container, CONTROLS_CLASS).first() {
        if let Some(mut controls) = surface.snapshot(id) {
            strip_ids(&mut controls);
            nodes.push(Node::new("div").class("panel-controls").child(controls));
        }
    }
    nodes
}

/// Copies must not duplicate the ids of their source.
fn strip_ids(node: &mut Node) {
    node.id = None;
    for child in &mut node.children {
        strip_ids(child);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;

    fn widget() -> MemorySurface {
        MemorySurface::with_markup(vec![
            Node::new("div")
                .id("viz")
                .class("visualization-container")
                .child(Node::new("button").id("trig").class(TRIGGER_CLASS))
                .child(Node::new("p").class(DESCRIPTION_CLASS).text("  Weekly revenue by region. "))
                .child(
                    Node::new("div")
                        .id("ctl")
                        .class(CONTROLS_CLASS)
                        .child(Node::new("input").id("range").attr("type", "range")),
                ),
        ])
    }

    #[test]
    fn container_without_trigger_is_inert() {
        let mut s = MemorySurface::with_markup(vec![Node::new("div").id("viz")]);
        assert!(ContextPanel::wire(&mut s, "viz").is_none());
        assert_eq!(s.node("viz").unwrap().children.len(), 0);
    }

    #[test]
    fn wiring_copies_description_and_controls() {
        let mut s = widget();
        let p = ContextPanel::wire(&mut s, "viz").unwrap();
        let panel = s.node(p.panel()).unwrap();
        assert!(panel.text_content().contains("Weekly revenue by region."));
        assert!(s.to_html(p.panel()).unwrap().contains("type=\"range\""));
        // Source ids stay unique.
        assert!(!s.to_html(p.panel()).unwrap().contains("id=\"range\""));
        assert!(!s.has_class("viz", OPEN_CLASS));
    }

    #[test]
    fn click_and_keys_toggle() {
        let mut s = widget();
        let mut p = ContextPanel::wire(&mut s, "viz").unwrap();
        assert_eq!(p.on_click(&mut s, "trig"), Some(true));
        assert!(s.has_class("viz", OPEN_CLASS));
        assert_eq!(s.attribute("trig", "aria-expanded").as_deref(), Some("true"));
        assert_eq!(p.on_key(&mut s, "trig", " "), Some(false));
        assert_eq!(p.on_key(&mut s, "trig", "Enter"), Some(true));
        assert_eq!(p.on_key(&mut s, "trig", "a"), None);
        assert_eq!(p.on_key(&mut s, "other", "Enter"), None);
        assert!(p.state().is_open);
    }

    #[test]
    fn close_control_closes() {
        let mut s = widget();
        let mut p = ContextPanel::wire(&mut s, "viz").unwrap();
        p.toggle(&mut s);
        let close = p.close_control().to_string();
        assert!(s.contains(&close));
        assert_eq!(p.on_click(&mut s, &close), Some(false));
        assert!(!s.has_class("viz", OPEN_CLASS));
    }

    #[test]
    fn content_is_not_resynced() {
        let mut s = widget();
        let p = ContextPanel::wire(&mut s, "viz").unwrap();
        let description = s.query_class("viz", DESCRIPTION_CLASS)[0].clone();
        s.replace_children(&description, vec![Node::new("span").text("changed")])
            .unwrap();
        let again = ContextPanel::wire(&mut s, "viz").unwrap();
        assert_eq!(again.panel(), p.panel());
        assert!(!s.text_content(p.panel()).unwrap().contains("changed"));
    }
}
