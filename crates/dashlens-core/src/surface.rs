//! Rendering-surface abstraction.
//!
//! The engine never touches a concrete DOM. Widgets are described as detached
//! [`Node`] trees and handed to a [`Surface`], which owns element lookup, style
//! and class mutation, layout queries, chart mounting and delayed callbacks.
//!
//! Two implementations exist: [`crate::memory::MemorySurface`] (tests, static
//! export) and the `web-sys` backed surface in `dashlens-wasm`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Detached element description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add one or more space-separated classes.
    pub fn class(mut self, class: &str) -> Self {
        for c in class.split_whitespace() {
            if !self.classes.iter().any(|existing| existing == c) {
                self.classes.push(c.to_string());
            }
        }
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn style(mut self, property: &str, value: impl Into<String>) -> Self {
        self.style.insert(property.to_string(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Concatenated text of this node and its descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(t) = &self.text {
            out.push_str(t);
        }
        for c in &self.children {
            c.collect_text(out);
        }
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Ids of descendants (not self) carrying `class`, in document order.
    pub fn ids_with_class(&self, class: &str) -> Vec<String> {
        let mut out = Vec::new();
        for c in &self.children {
            c.walk(&mut |n| {
                if n.has_class(class) {
                    if let Some(id) = &n.id {
                        out.push(id.clone());
                    }
                }
            });
        }
        out
    }

    /// Pre-order visit of self and descendants.
    pub fn walk<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Viewport-relative bounding box, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn vertical_midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Fraction of this box's height inside `[0, viewport_height]`.
    pub fn visible_ratio(&self, viewport_height: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let visible = self.bottom().min(viewport_height) - self.top.max(0.0);
        (visible / self.height).clamp(0.0, 1.0)
    }
}

/// Document scroll position and extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    /// `scroll_top / (scroll_height - viewport_height) * 100`.
    ///
    /// A document that does not scroll reports 0.
    pub fn scroll_percentage(&self) -> f64 {
        let scrollable = self.scroll_height - self.viewport_height;
        if scrollable <= 0.0 {
            return 0.0;
        }
        self.scroll_top / scrollable * 100.0
    }
}

// ---------------------------------------------------------------------------
// Deferred work
// ---------------------------------------------------------------------------

/// A mutation applied later by the surface's scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    SetStyle {
        target: String,
        property: String,
        value: String,
    },
    AddClass {
        target: String,
        class: String,
    },
    RemoveClass {
        target: String,
        class: String,
    },
}

impl Action {
    pub fn target(&self) -> &str {
        match self {
            Self::SetStyle { target, .. }
            | Self::AddClass { target, .. }
            | Self::RemoveClass { target, .. } => target,
        }
    }
}

/// Opaque handle to a renderer-backed chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartInstanceId(pub u64);

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// Everything the engine needs from a rendering surface.
///
/// Mutations on an id that does not resolve fail with
/// [`VizError::ElementNotFound`](crate::VizError::ElementNotFound); queries
/// return empty results instead.
pub trait Surface {
    /// Id of the element that hosts page-level overlays.
    fn body_id(&self) -> &str;

    fn contains(&self, id: &str) -> bool;

    /// Drop all children of `id` and insert `nodes` in order.
    fn replace_children(&mut self, id: &str, nodes: Vec<Node>) -> Result<()>;

    fn append_child(&mut self, parent: &str, node: Node) -> Result<()>;

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> Result<()>;

    fn add_class(&mut self, id: &str, class: &str) -> Result<()>;

    fn remove_class(&mut self, id: &str, class: &str) -> Result<()>;

    fn has_class(&self, id: &str, class: &str) -> bool;

    fn attribute(&self, id: &str, name: &str) -> Option<String>;

    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&mut self, id: &str, name: &str) -> Result<()>;

    fn text_content(&self, id: &str) -> Option<String>;

    /// Deep copy of the element and its subtree.
    fn snapshot(&self, id: &str) -> Option<Node>;

    /// Ids of descendants of `scope` carrying `class`, in document order.
    fn query_class(&self, scope: &str, class: &str) -> Vec<String>;

    /// Ids of elements anywhere in the document carrying attribute `name`.
    fn query_attribute(&self, name: &str) -> Vec<String>;

    fn bounding_box(&self, id: &str) -> Option<Rect>;

    /// Bind a chart renderer to the drawing surface at `target`.
    fn mount_chart(&mut self, target: &str, spec: &ChartSpec) -> Result<ChartInstanceId>;

    /// Run `action` after `delay_ms`. Scheduled work is never cancelled.
    fn schedule(&mut self, delay_ms: u32, action: Action);

    /// Move a virtual clock forward. Surfaces driven by a real clock ignore it.
    fn advance_clock(&mut self, _ms: u64) {}

    fn apply(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::SetStyle {
                target,
                property,
                value,
            } => self.set_style(target, property, value),
            Action::AddClass { target, class } => self.add_class(target, class),
            Action::RemoveClass { target, class } => self.remove_class(target, class),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_builder_dedupes_and_splits() {
        let n = Node::new("div").class("a b").class("b c");
        assert_eq!(n.classes, vec!["a", "b", "c"]);
    }

    #[test]
    fn text_content_is_document_order() {
        let n = Node::new("p")
            .text("one ")
            .child(Node::new("b").text("two"))
            .child(Node::new("i").text(" three"));
        assert_eq!(n.text_content(), "one two three");
    }

    #[test]
    fn ids_with_class_skips_self() {
        let n = Node::new("div")
            .id("root")
            .class("x")
            .child(Node::new("span").id("a").class("x"))
            .child(Node::new("span").class("x"))
            .child(Node::new("div").child(Node::new("em").id("b").class("x")));
        assert_eq!(n.ids_with_class("x"), vec!["a", "b"]);
    }

    #[test]
    fn scroll_percentage_handles_short_documents() {
        assert_eq!(Viewport::new(0.0, 500.0, 800.0).scroll_percentage(), 0.0);
        assert_eq!(Viewport::new(100.0, 1200.0, 800.0).scroll_percentage(), 25.0);
    }

    #[test]
    fn visible_ratio_clips_to_viewport() {
        let r = Rect::new(0.0, 700.0, 100.0, 200.0);
        assert!((r.visible_ratio(800.0) - 0.5).abs() < 1e-12);
        assert_eq!(Rect::new(0.0, 900.0, 100.0, 50.0).visible_ratio(800.0), 0.0);
        assert_eq!(Rect::new(0.0, 10.0, 100.0, 50.0).visible_ratio(800.0), 1.0);
    }
}
