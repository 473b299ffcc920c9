//! In-memory [`Surface`] with a virtual clock.
//!
//! Holds a single document tree rooted at `#body`. Scheduled actions are kept
//! in a queue and only run when the clock is advanced, which makes delayed
//! behavior (fill animation, overlay auto-hide) observable in tests and lets
//! the CLI settle a page before exporting it.

use std::collections::{BTreeMap, HashMap};

use crate::chart::ChartSpec;
use crate::error::{Result, VizError};
use crate::html::{AUTO_ID_PREFIX, to_html};
use crate::surface::{Action, ChartInstanceId, Node, Rect, Surface};

const BODY_ID: &str = "body";

#[derive(Debug, Clone)]
struct Pending {
    due_ms: u64,
    seq: u64,
    action: Action,
}

/// Chart bound to a target element.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedChart {
    pub target: String,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone)]
pub struct MemorySurface {
    root: Node,
    layout: HashMap<String, Rect>,
    charts: BTreeMap<u64, MountedChart>,
    next_chart: u64,
    next_auto_id: u64,
    clock_ms: u64,
    seq: u64,
    queue: Vec<Pending>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            root: Node::new("body").id(BODY_ID),
            layout: HashMap::new(),
            charts: BTreeMap::new(),
            next_chart: 1,
            next_auto_id: 1,
            clock_ms: 0,
            seq: 0,
            queue: Vec::new(),
        }
    }

    /// Surface whose body already holds `nodes` (host-authored markup).
    pub fn with_markup(nodes: Vec<Node>) -> Self {
        let mut surface = Self::new();
        for mut node in nodes {
            surface.assign_ids(&mut node);
            surface.root.children.push(node);
        }
        surface
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    pub fn set_bounding_box(&mut self, id: &str, rect: Rect) {
        self.layout.insert(id.to_string(), rect);
    }

    /// Shift every known box vertically, as a scroll of `dy` pixels would.
    pub fn scroll_by(&mut self, dy: f64) {
        for rect in self.layout.values_mut() {
            rect.top -= dy;
        }
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    pub fn now_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Number of scheduled actions not yet run.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Advance the clock by `ms`, running every action that comes due in
    /// (due time, scheduling order). Returns the actions that ran.
    pub fn advance(&mut self, ms: u64) -> Vec<Action> {
        let until = self.clock_ms.saturating_add(ms);
        let mut fired = Vec::new();
        loop {
            let next = self
                .queue
                .iter()
                .enumerate()
                .filter(|(_, p)| p.due_ms <= until)
                .min_by_key(|(_, p)| (p.due_ms, p.seq))
                .map(|(i, _)| i);
            let Some(index) = next else { break };
            let pending = self.queue.remove(index);
            self.clock_ms = pending.due_ms;
            if let Err(e) = self.apply(&pending.action) {
                log::warn!("scheduled action on #{} dropped: {e}", pending.action.target());
            }
            fired.push(pending.action);
        }
        self.clock_ms = until;
        fired
    }

    /// Run everything still queued, however far in the future.
    pub fn settle(&mut self) -> Vec<Action> {
        let horizon = self
            .queue
            .iter()
            .map(|p| p.due_ms)
            .max()
            .unwrap_or(self.clock_ms);
        self.advance(horizon.saturating_sub(self.clock_ms))
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn style_of(&self, id: &str, property: &str) -> Option<String> {
        self.node(id)?.style.get(property).cloned()
    }

    pub fn chart(&self, instance: ChartInstanceId) -> Option<&MountedChart> {
        self.charts.get(&instance.0)
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }

    /// Markup of one element and its subtree.
    pub fn to_html(&self, id: &str) -> Option<String> {
        self.node(id).map(to_html)
    }

    /// Markup of the whole document body.
    pub fn document_html(&self) -> String {
        to_html(&self.root)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.root
            .find_mut(id)
            .ok_or_else(|| VizError::ElementNotFound(id.to_string()))
    }

    fn assign_ids(&mut self, node: &mut Node) {
        if node.id.is_none() {
            node.id = Some(format!("{AUTO_ID_PREFIX}{}", self.next_auto_id));
            self.next_auto_id += 1;
        }
        for child in &mut node.children {
            self.assign_ids(child);
        }
    }
}

impl Surface for MemorySurface {
    fn body_id(&self) -> &str {
        BODY_ID
    }

    fn contains(&self, id: &str) -> bool {
        self.root.find(id).is_some()
    }

    fn replace_children(&mut self, id: &str, mut nodes: Vec<Node>) -> Result<()> {
        for node in &mut nodes {
            self.assign_ids(node);
        }
        self.node_mut(id)?.children = nodes;
        Ok(())
    }

    fn append_child(&mut self, parent: &str, mut node: Node) -> Result<()> {
        self.assign_ids(&mut node);
        self.node_mut(parent)?.children.push(node);
        Ok(())
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> Result<()> {
        self.node_mut(id)?
            .style
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.has_class(class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, id: &str, class: &str) -> Result<()> {
        self.node_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.node(id).is_some_and(|n| n.has_class(class))
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.node(id)?.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> Result<()> {
        self.node_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, id: &str, name: &str) -> Result<()> {
        self.node_mut(id)?.attributes.remove(name);
        Ok(())
    }

    fn text_content(&self, id: &str) -> Option<String> {
        self.node(id).map(Node::text_content)
    }

    fn snapshot(&self, id: &str) -> Option<Node> {
        self.node(id).cloned()
    }

    fn query_class(&self, scope: &str, class: &str) -> Vec<String> {
        self.node(scope)
            .map(|n| n.ids_with_class(class))
            .unwrap_or_default()
    }

    fn query_attribute(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.root.walk(&mut |n| {
            if n.attributes.contains_key(name) {
                if let Some(id) = &n.id {
                    out.push(id.clone());
                }
            }
        });
        out
    }

    fn bounding_box(&self, id: &str) -> Option<Rect> {
        if !self.contains(id) {
            return None;
        }
        self.layout.get(id).copied()
    }

    fn mount_chart(&mut self, target: &str, spec: &ChartSpec) -> Result<ChartInstanceId> {
        let payload = serde_json::to_string(spec)?;
        self.set_attribute(target, "data-chart", &payload)?;

        // A target hosts one chart; remounting replaces the previous instance.
        self.charts.retain(|_, c| c.target != target);
        let id = self.next_chart;
        self.next_chart += 1;
        self.charts.insert(
            id,
            MountedChart {
                target: target.to_string(),
                spec: spec.clone(),
            },
        );
        Ok(ChartInstanceId(id))
    }

    fn schedule(&mut self, delay_ms: u32, action: Action) {
        self.seq += 1;
        self.queue.push(Pending {
            due_ms: self.clock_ms.saturating_add(u64::from(delay_ms)),
            seq: self.seq,
            action,
        });
    }

    fn advance_clock(&mut self, ms: u64) {
        self.advance(ms);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
