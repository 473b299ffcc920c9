//! [`Surface`] over the live browser DOM.
//!
//! Charts are handed to the page's global `Chart` constructor (Chart.js);
//! text overlays are drawn by an inline `afterDraw` plugin.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashlens_core::chart::{ChartSpec, TextOverlay};
use dashlens_core::html::AUTO_ID_PREFIX;
use dashlens_core::surface::{Action, ChartInstanceId, Node, Rect, Surface};
use dashlens_core::{Result, VizError};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement};

static NEXT_AUTO_ID: AtomicU64 = AtomicU64::new(1);

const OVERLAY_PLUGIN_ID: &str = "dashlensOverlays";

/// Map a thrown JS value onto the engine's error type.
pub(crate) fn js_err(context: &str, value: JsValue) -> VizError {
    let detail = value
        .as_string()
        .or_else(|| {
            Reflect::get(&value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"));
    VizError::Surface(format!("{context}: {detail}"))
}

pub(crate) fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| VizError::Surface("no document available".into()))
}

/// Give `el` an id if it has none and return it.
fn ensure_id(el: &Element) -> String {
    let id = el.id();
    if !id.is_empty() {
        return id;
    }
    let id = format!("{AUTO_ID_PREFIX}{}", NEXT_AUTO_ID.fetch_add(1, Ordering::Relaxed));
    el.set_id(&id);
    id
}

struct MountedChart {
    instance: JsValue,
    // Referenced by the chart's plugin; dropped only after the chart is destroyed.
    _after_draw: Closure<dyn FnMut(JsValue)>,
}

pub struct DomSurface {
    document: Document,
    body_id: String,
    charts: HashMap<String, MountedChart>,
    next_chart: u64,
}

impl DomSurface {
    /// Attach to the current document. The body receives an id if it has none.
    pub fn new() -> Result<Self> {
        let document = document()?;
        let body = document
            .body()
            .ok_or_else(|| VizError::Surface("document has no body".into()))?;
        let body_id = ensure_id(&body);
        Ok(Self {
            document,
            body_id,
            charts: HashMap::new(),
            next_chart: 1,
        })
    }

    fn element(&self, id: &str) -> Result<Element> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| VizError::ElementNotFound(id.to_string()))
    }

    fn html_element(&self, id: &str) -> Result<HtmlElement> {
        self.element(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| VizError::Surface(format!("#{id} is not an HTML element")))
    }

    fn build(&self, node: &Node) -> Result<Element> {
        build_element(&self.document, node)
    }

    /// Canvas inside `target`: the target itself, or a canvas appended to it.
    fn canvas_for(&self, target: &str) -> Result<HtmlCanvasElement> {
        let el = self.element(target)?;
        if let Some(canvas) = el.dyn_ref::<HtmlCanvasElement>() {
            return Ok(canvas.clone());
        }
        let canvas_id = format!("{target}-canvas");
        if let Some(existing) = self.document.get_element_by_id(&canvas_id) {
            if let Ok(canvas) = existing.dyn_into::<HtmlCanvasElement>() {
                return Ok(canvas);
            }
        }
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(|e| js_err("create canvas", e))?;
        canvas.set_id(&canvas_id);
        el.append_child(&canvas).map_err(|e| js_err("append canvas", e))?;
        canvas
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| VizError::Surface("canvas element has the wrong type".into()))
    }

    fn destroy_chart(&mut self, target: &str) {
        if let Some(old) = self.charts.remove(target) {
            if let Ok(destroy) = Reflect::get(&old.instance, &JsValue::from_str("destroy")) {
                if let Some(f) = destroy.dyn_ref::<Function>() {
                    let _ = f.call0(&old.instance);
                }
            }
        }
    }
}

fn build_element(document: &Document, node: &Node) -> Result<Element> {
    let el = document
        .create_element(&node.tag)
        .map_err(|e| js_err("create element", e))?;
    if let Some(id) = &node.id {
        el.set_id(id);
    }
    if !node.classes.is_empty() {
        el.set_class_name(&node.classes.join(" "));
    }
    for (name, value) in &node.attributes {
        el.set_attribute(name, value)
            .map_err(|e| js_err("set attribute", e))?;
    }
    if !node.style.is_empty() {
        if let Some(html) = el.dyn_ref::<HtmlElement>() {
            let style = html.style();
            for (property, value) in &node.style {
                style
                    .set_property(property, value)
                    .map_err(|e| js_err("set style", e))?;
            }
        }
    }
    if let Some(text) = &node.text {
        el.set_text_content(Some(text));
    }
    for child in &node.children {
        let child = build_element(document, child)?;
        el.append_child(&child).map_err(|e| js_err("append child", e))?;
    }
    Ok(el)
}

fn snapshot_element(el: &Element) -> Node {
    let mut node = Node::new(&el.local_name());
    let id = el.id();
    if !id.is_empty() {
        node.id = Some(id);
    }
    let names = el.get_attribute_names();
    for name in names.iter().filter_map(|n| n.as_string()) {
        match name.as_str() {
            "id" | "style" => {}
            "class" => {
                let list = el.class_list();
                for i in 0..list.length() {
                    if let Some(c) = list.item(i) {
                        node.classes.push(c);
                    }
                }
            }
            _ => {
                if let Some(value) = el.get_attribute(&name) {
                    node.attributes.insert(name, value);
                }
            }
        }
    }
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let style = html.style();
        for i in 0..style.length() {
            let property = style.item(i);
            if let Ok(value) = style.get_property_value(&property) {
                node.style.insert(property, value);
            }
        }
    }

    let mut text = String::new();
    let children = el.child_nodes();
    for i in 0..children.length() {
        let Some(child) = children.get(i) else {
            continue;
        };
        match child.node_type() {
            web_sys::Node::TEXT_NODE => text.push_str(&child.text_content().unwrap_or_default()),
            web_sys::Node::ELEMENT_NODE => {
                if let Ok(child) = child.dyn_into::<Element>() {
                    node.children.push(snapshot_element(&child));
                }
            }
            _ => {}
        }
    }
    if !text.is_empty() {
        node.text = Some(text);
    }
    node
}

/// Draw each overlay centered on the chart area.
fn draw_overlays(chart: &JsValue, overlays: &[TextOverlay]) {
    let Ok(ctx) = Reflect::get(chart, &JsValue::from_str("ctx")) else {
        return;
    };
    let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
        return;
    };
    let Ok(area) = Reflect::get(chart, &JsValue::from_str("chartArea")) else {
        return;
    };
    let edge = |name: &str| {
        Reflect::get(&area, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    };
    let cx = (edge("left") + edge("right")) / 2.0;
    let cy = (edge("top") + edge("bottom")) / 2.0;

    ctx.save();
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for overlay in overlays {
        ctx.set_font(&overlay.font);
        ctx.set_fill_style_str(&overlay.color);
        let _ = ctx.fill_text(&overlay.text, cx, cy + overlay.offset_y);
    }
    ctx.restore();
}

fn apply_to_document(document: &Document, action: &Action) {
    let Some(el) = document.get_element_by_id(action.target()) else {
        log::debug!("scheduled {action:?} lost its target");
        return;
    };
    let result = match action {
        Action::SetStyle { property, value, .. } => match el.dyn_ref::<HtmlElement>() {
            Some(html) => html.style().set_property(property, value),
            None => Ok(()),
        },
        Action::AddClass { class, .. } => el.class_list().add_1(class),
        Action::RemoveClass { class, .. } => el.class_list().remove_1(class),
    };
    if let Err(e) = result {
        log::warn!("{}", js_err("scheduled action", e));
    }
}

impl Surface for DomSurface {
    fn body_id(&self) -> &str {
        &self.body_id
    }

    fn contains(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn replace_children(&mut self, id: &str, nodes: Vec<Node>) -> Result<()> {
        let el = self.element(id)?;
        el.set_text_content(None);
        for node in &nodes {
            let child = self.build(node)?;
            el.append_child(&child).map_err(|e| js_err("append child", e))?;
        }
        Ok(())
    }

    fn append_child(&mut self, parent: &str, node: Node) -> Result<()> {
        let el = self.element(parent)?;
        let child = self.build(&node)?;
        el.append_child(&child).map_err(|e| js_err("append child", e))?;
        Ok(())
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> Result<()> {
        self.html_element(id)?
            .style()
            .set_property(property, value)
            .map_err(|e| js_err("set style", e))
    }

    fn add_class(&mut self, id: &str, class: &str) -> Result<()> {
        self.element(id)?
            .class_list()
            .add_1(class)
            .map_err(|e| js_err("add class", e))
    }

    fn remove_class(&mut self, id: &str, class: &str) -> Result<()> {
        self.element(id)?
            .class_list()
            .remove_1(class)
            .map_err(|e| js_err("remove class", e))
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.document
            .get_element_by_id(id)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.document.get_element_by_id(id)?.get_attribute(name)
    }

    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> Result<()> {
        self.element(id)?
            .set_attribute(name, value)
            .map_err(|e| js_err("set attribute", e))
    }

    fn remove_attribute(&mut self, id: &str, name: &str) -> Result<()> {
        self.element(id)?
            .remove_attribute(name)
            .map_err(|e| js_err("remove attribute", e))
    }

    fn text_content(&self, id: &str) -> Option<String> {
        self.document.get_element_by_id(id)?.text_content()
    }

    fn snapshot(&self, id: &str) -> Option<Node> {
        self.document
            .get_element_by_id(id)
            .map(|el| snapshot_element(&el))
    }

    fn query_class(&self, scope: &str, class: &str) -> Vec<String> {
        let Some(scope) = self.document.get_element_by_id(scope) else {
            return Vec::new();
        };
        let found = scope.get_elements_by_class_name(class);
        (0..found.length())
            .filter_map(|i| found.item(i))
            .map(|el| ensure_id(&el))
            .collect()
    }

    fn query_attribute(&self, name: &str) -> Vec<String> {
        let Ok(found) = self.document.query_selector_all(&format!("[{name}]")) else {
            return Vec::new();
        };
        (0..found.length())
            .filter_map(|i| found.get(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .map(|el| ensure_id(&el))
            .collect()
    }

    fn bounding_box(&self, id: &str) -> Option<Rect> {
        let r = self.document.get_element_by_id(id)?.get_bounding_client_rect();
        Some(Rect::new(r.left(), r.top(), r.width(), r.height()))
    }

    fn mount_chart(&mut self, target: &str, spec: &ChartSpec) -> Result<ChartInstanceId> {
        let canvas = self.canvas_for(target)?;
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| js_err("canvas context", e))?
            .ok_or_else(|| VizError::Surface(format!("#{target} has no 2d context")))?;

        let ctor = Reflect::get(&js_sys::global(), &JsValue::from_str("Chart"))
            .ok()
            .and_then(|c| c.dyn_into::<Function>().ok())
            .ok_or_else(|| VizError::Surface("Chart.js is not loaded".into()))?;

        self.destroy_chart(target);

        let config = js_sys::JSON::parse(&spec.renderer_config().to_string())
            .map_err(|e| js_err("chart config", e))?;

        let overlays = spec.overlays.clone();
        let after_draw = Closure::<dyn FnMut(JsValue)>::new(move |chart: JsValue| {
            draw_overlays(&chart, &overlays);
        });
        let plugin = Object::new();
        Reflect::set(&plugin, &"id".into(), &OVERLAY_PLUGIN_ID.into()).map_err(|e| js_err("plugin", e))?;
        Reflect::set(&plugin, &"afterDraw".into(), after_draw.as_ref()).map_err(|e| js_err("plugin", e))?;
        Reflect::set(&config, &"plugins".into(), &Array::of1(&plugin)).map_err(|e| js_err("plugin", e))?;

        let instance =
            Reflect::construct(&ctor, &Array::of2(&ctx, &config)).map_err(|e| js_err("new Chart", e))?;

        let id = self.next_chart;
        self.next_chart += 1;
        self.charts.insert(
            target.to_string(),
            MountedChart {
                instance,
                _after_draw: after_draw,
            },
        );
        Ok(ChartInstanceId(id))
    }

    fn schedule(&mut self, delay_ms: u32, action: Action) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let document = self.document.clone();
        let callback = Closure::once_into_js(move || apply_to_document(&document, &action));
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            log::warn!("{}", js_err("setTimeout", e));
        }
    }
}
