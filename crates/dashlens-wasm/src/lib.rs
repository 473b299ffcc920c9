//! dashlens WebAssembly bindings: the engine driving a live page.
//!
//! ```js
//! import init, { WasmDashboard } from "dashlens_wasm";
//! await init();
//! const dash = new WasmDashboard();
//! dash.createLineChart("trend", JSON.stringify({ labels: ["a", "b"], datasets: [{ label: "x", data: [1, 2] }] }));
//! dash.install();
//! ```
//!
//! Chart.js must be loaded globally before any chart is created.

mod dom;

use std::cell::RefCell;
use std::rc::Rc;

use dashlens_core::chart::{ChartData, ChartKind, ChartOptions, GaugeOptions};
use dashlens_core::config::EngagementConfig;
use dashlens_core::{
    Dashboard, EngineConfig, HeatmapOptions, PageEvent, PageSpec, ProgressOptions, Reaction, Viewport,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Element, Event, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent,
};

pub use dom::DomSurface;

// ---------------------------------------------------------------------------
// Browser API helpers
// ---------------------------------------------------------------------------

/// Get `performance.now()` as f64 milliseconds.
fn performance_now() -> f64 {
    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("performance"))
        .ok()
        .and_then(|perf| js_sys::Reflect::get(&perf, &JsValue::from_str("now")).ok())
        .and_then(|func| {
            let func: js_sys::Function = func.dyn_into().ok()?;
            func.call0(&js_sys::global().into()).ok()?.as_f64()
        })
        .unwrap_or(0.0)
}

/// Fill a buffer with `crypto.getRandomValues()`.
fn crypto_get_random(buf: &mut [u8]) -> bool {
    let global = js_sys::global();
    let crypto = match js_sys::Reflect::get(&global, &JsValue::from_str("crypto")) {
        Ok(c) if !c.is_undefined() => c,
        _ => return false,
    };
    let func = match js_sys::Reflect::get(&crypto, &JsValue::from_str("getRandomValues"))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
    {
        Some(f) => f,
        None => return false,
    };

    let array = js_sys::Uint8Array::new_with_length(buf.len() as u32);
    if func.call1(&crypto, &array).is_err() {
        return false;
    }
    array.copy_to(buf);
    true
}

/// Seed for overlay particles. Falls back to the clock without `crypto`.
fn browser_seed() -> u64 {
    let mut buf = [0u8; 8];
    if crypto_get_random(&mut buf) {
        u64::from_le_bytes(buf)
    } else {
        performance_now().to_bits()
    }
}

fn window() -> Result<web_sys::Window, JsError> {
    web_sys::window().ok_or_else(|| JsError::new("no window available"))
}

/// Document scroll metrics.
fn current_viewport() -> Option<Viewport> {
    let window = web_sys::window()?;
    let root = window.document()?.document_element()?;
    let viewport_height = window.inner_height().ok()?.as_f64()?;
    Some(Viewport::new(
        f64::from(root.scroll_top()),
        f64::from(root.scroll_height()),
        viewport_height,
    ))
}

/// Nearest element with an id at or above the event target.
fn event_element(event: &Event) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let el = target.closest("[id]").ok()??;
    Some(el.id())
}

// ---------------------------------------------------------------------------
// JSON argument handling
// ---------------------------------------------------------------------------

/// Parse an optional JSON argument; absent or blank means `T::default()`.
fn parse_or_default<T: DeserializeOwned + Default>(json: Option<&str>) -> Result<T, serde_json::Error> {
    match json.map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(s) => serde_json::from_str(s),
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

type SharedDashboard = Rc<RefCell<Dashboard<DomSurface>>>;

/// A dashboard bound to the current document.
#[wasm_bindgen]
pub struct WasmDashboard {
    inner: SharedDashboard,
    listeners: Vec<Closure<dyn FnMut(Event)>>,
    observer: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>)>,
}

#[wasm_bindgen]
impl WasmDashboard {
    /// `config_json` is an optional engine configuration document.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmDashboard, JsError> {
        let config = match config_json.as_deref().map(str::trim) {
            None | Some("") => EngineConfig::default(),
            Some(s) => EngineConfig::from_json_str(s)?,
        };
        let surface = DomSurface::new()?;
        Ok(Self {
            inner: Rc::new(RefCell::new(Dashboard::with_seed(surface, config, browser_seed()))),
            listeners: Vec::new(),
            observer: None,
        })
    }

    #[wasm_bindgen(js_name = createLineChart)]
    pub fn create_line_chart(&self, target_id: &str, data_json: &str, options_json: Option<String>) -> Result<u32, JsError> {
        self.chart(ChartKind::Line, target_id, data_json, options_json)
    }

    #[wasm_bindgen(js_name = createBarChart)]
    pub fn create_bar_chart(&self, target_id: &str, data_json: &str, options_json: Option<String>) -> Result<u32, JsError> {
        self.chart(ChartKind::Bar, target_id, data_json, options_json)
    }

    #[wasm_bindgen(js_name = createDoughnutChart)]
    pub fn create_doughnut_chart(
        &self,
        target_id: &str,
        data_json: &str,
        options_json: Option<String>,
    ) -> Result<u32, JsError> {
        self.chart(ChartKind::Doughnut, target_id, data_json, options_json)
    }

    #[wasm_bindgen(js_name = createRadarChart)]
    pub fn create_radar_chart(&self, target_id: &str, data_json: &str, options_json: Option<String>) -> Result<u32, JsError> {
        self.chart(ChartKind::Radar, target_id, data_json, options_json)
    }

    #[wasm_bindgen(js_name = createScatterChart)]
    pub fn create_scatter_chart(
        &self,
        target_id: &str,
        data_json: &str,
        options_json: Option<String>,
    ) -> Result<u32, JsError> {
        self.chart(ChartKind::Scatter, target_id, data_json, options_json)
    }

    #[wasm_bindgen(js_name = createGaugeChart)]
    pub fn create_gauge_chart(
        &self,
        target_id: &str,
        value: f64,
        max_value: f64,
        options_json: Option<String>,
    ) -> Result<u32, JsError> {
        let options: GaugeOptions = parse_or_default(options_json.as_deref())?;
        let handle = self
            .inner
            .borrow_mut()
            .create_gauge_chart(target_id, value, max_value, options)?;
        Ok(handle.instance.0 as u32)
    }

    /// `values_json` is a row-major matrix; labels are JSON string arrays.
    #[wasm_bindgen(js_name = createHeatmap)]
    pub fn create_heatmap(
        &self,
        container_id: &str,
        values_json: &str,
        row_labels_json: &str,
        col_labels_json: &str,
        options_json: Option<String>,
    ) -> Result<(), JsError> {
        let values: Vec<Vec<f64>> = serde_json::from_str(values_json)?;
        let rows: Vec<String> = serde_json::from_str(row_labels_json)?;
        let cols: Vec<String> = serde_json::from_str(col_labels_json)?;
        let options: HeatmapOptions = parse_or_default(options_json.as_deref())?;
        self.inner
            .borrow_mut()
            .create_heatmap(container_id, values, rows, cols, &options)?;
        Ok(())
    }

    /// Returns the rendered percentage.
    #[wasm_bindgen(js_name = createProgressBar)]
    pub fn create_progress_bar(
        &self,
        container_id: &str,
        value: f64,
        max_value: f64,
        options_json: Option<String>,
    ) -> Result<f64, JsError> {
        let options: ProgressOptions = parse_or_default(options_json.as_deref())?;
        let handle = self
            .inner
            .borrow_mut()
            .create_progress_bar(container_id, value, max_value, &options)?;
        Ok(handle.state.percentage)
    }

    #[wasm_bindgen(js_name = createSuccessMoment)]
    pub fn create_success_moment(&self, element_id: &str, message: &str) -> bool {
        self.inner.borrow_mut().create_success_moment(element_id, message)
    }

    /// Render a page document. Returns the number of widgets rendered.
    #[wasm_bindgen(js_name = renderPage)]
    pub fn render_page(&self, page_json: &str) -> Result<u32, JsError> {
        let page = PageSpec::from_json_str(page_json)?;
        self.inner.borrow_mut().render_page(&page)?;
        Ok(page.widgets.len() as u32)
    }

    /// Engagement flags and counters as JSON.
    #[wasm_bindgen(js_name = engagementState)]
    pub fn engagement_state(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.inner.borrow().engagement_state())?)
    }

    /// Wire panels, tooltips and metric cards, then start listening to the page.
    /// Calling it again only picks up newly added markup.
    pub fn install(&mut self) -> Result<(), JsError> {
        self.inner.borrow_mut().install();
        if self.listeners.is_empty() {
            self.listen()?;
        }
        self.observe_reveals()?;
        Ok(())
    }
}

impl WasmDashboard {
    fn chart(&self, kind: ChartKind, target: &str, data: &str, options: Option<String>) -> Result<u32, JsError> {
        let data: ChartData = serde_json::from_str(data)?;
        let options: ChartOptions = parse_or_default(options.as_deref())?;
        let handle = self.inner.borrow_mut().create_chart(kind, target, data, options)?;
        Ok(handle.instance.0 as u32)
    }

    fn listen(&mut self) -> Result<(), JsError> {
        let window = window()?;
        let document = window.document().ok_or_else(|| JsError::new("no document available"))?;

        let inner = Rc::clone(&self.inner);
        let on_scroll = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let Some(viewport) = current_viewport() else {
                return;
            };
            dispatch(&inner, PageEvent::Scroll { viewport });
        });
        let passive = AddEventListenerOptions::new();
        passive.set_passive(true);
        window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                on_scroll.as_ref().unchecked_ref(),
                &passive,
            )
            .map_err(|_| JsError::new("failed to add scroll listener"))?;

        let inner = Rc::clone(&self.inner);
        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(element) = event_element(&event) {
                dispatch(&inner, PageEvent::Click { element });
            }
        });
        document
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(|_| JsError::new("failed to add click listener"))?;

        let inner = Rc::clone(&self.inner);
        let on_key = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let Some(element) = event_element(&event) else {
                return;
            };
            let reactions = dispatch(&inner, PageEvent::Key { element, key });
            // Activation keys that toggled a panel must not also scroll the page.
            if reactions
                .iter()
                .any(|r| matches!(r, Reaction::PanelToggled { .. }))
            {
                event.prevent_default();
            }
        });
        document
            .add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
            .map_err(|_| JsError::new("failed to add keydown listener"))?;

        self.listeners.extend([on_scroll, on_click, on_key]);
        Ok(())
    }

    fn observe_reveals(&mut self) -> Result<(), JsError> {
        if self.observer.is_none() {
            let threshold = self.inner.borrow().config().reveal.visibility_threshold;
            let inner = Rc::clone(&self.inner);
            let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
                move |entries: js_sys::Array, observer: IntersectionObserver| {
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        let target = entry.target();
                        let event = PageEvent::Visibility {
                            element: target.id(),
                            ratio: entry.intersection_ratio(),
                        };
                        let revealed = dispatch(&inner, event)
                            .iter()
                            .any(|r| matches!(r, Reaction::CardRevealed { .. }));
                        if revealed {
                            observer.unobserve(&target);
                        }
                    }
                },
            );
            let init = IntersectionObserverInit::new();
            init.set_threshold(&JsValue::from_f64(threshold));
            let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|_| JsError::new("IntersectionObserver unavailable"))?;
            self.observer = Some((observer, callback));
        }

        let Some((observer, _)) = &self.observer else {
            return Ok(());
        };
        let document = window()?
            .document()
            .ok_or_else(|| JsError::new("no document available"))?;
        for id in self.inner.borrow().pending_reveals() {
            if let Some(el) = document.get_element_by_id(&id) {
                observer.observe(&el);
            }
        }
        Ok(())
    }
}

/// Feed one event to the dashboard. Events arriving while the dashboard is
/// already borrowed (a handler re-entered from script) are dropped.
fn dispatch(inner: &SharedDashboard, event: PageEvent) -> Vec<Reaction> {
    let Ok(mut dashboard) = inner.try_borrow_mut() else {
        log::debug!("dropping re-entrant {event:?}");
        return Vec::new();
    };
    let reactions = dashboard.handle(event);
    for r in &reactions {
        log::debug!("{r:?}");
    }
    reactions
}

/// One-off success overlay at `element_id`, without a dashboard.
#[wasm_bindgen(js_name = createSuccessMoment)]
pub fn create_success_moment(element_id: &str, message: &str) -> Result<bool, JsError> {
    let mut surface = DomSurface::new()?;
    let mut rng = SmallRng::seed_from_u64(browser_seed());
    Ok(dashlens_core::create_success_moment(
        &mut surface,
        element_id,
        message,
        &EngagementConfig::default(),
        &mut rng,
    ))
}

/// Crate version.
#[wasm_bindgen]
pub fn version() -> String {
    dashlens_core::VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_options_use_defaults() {
        let opts: ProgressOptions = parse_or_default(None).unwrap();
        assert_eq!(opts, ProgressOptions::default());
        let opts: HeatmapOptions = parse_or_default(Some("  ")).unwrap();
        assert_eq!(opts, HeatmapOptions::default());
    }

    #[test]
    fn options_json_is_parsed() {
        let opts: ProgressOptions = parse_or_default(Some(r##"{"color":"#123456"}"##)).unwrap();
        assert_eq!(opts.color.as_deref(), Some("#123456"));
        assert!(parse_or_default::<ChartOptions>(Some("{not json")).is_err());
    }
}
