//! Browser binding: a [`Host`] over the live DOM, a Chart.js renderer and
//! the event/frame loop that drives a [`PageController`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use js_sys::{Array, Function, Object, Reflect, WeakMap};
use serde::Serialize;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, MouseEvent, Node,
    ScrollBehavior as DomScrollBehavior, ScrollToOptions, Window,
};

use crate::chart::{ChartHandle, ChartRenderer, ChartSpec};
use crate::core::ContentModel;
use crate::error::{PageError, PageResult};
use crate::host::{ElementId, ElementSpec, Host, Rect, ScrollBehavior, ViewportMetrics};
use crate::notification::{NotificationId, NotificationKind};
use crate::page::{PageConfig, PageController, PageEvent, PagePhase};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type WebPage = PageController<WebHost, ChartJsRenderer>;
type ValueCallback = Closure<dyn Fn(JsValue) -> JsValue>;
type FrameCallback = Closure<dyn FnMut(f64)>;

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn host_error(context: &str, value: &JsValue) -> PageError {
    PageError::HostUnavailable(format!("{context}: {}", js_message(value)))
}

fn renderer_error(context: &str, value: &JsValue) -> PageError {
    PageError::RendererUnavailable(format!("{context}: {}", js_message(value)))
}

/// Entry count below which the arena never sweeps for detached elements.
const MIN_PRUNE_AT: usize = 64;

/// DOM elements handed out as [`ElementId`]s. Shared between the host and
/// the chart renderer so canvases resolve on both sides.
///
/// Lookups go through a `WeakMap` keyed by the element itself. Ids are never
/// reused, so an id whose element was dropped resolves to `None`.
#[derive(Debug)]
struct ElementArena {
    ids: WeakMap,
    elements: RefCell<HashMap<ElementId, Element>>,
    next_id: Cell<u32>,
    prune_at: Cell<usize>,
}

impl Default for ElementArena {
    fn default() -> Self {
        Self {
            ids: WeakMap::new(),
            elements: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            prune_at: Cell::new(MIN_PRUNE_AT),
        }
    }
}

impl ElementArena {
    fn intern(&self, element: Element) -> ElementId {
        let key: &Object = element.as_ref();
        if let Some(raw) = self.ids.get(key).as_f64() {
            let id = ElementId(raw as u32);
            if self.elements.borrow().contains_key(&id) {
                return id;
            }
        }
        self.prune_if_due();
        let id = ElementId(self.next_id.get());
        self.next_id.set(self.next_id.get().wrapping_add(1));
        self.ids.set(key, &JsValue::from(id.0));
        self.elements.borrow_mut().insert(id, element);
        id
    }

    fn get(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(&id).cloned()
    }

    fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Drops `root` and every tracked element inside it.
    fn forget_subtree(&self, root: &Element) {
        let root: &Node = root.as_ref();
        let mut elements = self.elements.borrow_mut();
        let before = elements.len();
        elements.retain(|_, element| !root.contains(Some(element.as_ref())));
        debug!(forgotten = before - elements.len(), "arena dropped removed subtree");
    }

    /// Sweeps elements detached behind the host's back once the arena has
    /// doubled since the last sweep.
    fn prune_if_due(&self) {
        let mut elements = self.elements.borrow_mut();
        if elements.len() < self.prune_at.get() {
            return;
        }
        let before = elements.len();
        elements.retain(|_, element| element.is_connected());
        self.prune_at.set((elements.len() * 2).max(MIN_PRUNE_AT));
        debug!(pruned = before - elements.len(), kept = elements.len(), "element arena pruned");
    }
}

/// [`Host`] implementation over `web_sys`.
#[derive(Debug, Clone)]
pub struct WebHost {
    window: Window,
    document: Document,
    arena: Rc<ElementArena>,
}

impl WebHost {
    pub fn new() -> PageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| PageError::HostUnavailable("no global window".to_owned()))?;
        let document = window
            .document()
            .ok_or_else(|| PageError::HostUnavailable("window has no document".to_owned()))?;
        Ok(Self {
            window,
            document,
            arena: Rc::new(ElementArena::default()),
        })
    }

    /// Stable id for a DOM element, e.g. an event target.
    pub fn resolve(&self, element: Element) -> ElementId {
        self.arena.intern(element)
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.arena.get(id)
    }

    /// Number of DOM elements currently reachable through an [`ElementId`].
    #[must_use]
    pub fn tracked_elements(&self) -> usize {
        self.arena.len()
    }

    /// Chart.js renderer resolving canvases through this host.
    #[must_use]
    pub fn chart_renderer(&self) -> ChartJsRenderer {
        ChartJsRenderer {
            arena: Rc::clone(&self.arena),
            charts: IndexMap::new(),
            next_handle: 0,
        }
    }

    fn html(&self, id: ElementId) -> Option<HtmlElement> {
        self.element(id)?.dyn_into::<HtmlElement>().ok()
    }

    fn build(&self, spec: &ElementSpec) -> Result<Element, JsValue> {
        let element = self.document.create_element(&spec.tag)?;
        for class in &spec.classes {
            element.class_list().add_1(class)?;
        }
        for (name, value) in &spec.attributes {
            element.set_attribute(name, value)?;
        }
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let style = html.style();
            for (property, value) in &spec.styles {
                style.set_property(property, value)?;
            }
        }
        if let Some(text) = &spec.text {
            element.set_text_content(Some(text));
        }
        for child in &spec.children {
            element.append_child(&self.build(child)?)?;
        }
        Ok(element)
    }
}

impl Host for WebHost {
    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(error) => {
                debug!(selector, error = %js_message(&error), "selector rejected by document");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.arena.intern(element))
            .collect()
    }

    fn body(&self) -> Option<ElementId> {
        self.document
            .body()
            .map(|body| self.arena.intern(body.into()))
    }

    fn head(&self) -> Option<ElementId> {
        self.document
            .head()
            .map(|head| self.arena.intern(head.into()))
    }

    fn is_connected(&self, element: ElementId) -> bool {
        self.element(element)
            .is_some_and(|element| element.is_connected())
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(ancestor), Some(node)) => ancestor.contains(Some(node.as_ref())),
            _ => false,
        }
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Err(error) = element.set_attribute(name, value) {
            debug!(name, error = %js_message(&error), "set_attribute failed");
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Err(error) = element.class_list().add_1(class) {
            debug!(class, error = %js_message(&error), "add_class failed");
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Err(error) = element.class_list().remove_1(class) {
            debug!(class, error = %js_message(&error), "remove_class failed");
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        let value = self
            .html(element)?
            .style()
            .get_property_value(property)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        let Some(html) = self.html(element) else {
            return;
        };
        if let Err(error) = html.style().set_property(property, value) {
            debug!(property, error = %js_message(&error), "set_style failed");
        }
    }

    fn text_content(&self, element: ElementId) -> String {
        self.element(element)
            .and_then(|element| element.text_content())
            .unwrap_or_default()
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        let element = self
            .element(element)
            .filter(|element| element.is_connected())?;
        let rect = element.get_bounding_client_rect();
        Some(Rect::new(rect.x(), rect.y(), rect.width(), rect.height()))
    }

    fn offset_top(&self, element: ElementId) -> Option<f64> {
        let rect = self.bounding_rect(element)?;
        Some(rect.top() + self.viewport().scroll_y)
    }

    fn viewport(&self) -> ViewportMetrics {
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        ViewportMetrics::new(width, height, scroll_y)
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Instant => DomScrollBehavior::Instant,
            ScrollBehavior::Smooth => DomScrollBehavior::Smooth,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn create_element(&mut self, parent: ElementId, spec: &ElementSpec) -> Option<ElementId> {
        let parent = self.element(parent)?;
        let created = self
            .build(spec)
            .and_then(|element| parent.append_child(&element).map(|_| element));
        match created {
            Ok(element) => Some(self.arena.intern(element)),
            Err(error) => {
                debug!(tag = %spec.tag, error = %js_message(&error), "create_element failed");
                None
            }
        }
    }

    fn remove_element(&mut self, element: ElementId) -> bool {
        let Some(element) = self.element(element) else {
            return false;
        };
        if element.parent_node().is_none() {
            return false;
        }
        element.remove();
        self.arena.forget_subtree(&element);
        true
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }
}

struct LiveChart {
    chart: JsValue,
    // Dropped together with the chart; Chart.js holds references to them.
    _callbacks: Vec<ValueCallback>,
}

/// Renders [`ChartSpec`]s through the page's global `Chart` constructor.
pub struct ChartJsRenderer {
    arena: Rc<ElementArena>,
    charts: IndexMap<ChartHandle, LiveChart>,
    next_handle: u64,
}

impl std::fmt::Debug for ChartJsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartJsRenderer")
            .field("charts", &self.charts.len())
            .field("next_handle", &self.next_handle)
            .finish()
    }
}

impl ChartRenderer for ChartJsRenderer {
    fn render(&mut self, canvas: ElementId, spec: &ChartSpec) -> PageResult<ChartHandle> {
        spec.validate()?;
        let canvas = self.arena.get(canvas).ok_or_else(|| {
            PageError::RendererUnavailable("canvas does not belong to this document".to_owned())
        })?;
        let window = web_sys::window()
            .ok_or_else(|| PageError::RendererUnavailable("no global window".to_owned()))?;
        let constructor = Reflect::get(&window, &JsValue::from_str("Chart"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| PageError::RendererUnavailable("Chart.js is not loaded".to_owned()))?;

        let config = spec
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| {
                PageError::RendererUnavailable(format!("failed to convert chart config: {e}"))
            })?;
        let callbacks = install_callbacks(&config, spec)
            .map_err(|error| renderer_error("failed to install chart callbacks", &error))?;
        let chart = Reflect::construct(&constructor, &Array::of2(canvas.as_ref(), &config))
            .map_err(|error| renderer_error("Chart constructor threw", &error))?;

        let handle = ChartHandle(self.next_handle);
        self.next_handle += 1;
        self.charts.insert(
            handle,
            LiveChart {
                chart,
                _callbacks: callbacks,
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) {
        let Some(live) = self.charts.shift_remove(&handle) else {
            return;
        };
        let destroy = Reflect::get(&live.chart, &JsValue::from_str("destroy"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());
        let Some(destroy) = destroy else {
            return;
        };
        if let Err(error) = destroy.call0(&live.chart) {
            warn!(?handle, error = %js_message(&error), "chart destroy threw");
        }
    }
}

/// Returns `parent[key]`, creating an empty object there when missing.
fn child_object(parent: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    let key = JsValue::from_str(key);
    let existing = Reflect::get(parent, &key)?;
    if existing.is_object() {
        return Ok(existing);
    }
    let created: JsValue = Object::new().into();
    Reflect::set(parent, &key, &created)?;
    Ok(created)
}

fn install_callbacks(config: &JsValue, spec: &ChartSpec) -> Result<Vec<ValueCallback>, JsValue> {
    let options = child_object(config, "options")?;
    let mut callbacks = Vec::new();

    if !spec.tooltip_labels.is_empty() {
        let labels = spec.tooltip_labels.clone();
        let label: ValueCallback = Closure::new(move |context: JsValue| {
            Reflect::get(&context, &JsValue::from_str("dataIndex"))
                .ok()
                .and_then(|index| index.as_f64())
                .and_then(|index| labels.get(index as usize))
                .map_or(JsValue::UNDEFINED, |text| JsValue::from_str(text))
        });
        let tooltip = child_object(&child_object(&options, "plugins")?, "tooltip")?;
        let handlers = child_object(&tooltip, "callbacks")?;
        Reflect::set(&handlers, &JsValue::from_str("label"), label.as_ref())?;
        callbacks.push(label);
    }

    if let Some(affixes) = spec.tick_affixes.clone() {
        let tick: ValueCallback = Closure::new(move |value: JsValue| {
            value
                .as_f64()
                .map_or(value, |number| JsValue::from_str(&affixes.format(number)))
        });
        let scales = child_object(&options, "scales")?;
        let ticks = child_object(&child_object(&scales, "y")?, "ticks")?;
        Reflect::set(&ticks, &JsValue::from_str("callback"), tick.as_ref())?;
        callbacks.push(tick);
    }

    Ok(callbacks)
}

/// A controller running against the live document.
///
/// Dropping it has the same effect as [`MountedPage::unmount`].
pub struct MountedPage {
    page: Rc<RefCell<WebPage>>,
    window: Window,
    listeners: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
    frame: Rc<RefCell<Option<FrameCallback>>>,
    frame_id: Rc<Cell<Option<i32>>>,
}

/// Builds a controller over the current document, starts it and wires
/// document events plus a `requestAnimationFrame` clock.
pub fn mount(content: ContentModel, config: PageConfig) -> PageResult<MountedPage> {
    let host = WebHost::new()?;
    let window = host.window.clone();
    let document = host.document.clone();
    let renderer = host.chart_renderer();
    let page = PageController::new(host, renderer, content, config)?;

    let mut mounted = MountedPage {
        page: Rc::new(RefCell::new(page)),
        window: window.clone(),
        listeners: Vec::new(),
        frame: Rc::new(RefCell::new(None)),
        frame_id: Rc::new(Cell::new(None)),
    };
    mounted.page.borrow_mut().start(performance_now(&window));

    mounted.listen(&document, "click", |page, now, event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let Some(target) = event_element(event) else {
            return;
        };
        let target = page.host().resolve(target);
        let prevent = page.dispatch(
            now,
            PageEvent::Click {
                target,
                client_x: f64::from(mouse.client_x()),
                client_y: f64::from(mouse.client_y()),
            },
        );
        if prevent {
            event.prevent_default();
        }
    })?;
    mounted.listen(&document, "mouseover", |page, now, event| {
        if let Some(target) = event_element(event) {
            let target = page.host().resolve(target);
            page.dispatch(now, PageEvent::PointerEnter { target });
        }
    })?;
    mounted.listen(&document, "mouseout", |page, now, event| {
        if let Some(target) = event_element(event) {
            let target = page.host().resolve(target);
            page.dispatch(now, PageEvent::PointerLeave { target });
        }
    })?;
    mounted.listen(&window, "scroll", |page, now, _| {
        page.dispatch(now, PageEvent::Scroll);
    })?;
    mounted.listen(&window, "resize", |page, now, _| {
        page.dispatch(now, PageEvent::Resize);
    })?;
    mounted.listen(&window, "load", |page, now, _| {
        page.dispatch(now, PageEvent::Load);
    })?;
    mounted.start_frame_loop()?;

    info!(listeners = mounted.listeners.len(), "page mounted");
    Ok(mounted)
}

fn performance_now(window: &Window) -> f64 {
    window
        .performance()
        .map_or(0.0, |performance| performance.now())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn request_frame(
    window: &Window,
    frame: &RefCell<Option<FrameCallback>>,
    frame_id: &Cell<Option<i32>>,
) -> PageResult<()> {
    let frame = frame.borrow();
    let Some(callback) = frame.as_ref() else {
        return Ok(());
    };
    let id = window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|error| host_error("requestAnimationFrame failed", &error))?;
    frame_id.set(Some(id));
    Ok(())
}

impl MountedPage {
    /// Shared handle to the running controller.
    #[must_use]
    pub fn page(&self) -> Rc<RefCell<WebPage>> {
        Rc::clone(&self.page)
    }

    pub fn notify(&self, message: &str, kind: NotificationKind) -> Option<NotificationId> {
        let now = performance_now(&self.window);
        self.page.try_borrow_mut().ok()?.notify(now, message, kind)
    }

    /// Stops the frame loop, removes listeners and shuts the controller
    /// down.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl Fn(&mut WebPage, f64, &Event) + 'static,
    ) -> PageResult<()> {
        let page = Rc::clone(&self.page);
        let window = self.window.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Ok(mut page) = page.try_borrow_mut() else {
                debug!(kind, "event skipped: page busy");
                return;
            };
            handler(&mut *page, performance_now(&window), &event);
        });
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|error| host_error("addEventListener failed", &error))?;
        self.listeners.push((target.clone(), kind, closure));
        Ok(())
    }

    fn start_frame_loop(&self) -> PageResult<()> {
        let page = Rc::clone(&self.page);
        let frame = Rc::clone(&self.frame);
        let frame_id = Rc::clone(&self.frame_id);
        let window = self.window.clone();
        let callback: FrameCallback = Closure::new(move |_timestamp: f64| {
            frame_id.set(None);
            if let Ok(mut page) = page.try_borrow_mut() {
                if page.phase() == PagePhase::ShutDown {
                    return;
                }
                page.advance_to(performance_now(&window));
            }
            if let Err(error) = request_frame(&window, &frame, &frame_id) {
                warn!(%error, "frame loop stopped");
            }
        });
        *self.frame.borrow_mut() = Some(callback);
        request_frame(&self.window, &self.frame, &self.frame_id)
    }

    fn teardown(&mut self) {
        if let Some(id) = self.frame_id.take() {
            if let Err(error) = self.window.cancel_animation_frame(id) {
                debug!(error = %js_message(&error), "cancelAnimationFrame failed");
            }
        }
        self.frame.borrow_mut().take();
        for (target, kind, closure) in self.listeners.drain(..) {
            if let Err(error) =
                target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            {
                debug!(kind, error = %js_message(&error), "removeEventListener failed");
            }
        }
        if let Ok(mut page) = self.page.try_borrow_mut() {
            page.shutdown();
        }
    }
}

impl Drop for MountedPage {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// JavaScript entry point.
#[wasm_bindgen]
pub struct LandingPage {
    mounted: Option<MountedPage>,
}

#[wasm_bindgen]
impl LandingPage {
    /// Mounts the page. `content` is a content object; `undefined` selects
    /// the built-in investor deck.
    #[wasm_bindgen(constructor)]
    pub fn new(content: JsValue) -> Result<LandingPage, JsValue> {
        let content = if content.is_undefined() || content.is_null() {
            ContentModel::investor_deck()
        } else {
            serde_wasm_bindgen::from_value(content)
                .map_err(|e| JsValue::from_str(&format!("invalid content: {e}")))?
        };
        let mounted = mount(content, PageConfig::default())
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        Ok(Self {
            mounted: Some(mounted),
        })
    }

    /// Shows a notification. `kind` is `info`, `success`, `warning` or
    /// `error`; anything else falls back to `info`.
    pub fn notify(&self, message: &str, kind: Option<String>) -> bool {
        let kind = kind
            .and_then(|kind| serde_wasm_bindgen::from_value(JsValue::from_str(&kind)).ok())
            .unwrap_or_default();
        self.mounted
            .as_ref()
            .and_then(|mounted| mounted.notify(message, kind))
            .is_some()
    }

    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.unmount();
        }
    }
}
