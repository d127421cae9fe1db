use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::debug;

use super::markup::escape_html;
use super::selector::{Selector, SelectorSubject};
use super::{ElementId, ElementSpec, Host, Rect, ScrollBehavior, ViewportMetrics};

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: IndexMap<String, String>,
    classes: SmallVec<[String; 4]>,
    styles: IndexMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    /// Border box in document coordinates.
    layout: Option<Rect>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            classes: SmallVec::new(),
            styles: IndexMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            layout: None,
        }
    }
}

impl SelectorSubject for Node {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn has_class_name(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }
}

/// One scroll request issued through `Host::scroll_to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Arena-backed document used by tests and headless runs.
///
/// Layout is never computed: callers assign document-space rectangles with
/// `set_layout`, and `bounding_rect` projects them through the current
/// scroll offset. Smooth scroll requests are recorded and only take effect
/// when `complete_scroll` is called, mirroring an asynchronous browser
/// scroll.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    nodes: Vec<Node>,
    root: ElementId,
    head: ElementId,
    body: ElementId,
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
    scroll_requests: Vec<ScrollRequest>,
    reduced_motion: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

impl MemoryHost {
    #[must_use]
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        let mut host = Self {
            nodes: Vec::new(),
            root: ElementId(0),
            head: ElementId(0),
            body: ElementId(0),
            viewport_width,
            viewport_height,
            scroll_y: 0.0,
            scroll_requests: Vec::new(),
            reduced_motion: false,
        };
        let root = host.push_node(Node::new("html"));
        let head = host.push_node(Node::new("head"));
        let body = host.push_node(Node::new("body"));
        host.attach(root, head);
        host.attach(root, body);
        host.root = root;
        host.head = head;
        host.body = body;
        host
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Builds `spec` under `parent`. Unknown parents fall back to the body.
    pub fn append(&mut self, parent: ElementId, spec: ElementSpec) -> ElementId {
        let parent = if self.node(parent).is_some() {
            parent
        } else {
            self.body
        };
        self.build(parent, &spec)
    }

    /// Assigns a border box in document coordinates.
    pub fn set_layout(&mut self, element: ElementId, rect: Rect) {
        if let Some(node) = self.node_mut(element) {
            node.layout = Some(rect);
        }
    }

    /// Moves the viewport as a user scroll would.
    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y.max(0.0);
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn set_prefers_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    #[must_use]
    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    /// Applies the most recent scroll request. Returns the new offset.
    pub fn complete_scroll(&mut self) -> Option<f64> {
        let request = self.scroll_requests.last()?;
        self.scroll_y = request.top.max(0.0);
        Some(self.scroll_y)
    }

    #[must_use]
    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.node(element)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element).and_then(|node| node.parent)
    }

    #[must_use]
    pub fn tag_name(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|node| node.tag.as_str())
    }

    /// Contents of every `<style>` element in the head.
    #[must_use]
    pub fn stylesheets(&self) -> Vec<&str> {
        self.children(self.head)
            .iter()
            .filter_map(|child| self.node(*child))
            .filter(|node| node.tag == "style")
            .map(|node| node.text.as_str())
            .collect()
    }

    /// Serializes `element` and its subtree. Text and attribute values are
    /// escaped.
    #[must_use]
    pub fn outer_html(&self, element: ElementId) -> String {
        let mut out = String::new();
        self.write_html(element, &mut out);
        out
    }

    fn write_html(&self, element: ElementId, out: &mut String) {
        let Some(node) = self.node(element) else {
            return;
        };
        out.push('<');
        out.push_str(&node.tag);
        for (name, value) in &node.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
        }
        if !node.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape_html(&node.classes.join(" "))));
        }
        if !node.styles.is_empty() {
            let inline = node
                .styles
                .iter()
                .map(|(property, value)| format!("{property}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(&format!(" style=\"{}\"", escape_html(&inline)));
        }
        out.push('>');
        out.push_str(&escape_html(&node.text));
        for child in &node.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes.get(element.index())
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(element.index())
    }

    fn push_node(&mut self, node: Node) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, parent: ElementId, child: ElementId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn build(&mut self, parent: ElementId, spec: &ElementSpec) -> ElementId {
        let mut node = Node::new(&spec.tag);
        for class in &spec.classes {
            if !node.has_class_name(class) {
                node.classes.push(class.clone());
            }
        }
        for (name, value) in &spec.attributes {
            node.attributes.insert(name.clone(), value.clone());
        }
        for (property, value) in &spec.styles {
            node.styles.insert(property.clone(), value.clone());
        }
        if let Some(text) = &spec.text {
            node.text = text.clone();
        }

        let id = self.push_node(node);
        self.attach(parent, id);
        for child in &spec.children {
            self.build(id, child);
        }
        id
    }

    /// Ancestor chain from the root down to `element`, or `None` if the
    /// element is detached.
    fn connected_path(&self, element: ElementId) -> Option<Vec<ElementId>> {
        let mut path = vec![element];
        let mut current = element;
        while let Some(parent) = self.node(current)?.parent {
            path.push(parent);
            current = parent;
        }
        if current != self.root {
            return None;
        }
        path.reverse();
        Some(path)
    }

    fn collect_document_order(&self, element: ElementId, out: &mut Vec<ElementId>) {
        out.push(element);
        if let Some(node) = self.node(element) {
            for child in &node.children {
                self.collect_document_order(*child, out);
            }
        }
    }
}

impl Host for MemoryHost {
    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let parsed: Selector = match selector.parse() {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(selector, %error, "selector matches nothing");
                return Vec::new();
            }
        };

        let mut ordered = Vec::new();
        self.collect_document_order(self.root, &mut ordered);
        ordered
            .into_iter()
            .filter(|element| {
                let Some(path) = self.connected_path(*element) else {
                    return false;
                };
                let subjects: Vec<&dyn SelectorSubject> = path
                    .iter()
                    .filter_map(|id| self.node(*id))
                    .map(|node| node as &dyn SelectorSubject)
                    .collect();
                parsed.matches_path(&subjects)
            })
            .collect()
    }

    fn body(&self) -> Option<ElementId> {
        Some(self.body)
    }

    fn head(&self) -> Option<ElementId> {
        Some(self.head)
    }

    fn is_connected(&self, element: ElementId) -> bool {
        self.connected_path(element).is_some()
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|candidate| candidate.parent);
        }
        false
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let node = self.node(element)?;
        if name == "class" {
            return (!node.classes.is_empty()).then(|| node.classes.join(" "));
        }
        node.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(node) = self.node_mut(element) else {
            return;
        };
        if name == "class" {
            node.classes = value.split_whitespace().map(str::to_owned).collect();
        } else {
            node.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .is_some_and(|node| node.has_class_name(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.node_mut(element) {
            if !node.has_class_name(class) {
                node.classes.push(class.to_owned());
            }
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.node_mut(element) {
            node.classes.retain(|candidate| candidate != class);
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.node(element)?.styles.get(property).cloned()
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            node.styles.insert(property.to_owned(), value.to_owned());
        }
    }

    fn text_content(&self, element: ElementId) -> String {
        let mut ordered = Vec::new();
        self.collect_document_order(element, &mut ordered);
        ordered
            .into_iter()
            .filter_map(|id| self.node(id))
            .map(|node| node.text.as_str())
            .collect()
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        if !self.is_connected(element) {
            return None;
        }
        let layout = self.node(element)?.layout?;
        Some(layout.translated(0.0, -self.scroll_y))
    }

    fn offset_top(&self, element: ElementId) -> Option<f64> {
        if !self.is_connected(element) {
            return None;
        }
        self.node(element)?.layout.map(Rect::top)
    }

    fn viewport(&self) -> ViewportMetrics {
        ViewportMetrics::new(self.viewport_width, self.viewport_height, self.scroll_y)
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scroll_requests.push(ScrollRequest { top, behavior });
        if behavior == ScrollBehavior::Instant {
            self.scroll_y = top.max(0.0);
        }
    }

    fn create_element(&mut self, parent: ElementId, spec: &ElementSpec) -> Option<ElementId> {
        self.node(parent)?;
        Some(self.build(parent, spec))
    }

    fn remove_element(&mut self, element: ElementId) -> bool {
        let Some(parent) = self.node(element).and_then(|node| node.parent) else {
            return false;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|child| *child != element);
        }
        if let Some(node) = self.node_mut(element) {
            node.parent = None;
        }
        true
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}
