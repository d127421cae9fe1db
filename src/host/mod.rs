//! Boundary between page logic and the document it drives.
//!
//! Components never hold nodes; they hold `ElementId`s and ask a `Host` to
//! query, measure or mutate. `MemoryHost` is the deterministic in-memory
//! implementation used by tests and headless runs; the `web-host` feature
//! provides one over `web-sys`.

mod geometry;
mod markup;
mod memory_host;
pub mod selector;

pub use geometry::{Rect, ViewportMetrics};
pub use markup::escape_html;
pub use memory_host::{MemoryHost, ScrollRequest};
pub use selector::Selector;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque reference to an element owned by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Declarative description of an element subtree to create.
///
/// `text` is always inserted as a text node, never parsed as markup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementSpec {
    pub tag: String,
    pub classes: SmallVec<[String; 4]>,
    pub attributes: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push((property.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Contract implemented by any document backend.
///
/// Every operation tolerates unknown or detached elements: reads return
/// `None`/`false`/empty and writes are ignored.
pub trait Host {
    /// Connected elements matching `selector`, in document order. Invalid
    /// selectors match nothing.
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    fn query(&self, selector: &str) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    /// Matches of `selector` inside `root` (excluding `root` itself).
    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        self.query_all(selector)
            .into_iter()
            .filter(|element| *element != root && self.contains(root, *element))
            .collect()
    }

    fn body(&self) -> Option<ElementId>;

    fn head(&self) -> Option<ElementId>;

    fn is_connected(&self, element: ElementId) -> bool;

    /// Inclusive containment, like `Node.contains`.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    fn style(&self, element: ElementId, property: &str) -> Option<String>;

    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    fn text_content(&self, element: ElementId) -> String;

    /// Border box relative to the viewport. `None` for detached elements
    /// or elements without layout.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Distance from the document top.
    fn offset_top(&self, element: ElementId) -> Option<f64>;

    fn viewport(&self) -> ViewportMetrics;

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);

    /// Builds `spec` and appends it to `parent`. `None` when `parent` is
    /// unknown.
    fn create_element(&mut self, parent: ElementId, spec: &ElementSpec) -> Option<ElementId>;

    /// Detaches `element` from its parent. Returns `false` when it was not
    /// attached.
    fn remove_element(&mut self, element: ElementId) -> bool;

    /// Appends a `<style>` element with `css` to the document head.
    fn inject_stylesheet(&mut self, css: &str) -> Option<ElementId> {
        let head = self.head()?;
        self.create_element(head, &ElementSpec::new("style").with_text(css))
    }

    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}
