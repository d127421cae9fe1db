//! Viewport visibility tracking.
//!
//! `VisibilityCoordinator` plays the role of the browser's intersection
//! observer: observers carry a threshold and a root margin, elements are
//! registered against them, and visibility samples (either measured from a
//! `Host` by `evaluate` or fed in by an external primitive through
//! `report`) turn into `VisibilityNotice`s for the page controller.

mod margin;

pub use margin::{MarginLength, RootMargin};

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PageError, PageResult};
use crate::host::{ElementId, Host, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Visible fraction of the element, `0..=1`, that counts as visible.
    pub threshold: f64,
    #[serde(default)]
    pub root_margin: RootMargin,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ObserverConfig {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            root_margin: RootMargin::default(),
        }
    }

    #[must_use]
    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn validate(self) -> PageResult<Self> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(PageError::InvalidContent(format!(
                "observer threshold must be finite and in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(self)
    }

    fn is_visible(self, ratio: Option<f64>) -> bool {
        match ratio {
            Some(ratio) => ratio >= self.threshold && (ratio > 0.0 || self.threshold == 0.0),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObserveMode {
    /// Notify each element the first time it becomes visible, never again.
    Once,
    /// Notify every time an element goes from not visible to visible.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityNotice {
    pub observer: ObserverId,
    pub element: ElementId,
    pub ratio: f64,
}

#[derive(Debug, Clone)]
struct Observer {
    config: ObserverConfig,
    mode: ObserveMode,
    /// Registered targets and whether they were visible at the last sample.
    targets: IndexMap<ElementId, bool>,
    notified: HashSet<ElementId>,
}

/// Fraction of `rect` inside `root`.
///
/// `None` when the two do not touch. Zero-area rectangles touching the root
/// count as fully visible.
#[must_use]
pub fn intersection_ratio(root: Rect, rect: Rect) -> Option<f64> {
    if !root.is_finite() || !rect.is_finite() {
        return None;
    }
    let overlap = root.intersection(rect)?;
    let area = rect.area();
    if area <= 0.0 {
        return Some(1.0);
    }
    Some((overlap.area() / area).clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityCoordinator {
    observers: IndexMap<ObserverId, Observer>,
    next_id: u32,
}

impl VisibilityCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_observer(&mut self, config: ObserverConfig, mode: ObserveMode) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.insert(
            id,
            Observer {
                config,
                mode,
                targets: IndexMap::new(),
                notified: HashSet::new(),
            },
        );
        id
    }

    /// Starts tracking `element`. Returns `false` for unknown observers or
    /// elements already tracked.
    pub fn observe(&mut self, observer: ObserverId, element: ElementId) -> bool {
        let Some(state) = self.observers.get_mut(&observer) else {
            debug!(?observer, "observe on disconnected observer ignored");
            return false;
        };
        if state.targets.contains_key(&element) {
            return false;
        }
        state.targets.insert(element, false);
        true
    }

    pub fn unobserve(&mut self, observer: ObserverId, element: ElementId) -> bool {
        self.observers
            .get_mut(&observer)
            .is_some_and(|state| state.targets.shift_remove(&element).is_some())
    }

    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.shift_remove(&observer).is_some()
    }

    pub fn disconnect_all(&mut self) {
        self.observers.clear();
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn observed(&self, observer: ObserverId) -> Vec<ElementId> {
        self.observers
            .get(&observer)
            .map(|state| state.targets.keys().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_notified(&self, observer: ObserverId, element: ElementId) -> bool {
        self.observers
            .get(&observer)
            .is_some_and(|state| state.notified.contains(&element))
    }

    #[must_use]
    pub fn config(&self, observer: ObserverId) -> Option<ObserverConfig> {
        self.observers.get(&observer).map(|state| state.config)
    }

    /// Feeds one visibility sample. `ratio` is `None` when the element does
    /// not intersect the root at all.
    pub fn report(
        &mut self,
        observer: ObserverId,
        element: ElementId,
        ratio: Option<f64>,
    ) -> Option<VisibilityNotice> {
        let state = self.observers.get_mut(&observer)?;
        let visible = state.config.is_visible(ratio);
        let was_visible = *state.targets.get(&element)?;
        state.targets.insert(element, visible);
        if !visible {
            return None;
        }

        let notify = match state.mode {
            ObserveMode::Once => state.notified.insert(element),
            ObserveMode::Continuous => {
                state.notified.insert(element);
                !was_visible
            }
        };
        notify.then(|| VisibilityNotice {
            observer,
            element,
            ratio: ratio.unwrap_or(0.0),
        })
    }

    /// Measures every tracked element against the host viewport.
    ///
    /// Notices are ordered by observer creation, then element registration.
    /// Elements without a bounding box are skipped and keep their state.
    pub fn evaluate<H: Host + ?Sized>(&mut self, host: &H) -> Vec<VisibilityNotice> {
        let viewport = host.viewport();
        let mut samples = Vec::new();
        for (observer, state) in &self.observers {
            let root = state.config.root_margin.apply(viewport);
            for element in state.targets.keys() {
                if state.mode == ObserveMode::Once && state.notified.contains(element) {
                    continue;
                }
                let Some(rect) = host.bounding_rect(*element) else {
                    continue;
                };
                samples.push((*observer, *element, intersection_ratio(root, rect)));
            }
        }

        samples
            .into_iter()
            .filter_map(|(observer, element, ratio)| self.report(observer, element, ratio))
            .collect()
    }
}
